//! Slash-delimited key paths into a localization tree
//!
//! Paths follow JSON Pointer (RFC 6901) conventions: the root is the empty
//! string, every other path is a sequence of `/`-prefixed segments, and the
//! characters `~` and `/` inside a key are written as `~0` and `~1`.
//!
//! ```ignore
//! let path: JsonPointer = "/menu/a~1b".parse()?;
//! assert_eq!(path.segments(), ["menu", "a/b"]);
//! assert_eq!(path.to_string(), "/menu/a~1b");
//! ```

use std::fmt;
use std::str::FromStr;

/// A parsed path from the tree root to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The empty pointer, addressing the tree root
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Pointer to the child `key` of this pointer
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Split into the parent pointer and the last key
    ///
    /// Returns `None` for the root pointer, which has no parent.
    pub fn split_last(&self) -> Option<(JsonPointer, &str)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            JsonPointer {
                segments: parent.to_vec(),
            },
            last.as_str(),
        ))
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

/// Error for text that is not a valid pointer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid path '{0}': must be empty or start with '/'")]
pub struct InvalidPointer(pub String);

impl FromStr for JsonPointer {
    type Err = InvalidPointer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let rest = s
            .strip_prefix('/')
            .ok_or_else(|| InvalidPointer(s.to_string()))?;
        Ok(Self {
            segments: rest.split('/').map(unescape).collect(),
        })
    }
}
