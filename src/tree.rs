//! Ordered key/value tree of a localization file
//!
//! A localization file is a JSON object whose values are either translatable
//! strings or nested objects:
//!
//! ```json
//! {
//!     "greeting": "Hello, {{name}}!",
//!     "menu": {
//!         "open": "Open",
//!         "close": "Close"
//!     }
//! }
//! ```
//!
//! Key order is significant and preserved through parse and serialization.
//! Numbers, booleans and null are kept as they are and written back
//! unchanged; they are only turned into text when they get translated.
//! Arrays are not allowed anywhere in the tree and are rejected while
//! parsing, before any other work is done with the file.

use crate::pointer::JsonPointer;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::borrow::Cow;

/// A node of the tree: a nested object, a translatable string or another
/// JSON scalar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Object(KeyValueTree),
    Leaf(String),
    /// Number, boolean or null
    Scalar(Value),
}

impl Node {
    pub fn leaf(text: impl Into<String>) -> Self {
        Node::Leaf(text.into())
    }

    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            Node::Leaf(text) => Some(text),
            Node::Scalar(_) | Node::Object(_) => None,
        }
    }

    pub fn as_object(&self) -> Option<&KeyValueTree> {
        match self {
            Node::Object(tree) => Some(tree),
            Node::Leaf(_) | Node::Scalar(_) => None,
        }
    }

    /// Text of a leaf or scalar as sent to translation; `None` for objects
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Node::Leaf(text) => Some(Cow::Borrowed(text)),
            Node::Scalar(value) => Some(Cow::Owned(value.to_string())),
            Node::Object(_) => None,
        }
    }

    /// Every leaf and scalar below (or at) this node with its text, in
    /// document order
    ///
    /// `base` is the pointer of this node; the returned pointers extend it.
    pub fn leaves(&self, base: &JsonPointer) -> Vec<(JsonPointer, Cow<'_, str>)> {
        let mut leaves = Vec::new();
        let mut stack = vec![(base.clone(), self)];
        while let Some((path, node)) = stack.pop() {
            match node {
                Node::Object(tree) => {
                    // Reverse push keeps document order when popping
                    for (key, child) in tree.entries.iter().rev() {
                        stack.push((path.child(key), child));
                    }
                }
                leaf => {
                    if let Some(text) = leaf.as_text() {
                        leaves.push((path, text));
                    }
                }
            }
        }
        leaves
    }
}

/// Errors raised while turning JSON text into a tree
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The text is not JSON, or its root is not an object
    #[error("{0}")]
    Malformed(String),

    /// An array was found at the given location
    #[error("arrays are not allowed in translation files (found at '{pointer}')")]
    ArrayNotAllowed { pointer: JsonPointer },
}

/// Ordered mapping from key to [`Node`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueTree {
    entries: IndexMap<String, Node>,
}

impl KeyValueTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the content of a localization file
    ///
    /// # Errors
    /// - [`TreeError::Malformed`] for invalid JSON or a non-object root
    /// - [`TreeError::ArrayNotAllowed`] if an array appears anywhere
    pub fn parse(content: &str) -> Result<Self, TreeError> {
        let json: Value =
            serde_json::from_str(content).map_err(|e| TreeError::Malformed(e.to_string()))?;
        match Self::from_value(json, &JsonPointer::root())? {
            Node::Object(tree) => Ok(tree),
            Node::Leaf(_) | Node::Scalar(_) => Err(TreeError::Malformed(
                "root must be an object".to_string(),
            )),
        }
    }

    fn from_value(value: Value, pointer: &JsonPointer) -> Result<Node, TreeError> {
        match value {
            Value::Object(map) => {
                let mut tree = KeyValueTree::new();
                for (key, child) in map {
                    let node = Self::from_value(child, &pointer.child(&key))?;
                    tree.entries.insert(key, node);
                }
                Ok(Node::Object(tree))
            }
            Value::Array(_) => Err(TreeError::ArrayNotAllowed {
                pointer: pointer.clone(),
            }),
            Value::String(text) => Ok(Node::Leaf(text)),
            scalar => Ok(Node::Scalar(scalar)),
        }
    }

    /// Serialize with tab indentation and `"key": value` separators
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        // serde_json only emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_key(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Set `key` to `node`
    ///
    /// An existing key keeps its position; a new key goes to the end.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        self.entries.insert(key.into(), node)
    }

    /// Remove `key`, keeping the order of the remaining keys
    pub fn remove(&mut self, key: &str) -> Option<Node> {
        self.entries.shift_remove(key)
    }

    pub fn with_leaf(mut self, key: &str, text: &str) -> Self {
        self.insert(key, Node::leaf(text));
        self
    }

    pub fn with_object(mut self, key: &str, tree: KeyValueTree) -> Self {
        self.insert(key, Node::Object(tree));
        self
    }

    /// Node addressed by `pointer`, or `None` if any segment is missing
    ///
    /// The root pointer addresses no node; use the tree itself.
    pub fn get(&self, pointer: &JsonPointer) -> Option<&Node> {
        let (first, rest) = pointer.segments().split_first()?;
        let mut node = self.entries.get(first)?;
        for key in rest {
            node = node.as_object()?.entries.get(key)?;
        }
        Some(node)
    }

    /// Object addressed by `pointer`; the root pointer yields the tree itself
    pub fn object_mut(&mut self, pointer: &JsonPointer) -> Option<&mut KeyValueTree> {
        let mut tree = self;
        for key in pointer.segments() {
            tree = match tree.entries.get_mut(key)? {
                Node::Object(child) => child,
                Node::Leaf(_) | Node::Scalar(_) => return None,
            };
        }
        Some(tree)
    }

    /// All nodes of the tree with their pointers, parents before children
    pub fn walk(&self) -> Vec<(JsonPointer, &Node)> {
        let mut nodes = Vec::new();
        let mut stack: Vec<(JsonPointer, &KeyValueTree)> = vec![(JsonPointer::root(), self)];
        while let Some((base, tree)) = stack.pop() {
            for (key, node) in &tree.entries {
                let path = base.child(key);
                if let Node::Object(child) = node {
                    stack.push((path.clone(), child));
                }
                nodes.push((path, node));
            }
        }
        nodes
    }
}

impl Serialize for KeyValueTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, node) in &self.entries {
            map.serialize_entry(key, node)?;
        }
        map.end()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Object(tree) => tree.serialize(serializer),
            Node::Leaf(text) => serializer.serialize_str(text),
            Node::Scalar(value) => value.serialize(serializer),
        }
    }
}
