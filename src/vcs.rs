//! Access to earlier revisions of a file
//!
//! The value diff compares the source file with its state one commit back.
//! [`GitHistory`] walks the first-parent history from `HEAD`, takes the
//! commit `skip` steps back and reads the file from that commit's tree. The
//! path is interpreted relative to the repository root.

use git2::{ErrorCode, Repository};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Errors raised while looking up a file in history
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("'{file}' not found {skip} revision(s) back in '{repository}'")]
    NotFound {
        repository: PathBuf,
        file: PathBuf,
        skip: usize,
    },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

/// Read-only view of a file's history
pub trait VersionControl: Send + Sync {
    /// Content of `file` as of the commit `skip` steps back from `HEAD`
    ///
    /// `skip = 0` is `HEAD` itself, `skip = 1` the previous commit.
    fn read_file_at_previous_revision(
        &self,
        repository: &Path,
        file: &Path,
        skip: usize,
    ) -> Result<Vec<u8>, VcsError>;
}

/// Git history via libgit2
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHistory;

impl VersionControl for GitHistory {
    fn read_file_at_previous_revision(
        &self,
        repository: &Path,
        file: &Path,
        skip: usize,
    ) -> Result<Vec<u8>, VcsError> {
        let not_found = || VcsError::NotFound {
            repository: repository.to_path_buf(),
            file: file.to_path_buf(),
            skip,
        };

        let repo = Repository::open(repository)?;
        // An unborn HEAD makes push_head fail with a generic reference error
        if repo.is_empty()? {
            return Err(not_found());
        }
        match repo.head() {
            Ok(_) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Err(not_found());
            }
            Err(e) => return Err(e.into()),
        }
        let mut revwalk = repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.simplify_first_parent()?;

        let oid = match revwalk.nth(skip) {
            Some(oid) => oid?,
            None => return Err(not_found()),
        };
        let commit = repo.find_commit(oid)?;
        debug!("Reading '{}' from commit {}", file.display(), commit.id());

        let entry = match commit.tree()?.get_path(file) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        let blob = entry
            .to_object(&repo)?
            .peel_to_blob()
            .map_err(|_| not_found())?;

        Ok(blob.content().to_vec())
    }
}

/// Fixed per-file revision lists, newest first
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    revisions: HashMap<PathBuf, Vec<String>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the revisions of `file`, newest (`HEAD`) first
    pub fn with_revisions(mut self, file: impl Into<PathBuf>, revisions: &[&str]) -> Self {
        self.revisions.insert(
            file.into(),
            revisions.iter().map(|r| r.to_string()).collect(),
        );
        self
    }
}

impl VersionControl for MemoryHistory {
    fn read_file_at_previous_revision(
        &self,
        repository: &Path,
        file: &Path,
        skip: usize,
    ) -> Result<Vec<u8>, VcsError> {
        self.revisions
            .get(file)
            .and_then(|revisions| revisions.get(skip))
            .map(|content| content.clone().into_bytes())
            .ok_or_else(|| VcsError::NotFound {
                repository: repository.to_path_buf(),
                file: file.to_path_buf(),
                skip,
            })
    }
}
