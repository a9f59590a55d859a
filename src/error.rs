//! Run-level errors and their process exit codes

use crate::mt::MtError;
use crate::patch::PatchError;
use crate::pointer::JsonPointer;
use crate::storage::StorageError;
use crate::vcs::VcsError;
use std::path::PathBuf;

/// Process exit status of the command line tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Ok,
    Help,
    MissingArguments,
    InvalidArgument,
    FileNotFound,
    JsonInvalid,
    TranslationFileInvalid,
    Unexpected,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::Help => 1,
            ExitStatus::MissingArguments => 2,
            ExitStatus::InvalidArgument => 3,
            ExitStatus::FileNotFound => 4,
            ExitStatus::JsonInvalid => 5,
            ExitStatus::TranslationFileInvalid => 6,
            ExitStatus::Unexpected => 666,
        }
    }
}

/// Everything that can stop a synchronization run
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Help or version text was printed; nothing else to do
    #[error("help displayed")]
    HelpDisplayed,

    #[error("missing argument: {0}")]
    MissingArgument(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("'{}' not found, please verify that the file exists", path.display())]
    FileNotFound { path: PathBuf },

    #[error("invalid JSON in '{}': {reason}", path.display())]
    InvalidJson { path: PathBuf, reason: String },

    #[error("'{}' contains an array at '{pointer}', arrays are not supported", path.display())]
    ArrayNotAllowed { path: PathBuf, pointer: JsonPointer },

    #[error("translation to '{language}' failed: {source}")]
    Translation {
        language: String,
        #[source]
        source: MtError,
    },

    #[error("cannot patch '{}': {source}", path.display())]
    Patch {
        path: PathBuf,
        #[source]
        source: PatchError,
    },

    /// The provider failed outside of a single translation
    #[error("translation provider failed: {0}")]
    Provider(#[from] MtError),

    #[error(transparent)]
    Storage(StorageError),

    #[error(transparent)]
    History(VcsError),

    /// Some target languages failed while others were processed
    #[error("{} of {total} target language(s) failed: {}", failed.len(), failed.join(", "))]
    PartialFailure { failed: Vec<String>, total: usize },
}

impl SyncError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            SyncError::HelpDisplayed => ExitStatus::Help,
            SyncError::MissingArgument(_) => ExitStatus::MissingArguments,
            SyncError::InvalidArgument(_) => ExitStatus::InvalidArgument,
            SyncError::FileNotFound { .. } => ExitStatus::FileNotFound,
            SyncError::InvalidJson { .. } => ExitStatus::JsonInvalid,
            SyncError::ArrayNotAllowed { .. } => ExitStatus::TranslationFileInvalid,
            SyncError::Storage(StorageError::NotFound(_)) => ExitStatus::FileNotFound,
            SyncError::History(VcsError::NotFound { .. }) => ExitStatus::FileNotFound,
            SyncError::Translation { .. }
            | SyncError::Provider(_)
            | SyncError::Patch { .. }
            | SyncError::Storage(_)
            | SyncError::History(_)
            | SyncError::PartialFailure { .. } => ExitStatus::Unexpected,
        }
    }
}

impl From<StorageError> for SyncError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => SyncError::FileNotFound { path },
            StorageError::InvalidContent { path, source } => SyncError::InvalidJson {
                path,
                reason: source.to_string(),
            },
            other => SyncError::Storage(other),
        }
    }
}

impl From<VcsError> for SyncError {
    fn from(err: VcsError) -> Self {
        match err {
            VcsError::NotFound { file, .. } => SyncError::FileNotFound { path: file },
            other => SyncError::History(other),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
