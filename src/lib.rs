//! Keep per-language JSON localization files in sync with a source language
//!
//! Localization files live at `{translations}/{language}/main.json` inside a
//! git repository. Every run brings each target language file in line with
//! the source language file: missing keys are added and machine-translated,
//! extra keys are removed, and texts edited in the source since the previous
//! commit are translated again. Existing keys keep their order.
//!
//! ```ignore
//! use l10n_sync::{FsStorage, GitHistory, MockMode, MockTranslator, Synchronizer};
//!
//! let translator = MockTranslator::new(MockMode::Suffix);
//! let report = Synchronizer::new(&config, &FsStorage, &GitHistory, &translator)
//!     .run()
//!     .await?;
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod mt;
pub mod patch;
pub mod placeholder;
pub mod pointer;
pub mod storage;
pub mod sync;
pub mod translate;
pub mod tree;
pub mod vcs;

#[cfg(test)]
mod integration_tests;

pub use config::{CliArgs, LanguageCatalog, TranslationConfig};
pub use diff::{DiffOperation, DiffOptions, diff, diff_with};
pub use error::{ExitStatus, SyncError, SyncResult};
pub use mt::{DeepLProvider, MachineTranslator, MockMode, MockTranslator, MtError};
pub use patch::{Patch, PatchError, PatchOperation, apply};
pub use placeholder::{protect, unprotect};
pub use pointer::JsonPointer;
pub use storage::{FsStorage, MemoryStorage, Storage, StorageError};
pub use sync::{LanguageOutcome, SyncReport, Synchronizer};
pub use translate::PatchTranslator;
pub use tree::{KeyValueTree, Node, TreeError};
pub use vcs::{GitHistory, MemoryHistory, VcsError, VersionControl};
