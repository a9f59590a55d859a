//! Reconciliation of all target languages with the source language
//!
//! One run:
//!
//! 1. read the current source file and its state one commit back, and diff
//!    them (the value diff);
//! 2. for every target language, in sorted order:
//!    - read the target file and diff it against the current source (the key
//!      diff),
//!    - translate and apply the key patch, then the value patch,
//!    - write the file back if either patch changed something.
//!
//! Languages are processed one after the other. By default the first failure
//! stops the run; files written for earlier languages stay on disk. With
//! [`Synchronizer::keep_going`] a failing language is logged and skipped.
//! Nothing is committed to version control.

use crate::config::TranslationConfig;
use crate::diff::{DiffOperation, diff};
use crate::error::{SyncError, SyncResult};
use crate::mt::MachineTranslator;
use crate::patch::apply;
use crate::storage::Storage;
use crate::translate::PatchTranslator;
use crate::tree::{KeyValueTree, TreeError};
use crate::vcs::VersionControl;
use std::path::Path;
use tracing::{Level, debug, info, warn};

/// How far back in history the previous source file is looked up
const PREVIOUS_REVISION: usize = 1;

/// What happened to one target language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageOutcome {
    /// The file was rewritten
    Written {
        key_operations: usize,
        value_operations: usize,
    },
    /// Nothing to do; the file was not touched
    Unchanged,
    /// Processing failed and was skipped (keep-going mode only)
    Failed(String),
}

/// Per-language outcomes of a run, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    outcomes: Vec<(String, LanguageOutcome)>,
}

impl SyncReport {
    fn push(&mut self, language: &str, outcome: LanguageOutcome) {
        self.outcomes.push((language.to_string(), outcome));
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &LanguageOutcome)> {
        self.outcomes
            .iter()
            .map(|(language, outcome)| (language.as_str(), outcome))
    }

    pub fn outcome(&self, language: &str) -> Option<&LanguageOutcome> {
        self.outcomes()
            .find(|(l, _)| *l == language)
            .map(|(_, outcome)| outcome)
    }

    /// Number of files written
    pub fn written(&self) -> usize {
        self.outcomes()
            .filter(|(_, outcome)| matches!(outcome, LanguageOutcome::Written { .. }))
            .count()
    }

    pub fn failed(&self) -> Vec<&str> {
        self.outcomes()
            .filter(|(_, outcome)| matches!(outcome, LanguageOutcome::Failed(_)))
            .map(|(language, _)| language)
            .collect()
    }

    /// Turn skipped languages into [`SyncError::PartialFailure`]
    pub fn into_result(self) -> SyncResult<Self> {
        let failed: Vec<String> = self.failed().into_iter().map(String::from).collect();
        if failed.is_empty() {
            Ok(self)
        } else {
            Err(SyncError::PartialFailure {
                failed,
                total: self.outcomes.len(),
            })
        }
    }
}

/// Brings every target language file in line with the source file
pub struct Synchronizer<'a> {
    config: &'a TranslationConfig,
    storage: &'a dyn Storage,
    history: &'a dyn VersionControl,
    translator: &'a dyn MachineTranslator,
    keep_going: bool,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        config: &'a TranslationConfig,
        storage: &'a dyn Storage,
        history: &'a dyn VersionControl,
        translator: &'a dyn MachineTranslator,
    ) -> Self {
        Self {
            config,
            storage,
            history,
            translator,
            keep_going: false,
        }
    }

    /// Skip a failing target language instead of stopping the run
    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    /// Run the synchronization
    ///
    /// # Errors
    /// Errors reading or parsing the source file (current or previous) always
    /// stop the run. Errors of a single target language stop it unless
    /// keep-going is enabled.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        let config = self.config;
        debug!("Translation tool started with {}.", self.translator.provider_name());
        debug!("Source language: {}", config.source_language);
        debug!("Target language(s): {:?}", config.target_languages);
        debug!(
            "Translations directory: {}",
            config.translations_directory.display()
        );
        if tracing::enabled!(Level::DEBUG) {
            self.log_usage().await;
        }

        let source_file = config.source_file();
        let source = self.load_tree(&config.in_repository(&source_file))?;
        let previous_source = self.load_previous_source(&source_file)?;
        let source_diff = diff(&previous_source, &source);
        debug!(
            "{} change(s) in '{}' since the previous commit",
            source_diff.len(),
            source_file.display()
        );

        let translator = PatchTranslator::new(self.translator, &config.source_language);
        let mut report = SyncReport::default();

        for language in &config.target_languages {
            match self
                .sync_language(&translator, language, &source, &source_diff)
                .await
            {
                Ok(outcome) => report.push(language, outcome),
                Err(e) if self.keep_going => {
                    warn!("Skipping '{}': {}", language, e);
                    report.push(language, LanguageOutcome::Failed(e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Translation process finished but files were not committed and pushed. \
             Please verify translation files and commit and push them."
        );
        Ok(report)
    }

    async fn sync_language(
        &self,
        translator: &PatchTranslator<'_>,
        language: &str,
        source: &KeyValueTree,
        source_diff: &[DiffOperation],
    ) -> SyncResult<LanguageOutcome> {
        let target_file = self.config.target_file(language);
        let target_path = self.config.in_repository(&target_file);
        let mut target = self.load_tree(&target_path)?;

        let translation_error = |source| SyncError::Translation {
            language: language.to_string(),
            source,
        };
        let patch_error = |source| SyncError::Patch {
            path: target_path.clone(),
            source,
        };

        // Keys the target lacks or has in excess
        let mut key_operations = 0;
        let target_diff = diff(&target, source);
        if !target_diff.is_empty() {
            let patch = translator
                .translate_target_diff(&target_diff, language)
                .await
                .map_err(translation_error)?;
            if !patch.is_empty() {
                info!(
                    "Created patch (KEYS DIFF) with {} operation(s)/translation(s) for '{}'.",
                    patch.len(),
                    target_file.display()
                );
                apply(&patch, &mut target).map_err(patch_error)?;
                key_operations = patch.len();
            }
        }

        // Source texts edited since the previous commit
        let mut value_operations = 0;
        if !source_diff.is_empty() {
            let patch = translator
                .translate_source_diff(source_diff, language)
                .await
                .map_err(translation_error)?;
            if !patch.is_empty() {
                info!(
                    "Created patch (VALUE DIFF) with {} translation(s) for '{}'.",
                    patch.len(),
                    target_file.display()
                );
                apply(&patch, &mut target).map_err(patch_error)?;
                value_operations = patch.len();
            }
        }

        if key_operations == 0 && value_operations == 0 {
            debug!("'{}' is up to date.", target_file.display());
            return Ok(LanguageOutcome::Unchanged);
        }

        let content = target.to_pretty_json().map_err(|e| SyncError::InvalidJson {
            path: target_path.clone(),
            reason: e.to_string(),
        })?;
        self.storage.write(&target_path, &content)?;
        info!("File written to '{}'.", target_path.display());
        Ok(LanguageOutcome::Written {
            key_operations,
            value_operations,
        })
    }

    fn load_tree(&self, path: &Path) -> SyncResult<KeyValueTree> {
        let content = self.storage.read(path)?;
        parse_tree(&content, path)
    }

    fn load_previous_source(&self, source_file: &Path) -> SyncResult<KeyValueTree> {
        let bytes = self.history.read_file_at_previous_revision(
            &self.config.repository_directory,
            source_file,
            PREVIOUS_REVISION,
        )?;
        let content = String::from_utf8(bytes).map_err(|e| SyncError::InvalidJson {
            path: source_file.to_path_buf(),
            reason: e.to_string(),
        })?;
        parse_tree(&content, source_file)
    }

    async fn log_usage(&self) {
        match self.translator.usage().await {
            Ok(Some(usage)) => debug!(
                "{} translations possible: {}/{}",
                self.translator.provider_name(),
                usage.character_count,
                usage.character_limit
            ),
            Ok(None) => {}
            Err(e) => debug!("Could not fetch usage: {}", e),
        }
    }
}

fn parse_tree(content: &str, path: &Path) -> SyncResult<KeyValueTree> {
    KeyValueTree::parse(content).map_err(|e| match e {
        TreeError::Malformed(reason) => SyncError::InvalidJson {
            path: path.to_path_buf(),
            reason,
        },
        TreeError::ArrayNotAllowed { pointer } => SyncError::ArrayNotAllowed {
            path: path.to_path_buf(),
            pointer,
        },
    })
}
