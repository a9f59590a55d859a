//! Turning diffs into translated patches
//!
//! Two diffs feed every target language:
//!
//! 1. the **key diff** from the current target file to the current source
//!    file tells which keys the target lacks or has in excess;
//! 2. the **value diff** from the previous source revision to the current
//!    source file tells which source texts were edited.
//!
//! [`PatchTranslator::translate_target_diff`] mirrors the key structure: every
//! `add` is copied into the patch and each of its leaves is followed by a
//! `replace` with the translated text, every `remove` is copied as is. Other
//! operations of the key diff are dropped; a `replace` there only reflects
//! that the target holds a translation, and genuine source edits arrive
//! through the value diff.
//!
//! [`PatchTranslator::translate_source_diff`] looks only at `replace`
//! operations of the value diff and emits a translated `replace` per leaf.
//! Additions and removals are already covered by the key diff.
//!
//! Every leaf costs exactly one call to the provider, wrapped in
//! [`protect`]/[`unprotect`]; there is no caching of repeated texts.

use crate::diff::DiffOperation;
use crate::mt::{MachineTranslator, MtResult};
use crate::patch::{Patch, PatchOperation};
use crate::placeholder::{protect, unprotect};
use crate::pointer::JsonPointer;
use crate::tree::Node;
use tracing::debug;

/// Builds translated patches for one source language
pub struct PatchTranslator<'a> {
    translator: &'a dyn MachineTranslator,
    source_language: &'a str,
}

impl<'a> PatchTranslator<'a> {
    pub fn new(translator: &'a dyn MachineTranslator, source_language: &'a str) -> Self {
        Self {
            translator,
            source_language,
        }
    }

    /// Patch that gives the target the key structure of the source
    ///
    /// `operations` must come from diffing the current target (old) against
    /// the current source (new).
    ///
    /// # Errors
    /// The first failed translation aborts the patch.
    pub async fn translate_target_diff(
        &self,
        operations: &[DiffOperation],
        target_language: &str,
    ) -> MtResult<Patch> {
        let mut patch = Patch::new();

        for operation in operations {
            match operation {
                DiffOperation::Add { path, value } => {
                    patch.push(PatchOperation::Add {
                        path: path.clone(),
                        value: value.clone(),
                    });
                    self.translate_leaves(&mut patch, path, value, target_language)
                        .await?;
                }
                DiffOperation::Remove { path } => {
                    patch.push(PatchOperation::Remove { path: path.clone() });
                }
                DiffOperation::Replace { .. }
                | DiffOperation::Move { .. }
                | DiffOperation::Copy { .. } => {}
            }
        }

        Ok(patch)
    }

    /// Patch that re-translates source texts edited since the previous revision
    ///
    /// `operations` must come from diffing the previous source revision (old)
    /// against the current source (new).
    ///
    /// # Errors
    /// The first failed translation aborts the patch.
    pub async fn translate_source_diff(
        &self,
        operations: &[DiffOperation],
        target_language: &str,
    ) -> MtResult<Patch> {
        let mut patch = Patch::new();

        for operation in operations {
            if let DiffOperation::Replace { path, value } = operation {
                self.translate_leaves(&mut patch, path, value, target_language)
                    .await?;
            }
        }

        Ok(patch)
    }

    /// Append one translated `replace` per leaf of `node`
    async fn translate_leaves(
        &self,
        patch: &mut Patch,
        path: &JsonPointer,
        node: &Node,
        target_language: &str,
    ) -> MtResult<()> {
        for (leaf_path, text) in node.leaves(path) {
            let translation = self.translate_text(&text, target_language).await?;
            debug!(
                "Translated '{}' at {} to '{}' ({})",
                text, leaf_path, translation, target_language
            );
            patch.push(PatchOperation::Replace {
                path: leaf_path,
                value: translation,
            });
        }
        Ok(())
    }

    async fn translate_text(&self, text: &str, target_language: &str) -> MtResult<String> {
        let guarded = protect(text);
        let translated = self
            .translator
            .translate(&guarded, self.source_language, target_language)
            .await?;
        Ok(unprotect(&translated))
    }
}
