//! Leaf-level patches and their application to a localization tree
//!
//! A [`Patch`] is what remains of a diff after translation has been resolved:
//! only additions, removals and leaf replacements, each carrying its final
//! text. [`apply`] runs the operations in order against a tree:
//!
//! - `Replace` overwrites an existing node in place, keeping its position,
//! - `Add` puts a new key at the end of its parent object,
//! - `Remove` deletes a key and everything below it.
//!
//! Existing keys are never reordered.

use crate::pointer::JsonPointer;
use crate::tree::{KeyValueTree, Node};
use std::fmt;

/// One step of a [`Patch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOperation {
    /// Insert `value` as a new key (appended to the parent)
    Add { path: JsonPointer, value: Node },
    /// Delete the key at `path`
    Remove { path: JsonPointer },
    /// Overwrite the node at `path` with a leaf
    Replace { path: JsonPointer, value: String },
}

impl PatchOperation {
    pub fn path(&self) -> &JsonPointer {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. } => path,
        }
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchOperation::Add { path, .. } => write!(f, "add {}", path),
            PatchOperation::Remove { path } => write!(f, "remove {}", path),
            PatchOperation::Replace { path, value } => write!(f, "replace {} {:?}", path, value),
        }
    }
}

/// Ordered list of operations, applied exactly once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    operations: Vec<PatchOperation>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: PatchOperation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatchOperation> {
        self.operations.iter()
    }

    /// Number of `Replace` operations, i.e. translated leaves
    pub fn replacements(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, PatchOperation::Replace { .. }))
            .count()
    }
}

impl From<Vec<PatchOperation>> for Patch {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Errors raised while applying a patch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("path '{0}' does not exist")]
    PathNotFound(JsonPointer),

    #[error("parent of '{0}' is not an object")]
    ParentNotObject(JsonPointer),

    #[error("operation '{0}' addresses the document root")]
    RootNotAddressable(String),
}

/// Apply `patch` to `tree` in order
///
/// # Errors
/// - [`PatchError::PathNotFound`] when a `Replace` or `Remove` targets a
///   missing key, or an `Add` targets a missing parent
/// - [`PatchError::ParentNotObject`] when a parent on the path is a leaf
/// - [`PatchError::RootNotAddressable`] for operations on the empty path
///
/// Operations before the failing one stay applied.
pub fn apply(patch: &Patch, tree: &mut KeyValueTree) -> Result<(), PatchError> {
    for operation in patch {
        apply_operation(operation, tree)?;
    }
    Ok(())
}

fn apply_operation(operation: &PatchOperation, tree: &mut KeyValueTree) -> Result<(), PatchError> {
    let path = operation.path();
    let (parent_path, key) = path
        .split_last()
        .ok_or_else(|| PatchError::RootNotAddressable(operation.to_string()))?;

    let parent = parent_object(tree, &parent_path, path)?;

    match operation {
        PatchOperation::Add { value, .. } => {
            parent.insert(key, value.clone());
        }
        PatchOperation::Remove { .. } => {
            parent
                .remove(key)
                .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
        }
        PatchOperation::Replace { value, .. } => {
            if !parent.contains_key(key) {
                return Err(PatchError::PathNotFound(path.clone()));
            }
            parent.insert(key, Node::leaf(value.as_str()));
        }
    }
    Ok(())
}

fn parent_object<'t>(
    tree: &'t mut KeyValueTree,
    parent_path: &JsonPointer,
    path: &JsonPointer,
) -> Result<&'t mut KeyValueTree, PatchError> {
    if parent_path.is_root() {
        return Ok(tree);
    }
    match tree.get(parent_path) {
        None => return Err(PatchError::PathNotFound(path.clone())),
        Some(Node::Leaf(_) | Node::Scalar(_)) => {
            return Err(PatchError::ParentNotObject(path.clone()));
        }
        Some(Node::Object(_)) => {}
    }
    tree.object_mut(parent_path)
        .ok_or_else(|| PatchError::PathNotFound(path.clone()))
}
