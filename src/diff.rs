//! Structural diff between two localization trees
//!
//! Compares two [`KeyValueTree`] snapshots key by key and produces an ordered
//! edit script that turns the old tree into the new one. Keys are matched by
//! name on every object level:
//!
//! - a key only in the old tree is a [`DiffOperation::Remove`],
//! - a key only in the new tree is a [`DiffOperation::Add`],
//! - a key in both with a different leaf (or a leaf turned object, or the
//!   reverse) is a [`DiffOperation::Replace`]; two objects are compared
//!   recursively.
//!
//! Key order is not part of the comparison. Operations are emitted per object
//! level in old key order (removals and nested changes), followed by
//! additions in new key order.
//!
//! Rename and duplicate detection can be enabled with [`DiffOptions`]; they
//! collapse matching removal/addition pairs into [`DiffOperation::Move`] and
//! additions of an unchanged value into [`DiffOperation::Copy`].

use crate::pointer::JsonPointer;
use crate::tree::{KeyValueTree, Node};
use std::collections::HashSet;
use std::fmt;

/// A single edit produced by comparing two trees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOperation {
    /// A key that only exists in the new tree
    Add { path: JsonPointer, value: Node },
    /// A key that only exists in the old tree
    Remove { path: JsonPointer },
    /// A key whose value differs between the trees
    Replace { path: JsonPointer, value: Node },
    /// A value removed at `from` and added unchanged at `path`
    Move { from: JsonPointer, path: JsonPointer },
    /// A value added at `path` that equals an unchanged value at `from`
    Copy { from: JsonPointer, path: JsonPointer },
}

impl DiffOperation {
    /// Target location of the operation
    pub fn path(&self) -> &JsonPointer {
        match self {
            DiffOperation::Add { path, .. }
            | DiffOperation::Remove { path }
            | DiffOperation::Replace { path, .. }
            | DiffOperation::Move { path, .. }
            | DiffOperation::Copy { path, .. } => path,
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            DiffOperation::Add { .. } => "add",
            DiffOperation::Remove { .. } => "remove",
            DiffOperation::Replace { .. } => "replace",
            DiffOperation::Move { .. } => "move",
            DiffOperation::Copy { .. } => "copy",
        }
    }
}

impl fmt::Display for DiffOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffOperation::Move { from, path } | DiffOperation::Copy { from, path } => {
                write!(f, "{} {} -> {}", self.op_name(), from, path)
            }
            _ => write!(f, "{} {}", self.op_name(), self.path()),
        }
    }
}

/// Post-processing switches for [`diff_with`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffOptions {
    /// Collapse a removal and an addition of an equal value into a move
    pub detect_moves: bool,
    /// Turn an addition of a value that exists unchanged elsewhere into a copy
    pub detect_copies: bool,
}

/// Compute the edit script from `old` to `new` using only add/remove/replace
pub fn diff(old: &KeyValueTree, new: &KeyValueTree) -> Vec<DiffOperation> {
    diff_with(old, new, DiffOptions::default())
}

/// Compute the edit script from `old` to `new` with optional move/copy detection
pub fn diff_with(old: &KeyValueTree, new: &KeyValueTree, options: DiffOptions) -> Vec<DiffOperation> {
    let mut operations = Vec::new();
    diff_objects(old, new, &JsonPointer::root(), &mut operations);

    if options.detect_moves {
        operations = collapse_moves(old, operations);
    }
    if options.detect_copies {
        operations = collapse_copies(old, new, operations);
    }
    operations
}

fn diff_objects(
    old: &KeyValueTree,
    new: &KeyValueTree,
    base: &JsonPointer,
    operations: &mut Vec<DiffOperation>,
) {
    for (key, old_node) in old.iter() {
        let path = base.child(key);
        match new.get_key(key) {
            Some(new_node) => diff_nodes(old_node, new_node, path, operations),
            None => operations.push(DiffOperation::Remove { path }),
        }
    }

    for (key, new_node) in new.iter() {
        if !old.contains_key(key) {
            operations.push(DiffOperation::Add {
                path: base.child(key),
                value: new_node.clone(),
            });
        }
    }
}

fn diff_nodes(old: &Node, new: &Node, path: JsonPointer, operations: &mut Vec<DiffOperation>) {
    match (old, new) {
        (Node::Object(old_tree), Node::Object(new_tree)) => {
            diff_objects(old_tree, new_tree, &path, operations)
        }
        _ if old == new => {}
        _ => operations.push(DiffOperation::Replace {
            path,
            value: new.clone(),
        }),
    }
}

/// Match removals and additions carrying the same value
///
/// The move takes the position of the addition; the matched removal is
/// dropped, so the source still exists when the move runs.
fn collapse_moves(old: &KeyValueTree, operations: Vec<DiffOperation>) -> Vec<DiffOperation> {
    let removals: Vec<(usize, &JsonPointer, &Node)> = operations
        .iter()
        .enumerate()
        .filter_map(|(i, op)| match op {
            DiffOperation::Remove { path } => old.get(path).map(|node| (i, path, node)),
            _ => None,
        })
        .collect();

    let mut matched_removals = HashSet::new();
    let mut moves = Vec::with_capacity(operations.len());
    for op in &operations {
        if let DiffOperation::Add { path, value } = op {
            let candidate = removals
                .iter()
                .find(|(i, _, node)| !matched_removals.contains(i) && *node == value);
            if let Some((i, from, _)) = candidate {
                matched_removals.insert(*i);
                moves.push(Some(DiffOperation::Move {
                    from: (*from).clone(),
                    path: path.clone(),
                }));
                continue;
            }
        }
        moves.push(None);
    }

    operations
        .into_iter()
        .zip(moves)
        .enumerate()
        .filter(|(i, _)| !matched_removals.contains(i))
        .map(|(_, (op, replacement))| replacement.unwrap_or(op))
        .collect()
}

/// Replace additions of a value that exists unchanged in both trees
fn collapse_copies(
    old: &KeyValueTree,
    new: &KeyValueTree,
    operations: Vec<DiffOperation>,
) -> Vec<DiffOperation> {
    let unchanged: Vec<(JsonPointer, &Node)> = old
        .walk()
        .into_iter()
        .filter(|(path, node)| new.get(path) == Some(*node))
        .collect();

    operations
        .into_iter()
        .map(|op| match op {
            DiffOperation::Add { path, value } => {
                match unchanged.iter().find(|(_, node)| **node == value) {
                    Some((from, _)) => DiffOperation::Copy {
                        from: from.clone(),
                        path,
                    },
                    None => DiffOperation::Add { path, value },
                }
            }
            other => other,
        })
        .collect()
}
