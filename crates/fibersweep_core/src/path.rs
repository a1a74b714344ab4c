//! Dotted attribute paths on the model graph
//!
//! `"selected_layer.material.vfrac"` walks `selected_layer` and `material` as
//! sub-objects and reads or writes the leaf `vfrac`. Only attribute lookups
//! are supported, never collection indexing. Every failure is returned as
//! [`SweepError::PathNotFound`] or [`SweepError::TypeMismatch`].

use crate::error::{AttributeError, Result, SweepError};
use crate::model::{ModelNode, Value};

fn not_found(path: &str, segment: &str) -> SweepError {
    SweepError::PathNotFound {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}

/// Split a path into its parent segments and the leaf name.
fn split(path: &str) -> Result<(Vec<&str>, &str)> {
    let mut segments: Vec<&str> = path.split('.').collect();
    if let Some(empty) = segments.iter().find(|s| s.trim().is_empty()) {
        return Err(not_found(path, empty));
    }
    // split('.') always yields at least one segment
    let leaf = segments.pop().unwrap_or_default();
    Ok((segments, leaf))
}

fn walk<'a>(node: &'a dyn ModelNode, segments: &[&str], path: &str) -> Result<&'a dyn ModelNode> {
    match segments.split_first() {
        None => Ok(node),
        Some((head, rest)) => {
            let child = node.child(head).ok_or_else(|| not_found(path, head))?;
            walk(child, rest, path)
        }
    }
}

fn walk_mut<'a>(
    node: &'a mut dyn ModelNode,
    segments: &[&str],
    path: &str,
) -> Result<&'a mut dyn ModelNode> {
    match segments.split_first() {
        None => Ok(node),
        Some((head, rest)) => {
            let child = node.child_mut(head).ok_or_else(|| not_found(path, head))?;
            walk_mut(child, rest, path)
        }
    }
}

/// Read the attribute at `path`.
pub fn get(root: &dyn ModelNode, path: &str) -> Result<Value> {
    let (parents, leaf) = split(path)?;
    walk(root, &parents, path)?
        .attribute(leaf)
        .ok_or_else(|| not_found(path, leaf))
}

/// Overwrite the attribute at `path`. Missing intermediate objects are never
/// created.
pub fn set(root: &mut dyn ModelNode, path: &str, value: Value) -> Result<()> {
    let (parents, leaf) = split(path)?;
    walk_mut(root, &parents, path)?
        .set_attribute(leaf, value)
        .map_err(|e| match e {
            AttributeError::Missing => not_found(path, leaf),
            AttributeError::Type { expected } => SweepError::TypeMismatch {
                path: path.to_string(),
                expected,
            },
        })
}

/// Whether `path` currently resolves on `root`.
pub fn exists(root: &dyn ModelNode, path: &str) -> bool {
    get(root, path).is_ok()
}
