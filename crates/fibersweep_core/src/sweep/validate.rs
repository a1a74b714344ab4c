//! Readiness checks for a sweep spec against a model.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::SweepSpec;
use crate::model::ModelNode;
use crate::path;

/// Outcome of validating a `SweepSpec`. Derived on demand, never stored with it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub ready: bool,
    /// Paths that do not resolve on the model
    pub missing: BTreeSet<String>,
    /// Paths bound more than once
    pub duplicates: BTreeSet<String>,
    /// Paths whose sequence length differs from the step count
    pub mismatched: BTreeSet<String>,
    pub message: String,
}

impl ReadinessReport {
    pub(crate) fn not_configured() -> Self {
        Self {
            message: "No sweep configured".to_string(),
            ..Default::default()
        }
    }
}

fn join(paths: &BTreeSet<String>) -> String {
    paths.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Check every binding of `spec` against `model`.
///
/// Problems are reported, never raised: a spec with missing, duplicate or
/// mismatched bindings yields `ready == false` and a message naming them.
pub fn validate(spec: &SweepSpec, model: &dyn ModelNode) -> ReadinessReport {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    for p in spec.paths() {
        *counts.entry(p).or_default() += 1;
    }

    let duplicates: BTreeSet<String> = counts
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(p, _)| (*p).to_string())
        .collect();

    let missing: BTreeSet<String> = counts
        .keys()
        .filter(|p| !path::exists(model, p))
        .map(|p| (*p).to_string())
        .collect();

    let mismatched: BTreeSet<String> = spec
        .bindings()
        .iter()
        .filter(|b| b.len() != spec.steps())
        .map(|b| b.path.clone())
        .collect();

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("Could not find required attributes: {}", join(&missing)));
    }
    if !duplicates.is_empty() {
        problems.push(format!(
            "Duplicate sweep attribute(s) found: {}",
            join(&duplicates)
        ));
    }
    if !mismatched.is_empty() {
        problems.push(format!(
            "Sequence length differs from step count ({}): {}",
            spec.steps(),
            join(&mismatched)
        ));
    }

    let ready = problems.is_empty();
    let message = if ready {
        "Sweep ready: all attributes found".to_string()
    } else {
        problems.join("; ")
    };

    ReadinessReport {
        ready,
        missing,
        duplicates,
        mismatched,
        message,
    }
}
