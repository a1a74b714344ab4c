//! Expansion of logical optical attribute names into concrete names.
//!
//! Some quantities exist once per angle (`R`), others once per layer and
//! are named `<attr>_L<k>` (`kz_L0`, `kz_L1`, ...). Callers request both
//! kinds by their logical name.

use crate::error::{Result, SweepError};

/// Separator between a per-layer attribute and its layer index
pub const LAYER_SUFFIX: &str = "L";

/// Concrete name of layer `index` of a per-layer attribute
#[must_use]
pub fn layer_name(attr: &str, index: usize) -> String {
    format!("{attr}_{LAYER_SUFFIX}{index}")
}

/// Expand `attr` against the names currently present in the response.
///
/// Returns `[attr]` when the name itself is present, otherwise the ordered
/// per-layer names for layers `0..layer_count` when every one of them is
/// present.
pub fn resolve(attr: &str, present: &[String], layer_count: usize) -> Result<Vec<String>> {
    let has = |name: &str| present.iter().any(|p| p == name);

    if has(attr) {
        return Ok(vec![attr.to_string()]);
    }

    let per_layer: Vec<String> = (0..layer_count).map(|k| layer_name(attr, k)).collect();
    if !per_layer.is_empty() && per_layer.iter().all(|name| has(name)) {
        return Ok(per_layer);
    }

    Err(SweepError::UnknownAttribute(attr.to_string()))
}

/// Expand every requested attribute, preserving request order
pub fn resolve_all(attrs: &[String], present: &[String], layer_count: usize) -> Result<Vec<String>> {
    let mut flat = Vec::new();
    for attr in attrs {
        flat.extend(resolve(attr, present, layer_count)?);
    }
    Ok(flat)
}
