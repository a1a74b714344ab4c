//! Parametric sweep engine for layered optical fiber models
//!
//! This crate steps one or more numeric attributes of a model through evenly
//! spaced sequences, asks an external optical-response calculator to
//! recompute after every step, and collects the results into a
//! serializable [`SweepOutput`]. It provides:
//! - Dotted attribute paths over any [`ModelNode`] graph
//! - Readiness checks (missing and duplicate bindings)
//! - Snapshot and restore of the swept attributes around a run
//! - Flattening of per-layer quantities (`kz` -> `kz_L0`, `kz_L1`, ...)
//! - An array-aware JSON codec and an opaque binary save format
//!
//! # Example
//!
//! ```ignore
//! use fibersweep_core::{SweepEngine, SweepSettings, SweepSpec};
//!
//! let mut spec = SweepSpec::new(3)?;
//! spec.add("layer.thickness", 50.0, 100.0)?;
//!
//! let mut engine = SweepEngine::new(SweepSettings::default());
//! engine.configure(spec, &model);
//! engine.start(&mut model, &mut optics)?;
//! engine.save(Path::new("thickness"), false)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod codec;
pub mod error;
pub mod optics;
pub mod path;
pub mod persist;
pub mod sweep;
pub mod util;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{Result, SweepError};
pub use model::{Complex, ModelNode, NdArray, Value, ValueMap};
pub use optics::OpticalResponse;
pub use persist::{SaveFormat, SaveOutcome};
pub use sweep::{
    ReadinessReport, StartOutcome, StorageConfig, SweepEngine, SweepOutput, SweepSettings,
    SweepSpec, SweepState,
};
