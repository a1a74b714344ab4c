//! Parametric sweep: specification, readiness, stepping and output.

mod aggregate;
mod config;
mod engine;
mod flatten;
mod output;
mod snapshot;
mod validate;

pub use aggregate::{
    ALL_LAYERS_KEY, RESPONSE_TABLE_KEY, SELECTED_LAYER_KEY, about_section, angle_key,
    average_key, build_step, static_section,
};
pub use config::{
    Averaging, LayerStorage, StorageConfig, SweepSettings, SweepSpec, VariableBinding, generate,
};
pub use engine::{StartOutcome, SweepEngine, SweepState};
pub use flatten::{LAYER_SUFFIX, layer_name, resolve, resolve_all};
pub use output::{
    ABOUT_KEY, INPUTS_KEY, PRIMARY_KEY, RESULTS_KEY, STATIC_KEY, StepResult, SweepOutput,
};
pub use snapshot::Snapshot;
pub use validate::{ReadinessReport, validate};
