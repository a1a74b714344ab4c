//! Interface to the external optical-response calculator.
//!
//! The engine never constructs or owns an implementation; it is handed one
//! for the duration of a run. Implementations are synchronous and only
//! side-effect the model they are given.

use crate::error::RecomputeError;
use crate::model::{ModelNode, Value, ValueMap};

pub trait OpticalResponse {
    /// Bring the derived optical state in line with the current model inputs
    fn recompute(&mut self, model: &mut dyn ModelNode) -> Result<(), RecomputeError>;

    /// Names of every quantity in the current response table
    fn attribute_names(&self) -> Vec<String>;

    /// Number of layers in the current stack
    fn layer_count(&self) -> usize;

    /// Angles the response is evaluated at
    fn angles(&self) -> Vec<f64>;

    /// Angle-averaged value of `attr`
    fn average_over(&self, attr: &str) -> Result<Value, RecomputeError>;

    /// Value of `attr` at a single angle
    fn value_at(&self, angle: f64, attr: &str) -> Result<Value, RecomputeError>;

    /// Full per-angle response table
    fn response_table(&self) -> Value;

    /// Serialized state of the currently selected layer
    fn serialize_selected_layer(&self) -> Value;

    /// Serialized state of every layer in the stack
    fn serialize_all_layers(&self) -> Value;

    /// Context that does not change across steps (spectral and fiber parameters)
    fn static_context(&self) -> ValueMap {
        ValueMap::new()
    }
}
