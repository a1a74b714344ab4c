//! Object-graph seam used by attribute paths
//!
//! A model is any tree of nodes that can hand out named sub-objects and read
//! or overwrite named leaf attributes. Typed models implement [`ModelNode`] by
//! hand; [`Value`] mappings implement it so that generic trees loaded from
//! files can be swept too.

use crate::error::AttributeError;

use super::value::Value;

/// A node of the mutable model graph
pub trait ModelNode {
    /// Sub-object reachable through attribute `name`
    fn child(&self, name: &str) -> Option<&dyn ModelNode>;

    /// Mutable sub-object reachable through attribute `name`
    fn child_mut(&mut self, name: &str) -> Option<&mut dyn ModelNode>;

    /// Current value of leaf attribute `name`
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Overwrite an existing leaf attribute. Never creates attributes.
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError>;
}

impl ModelNode for Value {
    fn child(&self, name: &str) -> Option<&dyn ModelNode> {
        match self {
            Value::Map(m) => m
                .get(name)
                .filter(|v| matches!(v, Value::Map(_)))
                .map(|v| v as &dyn ModelNode),
            _ => None,
        }
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut dyn ModelNode> {
        match self {
            Value::Map(m) => m
                .get_mut(name)
                .filter(|v| matches!(v, Value::Map(_)))
                .map(|v| v as &mut dyn ModelNode),
            _ => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        let Value::Map(m) = self else {
            return Err(AttributeError::Missing);
        };
        let slot = m.get_mut(name).ok_or(AttributeError::Missing)?;
        // Sub-objects are never replaced by leaves
        if matches!(slot, Value::Map(_)) && !matches!(value, Value::Map(_)) {
            return Err(AttributeError::Type { expected: "map" });
        }
        *slot = value;
        Ok(())
    }
}
