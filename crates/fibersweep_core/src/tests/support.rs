//! Stub model and optical collaborator shared by the scenario tests

use std::cell::Cell;

use crate::error::{AttributeError, RecomputeError};
use crate::model::{ModelNode, NdArray, Value, ValueMap};
use crate::optics::OpticalResponse;
use crate::path;

fn float_of(value: &Value) -> Result<f64, AttributeError> {
    value
        .as_f64()
        .ok_or(AttributeError::Type { expected: "float" })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub thickness: f64,
    pub index: f64,
}

impl ModelNode for Layer {
    fn child(&self, _name: &str) -> Option<&dyn ModelNode> {
        None
    }

    fn child_mut(&mut self, _name: &str) -> Option<&mut dyn ModelNode> {
        None
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "thickness" => Some(self.thickness.into()),
            "index" => Some(self.index.into()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "thickness" => self.thickness = float_of(&value)?,
            "index" => self.index = float_of(&value)?,
            _ => return Err(AttributeError::Missing),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub vfrac: f64,
}

impl ModelNode for Material {
    fn child(&self, _name: &str) -> Option<&dyn ModelNode> {
        None
    }

    fn child_mut(&mut self, _name: &str) -> Option<&mut dyn ModelNode> {
        None
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(self.name.as_str().into()),
            "vfrac" => Some(self.vfrac.into()),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            "vfrac" => self.vfrac = float_of(&value)?,
            "name" => {
                self.name = value
                    .as_str()
                    .ok_or(AttributeError::Type { expected: "string" })?
                    .to_string();
            }
            _ => return Err(AttributeError::Missing),
        }
        Ok(())
    }
}

/// Typed model exposing `layer.{thickness,index}` and `material.{name,vfrac}`
#[derive(Debug, Clone, PartialEq)]
pub struct StubModel {
    pub layer: Layer,
    pub material: Material,
}

impl Default for StubModel {
    fn default() -> Self {
        Self {
            layer: Layer {
                thickness: 60.0,
                index: 1.45,
            },
            material: Material {
                name: "silica".to_string(),
                vfrac: 0.1,
            },
        }
    }
}

impl ModelNode for StubModel {
    fn child(&self, name: &str) -> Option<&dyn ModelNode> {
        match name {
            "layer" => Some(&self.layer),
            "material" => Some(&self.material),
            _ => None,
        }
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut dyn ModelNode> {
        match name {
            "layer" => Some(&mut self.layer),
            "material" => Some(&mut self.material),
            _ => None,
        }
    }

    fn attribute(&self, _name: &str) -> Option<Value> {
        None
    }

    fn set_attribute(&mut self, _name: &str, _value: Value) -> Result<(), AttributeError> {
        Err(AttributeError::Missing)
    }
}

/// Same layout as [`StubModel`] as a generic value tree
pub fn value_model() -> Value {
    Value::from([
        (
            "layer",
            Value::from([("thickness", Value::Float(60.0)), ("index", Value::Float(1.45))]),
        ),
        (
            "material",
            Value::from([("name", Value::from("silica")), ("vfrac", Value::Float(0.1))]),
        ),
    ])
}

/// Flat value tree whose leaf reads start failing after `reads` successes
#[derive(Debug)]
pub struct FlakyModel {
    pub tree: Value,
    reads: Cell<usize>,
}

impl FlakyModel {
    pub fn new(tree: Value, reads: usize) -> Self {
        Self {
            tree,
            reads: Cell::new(reads),
        }
    }
}

impl ModelNode for FlakyModel {
    fn child(&self, name: &str) -> Option<&dyn ModelNode> {
        self.tree.child(name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut dyn ModelNode> {
        self.tree.child_mut(name)
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        let left = self.reads.get();
        if left == 0 {
            return None;
        }
        self.reads.set(left - 1);
        self.tree.attribute(name)
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        self.tree.set_attribute(name, value)
    }
}

pub const ANGLES: [f64; 2] = [0.0, 45.0];
pub const LAYERS: usize = 3;

/// Collaborator whose response scales linearly with `layer.thickness`
#[derive(Debug, Default)]
pub struct StubOptics {
    /// Thickness seen by every recompute call, in call order
    pub history: Vec<f64>,
    /// Fail the recompute call with this zero-based index
    pub fail_at: Option<usize>,
    /// Panic in the recompute call with this zero-based index
    pub panic_at: Option<usize>,
    /// Turn `layer.thickness` into a sub-object in the recompute call with this
    /// index. Applied before `fail_at`, so both may name the same call.
    pub clobber_at: Option<usize>,
    /// Thickness seen by the last successful recompute
    pub thickness: f64,
}

impl StubOptics {
    pub fn calls(&self) -> usize {
        self.history.len()
    }

    fn base(attr: &str) -> Option<f64> {
        match attr {
            "R" => Some(0.1),
            "T" => Some(0.9),
            "kz_L0" => Some(1.0),
            "kz_L1" => Some(2.0),
            "kz_L2" => Some(3.0),
            _ => None,
        }
    }
}

impl OpticalResponse for StubOptics {
    fn recompute(&mut self, model: &mut dyn ModelNode) -> Result<(), RecomputeError> {
        let call = self.history.len();
        let thickness = path::get(model, "layer.thickness")
            .ok()
            .and_then(|v| v.as_f64())
            .ok_or_else(|| RecomputeError::new("layer thickness unavailable"))?;
        self.history.push(thickness);

        if self.panic_at == Some(call) {
            panic!("solver panicked at call {call}");
        }
        if self.clobber_at == Some(call) {
            path::set(model, "layer.thickness", Value::map())
                .map_err(|e| RecomputeError::new(e.to_string()))?;
        }
        if self.fail_at == Some(call) {
            return Err(RecomputeError::new(format!("solver diverged at call {call}")));
        }

        self.thickness = thickness;
        Ok(())
    }

    fn attribute_names(&self) -> Vec<String> {
        ["R", "T", "kz_L0", "kz_L1", "kz_L2"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn layer_count(&self) -> usize {
        LAYERS
    }

    fn angles(&self) -> Vec<f64> {
        ANGLES.to_vec()
    }

    fn average_over(&self, attr: &str) -> Result<Value, RecomputeError> {
        Self::base(attr)
            .map(|b| Value::Float(b * self.thickness / 100.0))
            .ok_or_else(|| RecomputeError::new(format!("no quantity '{attr}'")))
    }

    fn value_at(&self, angle: f64, attr: &str) -> Result<Value, RecomputeError> {
        let avg = self.average_over(attr)?.as_f64().unwrap_or_default();
        Ok(Value::Float(avg + angle / 1000.0))
    }

    fn response_table(&self) -> Value {
        Value::from([
            ("angles", Value::Array(NdArray::from(ANGLES.to_vec()))),
            (
                "R",
                Value::Array(NdArray::from(
                    ANGLES
                        .iter()
                        .map(|a| 0.1 * self.thickness / 100.0 + a / 1000.0)
                        .collect::<Vec<_>>(),
                )),
            ),
        ])
    }

    fn serialize_selected_layer(&self) -> Value {
        Value::from([("thickness", Value::Float(self.thickness))])
    }

    fn serialize_all_layers(&self) -> Value {
        Value::List(
            (0..LAYERS)
                .map(|k| {
                    Value::from([
                        ("layer", Value::from(k)),
                        ("thickness", Value::Float(self.thickness)),
                    ])
                })
                .collect(),
        )
    }

    fn static_context(&self) -> ValueMap {
        let mut ctx = ValueMap::new();
        ctx.insert(
            "fiber".into(),
            Value::from([("core_radius", Value::Float(62.5))]),
        );
        ctx
    }
}
