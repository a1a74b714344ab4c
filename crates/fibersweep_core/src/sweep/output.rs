//! Sweep output types
//!
//! A run produces five sections:
//! - `static`: context that does not change across steps
//! - `about`: run metadata and the storage configuration in effect
//! - `primary`: per-step summary quantities, keyed `"<index>_<key_title>"`
//! - `results`: per-step deep subtrees under the same keys
//! - `inputs`: the swept `path -> sequence` table

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::model::{NdArray, Value, ValueMap};

pub const STATIC_KEY: &str = "static";
pub const ABOUT_KEY: &str = "about";
pub const PRIMARY_KEY: &str = "primary";
pub const RESULTS_KEY: &str = "results";
pub const INPUTS_KEY: &str = "inputs";

/// Everything recorded for a single step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepResult {
    pub index: usize,
    /// Flat `name -> scalar|array` summary
    pub primary: ValueMap,
    /// Nested subtrees (response table, layer state)
    pub deep: ValueMap,
}

/// Aggregated output of one completed sweep
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepOutput {
    #[serde(rename = "static")]
    pub static_context: ValueMap,
    pub about: ValueMap,
    pub primary: IndexMap<String, ValueMap>,
    pub results: IndexMap<String, ValueMap>,
    pub inputs: IndexMap<String, Vec<f64>>,
}

impl SweepOutput {
    /// Whether the output holds data worth saving.
    ///
    /// True when any of `primary`, `results` or `static` is non-empty. A run
    /// configured to store nothing is reported as incomplete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !(self.primary.is_empty() && self.results.is_empty() && self.static_context.is_empty())
    }

    /// Append a step under `key`
    pub fn push_step(&mut self, key: String, step: StepResult) {
        self.primary.insert(key.clone(), step.primary);
        self.results.insert(key, step.deep);
    }

    /// Step keys in step order
    pub fn step_keys(&self) -> impl Iterator<Item = &str> {
        self.primary.keys().map(String::as_str)
    }

    /// Convert to a value tree. Input sequences become `float64` arrays.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let nested = |tables: &IndexMap<String, ValueMap>| -> Value {
            Value::Map(
                tables
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::Map(v.clone())))
                    .collect(),
            )
        };

        let inputs: ValueMap = self
            .inputs
            .iter()
            .map(|(k, seq)| (k.clone(), Value::Array(NdArray::from(seq.clone()))))
            .collect();

        let mut root = ValueMap::new();
        root.insert(STATIC_KEY.into(), Value::Map(self.static_context.clone()));
        root.insert(ABOUT_KEY.into(), Value::Map(self.about.clone()));
        root.insert(PRIMARY_KEY.into(), nested(&self.primary));
        root.insert(RESULTS_KEY.into(), nested(&self.results));
        root.insert(INPUTS_KEY.into(), Value::Map(inputs));
        Value::Map(root)
    }

    /// Rebuild from a value tree produced by [`SweepOutput::to_value`].
    ///
    /// Absent sections are left empty; sections of the wrong shape fail.
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = value.kind();
        let Value::Map(mut root) = value else {
            return Err(SweepError::Serialization(format!(
                "sweep output must be a map, found {kind}"
            )));
        };

        let mut section = |key: &str| -> Result<ValueMap> {
            match root.shift_remove(key) {
                None => Ok(ValueMap::new()),
                Some(Value::Map(m)) => Ok(m),
                Some(other) => Err(SweepError::Serialization(format!(
                    "section '{key}' must be a map, found {}",
                    other.kind()
                ))),
            }
        };

        let static_context = section(STATIC_KEY)?;
        let about = section(ABOUT_KEY)?;
        let primary = steps_table(PRIMARY_KEY, section(PRIMARY_KEY)?)?;
        let results = steps_table(RESULTS_KEY, section(RESULTS_KEY)?)?;
        let inputs = section(INPUTS_KEY)?
            .into_iter()
            .map(|(path, v)| sequence_of(&path, &v).map(|seq| (path, seq)))
            .collect::<Result<IndexMap<_, _>>>()?;

        Ok(Self {
            static_context,
            about,
            primary,
            results,
            inputs,
        })
    }
}

fn steps_table(section: &str, table: ValueMap) -> Result<IndexMap<String, ValueMap>> {
    table
        .into_iter()
        .map(|(key, v)| match v {
            Value::Map(m) => Ok((key, m)),
            other => Err(SweepError::Serialization(format!(
                "{section} entry '{key}' must be a map, found {}",
                other.kind()
            ))),
        })
        .collect()
}

fn sequence_of(path: &str, value: &Value) -> Result<Vec<f64>> {
    let bad = || SweepError::Serialization(format!("input '{path}' is not a numeric sequence"));
    match value {
        Value::Array(a) => a.to_f64_vec().ok_or_else(bad),
        Value::List(items) => items.iter().map(|v| v.as_f64().ok_or_else(bad)).collect(),
        _ => Err(bad()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SweepOutput {
        let mut out = SweepOutput::default();
        out.static_context
            .insert("spectral".into(), Value::from([("points", Value::Int(3))]));
        out.about.insert("name".into(), Value::from("demo"));
        for i in 0..3 {
            let mut step = StepResult {
                index: i,
                ..Default::default()
            };
            step.primary.insert("R_avg".into(), Value::Float(i as f64 / 10.0));
            out.push_step(format!("{i}_step"), step);
        }
        out.inputs.insert("layer.d".into(), vec![50.0, 75.0, 100.0]);
        out
    }

    #[test]
    fn test_completeness_predicate() {
        assert!(!SweepOutput::default().is_complete());

        let mut only_static = SweepOutput::default();
        only_static
            .static_context
            .insert("fiber".into(), Value::Null);
        assert!(only_static.is_complete());

        // Inputs alone do not count
        let mut only_inputs = SweepOutput::default();
        only_inputs.inputs.insert("a".into(), vec![1.0]);
        assert!(!only_inputs.is_complete());
    }

    #[test]
    fn test_value_conversion_preserves_sections() {
        let out = sample();
        let tree = out.to_value();
        let keys: Vec<_> = tree.as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["static", "about", "primary", "results", "inputs"]);

        let back = SweepOutput::from_value(tree).unwrap();
        assert_eq!(back, out);
        assert_eq!(
            back.step_keys().collect::<Vec<_>>(),
            vec!["0_step", "1_step", "2_step"]
        );
    }

    #[test]
    fn test_inputs_accept_plain_lists() {
        let tree = Value::from([(
            "inputs",
            Value::from([(
                "a",
                Value::List(vec![Value::Int(1), Value::Float(2.5)]),
            )]),
        )]);
        let out = SweepOutput::from_value(tree).unwrap();
        assert_eq!(out.inputs["a"], vec![1.0, 2.5]);
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let tree = Value::from([("primary", Value::Int(1))]);
        assert!(matches!(
            SweepOutput::from_value(tree),
            Err(SweepError::Serialization(_))
        ));
        assert!(SweepOutput::from_value(Value::Null).is_err());
    }
}
