//! Configuration types for a parametric sweep.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};
use crate::model::{Value, ValueMap};
use crate::persist::SaveFormat;

/// Evenly spaced values from `start` to `end` inclusive.
///
/// `count == 1` yields `[start]`. Non-finite bounds and `count == 0` are
/// rejected rather than producing an empty sequence.
pub fn generate(start: f64, end: f64, count: usize) -> Result<Vec<f64>> {
    let invalid = |reason: &'static str| SweepError::InvalidRange {
        start,
        end,
        count,
        reason,
    };
    if count < 1 {
        return Err(invalid("step count must be at least 1"));
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(invalid("bounds must be finite numbers"));
    }
    if count == 1 {
        return Ok(vec![start]);
    }

    let last = (count - 1) as f64;
    let step_size = (end - start) / last;
    let mut values: Vec<f64> = if step_size.is_finite() {
        (0..count).map(|i| start + step_size * i as f64).collect()
    } else {
        // The span overflows f64; blend the bounds instead
        (0..count)
            .map(|i| {
                let t = i as f64 / last;
                start * (1.0 - t) + end * t
            })
            .collect()
    };
    // Pin both ends so rounding never drifts off the requested bounds
    values[0] = start;
    values[count - 1] = end;
    Ok(values)
}

/// One swept attribute path and its precomputed value sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableBinding {
    pub path: String,
    start: f64,
    end: f64,
    sequence: Vec<f64>,
}

impl VariableBinding {
    /// Create a binding sweeping `path` from `start` to `end` over `count` steps
    pub fn new(path: impl Into<String>, start: f64, end: f64, count: usize) -> Result<Self> {
        Ok(Self {
            path: path.into(),
            start,
            end,
            sequence: generate(start, end, count)?,
        })
    }

    /// Create a binding from an explicit sequence of values
    pub fn from_values(path: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let (Some(&start), Some(&end)) = (values.first(), values.last()) else {
            return Err(SweepError::InvalidRange {
                start: f64::NAN,
                end: f64::NAN,
                count: 0,
                reason: "explicit sequence is empty",
            });
        };
        Ok(Self {
            path: path.into(),
            start,
            end,
            sequence: values,
        })
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn sequence(&self) -> &[f64] {
        &self.sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    fn regenerate(&mut self, count: usize) -> Result<()> {
        self.sequence = generate(self.start, self.end, count)?;
        Ok(())
    }
}

/// Ordered set of bindings sharing a step count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    steps: usize,
    bindings: Vec<VariableBinding>,
}

impl SweepSpec {
    /// Create an empty spec with the given step count
    pub fn new(steps: usize) -> Result<Self> {
        if steps < 1 {
            return Err(SweepError::InvalidRange {
                start: f64::NAN,
                end: f64::NAN,
                count: steps,
                reason: "step count must be at least 1",
            });
        }
        Ok(Self {
            steps,
            bindings: Vec::new(),
        })
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub fn bindings(&self) -> &[VariableBinding] {
        &self.bindings
    }

    /// Add a binding generated over this spec's step count
    pub fn add(&mut self, path: impl Into<String>, start: f64, end: f64) -> Result<&mut Self> {
        let binding = VariableBinding::new(path, start, end, self.steps)?;
        self.bindings.push(binding);
        Ok(self)
    }

    /// Add a prebuilt binding. Its length is checked at validation time.
    pub fn push(&mut self, binding: VariableBinding) -> &mut Self {
        self.bindings.push(binding);
        self
    }

    /// Remove the first binding for `path`
    pub fn remove(&mut self, path: &str) -> Option<VariableBinding> {
        let index = self.bindings.iter().position(|b| b.path == path)?;
        Some(self.bindings.remove(index))
    }

    /// Change the shared step count and regenerate every sequence from its bounds
    pub fn set_steps(&mut self, steps: usize) -> Result<()> {
        let mut regenerated = self.bindings.clone();
        for binding in &mut regenerated {
            binding.regenerate(steps)?;
        }
        self.bindings = regenerated;
        self.steps = steps;
        Ok(())
    }

    /// Bound attribute paths in binding order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.path.as_str())
    }

    /// `path -> sequence` for every binding
    #[must_use]
    pub fn inputs(&self) -> IndexMap<String, Vec<f64>> {
        self.bindings
            .iter()
            .map(|b| (b.path.clone(), b.sequence.clone()))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// How optical quantities are promoted into the primary table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Averaging {
    /// One `<attr>_avg` entry per attribute
    #[default]
    Average,
    /// One `<attr>_<angle>` entry per attribute per angle
    NotAveraged,
    /// Both of the above
    Both,
}

impl Averaging {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::NotAveraged => "not_averaged",
            Self::Both => "both",
        }
    }

    #[must_use]
    pub fn includes_average(&self) -> bool {
        matches!(self, Self::Average | Self::Both)
    }

    #[must_use]
    pub fn includes_angles(&self) -> bool {
        matches!(self, Self::NotAveraged | Self::Both)
    }
}

/// Which layer subtrees are stored in the deep results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerStorage {
    #[default]
    SelectedLayer,
    AllLayers,
    None,
}

impl LayerStorage {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelectedLayer => "selected_layer",
            Self::AllLayers => "all_layers",
            Self::None => "none",
        }
    }
}

/// What each step stores
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Logical optical quantities to promote (e.g. `R`, `kz`)
    #[serde(default)]
    pub optics: Vec<String>,
    #[serde(default)]
    pub averaging: Averaging,
    /// Deep-copy the full per-angle response table into the results
    #[serde(default)]
    pub store_response_table: bool,
    #[serde(default)]
    pub layers: LayerStorage,
    /// Extra model attribute paths read into the primary table
    #[serde(default)]
    pub additional: Vec<String>,
}

impl StorageConfig {
    /// Set the additional attribute paths from newline-delimited text.
    ///
    /// Blank lines are dropped and duplicates removed, keeping first occurrences.
    pub fn set_additional_text(&mut self, text: &str) {
        let mut paths: Vec<String> = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if !paths.iter().any(|p| p == line) {
                paths.push(line.to_string());
            }
        }
        self.additional = paths;
    }

    /// Summary stored under `about.storage`
    #[must_use]
    pub fn summary(&self) -> ValueMap {
        let strings = |items: &[String]| -> Value {
            Value::List(items.iter().map(|s| Value::from(s.as_str())).collect())
        };
        let mut m = ValueMap::new();
        m.insert("optical_quantities".into(), strings(&self.optics));
        m.insert("angle_averaging".into(), self.averaging.label().into());
        m.insert(
            "store_response_table".into(),
            self.store_response_table.into(),
        );
        m.insert("layer_quantities".into(), strings(&self.additional));
        m.insert("deep_layer_storage".into(), self.layers.label().into());
        m
    }
}

/// Run-level settings that are not part of the swept variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSettings {
    pub name: String,
    /// Suffix of every step key, `"<index>_<key_title>"`
    pub key_title: String,
    pub notes: String,
    /// Restore every bound attribute to its pre-run value afterwards
    pub restore_after_run: bool,
    pub storage: StorageConfig,
    pub save_format: SaveFormat,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            name: "sweep".to_string(),
            key_title: "step".to_string(),
            notes: String::new(),
            restore_after_run: true,
            storage: StorageConfig::default(),
            save_format: SaveFormat::default(),
        }
    }
}

impl SweepSettings {
    /// Key under which step `index` is stored
    #[must_use]
    pub fn step_key(&self, index: usize) -> String {
        format!("{index}_{}", self.key_title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_endpoints_and_length() {
        for count in 2..20 {
            let values = generate(-3.5, 12.25, count).unwrap();
            assert_eq!(values.len(), count);
            assert_eq!(values[0], -3.5);
            assert_eq!(values[count - 1], 12.25);
            assert!(values.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_generate_single_step() {
        assert_eq!(generate(50.0, 100.0, 1).unwrap(), vec![50.0]);
    }

    #[test]
    fn test_generate_descending() {
        assert_eq!(generate(1.0, 0.0, 3).unwrap(), vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_generate_full_f64_range() {
        let values = generate(-f64::MAX, f64::MAX, 3).unwrap();
        assert_eq!(values, vec![-f64::MAX, 0.0, f64::MAX]);

        let values = generate(f64::MAX, -f64::MAX, 5).unwrap();
        assert_eq!(values[0], f64::MAX);
        assert_eq!(values[4], -f64::MAX);
        assert!(values.iter().all(|v| v.is_finite()));
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        assert!(matches!(
            generate(0.0, 1.0, 0),
            Err(SweepError::InvalidRange { .. })
        ));
        assert!(matches!(
            generate(f64::NAN, 1.0, 3),
            Err(SweepError::InvalidRange { .. })
        ));
        assert!(matches!(
            generate(0.0, f64::INFINITY, 3),
            Err(SweepError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_spec_set_steps_regenerates() {
        let mut spec = SweepSpec::new(3).unwrap();
        spec.add("layer.d", 50.0, 100.0).unwrap();
        assert_eq!(spec.bindings()[0].sequence(), &[50.0, 75.0, 100.0]);

        spec.set_steps(5).unwrap();
        assert_eq!(spec.steps(), 5);
        assert_eq!(
            spec.bindings()[0].sequence(),
            &[50.0, 62.5, 75.0, 87.5, 100.0]
        );

        assert!(spec.set_steps(0).is_err());
        assert_eq!(spec.steps(), 5);
    }

    #[test]
    fn test_spec_remove_and_inputs() {
        let mut spec = SweepSpec::new(2).unwrap();
        spec.add("a", 0.0, 1.0).unwrap().add("b", 2.0, 4.0).unwrap();
        assert_eq!(spec.paths().collect::<Vec<_>>(), vec!["a", "b"]);

        let removed = spec.remove("a").unwrap();
        assert_eq!(removed.path, "a");
        assert!(spec.remove("a").is_none());

        let inputs = spec.inputs();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs["b"], vec![2.0, 4.0]);
    }

    #[test]
    fn test_from_values_rejects_empty() {
        assert!(VariableBinding::from_values("a", vec![]).is_err());
        let b = VariableBinding::from_values("a", vec![3.0, 1.0]).unwrap();
        assert_eq!((b.start(), b.end()), (3.0, 1.0));
    }

    #[test]
    fn test_additional_text_dedup_keeps_order() {
        let mut storage = StorageConfig::default();
        storage.set_additional_text("b.x\n\n a.y \nb.x\nc.z\n");
        assert_eq!(storage.additional, vec!["b.x", "a.y", "c.z"]);
    }

    #[test]
    fn test_step_key() {
        let settings = SweepSettings::default();
        assert_eq!(settings.step_key(2), "2_step");
    }
}
