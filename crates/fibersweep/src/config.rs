//! Sweep and model descriptions read from disk.
//!
//! A sweep file is YAML:
//!
//! ```yaml
//! name: thickness
//! steps: 3
//! variables:
//!   - path: layer.thickness
//!     start: 50
//!     end: 100
//! storage:
//!   optics: [R, kz]
//!   averaging: both
//! ```
//!
//! Models are YAML or JSON value trees; JSON models may carry tagged arrays.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fibersweep_core::codec;
use fibersweep_core::{SaveFormat, StorageConfig, SweepError, SweepSettings, SweepSpec, Value};

/// Error types for loading descriptions
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Sweep(SweepError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::Sweep(e) => write!(f, "Invalid sweep: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Sweep(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SweepError> for ConfigError {
    fn from(e: SweepError) -> Self {
        ConfigError::Sweep(e)
    }
}

/// One swept variable as written in a sweep file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub path: String,
    pub start: f64,
    pub end: f64,
}

/// Contents of a sweep file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepFile {
    pub name: String,
    pub steps: usize,
    pub key_title: String,
    pub notes: String,
    pub restore: bool,
    pub variables: Vec<VariableEntry>,
    pub storage: StorageConfig,
    /// Newline-delimited attribute paths, merged after `storage.additional`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_text: Option<String>,
    pub format: SaveFormat,
}

impl Default for SweepFile {
    fn default() -> Self {
        let settings = SweepSettings::default();
        Self {
            name: settings.name,
            steps: 1,
            key_title: settings.key_title,
            notes: settings.notes,
            restore: settings.restore_after_run,
            variables: Vec::new(),
            storage: settings.storage,
            additional_text: None,
            format: settings.save_format,
        }
    }
}

impl SweepFile {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse sweep file: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Build the `SweepSpec` and run settings described by this file
    pub fn build(&self) -> Result<(SweepSpec, SweepSettings), ConfigError> {
        let mut spec = SweepSpec::new(self.steps)?;
        for var in &self.variables {
            spec.add(var.path.as_str(), var.start, var.end)?;
        }

        let mut storage = self.storage.clone();
        if let Some(text) = &self.additional_text {
            let mut combined = storage.additional.join("\n");
            combined.push('\n');
            combined.push_str(text);
            storage.set_additional_text(&combined);
        }

        let settings = SweepSettings {
            name: self.name.clone(),
            key_title: self.key_title.clone(),
            notes: self.notes.clone(),
            restore_after_run: self.restore,
            storage,
            save_format: self.format,
        };
        Ok((spec, settings))
    }
}

/// Load a model value tree. `.json` files go through the array codec,
/// anything else is read as YAML.
pub fn load_model(path: &Path) -> Result<Value, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("Failed to read {}: {e}", path.display())))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        return Ok(codec::from_str(&content)?);
    }

    let tree: serde_json::Value = serde_saphyr::from_str(&content)
        .map_err(|e| ConfigError::Parse(format!("Failed to parse model: {e}")))?;
    Ok(codec::decode(tree)?)
}

/// Get the default data directory path (~/.fibersweep/)
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fibersweep")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibersweep_core::sweep::{Averaging, LayerStorage};
    use tempfile::tempdir;

    const SWEEP: &str = "\
name: thickness
steps: 3
key_title: d
variables:
  - path: layer.thickness
    start: 50.0
    end: 100.0
storage:
  optics: [R, kz]
  averaging: both
  layers: all_layers
  additional: [material.vfrac]
additional_text: |
  layer.index
  material.vfrac
format: binary
";

    #[test]
    fn test_parse_sweep_file() {
        let file = SweepFile::from_yaml(SWEEP).unwrap();
        assert_eq!(file.steps, 3);
        assert!(file.restore);
        assert_eq!(file.storage.averaging, Averaging::Both);
        assert_eq!(file.storage.layers, LayerStorage::AllLayers);
        assert_eq!(file.format, SaveFormat::Binary);

        let (spec, settings) = file.build().unwrap();
        assert_eq!(spec.bindings()[0].sequence(), &[50.0, 75.0, 100.0]);
        assert_eq!(settings.step_key(2), "2_d");
        assert_eq!(
            settings.storage.additional,
            vec!["material.vfrac", "layer.index"]
        );
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let file = SweepFile::from_yaml("variables: []\n").unwrap();
        assert_eq!(file, SweepFile::default());
        let (spec, settings) = file.build().unwrap();
        assert!(spec.is_empty());
        assert_eq!(settings, SweepSettings::default());
    }

    #[test]
    fn test_zero_steps_rejected() {
        let file = SweepFile::from_yaml("steps: 0\n").unwrap();
        assert!(matches!(
            file.build(),
            Err(ConfigError::Sweep(SweepError::InvalidRange { .. }))
        ));
    }

    #[test]
    fn test_load_yaml_and_json_models() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("fiber.yaml");
        fs::write(&yaml, "layer:\n  thickness: 60.0\n  name: core\n").unwrap();
        let model = load_model(&yaml).unwrap();
        assert_eq!(
            model.get("layer").and_then(|l| l.get("thickness")),
            Some(&Value::Float(60.0))
        );

        let json = dir.path().join("fiber.json");
        fs::write(&json, r#"{"layer": {"thickness": 60.0}}"#).unwrap();
        assert_eq!(
            load_model(&json).unwrap(),
            Value::from([("layer", Value::from([("thickness", Value::Float(60.0))]))])
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            SweepFile::load(&dir.path().join("none.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
