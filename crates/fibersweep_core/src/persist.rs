//! Saving and loading sweep outputs.
//!
//! Two formats are supported, selected by file extension:
//! - [`SaveFormat::Tree`] (`.json`): the portable array-aware tree from [`crate::codec`]
//! - [`SaveFormat::Binary`] (`.fsim`): an opaque bincode image of the whole output

use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::{Result, SweepError};
use crate::sweep::SweepOutput;
use crate::util::io::{atomic_write, atomic_write_bytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveFormat {
    #[default]
    Tree,
    Binary,
}

impl SaveFormat {
    /// File extension without the leading dot
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Tree => "json",
            SaveFormat::Binary => "fsim",
        }
    }

    /// Format matching the extension of `path`, if any
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(OsStr::to_str)? {
            "json" => Some(SaveFormat::Tree),
            "fsim" => Some(SaveFormat::Binary),
            _ => None,
        }
    }
}

/// What [`save`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    /// The target exists and overwriting was not confirmed
    OverwriteDeclined(PathBuf),
    /// The output holds nothing worth saving
    Incomplete,
}

/// Apply the extension rule: a present extension must match `format`, an
/// absent one is appended.
pub fn resolve_save_path(path: &Path, format: SaveFormat) -> Result<PathBuf> {
    match path.extension() {
        None => Ok(path.with_extension(format.extension())),
        Some(ext) if ext == format.extension() => Ok(path.to_path_buf()),
        Some(ext) => Err(SweepError::Configuration(format!(
            "file extension '.{}' does not match the '.{}' save format",
            ext.to_string_lossy(),
            format.extension()
        ))),
    }
}

/// Save `output` to `path`.
///
/// Checks run in order: extension, overwrite confirmation, completeness.
/// The file is written atomically.
pub fn save(
    output: &SweepOutput,
    path: &Path,
    format: SaveFormat,
    confirm_overwrite: bool,
) -> Result<SaveOutcome> {
    let path = resolve_save_path(path, format)?;

    if path.exists() && !confirm_overwrite {
        tracing::info!(path = %path.display(), "Not overwriting existing file");
        return Ok(SaveOutcome::OverwriteDeclined(path));
    }

    if !output.is_complete() {
        tracing::warn!(
            path = %path.display(),
            "Sweep output is empty; run a sweep before saving"
        );
        return Ok(SaveOutcome::Incomplete);
    }

    match format {
        SaveFormat::Tree => atomic_write(&path, &codec::to_string_pretty(&output.to_value())?)?,
        SaveFormat::Binary => atomic_write_bytes(&path, &bincode::serialize(output)?)?,
    }

    tracing::info!(path = %path.display(), "Saved sweep output");
    Ok(SaveOutcome::Saved(path))
}

/// Load an output saved by [`save`], choosing the format from the extension.
pub fn load(path: &Path) -> Result<SweepOutput> {
    let format = SaveFormat::from_path(path).ok_or_else(|| {
        SweepError::Configuration(format!(
            "cannot infer save format of '{}'",
            path.display()
        ))
    })?;
    let file = std::fs::File::open(path)?;
    read_output(std::io::BufReader::new(file), format)
}

/// Write `output` to any byte sink
pub fn write_output<W: Write>(output: &SweepOutput, writer: W, format: SaveFormat) -> Result<()> {
    match format {
        SaveFormat::Tree => codec::dump(&output.to_value(), writer),
        SaveFormat::Binary => Ok(bincode::serialize_into(writer, output)?),
    }
}

/// Read an output from any byte source
pub fn read_output<R: Read>(reader: R, format: SaveFormat) -> Result<SweepOutput> {
    match format {
        SaveFormat::Tree => SweepOutput::from_value(codec::load(reader)?),
        SaveFormat::Binary => Ok(bincode::deserialize_from(reader)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_rules() {
        assert_eq!(
            resolve_save_path(Path::new("out/run"), SaveFormat::Tree).unwrap(),
            PathBuf::from("out/run.json")
        );
        assert_eq!(
            resolve_save_path(Path::new("run.fsim"), SaveFormat::Binary).unwrap(),
            PathBuf::from("run.fsim")
        );
        assert!(matches!(
            resolve_save_path(Path::new("run.json"), SaveFormat::Binary),
            Err(SweepError::Configuration(_))
        ));
        assert!(matches!(
            resolve_save_path(Path::new("run.txt"), SaveFormat::Tree),
            Err(SweepError::Configuration(_))
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SaveFormat::from_path(Path::new("a/b.json")),
            Some(SaveFormat::Tree)
        );
        assert_eq!(
            SaveFormat::from_path(Path::new("b.fsim")),
            Some(SaveFormat::Binary)
        );
        assert_eq!(SaveFormat::from_path(Path::new("b")), None);
        assert_eq!(SaveFormat::from_path(Path::new("b.yaml")), None);
    }
}
