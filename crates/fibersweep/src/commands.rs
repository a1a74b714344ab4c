//! Command implementations. Each returns the text printed to stdout.

use std::fmt::Write as _;
use std::path::Path;

use fibersweep_core::persist::{self, SaveFormat, SaveOutcome};
use fibersweep_core::sweep::validate;
use fibersweep_core::{ReadinessReport, SweepOutput, Value};

use crate::config::{ConfigError, SweepFile, load_model};

/// Validate a sweep file against a model file
pub fn check(model_path: &Path, sweep_path: &Path) -> Result<ReadinessReport, ConfigError> {
    let model = load_model(model_path)?;
    let (spec, _) = SweepFile::load(sweep_path)?.build()?;
    let report = validate(&spec, &model);
    tracing::info!(
        ready = report.ready,
        model = %model_path.display(),
        sweep = %sweep_path.display(),
        "Checked sweep"
    );
    Ok(report)
}

/// Human-readable readiness report
pub fn format_report(report: &ReadinessReport) -> String {
    let mut out = String::new();
    let status = if report.ready { "ready" } else { "NOT ready" };
    let _ = writeln!(out, "Sweep is {status}: {}", report.message);
    for (label, paths) in [
        ("missing", &report.missing),
        ("duplicate", &report.duplicates),
        ("wrong length", &report.mismatched),
    ] {
        for p in paths {
            let _ = writeln!(out, "  {label}: {p}");
        }
    }
    out
}

fn about_text<'a>(output: &'a SweepOutput, key: &str) -> Option<&'a str> {
    output.about.get(key).and_then(Value::as_str)
}

/// Summary of a saved sweep output
pub fn inspect(path: &Path) -> Result<String, ConfigError> {
    let output = persist::load(path)?;
    Ok(summarize(&output))
}

pub fn summarize(output: &SweepOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Sweep '{}' completed at {}",
        about_text(output, "name").unwrap_or("unnamed"),
        about_text(output, "completed_at").unwrap_or("unknown time"),
    );
    let _ = writeln!(out, "Steps: {}", output.primary.len());

    if !output.inputs.is_empty() {
        let _ = writeln!(out, "Inputs:");
        for (path, seq) in &output.inputs {
            match (seq.first(), seq.last()) {
                (Some(first), Some(last)) => {
                    let _ = writeln!(out, "  {path}: {first} -> {last} ({} values)", seq.len());
                }
                _ => {
                    let _ = writeln!(out, "  {path}: (empty)");
                }
            }
        }
    }

    if let Some(first) = output.primary.values().next() {
        let names: Vec<&str> = first.keys().map(String::as_str).collect();
        let _ = writeln!(out, "Primary quantities: {}", names.join(", "));
    }
    if let Some(first) = output.results.values().next() {
        let names: Vec<&str> = first.keys().map(String::as_str).collect();
        let _ = writeln!(out, "Deep results: {}", names.join(", "));
    }
    out
}

/// Re-save an output in the format implied by `output_path`.
///
/// Without an extension on `output_path` the other format is used.
pub fn convert(
    input_path: &Path,
    output_path: &Path,
    force: bool,
) -> Result<SaveOutcome, ConfigError> {
    let output = persist::load(input_path)?;
    let format = SaveFormat::from_path(output_path).unwrap_or(
        match SaveFormat::from_path(input_path) {
            Some(SaveFormat::Tree) => SaveFormat::Binary,
            _ => SaveFormat::Tree,
        },
    );
    Ok(persist::save(&output, output_path, format, force)?)
}
