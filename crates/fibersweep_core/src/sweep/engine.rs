//! Sweep engine: validation, stepping, aggregation and restore.
//!
//! The engine owns the `SweepSpec`, the last readiness report and the last
//! completed output. The model and the optical collaborator are only
//! borrowed for the duration of a single [`SweepEngine::start`] call.
//!
//! ```text
//! Idle -> Configured -> Running -> Completed
//!                               \-> Aborted
//! ```

use std::path::Path;

use crate::error::{Result, SweepError};
use crate::model::{ModelNode, Value};
use crate::optics::OpticalResponse;
use crate::path;
use crate::persist::{self, SaveOutcome};

use super::aggregate;
use super::{ReadinessReport, Snapshot, SweepOutput, SweepSettings, SweepSpec, validate};

/// Run state of a [`SweepEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepState {
    #[default]
    Idle,
    Configured,
    Running,
    Completed,
    Aborted,
}

/// Result of a call to [`SweepEngine::start`] that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Every step ran and the output was replaced
    Completed { steps: usize },
    /// The spec is not ready; nothing was touched
    NotReady { message: String },
}

#[derive(Debug, Default)]
pub struct SweepEngine {
    settings: SweepSettings,
    spec: Option<SweepSpec>,
    report: Option<ReadinessReport>,
    state: SweepState,
    output: Option<SweepOutput>,
    completed_at: Option<jiff::Timestamp>,
}

impl SweepEngine {
    #[must_use]
    pub fn new(settings: SweepSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SweepSettings {
        &mut self.settings
    }

    #[must_use]
    pub fn state(&self) -> SweepState {
        self.state
    }

    #[must_use]
    pub fn spec(&self) -> Option<&SweepSpec> {
        self.spec.as_ref()
    }

    /// Last readiness report, if a spec has been configured
    #[must_use]
    pub fn report(&self) -> Option<&ReadinessReport> {
        self.report.as_ref()
    }

    /// Message of the last readiness check
    #[must_use]
    pub fn status_message(&self) -> &str {
        self.report
            .as_ref()
            .map_or("No sweep configured", |r| r.message.as_str())
    }

    /// Output of the last completed run
    #[must_use]
    pub fn output(&self) -> Option<&SweepOutput> {
        self.output.as_ref()
    }

    /// When the last completed run finished
    #[must_use]
    pub fn completed_at(&self) -> Option<jiff::Timestamp> {
        self.completed_at
    }

    /// Store `spec` and check it against `model`.
    ///
    /// The engine moves to `Configured` whether or not the sweep is ready;
    /// readiness is reported, not enforced, until [`SweepEngine::start`].
    /// A run interrupted by a panic leaves the engine `Running`; configuring
    /// again clears that state.
    pub fn configure(&mut self, spec: SweepSpec, model: &dyn ModelNode) -> &ReadinessReport {
        let report = validate(&spec, model);
        tracing::debug!(
            ready = report.ready,
            bindings = spec.bindings().len(),
            steps = spec.steps(),
            "Sweep configured"
        );
        if self.state == SweepState::Running {
            tracing::warn!("Clearing a sweep left running by an interrupted start");
        }
        self.spec = Some(spec);
        self.state = SweepState::Configured;
        self.report.insert(report)
    }

    /// Re-check the stored spec, e.g. after the model changed
    pub fn revalidate(&mut self, model: &dyn ModelNode) -> &ReadinessReport {
        let report = match &self.spec {
            Some(spec) => validate(spec, model),
            None => ReadinessReport::not_configured(),
        };
        self.report.insert(report)
    }

    /// Run the configured sweep against `model`.
    ///
    /// Blocks until every step has run. A spec that is not ready is a no-op
    /// reported as [`StartOutcome::NotReady`]. A failure during any step
    /// aborts the run, restores the bound attributes when restore is enabled,
    /// and returns the failure; the previous output is kept.
    pub fn start(
        &mut self,
        model: &mut dyn ModelNode,
        optics: &mut dyn OpticalResponse,
    ) -> Result<StartOutcome> {
        if self.state == SweepState::Running {
            return Err(SweepError::AlreadyRunning);
        }

        let Some(spec) = self.spec.clone() else {
            return Ok(StartOutcome::NotReady {
                message: self.status_message().to_string(),
            });
        };

        let report = self.revalidate(model);
        if !report.ready {
            tracing::warn!(message = %report.message, "Sweep not started");
            return Ok(StartOutcome::NotReady {
                message: report.message.clone(),
            });
        }

        self.state = SweepState::Running;
        tracing::info!(
            name = %self.settings.name,
            steps = spec.steps(),
            variables = ?spec.paths().collect::<Vec<_>>(),
            "Starting sweep"
        );

        let snapshot = if self.settings.restore_after_run {
            match Snapshot::capture(model, spec.paths()) {
                Ok(s) => Some(s),
                Err(e) => {
                    self.state = SweepState::Aborted;
                    return Err(e);
                }
            }
        } else {
            None
        };

        let run = self.run_steps(&spec, model, optics);
        let restored = match snapshot {
            Some(s) => s.restore(model),
            None => Ok(()),
        };

        match run {
            Ok(mut output) => {
                let completed_at = jiff::Timestamp::now();
                output.about = aggregate::about_section(
                    &self.settings,
                    spec.steps(),
                    &completed_at.to_string(),
                );
                self.output = Some(output);
                self.completed_at = Some(completed_at);
                self.state = SweepState::Completed;
                tracing::info!(name = %self.settings.name, "Sweep completed");
                restored?;
                Ok(StartOutcome::Completed {
                    steps: spec.steps(),
                })
            }
            Err(e) => {
                self.state = SweepState::Aborted;
                tracing::warn!(error = %e, "Sweep aborted");
                if let Err(restore_err) = restored {
                    tracing::error!(
                        error = %restore_err,
                        "Model left partially mutated after aborted sweep"
                    );
                }
                Err(e)
            }
        }
    }

    fn run_steps(
        &self,
        spec: &SweepSpec,
        model: &mut dyn ModelNode,
        optics: &mut dyn OpticalResponse,
    ) -> Result<SweepOutput> {
        let mut output = SweepOutput {
            static_context: aggregate::static_section(optics),
            inputs: spec.inputs(),
            ..Default::default()
        };

        let steps = spec.steps();
        for i in 0..steps {
            for binding in spec.bindings() {
                path::set(model, &binding.path, Value::Float(binding.sequence()[i]))?;
            }

            optics.recompute(model)?;

            let step = aggregate::build_step(i, &self.settings.storage, optics, model)?;
            output.push_step(self.settings.step_key(i), step);

            tracing::debug!(step = i + 1, of = steps, "Sweep step completed");
        }

        Ok(output)
    }

    /// Save the last completed output to `path` in the configured format.
    pub fn save(&self, path: &Path, confirm_overwrite: bool) -> Result<SaveOutcome> {
        let empty = SweepOutput::default();
        let output = self.output.as_ref().unwrap_or(&empty);
        persist::save(output, path, self.settings.save_format, confirm_overwrite)
    }
}
