//! Capture and restore of the swept attributes around a run.

use rustc_hash::FxHashMap;

use crate::error::{Result, SweepError};
use crate::model::{ModelNode, Value};
use crate::path;

/// Original values of the bound attributes, captured once per run
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    values: FxHashMap<String, Value>,
}

impl Snapshot {
    /// Read every path. Fails on the first unresolvable path.
    pub fn capture<'a>(
        model: &dyn ModelNode,
        paths: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let mut values = FxHashMap::default();
        for p in paths {
            values.insert(p.to_string(), path::get(model, p)?);
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }

    /// Write every captured value back, consuming the snapshot.
    ///
    /// A failing path does not stop the pass; all failures are returned
    /// together once every path has been attempted.
    pub fn restore(self, model: &mut dyn ModelNode) -> Result<()> {
        let mut failures = Vec::new();
        for (p, value) in self.values {
            if let Err(e) = path::set(model, &p, value) {
                tracing::warn!(path = %p, error = %e, "Failed to restore attribute");
                failures.push(e);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(SweepError::RestoreFailed(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Value {
        Value::from([
            ("a", Value::Float(1.0)),
            ("b", Value::from([("c", Value::Int(2))])),
        ])
    }

    #[test]
    fn test_capture_then_restore() {
        let mut m = model();
        let snapshot = Snapshot::capture(&m, ["a", "b.c"]).unwrap();
        assert_eq!(snapshot.len(), 2);

        path::set(&mut m, "a", Value::Float(9.0)).unwrap();
        path::set(&mut m, "b.c", Value::Int(9)).unwrap();

        snapshot.restore(&mut m).unwrap();
        assert_eq!(m, model());
    }

    #[test]
    fn test_capture_fails_on_missing_path() {
        let m = model();
        let err = Snapshot::capture(&m, ["a", "missing"]).unwrap_err();
        assert!(matches!(err, SweepError::PathNotFound { .. }));
    }

    #[test]
    fn test_restore_continues_past_failures() {
        let mut m = model();
        let snapshot = Snapshot::capture(&m, ["a", "b.c"]).unwrap();

        path::set(&mut m, "a", Value::Float(9.0)).unwrap();
        // Drop the sub-object holding `c` so that path can no longer be written
        if let Value::Map(root) = &mut m {
            root.insert("b".into(), Value::from([("other", Value::Null)]));
        }

        let err = snapshot.restore(&mut m).unwrap_err();
        match err {
            SweepError::RestoreFailed(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(path::get(&m, "a").unwrap(), Value::Float(1.0));
    }
}
