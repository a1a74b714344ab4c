//! Assembly of the per-step and per-run output sections.

use crate::error::Result;
use crate::model::{ModelNode, Value, ValueMap};
use crate::optics::OpticalResponse;
use crate::path;

use super::flatten;
use super::{LayerStorage, StepResult, StorageConfig, SweepSettings};

/// Deep results key of the full per-angle response table
pub const RESPONSE_TABLE_KEY: &str = "optical_response";
/// Deep results key of the selected layer subtree
pub const SELECTED_LAYER_KEY: &str = "selected_layer";
/// Deep results key of the all-layers subtree
pub const ALL_LAYERS_KEY: &str = "dielectric_layers";

/// Primary key of an angle-averaged quantity
#[must_use]
pub fn average_key(attr: &str) -> String {
    format!("{attr}_avg")
}

/// Primary key of a quantity at one angle
#[must_use]
pub fn angle_key(attr: &str, angle: f64) -> String {
    format!("{attr}_{angle:.2}")
}

/// Non-swept context, captured once per run
pub fn static_section(optics: &dyn OpticalResponse) -> ValueMap {
    optics.static_context()
}

/// Run metadata stored under `about`
pub fn about_section(settings: &SweepSettings, steps: usize, completed_at: &str) -> ValueMap {
    let mut about = ValueMap::new();
    about.insert("name".into(), settings.name.as_str().into());
    about.insert("steps".into(), steps.into());
    about.insert("completed_at".into(), completed_at.into());
    about.insert("notes".into(), settings.notes.as_str().into());
    about.insert("key_title".into(), settings.key_title.as_str().into());
    about.insert("storage".into(), Value::Map(settings.storage.summary()));
    about
}

/// Build the record of step `index` from the collaborator's current state.
pub fn build_step(
    index: usize,
    storage: &StorageConfig,
    optics: &dyn OpticalResponse,
    model: &dyn ModelNode,
) -> Result<StepResult> {
    let present = optics.attribute_names();
    let flat = flatten::resolve_all(&storage.optics, &present, optics.layer_count())?;

    let mut primary = ValueMap::new();
    if storage.averaging.includes_average() {
        for attr in &flat {
            primary.insert(average_key(attr), optics.average_over(attr)?);
        }
    }
    if storage.averaging.includes_angles() {
        let angles = optics.angles();
        for attr in &flat {
            for &angle in &angles {
                primary.insert(angle_key(attr, angle), optics.value_at(angle, attr)?);
            }
        }
    }
    for extra in &storage.additional {
        primary.insert(extra.clone(), path::get(model, extra)?);
    }

    let mut deep = ValueMap::new();
    if storage.store_response_table {
        deep.insert(RESPONSE_TABLE_KEY.into(), optics.response_table());
    }
    match storage.layers {
        LayerStorage::SelectedLayer => {
            deep.insert(SELECTED_LAYER_KEY.into(), optics.serialize_selected_layer());
        }
        LayerStorage::AllLayers => {
            deep.insert(ALL_LAYERS_KEY.into(), optics.serialize_all_layers());
        }
        LayerStorage::None => {}
    }

    Ok(StepResult {
        index,
        primary,
        deep,
    })
}
