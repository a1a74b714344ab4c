//! Scenario tests for the sweep engine
//!
//! Tests are organized by topic:
//! - `support` - Stub model and optical collaborator
//! - `engine` - Run lifecycle, restore and abort behaviour
//! - `aggregation` - Per-step output contents for each storage option
//! - `persistence` - Saving and loading sweep outputs

mod support;
