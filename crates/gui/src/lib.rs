// Library crate: the annotation core, gesture controls and the headless harness.
// The egui demo viewer lives in the binary crate.

pub mod annotation;
pub mod command;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod fixtures;
pub mod harness;
pub mod overlay;
pub mod scene;
pub mod viewport;
