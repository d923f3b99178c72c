//! Annotation entities and the plugin that creates and owns them.

mod entity;
mod plugin;
mod stage;

pub use entity::{
    format_length, Anchor, Annotation, AnnotationFlags, AnnotationKind, LabelFormat, Lengths,
    MarkerOwner, Part, Slot, UpdateOutcome,
};
pub use plugin::{MarkupPlugin, PluginEvent};
pub use stage::UpdateStage;
