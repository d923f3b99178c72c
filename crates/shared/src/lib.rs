//! Engine-independent annotation data shared by the core library, the demo viewer
//! and anything that scripts or persists annotations.

use serde::{Deserialize, Serialize};

mod color;

pub use color::{Color, ColorError};

/// Unique identifier of a scene object or an annotation
pub type ObjectId = String;

/// One annotation anchor as supplied by a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorParams {
    /// World-space position
    pub world_pos: [f32; 3],
    /// Scene object the anchor was picked on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<ObjectId>,
}

impl AnchorParams {
    pub fn at(world_pos: [f32; 3]) -> Self {
        Self {
            world_pos,
            entity: None,
        }
    }

    pub fn on(world_pos: [f32; 3], entity: impl Into<ObjectId>) -> Self {
        Self {
            world_pos,
            entity: Some(entity.into()),
        }
    }
}

/// Parameters for a two-point distance measurement.
///
/// Every `None` flag falls back to the plugin defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementParams {
    pub id: Option<ObjectId>,
    pub origin: AnchorParams,
    pub target: AnchorParams,
    pub visible: Option<bool>,
    pub origin_visible: Option<bool>,
    pub target_visible: Option<bool>,
    pub wire_visible: Option<bool>,
    pub axis_visible: Option<bool>,
    pub x_axis_visible: Option<bool>,
    pub y_axis_visible: Option<bool>,
    pub z_axis_visible: Option<bool>,
    pub x_label_enabled: Option<bool>,
    pub y_label_enabled: Option<bool>,
    pub z_label_enabled: Option<bool>,
    pub length_label_enabled: Option<bool>,
    pub labels_visible: Option<bool>,
    pub labels_on_wires: Option<bool>,
    pub color: Option<Color>,
    /// Whether the length is shown as approximate ("~")
    pub approximate: Option<bool>,
}

impl MeasurementParams {
    /// Measurement between two points with default flags
    pub fn between(origin: AnchorParams, target: AnchorParams) -> Self {
        Self {
            origin,
            target,
            ..Default::default()
        }
    }
}

/// Parameters for a single-point issue marker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueParams {
    pub id: Option<ObjectId>,
    pub anchor: AnchorParams,
    pub visible: Option<bool>,
    pub color: Option<Color>,
}

impl IssueParams {
    pub fn at(anchor: AnchorParams) -> Self {
        Self {
            anchor,
            ..Default::default()
        }
    }
}
