//! JSON command protocol for scripting the markup plugin.
//!
//! Commands run against a [`TestHarness`], so gestures, camera changes and
//! annotation edits can be replayed from a file or an agent.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use shared::{AnchorParams, Color, IssueParams, MeasurementParams, ObjectId};

use crate::annotation::Slot;
use crate::config::Units;
use crate::control::GestureControl;
use crate::harness::TestHarness;
use crate::scene::Metrics;
use crate::viewport::projection::{CanvasBoundary, SectionPlane};

/// A command a script can execute.
///
/// Matrices are column-major, as glam stores them.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    CreateMeasurement {
        #[serde(default)]
        id: Option<ObjectId>,
        origin: AnchorParams,
        target: AnchorParams,
        #[serde(default)]
        approximate: Option<bool>,
        #[serde(default)]
        color: Option<Color>,
    },
    CreateIssue {
        #[serde(default)]
        id: Option<ObjectId>,
        anchor: AnchorParams,
        #[serde(default)]
        color: Option<Color>,
    },
    /// Destroy one annotation by id
    Destroy { id: ObjectId },
    /// Destroy every annotation
    Clear,
    SetViewMatrix { matrix: [f32; 16] },
    SetProjectionMatrix { matrix: [f32; 16] },
    /// Point the camera from `eye` at `target`, +Y up
    LookAt { eye: [f32; 3], target: [f32; 3] },
    SetCanvasBoundary {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    SetMetrics { units: Units, scale: f32 },
    AddSectionPlane {
        id: String,
        pos: [f32; 3],
        dir: [f32; 3],
    },
    RemoveSectionPlane { id: String },
    ClearSectionPlanes,
    /// Mouse click at a canvas position; activates the mouse control if needed
    Click { x: f32, y: f32 },
    /// Single-finger tap; activates the touch control if needed
    Tap { x: f32, y: f32 },
    /// Press, hold past the long-touch timeout, then lift
    LongPress { x: f32, y: f32 },
    /// Run a projection pass and list every annotation
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn canvas_json(pos: Option<glam::Vec2>) -> serde_json::Value {
    match pos {
        Some(p) => serde_json::json!([p.x, p.y]),
        None => serde_json::Value::Null,
    }
}

fn inspect(harness: &mut TestHarness) -> serde_json::Value {
    harness.update();
    let annotations: Vec<serde_json::Value> = harness
        .plugin
        .ids()
        .into_iter()
        .filter_map(|id| {
            let origin = harness.plugin.canvas_pos(&id, Slot::Origin);
            let target = harness.plugin.canvas_pos(&id, Slot::Target);
            let length = harness.plugin.length(&id);
            let annotation = harness.plugin.get(&id)?;
            Some(serde_json::json!({
                "id": id,
                "kind": format!("{:?}", annotation.kind()),
                "visibility": annotation.visibility().map(|v| format!("{v:?}")),
                "length": length,
                "origin_canvas": canvas_json(origin),
                "target_canvas": canvas_json(target),
            }))
        })
        .collect();
    serde_json::json!({
        "annotation_count": annotations.len(),
        "annotations": annotations,
        "camera_control_active": harness.scene.camera_control_active(),
    })
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::CreateMeasurement {
            id,
            origin,
            target,
            approximate,
            color,
        } => {
            let id = harness.plugin.create_measurement(MeasurementParams {
                id,
                approximate,
                color,
                ..MeasurementParams::between(origin, target)
            });
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        AgentCommand::CreateIssue { id, anchor, color } => {
            let id = harness.plugin.create_issue(IssueParams {
                id,
                color,
                ..IssueParams::at(anchor)
            });
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        AgentCommand::Destroy { id } => {
            if harness.plugin.destroy(&id) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("Unknown annotation '{id}'"))
            }
        }

        AgentCommand::Clear => {
            harness.plugin.clear();
            CommandResponse::ok()
        }

        AgentCommand::SetViewMatrix { matrix } => {
            harness.scene.set_view_matrix(Mat4::from_cols_array(&matrix));
            CommandResponse::ok()
        }

        AgentCommand::SetProjectionMatrix { matrix } => {
            harness.scene.set_proj_matrix(Mat4::from_cols_array(&matrix));
            CommandResponse::ok()
        }

        AgentCommand::LookAt { eye, target } => {
            let eye = Vec3::from_array(eye);
            let target = Vec3::from_array(target);
            if eye.distance_squared(target) < f32::EPSILON {
                return CommandResponse::err("eye and target coincide");
            }
            harness
                .scene
                .set_view_matrix(Mat4::look_at_rh(eye, target, Vec3::Y));
            CommandResponse::ok()
        }

        AgentCommand::SetCanvasBoundary {
            x,
            y,
            width,
            height,
        } => {
            if width <= 0.0 || height <= 0.0 {
                return CommandResponse::err("canvas must have a positive size");
            }
            harness
                .scene
                .set_canvas_boundary(CanvasBoundary::new(x, y, width, height));
            CommandResponse::ok()
        }

        AgentCommand::SetMetrics { units, scale } => {
            harness.scene.set_metrics(Metrics { units, scale });
            CommandResponse::ok()
        }

        AgentCommand::AddSectionPlane { id, pos, dir } => {
            let dir = Vec3::from_array(dir);
            if dir.length_squared() < f32::EPSILON {
                return CommandResponse::err("section plane direction is zero");
            }
            harness.scene.add_section_plane(SectionPlane::new(
                id,
                Vec3::from_array(pos),
                dir.normalize(),
            ));
            CommandResponse::ok()
        }

        AgentCommand::RemoveSectionPlane { id } => {
            let removed = harness.scene.remove_section_plane(&id);
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }

        AgentCommand::ClearSectionPlanes => {
            harness.scene.clear_section_planes();
            CommandResponse::ok()
        }

        AgentCommand::Click { x, y } => {
            if !harness.mouse.is_active() {
                harness.activate_mouse();
            }
            harness.click(x, y);
            CommandResponse::ok_with_data(serde_json::json!({
                "in_progress": harness.mouse.in_progress(),
            }))
        }

        AgentCommand::Tap { x, y } => {
            if !harness.touch.is_active() {
                harness.activate_touch();
            }
            harness.tap(0, x, y);
            CommandResponse::ok_with_data(serde_json::json!({
                "state": format!("{:?}", harness.touch.state()),
            }))
        }

        AgentCommand::LongPress { x, y } => {
            if !harness.touch.is_active() {
                harness.activate_touch();
            }
            let hold = harness.plugin.settings().controls.long_touch_timeout_ms;
            harness.touch_start(0, x, y);
            harness.advance(hold);
            harness.touch_end(0, x, y);
            CommandResponse::ok_with_data(serde_json::json!({
                "state": format!("{:?}", harness.touch.state()),
            }))
        }

        AgentCommand::Inspect => CommandResponse::ok_with_data(inspect(harness)),
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: AgentCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<AgentCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serde_clear() {
        let json = r#"{"command": "clear"}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, AgentCommand::Clear));
    }

    #[test]
    fn test_command_serde_create_measurement() {
        let json = r#"{"command": "create_measurement", "origin": {"world_pos": [0, 0, 0]}, "target": {"world_pos": [1, 0, 0], "entity": "wall"}}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        match cmd {
            AgentCommand::CreateMeasurement { id, target, .. } => {
                assert!(id.is_none());
                assert_eq!(target.entity.as_deref(), Some("wall"));
            }
            _ => panic!("Wrong command type"),
        }
    }

    #[test]
    fn test_command_serde_section_plane() {
        let json = r#"{"command": "add_section_plane", "id": "s1", "pos": [0, 0, 0], "dir": [0, 0, 1]}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, AgentCommand::AddSectionPlane { .. }));
    }

    #[test]
    fn test_execute_create_and_inspect() {
        let mut h = TestHarness::new();
        let resp = execute_command(
            &mut h,
            AgentCommand::CreateMeasurement {
                id: Some("m1".into()),
                origin: AnchorParams::at([0.0, 0.0, 0.0]),
                target: AnchorParams::at([3.0, 4.0, 0.0]),
                approximate: None,
                color: None,
            },
        );
        assert!(resp.success);
        assert_eq!(resp.data.unwrap()["id"], "m1");

        let data = execute_command(&mut h, AgentCommand::Inspect).data.unwrap();
        assert_eq!(data["annotation_count"], 1);
        let first = &data["annotations"][0];
        assert_eq!(first["kind"], "Measurement");
        assert_eq!(first["visibility"], "Visible");
        assert!((first["length"].as_f64().unwrap() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_execute_destroy_unknown() {
        let mut h = TestHarness::new();
        let resp = execute_command(&mut h, AgentCommand::Destroy { id: "nope".into() });
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("nope"));
    }

    #[test]
    fn test_execute_zero_plane_direction_rejected() {
        let mut h = TestHarness::new();
        let resp = execute_command(
            &mut h,
            AgentCommand::AddSectionPlane {
                id: "s".into(),
                pos: [0.0; 3],
                dir: [0.0; 3],
            },
        );
        assert!(!resp.success);
        assert!(h.scene.section_planes().is_empty());
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = TestHarness::new();
        assert!(execute_json(&mut h, "not json").is_err());
        assert!(execute_json(&mut h, r#"{"command": "fly"}"#).is_err());
    }
}
