//! Integration tests for the JSON command protocol.
//!
//! Full pipeline: JSON string -> parse -> execute -> response.

use pinmark_lib::annotation::Part;
use pinmark_lib::command::{execute_json, execute_json_batch};
use pinmark_lib::control::GestureControl;
use pinmark_lib::harness::TestHarness;

#[test]
fn test_command_create_measurement() {
    let mut h = TestHarness::new();

    let json = r#"{"command": "create_measurement", "origin": {"world_pos": [0, 0, 0]}, "target": {"world_pos": [1, 0, 0], "entity": "wall"}}"#;

    let resp = execute_json(&mut h, json).unwrap();
    assert!(resp.success);
    assert!(resp.data.as_ref().unwrap()["id"].as_str().is_some());
    assert_eq!(h.annotation_count(), 1);
}

#[test]
fn test_command_create_issue_with_id() {
    let mut h = TestHarness::new();

    let json = r#"{"command": "create_issue", "id": "crack-1", "anchor": {"world_pos": [0.5, 0.5, 0]}}"#;

    let resp = execute_json(&mut h, json).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["id"], "crack-1");
    assert!(h.plugin.get("crack-1").is_some());
}

#[test]
fn test_command_inspect_lists_annotations() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "create_measurement", "id": "m1", "origin": {"world_pos": [0, 0, 0]}, "target": {"world_pos": [0, 2, 0]}},
        {"command": "create_issue", "id": "i1", "anchor": {"world_pos": [1, 1, 0]}},
        {"command": "inspect"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 3);
    assert!(responses.iter().all(|r| r.success));

    let data = responses[2].data.as_ref().unwrap();
    assert_eq!(data["annotation_count"], 2);
    assert_eq!(data["camera_control_active"], true);

    let annotations = data["annotations"].as_array().unwrap();
    let m1 = annotations.iter().find(|a| a["id"] == "m1").unwrap();
    assert_eq!(m1["kind"], "Measurement");
    assert!((m1["length"].as_f64().unwrap() - 2.0).abs() < 1e-4);
    assert!(m1["origin_canvas"].is_array());
    assert!(m1["target_canvas"].is_array());

    let i1 = annotations.iter().find(|a| a["id"] == "i1").unwrap();
    assert_eq!(i1["kind"], "Issue");
    assert!(i1["target_canvas"].is_null());
}

#[test]
fn test_command_destroy_and_clear() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "create_issue", "id": "a", "anchor": {"world_pos": [0, 0, 0]}},
        {"command": "create_issue", "id": "b", "anchor": {"world_pos": [1, 0, 0]}},
        {"command": "create_issue", "id": "c", "anchor": {"world_pos": [2, 0, 0]}},
        {"command": "destroy", "id": "a"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(responses.iter().all(|r| r.success));
    assert_eq!(h.annotation_count(), 2);

    let resp = execute_json(&mut h, r#"{"command": "destroy", "id": "a"}"#).unwrap();
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("'a'"));

    let resp = execute_json(&mut h, r#"{"command": "clear"}"#).unwrap();
    assert!(resp.success);
    assert_eq!(h.annotation_count(), 0);
    assert_eq!(h.scene_listener_count(), 0);
}

#[test]
fn test_command_section_plane_culls() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "create_issue", "id": "left", "anchor": {"world_pos": [-1, 0, 0]}},
        {"command": "add_section_plane", "id": "s", "pos": [0, 0, 0], "dir": [2, 0, 0]},
        {"command": "inspect"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(responses[1].success);
    let planes = h.scene.section_planes();
    assert!((planes[0].dir.length() - 1.0).abs() < 1e-6);

    let data = responses[2].data.as_ref().unwrap();
    assert_eq!(data["annotations"][0]["visibility"], "Sliced");

    let resp = execute_json(&mut h, r#"{"command": "remove_section_plane", "id": "s"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["removed"], true);
    let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["annotations"][0]["visibility"], "Visible");
}

#[test]
fn test_command_remove_unknown_plane() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "remove_section_plane", "id": "nope"}"#).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["removed"], false);
}

#[test]
fn test_command_rejects_bad_arguments() {
    let mut h = TestHarness::new();

    let resp = execute_json(
        &mut h,
        r#"{"command": "look_at", "eye": [1, 1, 1], "target": [1, 1, 1]}"#,
    )
    .unwrap();
    assert!(!resp.success);

    let resp = execute_json(
        &mut h,
        r#"{"command": "set_canvas_boundary", "x": 0, "y": 0, "width": 0, "height": 600}"#,
    )
    .unwrap();
    assert!(!resp.success);
    assert_eq!(h.scene.canvas_boundary().width, 800.0);
}

#[test]
fn test_command_set_metrics_changes_labels() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "set_metrics", "units": "Centimeters", "scale": 100.0},
        {"command": "create_measurement", "id": "m", "origin": {"world_pos": [0, 0, 0]}, "target": {"world_pos": [1, 0, 0]}}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(responses.iter().all(|r| r.success));
    h.update();
    assert_eq!(
        h.plugin.get("m").unwrap().label(Part::Length).unwrap().text(),
        "100.00cm"
    );
}

#[test]
fn test_command_clicks_place_measurement() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "click", "x": 100, "y": 100},
        {"command": "click", "x": 300, "y": 100}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(h.mouse.is_active());
    assert!(responses[0].data.as_ref().unwrap()["in_progress"].is_string());
    assert!(responses[1].data.as_ref().unwrap()["in_progress"].is_null());
    assert_eq!(h.annotation_count(), 1);

    let id = h.plugin.ids().remove(0);
    assert!((h.plugin.length(&id).unwrap() - 2.0).abs() < 1e-4);
}

#[test]
fn test_command_taps_place_measurement() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "tap", "x": 100, "y": 100}"#).unwrap();
    assert_eq!(resp.data.unwrap()["state"], "TargetTouchStart");

    let resp = execute_json(&mut h, r#"{"command": "tap", "x": 100, "y": 400}"#).unwrap();
    assert_eq!(resp.data.unwrap()["state"], "OriginTouchStart");
    assert_eq!(h.annotation_count(), 1);
    assert!(h.camera_toggles().is_empty());
}

#[test]
fn test_command_long_press_toggles_navigation() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "long_press", "x": 100, "y": 100},
        {"command": "long_press", "x": 200, "y": 100},
        {"command": "inspect"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses[0].data.as_ref().unwrap()["state"], "TargetTouchStart");
    assert_eq!(responses[1].data.as_ref().unwrap()["state"], "OriginTouchStart");
    assert_eq!(responses[2].data.as_ref().unwrap()["annotation_count"], 1);
    assert_eq!(h.camera_toggles(), vec![false, true, false, true]);
    assert!(h.scene.camera_control_active());
}

#[test]
fn test_command_invalid_json() {
    let mut h = TestHarness::new();
    assert!(execute_json(&mut h, "not json").is_err());
    assert!(execute_json(&mut h, r#"{"command": "extrude"}"#).is_err());
    assert!(execute_json(&mut h, r#"{"command": "destroy"}"#).is_err());
    assert!(execute_json_batch(&mut h, r#"{"command": "clear"}"#).is_err());
}
