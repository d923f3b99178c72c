//! Integration tests for touch placement: quick taps, long presses and cancellation.
//!
//! Time is virtual; `advance` delivers due long-press timers to the controls.

use std::time::Duration;

use glam::{Vec2, Vec3};
use pinmark_lib::annotation::{PluginEvent, Slot};
use pinmark_lib::control::{GestureControl, PlacementMode, Timers, TouchState};
use pinmark_lib::fixtures::{self, ScriptedPicker};
use pinmark_lib::harness::TestHarness;
use pinmark_lib::viewport::picking::PickOptions;

const LONG_PRESS_MS: u64 = 300;

fn active() -> TestHarness {
    let mut h = TestHarness::new();
    h.activate_touch();
    h
}

/// Surface on the left half of the canvas only
fn left_half() -> ScriptedPicker {
    ScriptedPicker::new().with_surface(Vec2::ZERO, Vec2::new(400.0, 600.0), "left", 0.0)
}

fn long_press(h: &mut TestHarness, id: u64, x: f32, y: f32) {
    h.touch_start(id, x, y);
    h.advance(LONG_PRESS_MS);
}

#[test]
fn test_quick_taps_create_measurement() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::OriginQuickEnd);
    assert_eq!(h.pending_timers(), 1);
    assert!(h.touch.pointer_circle.visible);

    h.touch_end(1, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::TargetTouchStart);
    assert_eq!(h.pending_timers(), 0);
    let id = h.touch.in_progress().cloned().unwrap();
    {
        let a = h.plugin.get(&id).unwrap();
        assert!(!a.flags().clickable);
        assert!(!a.flags().target_visible);
    }

    h.tap(1, 300.0, 200.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert!(h.touch.in_progress().is_none());

    let a = h.plugin.get(&id).unwrap();
    assert!(a.flags().clickable);
    assert!(a.flags().target_visible);
    assert!(a.flags().wire_visible);
    assert_eq!(a.anchor(Slot::Origin).unwrap().world_pos, Vec3::new(1.0, -1.0, 0.0));
    assert_eq!(a.anchor(Slot::Target).unwrap().world_pos, Vec3::new(3.0, -2.0, 0.0));

    assert_eq!(
        h.events(),
        vec![
            PluginEvent::MeasurementCreated(id.clone()),
            PluginEvent::MeasurementStart(id.clone()),
            PluginEvent::MeasurementEnd(id),
        ]
    );
    // Quick taps never touch camera navigation
    assert!(h.camera_toggles().is_empty());
}

#[test]
fn test_release_before_timeout_is_quick_tap() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    h.advance(LONG_PRESS_MS - 1);
    assert_eq!(h.touch.state(), TouchState::OriginQuickEnd);
    h.touch_end(1, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::TargetTouchStart);
    assert!(h.camera_toggles().is_empty());
}

#[test]
fn test_long_press_drag_places_origin() {
    let mut h = active();
    long_press(&mut h, 1, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::OriginLongEnd);
    assert!(!h.scene.camera_control_active());
    assert!(h.touch.lens.visible);
    assert!(!h.touch.pointer_circle.visible);
    let id = h.touch.in_progress().cloned().unwrap();

    h.touch_move(1, 150.0, 120.0);
    assert_eq!(
        h.plugin.get(&id).unwrap().anchor(Slot::Origin).unwrap().world_pos,
        Vec3::new(1.5, -1.2, 0.0)
    );
    assert_eq!(h.touch.lens.canvas_pos, Vec2::new(150.0, 120.0));

    h.touch_end(1, 150.0, 120.0);
    assert_eq!(h.touch.state(), TouchState::TargetTouchStart);
    assert!(!h.touch.lens.visible);
    assert!(h.scene.camera_control_active());
    assert_eq!(h.camera_toggles(), vec![false, true]);
    assert_eq!(
        h.count_events(|e| matches!(e, PluginEvent::MeasurementStart(_))),
        1
    );
}

#[test]
fn test_long_press_target_then_release_finalizes() {
    let mut h = active();
    h.tap(1, 100.0, 100.0);
    let id = h.touch.in_progress().cloned().unwrap();

    long_press(&mut h, 2, 300.0, 300.0);
    assert_eq!(h.touch.state(), TouchState::TargetLongEnd);
    assert!(h.plugin.get(&id).unwrap().flags().target_visible);

    h.touch_move(2, 320.0, 300.0);
    h.touch_end(2, 320.0, 300.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);

    let a = h.plugin.get(&id).unwrap();
    assert!(a.flags().clickable);
    assert_eq!(a.anchor(Slot::Target).unwrap().world_pos, Vec3::new(3.2, -3.0, 0.0));
    assert_eq!(h.camera_toggles(), vec![false, true]);
    assert_eq!(
        h.count_events(|e| matches!(e, PluginEvent::MeasurementEnd(_))),
        1
    );
}

#[test]
fn test_long_press_target_off_surface_cancels() {
    let mut h = active();
    h.set_picker(left_half());
    h.tap(1, 100.0, 100.0);
    let id = h.touch.in_progress().cloned().unwrap();

    long_press(&mut h, 1, 600.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::TargetLongEnd);
    h.touch_end(1, 600.0, 100.0);

    assert!(h.plugin.get(&id).is_none());
    assert_eq!(
        h.count_events(|e| *e == PluginEvent::MeasurementCancel(id.clone())),
        1
    );
    assert_eq!(h.camera_toggles(), vec![false, true]);
}

#[test]
fn test_move_beyond_tolerance_cancels_timer_only() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    h.touch_move(1, 130.0, 100.0);
    assert_eq!(h.pending_timers(), 0);
    assert_eq!(h.touch.state(), TouchState::OriginQuickEnd);

    h.advance(LONG_PRESS_MS * 2);
    assert_eq!(h.touch.state(), TouchState::OriginQuickEnd);
    assert!(h.scene.camera_control_active());

    // Lifted outside the start box: a camera drag, nothing placed
    h.touch_end(1, 130.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert_eq!(h.annotation_count(), 0);
}

#[test]
fn test_tolerance_measured_from_start() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    h.touch_move(1, 115.0, 100.0);
    assert_eq!(h.pending_timers(), 1);
    // 15 px from the last sample, 30 px from the start
    h.touch_move(1, 130.0, 100.0);
    assert_eq!(h.pending_timers(), 0);
}

#[test]
fn test_small_drift_keeps_long_press() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    h.touch_move(1, 115.0, 110.0);
    h.advance(LONG_PRESS_MS);
    assert_eq!(h.touch.state(), TouchState::OriginLongEnd);
    let id = h.touch.in_progress().cloned().unwrap();
    assert_eq!(
        h.plugin.get(&id).unwrap().anchor(Slot::Origin).unwrap().world_pos,
        Vec3::new(1.15, -1.1, 0.0)
    );
}

#[test]
fn test_second_finger_cancels_long_press() {
    let mut h = active();
    long_press(&mut h, 1, 100.0, 100.0);
    let id = h.touch.in_progress().cloned().unwrap();

    h.touch_start(2, 200.0, 200.0);
    assert_eq!(h.touch.state(), TouchState::Canceling);
    assert!(!h.touch.lens.visible);

    h.touch_end(2, 200.0, 200.0);
    assert_eq!(h.touch.state(), TouchState::Canceling);
    assert!(h.plugin.get(&id).is_some());

    h.touch_end(1, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert!(h.plugin.get(&id).is_none());
    assert_eq!(h.camera_toggles(), vec![false, true]);

    let events = h.events();
    let cancel = events
        .iter()
        .position(|e| *e == PluginEvent::MeasurementCancel(id.clone()))
        .unwrap();
    let destroyed = events
        .iter()
        .position(|e| *e == PluginEvent::MeasurementDestroyed(id.clone()))
        .unwrap();
    assert!(cancel < destroyed);
}

#[test]
fn test_second_finger_during_quick_phase() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    h.touch_start(2, 200.0, 200.0);
    assert_eq!(h.touch.state(), TouchState::Canceling);
    assert_eq!(h.pending_timers(), 0);

    h.touch_end(1, 100.0, 100.0);
    h.touch_end(2, 200.0, 200.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert_eq!(h.annotation_count(), 0);
    assert!(h.camera_toggles().is_empty());
}

#[test]
fn test_second_finger_cancels_pending_measurement() {
    let mut h = active();
    h.tap(1, 100.0, 100.0);
    let id = h.touch.in_progress().cloned().unwrap();

    h.touch_start(1, 300.0, 300.0);
    h.touch_start(2, 320.0, 300.0);
    h.touch_end(2, 320.0, 300.0);
    h.touch_end(1, 300.0, 300.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert!(h.plugin.get(&id).is_none());
}

#[test]
fn test_foreign_identifier_cancels_tracked_gesture() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    h.touch_move(7, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::Canceling);

    h.touch_end(1, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert_eq!(h.annotation_count(), 0);
}

#[test]
fn test_foreign_identifier_ignored_between_gestures() {
    let mut h = active();
    h.tap(1, 100.0, 100.0);
    h.touch_move(7, 300.0, 300.0);
    assert_eq!(h.touch.state(), TouchState::TargetTouchStart);
    assert!(h.touch.in_progress().is_some());
}

#[test]
fn test_foreign_timer_is_ignored() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    let _foreign = h.timers.schedule(Duration::from_millis(10));
    h.advance(10);
    assert_eq!(h.touch.state(), TouchState::OriginQuickEnd);
    assert!(h.touch.timer_pending());
    assert!(h.scene.camera_control_active());
}

#[test]
fn test_quick_tap_miss_places_nothing() {
    let mut h = active();
    h.set_picker(ScriptedPicker::new());
    h.tap(1, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert_eq!(h.annotation_count(), 0);
}

#[test]
fn test_target_tap_miss_cancels() {
    let mut h = active();
    h.set_picker(left_half());
    h.tap(1, 100.0, 100.0);
    let id = h.touch.in_progress().cloned().unwrap();
    h.tap(1, 600.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert!(h.plugin.get(&id).is_none());
}

#[test]
fn test_issue_mode_tap() {
    let mut h = TestHarness::with_mode(PlacementMode::Issue);
    h.activate_touch();
    h.tap(1, 100.0, 100.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert_eq!(h.annotation_count(), 1);
    let id = h.plugin.ids().remove(0);
    assert!(h.plugin.get(&id).unwrap().flags().clickable);
    assert_eq!(
        h.events(),
        vec![PluginEvent::IssueCreated(id)]
    );
}

#[test]
fn test_deactivate_during_drag_cleans_up() {
    let mut h = active();
    long_press(&mut h, 1, 100.0, 100.0);
    h.touch_move(1, 140.0, 100.0);
    assert_eq!(h.annotation_count(), 1);

    h.deactivate_touch();
    assert_eq!(h.annotation_count(), 0);
    assert!(h.touch.listeners().is_empty());
    assert_eq!(h.pending_timers(), 0);
    assert_eq!(h.scene_listener_count(), 0);
    assert!(h.scene.camera_control_active());
    assert!(!h.touch.lens.visible);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert_eq!(h.camera_toggles(), vec![false, true]);
}

#[test]
fn test_deactivate_with_pending_timer() {
    let mut h = active();
    h.touch_start(1, 100.0, 100.0);
    h.deactivate_touch();
    assert_eq!(h.pending_timers(), 0);
    h.advance(LONG_PRESS_MS);
    assert_eq!(h.annotation_count(), 0);
    assert!(h.camera_toggles().is_empty());
}

#[test]
fn test_deactivate_forces_navigation_on() {
    let mut h = TestHarness::new();
    h.scene.set_camera_control_active(false);
    h.activate_touch();
    h.deactivate_touch();
    assert!(h.scene.camera_control_active());
    assert_eq!(h.camera_toggles(), vec![false, true]);
}

#[test]
fn test_timer_after_entity_destroyed_is_ignored() {
    let mut h = active();
    h.tap(1, 100.0, 100.0);
    let id = h.touch.in_progress().cloned().unwrap();
    assert!(h.plugin.destroy(&id));
    h.clear_events();

    h.touch_start(1, 300.0, 300.0);
    h.advance(LONG_PRESS_MS);
    assert_eq!(h.touch.state(), TouchState::TargetQuickEnd);
    assert!(h.camera_toggles().is_empty());
    assert!(!h.touch.lens.visible);

    h.touch_end(1, 300.0, 300.0);
    assert_eq!(h.touch.state(), TouchState::OriginTouchStart);
    assert!(h.touch.in_progress().is_none());
    assert!(h.events().is_empty());
    assert_eq!(h.annotation_count(), 0);
    assert_eq!(h.pending_timers(), 0);
    assert_eq!(h.scene_listener_count(), 0);
    assert!(h.camera_toggles().is_empty());
}

/// Whole canvas is surface, with a vertex near (100, 100)
fn surface_with_corner() -> ScriptedPicker {
    ScriptedPicker::everywhere(&fixtures::sample_boundary()).with_vertex(
        Vec2::new(105.0, 105.0),
        Vec3::new(9.0, 9.0, 9.0),
        "corner",
    )
}

#[test]
fn test_long_press_snaps_when_enabled() {
    let mut h = active();
    h.set_picker(surface_with_corner());
    long_press(&mut h, 1, 100.0, 100.0);
    assert_eq!(
        h.picker.calls().last().unwrap().1,
        PickOptions::snap_or_surface()
    );
    let id = h.touch.in_progress().cloned().unwrap();
    assert_eq!(
        h.plugin.get(&id).unwrap().anchor(Slot::Origin).unwrap().world_pos,
        Vec3::new(9.0, 9.0, 9.0)
    );
    assert!(h.touch.lens.snapped);
}

#[test]
fn test_long_press_ignores_vertices_without_snapping() {
    let mut h = TestHarness::new();
    h.set_snapping(false);
    h.activate_touch();
    assert!(!h.touch.snapping());
    h.set_picker(surface_with_corner());

    long_press(&mut h, 1, 100.0, 100.0);
    assert_eq!(h.picker.calls().last().unwrap().1, PickOptions::surface());
    let id = h.touch.in_progress().cloned().unwrap();
    assert_eq!(
        h.plugin.get(&id).unwrap().anchor(Slot::Origin).unwrap().world_pos,
        Vec3::new(1.0, -1.0, 0.0)
    );

    h.picker.clear_calls();
    h.touch_move(1, 104.0, 104.0);
    assert_eq!(h.picker.calls(), vec![(Vec2::new(104.0, 104.0), PickOptions::surface())]);
    assert!(!h.touch.lens.snapped);
}
