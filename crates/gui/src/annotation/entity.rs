//! One annotation: anchors, flags, cached transform buffers and owned overlay widgets.
//!
//! Scene changes only raise the entity's [`UpdateStage`]; the actual work happens in
//! [`Annotation::update`], which walks world -> view -> culling -> clip -> canvas and
//! stops at the first hiding condition.

use std::cell::Cell;
use std::rc::Rc;

use glam::{Vec2, Vec3, Vec4};
use shared::{AnchorParams, Color, IssueParams, MeasurementParams, ObjectId};

use super::stage::UpdateStage;
use crate::config::{PluginDefaults, Units};
use crate::events::Subscription;
use crate::overlay::{Dot, Label, OverlayEvent, Wire};
use crate::scene::{Metrics, Scene};
use crate::viewport::projection::{Projector, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    /// Two anchors and the distance between them
    Measurement,
    /// One anchor
    Issue,
}

/// Which anchor of an annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Origin,
    Target,
}

/// Wires and labels of a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Length,
    X,
    Y,
    Z,
}

impl Part {
    const ALL: [Part; 4] = [Part::Length, Part::X, Part::Y, Part::Z];

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub world_pos: Vec3,
    pub entity: Option<ObjectId>,
}

impl Anchor {
    pub fn new(world_pos: Vec3, entity: Option<ObjectId>) -> Self {
        Self { world_pos, entity }
    }
}

impl From<&AnchorParams> for Anchor {
    fn from(params: &AnchorParams) -> Self {
        Self {
            world_pos: Vec3::from_array(params.world_pos),
            entity: params.entity.clone(),
        }
    }
}

/// Visibility and enablement switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationFlags {
    pub visible: bool,
    pub origin_visible: bool,
    pub target_visible: bool,
    pub wire_visible: bool,
    pub axis_enabled: bool,
    pub axis_visible: bool,
    pub x_axis_visible: bool,
    pub y_axis_visible: bool,
    pub z_axis_visible: bool,
    pub labels_visible: bool,
    pub x_label_enabled: bool,
    pub y_label_enabled: bool,
    pub z_label_enabled: bool,
    pub length_label_enabled: bool,
    pub labels_on_wires: bool,
    pub clickable: bool,
    pub approximate: bool,
}

impl AnnotationFlags {
    fn for_measurement(params: &MeasurementParams, defaults: &PluginDefaults) -> Self {
        Self {
            visible: params.visible.unwrap_or(defaults.visible),
            origin_visible: params.origin_visible.unwrap_or(defaults.origin_visible),
            target_visible: params.target_visible.unwrap_or(defaults.target_visible),
            wire_visible: params.wire_visible.unwrap_or(defaults.wire_visible),
            axis_enabled: true,
            axis_visible: params.axis_visible.unwrap_or(defaults.axis_visible),
            x_axis_visible: params.x_axis_visible.unwrap_or(defaults.x_axis_visible),
            y_axis_visible: params.y_axis_visible.unwrap_or(defaults.y_axis_visible),
            z_axis_visible: params.z_axis_visible.unwrap_or(defaults.z_axis_visible),
            labels_visible: params.labels_visible.unwrap_or(defaults.labels_visible),
            x_label_enabled: params.x_label_enabled.unwrap_or(defaults.x_label_enabled),
            y_label_enabled: params.y_label_enabled.unwrap_or(defaults.y_label_enabled),
            z_label_enabled: params.z_label_enabled.unwrap_or(defaults.z_label_enabled),
            length_label_enabled: params
                .length_label_enabled
                .unwrap_or(defaults.length_label_enabled),
            labels_on_wires: params.labels_on_wires.unwrap_or(defaults.labels_on_wires),
            clickable: true,
            approximate: params.approximate.unwrap_or(false),
        }
    }

    fn for_issue(params: &IssueParams, defaults: &PluginDefaults) -> Self {
        let visible = params.visible.unwrap_or(defaults.visible);
        Self {
            visible,
            origin_visible: true,
            target_visible: false,
            wire_visible: false,
            axis_enabled: false,
            axis_visible: false,
            x_axis_visible: false,
            y_axis_visible: false,
            z_axis_visible: false,
            labels_visible: false,
            x_label_enabled: false,
            y_label_enabled: false,
            z_label_enabled: false,
            length_label_enabled: false,
            labels_on_wires: false,
            clickable: true,
            approximate: false,
        }
    }
}

/// World-space distances of a measurement
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lengths {
    pub total: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Label settings for one update pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelFormat {
    pub metrics: Metrics,
    pub precision: usize,
    /// Axis labels hide below this on-screen wire length (px)
    pub min_axis_length: f32,
}

impl LabelFormat {
    pub fn text(&self, length: f32, approximate: bool) -> String {
        format_length(
            length * self.metrics.scale,
            self.metrics.units,
            self.precision,
            approximate,
        )
    }
}

pub fn format_length(value: f32, units: Units, precision: usize, approximate: bool) -> String {
    let prefix = if approximate { "~" } else { "" };
    format!("{prefix}{value:.precision$}{}", units.abbrev())
}

/// What one update pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Entity invisible; it stays dirty until shown
    Skipped,
    /// Nothing was dirty
    Unchanged,
    /// An anchor is cut away by a section plane
    Culled,
    /// An anchor is past the near threshold
    BehindNear,
    /// Canvas positions recomputed
    Projected,
}

/// Callback receiving pointer events from the entity's dots
pub type MarkerOwner = Rc<dyn Fn(Slot, &OverlayEvent)>;

pub struct Annotation {
    id: ObjectId,
    kind: AnnotationKind,
    origin: Anchor,
    target: Option<Anchor>,
    color: Color,
    flags: AnnotationFlags,
    stage: Rc<Cell<UpdateStage>>,
    world: Vec<Vec4>,
    view: Vec<Vec4>,
    clip: Vec<Vec4>,
    canvas: Vec<Vec2>,
    lengths: Lengths,
    visibility: Option<Visibility>,
    origin_dot: Dot,
    target_dot: Option<Dot>,
    wires: Vec<Wire>,
    labels: Vec<Label>,
    _scene_subscription: Subscription,
}

fn owned_dot(size: f32, scene: &Scene, owner: &MarkerOwner, slot: Slot) -> Dot {
    let owner = Rc::clone(owner);
    Dot::new(size, scene.canvas_events().clone())
        .with_owner(Rc::new(move |event: &OverlayEvent| owner(slot, event)))
}

impl Annotation {
    pub(crate) fn measurement(
        id: ObjectId,
        params: &MeasurementParams,
        defaults: &PluginDefaults,
        scene: &Scene,
        owner: MarkerOwner,
    ) -> Self {
        let flags = AnnotationFlags::for_measurement(params, defaults);
        let color = params.color.unwrap_or(defaults.color);
        let origin_dot = owned_dot(Dot::MEASUREMENT_SIZE, scene, &owner, Slot::Origin);
        let target_dot = owned_dot(Dot::MEASUREMENT_SIZE, scene, &owner, Slot::Target);
        let wires = Part::ALL
            .iter()
            .map(|part| {
                let thickness = if *part == Part::Length { 2.0 } else { 1.0 };
                Wire::new(color, thickness)
            })
            .collect();
        let labels = Part::ALL.iter().map(|_| Label::new(color)).collect();

        let mut annotation = Self::assemble(
            id,
            AnnotationKind::Measurement,
            Anchor::from(&params.origin),
            Some(Anchor::from(&params.target)),
            color,
            flags,
            scene,
            origin_dot,
            Some(target_dot),
        );
        annotation.wires = wires;
        annotation.labels = labels;
        annotation.apply_flags();
        annotation
    }

    pub(crate) fn issue(
        id: ObjectId,
        params: &IssueParams,
        defaults: &PluginDefaults,
        scene: &Scene,
        owner: MarkerOwner,
    ) -> Self {
        let flags = AnnotationFlags::for_issue(params, defaults);
        let color = params.color.unwrap_or(defaults.color);
        let dot = owned_dot(Dot::ISSUE_SIZE, scene, &owner, Slot::Origin);

        let mut annotation = Self::assemble(
            id,
            AnnotationKind::Issue,
            Anchor::from(&params.anchor),
            None,
            color,
            flags,
            scene,
            dot,
            None,
        );
        annotation.origin_dot.set_border_color(Color::WHITE);
        annotation.apply_flags();
        annotation
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        id: ObjectId,
        kind: AnnotationKind,
        origin: Anchor,
        target: Option<Anchor>,
        color: Color,
        flags: AnnotationFlags,
        scene: &Scene,
        mut origin_dot: Dot,
        mut target_dot: Option<Dot>,
    ) -> Self {
        origin_dot.set_fill_color(color);
        if let Some(dot) = target_dot.as_mut() {
            dot.set_fill_color(color);
        }

        let stage = Rc::new(Cell::new(UpdateStage::WorldDirty));
        let watched = Rc::clone(&stage);
        let subscription = scene.subscribe(move |event| {
            if let Some(level) = UpdateStage::for_scene_event(event) {
                UpdateStage::raise(&watched, level);
            }
        });

        Self {
            id,
            kind,
            origin,
            target,
            color,
            flags,
            stage,
            world: Vec::new(),
            view: Vec::new(),
            clip: Vec::new(),
            canvas: Vec::new(),
            lengths: Lengths::default(),
            visibility: None,
            origin_dot,
            target_dot,
            wires: Vec::new(),
            labels: Vec::new(),
            _scene_subscription: subscription,
        }
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn kind(&self) -> AnnotationKind {
        self.kind
    }

    pub fn is_measurement(&self) -> bool {
        self.kind == AnnotationKind::Measurement
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn flags(&self) -> AnnotationFlags {
        self.flags
    }

    pub fn stage(&self) -> UpdateStage {
        self.stage.get()
    }

    pub fn anchor(&self, slot: Slot) -> Option<&Anchor> {
        match slot {
            Slot::Origin => Some(&self.origin),
            Slot::Target => self.target.as_ref(),
        }
    }

    pub fn dot(&self, slot: Slot) -> Option<&Dot> {
        match slot {
            Slot::Origin => Some(&self.origin_dot),
            Slot::Target => self.target_dot.as_ref(),
        }
    }

    fn dots_mut(&mut self) -> impl Iterator<Item = &mut Dot> {
        std::iter::once(&mut self.origin_dot).chain(self.target_dot.as_mut())
    }

    pub fn wire(&self, part: Part) -> Option<&Wire> {
        self.wires.get(part.index())
    }

    pub fn label(&self, part: Part) -> Option<&Label> {
        self.labels.get(part.index())
    }

    /// Result of the last completed pass, `None` before the first one
    pub fn visibility(&self) -> Option<Visibility> {
        self.visibility
    }

    pub fn world_positions(&self) -> &[Vec4] {
        &self.world
    }

    pub fn view_positions(&self) -> &[Vec4] {
        &self.view
    }

    pub fn clip_positions(&self) -> &[Vec4] {
        &self.clip
    }

    /// Canvas positions of every point, valid only while the stage is clean
    pub fn canvas_positions(&self) -> Option<&[Vec2]> {
        let fresh = self.stage.get() == UpdateStage::Clean
            && self.visibility == Some(Visibility::Visible);
        fresh.then_some(self.canvas.as_slice())
    }

    /// Canvas position of one anchor, `None` while stale or hidden
    pub fn canvas_pos(&self, slot: Slot) -> Option<Vec2> {
        let canvas = self.canvas_positions()?;
        match slot {
            Slot::Origin => canvas.first().copied(),
            Slot::Target if self.target.is_some() => canvas.last().copied(),
            Slot::Target => None,
        }
    }

    /// World-space lengths, recomputed first if an anchor moved
    pub fn lengths(&mut self) -> Lengths {
        self.refresh_world();
        self.lengths
    }

    // ── Mutation ──────────────────────────────────────────────

    /// Move one anchor; false for the target slot of an issue
    pub fn set_anchor(&mut self, slot: Slot, anchor: Anchor) -> bool {
        match (slot, self.target.as_mut()) {
            (Slot::Origin, _) => self.origin = anchor,
            (Slot::Target, Some(target)) => *target = anchor,
            (Slot::Target, None) => return false,
        }
        UpdateStage::raise(&self.stage, UpdateStage::WorldDirty);
        true
    }

    /// Edit flags in place; widgets pick up the change on the next pass
    pub fn update_flags(&mut self, edit: impl FnOnce(&mut AnnotationFlags)) {
        let before = self.flags;
        edit(&mut self.flags);
        if self.kind == AnnotationKind::Issue {
            self.flags.target_visible = false;
        }
        if self.flags != before {
            self.apply_flags();
            UpdateStage::raise(&self.stage, UpdateStage::ClipDirty);
        }
    }

    /// Force a canvas pass without changing anything upstream
    pub fn invalidate(&self) {
        UpdateStage::raise(&self.stage, UpdateStage::ClipDirty);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.update_flags(|f| f.visible = visible);
    }

    pub fn set_clickable(&mut self, clickable: bool) {
        self.update_flags(|f| f.clickable = clickable);
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        for dot in self.dots_mut() {
            dot.set_fill_color(color);
        }
        for wire in &mut self.wires {
            wire.color = color;
        }
        for label in &mut self.labels {
            label.color = color;
        }
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        for dot in self.dots_mut() {
            dot.set_highlighted(highlighted);
        }
    }

    /// Changes that take effect without a projection pass
    fn apply_flags(&mut self) {
        let f = self.flags;
        self.origin_dot.set_clickable(f.clickable);
        self.origin_dot.set_visible(f.visible && f.origin_visible);
        if let Some(dot) = self.target_dot.as_mut() {
            dot.set_clickable(f.clickable);
            dot.set_visible(f.visible && f.target_visible);
        }
        if !f.visible {
            self.hide_parts();
        }
    }

    fn hide_parts(&mut self) {
        for wire in &mut self.wires {
            wire.set_visible(false);
        }
        for label in &mut self.labels {
            label.set_visible(false);
        }
    }

    fn set_culled(&mut self, culled: bool) {
        for dot in self.dots_mut() {
            dot.set_culled(culled);
        }
        for wire in &mut self.wires {
            wire.set_culled(culled);
        }
        for label in &mut self.labels {
            label.set_culled(culled);
        }
    }

    // ── Update pipeline ───────────────────────────────────────

    /// Points to project: origin, the two axis corners and target, or the single anchor
    fn points(&self) -> Vec<Vec3> {
        let o = self.origin.world_pos;
        match &self.target {
            Some(target) => {
                let t = target.world_pos;
                vec![o, Vec3::new(t.x, o.y, o.z), Vec3::new(t.x, t.y, o.z), t]
            }
            None => vec![o],
        }
    }

    fn anchor_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        std::iter::once(self.origin.world_pos).chain(self.target.as_ref().map(|t| t.world_pos))
    }

    fn refresh_world(&mut self) {
        if self.stage.get() < UpdateStage::WorldDirty {
            return;
        }
        self.world = self.points().iter().map(|p| p.extend(1.0)).collect();
        self.lengths = match &self.target {
            Some(target) => {
                let d = target.world_pos - self.origin.world_pos;
                Lengths {
                    total: d.length(),
                    x: d.x.abs(),
                    y: d.y.abs(),
                    z: d.z.abs(),
                }
            }
            None => Lengths::default(),
        };
        self.stage.set(UpdateStage::ViewDirty);
    }

    /// Bring canvas positions up to date.
    ///
    /// Invisible entities are skipped and keep their stage. Every other pass leaves
    /// the stage clean, including section-plane changes.
    pub fn update(&mut self, projector: &Projector, format: &LabelFormat) -> UpdateOutcome {
        if !self.flags.visible {
            return UpdateOutcome::Skipped;
        }
        let stage = self.stage.get();
        if stage == UpdateStage::Clean {
            return UpdateOutcome::Unchanged;
        }

        self.refresh_world();
        if stage >= UpdateStage::ViewDirty {
            self.view = self
                .world
                .iter()
                .map(|w| projector.to_view(w.truncate()))
                .collect();
        }

        let outcome = self.project(projector, format);
        self.stage.set(UpdateStage::Clean);
        outcome
    }

    fn project(&mut self, projector: &Projector, format: &LabelFormat) -> UpdateOutcome {
        let sliced = self.anchor_positions().any(|p| projector.is_sliced(p));
        self.set_culled(sliced);
        if sliced {
            self.visibility = Some(Visibility::Sliced);
            return UpdateOutcome::Culled;
        }

        let behind = [self.view.first(), self.view.last()]
            .into_iter()
            .flatten()
            .any(|v| projector.behind_near(*v));
        if behind {
            for dot in self.dots_mut() {
                dot.set_visible(false);
            }
            self.hide_parts();
            self.visibility = Some(Visibility::BehindNear);
            return UpdateOutcome::BehindNear;
        }

        self.clip = self.view.iter().map(|v| projector.to_clip(*v)).collect();
        self.canvas = self
            .clip
            .iter()
            .map(|c| projector.clip_to_canvas(*c))
            .collect();
        self.visibility = Some(Visibility::Visible);
        self.push_positions(format);
        UpdateOutcome::Projected
    }

    fn push_positions(&mut self, format: &LabelFormat) {
        let f = self.flags;
        let first = self.canvas[0];
        self.origin_dot.set_pos(first);
        self.origin_dot.set_visible(f.visible && f.origin_visible);

        if self.target.is_none() || self.canvas.len() < 4 {
            return;
        }
        let c = [self.canvas[0], self.canvas[1], self.canvas[2], self.canvas[3]];
        if let Some(dot) = self.target_dot.as_mut() {
            dot.set_pos(c[3]);
            dot.set_visible(f.visible && f.target_visible);
        }

        let axes = f.visible && f.axis_enabled && f.axis_visible;
        let segments = [
            (Part::Length, c[0], c[3], f.visible && f.wire_visible),
            (Part::X, c[0], c[1], axes && f.x_axis_visible),
            (Part::Y, c[1], c[2], axes && f.y_axis_visible),
            (Part::Z, c[2], c[3], axes && f.z_axis_visible),
        ];
        let lengths = self.lengths;

        for (row, (part, start, end, shown)) in segments.into_iter().enumerate() {
            let wire = &mut self.wires[part.index()];
            wire.set_ends(start, end);
            wire.set_visible(shown);

            let (length, enabled) = match part {
                Part::Length => (lengths.total, f.length_label_enabled),
                Part::X => (lengths.x, f.x_label_enabled),
                Part::Y => (lengths.y, f.y_label_enabled),
                Part::Z => (lengths.z, f.z_label_enabled),
            };
            let long_enough =
                part == Part::Length || wire.canvas_length() >= format.min_axis_length;
            let pos = if f.labels_on_wires {
                wire.midpoint()
            } else {
                c[3] + Vec2::new(12.0, 16.0 * row as f32)
            };

            let label = &mut self.labels[part.index()];
            label.set_pos(pos);
            label.set_text(format.text(length, f.approximate));
            label.set_visible(shown && f.labels_visible && enabled && long_enough);
        }
    }
}

impl std::fmt::Debug for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Annotation")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .field("target", &self.target)
            .field("stage", &self.stage.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::projection::{CanvasBoundary, SectionPlane};
    use glam::Mat4;

    fn scene() -> Scene {
        Scene::new(CanvasBoundary::new(0.0, 0.0, 800.0, 600.0))
    }

    fn format() -> LabelFormat {
        LabelFormat {
            metrics: Metrics::default(),
            precision: 2,
            min_axis_length: 25.0,
        }
    }

    fn projector(scene: &Scene) -> Projector {
        scene.projector(Vec2::ZERO, -0.3)
    }

    fn measurement(scene: &Scene, o: [f32; 3], t: [f32; 3]) -> Annotation {
        let params = MeasurementParams::between(AnchorParams::at(o), AnchorParams::at(t));
        Annotation::measurement(
            "m".to_string(),
            &params,
            &PluginDefaults::default(),
            scene,
            Rc::new(|_, _| {}),
        )
    }

    #[test]
    fn test_axis_corner_points() {
        let scene = scene();
        let mut m = measurement(&scene, [0.0, 0.0, -1.0], [1.0, 2.0, -3.0]);
        m.update(&projector(&scene), &format());
        let world: Vec<Vec3> = m.world_positions().iter().map(|w| w.truncate()).collect();
        assert_eq!(
            world,
            vec![
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 2.0, -1.0),
                Vec3::new(1.0, 2.0, -3.0)
            ]
        );
        assert!(m.world_positions().iter().all(|w| w.w == 1.0));
    }

    #[test]
    fn test_second_pass_is_unchanged() {
        let scene = scene();
        let mut m = measurement(&scene, [0.0, 0.0, -1.0], [0.5, 0.0, -1.0]);
        let p = projector(&scene);
        assert_eq!(m.update(&p, &format()), UpdateOutcome::Projected);
        let first = m.canvas_positions().unwrap().to_vec();
        assert_eq!(m.update(&p, &format()), UpdateOutcome::Unchanged);
        assert_eq!(m.canvas_positions().unwrap(), first.as_slice());
    }

    #[test]
    fn test_scene_change_raises_stage() {
        let scene = scene();
        let mut m = measurement(&scene, [0.0, 0.0, -1.0], [0.5, 0.0, -1.0]);
        m.update(&projector(&scene), &format());
        assert_eq!(m.stage(), UpdateStage::Clean);

        scene.set_proj_matrix(Mat4::IDENTITY);
        assert_eq!(m.stage(), UpdateStage::ClipDirty);
        assert!(m.canvas_pos(Slot::Origin).is_none());

        scene.set_view_matrix(Mat4::IDENTITY);
        assert_eq!(m.stage(), UpdateStage::ViewDirty);
    }

    #[test]
    fn test_sliced_anchor_culls_everything() {
        let scene = scene();
        scene.add_section_plane(SectionPlane::new("p", Vec3::ZERO, Vec3::X));
        let mut m = measurement(&scene, [0.5, 0.0, -1.0], [-0.5, 0.0, -1.0]);

        assert_eq!(m.update(&projector(&scene), &format()), UpdateOutcome::Culled);
        assert!(m.dot(Slot::Origin).unwrap().culled());
        assert!(m.dot(Slot::Target).unwrap().culled());
        assert!(!m.wire(Part::Length).unwrap().is_shown());
        // Culled entities skip clip-space work
        assert!(m.clip_positions().is_empty());
        assert_eq!(m.stage(), UpdateStage::Clean);
    }

    #[test]
    fn test_near_threshold_hides_dots() {
        let scene = scene();
        let mut m = measurement(&scene, [0.0, 0.0, -1.0], [0.0, 0.0, -0.1]);
        assert_eq!(
            m.update(&projector(&scene), &format()),
            UpdateOutcome::BehindNear
        );
        assert!(!m.dot(Slot::Origin).unwrap().is_shown());
        assert!(!m.dot(Slot::Target).unwrap().is_shown());
        assert!(m.canvas_pos(Slot::Origin).is_none());
    }

    #[test]
    fn test_invisible_entity_stays_dirty() {
        let scene = scene();
        let mut m = measurement(&scene, [0.0, 0.0, -1.0], [0.5, 0.0, -1.0]);
        m.set_visible(false);
        assert_eq!(m.update(&projector(&scene), &format()), UpdateOutcome::Skipped);
        assert_eq!(m.stage(), UpdateStage::WorldDirty);

        m.set_visible(true);
        assert_eq!(
            m.update(&projector(&scene), &format()),
            UpdateOutcome::Projected
        );
    }

    #[test]
    fn test_label_text() {
        let scene = scene();
        let mut m = measurement(&scene, [0.0, 0.0, -1.0], [0.3, 0.4, -1.0]);
        m.update_flags(|f| f.approximate = true);
        m.update(&projector(&scene), &format());
        assert_eq!(m.label(Part::Length).unwrap().text(), "~0.50m");
        assert_eq!(m.label(Part::X).unwrap().text(), "~0.30m");
    }

    #[test]
    fn test_short_axis_label_hidden() {
        let scene = scene();
        // x axis spans 0.01 * 400 = 4 px on screen
        let mut m = measurement(&scene, [0.0, 0.0, -1.0], [0.01, 0.5, -1.0]);
        m.update(&projector(&scene), &format());
        assert!(m.wire(Part::X).unwrap().is_shown());
        assert!(!m.label(Part::X).unwrap().is_shown());
        assert!(m.label(Part::Y).unwrap().is_shown());
    }

    #[test]
    fn test_lengths_follow_anchor_moves() {
        let scene = scene();
        let mut m = measurement(&scene, [0.0, 0.0, -1.0], [1.0, 0.0, -1.0]);
        assert_eq!(m.lengths().total, 1.0);
        m.set_anchor(Slot::Target, Anchor::new(Vec3::new(0.0, 2.0, -1.0), None));
        assert_eq!(m.lengths().total, 2.0);
    }

    #[test]
    fn test_issue_has_one_anchor() {
        let scene = scene();
        let mut issue = Annotation::issue(
            "i".to_string(),
            &IssueParams::at(AnchorParams::at([0.0, 0.0, -2.0])),
            &PluginDefaults::default(),
            &scene,
            Rc::new(|_, _| {}),
        );
        assert!(!issue.set_anchor(Slot::Target, Anchor::new(Vec3::ONE, None)));
        issue.update(&projector(&scene), &format());
        assert_eq!(issue.canvas_pos(Slot::Origin), Some(Vec2::new(400.0, 300.0)));
        assert_eq!(issue.canvas_pos(Slot::Target), None);
        assert_eq!(issue.dot(Slot::Origin).unwrap().size(), Dot::ISSUE_SIZE);
    }

    #[test]
    fn test_drop_releases_scene_listener() {
        let scene = scene();
        let m = measurement(&scene, [0.0; 3], [1.0; 3]);
        assert_eq!(scene.listener_count(), 1);
        drop(m);
        assert_eq!(scene.listener_count(), 0);
    }
}
