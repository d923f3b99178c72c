//! Factory and registry for annotations.

use std::rc::Rc;

use glam::Vec2;
use shared::{IssueParams, MeasurementParams, ObjectId};

use super::entity::{Annotation, LabelFormat, MarkerOwner, Slot};
use crate::config::AppSettings;
use crate::error::MarkupError;
use crate::events::{Observers, Subscription};
use crate::overlay::{OverlayEvent, OverlayEventKind};
use crate::scene::Scene;
use crate::viewport::projection::{OverlayContainer, Projector};

/// Label min axis length used when an invalid value is configured
const DEFAULT_LABEL_MIN_AXIS_LENGTH: f32 = 25.0;

/// Lifecycle and interaction events raised by the plugin
#[derive(Debug, Clone, PartialEq)]
pub enum PluginEvent {
    MeasurementCreated(ObjectId),
    /// First point of an interactive measurement placed
    MeasurementStart(ObjectId),
    /// Interactive measurement completed
    MeasurementEnd(ObjectId),
    /// Interactive measurement abandoned; the entity is destroyed right after
    MeasurementCancel(ObjectId),
    MeasurementDestroyed(ObjectId),
    IssueCreated(ObjectId),
    IssueDestroyed(ObjectId),
    MouseOver { id: ObjectId, slot: Slot },
    MouseLeave { id: ObjectId, slot: Slot },
    ContextMenu { id: ObjectId, slot: Slot, canvas_pos: Vec2 },
}

pub struct MarkupPlugin {
    scene: Rc<Scene>,
    settings: AppSettings,
    container: OverlayContainer,
    annotations: Vec<Annotation>,
    events: Observers<PluginEvent>,
    hovered: Option<(ObjectId, Slot)>,
}

impl MarkupPlugin {
    /// Create the plugin; markers need an overlay container to live in
    pub fn new(
        scene: Rc<Scene>,
        settings: AppSettings,
        container: Option<OverlayContainer>,
    ) -> Result<Self, MarkupError> {
        let container = container.ok_or(MarkupError::MissingContainer)?;
        Ok(Self::with_container(scene, settings, container))
    }

    pub fn with_container(
        scene: Rc<Scene>,
        settings: AppSettings,
        container: OverlayContainer,
    ) -> Self {
        let mut plugin = Self {
            scene,
            settings,
            container,
            annotations: Vec::new(),
            events: Observers::new(),
            hovered: None,
        };
        let min_axis_length = plugin.settings.controls.label_min_axis_length;
        plugin.set_label_min_axis_length(min_axis_length);
        plugin
    }

    pub fn scene(&self) -> &Rc<Scene> {
        &self.scene
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn container(&self) -> OverlayContainer {
        self.container
    }

    // ── Events ────────────────────────────────────────────────

    pub fn on(&self, callback: impl Fn(&PluginEvent) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    /// Raise an event on behalf of a control
    pub fn emit(&self, event: PluginEvent) {
        self.events.notify(&event);
    }

    fn marker_owner(&self, id: &ObjectId) -> MarkerOwner {
        let events = self.events.clone();
        let id = id.clone();
        Rc::new(move |slot: Slot, event: &OverlayEvent| {
            let raised = match event.kind {
                OverlayEventKind::MouseOver => PluginEvent::MouseOver {
                    id: id.clone(),
                    slot,
                },
                OverlayEventKind::MouseLeave => PluginEvent::MouseLeave {
                    id: id.clone(),
                    slot,
                },
                OverlayEventKind::ContextMenu => PluginEvent::ContextMenu {
                    id: id.clone(),
                    slot,
                    canvas_pos: event.canvas_pos,
                },
                _ => return,
            };
            events.notify(&raised);
        })
    }

    // ── Factory ───────────────────────────────────────────────

    /// Requested id if it is free, otherwise a fresh one
    fn claim_id(&self, requested: Option<ObjectId>) -> ObjectId {
        match requested {
            Some(id) if self.get(&id).is_some() => {
                let fresh = uuid::Uuid::new_v4().to_string();
                tracing::warn!("Annotation id '{id}' already in use, using '{fresh}' instead");
                fresh
            }
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn create_measurement(&mut self, params: MeasurementParams) -> ObjectId {
        let id = self.claim_id(params.id.clone());
        let owner = self.marker_owner(&id);
        let annotation = Annotation::measurement(
            id.clone(),
            &params,
            &self.settings.defaults,
            &self.scene,
            owner,
        );
        self.annotations.push(annotation);
        tracing::info!("Created measurement {id}");
        self.emit(PluginEvent::MeasurementCreated(id.clone()));
        id
    }

    pub fn create_issue(&mut self, params: IssueParams) -> ObjectId {
        let id = self.claim_id(params.id.clone());
        let owner = self.marker_owner(&id);
        let annotation =
            Annotation::issue(id.clone(), &params, &self.settings.defaults, &self.scene, owner);
        self.annotations.push(annotation);
        tracing::info!("Created issue {id}");
        self.emit(PluginEvent::IssueCreated(id.clone()));
        id
    }

    /// Remove an annotation with its markers and scene listener
    pub fn destroy(&mut self, id: &str) -> bool {
        let Some(index) = self.annotations.iter().position(|a| a.id() == id) else {
            return false;
        };
        let annotation = self.annotations.remove(index);
        if self.hovered.as_ref().is_some_and(|(h, _)| h == id) {
            self.hovered = None;
        }
        let id = annotation.id().clone();
        let event = if annotation.is_measurement() {
            PluginEvent::MeasurementDestroyed(id.clone())
        } else {
            PluginEvent::IssueDestroyed(id.clone())
        };
        drop(annotation);
        tracing::info!("Destroyed annotation {id}");
        self.emit(event);
        true
    }

    pub fn clear(&mut self) {
        let ids = self.ids();
        for id in ids {
            self.destroy(&id);
        }
    }

    // ── Registry ──────────────────────────────────────────────

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id() == id)
    }

    /// Ids in creation order
    pub fn ids(&self) -> Vec<ObjectId> {
        self.annotations.iter().map(|a| a.id().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    // ── Projection ────────────────────────────────────────────

    fn projector(&self) -> Projector {
        self.scene.projector(
            self.container.canvas_offset,
            self.settings.controls.near_threshold,
        )
    }

    fn label_format(&self) -> LabelFormat {
        LabelFormat {
            metrics: self.scene.metrics(),
            precision: self.settings.labels.precision,
            min_axis_length: self.settings.controls.label_min_axis_length,
        }
    }

    /// Per-frame pass bringing every dirty annotation up to date
    pub fn update(&mut self) {
        let projector = self.projector();
        let format = self.label_format();
        for annotation in &mut self.annotations {
            annotation.update(&projector, &format);
        }
    }

    /// Canvas position of one anchor, recomputed first if stale
    pub fn canvas_pos(&mut self, id: &str, slot: Slot) -> Option<Vec2> {
        let projector = self.projector();
        let format = self.label_format();
        let annotation = self.get_mut(id)?;
        annotation.update(&projector, &format);
        annotation.canvas_pos(slot)
    }

    /// Measured distance scaled by the scene metrics
    pub fn length(&mut self, id: &str) -> Option<f32> {
        let scale = self.scene.metrics().scale;
        let annotation = self.get_mut(id)?;
        if !annotation.is_measurement() {
            return None;
        }
        Some(annotation.lengths().total * scale)
    }

    // ── Bulk settings ─────────────────────────────────────────

    /// Show or hide axis wires on every measurement and on new ones
    pub fn set_axis_visible(&mut self, visible: bool) {
        self.settings.defaults.axis_visible = visible;
        for annotation in self.annotations.iter_mut().filter(|a| a.is_measurement()) {
            annotation.update_flags(|f| f.axis_visible = visible);
        }
    }

    pub fn set_labels_visible(&mut self, visible: bool) {
        self.settings.defaults.labels_visible = visible;
        for annotation in self.annotations.iter_mut().filter(|a| a.is_measurement()) {
            annotation.update_flags(|f| f.labels_visible = visible);
        }
    }

    pub fn set_label_min_axis_length(&mut self, length: f32) {
        let length = if length < 1.0 {
            tracing::warn!(
                "label_min_axis_length must be >= 1, got {length}; using {DEFAULT_LABEL_MIN_AXIS_LENGTH}"
            );
            DEFAULT_LABEL_MIN_AXIS_LENGTH
        } else {
            length
        };
        self.settings.controls.label_min_axis_length = length;
        for annotation in &self.annotations {
            annotation.invalidate();
        }
    }

    pub fn label_min_axis_length(&self) -> f32 {
        self.settings.controls.label_min_axis_length
    }

    // ── Marker interaction ────────────────────────────────────

    /// Top-most clickable marker under a canvas position
    pub fn marker_at(&self, canvas_pos: Vec2) -> Option<(ObjectId, Slot)> {
        self.annotations.iter().rev().find_map(|a| {
            [Slot::Target, Slot::Origin].into_iter().find_map(|slot| {
                a.dot(slot)
                    .filter(|dot| dot.hit_test(canvas_pos))
                    .map(|_| (a.id().clone(), slot))
            })
        })
    }

    fn dispatch_to(&self, target: &(ObjectId, Slot), event: &OverlayEvent) -> bool {
        self.get(&target.0)
            .and_then(|a| a.dot(target.1))
            .is_some_and(|dot| dot.dispatch(event))
    }

    /// Route an overlay pointer event to the marker under it.
    ///
    /// Moves also synthesize leave/over pairs when the marker under the pointer
    /// changes. Returns whether a marker intercepted the event.
    pub fn dispatch_marker_event(&mut self, event: &OverlayEvent) -> bool {
        let under = self.marker_at(event.canvas_pos);

        if event.kind == OverlayEventKind::MouseMove && under != self.hovered {
            if let Some(previous) = self.hovered.take() {
                let leave = OverlayEvent::new(OverlayEventKind::MouseLeave, event.canvas_pos);
                self.dispatch_to(&previous, &leave);
            }
            if let Some(current) = &under {
                let over = OverlayEvent::new(OverlayEventKind::MouseOver, event.canvas_pos);
                self.dispatch_to(current, &over);
            }
            self.hovered = under.clone();
        }

        match &under {
            Some(target) => self.dispatch_to(target, event),
            None => false,
        }
    }
}

impl Drop for MarkupPlugin {
    fn drop(&mut self) {
        self.clear();
    }
}
