use std::cell::Cell;

use crate::scene::SceneEvent;

/// How much of an annotation's projection is stale.
///
/// Ordered so that a higher stage implies every lower one: world-dirty entities also
/// need new view, clip and canvas positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum UpdateStage {
    #[default]
    Clean,
    /// Projection, canvas, section planes, metrics or flags changed
    ClipDirty,
    /// View matrix changed
    ViewDirty,
    /// An anchor moved
    WorldDirty,
}

impl UpdateStage {
    /// Raise `cell` to at least `stage`; never lowers it
    pub fn raise(cell: &Cell<UpdateStage>, stage: UpdateStage) {
        if stage > cell.get() {
            cell.set(stage);
        }
    }

    /// Stage a scene change puts annotations in
    pub fn for_scene_event(event: &SceneEvent) -> Option<UpdateStage> {
        match event {
            SceneEvent::ViewMatrix => Some(UpdateStage::ViewDirty),
            SceneEvent::ProjMatrix
            | SceneEvent::CanvasBoundary
            | SceneEvent::SectionPlanes
            | SceneEvent::Metrics => Some(UpdateStage::ClipDirty),
            SceneEvent::CameraControlActive(_) => None,
        }
    }
}
