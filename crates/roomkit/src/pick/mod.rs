//! Pointer picking.
//!
//! - `geometry`: viewport normalization, camera rays, shape intersection.
//! - `tracker`: the hover/click state machine over registered surfaces.
//! - `hub`: fans pointer events out to attached trackers via scoped subscriptions.

pub mod geometry;
pub mod hub;
pub mod tracker;

pub use self::geometry::{cursor_ray, PickCamera, Ray, Shape, ViewportRect};
pub use self::hub::{PointerEvent, PointerHub, Subscription};
pub use self::tracker::{
    Action, CursorCue, HighlightId, HoverChange, HoverState, InteractionSink, InteractionTracker,
    SurfaceId, ToggleId,
};

/// A recorded side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Cursor(CursorCue),
    Highlight(HighlightId, bool),
    Perform(Action),
}

/// Sink that queues effects for the host to apply after event dispatch.
#[derive(Debug, Default)]
pub struct EffectQueue {
    effects: Vec<Effect>,
}

impl EffectQueue {
    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl InteractionSink for EffectQueue {
    fn set_cursor(&mut self, cue: CursorCue) {
        self.effects.push(Effect::Cursor(cue));
    }

    fn set_highlight(&mut self, id: HighlightId, on: bool) {
        self.effects.push(Effect::Highlight(id, on));
    }

    fn perform(&mut self, action: &Action) {
        self.effects.push(Effect::Perform(action.clone()));
    }
}
