//! Hover/click state machine over a set of registered pickable surfaces.
//!
//! Only registered surfaces take part in picking; decorative geometry never
//! reaches the tracker. Interaction data (actions, highlights) lives in the
//! tracker's own side table, keyed by `SurfaceId`.

use super::geometry::{cursor_ray, ndc_in_view, PickCamera, Shape, ViewportRect};
use crate::error::PickMiss;
use glam::Vec2;
use std::collections::BTreeMap;

/// Handle for a registered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceId(u64);

/// Identifies a highlight visual (e.g. a frame border) owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightId(pub u32);

/// Identifies a caller-owned toggle (e.g. a laptop lid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToggleId(pub u32);

/// What a click on a surface does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    OpenUrl(String),
    Toggle(ToggleId),
}

/// Pointer affordance requested from the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorCue {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(SurfaceId),
}

impl HoverState {
    pub fn surface(self) -> Option<SurfaceId> {
        match self {
            HoverState::Idle => None,
            HoverState::Hovering(id) => Some(id),
        }
    }
}

/// Emitted once per hover transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverChange {
    pub from: Option<SurfaceId>,
    pub to: Option<SurfaceId>,
}

/// Receives the visible side effects of picking.
pub trait InteractionSink {
    fn set_cursor(&mut self, cue: CursorCue);
    fn set_highlight(&mut self, id: HighlightId, on: bool);
    fn perform(&mut self, action: &Action);
}

#[derive(Debug, Clone)]
struct PickEntry {
    shape: Shape,
    action: Option<Action>,
    highlight: Option<HighlightId>,
}

pub struct InteractionTracker {
    camera: Box<dyn PickCamera>,
    entries: BTreeMap<SurfaceId, PickEntry>,
    next_id: u64,
    hover: HoverState,
    /// Highlight currently switched on, cached so it can be turned off even
    /// after its surface was deregistered.
    lit: Option<HighlightId>,
    cursor: CursorCue,
    pointer: Option<Vec2>,
    detached: bool,
}

impl InteractionTracker {
    pub fn new<C: PickCamera + 'static>(camera: C) -> Self {
        Self {
            camera: Box::new(camera),
            entries: BTreeMap::new(),
            next_id: 1,
            hover: HoverState::Idle,
            lit: None,
            cursor: CursorCue::Default,
            pointer: None,
            detached: false,
        }
    }

    /// Adds a pickable surface with an optional click action and hover highlight.
    pub fn register(
        &mut self,
        shape: Shape,
        action: Option<Action>,
        highlight: Option<HighlightId>,
    ) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            PickEntry {
                shape,
                action,
                highlight,
            },
        );
        id
    }

    /// Removes a surface. If it was hovered, the tracker drops to `Idle` and
    /// its highlight and cursor cue are reset through `sink`.
    pub fn deregister(&mut self, id: SurfaceId, sink: &mut dyn InteractionSink) -> bool {
        let removed = self.entries.remove(&id).is_some();
        if removed && self.hover == HoverState::Hovering(id) {
            self.transition(None, sink);
        }
        removed
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self) -> HoverState {
        self.hover
    }

    /// Last pointer position in normalized device coordinates.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Action bound to `id`, if any.
    pub fn action(&self, id: SurfaceId) -> Option<&Action> {
        self.entries.get(&id).and_then(|e| e.action.as_ref())
    }

    /// Re-picks at client position `(x, y)` inside `viewport`.
    ///
    /// Returns the transition, if any. Moving over the surface that is already
    /// hovered returns `None` and touches nothing.
    pub fn on_pointer_move(
        &mut self,
        x: f32,
        y: f32,
        viewport: ViewportRect,
        sink: &mut dyn InteractionSink,
    ) -> Option<HoverChange> {
        if self.detached {
            log::trace!("pointer move ignored: {:?}", PickMiss::Detached);
            return None;
        }
        let Some(ndc) = viewport.normalize(x, y) else {
            log::trace!("pointer move ignored: {:?}", PickMiss::DegenerateViewport);
            return None;
        };
        self.pointer = Some(ndc);

        let target = if ndc_in_view(ndc) {
            self.pick(ndc)
        } else {
            log::trace!("no pick: {:?}", PickMiss::OutsideViewport);
            None
        };
        self.transition(target, sink)
    }

    /// Fires the hovered surface's action, once.
    pub fn on_click(&mut self, sink: &mut dyn InteractionSink) -> Option<Action> {
        if self.detached {
            log::trace!("click ignored: {:?}", PickMiss::Detached);
            return None;
        }
        let id = self.hover.surface()?;
        let Some(entry) = self.entries.get(&id) else {
            log::trace!("click on {:?}: {:?}", id, PickMiss::StaleSurface);
            self.transition(None, sink);
            return None;
        };
        let action = entry.action.clone()?;
        log::debug!("click on {:?} -> {:?}", id, action);
        sink.perform(&action);
        Some(action)
    }

    /// Resets cursor and highlight and stops reacting to events. Idempotent.
    pub fn detach(&mut self, sink: &mut dyn InteractionSink) {
        if self.detached {
            return;
        }
        if let Some(h) = self.lit.take() {
            sink.set_highlight(h, false);
        }
        if self.cursor != CursorCue::Default {
            sink.set_cursor(CursorCue::Default);
            self.cursor = CursorCue::Default;
        }
        self.hover = HoverState::Idle;
        self.pointer = None;
        self.detached = true;
    }

    /// Clears the detached flag so a pointer hub can feed the tracker again.
    pub(crate) fn reattach(&mut self) {
        self.detached = false;
    }

    /// Nearest registered surface under `ndc`.
    fn pick(&self, ndc: Vec2) -> Option<SurfaceId> {
        let ray = cursor_ray(self.camera.as_ref(), ndc)?;
        let mut best: Option<(f32, SurfaceId)> = None;
        for (id, entry) in &self.entries {
            let Some(t) = entry.shape.intersect(&ray) else {
                continue;
            };
            match best {
                Some((best_t, _)) if t >= best_t => {}
                _ => best = Some((t, *id)),
            }
        }
        best.map(|(_, id)| id)
    }

    fn transition(
        &mut self,
        target: Option<SurfaceId>,
        sink: &mut dyn InteractionSink,
    ) -> Option<HoverChange> {
        let from = self.hover.surface();
        if from == target {
            return None;
        }

        let entry = target.and_then(|id| self.entries.get(&id));
        let next_lit = entry.and_then(|e| e.highlight);
        let next_cursor = match entry.and_then(|e| e.action.as_ref()) {
            Some(_) => CursorCue::Pointer,
            None => CursorCue::Default,
        };

        // Surfaces sharing a highlight (frame + glass) keep it lit.
        if self.lit != next_lit {
            if let Some(h) = self.lit {
                sink.set_highlight(h, false);
            }
            if let Some(h) = next_lit {
                sink.set_highlight(h, true);
            }
            self.lit = next_lit;
        }
        if self.cursor != next_cursor {
            sink.set_cursor(next_cursor);
            self.cursor = next_cursor;
        }

        self.hover = match target {
            Some(id) => HoverState::Hovering(id),
            None => HoverState::Idle,
        };
        log::debug!("hover {:?} -> {:?}", from, target);
        Some(HoverChange { from, to: target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pick::{Effect, EffectQueue};
    use glam::{Mat4, Vec3};

    const VP: ViewportRect = ViewportRect {
        left: 0.0,
        top: 0.0,
        width: 100.0,
        height: 100.0,
    };

    fn camera() -> Mat4 {
        Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0)
            * Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
    }

    fn panel(x: f32) -> Shape {
        Shape::Rect {
            center: Vec3::new(x, 0.0, 0.0),
            half_u: Vec3::X * 0.5,
            half_v: Vec3::Y * 0.5,
        }
    }

    /// Two panels: A left of centre opening a URL, B right of centre toggling.
    fn setup() -> (InteractionTracker, SurfaceId, SurfaceId) {
        let mut t = InteractionTracker::new(camera());
        let a = t.register(
            panel(-1.0),
            Some(Action::OpenUrl("https://a.example".into())),
            Some(HighlightId(1)),
        );
        let b = t.register(panel(1.0), Some(Action::Toggle(ToggleId(9))), Some(HighlightId(2)));
        (t, a, b)
    }

    #[test]
    fn hover_moves_directly_between_surfaces() {
        let (mut t, a, b) = setup();
        let mut sink = EffectQueue::default();

        let ch = t.on_pointer_move(33.0, 50.0, VP, &mut sink);
        assert_eq!(ch, Some(HoverChange { from: None, to: Some(a) }));
        assert_eq!(t.state(), HoverState::Hovering(a));

        // Same surface again: no event, no effects.
        sink.drain();
        assert_eq!(t.on_pointer_move(34.0, 51.0, VP, &mut sink), None);
        assert!(sink.is_empty());

        let ch = t.on_pointer_move(67.0, 50.0, VP, &mut sink);
        assert_eq!(ch, Some(HoverChange { from: Some(a), to: Some(b) }));
        assert_eq!(t.state(), HoverState::Hovering(b));
        assert_eq!(
            sink.drain(),
            vec![
                Effect::Highlight(HighlightId(1), false),
                Effect::Highlight(HighlightId(2), true),
            ]
        );

        let ch = t.on_pointer_move(50.0, 50.0, VP, &mut sink);
        assert_eq!(ch, Some(HoverChange { from: Some(b), to: None }));
        assert_eq!(t.state(), HoverState::Idle);
        assert_eq!(
            sink.drain(),
            vec![
                Effect::Highlight(HighlightId(2), false),
                Effect::Cursor(CursorCue::Default),
            ]
        );
    }

    #[test]
    fn click_fires_only_while_hovering() {
        let (mut t, a, _) = setup();
        let mut sink = EffectQueue::default();

        assert_eq!(t.on_click(&mut sink), None);
        assert!(sink.is_empty());

        t.on_pointer_move(33.0, 50.0, VP, &mut sink);
        assert_eq!(t.state(), HoverState::Hovering(a));
        sink.drain();

        let fired = t.on_click(&mut sink);
        assert_eq!(fired, Some(Action::OpenUrl("https://a.example".into())));
        assert_eq!(
            sink.drain(),
            vec![Effect::Perform(Action::OpenUrl("https://a.example".into()))]
        );
    }

    #[test]
    fn nearest_surface_wins() {
        let mut t = InteractionTracker::new(camera());
        let _far = t.register(panel(0.0), None, None);
        let near = t.register(
            Shape::Rect {
                center: Vec3::new(0.0, 0.0, 1.0),
                half_u: Vec3::X * 0.2,
                half_v: Vec3::Y * 0.2,
            },
            None,
            None,
        );
        let mut sink = EffectQueue::default();
        t.on_pointer_move(50.0, 50.0, VP, &mut sink);
        assert_eq!(t.state(), HoverState::Hovering(near));
        // No action: cursor stays default.
        assert!(sink.is_empty());
    }

    #[test]
    fn degenerate_viewport_keeps_state() {
        let (mut t, a, _) = setup();
        let mut sink = EffectQueue::default();
        t.on_pointer_move(33.0, 50.0, VP, &mut sink);
        sink.drain();

        let empty = ViewportRect::sized(0.0, 0.0);
        assert_eq!(t.on_pointer_move(33.0, 50.0, empty, &mut sink), None);
        assert_eq!(t.state(), HoverState::Hovering(a));
        assert!(sink.is_empty());
    }

    #[test]
    fn leaving_viewport_goes_idle() {
        let (mut t, _, _) = setup();
        let mut sink = EffectQueue::default();
        t.on_pointer_move(33.0, 50.0, VP, &mut sink);
        let ch = t.on_pointer_move(-20.0, 50.0, VP, &mut sink);
        assert_eq!(ch.map(|c| c.to), Some(None));
        assert_eq!(t.state(), HoverState::Idle);
    }

    #[test]
    fn deregistering_the_hovered_surface_resets_to_idle() {
        let (mut t, a, _) = setup();
        let mut sink = EffectQueue::default();
        t.on_pointer_move(33.0, 50.0, VP, &mut sink);
        sink.drain();

        assert!(t.deregister(a, &mut sink));
        assert_eq!(t.state(), HoverState::Idle);
        assert_eq!(
            sink.drain(),
            vec![
                Effect::Highlight(HighlightId(1), false),
                Effect::Cursor(CursorCue::Default),
            ]
        );

        assert!(!t.deregister(a, &mut sink));
        assert_eq!(t.on_click(&mut sink), None);
        assert!(sink.is_empty());
    }

    #[test]
    fn detach_resets_and_silences() {
        let (mut t, _, _) = setup();
        let mut sink = EffectQueue::default();
        t.on_pointer_move(33.0, 50.0, VP, &mut sink);
        sink.drain();

        t.detach(&mut sink);
        assert_eq!(
            sink.drain(),
            vec![
                Effect::Highlight(HighlightId(1), false),
                Effect::Cursor(CursorCue::Default),
            ]
        );
        t.detach(&mut sink);
        assert!(sink.is_empty());

        assert_eq!(t.on_pointer_move(67.0, 50.0, VP, &mut sink), None);
        assert_eq!(t.on_click(&mut sink), None);
        assert_eq!(t.state(), HoverState::Idle);
        assert!(sink.is_empty());
    }

    #[test]
    fn detach_without_activity_is_silent() {
        let (mut t, _, _) = setup();
        let mut sink = EffectQueue::default();
        t.detach(&mut sink);
        assert!(sink.is_empty());
        assert!(t.is_detached());
    }
}
