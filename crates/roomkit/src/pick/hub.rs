//! Pointer event fan-out with scoped subscriptions.
//!
//! Several trackers may share one viewport. Each `attach` returns a
//! `Subscription`; releasing (or dropping) it is the only way to stop delivery,
//! and it detaches the tracker so cursor and highlight cues are reset.

use super::geometry::ViewportRect;
use super::tracker::{InteractionSink, InteractionTracker};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

/// Input delivered by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved to client position `(x, y)`; `viewport` is the current
    /// bounding rectangle of the rendered view.
    Move { x: f32, y: f32, viewport: ViewportRect },
    Click,
}

pub type SharedTracker = Rc<RefCell<InteractionTracker>>;
pub type SharedSink = Rc<RefCell<dyn InteractionSink>>;

#[derive(Clone)]
struct Listener {
    id: u64,
    tracker: SharedTracker,
    sink: SharedSink,
}

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<Listener>,
    /// Released listeners whose tracker or sink was borrowed at release time
    /// (a sink releasing its own subscription mid-dispatch). Detached once the
    /// borrow ends.
    deferred: Vec<Listener>,
}

#[derive(Default)]
pub struct PointerHub {
    inner: Rc<RefCell<HubInner>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts delivering events to `tracker`, with effects going to `sink`.
    pub fn attach(&self, tracker: SharedTracker, sink: SharedSink) -> Subscription {
        tracker.borrow_mut().reattach();
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.listeners.push(Listener { id, tracker, sink });
        log::debug!("pointer hub: attached listener {} ({} total)", id, inner.listeners.len());
        Subscription {
            id,
            hub: Rc::downgrade(&self.inner),
            released: false,
        }
    }

    /// Delivers `event` to every attached tracker, in attach order. Returns how
    /// many trackers received it.
    pub fn dispatch(&self, event: &PointerEvent) -> usize {
        // Iterate a snapshot: the listener list may change while a sink runs.
        let listeners: Vec<Listener> = self.inner.borrow().listeners.clone();
        let mut delivered = 0;
        for l in &listeners {
            if !self.is_attached(l.id) {
                continue;
            }
            {
                let mut tracker = l.tracker.borrow_mut();
                let mut sink = l.sink.borrow_mut();
                match *event {
                    PointerEvent::Move { x, y, viewport } => {
                        tracker.on_pointer_move(x, y, viewport, &mut *sink);
                    }
                    PointerEvent::Click => {
                        tracker.on_click(&mut *sink);
                    }
                }
            }
            delivered += 1;
            // Borrows are released; finish any release made from inside the sink.
            self.flush_deferred();
        }
        delivered
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn is_attached(&self, id: u64) -> bool {
        self.inner.borrow().listeners.iter().any(|l| l.id == id)
    }

    /// Detaches released listeners that were busy when they were released.
    fn flush_deferred(&self) {
        let pending = std::mem::take(&mut self.inner.borrow_mut().deferred);
        for l in pending {
            if !try_detach(&l) {
                self.inner.borrow_mut().deferred.push(l);
            }
        }
    }
}

/// Detaches `l`'s tracker unless it or its sink is currently borrowed.
fn try_detach(l: &Listener) -> bool {
    match (l.tracker.try_borrow_mut(), l.sink.try_borrow_mut()) {
        (Ok(mut tracker), Ok(mut sink)) => {
            tracker.detach(&mut *sink);
            true
        }
        _ => false,
    }
}

/// Keeps a tracker subscribed to a `PointerHub`. Dropping it releases.
#[must_use = "dropping a Subscription detaches its tracker immediately"]
pub struct Subscription {
    id: u64,
    hub: Weak<RefCell<HubInner>>,
    released: bool,
}

impl Subscription {
    /// Stops event delivery and detaches the tracker. Safe to call repeatedly,
    /// after the hub itself is gone, and from inside a sink during dispatch; in
    /// the last case the detach runs as soon as that dispatch step returns.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let Some(hub) = self.hub.upgrade() else {
            return;
        };
        let mut inner = hub.borrow_mut();
        let removed = inner
            .listeners
            .iter()
            .position(|l| l.id == self.id)
            .map(|i| inner.listeners.remove(i));
        drop(inner);

        if let Some(l) = removed {
            if try_detach(&l) {
                log::debug!("pointer hub: released listener {}", self.id);
            } else {
                log::debug!("pointer hub: released listener {} (detach deferred)", self.id);
                hub.borrow_mut().deferred.push(l);
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !self.released && self.hub.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pick::{
        Action, CursorCue, Effect, EffectQueue, HighlightId, HoverState, Shape, ToggleId,
    };
    use glam::{Mat4, Vec3};

    const VP: ViewportRect = ViewportRect {
        left: 0.0,
        top: 0.0,
        width: 100.0,
        height: 100.0,
    };

    fn tracker_with_panel() -> SharedTracker {
        let cam = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0)
            * Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let mut t = InteractionTracker::new(cam);
        t.register(
            Shape::Rect {
                center: Vec3::ZERO,
                half_u: Vec3::X,
                half_v: Vec3::Y,
            },
            Some(Action::Toggle(ToggleId(1))),
            Some(HighlightId(4)),
        );
        Rc::new(RefCell::new(t))
    }

    fn centre() -> PointerEvent {
        PointerEvent::Move {
            x: 50.0,
            y: 50.0,
            viewport: VP,
        }
    }

    #[test]
    fn events_reach_every_attached_tracker() {
        let hub = PointerHub::new();
        let (t1, t2) = (tracker_with_panel(), tracker_with_panel());
        let q1 = Rc::new(RefCell::new(EffectQueue::default()));
        let q2 = Rc::new(RefCell::new(EffectQueue::default()));
        let _s1 = hub.attach(t1.clone(), q1.clone());
        let _s2 = hub.attach(t2.clone(), q2.clone());

        assert_eq!(hub.dispatch(&centre()), 2);
        assert!(matches!(t1.borrow().state(), HoverState::Hovering(_)));
        assert!(matches!(t2.borrow().state(), HoverState::Hovering(_)));

        hub.dispatch(&PointerEvent::Click);
        assert!(q1
            .borrow_mut()
            .drain()
            .contains(&Effect::Perform(Action::Toggle(ToggleId(1)))));
    }

    #[test]
    fn release_is_idempotent_and_stops_delivery() {
        let hub = PointerHub::new();
        let t = tracker_with_panel();
        let q = Rc::new(RefCell::new(EffectQueue::default()));
        let mut sub = hub.attach(t.clone(), q.clone());

        hub.dispatch(&centre());
        q.borrow_mut().drain();

        sub.release();
        assert!(!sub.is_active());
        assert_eq!(hub.listener_count(), 0);
        // Detaching reset the visible cues.
        assert_eq!(
            q.borrow_mut().drain(),
            vec![
                Effect::Highlight(HighlightId(4), false),
                Effect::Cursor(CursorCue::Default),
            ]
        );

        sub.release();
        assert_eq!(hub.dispatch(&centre()), 0);
        assert_eq!(hub.dispatch(&PointerEvent::Click), 0);
        assert_eq!(t.borrow().state(), HoverState::Idle);
        assert!(q.borrow().is_empty());
    }

    #[test]
    fn dropping_subscription_releases() {
        let hub = PointerHub::new();
        let t = tracker_with_panel();
        let q = Rc::new(RefCell::new(EffectQueue::default()));
        {
            let _sub = hub.attach(t.clone(), q.clone());
            assert_eq!(hub.listener_count(), 1);
        }
        assert_eq!(hub.listener_count(), 0);
        assert!(t.borrow().is_detached());
    }

    /// Sink that drops its own subscription when an action fires.
    #[derive(Default)]
    struct ClosingSink {
        sub: Option<Subscription>,
        queue: EffectQueue,
    }

    impl InteractionSink for ClosingSink {
        fn set_cursor(&mut self, cue: CursorCue) {
            self.queue.set_cursor(cue);
        }

        fn set_highlight(&mut self, id: HighlightId, on: bool) {
            self.queue.set_highlight(id, on);
        }

        fn perform(&mut self, action: &Action) {
            self.queue.perform(action);
            if let Some(mut sub) = self.sub.take() {
                sub.release();
            }
        }
    }

    #[test]
    fn sink_may_release_its_own_subscription_during_dispatch() {
        let hub = PointerHub::new();
        let t = tracker_with_panel();
        let sink = Rc::new(RefCell::new(ClosingSink::default()));
        let sub = hub.attach(t.clone(), sink.clone());
        sink.borrow_mut().sub = Some(sub);

        assert_eq!(hub.dispatch(&centre()), 1);
        sink.borrow_mut().queue.drain();

        assert_eq!(hub.dispatch(&PointerEvent::Click), 1);
        assert_eq!(hub.listener_count(), 0);
        assert!(t.borrow().is_detached());
        assert_eq!(
            sink.borrow_mut().queue.drain(),
            vec![
                Effect::Perform(Action::Toggle(ToggleId(1))),
                Effect::Highlight(HighlightId(4), false),
                Effect::Cursor(CursorCue::Default),
            ]
        );

        assert_eq!(hub.dispatch(&centre()), 0);
        assert_eq!(hub.dispatch(&PointerEvent::Click), 0);
        assert!(sink.borrow().queue.is_empty());
    }

    #[test]
    fn release_after_hub_is_gone() {
        let t = tracker_with_panel();
        let q = Rc::new(RefCell::new(EffectQueue::default()));
        let mut sub = {
            let hub = PointerHub::new();
            hub.attach(t, q)
        };
        assert!(!sub.is_active());
        sub.release();
    }
}
