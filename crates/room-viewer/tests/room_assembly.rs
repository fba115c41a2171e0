//! Headless checks of the assembled room: picking through the real
//! registrations, without a window or GPU.

use glam::{Mat4, Vec3};
use room_viewer::config::RoomConfig;
use room_viewer::scene::{RoomScene, LID_TOGGLE};
use roomkit::pick::{
    Action, CursorCue, Effect, EffectQueue, InteractionTracker, PointerEvent, PointerHub,
    ViewportRect,
};
use roomkit::texture::SynthesisParams;
use std::{cell::RefCell, rc::Rc};

const VP: ViewportRect = ViewportRect {
    left: 0.0,
    top: 0.0,
    width: 200.0,
    height: 200.0,
};

fn look(eye: Vec3, at: Vec3) -> Mat4 {
    Mat4::perspective_rh(50f32.to_radians(), 1.0, 0.05, 100.0) * Mat4::look_at_rh(eye, at, Vec3::Y)
}

struct Rig {
    scene: RoomScene,
    camera: Rc<RefCell<Mat4>>,
    tracker: Rc<RefCell<InteractionTracker>>,
    effects: Rc<RefCell<EffectQueue>>,
    hub: PointerHub,
}

fn rig() -> Rig {
    let camera = Rc::new(RefCell::new(Mat4::IDENTITY));
    let mut tracker = InteractionTracker::new(camera.clone());
    let scene = RoomScene::build(
        &RoomConfig::default(),
        &SynthesisParams::basketball(64),
        false,
        &mut tracker,
    )
    .unwrap();
    Rig {
        scene,
        camera,
        tracker: Rc::new(RefCell::new(tracker)),
        effects: Rc::new(RefCell::new(EffectQueue::default())),
        hub: PointerHub::new(),
    }
}

fn point_at_centre(hub: &PointerHub) {
    hub.dispatch(&PointerEvent::Move {
        x: 100.0,
        y: 100.0,
        viewport: VP,
    });
}

#[test]
fn clicking_a_frame_opens_its_link() {
    let r = rig();
    let _sub = r.hub.attach(r.tracker.clone(), r.effects.clone());
    let frame = r.scene.frames[0].clone();
    *r.camera.borrow_mut() = look(frame.center + Vec3::Z * 2.0, frame.center);

    point_at_centre(&r.hub);
    let hovered = r.effects.borrow_mut().drain();
    assert!(hovered.contains(&Effect::Cursor(CursorCue::Pointer)));
    assert!(hovered.contains(&Effect::Highlight(frame.highlight, true)));

    r.hub.dispatch(&PointerEvent::Click);
    assert_eq!(
        r.effects.borrow_mut().drain(),
        vec![Effect::Perform(Action::OpenUrl(frame.url.clone()))]
    );
}

#[test]
fn moving_between_frames_swaps_highlights() {
    let r = rig();
    let _sub = r.hub.attach(r.tracker.clone(), r.effects.clone());
    let (a, b) = (r.scene.frames[0].clone(), r.scene.frames[1].clone());

    *r.camera.borrow_mut() = look(a.center + Vec3::Z * 2.0, a.center);
    point_at_centre(&r.hub);
    r.effects.borrow_mut().drain();

    *r.camera.borrow_mut() = look(b.center + Vec3::Z * 2.0, b.center);
    point_at_centre(&r.hub);
    let effects = r.effects.borrow_mut().drain();
    let off = effects
        .iter()
        .position(|e| *e == Effect::Highlight(a.highlight, false))
        .unwrap();
    let on = effects
        .iter()
        .position(|e| *e == Effect::Highlight(b.highlight, true))
        .unwrap();
    assert!(off < on);
}

#[test]
fn clicking_the_laptop_toggles_the_lid() {
    let mut r = rig();
    let _sub = r.hub.attach(r.tracker.clone(), r.effects.clone());
    *r.camera.borrow_mut() = look(Vec3::new(1.5, 1.5, -1.5), Vec3::new(1.5, 0.79, -2.55));

    point_at_centre(&r.hub);
    r.hub.dispatch(&PointerEvent::Click);
    let effects = r.effects.borrow_mut().drain();
    assert!(effects.contains(&Effect::Perform(Action::Toggle(LID_TOGGLE))));

    let leftover: Vec<Effect> = effects.into_iter().filter_map(|e| r.scene.apply(e)).collect();
    assert!(r.scene.lid.open);
    assert!(leftover.iter().all(|e| matches!(e, Effect::Cursor(_))));
}

#[test]
fn decorative_geometry_is_never_picked() {
    let r = rig();
    let _sub = r.hub.attach(r.tracker.clone(), r.effects.clone());
    // Straight down at the rug, well away from any interactive surface.
    *r.camera.borrow_mut() = Mat4::perspective_rh(50f32.to_radians(), 1.0, 0.05, 100.0)
        * Mat4::look_at_rh(Vec3::new(0.2, 2.0, 0.4), Vec3::new(0.2, 0.0, 0.4), Vec3::Z);

    point_at_centre(&r.hub);
    assert!(r.tracker.borrow().state().surface().is_none());
    assert!(r.effects.borrow().is_empty());
    r.hub.dispatch(&PointerEvent::Click);
    assert!(r.effects.borrow().is_empty());
}

#[test]
fn releasing_the_subscription_clears_the_hover() {
    let r = rig();
    let mut sub = r.hub.attach(r.tracker.clone(), r.effects.clone());
    let card = r.scene.cards[0].clone();
    *r.camera.borrow_mut() = look(card.center + Vec3::X * 1.5, card.center);
    point_at_centre(&r.hub);
    assert!(r
        .effects
        .borrow_mut()
        .drain()
        .contains(&Effect::Highlight(card.highlight, true)));

    sub.release();
    let effects = r.effects.borrow_mut().drain();
    assert!(effects.contains(&Effect::Highlight(card.highlight, false)));
    assert!(effects.contains(&Effect::Cursor(CursorCue::Default)));

    assert_eq!(r.hub.dispatch(&PointerEvent::Click), 0);
    assert!(r.effects.borrow().is_empty());
}
