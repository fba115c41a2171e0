//! Room assembly: furniture, wall frames, whiteboard cards and their picking
//! registrations.
//!
//! Units are meters, +Y up. The room is an open corner: floor, back wall at
//! `z = -HALF`, left wall at `x = -HALF`; the camera orbits in from the open
//! sides.

use super::mesh::MeshKind;
use crate::camera::RoomBounds;
use crate::config::RoomConfig;
use glam::{Mat4, Quat, Vec3};
use roomkit::pick::{Action, Effect, HighlightId, InteractionTracker, Shape, ToggleId};
use roomkit::texture::{
    synthesize_with_entropy, DrawSurface, PixelCanvas, Stroke, StrokePath, SynthesisParams,
    TextureImage,
};
use roomkit::TextureError;
use std::collections::BTreeMap;
use std::f32::consts::TAU;

/// Half the room's floor extent.
pub const HALF: f32 = 4.0;
pub const HEIGHT: f32 = 3.2;

/// Toggle bound to the laptop.
pub const LID_TOGGLE: ToggleId = ToggleId(0);

const LID_OPEN_RAD: f32 = 105.0 * std::f32::consts::PI / 180.0;
const LID_SPEED_RAD_PER_S: f32 = 3.0;
const MAX_CARDS: usize = 6;
const RUG_TEXTURE_EDGE: u32 = 256;

/// Surface appearance of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGBA multiplier.
    pub tint: [f32; 4],
    /// Index into `RoomScene::textures`.
    pub texture: Option<usize>,
    /// Self-illumination factor added on top of lighting.
    pub emissive: f32,
    /// How strongly the bump image darkens the surface (0 = off).
    pub bump_strength: f32,
    /// Horizontal UV offset.
    pub uv_offset: f32,
}

impl Material {
    pub fn solid(rgb: [u8; 3]) -> Self {
        Self {
            tint: srgb_to_linear(rgb),
            texture: None,
            emissive: 0.0,
            bump_strength: 0.0,
            uv_offset: 0.0,
        }
    }

    pub fn glowing(rgb: [u8; 3], emissive: f32) -> Self {
        Self {
            emissive,
            ..Self::solid(rgb)
        }
    }
}

/// How an object's model matrix is animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rig {
    Static,
    /// Spins with the office chair around its post.
    Chair,
    /// Rotates with the laptop lid around its hinge.
    LaptopLid,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub mesh: MeshKind,
    /// Placement; for rigged objects, relative to the rig pivot.
    pub local: Mat4,
    pub material: Material,
    pub rig: Rig,
    pub visible: bool,
}

/// Image layers for one material.
#[derive(Debug, Clone)]
pub struct SceneTexture {
    pub label: &'static str,
    pub color: TextureImage,
    pub bump: Option<TextureImage>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spotlight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub cos_inner: f32,
    pub cos_outer: f32,
}

/// A clickable wall item (frame or card).
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTarget {
    pub label: String,
    pub url: String,
    pub center: Vec3,
    pub highlight: HighlightId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaptopLid {
    pub open: bool,
    /// Current opening angle (radians); eases toward the open/closed target.
    pub angle: f32,
    pub hinge: Vec3,
}

impl LaptopLid {
    pub fn target(&self) -> f32 {
        if self.open {
            LID_OPEN_RAD
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChairSpin {
    pub enabled: bool,
    pub angle: f32,
    pub speed: f32,
    pub pivot: Vec3,
}

pub struct RoomScene {
    pub objects: Vec<SceneObject>,
    pub textures: Vec<SceneTexture>,
    pub frames: Vec<LinkTarget>,
    pub cards: Vec<LinkTarget>,
    pub lid: LaptopLid,
    pub chair: ChairSpin,
    pub spotlight: Spotlight,
    highlights: BTreeMap<HighlightId, Vec<usize>>,
    next_highlight: u32,
}

impl RoomScene {
    /// Builds the room and registers every interactive surface with `tracker`.
    ///
    /// Fails only if the ball texture parameters are invalid.
    pub fn build(
        cfg: &RoomConfig,
        ball: &SynthesisParams,
        spin: bool,
        tracker: &mut InteractionTracker,
    ) -> Result<Self, TextureError> {
        let mut scene = Self {
            objects: Vec::new(),
            textures: Vec::new(),
            frames: Vec::new(),
            cards: Vec::new(),
            lid: LaptopLid {
                open: false,
                angle: 0.0,
                hinge: Vec3::new(1.5, 0.80, -2.675),
            },
            chair: ChairSpin {
                enabled: spin,
                angle: 0.0,
                speed: cfg.chair_spin_rad_per_s,
                pivot: Vec3::new(0.4, 0.0, -1.6),
            },
            spotlight: Spotlight {
                position: Vec3::ZERO,
                direction: Vec3::NEG_Y,
                color: Vec3::ONE,
                intensity: 0.0,
                cos_inner: 1.0,
                cos_outer: 1.0,
            },
            highlights: BTreeMap::new(),
            next_highlight: 1,
        };

        scene.add_shell();
        scene.add_rug();
        scene.add_table();
        scene.add_laptop(tracker);
        scene.add_chair();
        scene.add_lamp();
        scene.add_ball(ball)?;
        scene.add_hoop();
        scene.add_frames(cfg, tracker);
        scene.add_whiteboard(cfg, tracker);

        log::info!(
            "Room assembled: {} objects, {} textures, {} pickable surfaces",
            scene.objects.len(),
            scene.textures.len(),
            tracker.len()
        );
        Ok(scene)
    }

    /// Box the camera eye is kept in.
    pub fn bounds() -> RoomBounds {
        RoomBounds {
            min: Vec3::new(-HALF + 0.3, 0.3, -HALF + 0.3),
            max: Vec3::new(HALF * 2.5, HEIGHT * 2.0, HALF * 2.5),
        }
    }

    /// Point the camera orbits around.
    pub fn orbit_target() -> Vec3 {
        Vec3::new(-0.5, 1.1, -0.5)
    }

    /// World matrix of object `i` for the current animation state.
    pub fn world_matrix(&self, i: usize) -> Mat4 {
        let obj = &self.objects[i];
        match obj.rig {
            Rig::Static => obj.local,
            Rig::Chair => {
                Mat4::from_translation(self.chair.pivot)
                    * Mat4::from_rotation_y(self.chair.angle)
                    * obj.local
            }
            Rig::LaptopLid => {
                Mat4::from_translation(self.lid.hinge)
                    * Mat4::from_rotation_x(-self.lid.angle)
                    * obj.local
            }
        }
    }

    /// Shows or hides the objects bound to a highlight.
    pub fn set_highlight(&mut self, id: HighlightId, on: bool) {
        let Some(indices) = self.highlights.get(&id) else {
            log::warn!("unknown highlight {:?}", id);
            return;
        };
        for &i in indices {
            self.objects[i].visible = on;
        }
    }

    pub fn toggle(&mut self, id: ToggleId) {
        if id == LID_TOGGLE {
            self.lid.open = !self.lid.open;
            log::info!("Laptop lid {}", if self.lid.open { "opening" } else { "closing" });
        } else {
            log::warn!("unknown toggle {:?}", id);
        }
    }

    /// Applies a highlight or toggle effect. Effects the scene does not own
    /// (cursor cues, links) are handed back.
    pub fn apply(&mut self, effect: Effect) -> Option<Effect> {
        match effect {
            Effect::Highlight(id, on) => {
                self.set_highlight(id, on);
                None
            }
            Effect::Perform(Action::Toggle(id)) => {
                self.toggle(id);
                None
            }
            other => Some(other),
        }
    }

    /// Advances animations by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.chair.enabled {
            self.chair.angle = (self.chair.angle + self.chair.speed * dt).rem_euclid(TAU);
        }
        let target = self.lid.target();
        let step = LID_SPEED_RAD_PER_S * dt;
        let delta = target - self.lid.angle;
        self.lid.angle = if delta.abs() <= step {
            target
        } else {
            self.lid.angle + step.copysign(delta)
        };
    }

    /// Looks up the link for a hovered URL, frames first.
    pub fn link_for_url(&self, url: &str) -> Option<&LinkTarget> {
        self.frames
            .iter()
            .chain(self.cards.iter())
            .find(|l| l.url == url)
    }

    // --- Assembly helpers ---

    fn add(&mut self, name: &str, mesh: MeshKind, local: Mat4, material: Material, rig: Rig) -> usize {
        self.objects.push(SceneObject {
            name: name.to_string(),
            mesh,
            local,
            material,
            rig,
            visible: true,
        });
        self.objects.len() - 1
    }

    fn add_box(&mut self, name: &str, center: Vec3, size: Vec3, material: Material) -> usize {
        self.add(name, MeshKind::Cube, place(center, size), material, Rig::Static)
    }

    fn new_highlight(&mut self) -> HighlightId {
        let id = HighlightId(self.next_highlight);
        self.next_highlight += 1;
        self.highlights.insert(id, Vec::new());
        id
    }

    /// Adds a hidden rectangular border bound to `highlight`.
    ///
    /// `u`/`v` are the in-plane axes, `normal` points away from the wall.
    fn add_border(
        &mut self,
        highlight: HighlightId,
        center: Vec3,
        (u, v, normal): (Vec3, Vec3, Vec3),
        (half_u, half_v): (f32, f32),
    ) {
        const T: f32 = 0.03;
        let material = Material::glowing([255, 214, 64], 0.9);
        let c = center + normal * 0.004;
        let bars = [
            (c + v * (half_v + T * 0.5), u * (2.0 * half_u + 2.0 * T) + v * T),
            (c - v * (half_v + T * 0.5), u * (2.0 * half_u + 2.0 * T) + v * T),
            (c + u * (half_u + T * 0.5), u * T + v * (2.0 * half_v)),
            (c - u * (half_u + T * 0.5), u * T + v * (2.0 * half_v)),
        ];
        for (pos, extent) in bars {
            let size = extent.abs() + normal.abs() * 0.01;
            let i = self.add_box("highlight border", pos, size, material);
            self.objects[i].visible = false;
            if let Some(list) = self.highlights.get_mut(&highlight) {
                list.push(i);
            }
        }
    }

    fn add_shell(&mut self) {
        self.add_box(
            "floor",
            Vec3::new(0.0, -0.05, 0.0),
            Vec3::new(2.0 * HALF, 0.1, 2.0 * HALF),
            Material::solid([150, 111, 78]),
        );
        self.add_box(
            "back wall",
            Vec3::new(0.0, HEIGHT * 0.5, -HALF - 0.05),
            Vec3::new(2.0 * HALF, HEIGHT, 0.1),
            Material::solid([214, 208, 196]),
        );
        self.add_box(
            "left wall",
            Vec3::new(-HALF - 0.05, HEIGHT * 0.5, 0.0),
            Vec3::new(0.1, HEIGHT, 2.0 * HALF),
            Material::solid([200, 196, 186]),
        );
    }

    fn add_rug(&mut self) {
        let slot = self.textures.len();
        self.textures.push(SceneTexture {
            label: "rug",
            color: rug_texture(RUG_TEXTURE_EDGE),
            bump: None,
        });
        let mut material = Material::solid([255, 255, 255]);
        material.texture = Some(slot);
        self.add_box(
            "rug",
            Vec3::new(0.2, 0.006, 0.4),
            Vec3::new(3.0, 0.012, 2.0),
            material,
        );
    }

    fn add_table(&mut self) {
        let wood = Material::solid([120, 82, 52]);
        let top = Vec3::new(1.6, 0.75, -2.6);
        self.add_box("table top", top, Vec3::new(1.6, 0.06, 0.8), wood);
        for (sx, sz) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let leg = Vec3::new(top.x + sx * 0.72, 0.36, top.z + sz * 0.32);
            self.add_box("table leg", leg, Vec3::new(0.06, 0.72, 0.06), wood);
        }
    }

    fn add_laptop(&mut self, tracker: &mut InteractionTracker) {
        let shell = Material::solid([170, 172, 178]);
        let base_center = Vec3::new(1.5, 0.79, -2.55);
        let base_size = Vec3::new(0.36, 0.02, 0.25);
        self.add_box("laptop base", base_center, base_size, shell);

        // Lid parts are placed relative to the hinge on the base's back edge.
        self.add(
            "laptop lid",
            MeshKind::Cube,
            place(Vec3::new(0.0, 0.006, 0.125), Vec3::new(0.36, 0.012, 0.25)),
            shell,
            Rig::LaptopLid,
        );
        let screen = Mat4::from_translation(Vec3::new(0.0, -0.0005, 0.125))
            * Mat4::from_rotation_x(90f32.to_radians())
            * Mat4::from_scale(Vec3::new(0.32, 0.21, 1.0));
        self.add(
            "laptop screen",
            MeshKind::Quad,
            screen,
            Material::glowing([60, 110, 190], 0.8),
            Rig::LaptopLid,
        );

        let half = base_size * 0.5 + Vec3::new(0.01, 0.02, 0.01);
        tracker.register(
            Shape::Aabb {
                min: base_center - half,
                max: base_center + half,
            },
            Some(Action::Toggle(LID_TOGGLE)),
            None,
        );
    }

    fn add_chair(&mut self) {
        let dark = Material::solid([38, 38, 44]);
        let metal = Material::solid([140, 140, 150]);
        let v = Vec3::new;
        // (name, mesh, center relative to the pivot, size, material)
        let parts = [
            ("chair base", MeshKind::Cylinder, v(0.0, 0.02, 0.0), v(0.3, 0.04, 0.3), metal),
            ("chair post", MeshKind::Cylinder, v(0.0, 0.24, 0.0), v(0.03, 0.44, 0.03), metal),
            ("chair seat", MeshKind::Cube, v(0.0, 0.48, 0.0), v(0.5, 0.08, 0.5), dark),
            ("chair back", MeshKind::Cube, v(0.0, 0.8, 0.24), v(0.5, 0.55, 0.06), dark),
        ];
        for (name, mesh, center, size, material) in parts {
            self.add(name, mesh, place(center, size), material, Rig::Chair);
        }
    }

    fn add_lamp(&mut self) {
        let base = Vec3::new(2.9, 0.0, -3.4);
        let metal = Material::solid([60, 60, 64]);
        self.add(
            "lamp base",
            MeshKind::Cylinder,
            place(base + Vec3::Y * 0.015, Vec3::new(0.18, 0.03, 0.18)),
            metal,
            Rig::Static,
        );
        self.add(
            "lamp pole",
            MeshKind::Cylinder,
            place(base + Vec3::Y * 0.8, Vec3::new(0.02, 1.6, 0.02)),
            metal,
            Rig::Static,
        );
        self.add(
            "lamp shade",
            MeshKind::Cylinder,
            place(base + Vec3::Y * 1.65, Vec3::new(0.2, 0.22, 0.2)),
            Material::glowing([250, 222, 170], 0.7),
            Rig::Static,
        );

        let position = base + Vec3::Y * 1.55;
        let aim = Vec3::new(1.6, 0.75, -2.6);
        self.spotlight = Spotlight {
            position,
            direction: (aim - position).normalize(),
            color: Vec3::new(1.0, 0.86, 0.62),
            intensity: 4.0,
            cos_inner: 18f32.to_radians().cos(),
            cos_outer: 30f32.to_radians().cos(),
        };
    }

    fn add_ball(&mut self, params: &SynthesisParams) -> Result<(), TextureError> {
        let pair = synthesize_with_entropy(params)?;
        let slot = self.textures.len();
        self.textures.push(SceneTexture {
            label: "basketball",
            color: pair.color,
            bump: Some(pair.bump),
        });
        let material = Material {
            texture: Some(slot),
            bump_strength: 1.0,
            uv_offset: pair.u_offset,
            ..Material::solid([255, 255, 255])
        };
        let r = 0.12;
        self.add(
            "basketball",
            MeshKind::Sphere,
            place(Vec3::new(-1.3, r, 0.9), Vec3::splat(r)),
            material,
            Rig::Static,
        );
        Ok(())
    }

    fn add_hoop(&mut self) {
        let z = -1.9;
        self.add_box(
            "backboard",
            Vec3::new(-HALF + 0.02, 2.25, z),
            Vec3::new(0.04, 0.5, 0.75),
            Material::solid([245, 245, 245]),
        );
        self.add_box(
            "hoop bracket",
            Vec3::new(-HALF + 0.12, 2.02, z),
            Vec3::new(0.16, 0.03, 0.05),
            Material::solid([90, 90, 90]),
        );
        self.add(
            "hoop rim",
            MeshKind::Torus,
            place(Vec3::new(-HALF + 0.43, 2.02, z), Vec3::new(0.23, 0.23, 0.23)),
            Material::solid([220, 70, 30]),
            Rig::Static,
        );
    }

    fn add_frames(&mut self, cfg: &RoomConfig, tracker: &mut InteractionTracker) {
        const SIZE: f32 = 0.6;
        const GLASS: f32 = 0.5;
        const SPACING: f32 = 0.9;
        let wall_z = -HALF;
        let n = cfg.links.len();

        for (i, link) in cfg.links.iter().enumerate() {
            let x = -1.5 + (i as f32 - (n as f32 - 1.0) * 0.5) * SPACING;
            let center = Vec3::new(x, 2.1, wall_z + 0.03);
            let highlight = self.new_highlight();

            self.add_box(
                "frame backing",
                Vec3::new(x, center.y, wall_z + 0.015),
                Vec3::new(SIZE, SIZE, 0.03),
                Material::solid(link.color),
            );
            let glass_center = center + Vec3::Z * 0.005;
            self.add(
                "frame glass",
                MeshKind::Quad,
                place(glass_center, Vec3::new(GLASS, GLASS, 1.0)),
                Material::glowing(lighten(link.color), 0.25),
                Rig::Static,
            );
            self.add_border(
                highlight,
                center,
                (Vec3::X, Vec3::Y, Vec3::Z),
                (SIZE * 0.5, SIZE * 0.5),
            );

            // Backing and glass both open the link and share one highlight.
            let action = Action::OpenUrl(link.url.clone());
            tracker.register(
                Shape::Rect {
                    center,
                    half_u: Vec3::X * SIZE * 0.5,
                    half_v: Vec3::Y * SIZE * 0.5,
                },
                Some(action.clone()),
                Some(highlight),
            );
            tracker.register(
                Shape::Rect {
                    center: glass_center,
                    half_u: Vec3::X * GLASS * 0.5,
                    half_v: Vec3::Y * GLASS * 0.5,
                },
                Some(action),
                Some(highlight),
            );

            self.frames.push(LinkTarget {
                label: link.label.clone(),
                url: link.url.clone(),
                center: glass_center,
                highlight,
            });
        }
    }

    fn add_whiteboard(&mut self, cfg: &RoomConfig, tracker: &mut InteractionTracker) {
        const CARD_W: f32 = 0.8;
        const CARD_H: f32 = 0.32;
        let wall_x = -HALF;
        let board_center = Vec3::new(wall_x + 0.015, 1.6, 1.5);
        self.add_box(
            "whiteboard",
            board_center,
            Vec3::new(0.03, 1.3, 2.0),
            Material::solid([248, 248, 250]),
        );

        if cfg.projects.len() > MAX_CARDS {
            log::warn!(
                "{} project cards configured; only the first {} fit on the whiteboard",
                cfg.projects.len(),
                MAX_CARDS
            );
        }

        const PALETTE: [[u8; 3]; 4] = [
            [255, 236, 140],
            [170, 220, 255],
            [190, 240, 190],
            [255, 200, 220],
        ];
        // Quads face +Z; turn them to face into the room (+X).
        let facing = Quat::from_rotation_y(90f32.to_radians());
        for (i, card) in cfg.projects.iter().take(MAX_CARDS).enumerate() {
            let (row, col) = (i / 2, i % 2);
            let center = Vec3::new(
                wall_x + 0.035,
                1.95 - row as f32 * 0.4,
                board_center.z - 0.45 + col as f32 * 0.9,
            );
            let highlight = self.new_highlight();
            self.add(
                "project card",
                MeshKind::Quad,
                Mat4::from_scale_rotation_translation(Vec3::new(CARD_W, CARD_H, 1.0), facing, center),
                Material::solid(PALETTE[i % PALETTE.len()]),
                Rig::Static,
            );
            self.add_border(
                highlight,
                center,
                (Vec3::Z, Vec3::Y, Vec3::X),
                (CARD_W * 0.5, CARD_H * 0.5),
            );
            tracker.register(
                Shape::Rect {
                    center,
                    half_u: Vec3::Z * CARD_W * 0.5,
                    half_v: Vec3::Y * CARD_H * 0.5,
                },
                Some(Action::OpenUrl(card.url.clone())),
                Some(highlight),
            );
            self.cards.push(LinkTarget {
                label: card.title.clone(),
                url: card.url.clone(),
                center,
                highlight,
            });
        }
    }
}

/// Translate-and-scale placement for a unit primitive.
fn place(center: Vec3, size: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(size, Quat::IDENTITY, center)
}

fn lighten([r, g, b]: [u8; 3]) -> [u8; 3] {
    let up = |c: u8| c + (255 - c) / 2;
    [up(r), up(g), up(b)]
}

pub fn srgb_to_linear([r, g, b]: [u8; 3]) -> [f32; 4] {
    let f = |c: u8| {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [f(r), f(g), f(b), 1.0]
}

/// Striped woven-rug pattern with a dark border.
pub fn rug_texture(edge: u32) -> TextureImage {
    let mut canvas = PixelCanvas::new(edge, [150, 42, 40]);
    let band = (edge / 8).max(1);
    let stripe = (edge / 32).max(1);
    let mut y = band / 2;
    while y < edge {
        canvas.fill_rect(0, y as i32, edge, stripe, [206, 164, 92]);
        y += band;
    }

    let n = edge as f32;
    let inset = n / 16.0;
    let border = [60, 28, 22];
    let width = (n / 24.0).max(2.0);
    let corners = [
        (inset, inset),
        (n - inset, inset),
        (n - inset, n - inset),
        (inset, n - inset),
    ];
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        canvas.stroke(&Stroke {
            path: StrokePath::Line {
                from: a.into(),
                to: b.into(),
            },
            color: border,
            width,
        });
    }
    canvas.into_image()
}
