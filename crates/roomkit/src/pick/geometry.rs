//! Viewport normalization, camera rays and ray/shape intersection.

use glam::{Mat4, Vec2, Vec3};
use std::{cell::RefCell, rc::Rc};

/// Anything that can report a combined view-projection matrix.
///
/// Clip space follows wgpu conventions: x/y in [-1, 1] with y up, depth in [0, 1].
pub trait PickCamera {
    fn view_proj(&self) -> Mat4;
}

impl PickCamera for Mat4 {
    fn view_proj(&self) -> Mat4 {
        *self
    }
}

impl<C: PickCamera> PickCamera for Rc<RefCell<C>> {
    fn view_proj(&self) -> Mat4 {
        self.borrow().view_proj()
    }
}

/// Client-space rectangle of the rendered viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Viewport anchored at the origin.
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// `false` for zero, negative or non-finite extents.
    pub fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Maps a client-space point into normalized device coordinates: centred on
    /// the viewport, unit half-extent, y up.
    ///
    /// Returns `None` when the viewport has no area. Points outside the
    /// rectangle map outside [-1, 1].
    pub fn normalize(&self, x: f32, y: f32) -> Option<Vec2> {
        if !self.has_area() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let nx = ((x - self.left) / self.width) * 2.0 - 1.0;
        let ny = 1.0 - ((y - self.top) / self.height) * 2.0;
        Some(Vec2::new(nx, ny))
    }
}

/// Returns `true` when `ndc` lies on or inside the unit square.
#[inline]
pub fn ndc_in_view(ndc: Vec2) -> bool {
    ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0
}

/// Half-line with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Ray from the near plane through `ndc` toward the far plane.
///
/// `None` if the view-projection matrix cannot be inverted meaningfully.
pub fn cursor_ray(camera: &dyn PickCamera, ndc: Vec2) -> Option<Ray> {
    let clip_to_world = camera.view_proj().inverse();
    let origin = unproject(&clip_to_world, ndc, 0.0)?;
    let dir = (unproject(&clip_to_world, ndc, 1.0)? - origin).try_normalize()?;
    Some(Ray { origin, dir })
}

/// World point at clip-space depth `depth` (0 near, 1 far) under `ndc`.
fn unproject(clip_to_world: &Mat4, ndc: Vec2, depth: f32) -> Option<Vec3> {
    let p = *clip_to_world * ndc.extend(depth).extend(1.0);
    if p.w.abs() < 1e-6 {
        return None;
    }
    Some(p.truncate() / p.w).filter(|v| v.is_finite())
}

/// Pickable geometry, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Oriented rectangle; `half_u` and `half_v` are perpendicular half-edges.
    Rect { center: Vec3, half_u: Vec3, half_v: Vec3 },
    /// Axis-aligned box.
    Aabb { min: Vec3, max: Vec3 },
    Sphere { center: Vec3, radius: f32 },
}

impl Shape {
    /// Distance along `ray` to the first intersection in front of the origin.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match *self {
            Shape::Rect { center, half_u, half_v } => intersect_rect(ray, center, half_u, half_v),
            Shape::Aabb { min, max } => intersect_aabb(ray, min, max),
            Shape::Sphere { center, radius } => intersect_sphere(ray, center, radius),
        }
    }
}

fn intersect_rect(ray: &Ray, center: Vec3, half_u: Vec3, half_v: Vec3) -> Option<f32> {
    const EPS: f32 = 1e-6;
    let normal = half_u.cross(half_v);
    let denom = normal.dot(ray.dir);
    if denom.abs() < EPS {
        return None;
    }
    let t = normal.dot(center - ray.origin) / denom;
    if t < 0.0 {
        return None;
    }
    let d = ray.at(t) - center;
    let inside_u = d.dot(half_u).abs() <= half_u.length_squared() + EPS;
    let inside_v = d.dot(half_v).abs() <= half_v.length_squared() + EPS;
    (inside_u && inside_v).then_some(t)
}

/// Slab test. The interval starts at 0 so hits behind the origin are dropped
/// and an origin inside the box reports 0.
fn intersect_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    const EPS: f32 = 1e-6;
    let (mut enter, mut exit) = (0.0f32, f32::INFINITY);
    for axis in 0..3 {
        let (o, d) = (ray.origin[axis], ray.dir[axis]);
        if d.abs() < EPS {
            // Parallel to this slab: inside it or never.
            if !(min[axis]..=max[axis]).contains(&o) {
                return None;
            }
            continue;
        }
        let (a, b) = ((min[axis] - o) / d, (max[axis] - o) / d);
        enter = enter.max(a.min(b));
        exit = exit.min(a.max(b));
        if enter > exit {
            return None;
        }
    }
    Some(enter)
}

fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let (t0, t1) = (-b - sq, -b + sq);
    if t1 < 0.0 {
        None
    } else {
        Some(t0.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward_ray() -> Ray {
        Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            dir: Vec3::NEG_Z,
        }
    }

    #[test]
    fn normalize_centres_viewport() {
        let vp = ViewportRect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(vp.normalize(60.0, 45.0), Some(Vec2::ZERO));
        assert_eq!(vp.normalize(10.0, 20.0), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(vp.normalize(110.0, 70.0), Some(Vec2::new(1.0, -1.0)));
    }

    #[test]
    fn normalize_rejects_empty_viewport() {
        assert_eq!(ViewportRect::sized(0.0, 100.0).normalize(1.0, 1.0), None);
        assert_eq!(ViewportRect::sized(100.0, 0.0).normalize(1.0, 1.0), None);
        assert_eq!(ViewportRect::sized(f32::NAN, 10.0).normalize(1.0, 1.0), None);
        assert_eq!(ViewportRect::sized(10.0, 10.0).normalize(f32::NAN, 1.0), None);
    }

    #[test]
    fn ray_through_centre_looks_at_target() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let vp = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0)
            * Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let ray = cursor_ray(&vp, Vec2::ZERO).unwrap();
        assert!(ray.dir.abs_diff_eq(Vec3::NEG_Z, 1e-4));
        assert!((ray.origin.z - 4.9).abs() < 1e-3);
    }

    #[test]
    fn singular_camera_gives_no_ray() {
        assert!(cursor_ray(&Mat4::ZERO, Vec2::ZERO).is_none());
    }

    #[test]
    fn rect_hit_and_miss() {
        let rect = Shape::Rect {
            center: Vec3::ZERO,
            half_u: Vec3::X,
            half_v: Vec3::Y * 0.5,
        };
        assert_eq!(rect.intersect(&forward_ray()), Some(5.0));

        let off = Ray {
            origin: Vec3::new(0.0, 0.6, 5.0),
            ..forward_ray()
        };
        assert_eq!(rect.intersect(&off), None);

        let behind = Ray {
            origin: Vec3::new(0.0, 0.0, -5.0),
            ..forward_ray()
        };
        assert_eq!(rect.intersect(&behind), None);
    }

    #[test]
    fn aabb_and_sphere_report_entry_distance() {
        let aabb = Shape::Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        assert_eq!(aabb.intersect(&forward_ray()), Some(4.0));

        let sphere = Shape::Sphere {
            center: Vec3::ZERO,
            radius: 2.0,
        };
        assert_eq!(sphere.intersect(&forward_ray()), Some(3.0));

        let inside = Ray { origin: Vec3::ZERO, dir: Vec3::X };
        assert_eq!(sphere.intersect(&inside), Some(0.0));
    }

    #[test]
    fn aabb_edge_cases() {
        let aabb = Shape::Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let inside = Ray { origin: Vec3::ZERO, dir: Vec3::Y };
        assert_eq!(aabb.intersect(&inside), Some(0.0));

        let behind = Ray {
            origin: Vec3::new(0.0, 0.0, -5.0),
            ..forward_ray()
        };
        assert_eq!(aabb.intersect(&behind), None);

        // Parallel to the x slab but outside it.
        let beside = Ray {
            origin: Vec3::new(1.5, 0.0, 5.0),
            ..forward_ray()
        };
        assert_eq!(aabb.intersect(&beside), None);

        let diagonal = Ray {
            origin: Vec3::new(-3.0, 0.0, 3.0),
            dir: Vec3::new(1.0, 0.0, -1.0).normalize(),
        };
        let t = aabb.intersect(&diagonal).unwrap();
        assert!((t - 2.0 * 2f32.sqrt()).abs() < 1e-4);
    }
}
