// src/scene/mod.rs
//! Scene content for the room viewer.
//!
//! This module provides:
//! - `mesh`: unit primitives (cube, quad, sphere, cylinder, torus).
//! - `room`: the room assembly, its animations and picking registrations.
//! - `gpu`: uniform layouts and GPU uploads for the assembled scene.

pub mod gpu;
pub mod mesh;
pub mod room;

// Re-export commonly used types for convenience.
pub use self::gpu::{FrameUniformStd140, ObjectUniformStd140, SceneGpu};
pub use self::mesh::{MeshData, MeshKind, Vertex};
pub use self::room::{RoomScene, LID_TOGGLE};
