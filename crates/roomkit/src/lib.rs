// src/lib.rs
//! roomkit: the GPU-free core of the room viewer.
//!
//! - `texture`: procedural seam textures (color + bump) drawn on a CPU canvas.
//! - `pick`: pointer-to-surface picking, hover tracking and click actions.
//!
//! Nothing in here touches a window or a GPU device; the viewer owns those and
//! feeds events and cameras in through small traits.

pub mod error;
pub mod pick;
pub mod texture;

pub use error::{PickMiss, TextureError};
