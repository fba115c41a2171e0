// src/lib.rs
//! Interactive 3D portfolio room.
//!
//! Renders a furnished room with wgpu, lets the user orbit it, and turns
//! pointer hovers and clicks on wall frames, whiteboard cards and the laptop
//! into highlights, link openings and animations via `roomkit::pick`.

pub mod app;
pub mod camera;
pub mod config;
pub mod links;
pub mod renderer;
pub mod scene;
pub mod ui;
