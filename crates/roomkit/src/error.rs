//! Error and diagnostic types shared across roomkit.

use thiserror::Error;

/// Raised by texture synthesis. Construction of the owning component fails.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TextureError {
    #[error("invalid texture edge length {edge} (must be in 1..={max})")]
    InvalidDimension { edge: u32, max: u32 },
}

/// Why a pointer event did not resolve to a surface.
///
/// Never returned as an error: picking degrades to `Idle` and the reason is
/// only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickMiss {
    /// Viewport rectangle has zero (or non-finite) extent.
    DegenerateViewport,
    /// Pointer lies outside the viewport rectangle.
    OutsideViewport,
    /// Hovered surface is no longer registered.
    StaleSurface,
    /// Tracker has been detached.
    Detached,
}
