//! Axis-separated velocity resolution against the tile grid.

use glam::Vec2;
use tilequest_core::PixelRect;

use crate::grid::Grid;

/// Blocked flags sampled at the four corners of a destination rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CornerSamples {
    /// Top-left corner.
    pub top_left: bool,
    /// Top-right corner, one pixel inside the right edge.
    pub top_right: bool,
    /// Bottom-left corner, one pixel inside the bottom edge.
    pub bottom_left: bool,
    /// Bottom-right corner, inset on both axes.
    pub bottom_right: bool,
}

impl CornerSamples {
    /// Samples the grid at the inset corners of `rect`.
    #[must_use]
    pub fn sample(grid: &Grid, rect: &PixelRect) -> Self {
        let left = rect.left() as f32;
        let top = rect.top() as f32;
        let right = (rect.right() - 1) as f32;
        let bottom = (rect.bottom() - 1) as f32;

        Self {
            top_left: grid.is_pixel_blocked(Vec2::new(left, top)),
            top_right: grid.is_pixel_blocked(Vec2::new(right, top)),
            bottom_left: grid.is_pixel_blocked(Vec2::new(left, bottom)),
            bottom_right: grid.is_pixel_blocked(Vec2::new(right, bottom)),
        }
    }
}

/// Returns `velocity` with every component zeroed whose leading edge would
/// land on a blocked pixel.
///
/// The destination rectangle is `rect` shifted by both components at once,
/// truncated to whole pixels. Neither the rectangle nor the grid is modified.
#[must_use]
pub fn resolve_axis_velocity(grid: &Grid, rect: &PixelRect, velocity: Vec2) -> Vec2 {
    let destination = PixelRect::new(
        (rect.x as f32 + velocity.x) as i32,
        (rect.y as f32 + velocity.y) as i32,
        rect.width,
        rect.height,
    );
    let corners = CornerSamples::sample(grid, &destination);
    let mut resolved = velocity;

    if velocity.x > 0.0 {
        if corners.top_right || corners.bottom_right {
            resolved.x = 0.0;
        }
    } else if velocity.x < 0.0 && (corners.top_left || corners.bottom_left) {
        resolved.x = 0.0;
    }

    if velocity.y > 0.0 {
        if corners.bottom_right || corners.bottom_left {
            resolved.y = 0.0;
        }
    } else if velocity.y < 0.0 && (corners.top_right || corners.top_left) {
        resolved.y = 0.0;
    }

    resolved
}
