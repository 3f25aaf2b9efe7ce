// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Display-space to natural-space coordinate mapping.
//!
//! The video frame is drawn with an aspect-preserving "contain" fit inside
//! the canvas, so the displayed rectangle is letterboxed. This module maps
//! pointer positions in the canvas to the video's natural pixel space and
//! back.

use crate::models::annotation::Point;

/// Letterboxed mapping between the canvas (display space) and the video's
/// native resolution (natural space). Recomputed from the live canvas rect
/// and video size on every paint, which covers both late-arriving metadata
/// and container resizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapper {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    natural_width: f64,
    natural_height: f64,
}

impl DisplayMapper {
    /// Compute the contain-fit for a `natural_width x natural_height` frame
    /// inside a `container_width x container_height` canvas.
    ///
    /// An unknown natural size (zero on either axis, i.e. no frame metadata
    /// yet) yields the identity mapping so the mapper never divides by zero.
    pub fn fit(
        container_width: f64,
        container_height: f64,
        natural_width: f64,
        natural_height: f64,
    ) -> Self {
        if natural_width <= 0.0
            || natural_height <= 0.0
            || container_width <= 0.0
            || container_height <= 0.0
        {
            return Self {
                scale: 1.0,
                offset_x: 0.0,
                offset_y: 0.0,
                natural_width: 0.0,
                natural_height: 0.0,
            };
        }

        let natural_aspect = natural_width / natural_height;
        let container_aspect = container_width / container_height;

        let (display_width, display_height) = if natural_aspect > container_aspect {
            // Frame is wider - fit to width, letterbox top/bottom
            (container_width, container_width / natural_aspect)
        } else {
            // Frame is taller - fit to height, letterbox left/right
            (container_height * natural_aspect, container_height)
        };

        Self {
            scale: display_width / natural_width,
            offset_x: (container_width - display_width) / 2.0,
            offset_y: (container_height - display_height) / 2.0,
            natural_width,
            natural_height,
        }
    }

    /// Convert a canvas-local display position to natural coordinates,
    /// clamped into the frame bounds.
    pub fn to_natural(&self, display: Point) -> Point {
        let x = (display.x - self.offset_x) / self.scale;
        let y = (display.y - self.offset_y) / self.scale;
        if self.natural_width > 0.0 && self.natural_height > 0.0 {
            Point::new(x.clamp(0.0, self.natural_width), y.clamp(0.0, self.natural_height))
        } else {
            Point::new(x, y)
        }
    }

    /// Convert natural coordinates to a canvas-local display position.
    ///
    /// No clamping: a natural-space point may legitimately land outside the
    /// visible box during resize transients.
    pub fn to_display(&self, natural: Point) -> Point {
        Point::new(
            natural.x * self.scale + self.offset_x,
            natural.y * self.scale + self.offset_y,
        )
    }

    /// Canvas-local offset of the displayed frame rectangle.
    pub fn display_offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Size of the displayed frame rectangle.
    pub fn display_size(&self) -> (f64, f64) {
        (
            self.natural_width * self.scale,
            self.natural_height * self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_bound_letterbox() {
        // 2:1 frame in a square container: full width, vertical bars.
        let m = DisplayMapper::fit(200.0, 200.0, 100.0, 50.0);
        assert_eq!(m.display_offset(), (0.0, 50.0));
        assert_eq!(m.display_size(), (200.0, 100.0));
        let d = m.to_display(Point::new(0.0, 0.0));
        assert_eq!((d.x, d.y), (0.0, 50.0));
    }

    #[test]
    fn test_height_bound_letterbox() {
        // 1:2 frame in a wide container: full height, horizontal bars.
        let m = DisplayMapper::fit(200.0, 100.0, 50.0, 100.0);
        assert_eq!(m.display_offset(), (75.0, 0.0));
        assert_eq!(m.display_size(), (50.0, 100.0));
    }

    #[test]
    fn test_roundtrip_inside_display_rect() {
        let m = DisplayMapper::fit(200.0, 200.0, 100.0, 50.0);
        let display = Point::new(120.0, 80.0);
        let natural = m.to_natural(display);
        assert_eq!((natural.x, natural.y), (60.0, 15.0));
        let back = m.to_display(natural);
        assert!((back.x - display.x).abs() < 1e-9);
        assert!((back.y - display.y).abs() < 1e-9);
    }

    #[test]
    fn test_to_natural_clamps_outside_positions() {
        let m = DisplayMapper::fit(200.0, 200.0, 100.0, 50.0);
        let natural = m.to_natural(Point::new(250.0, 10.0));
        assert_eq!((natural.x, natural.y), (100.0, 0.0));
    }

    #[test]
    fn test_unknown_natural_size_is_identity() {
        let m = DisplayMapper::fit(640.0, 480.0, 0.0, 0.0);
        let p = Point::new(5.0, 7.0);
        let n = m.to_natural(p);
        assert_eq!((n.x, n.y), (5.0, 7.0));
        let d = m.to_display(n);
        assert_eq!((d.x, d.y), (5.0, 7.0));
    }
}
