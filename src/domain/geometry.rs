//! Geometric types for canvas coordinates and layer transforms
//!
//! All coordinates are canvas units with the origin at the top-left corner
//! of the drawing surface.

/// Fixed drawing surface and backing shape dimensions
pub mod canvas {
    /// Drawing surface width
    pub const WIDTH: u32 = 500;
    /// Drawing surface height
    pub const HEIGHT: u32 = 350;

    /// Background (mat) shape: inset, size and corner radius
    pub const BACKGROUND_INSET: f32 = 25.0;
    pub const BACKGROUND_WIDTH: f32 = 450.0;
    pub const BACKGROUND_HEIGHT: f32 = 300.0;
    pub const BACKGROUND_RADIUS: f32 = 20.0;
    pub const BACKGROUND_STROKE_WIDTH: f32 = 3.0;

    /// Decorative inner border: inset, size and corner radius
    pub const BORDER_INSET: f32 = 35.0;
    pub const BORDER_WIDTH: f32 = 430.0;
    pub const BORDER_HEIGHT: f32 = 280.0;
    pub const BORDER_RADIUS: f32 = 15.0;
    pub const BORDER_STROKE_WIDTH: f32 = 1.0;

    /// Where new text layers are placed
    pub const TEXT_ORIGIN: (f32, f32) = (150.0, 150.0);
    /// Where new image layers are placed
    pub const IMAGE_ORIGIN: (f32, f32) = (200.0, 120.0);
    /// Box that inserted images are fitted into
    pub const IMAGE_FIT_SIZE: f32 = 150.0;
}

/// A point in canvas coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle in degrees of the vector from `self` to `other`
    pub fn angle_to(self, other: Point) -> f32 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

/// Unscaled width and height of a layer's box
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn scaled(self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// Position, uniform scale and rotation of a layer
///
/// `(x, y)` is the top-left corner of the scaled, unrotated box. Rotation is
/// applied around the centre of the scaled box, clockwise in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub angle: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

impl Transform {
    /// Axis-aligned, unscaled transform at the given position
    pub const fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            scale: 1.0,
            angle: 0.0,
        }
    }

    pub const fn with_scale(self, scale: f32) -> Self {
        Self { scale, ..self }
    }

    pub const fn with_angle(self, angle: f32) -> Self {
        Self { angle, ..self }
    }

    /// Centre of the scaled box in canvas coordinates
    pub fn center(&self, size: Size) -> Point {
        let scaled = size.scaled(self.scale);
        Point::new(self.x + scaled.width / 2.0, self.y + scaled.height / 2.0)
    }

    /// Map a point in scaled box space (origin at the box's top-left) to canvas space
    pub fn box_to_canvas(&self, size: Size, local: Point) -> Point {
        let scaled = size.scaled(self.scale);
        let center = self.center(size);
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let rx = local.x - scaled.width / 2.0;
        let ry = local.y - scaled.height / 2.0;
        Point::new(
            center.x + rx * cos - ry * sin,
            center.y + rx * sin + ry * cos,
        )
    }

    /// Map a canvas point into scaled box space (inverse of [`Self::box_to_canvas`])
    pub fn canvas_to_box(&self, size: Size, point: Point) -> Point {
        let scaled = size.scaled(self.scale);
        let center = self.center(size);
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let dx = point.x - center.x;
        let dy = point.y - center.y;
        Point::new(
            dx * cos + dy * sin + scaled.width / 2.0,
            -dx * sin + dy * cos + scaled.height / 2.0,
        )
    }

    /// Check if the transformed box contains a canvas point
    pub fn contains(&self, size: Size, point: Point) -> bool {
        let scaled = size.scaled(self.scale);
        let local = self.canvas_to_box(size, point);
        local.x >= 0.0 && local.x <= scaled.width && local.y >= 0.0 && local.y <= scaled.height
    }

    /// Corners of the transformed box in canvas space, clockwise from top-left
    pub fn corners(&self, size: Size) -> [Point; 4] {
        let scaled = size.scaled(self.scale);
        [
            Point::new(0.0, 0.0),
            Point::new(scaled.width, 0.0),
            Point::new(scaled.width, scaled.height),
            Point::new(0.0, scaled.height),
        ]
        .map(|p| self.box_to_canvas(size, p))
    }

    /// Same transform with a new scale, keeping the box centre in place
    pub fn rescaled_about_center(&self, size: Size, scale: f32) -> Transform {
        let center = self.center(size);
        let scaled = size.scaled(scale);
        Transform {
            x: center.x - scaled.width / 2.0,
            y: center.y - scaled.height / 2.0,
            scale,
            angle: self.angle,
        }
    }
}

/// Normalize an angle in degrees into `[0, 360)`
#[inline]
pub fn normalize_angle(degrees: f32) -> f32 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn test_contains_axis_aligned() {
        let t = Transform::at(10.0, 20.0).with_scale(2.0);
        let size = Size::new(50.0, 10.0);
        assert!(t.contains(size, Point::new(10.0, 20.0)));
        assert!(t.contains(size, Point::new(109.0, 39.0)));
        assert!(!t.contains(size, Point::new(111.0, 30.0)));
        assert!(!t.contains(size, Point::new(50.0, 41.0)));
    }

    #[test]
    fn test_rotated_corners_and_inverse() {
        let t = Transform::at(0.0, 0.0).with_angle(90.0);
        let size = Size::new(100.0, 20.0);
        let corners = t.corners(size);
        // Centre stays at (50, 10); the top-left corner swings to (60, -40)
        assert!(approx(corners[0], Point::new(60.0, -40.0)));
        assert!(approx(corners[2], Point::new(40.0, 60.0)));

        let p = Point::new(47.0, 33.0);
        let round_trip = t.box_to_canvas(size, t.canvas_to_box(size, p));
        assert!(approx(p, round_trip));

        // Inside after rotation, outside of the unrotated box
        assert!(t.contains(size, Point::new(50.0, 50.0)));
        assert!(!t.contains(size, Point::new(90.0, 10.0)));
    }

    #[test]
    fn test_rescale_keeps_center() {
        let size = Size::new(40.0, 20.0);
        let t = Transform::at(100.0, 100.0);
        let scaled = t.rescaled_about_center(size, 2.0);
        assert!(approx(t.center(size), scaled.center(size)));
        assert_eq!(scaled.x, 80.0);
        assert_eq!(scaled.y, 90.0);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(370.0), 10.0);
        assert_eq!(normalize_angle(-90.0), 270.0);
        assert_eq!(normalize_angle(0.0), 0.0);
    }
}
