//! Overlap tests for sprites, the shield bubble and the ground
//!
//! Sprites are axis-aligned boxes around their center; the shield is a circle.

use glam::Vec2;

use crate::consts::GROUND_TOP;

/// Axis-aligned box given by center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Closest point inside the box to `p`
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }
}

/// Boxes overlap (touching edges count)
pub fn aabb_overlap(a: &Aabb, b: &Aabb) -> bool {
    let d = (a.center - b.center).abs();
    d.x <= a.half.x + b.half.x && d.y <= a.half.y + b.half.y
}

/// Circle overlaps box
pub fn circle_aabb_overlap(center: Vec2, radius: f32, b: &Aabb) -> bool {
    let closest = b.closest_point(center);
    closest.distance_squared(center) <= radius * radius
}

/// Bottom edge resting on or below the ground
pub fn touches_ground(b: &Aabb) -> bool {
    b.max().y >= GROUND_TOP
}

/// Keep a box horizontally inside `[0, width]`
pub fn clamp_to_world_x(center_x: f32, half_width: f32, width: f32) -> f32 {
    center_x.clamp(half_width, width - half_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::splat(10.0));
        let b = Aabb::new(Vec2::new(15.0, 0.0), Vec2::splat(5.0));
        assert!(aabb_overlap(&a, &b)); // touching

        let c = Aabb::new(Vec2::new(16.0, 0.0), Vec2::splat(5.0));
        assert!(!aabb_overlap(&a, &c));

        let d = Aabb::new(Vec2::new(0.0, 30.0), Vec2::splat(5.0));
        assert!(!aabb_overlap(&a, &d));
    }

    #[test]
    fn test_circle_aabb_overlap() {
        let b = Aabb::new(Vec2::new(100.0, 100.0), Vec2::splat(10.0));
        assert!(circle_aabb_overlap(Vec2::new(100.0, 50.0), 45.0, &b));
        assert!(!circle_aabb_overlap(Vec2::new(100.0, 50.0), 35.0, &b));
        // Corner case: diagonal distance
        assert!(!circle_aabb_overlap(Vec2::new(130.0, 130.0), 25.0, &b));
        assert!(circle_aabb_overlap(Vec2::new(130.0, 130.0), 29.0, &b));
    }

    #[test]
    fn test_touches_ground() {
        let above = Aabb::new(Vec2::new(0.0, GROUND_TOP - 11.0), Vec2::splat(10.0));
        let resting = Aabb::new(Vec2::new(0.0, GROUND_TOP - 10.0), Vec2::splat(10.0));
        assert!(!touches_ground(&above));
        assert!(touches_ground(&resting));
    }

    #[test]
    fn test_clamp_to_world_x() {
        assert_eq!(clamp_to_world_x(-50.0, 20.0, 800.0), 20.0);
        assert_eq!(clamp_to_world_x(900.0, 20.0, 800.0), 780.0);
        assert_eq!(clamp_to_world_x(400.0, 20.0, 800.0), 400.0);
    }
}
