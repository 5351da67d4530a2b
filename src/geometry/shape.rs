// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar shapes with holes

use super::Rect;
use crate::utils::math;
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Boundary tolerance used when checking that a hole sits inside its outer.
const CONTAINMENT_TOLERANCE: f64 = 1e-9;

/// Placement of a plane's local 2D coordinates in world space.
///
/// `world = origin + x * right + y * up`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneFrame {
    pub origin: Point3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
    pub normal: Vector3<f64>,
}

impl PlaneFrame {
    /// The world XY plane.
    pub fn xy() -> Self {
        Self {
            origin: Point3::origin(),
            right: Vector3::x(),
            up: Vector3::y(),
            normal: Vector3::z(),
        }
    }

    pub fn to_world(&self, p: &Point2<f64>) -> Point3<f64> {
        self.origin + self.right * p.x + self.up * p.y
    }

    /// Local coordinates `(x, y, z)` of a world point; `z` is the signed
    /// distance from the plane.
    pub fn to_local(&self, p: &Point3<f64>) -> Point3<f64> {
        let d = p - self.origin;
        Point3::new(d.dot(&self.right), d.dot(&self.up), d.dot(&self.normal))
    }
}

impl Default for PlaneFrame {
    fn default() -> Self {
        Self::xy()
    }
}

/// A filled planar region: one counter-clockwise outer contour and any
/// number of clockwise holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub outer: Vec<Point2<f64>>,
    #[serde(default)]
    pub holes: Vec<Vec<Point2<f64>>>,
    #[serde(default)]
    pub frame: Option<PlaneFrame>,
}

impl Shape {
    /// Build a shape, forcing the outer contour counter-clockwise and every
    /// hole clockwise.
    pub fn new(mut outer: Vec<Point2<f64>>, mut holes: Vec<Vec<Point2<f64>>>) -> Self {
        math::orient(&mut outer, true);
        for hole in &mut holes {
            math::orient(hole, false);
        }
        Self {
            outer,
            holes,
            frame: None,
        }
    }

    /// Regular polygon approximation of a circle centered at the origin.
    pub fn circle(radius: f64, segments: usize) -> Self {
        let n = segments.max(3);
        let outer = (0..n)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / n as f64;
                Point2::new(radius * t.cos(), radius * t.sin())
            })
            .collect();
        Self::new(outer, Vec::new())
    }

    /// Axis-aligned rectangle with its lower-left corner at the origin,
    /// or centered on it.
    pub fn rectangle(width: f64, height: f64, center: bool) -> Self {
        let (x0, y0) = if center { (-width / 2.0, -height / 2.0) } else { (0.0, 0.0) };
        let outer = vec![
            Point2::new(x0, y0),
            Point2::new(x0 + width, y0),
            Point2::new(x0 + width, y0 + height),
            Point2::new(x0, y0 + height),
        ];
        Self::new(outer, Vec::new())
    }

    pub fn square(side: f64, center: bool) -> Self {
        Self::rectangle(side, side, center)
    }

    pub fn with_frame(mut self, frame: PlaneFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn with_hole(mut self, mut hole: Vec<Point2<f64>>) -> Self {
        math::orient(&mut hole, false);
        self.holes.push(hole);
        self
    }

    /// Filled area: outer area minus hole areas.
    pub fn area(&self) -> f64 {
        math::signed_area(&self.outer) + self.holes.iter().map(|h| math::signed_area(h)).sum::<f64>()
    }

    pub fn centroid(&self) -> Option<Point2<f64>> {
        let (mut area, mut moment) = math::area_moment(&self.outer);
        for hole in &self.holes {
            let (a, m) = math::area_moment(hole);
            area += a;
            moment += m;
        }
        if area.abs() < f64::EPSILON {
            return None;
        }
        Some(Point2::from(moment / (6.0 * area)))
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(&self.outer)
    }

    /// Point is inside the outer contour and outside every hole.
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        math::point_in_polygon(p, &self.outer) && !self.holes.iter().any(|h| math::point_in_polygon(p, h))
    }

    /// Winding and containment invariants hold.
    pub fn is_valid(&self) -> bool {
        self.outer.len() >= 3
            && math::signed_area(&self.outer) > 0.0
            && self.holes.iter().all(|h| {
                h.len() >= 3
                    && math::signed_area(h) < 0.0
                    && math::point_strictly_inside(&h[0], &self.outer, CONTAINMENT_TOLERANCE)
            })
    }

    /// Outer contour lifted into world space through the attached frame
    /// (the XY plane when none is attached).
    pub fn outer_world(&self) -> Vec<Point3<f64>> {
        let frame = self.frame.unwrap_or_default();
        self.outer.iter().map(|p| frame.to_world(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_normalizes_winding() {
        let mut outer = Shape::square(10.0, false).outer;
        outer.reverse();
        let hole = vec![Point2::new(2.0, 2.0), Point2::new(4.0, 2.0), Point2::new(4.0, 4.0)];

        let shape = Shape::new(outer, vec![hole]);
        assert!(math::signed_area(&shape.outer) > 0.0);
        assert!(math::signed_area(&shape.holes[0]) < 0.0);
        assert!(shape.is_valid());
        assert_relative_eq!(shape.area(), 98.0);
    }

    #[test]
    fn test_hole_outside_is_invalid() {
        let shape = Shape::square(10.0, false).with_hole(vec![
            Point2::new(20.0, 20.0),
            Point2::new(22.0, 20.0),
            Point2::new(22.0, 22.0),
        ]);
        assert!(!shape.is_valid());
    }

    #[test]
    fn test_contains_respects_holes() {
        let shape = Shape::square(10.0, true).with_hole(Shape::square(2.0, true).outer);
        assert!(shape.contains(&Point2::new(3.0, 3.0)));
        assert!(!shape.contains(&Point2::new(0.0, 0.0)));
        assert!(!shape.contains(&Point2::new(6.0, 0.0)));
    }

    #[test]
    fn test_centroid_with_hole() {
        let shape = Shape::square(4.0, false).with_hole(vec![
            Point2::new(0.5, 0.5),
            Point2::new(1.5, 0.5),
            Point2::new(1.5, 1.5),
            Point2::new(0.5, 1.5),
        ]);
        let c = shape.centroid().unwrap();
        // (16 * 2 - 1 * 1) / 15
        assert_relative_eq!(c.x, 31.0 / 15.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 31.0 / 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_plane_frame_round_trip() {
        let frame = PlaneFrame {
            origin: Point3::new(1.0, 2.0, 3.0),
            right: Vector3::y(),
            up: Vector3::z(),
            normal: Vector3::x(),
        };
        let world = frame.to_world(&Point2::new(4.0, 5.0));
        assert_eq!(world, Point3::new(1.0, 6.0, 8.0));
        assert_eq!(frame.to_local(&world), Point3::new(4.0, 5.0, 0.0));
    }

    #[test]
    fn test_circle_is_ccw() {
        let circle = Shape::circle(20.0, 64);
        assert_eq!(circle.outer.len(), 64);
        assert!(circle.is_valid());
        assert!((circle.area() - PI * 400.0).abs() < PI * 400.0 * 0.01);
    }
}
