// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! BSP tree CSG on convex polygons

use nalgebra::{Point3, Vector3};

/// Plane thickness used to classify points as coplanar.
pub(super) const EPSILON: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Plane {
    pub normal: Vector3<f64>,
    pub w: f64,
}

impl Plane {
    /// Newell normal of a planar loop; `None` when the loop has no area.
    fn from_loop(vertices: &[Point3<f64>]) -> Option<Self> {
        let n = vertices.len();
        let mut normal = Vector3::<f64>::zeros();
        for i in 0..n {
            let a = &vertices[i];
            let b = &vertices[(i + 1) % n];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        let len = normal.norm();
        if !len.is_finite() || len <= f64::EPSILON {
            return None;
        }
        let normal = normal / len;
        let centroid = vertices.iter().fold(Vector3::zeros(), |acc, v| acc + v.coords) / n as f64;
        Some(Self {
            normal,
            w: normal.dot(&centroid),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn distance(&self, p: &Point3<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.w
    }

    fn split_polygon(&self, polygon: Polygon) -> Split {
        const COPLANAR: u8 = 0;
        const FRONT: u8 = 1;
        const BACK: u8 = 2;
        const SPANNING: u8 = 3;

        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| {
                let t = self.distance(v);
                if t < -EPSILON {
                    BACK
                } else if t > EPSILON {
                    FRONT
                } else {
                    COPLANAR
                }
            })
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, t| acc | t);

        match polygon_type {
            COPLANAR if self.normal.dot(&polygon.plane.normal) > 0.0 => Split::CoplanarFront(polygon),
            COPLANAR => Split::CoplanarBack(polygon),
            FRONT => Split::Front(polygon),
            BACK => Split::Back(polygon),
            _ => {
                let n = polygon.vertices.len();
                let mut front = Vec::with_capacity(n + 1);
                let mut back = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (&polygon.vertices[i], &polygon.vertices[j]);
                    if ti != BACK {
                        front.push(*vi);
                    }
                    if ti != FRONT {
                        back.push(*vi);
                    }
                    if ti | tj == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords)) / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        front.push(v);
                        back.push(v);
                    }
                }
                Split::Spanning(
                    Polygon::with_plane(front, polygon.plane),
                    Polygon::with_plane(back, polygon.plane),
                )
            }
        }
    }
}

enum Split {
    CoplanarFront(Polygon),
    CoplanarBack(Polygon),
    Front(Polygon),
    Back(Polygon),
    Spanning(Option<Polygon>, Option<Polygon>),
}

/// Convex planar polygon, counter-clockwise around its normal.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Polygon {
    pub vertices: Vec<Point3<f64>>,
    pub plane: Plane,
}

impl Polygon {
    pub fn new(vertices: Vec<Point3<f64>>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_loop(&vertices)?;
        Some(Self { vertices, plane })
    }

    fn with_plane(vertices: Vec<Point3<f64>>, plane: Plane) -> Option<Self> {
        (vertices.len() >= 3).then_some(Self { vertices, plane })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    /// Fan triangles `(v0, vi, vi+1)`.
    pub fn fan(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        let v0 = self.vertices[0];
        self.vertices.windows(2).skip(1).map(move |w| [v0, w[0], w[1]])
    }
}

#[derive(Debug, Default)]
struct Node {
    plane: Option<Plane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Convert solid space to empty space and back.
    fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that lie inside this tree's solid.
    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            match plane.split_polygon(polygon) {
                Split::CoplanarFront(p) | Split::Front(p) => front.push(p),
                Split::CoplanarBack(p) | Split::Back(p) => back.push(p),
                Split::Spanning(f, b) => {
                    front.extend(f);
                    back.extend(b);
                }
            }
        }

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            front.extend(node.clip_polygons(back));
        }
        front
    }

    /// Remove the parts of this tree's polygons that lie inside `other`.
    fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<Polygon>) {
        out.extend(self.polygons.iter().cloned());
        if let Some(front) = &self.front {
            front.collect_into(out);
        }
        if let Some(back) = &self.back {
            back.collect_into(out);
        }
    }

    fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = *self.plane.get_or_insert(first.plane);

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            match plane.split_polygon(polygon) {
                Split::CoplanarFront(p) | Split::CoplanarBack(p) => self.polygons.push(p),
                Split::Front(p) => front.push(p),
                Split::Back(p) => back.push(p),
                Split::Spanning(f, b) => {
                    front.extend(f);
                    back.extend(b);
                }
            }
        }

        if !front.is_empty() {
            self.front.get_or_insert_with(Box::default).build(front);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Box::default).build(back);
        }
    }
}

pub(super) fn union(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.all_polygons()
}

pub(super) fn difference(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    if a.is_empty() || b.is_empty() {
        return a;
    }
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

pub(super) fn intersection(a: Vec<Polygon>, b: Vec<Polygon>) -> Vec<Polygon> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut a = Node::new(a);
    let mut b = Node::new(b);
    a.invert();
    b.clip_to(&a);
    b.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    a.build(b.all_polygons());
    a.invert();
    a.all_polygons()
}

/// Signed volume enclosed by the polygons.
pub(super) fn volume(polygons: &[Polygon]) -> f64 {
    polygons
        .iter()
        .flat_map(Polygon::fan)
        .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
        .sum()
}

pub(super) fn surface_area(polygons: &[Polygon]) -> f64 {
    polygons
        .iter()
        .flat_map(Polygon::fan)
        .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad(a: [f64; 3], b: [f64; 3], c: [f64; 3], d: [f64; 3]) -> Polygon {
        Polygon::new([a, b, c, d].iter().map(|p| Point3::new(p[0], p[1], p[2])).collect()).unwrap()
    }

    fn cuboid(min: [f64; 3], max: [f64; 3]) -> Vec<Polygon> {
        let [x0, y0, z0] = min;
        let [x1, y1, z1] = max;
        vec![
            quad([x0, y0, z0], [x0, y1, z0], [x1, y1, z0], [x1, y0, z0]),
            quad([x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]),
            quad([x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]),
            quad([x0, y1, z0], [x0, y1, z1], [x1, y1, z1], [x1, y1, z0]),
            quad([x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]),
            quad([x1, y0, z0], [x1, y1, z0], [x1, y1, z1], [x1, y0, z1]),
        ]
    }

    #[test]
    fn test_cuboid_volume() {
        let polygons = cuboid([0.0; 3], [2.0, 3.0, 4.0]);
        assert_relative_eq!(volume(&polygons), 24.0, epsilon = 1e-9);
        assert_relative_eq!(surface_area(&polygons), 52.0, epsilon = 1e-9);
    }

    #[test]
    fn test_overlapping_boxes() {
        let a = || cuboid([0.0; 3], [2.0; 3]);
        let b = || cuboid([1.0, 0.0, 0.0], [3.0, 2.0, 2.0]);

        assert_relative_eq!(volume(&union(a(), b())), 12.0, epsilon = 1e-6);
        assert_relative_eq!(volume(&difference(a(), b())), 4.0, epsilon = 1e-6);
        assert_relative_eq!(volume(&intersection(a(), b())), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let a = cuboid([0.0; 3], [1.0; 3]);
        let b = cuboid([5.0; 3], [6.0; 3]);
        assert_relative_eq!(volume(&intersection(a, b)), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_operands() {
        let a = cuboid([0.0; 3], [1.0; 3]);
        assert_eq!(union(Vec::new(), a.clone()).len(), 6);
        assert!(intersection(a.clone(), Vec::new()).is_empty());
        assert!(difference(Vec::new(), a).is_empty());
    }

    #[test]
    fn test_degenerate_polygon_rejected() {
        let line = vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        assert!(Polygon::new(line).is_none());
    }
}
