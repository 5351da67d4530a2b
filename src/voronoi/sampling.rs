// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rejection sampling of seed points

use super::rng::Mulberry32;
use crate::geometry::Shape;
use crate::utils::math::point_in_polygon;
use nalgebra::Point2;
use tracing::warn;

/// Attempts allowed per requested seed.
pub(crate) const ATTEMPTS_PER_SEED: usize = 100;

/// Up to `count` points uniformly distributed inside the shape's outer
/// contour.
///
/// Candidates are drawn in the bounding box (x first, then y) and kept when
/// they fall inside. After `100 * count` attempts sampling stops and returns
/// what it has.
pub(crate) fn sample_seeds(shape: &Shape, count: usize, rng: &mut Mulberry32) -> Vec<Point2<f64>> {
    let bounds = shape.bounds();
    let budget = count.saturating_mul(ATTEMPTS_PER_SEED);
    let mut seeds = Vec::with_capacity(count);
    if bounds.is_empty() {
        return seeds;
    }

    let mut attempts = 0;
    while seeds.len() < count && attempts < budget {
        attempts += 1;
        let x = bounds.min.x + rng.next_f64() * bounds.width();
        let y = bounds.min.y + rng.next_f64() * bounds.height();
        let candidate = Point2::new(x, y);
        if point_in_polygon(&candidate, &shape.outer) {
            seeds.push(candidate);
        }
    }

    if seeds.len() < count {
        warn!(requested = count, placed = seeds.len(), attempts, "seed sampling budget exhausted");
    }
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeds_are_inside_and_reproducible() {
        let shape = Shape::circle(10.0, 48);
        let a = sample_seeds(&shape, 25, &mut Mulberry32::new(7));
        let b = sample_seeds(&shape, 25, &mut Mulberry32::new(7));
        assert_eq!(a.len(), 25);
        assert_eq!(a, b);
        assert!(a.iter().all(|p| point_in_polygon(p, &shape.outer)));
    }

    #[test]
    fn test_first_seed_follows_the_stream() {
        let shape = Shape::square(1.0, false);
        let seeds = sample_seeds(&shape, 1, &mut Mulberry32::new(42));
        assert_eq!(seeds, vec![Point2::new(0.6011037519201636, 0.44829055899754167)]);
    }

    #[test]
    fn test_thin_shape_returns_fewer_seeds() {
        // Thin diagonal sliver: almost every bounding-box sample misses.
        let shape = Shape::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(100.0, 100.0),
                Point2::new(99.999, 100.0),
            ],
            Vec::new(),
        );
        let seeds = sample_seeds(&shape, 50, &mut Mulberry32::new(1));
        assert!(seeds.len() < 50);
    }

    #[test]
    fn test_zero_count() {
        assert!(sample_seeds(&Shape::square(1.0, false), 0, &mut Mulberry32::new(1)).is_empty());
    }
}
