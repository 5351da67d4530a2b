// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Sorting raw contours into outer regions and the holes they own

use crate::geometry::Shape;
use crate::utils::math::{centroid, point_strictly_inside, signed_area};
use nalgebra::Point2;
use tracing::debug;

/// Points within this distance of an outer edge are not "inside" it.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Group contours into shapes.
///
/// Counter-clockwise contours become outers in input order; clockwise ones
/// become holes of the smallest outer that contains them. Contours with
/// fewer than three points or no area are discarded.
pub fn classify_contours(contours: Vec<Vec<Point2<f64>>>) -> Vec<Shape> {
    let mut outers = Vec::new();
    let mut holes = Vec::new();
    for contour in contours {
        if contour.len() < 3 {
            continue;
        }
        let area = signed_area(&contour);
        if area > 0.0 {
            outers.push(contour);
        } else if area < 0.0 {
            holes.push(contour);
        } else {
            debug!(points = contour.len(), "dropping zero-area contour");
        }
    }

    let assigned = attach_holes(&outers, holes);
    outers
        .into_iter()
        .zip(assigned)
        .map(|(outer, holes)| Shape::new(outer, holes))
        .collect()
}

/// Distribute holes among `outers`; entry `i` of the result holds the holes
/// owned by `outers[i]`.
///
/// A hole is owned by the smallest outer strictly containing its first
/// vertex. When that vertex sits on an edge or outside every outer, the
/// hole's centroid is tried instead; holes still unowned are dropped. An
/// owned hole is rotated to start at a vertex strictly inside its owner
/// when one exists.
pub(crate) fn attach_holes(outers: &[Vec<Point2<f64>>], holes: Vec<Vec<Point2<f64>>>) -> Vec<Vec<Vec<Point2<f64>>>> {
    let areas: Vec<f64> = outers.iter().map(|o| signed_area(o).abs()).collect();
    let owner_of = |p: &Point2<f64>| -> Option<usize> {
        outers
            .iter()
            .enumerate()
            .filter(|(_, outer)| point_strictly_inside(p, outer, BOUNDARY_TOLERANCE))
            .min_by(|(a, _), (b, _)| areas[*a].total_cmp(&areas[*b]))
            .map(|(i, _)| i)
    };

    let mut assigned = vec![Vec::new(); outers.len()];
    for mut hole in holes {
        let Some(first) = hole.first().copied() else {
            continue;
        };
        let owner = owner_of(&first).or_else(|| centroid(&hole).and_then(|c| owner_of(&c)));
        match owner {
            Some(i) => {
                if let Some(start) = hole
                    .iter()
                    .position(|p| point_strictly_inside(p, &outers[i], BOUNDARY_TOLERANCE))
                {
                    hole.rotate_left(start);
                }
                assigned[i].push(hole);
            }
            None => debug!(points = hole.len(), "dropping hole outside every outer contour"),
        }
    }
    assigned
}
