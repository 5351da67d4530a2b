// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polygon-clipping kernel contract on integer coordinates

use crate::error::KernelError;
use serde::{Deserialize, Serialize};

/// Integer point in clipper space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Closed path; the last point connects back to the first.
pub type IntPath = Vec<IntPoint>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipOp {
    Union,
    Difference,
    Intersection,
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillRule {
    EvenOdd,
    #[default]
    NonZero,
}

/// Corner treatment when offsetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    #[default]
    Round,
    Square,
    Miter,
}

/// How path ends are treated when offsetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EndType {
    /// Closed polygons offset as filled regions
    #[default]
    Polygon,
    /// Open paths with squared-off ends flush with the endpoints
    Butt,
}

/// Parameters of an offset, in clipper units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflateOptions {
    pub join: JoinType,
    pub end: EndType,
    /// Maximum miter length as a multiple of `|delta|`
    pub miter_limit: f64,
    /// Maximum deviation of round-join arcs from the true arc
    pub arc_tolerance: f64,
}

impl Default for InflateOptions {
    fn default() -> Self {
        Self {
            join: JoinType::Round,
            end: EndType::Polygon,
            miter_limit: 2.0,
            arc_tolerance: 0.25,
        }
    }
}

/// 2D boolean and offset kernel working on integer paths.
///
/// Returned outer paths are counter-clockwise and holes clockwise, but
/// callers still normalize winding on the way out.
pub trait ClipKernel: Send + Sync {
    fn boolean(
        &self,
        op: ClipOp,
        subject: &[IntPath],
        clip: &[IntPath],
        fill: FillRule,
    ) -> Result<Vec<IntPath>, KernelError>;

    /// Grow (`delta > 0`) or shrink (`delta < 0`) every path.
    fn inflate(&self, paths: &[IntPath], delta: f64, options: &InflateOptions) -> Result<Vec<IntPath>, KernelError>;
}

/// Number of segments a round join needs over `angle` radians so the chord
/// error stays under `tolerance`.
pub(crate) fn arc_steps(radius: f64, angle: f64, tolerance: f64) -> usize {
    let radius = radius.abs();
    if radius <= tolerance || angle <= 0.0 {
        return 1;
    }
    let step = 2.0 * (1.0 - tolerance / radius).clamp(-1.0, 1.0).acos();
    if step <= f64::EPSILON {
        return 1;
    }
    ((angle / step).ceil() as usize).clamp(1, 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_type_serde_names() {
        let json = serde_json::to_string(&JoinType::Miter).unwrap();
        assert_eq!(json, "\"miter\"");
        let parsed: JoinType = serde_json::from_str("\"square\"").unwrap();
        assert_eq!(parsed, JoinType::Square);
    }

    #[test]
    fn test_arc_steps_grows_with_radius() {
        let small = arc_steps(10.0, std::f64::consts::PI, 0.25);
        let large = arc_steps(1000.0, std::f64::consts::PI, 0.25);
        assert!(small >= 1);
        assert!(large > small);
        assert_eq!(arc_steps(0.1, 1.0, 0.25), 1);
    }
}
