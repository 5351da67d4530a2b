// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh and shape values

pub mod analytics;
mod bbox;
mod mesh;
mod primitives;
mod shape;

pub use analytics::MeshSummary;
pub use bbox::{BoundingBox, Rect};
pub use mesh::{Material, Mesh, Pose};
pub use primitives::Primitive;
pub use shape::{PlaneFrame, Shape};
