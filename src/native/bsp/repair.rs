// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle soup clean-up: vertex welding, sliver removal and T-junction
//! splitting.

use crate::geometry::analytics::unpaired_edges;
use ahash::{AHashMap, AHashSet};
use nalgebra::Point3;

/// Upper bound on T-junction passes; each pass splits every open edge once.
const MAX_REPAIR_PASSES: usize = 8;

#[derive(Debug, Clone, Default)]
pub(super) struct TriangleSoup {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[u32; 3]>,
}

/// Merge vertices closer than `tolerance` and drop faces that collapse.
pub(super) fn weld(vertices: &[Point3<f64>], faces: &[[u32; 3]], tolerance: f64) -> TriangleSoup {
    let cell = tolerance.max(1e-12);
    let key = |p: &Point3<f64>| {
        (
            (p.x / cell).floor() as i64,
            (p.y / cell).floor() as i64,
            (p.z / cell).floor() as i64,
        )
    };

    let mut grid: AHashMap<(i64, i64, i64), Vec<u32>> = AHashMap::with_capacity(vertices.len());
    let mut welded: Vec<Point3<f64>> = Vec::with_capacity(vertices.len());
    let mut remap: Vec<u32> = Vec::with_capacity(vertices.len());

    for v in vertices {
        let (kx, ky, kz) = key(v);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    if let Some(bucket) = grid.get(&(kx + dx, ky + dy, kz + dz)) {
                        if let Some(&i) = bucket.iter().find(|&&i| (welded[i as usize] - v).norm() <= tolerance) {
                            found = Some(i);
                            break 'search;
                        }
                    }
                }
            }
        }
        let index = found.unwrap_or_else(|| {
            let i = welded.len() as u32;
            welded.push(*v);
            grid.entry((kx, ky, kz)).or_default().push(i);
            i
        });
        remap.push(index);
    }

    let faces = faces
        .iter()
        .map(|f| [remap[f[0] as usize], remap[f[1] as usize], remap[f[2] as usize]])
        .filter(|f| f[0] != f[1] && f[1] != f[2] && f[2] != f[0])
        .collect();

    TriangleSoup {
        vertices: welded,
        faces,
    }
}

/// Drop zero-area triangles whose three corners are collinear.
pub(super) fn drop_slivers(soup: &mut TriangleSoup) {
    let vertices = &soup.vertices;
    soup.faces.retain(|f| {
        let a = vertices[f[0] as usize];
        let b = vertices[f[1] as usize];
        let c = vertices[f[2] as usize];
        let longest = (b - a).norm_squared().max((c - b).norm_squared()).max((a - c).norm_squared());
        (b - a).cross(&(c - a)).norm() > 1e-10 * longest
    });
}

/// Split triangles whose open edges pass through other mesh vertices so
/// that edges pair up again.
pub(super) fn repair_t_junctions(soup: &mut TriangleSoup, tolerance: f64) {
    for _ in 0..MAX_REPAIR_PASSES {
        let open = unpaired_edges(&soup.faces);
        if open.is_empty() {
            return;
        }

        let candidates: Vec<u32> = open
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .collect::<AHashSet<u32>>()
            .into_iter()
            .collect();
        let open: AHashSet<(u32, u32)> = open.into_iter().collect();

        let mut changed = false;
        let mut faces = Vec::with_capacity(soup.faces.len());
        for face in &soup.faces {
            let split = (0..3).find_map(|k| {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                if !open.contains(&(a, b)) {
                    return None;
                }
                let inner = points_on_edge(&soup.vertices, &candidates, a, b, tolerance);
                (!inner.is_empty()).then_some((k, inner))
            });

            match split {
                Some((k, inner)) => {
                    let (a, b, c) = (face[k], face[(k + 1) % 3], face[(k + 2) % 3]);
                    let mut chain = Vec::with_capacity(inner.len() + 2);
                    chain.push(a);
                    chain.extend(inner);
                    chain.push(b);
                    faces.extend(chain.windows(2).map(|w| [w[0], w[1], c]));
                    changed = true;
                }
                None => faces.push(*face),
            }
        }

        soup.faces = faces;
        if !changed {
            return;
        }
    }
}

/// Candidate vertices strictly inside segment `a -> b`, ordered from `a`.
fn points_on_edge(vertices: &[Point3<f64>], candidates: &[u32], a: u32, b: u32, tolerance: f64) -> Vec<u32> {
    let pa = vertices[a as usize];
    let pb = vertices[b as usize];
    let ab = pb - pa;
    let len_sq = ab.norm_squared();
    if len_sq <= tolerance * tolerance {
        return Vec::new();
    }

    let mut hits: Vec<(f64, u32)> = candidates
        .iter()
        .filter(|&&v| v != a && v != b)
        .filter_map(|&v| {
            let p = vertices[v as usize];
            let t = (p - pa).dot(&ab) / len_sq;
            let on_line = (p - (pa + ab * t)).norm() <= tolerance;
            let interior = t * len_sq.sqrt() > tolerance && (1.0 - t) * len_sq.sqrt() > tolerance;
            (on_line && interior).then_some((t, v))
        })
        .collect();
    hits.sort_by(|x, y| x.0.total_cmp(&y.0));
    hits.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::analytics::is_watertight;

    #[test]
    fn test_weld_merges_near_duplicates() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0 + 1e-9, 0.0, 0.0),
        ];
        let soup = weld(&vertices, &[[0, 1, 2], [0, 3, 2]], 1e-6);
        assert_eq!(soup.vertices.len(), 3);
        assert_eq!(soup.faces, vec![[0, 1, 2], [0, 1, 2]]);
    }

    #[test]
    fn test_weld_drops_collapsed_faces() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-9, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(weld(&vertices, &[[0, 1, 2]], 1e-6).faces.is_empty());
    }

    #[test]
    fn test_t_junction_split() {
        // Tetrahedron whose base edge 0-1 carries an extra vertex 4 used only
        // by the two triangles on one side of the edge.
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(1.0, 0.5, 2.0),
            Point3::new(1.0, 0.0, 0.0),
        ];
        let faces = vec![[0, 2, 1], [0, 4, 3], [4, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mut soup = weld(&vertices, &faces, 1e-9);
        assert!(!is_watertight(&soup.faces));

        repair_t_junctions(&mut soup, 1e-9);
        assert!(is_watertight(&soup.faces));
        assert_eq!(soup.faces.len(), 6);
    }

    #[test]
    fn test_drop_slivers() {
        let mut soup = TriangleSoup {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![[0, 1, 2], [0, 1, 3]],
        };
        drop_slivers(&mut soup);
        assert_eq!(soup.faces, vec![[0, 1, 3]]);
    }
}
