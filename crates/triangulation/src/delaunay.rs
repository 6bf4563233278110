//! Bowyer–Watson Delaunay construction.

use std::collections::HashMap;

use crate::error::TriangulationError;

/// Half-width of the enclosing super-triangle, in normalised units.
const SUPER_SCALE: f64 = 100.0;

/// Points whose squared distance to a circumcentre is within this relative
/// margin of the squared radius count as outside the circle.
const CIRCLE_MARGIN: f64 = 1e-12;

/// Triangles with a smaller normalised area are dropped as degenerate.
const MIN_AREA: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct Circle {
    cx: f64,
    cy: f64,
    r2: f64,
}

#[derive(Debug, Clone, Copy)]
struct Tri {
    v: [usize; 3],
    circle: Circle,
}

fn circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Circle {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < f64::MIN_POSITIVE {
        return Circle {
            cx: 0.0,
            cy: 0.0,
            r2: f64::INFINITY,
        };
    }
    let a2 = a[0] * a[0] + a[1] * a[1];
    let b2 = b[0] * b[0] + b[1] * b[1];
    let c2 = c[0] * c[0] + c[1] * c[1];
    let cx = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let cy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;
    let r2 = (a[0] - cx).powi(2) + (a[1] - cy).powi(2);
    Circle { cx, cy, r2 }
}

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
pub(crate) fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])
}

/// Maps points into the unit box, preserving aspect ratio.
fn normalise(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    let scale = (max_x - min_x).max(max_y - min_y);
    let scale = if scale > 0.0 { scale } else { 1.0 };
    points
        .iter()
        .map(|p| [(p[0] - min_x) / scale, (p[1] - min_y) / scale])
        .collect()
}

/// Rejects non-finite and repeated coordinates.
pub(crate) fn check_points(points: &[[f64; 2]]) -> Result<(), TriangulationError> {
    if let Some(index) = points
        .iter()
        .position(|p| !p[0].is_finite() || !p[1].is_finite())
    {
        return Err(TriangulationError::NonFiniteCoordinate { index });
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a][0]
            .total_cmp(&points[b][0])
            .then(points[a][1].total_cmp(&points[b][1]))
            .then(a.cmp(&b))
    });
    for pair in order.windows(2) {
        if points[pair[0]] == points[pair[1]] {
            return Err(TriangulationError::DuplicatePoint {
                first: pair[0].min(pair[1]),
                second: pair[0].max(pair[1]),
            });
        }
    }
    Ok(())
}

/// Computes the Delaunay triangles of `points`.
///
/// Returned triangles index into `points` and are counter-clockwise.
/// Inputs must already have passed [`check_points`].
pub(crate) fn triangulate(points: &[[f64; 2]]) -> Result<Vec<[usize; 3]>, TriangulationError> {
    let n = points.len();
    if n < 3 {
        return Err(TriangulationError::TooFewPoints { n });
    }

    let mut verts = normalise(points);
    // Super-triangle covering the unit box with a wide margin: x + y <= 2 * SUPER_SCALE.
    verts.push([-SUPER_SCALE, -SUPER_SCALE]);
    verts.push([3.0 * SUPER_SCALE, -SUPER_SCALE]);
    verts.push([-SUPER_SCALE, 3.0 * SUPER_SCALE]);

    let make = |v: [usize; 3], verts: &[[f64; 2]]| Tri {
        v,
        circle: circumcircle(verts[v[0]], verts[v[1]], verts[v[2]]),
    };

    let mut tris = vec![make([n, n + 1, n + 2], &verts)];
    let mut edges: HashMap<(usize, usize), ((usize, usize), usize)> = HashMap::new();

    for p in 0..n {
        let [px, py] = verts[p];
        edges.clear();

        let mut kept = Vec::with_capacity(tris.len() + 2);
        for tri in tris.drain(..) {
            let c = tri.circle;
            let d2 = (px - c.cx).powi(2) + (py - c.cy).powi(2);
            if d2 < c.r2 * (1.0 - CIRCLE_MARGIN) {
                for (a, b) in [(tri.v[0], tri.v[1]), (tri.v[1], tri.v[2]), (tri.v[2], tri.v[0])] {
                    let key = (a.min(b), a.max(b));
                    edges.entry(key).or_insert(((a, b), 0)).1 += 1;
                }
            } else {
                kept.push(tri);
            }
        }

        // Edges seen once bound the cavity; they keep their counter-clockwise direction.
        for &((a, b), count) in edges.values() {
            if count == 1 && orient(verts[a], verts[b], verts[p]) > 0.0 {
                kept.push(make([a, b, p], &verts));
            }
        }
        tris = kept;
    }

    let triangles: Vec<[usize; 3]> = tris
        .into_iter()
        .map(|t| t.v)
        .filter(|v| v.iter().all(|&i| i < n))
        .filter(|v| orient(verts[v[0]], verts[v[1]], verts[v[2]]).abs() > MIN_AREA)
        .collect();

    if triangles.is_empty() {
        return Err(TriangulationError::Collinear);
    }
    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_area(points: &[[f64; 2]], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| 0.5 * orient(points[t[0]], points[t[1]], points[t[2]]))
            .sum()
    }

    #[test]
    fn test_single_triangle() {
        let pts = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let tris = triangulate(&pts).unwrap();
        assert_eq!(tris.len(), 1);
        assert!(orient(pts[tris[0][0]], pts[tris[0][1]], pts[tris[0][2]]) > 0.0);
    }

    #[test]
    fn test_square_two_triangles() {
        let pts = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let tris = triangulate(&pts).unwrap();
        assert_eq!(tris.len(), 2);
        assert!((total_area(&pts, &tris) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_regular_grid_covers_hull() {
        let mut pts = Vec::new();
        for j in 0..5 {
            for i in 0..6 {
                pts.push([i as f64 * 3000.0, j as f64 * 3000.0]);
            }
        }
        let tris = triangulate(&pts).unwrap();
        // A 6 x 5 grid of points has 5 x 4 cells, two triangles each.
        assert_eq!(tris.len(), 40);
        let area = total_area(&pts, &tris);
        assert!((area - 15000.0 * 12000.0).abs() < 1e-3);
    }

    #[test]
    fn test_delaunay_empty_circumcircles() {
        let pts = [
            [0.0, 0.0],
            [10.0, 1.0],
            [4.0, 7.0],
            [12.0, 9.0],
            [1.0, 11.0],
            [6.0, 3.5],
            [8.0, 12.5],
        ];
        let tris = triangulate(&pts).unwrap();
        for t in &tris {
            let c = circumcircle(pts[t[0]], pts[t[1]], pts[t[2]]);
            for (i, p) in pts.iter().enumerate() {
                if t.contains(&i) {
                    continue;
                }
                let d2 = (p[0] - c.cx).powi(2) + (p[1] - c.cy).powi(2);
                assert!(d2 >= c.r2 * (1.0 - 1e-9), "point {i} inside circumcircle of {t:?}");
            }
        }
    }

    #[test]
    fn test_collinear_rejected() {
        let pts = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        assert_eq!(triangulate(&pts), Err(TriangulationError::Collinear));
    }

    #[test]
    fn test_too_few_points() {
        let pts = [[0.0, 0.0], [1.0, 1.0]];
        assert_eq!(
            triangulate(&pts),
            Err(TriangulationError::TooFewPoints { n: 2 })
        );
    }

    #[test]
    fn test_check_points_duplicate() {
        let pts = [[0.0, 0.0], [5.0, 1.0], [2.0, 2.0], [5.0, 1.0]];
        assert_eq!(
            check_points(&pts),
            Err(TriangulationError::DuplicatePoint {
                first: 1,
                second: 3
            })
        );
    }

    #[test]
    fn test_check_points_non_finite() {
        let pts = [[0.0, 0.0], [f64::NAN, 1.0], [2.0, 2.0]];
        assert_eq!(
            check_points(&pts),
            Err(TriangulationError::NonFiniteCoordinate { index: 1 })
        );
    }
}
