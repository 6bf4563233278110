//! Scattered interpolation over random station layouts.

use approx::assert_abs_diff_eq;
use gridcast_triangulation::{Mode, Triangulation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn scattered(n: usize, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            [
                rng.random_range(0.0..20_000.0),
                rng.random_range(0.0..20_000.0),
            ]
        })
        .collect()
}

fn plane(p: [f64; 2]) -> f64 {
    3.5 + 0.002 * p[0] - 0.0007 * p[1]
}

fn grid_queries(step: f64, extent: f64) -> Vec<[f64; 2]> {
    let n = (extent / step) as usize + 1;
    let mut out = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            out.push([i as f64 * step, j as f64 * step]);
        }
    }
    out
}

#[test]
fn linear_reproduces_plane_inside_hull() {
    let points = scattered(40, 1);
    let tri = Triangulation::new(&points).unwrap();
    let values: Vec<f64> = points.iter().map(|&p| plane(p)).collect();

    let queries = grid_queries(500.0, 20_000.0);
    let out = tri.interpolate(&values, &queries, Mode::Linear).unwrap();

    let mut inside = 0;
    for (q, v) in queries.iter().zip(&out) {
        if v.is_nan() {
            continue;
        }
        inside += 1;
        assert_abs_diff_eq!(*v, plane(*q), epsilon = 1e-8);
    }
    assert!(inside > queries.len() / 2);
}

#[test]
fn cubic_reproduces_plane_inside_hull() {
    let points = scattered(40, 2);
    let tri = Triangulation::new(&points).unwrap();
    let values: Vec<f64> = points.iter().map(|&p| plane(p)).collect();

    let queries = grid_queries(1000.0, 20_000.0);
    let linear = tri.interpolate(&values, &queries, Mode::Linear).unwrap();
    let cubic = tri.interpolate(&values, &queries, Mode::Cubic).unwrap();

    for ((q, l), c) in queries.iter().zip(&linear).zip(&cubic) {
        assert_eq!(l.is_nan(), c.is_nan());
        if !c.is_nan() {
            assert_abs_diff_eq!(*c, plane(*q), epsilon = 1e-8);
        }
    }
}

#[test]
fn vertices_are_reproduced_exactly() {
    let points = scattered(25, 3);
    let tri = Triangulation::new(&points).unwrap();
    let mut rng = StdRng::seed_from_u64(30);
    let values: Vec<f64> = (0..points.len())
        .map(|_| rng.random_range(-10.0..10.0))
        .collect();

    for mode in [Mode::Nearest, Mode::Linear, Mode::Cubic] {
        let out = tri.interpolate(&values, &points, mode).unwrap();
        for (got, want) in out.iter().zip(&values) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-9);
        }
    }
}

#[test]
fn nearest_is_never_nan() {
    let points = scattered(15, 4);
    let tri = Triangulation::new(&points).unwrap();
    let values: Vec<f64> = (0..points.len()).map(|i| i as f64).collect();

    let queries = grid_queries(2500.0, 40_000.0);
    let out = tri.interpolate(&values, &queries, Mode::Nearest).unwrap();
    assert!(out.iter().all(|v| v.is_finite()));
}

#[test]
fn linear_is_nan_outside_hull() {
    let points = [[0.0, 0.0], [100.0, 0.0], [0.0, 100.0]];
    let tri = Triangulation::new(&points).unwrap();
    let out = tri
        .interpolate(
            &[1.0, 2.0, 3.0],
            &[[80.0, 80.0], [-1.0, 0.0], [10.0, 10.0]],
            Mode::Linear,
        )
        .unwrap();
    assert!(out[0].is_nan());
    assert!(out[1].is_nan());
    assert!(out[2].is_finite());
}

#[test]
fn linear_stays_within_vertex_range() {
    let points = scattered(30, 5);
    let tri = Triangulation::new(&points).unwrap();
    let mut rng = StdRng::seed_from_u64(50);
    let values: Vec<f64> = (0..points.len())
        .map(|_| rng.random_range(0.0..1.0))
        .collect();

    let out = tri
        .interpolate(&values, &grid_queries(700.0, 20_000.0), Mode::Linear)
        .unwrap();
    for v in out.into_iter().filter(|v| !v.is_nan()) {
        assert!((-1e-12..=1.0 + 1e-12).contains(&v));
    }
}

#[test]
fn plan_is_reusable_across_value_sets() {
    let points = scattered(20, 6);
    let tri = Triangulation::new(&points).unwrap();
    let queries = grid_queries(1000.0, 20_000.0);
    let plan = tri.plan(&queries);

    for shift in [0.0, 10.0, -4.0] {
        let values: Vec<f64> = points.iter().map(|&p| plane(p) + shift).collect();
        let planned = tri.interpolate_planned(&plan, &values, Mode::Linear).unwrap();
        let direct = tri.interpolate(&values, &queries, Mode::Linear).unwrap();
        for (a, b) in planned.iter().zip(&direct) {
            assert!(a.is_nan() && b.is_nan() || (a - b).abs() < 1e-12);
        }
    }
}

#[test]
fn triangles_cover_hull_area() {
    // Convex layout: the triangulation must tile the square exactly.
    let mut points = vec![[0.0, 0.0], [1000.0, 0.0], [1000.0, 1000.0], [0.0, 1000.0]];
    points.extend(
        scattered(30, 7)
            .into_iter()
            .map(|p| [100.0 + p[0] / 25.0, 100.0 + p[1] / 25.0]),
    );
    let tri = Triangulation::new(&points).unwrap();

    let area: f64 = tri
        .triangles()
        .iter()
        .map(|t| {
            let [a, b, c] = t.map(|i| points[i]);
            0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
        })
        .sum();
    assert_abs_diff_eq!(area, 1_000_000.0, epsilon = 1e-6);
    // Euler: 2n - 2 - h triangles for n points with h on the hull.
    assert_eq!(tri.triangles().len(), 2 * points.len() - 2 - 4);
}
