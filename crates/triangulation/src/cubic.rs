//! Clough–Tocher cubic patches for smooth scattered interpolation.
//!
//! Each vertex gets a gradient estimated as the area-weighted mean of the
//! plane gradients of its incident triangles. Every triangle is split at
//! its centroid into three micro-triangles, each carrying a cubic Bézier
//! piece. The pieces meet with continuous gradients inside the triangle,
//! and the derivative across every edge varies linearly along it, so
//! neighbouring triangles also join with continuous gradients. Linear data
//! produce exact plane gradients, so linear fields are reproduced exactly.

/// Estimates a gradient `[df/dx, df/dy]` at every vertex.
pub(crate) fn vertex_gradients(
    points: &[[f64; 2]],
    triangles: &[[usize; 3]],
    values: &[f64],
) -> Vec<[f64; 2]> {
    let mut sum = vec![[0.0_f64; 2]; points.len()];
    let mut weight = vec![0.0_f64; points.len()];

    for tri in triangles {
        let [p0, p1, p2] = tri.map(|i| points[i]);
        let [f0, f1, f2] = tri.map(|i| values[i]);
        let det = (p1[0] - p0[0]) * (p2[1] - p0[1]) - (p2[0] - p0[0]) * (p1[1] - p0[1]);
        if det.abs() < f64::MIN_POSITIVE {
            continue;
        }
        let gx = ((f1 - f0) * (p2[1] - p0[1]) - (f2 - f0) * (p1[1] - p0[1])) / det;
        let gy = ((p1[0] - p0[0]) * (f2 - f0) - (p2[0] - p0[0]) * (f1 - f0)) / det;
        let area = 0.5 * det.abs();
        for &v in tri {
            sum[v][0] += area * gx;
            sum[v][1] += area * gy;
            weight[v] += area;
        }
    }

    sum.into_iter()
        .zip(weight)
        .map(|(g, w)| if w > 0.0 { [g[0] / w, g[1] / w] } else { [0.0, 0.0] })
        .collect()
}

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

/// Control net of one Clough–Tocher macro-triangle.
///
/// Vertex `i` of the triangle is local index `i`; micro-triangle `k` is
/// the one opposite vertex `k`, spanning vertices `k + 1`, `k + 2` and the
/// centroid.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CubicPatch {
    /// Vertex values.
    f: [f64; 3],
    /// `edge[i][0]` sits a third of the way from vertex `i` to `i + 1`,
    /// `edge[i][1]` a third of the way to `i + 2`.
    edge: [[f64; 2]; 3],
    /// A third of the way from vertex `i` to the centroid.
    inner: [f64; 3],
    /// Interior control point of micro-triangle `k`.
    face: [f64; 3],
    /// Two thirds of the way from vertex `i` to the centroid.
    spoke: [f64; 3],
    /// Value at the centroid.
    centre: f64,
}

impl CubicPatch {
    pub(crate) fn new(
        tri: [usize; 3],
        points: &[[f64; 2]],
        values: &[f64],
        gradients: &[[f64; 2]],
    ) -> Self {
        let p = tri.map(|i| points[i]);
        let f = tri.map(|i| values[i]);
        let g = tri.map(|i| gradients[i]);
        let centroid = [
            (p[0][0] + p[1][0] + p[2][0]) / 3.0,
            (p[0][1] + p[1][1] + p[2][1]) / 3.0,
        ];

        // Tangent-plane value a third of the way from vertex `i` towards `to`.
        let along = |i: usize, to: [f64; 2]| f[i] + dot(g[i], sub(to, p[i])) / 3.0;

        let edge: [[f64; 2]; 3] =
            std::array::from_fn(|i| [along(i, p[(i + 1) % 3]), along(i, p[(i + 2) % 3])]);
        let inner: [f64; 3] = std::array::from_fn(|i| along(i, centroid));

        // The derivative normal to edge (a, b) is the linear blend of its
        // vertex values, which fixes the micro-triangle's interior point.
        let face: [f64; 3] = std::array::from_fn(|k| {
            let (a, b) = ((k + 1) % 3, (k + 2) % 3);
            let t = sub(p[b], p[a]);
            let n = [-t[1], t[0]];
            let to_centre = sub(centroid, p[a]);
            // n = beta * (b - a) + gamma * (centroid - a)
            let det = t[0] * to_centre[1] - t[1] * to_centre[0];
            let beta = (n[0] * to_centre[1] - n[1] * to_centre[0]) / det;
            let gamma = (t[0] * n[1] - t[1] * n[0]) / det;
            let alpha = -beta - gamma;
            let cross = (dot(g[a], n) + dot(g[b], n)) / 6.0;
            (cross - alpha * edge[a][0] - beta * edge[b][1]) / gamma
        });

        let spoke: [f64; 3] =
            std::array::from_fn(|i| (inner[i] + face[(i + 1) % 3] + face[(i + 2) % 3]) / 3.0);
        let centre = (spoke[0] + spoke[1] + spoke[2]) / 3.0;

        Self {
            f,
            edge,
            inner,
            face,
            spoke,
            centre,
        }
    }

    /// Evaluates the patch at barycentric weights of the macro-triangle.
    pub(crate) fn evaluate(&self, w: [f64; 3]) -> f64 {
        // The micro-triangle holding the point is opposite its smallest weight.
        let mut k = 0;
        for i in 1..3 {
            if w[i] < w[k] {
                k = i;
            }
        }
        let (i, j) = ((k + 1) % 3, (k + 2) % 3);
        let c = 3.0 * w[k];
        let a = w[i] - w[k];
        let b = w[j] - w[k];

        self.f[i] * a * a * a
            + self.f[j] * b * b * b
            + self.centre * c * c * c
            + 3.0 * self.edge[i][0] * a * a * b
            + 3.0 * self.edge[j][1] * a * b * b
            + 3.0 * self.inner[i] * a * a * c
            + 3.0 * self.inner[j] * b * b * c
            + 3.0 * self.spoke[i] * a * c * c
            + 3.0 * self.spoke[j] * b * c * c
            + 6.0 * self.face[k] * a * b * c
    }
}
