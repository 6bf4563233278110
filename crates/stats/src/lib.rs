//! Statistical helper functions for gridcast.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Slope and intercept of a first-degree least-squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Change in `y` per unit `x`.
    pub slope: f64,
    /// Value of `y` at `x = 0`.
    pub intercept: f64,
}

/// Ordinary least-squares line through `(x, y)` pairs.
///
/// Only pairs where both values are finite take part in the fit.
/// Returns `None` if fewer than 2 finite pairs remain or if every `x` is
/// the same (the slope is undefined).
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LineFit> {
    let mut n = 0usize;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        if xi.is_finite() && yi.is_finite() {
            n += 1;
            sx += xi;
            sy += yi;
        }
    }
    if n < 2 {
        return None;
    }

    // Centred sums keep large elevations from swamping the slope.
    let nf = n as f64;
    let mx = sx / nf;
    let my = sy / nf;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        if xi.is_finite() && yi.is_finite() {
            let dx = xi - mx;
            sxx += dx * dx;
            sxy += dx * (yi - my);
        }
    }

    if sxx <= f64::EPSILON * (mx * mx).max(1.0) * nf {
        return None;
    }

    let slope = sxy / sxx;
    Some(LineFit {
        slope,
        intercept: my - slope * mx,
    })
}
