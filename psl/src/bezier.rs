//! Control points of a smooth cubic Bezier spline through a set of knots.

use crate::error::{Error, Result};

/// Compute the two interior control points of every segment of the cubic
/// Bezier spline through `knots`, one coordinate at a time.
///
/// The first derivatives are continuous at every interior knot and the
/// second derivatives vanish at both ends. The returned vectors have one
/// entry per segment.
pub fn fit_bezier(knots: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
    if knots.len() < 2 {
        return Err(Error::BadSize);
    }

    // Index of the last knot, and the number of segments.
    let n = knots.len() - 1;
    let k = knots;

    let mut a = vec![0.0; n];
    let mut b = vec![0.0; n];
    let mut c = vec![0.0; n];
    let mut r = vec![0.0; n];

    a[0] = 0.0;
    b[0] = 2.0;
    c[0] = 1.0;
    r[0] = k[0] + 2.0 * k[1];

    for i in 1..n.saturating_sub(1) {
        a[i] = 1.0;
        b[i] = 4.0;
        c[i] = 1.0;
        r[i] = 4.0 * k[i] + 2.0 * k[i + 1];
    }

    a[n - 1] = 2.0;
    b[n - 1] = 7.0;
    c[n - 1] = 0.0;
    r[n - 1] = 8.0 * k[n - 1] + k[n];

    // Thomas algorithm.
    for i in 1..n {
        let m = a[i] / b[i - 1];
        b[i] -= m * c[i - 1];
        r[i] -= m * r[i - 1];
    }

    let mut p1 = vec![0.0; n];
    p1[n - 1] = r[n - 1] / b[n - 1];
    for i in (0..n - 1).rev() {
        p1[i] = (r[i] - c[i] * p1[i + 1]) / b[i];
    }

    let mut p2 = vec![0.0; n];
    for i in 0..n - 1 {
        p2[i] = 2.0 * k[i + 1] - p1[i + 1];
    }
    p2[n - 1] = 0.5 * (k[n] + p1[n - 1]);

    Ok((p1, p2))
}
