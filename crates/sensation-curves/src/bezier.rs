//! Cubic Bezier evaluation in one dimension.

/// Coefficients below this magnitude are treated as zero when solving for extrema.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Evaluate a cubic Bezier at parameter `t` using the Bernstein basis.
///
/// `t` is expected in `[0, 1]`; values outside extrapolate the polynomial.
#[inline]
pub fn bezier(t: f32, p0: f32, p1: f32, p2: f32, p3: f32) -> f32 {
    let u = 1.0 - t;
    let uu = u * u;
    let tt = t * t;

    p0 * uu * u + 3.0 * uu * t * p1 + 3.0 * u * tt * p2 + p3 * tt * t
}

/// First derivative of the cubic with respect to `t`.
#[inline]
pub fn bezier_derivative(t: f32, p0: f32, p1: f32, p2: f32, p3: f32) -> f32 {
    let u = 1.0 - t;
    3.0 * u * u * (p1 - p0) + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (p3 - p2)
}

/// Parameters in `[0, 1]` where the cubic has a stationary point.
///
/// Solves `a·t² + b·t + c = 0` for the derivative. A near-zero quadratic
/// coefficient falls back to the linear root; roots outside `[0, 1]` are
/// discarded.
pub fn stationary_points(p0: f32, p1: f32, p2: f32, p3: f32) -> [Option<f32>; 2] {
    let a = 3.0 * (-p0 + 3.0 * p1 - 3.0 * p2 + p3);
    let b = 6.0 * (p0 - 2.0 * p1 + p2);
    let c = 3.0 * (p1 - p0);

    let in_unit = |t: f32| (t.is_finite() && (0.0..=1.0).contains(&t)).then_some(t);

    if a.abs() < DEGENERATE_EPSILON {
        if b.abs() < DEGENERATE_EPSILON {
            return [None, None];
        }
        return [in_unit(-c / b), None];
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return [None, None];
    }

    let root = discriminant.sqrt();
    [
        in_unit((-b + root) / (2.0 * a)),
        in_unit((-b - root) / (2.0 * a)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const START: f32 = 0.0;
    const START_OUT: f32 = 0.0;
    const END_IN: f32 = -1.279795;
    const END: f32 = 2.0;

    #[test]
    fn test_bezier_matches_reference_samples() {
        let samples = [
            (0.0, 0.0),
            (0.055555, -0.01084869),
            (0.222222, -0.1255182),
            (0.444444, -0.2457487),
            (0.5, -0.2299231),
            (0.666666, 0.02379485),
            (0.888888, 1.067599),
            (1.0, 2.0),
        ];

        for (t, expected) in samples {
            let value = bezier(t, START, START_OUT, END_IN, END);
            assert_abs_diff_eq!(value, expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_constant_curve_has_no_stationary_points() {
        assert_eq!(stationary_points(0.5, 0.5, 0.5, 0.5), [None, None]);
    }

    #[test]
    fn test_linear_fallback_root() {
        // a == 0 when p0 - 3p1 + 3p2 - p3 cancels: symmetric hump
        let [first, second] = stationary_points(0.0, 1.0, 1.0, 0.0);
        let t = first.or(second);
        assert!(t.is_some_and(|t| (t - 0.5).abs() < 1e-5));
    }

    #[test]
    fn test_stationary_point_is_local_minimum() {
        let roots = stationary_points(START, START_OUT, END_IN, END);
        let minimum = roots
            .iter()
            .flatten()
            .map(|&t| bezier(t, START, START_OUT, END_IN, END))
            .fold(f32::INFINITY, f32::min);
        assert!(minimum < -0.245);
        for t in roots.iter().flatten() {
            assert_abs_diff_eq!(
                bezier_derivative(*t, START, START_OUT, END_IN, END),
                0.0,
                epsilon = 1e-3
            );
        }
    }

    #[test]
    fn test_out_of_range_roots_discarded() {
        // monotonic ramp, derivative vanishes only outside [0, 1]
        for t in stationary_points(0.0, 0.4, 0.8, 1.0).iter().flatten() {
            assert!((0.0..=1.0).contains(t));
        }
    }
}
