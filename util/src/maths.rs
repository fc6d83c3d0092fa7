//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Piecewise-linear interpolation of `x` over the breakpoints `bp` and values
/// `v`.
///
/// Queries outside the breakpoint domain are clamped to the first or last
/// value, so this never fails for a valid table. The table must be non-empty,
/// `bp` and `v` must be the same length and `bp` must be strictly increasing,
/// which `Curve` enforces at construction. An empty table gives zero.
pub fn interp<T>(x: T, bp: &[T], v: &[T]) -> T
where
    T: Float
{
    let n = bp.len().min(v.len());

    if n == 0 {
        return T::zero();
    }

    if x <= bp[0] {
        return v[0];
    }
    if x >= bp[n - 1] {
        return v[n - 1];
    }

    // Find the first breakpoint above x, the bracket is then [i - 1, i]. The
    // tables are a handful of points long so a linear scan is fine.
    let mut i = 1;
    while i < n - 1 && bp[i] < x {
        i += 1;
    }

    lin_map((bp[i - 1], bp[i]), (v[i - 1], v[i]), x)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 10f64), (0f64, 1f64), 5f64), 0.5);
        assert_eq!(lin_map((2f64, 9f64), (10f64, -0.1f64), 2f64), 10.0);
        assert_eq!(lin_map((0f64, 1f64), (1f64, 0f64), 0.25f64), 0.75);
    }

    #[test]
    fn test_interp_between_breakpoints() {
        let bp = [0.0, 5.0, 35.0];
        let v = [3.6, 2.4, 1.5];

        assert!((interp(2.5, &bp, &v) - 3.0).abs() < 1e-12);
        assert!((interp(20.0, &bp, &v) - 1.95).abs() < 1e-12);
        assert!((interp(5.0, &bp, &v) - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_interp_clamps_to_edges() {
        let bp = [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let v = [10.0, 5.0, 2.0, 1.0, 0.5, 0.1, 0.0, -0.1];

        assert_eq!(interp(0.0, &bp, &v), 10.0);
        assert_eq!(interp(-100.0, &bp, &v), 10.0);
        assert_eq!(interp(9.0, &bp, &v), -0.1);
        assert_eq!(interp(1e9, &bp, &v), -0.1);
        assert!((interp(3.5, &bp, &v) - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_interp_single_point_is_constant() {
        assert_eq!(interp(-1.0, &[0.0], &[0.5]), 0.5);
        assert_eq!(interp(100.0, &[0.0], &[0.5]), 0.5);
    }

    #[test]
    fn test_interp_empty_is_zero() {
        let empty: [f64; 0] = [];
        assert_eq!(interp(1.0, &empty, &empty), 0.0);
    }
}
