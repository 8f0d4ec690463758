//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// Due to floating point round-off the result can equal `rhs.abs()` when `lhs` is a very small
/// negative number.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle into the range [-180, 180).
///
/// Units: degrees
pub fn wrap_deg<T>(angle: T) -> T
where
    T: Float,
{
    let half: T = T::from(180.0).unwrap_or_else(T::zero);
    let full = half + half;

    let wrapped = rem_euclid(angle + half, full) - half;

    // Round-off in rem_euclid can land exactly on the excluded upper bound
    if wrapped >= half {
        wrapped - full
    } else {
        wrapped
    }
}

/// Get the shortest signed angular distance to go from `from` to `to`.
///
/// The result lies in [-180, 180), positive meaning anticlockwise.
///
/// Units: degrees
pub fn get_ang_dist_deg<T>(from: T, to: T) -> T
where
    T: Float,
{
    wrap_deg(to - from)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wrap_deg() {
        assert_eq!(wrap_deg(0f64), 0f64);
        assert_eq!(wrap_deg(180f64), -180f64);
        assert_eq!(wrap_deg(-180f64), -180f64);
        assert_eq!(wrap_deg(270f64), -90f64);
        assert_eq!(wrap_deg(-270f64), 90f64);
        assert_eq!(wrap_deg(720f64 + 45f64), 45f64);
        assert!(wrap_deg(-1e-20f64) < 180f64);
    }

    #[test]
    fn test_get_ang_dist_deg() {
        assert_eq!(get_ang_dist_deg(10f64, 20f64), 10f64);
        assert_eq!(get_ang_dist_deg(20f64, 10f64), -10f64);
        assert_eq!(get_ang_dist_deg(170f64, -170f64), 20f64);
        assert_eq!(get_ang_dist_deg(-170f64, 170f64), -20f64);
        assert_eq!(get_ang_dist_deg(0f64, 360f64), 0f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5f64, &-1f64, &1f64), 1f64);
        assert_eq!(clamp(&-5f64, &-1f64, &1f64), -1f64);
        assert_eq!(clamp(&0.5f64, &-1f64, &1f64), 0.5f64);
    }
}
