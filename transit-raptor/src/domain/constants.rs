//! Reserved integer values.
//!
//! Times and costs in the search are plain `i32`s. A handful of values far
//! outside the range of any real time or cost are reserved to mean "not
//! applicable", "not found" and "not reached yet". They are spaced far apart
//! so that adding a realistic duration to one of them can never land on
//! another.

/// Value is not applicable, e.g. c2 in a search without a second criterion.
pub const NOT_SET: i32 = -1_999_000_000;

/// A lookup found nothing. Kept distinct from [`NOT_SET`].
pub const NOT_FOUND: i32 = -2_111_000_000;

/// Initial "worse than anything" value for criteria that are minimized.
pub const UNREACHED_HIGH: i32 = 2_000_000_000;

/// Initial "worse than anything" value for criteria that are maximized.
pub const UNREACHED_LOW: i32 = -2_000_000_000;

/// Largest magnitude a real time or cost may take (about 31 years in seconds).
pub const MAX_REAL_VALUE: i32 = 1_000_000_000;

/// Returns true if `value` lies in the reserved range.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::{is_sentinel, NOT_SET, UNREACHED_HIGH};
///
/// assert!(is_sentinel(NOT_SET));
/// assert!(is_sentinel(UNREACHED_HIGH));
/// assert!(!is_sentinel(8 * 3600));
/// ```
pub fn is_sentinel(value: i32) -> bool {
    value.unsigned_abs() > MAX_REAL_VALUE as u32
}

/// Add `delta` to `value` unless `value` is a sentinel.
///
/// Sentinels pass through unchanged. A real value is clamped to
/// `±MAX_REAL_VALUE`, so it can never be pushed into the reserved range.
pub fn add_guarded(value: i32, delta: i32) -> i32 {
    if is_sentinel(value) {
        return value;
    }
    debug_assert!(!is_sentinel(delta), "sentinel used as a duration: {delta}");
    value
        .saturating_add(delta)
        .clamp(-MAX_REAL_VALUE, MAX_REAL_VALUE)
}

/// Subtract `delta` from `value` unless `value` is a sentinel.
pub fn sub_guarded(value: i32, delta: i32) -> i32 {
    if is_sentinel(value) {
        return value;
    }
    debug_assert!(!is_sentinel(delta), "sentinel used as a duration: {delta}");
    value
        .saturating_sub(delta)
        .clamp(-MAX_REAL_VALUE, MAX_REAL_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_distinct_and_far_apart() {
        let all = [NOT_SET, NOT_FOUND, UNREACHED_HIGH, UNREACHED_LOW];
        for (i, a) in all.iter().enumerate() {
            assert!(is_sentinel(*a));
            for b in &all[i + 1..] {
                assert!((*a as i64 - *b as i64).abs() >= 1_000_000);
            }
        }
    }

    #[test]
    fn sentinels_pass_through_arithmetic() {
        assert_eq!(add_guarded(UNREACHED_HIGH, 3600), UNREACHED_HIGH);
        assert_eq!(sub_guarded(UNREACHED_LOW, 3600), UNREACHED_LOW);
        assert_eq!(add_guarded(NOT_SET, 60), NOT_SET);
        assert_eq!(sub_guarded(NOT_FOUND, 60), NOT_FOUND);
    }

    #[test]
    fn near_sentinel_values_stay_real() {
        let high = add_guarded(MAX_REAL_VALUE - 10, 100);
        assert_eq!(high, MAX_REAL_VALUE);
        assert!(!is_sentinel(high));

        let low = sub_guarded(-MAX_REAL_VALUE + 10, 100);
        assert_eq!(low, -MAX_REAL_VALUE);
        assert!(!is_sentinel(low));
    }

    #[test]
    fn boundary_is_not_a_sentinel() {
        assert!(!is_sentinel(MAX_REAL_VALUE));
        assert!(!is_sentinel(-MAX_REAL_VALUE));
        assert!(is_sentinel(MAX_REAL_VALUE + 1));
        assert!(is_sentinel(-MAX_REAL_VALUE - 1));
    }
}
