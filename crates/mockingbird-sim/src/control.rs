//! Saturating proportional rate law shared by the turn, climb and speed axes.
//!
//! `rate = clamp(error / length_scale, -1, 1) * max_rate`: full authority once
//! the error reaches `length_scale`, decaying linearly to zero on target.

/// Heading error (degrees) at which turn rate saturates.
pub const HEADING_LENGTH_SCALE: f64 = 5.0;

/// Speed error (knots) at which acceleration saturates.
pub const SPEED_LENGTH_SCALE: f64 = 10.0;

/// Flight level error at which rise rate saturates.
pub const ALTITUDE_LENGTH_SCALE: f64 = 10.0;

/// Fraction of full authority to apply for a given error, in [-1, 1].
#[must_use]
pub fn authority(error: f64, length_scale: f64) -> f64 {
    (error / length_scale).clamp(-1.0, 1.0)
}

/// Signed rate driving `current` towards `target`.
#[must_use]
pub fn rate(current: f64, target: f64, length_scale: f64, max_rate: f64) -> f64 {
    authority(target - current, length_scale) * max_rate
}

/// Heading error, unwrapped once so a short left turn across North is taken.
#[must_use]
pub fn heading_error(heading: f64, target_heading: f64) -> f64 {
    let delta = target_heading - heading;
    if delta < -180.0 { delta + 360.0 } else { delta }
}

/// Normalise a heading into [0, 360).
#[must_use]
pub fn normalize_heading(heading: f64) -> f64 {
    let wrapped = heading.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::Fake;

    #[test]
    fn test_rate_saturates_at_length_scale() {
        assert_eq!(rate(350.0, 400.0, ALTITUDE_LENGTH_SCALE, 2.5), 2.5);
        assert_eq!(rate(350.0, 360.0, ALTITUDE_LENGTH_SCALE, 2.5), 2.5);
        assert_eq!(rate(400.0, 350.0, ALTITUDE_LENGTH_SCALE, 2.5), -2.5);
    }

    #[test]
    fn test_rate_is_zero_on_target() {
        assert_eq!(rate(250.0, 250.0, SPEED_LENGTH_SCALE, 4.0), 0.0);
    }

    #[test]
    fn test_rate_is_proportional_inside_length_scale() {
        let r = rate(0.0, 2.5, HEADING_LENGTH_SCALE, 3.0);
        assert!((r - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_max_rate_never_moves() {
        assert_eq!(rate(0.0, 1000.0, SPEED_LENGTH_SCALE, 0.0), 0.0);
    }

    #[test]
    fn test_random_errors_never_exceed_max_rate() {
        for _ in 0..500 {
            let current: f64 = (-1000.0..1000.0).fake();
            let target: f64 = (-1000.0..1000.0).fake();
            let max_rate: f64 = (0.0..10.0).fake();
            let r = rate(current, target, SPEED_LENGTH_SCALE, max_rate);
            assert!(r.abs() <= max_rate);
            if (target - current).abs() >= SPEED_LENGTH_SCALE {
                assert_eq!(r.abs(), max_rate);
            }
        }
    }

    #[test]
    fn test_heading_error_wraps_short_way_across_north() {
        assert_eq!(heading_error(350.0, 10.0), -340.0 + 360.0);
        assert_eq!(heading_error(10.0, 350.0), 340.0);
        assert_eq!(heading_error(90.0, 45.0), -45.0);
    }

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading(360.0), 0.0);
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(725.0), 5.0);
        assert_eq!(normalize_heading(-1e-18), 0.0);
        for _ in 0..500 {
            let h = normalize_heading((-10_000.0..10_000.0).fake::<f64>());
            assert!((0.0..360.0).contains(&h));
        }
    }
}
