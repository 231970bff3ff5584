//! Deterministic rounding for monetary figures.
//!
//! All monetary values are signed `i64` **minor units**; the only place
//! floating point enters the engine is the fx rate and the percentage fee
//! base. These helpers pin down how those products become integers again so
//! the same order always yields the same figures:
//!
//! - amounts round to the nearest minor unit, ties away from zero
//! - stored rates round to 15 decimal places
//!
//! No fractional minor unit ever persists.

/// Rounds to the nearest integer minor unit, ties away from zero.
///
/// `0.5 → 1`, `-0.5 → -1`, `46.616 → 47`.
#[must_use]
pub fn round_half_away(value: f64) -> i64 {
    value.round() as i64
}

/// Rounds a conversion rate to 15 decimal places.
///
/// Stored inverse rates use this so that re-deriving a rate from the same
/// inputs always reproduces the persisted value bit-for-bit.
#[must_use]
pub fn round_rate(value: f64) -> f64 {
    (value * 1e15).round() / 1e15
}

/// Percentage of an amount, as the raw product before rounding.
#[must_use]
pub fn percent_of(amount_minor: i64, percent: f64) -> f64 {
    amount_minor as f64 * percent / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_half_away(0.5), 1);
        assert_eq!(round_half_away(-0.5), -1);
        assert_eq!(round_half_away(1165.4), 1165);
        assert_eq!(round_half_away(46.616), 47);
        assert_eq!(round_half_away(-46.616), -47);
    }

    #[test]
    fn rate_keeps_fifteen_decimals() {
        let inverse = round_rate(1.0 / 1.1654);
        assert_eq!(inverse, round_rate(1.0 / 1.1654));
        assert!((inverse - 0.858_074_8).abs() < 1e-6);
    }

    #[test]
    fn percent_of_is_exact_for_whole_percents() {
        assert_eq!(percent_of(1000, 4.0), 40.0);
        assert_eq!(percent_of(1000, 0.0), 0.0);
    }
}
