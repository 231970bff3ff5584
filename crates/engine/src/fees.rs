//! Fee computation for order realization.
//!
//! Every fee sub-amount is expressed in the **host currency** and carries a
//! **negative sign** on the credit side of an entry pair: a fee is a deduction
//! from the destination's credit. The payment-processor fee is decided
//! upstream and passed through as a non-negative host-currency magnitude,
//! negated here by the same convention.

use crate::money::{percent_of, round_half_away};
use crate::{EngineError, ResultEngine};

/// Fee sub-amounts for one order, host currency, negative-signed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub host_fee_minor: i64,
    pub platform_fee_minor: i64,
    pub payment_processor_fee_minor: i64,
}

impl FeeBreakdown {
    /// Computes the fee set for a base amount in the entry's own currency.
    ///
    /// `fx_rate` converts the entry currency into the host currency; the
    /// percentage fees are taken on the converted amount and rounded to the
    /// nearest minor unit, ties away from zero. Fees are computed exactly
    /// once per order and never re-derived from persisted figures.
    pub fn compute(
        amount_minor: i64,
        fx_rate: f64,
        host_fee_percent: f64,
        platform_fee_percent: f64,
        processor_fee_minor: i64,
    ) -> ResultEngine<FeeBreakdown> {
        validate_fee_percent(host_fee_percent, "host fee")?;
        validate_fee_percent(platform_fee_percent, "platform fee")?;
        if processor_fee_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "payment processor fee must not be negative".to_string(),
            ));
        }

        let host_fee_minor = -round_half_away(percent_of(amount_minor, host_fee_percent) * fx_rate);
        let platform_fee_minor =
            -round_half_away(percent_of(amount_minor, platform_fee_percent) * fx_rate);

        Ok(FeeBreakdown {
            host_fee_minor,
            platform_fee_minor,
            payment_processor_fee_minor: -processor_fee_minor,
        })
    }

    /// Sum of all sub-amounts (host currency, non-positive).
    #[must_use]
    pub fn total_minor(&self) -> i64 {
        self.host_fee_minor + self.platform_fee_minor + self.payment_processor_fee_minor
    }
}

/// Net amount credited to the destination, in the entry's **own** currency.
///
/// Computed directly from the percentage, independent of the rounding applied
/// to the host-currency fee figures; the two are allowed to diverge by
/// sub-unit rounding.
#[must_use]
pub fn net_amount_minor(amount_minor: i64, host_fee_percent: f64) -> i64 {
    round_half_away(amount_minor as f64 * (1.0 - host_fee_percent / 100.0))
}

/// Rejects fee percentages outside `[0, 100]`.
pub(crate) fn validate_fee_percent(value: f64, label: &str) -> ResultEngine<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(EngineError::Validation(format!(
            "{label} percent must be between 0 and 100"
        )));
    }
    Ok(())
}
