//! Currency conversion service.
//!
//! The actual exchange-rate source is an external collaborator behind the
//! [`RateProvider`] trait; the engine never talks to it directly. The
//! [`FxService`] wrapper enforces the two contract points the ledger relies
//! on:
//!
//! - a same-currency conversion is exactly `1.0` and never touches the
//!   provider
//! - a provider rate must be a finite positive number
//!
//! The service is called once per order, before the atomic write unit, and
//! the single resulting rate is reused for every derived figure of that
//! order's entry pair.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Currency, EngineError, ResultEngine};

/// Source of exchange rates for a currency pair at a point in time.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn rate(&self, from: Currency, to: Currency, at: DateTime<Utc>) -> ResultEngine<f64>;
}

/// Validating wrapper around an injected [`RateProvider`].
#[derive(Clone)]
pub struct FxService {
    provider: Arc<dyn RateProvider>,
}

impl FxService {
    #[must_use]
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self { provider }
    }

    /// Returns the conversion rate `from → to` as of `at`.
    pub async fn rate(&self, from: Currency, to: Currency, at: DateTime<Utc>) -> ResultEngine<f64> {
        if from == to {
            return Ok(1.0);
        }
        let rate = self.provider.rate(from, to, at).await?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(EngineError::Validation(format!(
                "invalid exchange rate for {from}/{to}: {rate}"
            )));
        }
        Ok(rate)
    }
}

impl fmt::Debug for FxService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FxService").finish_non_exhaustive()
    }
}

/// In-memory provider with a fixed table of directed pairs.
///
/// Used in tests and in single-host deployments where the operator pins the
/// settlement rates.
#[derive(Debug, Default)]
pub struct FixedRateProvider {
    rates: HashMap<(Currency, Currency), f64>,
}

impl FixedRateProvider {
    #[must_use]
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: f64) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    async fn rate(&self, from: Currency, to: Currency, _at: DateTime<Utc>) -> ResultEngine<f64> {
        self.rates.get(&(from, to)).copied().ok_or_else(|| {
            EngineError::KeyNotFound(format!("no exchange rate for {from}/{to}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_currency_skips_the_provider() {
        // An empty provider would fail any lookup; the shortcut must not ask.
        let fx = FxService::new(Arc::new(FixedRateProvider::default()));
        let rate = fx.rate(Currency::Usd, Currency::Usd, Utc::now()).await.unwrap();
        assert_eq!(rate, 1.0);
    }

    #[tokio::test]
    async fn provider_rate_is_returned_for_cross_currency() {
        let provider = FixedRateProvider::default().with_rate(Currency::Eur, Currency::Usd, 1.1654);
        let fx = FxService::new(Arc::new(provider));
        let rate = fx.rate(Currency::Eur, Currency::Usd, Utc::now()).await.unwrap();
        assert_eq!(rate, 1.1654);
    }

    #[tokio::test]
    async fn non_positive_rates_are_rejected() {
        let provider = FixedRateProvider::default().with_rate(Currency::Eur, Currency::Usd, 0.0);
        let fx = FxService::new(Arc::new(provider));
        let err = fx.rate(Currency::Eur, Currency::Usd, Utc::now()).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_pair_is_not_found() {
        let fx = FxService::new(Arc::new(FixedRateProvider::default()));
        let err = fx.rate(Currency::Eur, Currency::Usd, Utc::now()).await.unwrap_err();
        assert!(matches!(err, EngineError::KeyNotFound(_)));
    }
}
