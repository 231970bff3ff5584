use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::fx::{FixedRateProvider, FxService};
use crate::{EngineError, RateProvider, ResultEngine};

mod access;
mod accounts;
mod balances;
mod counterparty;
mod entries;
mod memberships;
mod orders;
mod payment_methods;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    fx: FxService,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    rates: Option<Arc<dyn RateProvider>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Inject the exchange-rate provider. Defaults to an empty fixed table,
    /// which only supports same-currency orders.
    pub fn rates(mut self, provider: Arc<dyn RateProvider>) -> EngineBuilder {
        self.rates = Some(provider);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let provider = self
            .rates
            .unwrap_or_else(|| Arc::new(FixedRateProvider::default()));
        Ok(Engine {
            database: self.database,
            fx: FxService::new(provider),
        })
    }
}
