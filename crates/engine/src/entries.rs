//! Ledger entries.
//!
//! A [`LedgerEntry`] is one signed, currency-tagged record of a fund
//! movement. Entries exist only in DEBIT/CREDIT pairs sharing the same order:
//! the CREDIT row sits on the destination's ledger with a positive amount,
//! the DEBIT row on the source's ledger with every monetary figure negated.
//! The ledger is append-only; no update or delete path exists.
//!
//! Amounts are signed integer **minor units**. `amount_minor` and
//! `net_amount_minor` are in the entry's own currency; `amount_in_host_minor`
//! and the three fee sub-amounts are in the host's settlement currency.
//! `host_currency_fx_rate` stores the *inverse* rate (entry currency per unit
//! of host currency) rounded to 15 decimals, so the stored figure always
//! answers "how much of the entry currency per unit of host currency".

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::{round_half_away, round_rate};
use crate::util::model_currency;
use crate::{Currency, EngineError, FeeBreakdown, Order, ResultEngine, fees};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryKind {
    Credit,
    Debit,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CREDIT" => Ok(Self::Credit),
            "DEBIT" => Ok(Self::Debit),
            other => Err(EngineError::Validation(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub kind: EntryKind,
    pub order_id: String,
    /// The account whose ledger this row is on.
    pub account_id: String,
    pub counterparty_account_id: String,
    pub host_account_id: String,
    pub payment_method_id: String,
    pub created_by: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub host_currency: Currency,
    pub host_currency_fx_rate: f64,
    pub amount_in_host_minor: i64,
    pub host_fee_minor: i64,
    pub platform_fee_minor: i64,
    pub payment_processor_fee_minor: i64,
    pub net_amount_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// The mirrored DEBIT row: every monetary figure negated, account roles
    /// swapped, currency and stored rate preserved.
    fn mirrored(&self) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4().to_string(),
            kind: EntryKind::Debit,
            order_id: self.order_id.clone(),
            account_id: self.counterparty_account_id.clone(),
            counterparty_account_id: self.account_id.clone(),
            host_account_id: self.host_account_id.clone(),
            payment_method_id: self.payment_method_id.clone(),
            created_by: self.created_by.clone(),
            amount_minor: -self.amount_minor,
            currency: self.currency,
            host_currency: self.host_currency,
            host_currency_fx_rate: self.host_currency_fx_rate,
            amount_in_host_minor: -self.amount_in_host_minor,
            host_fee_minor: -self.host_fee_minor,
            platform_fee_minor: -self.platform_fee_minor,
            payment_processor_fee_minor: -self.payment_processor_fee_minor,
            net_amount_minor: -self.net_amount_minor,
            created_at: self.created_at,
        }
    }
}

/// The balanced CREDIT/DEBIT pair realized from one order.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryPair {
    pub credit: LedgerEntry,
    pub debit: LedgerEntry,
}

impl EntryPair {
    /// Builds the entry pair for an order.
    ///
    /// `fx_rate` converts the order currency into `host_currency`; it is the
    /// single rate fetched for this order and every derived figure uses it.
    pub fn build(
        order: &Order,
        host_account_id: &str,
        host_currency: Currency,
        fx_rate: f64,
        host_fee_percent: f64,
        fees: &FeeBreakdown,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<EntryPair> {
        if !fx_rate.is_finite() || fx_rate <= 0.0 {
            return Err(EngineError::Validation(format!(
                "invalid exchange rate: {fx_rate}"
            )));
        }

        let amount_minor = order.amount_minor;
        let credit = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            kind: EntryKind::Credit,
            order_id: order.id.clone(),
            account_id: order.to_account_id.clone(),
            counterparty_account_id: order.from_account_id.clone(),
            host_account_id: host_account_id.to_string(),
            payment_method_id: order.payment_method_id.clone(),
            created_by: order.created_by.clone(),
            amount_minor,
            currency: order.currency,
            host_currency,
            host_currency_fx_rate: round_rate(1.0 / fx_rate),
            amount_in_host_minor: round_half_away(amount_minor as f64 * fx_rate),
            host_fee_minor: fees.host_fee_minor,
            platform_fee_minor: fees.platform_fee_minor,
            payment_processor_fee_minor: fees.payment_processor_fee_minor,
            net_amount_minor: fees::net_amount_minor(amount_minor, host_fee_percent),
            created_at,
        };
        let debit = credit.mirrored();

        Ok(EntryPair { credit, debit })
    }

    /// Verifies the balance invariant before anything is persisted.
    ///
    /// A pair that fails this check is ledger corruption: it aborts the write
    /// unit and must never reach storage.
    pub fn ensure_balanced(&self) -> ResultEngine<()> {
        let (credit, debit) = (&self.credit, &self.debit);
        let mirrored = credit.order_id == debit.order_id
            && credit.currency == debit.currency
            && credit.host_currency == debit.host_currency
            && credit.host_currency_fx_rate == debit.host_currency_fx_rate
            && credit.amount_minor + debit.amount_minor == 0
            && credit.amount_in_host_minor + debit.amount_in_host_minor == 0
            && credit.host_fee_minor + debit.host_fee_minor == 0
            && credit.platform_fee_minor + debit.platform_fee_minor == 0
            && credit.payment_processor_fee_minor + debit.payment_processor_fee_minor == 0
            && credit.net_amount_minor + debit.net_amount_minor == 0;
        if !mirrored {
            return Err(EngineError::Corruption(format!(
                "entry pair for order {} does not balance",
                credit.order_id
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub order_id: String,
    pub account_id: String,
    pub counterparty_account_id: String,
    pub host_account_id: String,
    pub payment_method_id: String,
    pub created_by: String,
    pub amount_minor: i64,
    pub currency: String,
    pub host_currency: String,
    pub host_currency_fx_rate: f64,
    pub amount_in_host_minor: i64,
    pub host_fee_minor: i64,
    pub platform_fee_minor: i64,
    pub payment_processor_fee_minor: i64,
    pub net_amount_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            order_id: ActiveValue::Set(entry.order_id.clone()),
            account_id: ActiveValue::Set(entry.account_id.clone()),
            counterparty_account_id: ActiveValue::Set(entry.counterparty_account_id.clone()),
            host_account_id: ActiveValue::Set(entry.host_account_id.clone()),
            payment_method_id: ActiveValue::Set(entry.payment_method_id.clone()),
            created_by: ActiveValue::Set(entry.created_by.clone()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            currency: ActiveValue::Set(entry.currency.code().to_string()),
            host_currency: ActiveValue::Set(entry.host_currency.code().to_string()),
            host_currency_fx_rate: ActiveValue::Set(entry.host_currency_fx_rate),
            amount_in_host_minor: ActiveValue::Set(entry.amount_in_host_minor),
            host_fee_minor: ActiveValue::Set(entry.host_fee_minor),
            platform_fee_minor: ActiveValue::Set(entry.platform_fee_minor),
            payment_processor_fee_minor: ActiveValue::Set(entry.payment_processor_fee_minor),
            net_amount_minor: ActiveValue::Set(entry.net_amount_minor),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: EntryKind::try_from(model.kind.as_str())?,
            order_id: model.order_id,
            account_id: model.account_id,
            counterparty_account_id: model.counterparty_account_id,
            host_account_id: model.host_account_id,
            payment_method_id: model.payment_method_id,
            created_by: model.created_by,
            amount_minor: model.amount_minor,
            currency: model_currency(model.currency.as_str())?,
            host_currency: model_currency(model.host_currency.as_str())?,
            host_currency_fx_rate: model.host_currency_fx_rate,
            amount_in_host_minor: model.amount_in_host_minor,
            host_fee_minor: model.host_fee_minor,
            platform_fee_minor: model.platform_fee_minor,
            payment_processor_fee_minor: model.payment_processor_fee_minor,
            net_amount_minor: model.net_amount_minor,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::round_rate;

    fn order(amount_minor: i64, currency: Currency) -> Order {
        Order::new(
            "from".to_string(),
            "to".to_string(),
            "pm".to_string(),
            amount_minor,
            currency,
            None,
            None,
            None,
            "alice@example.com".to_string(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn credit_converts_at_the_given_rate() {
        let order = order(1000, Currency::Eur);
        let fees = FeeBreakdown::compute(1000, 1.1654, 0.0, 0.0, 0).unwrap();
        let pair =
            EntryPair::build(&order, "host", Currency::Usd, 1.1654, 0.0, &fees, Utc::now())
                .unwrap();

        assert_eq!(pair.credit.amount_in_host_minor, 1165);
        assert_eq!(pair.credit.host_fee_minor, 0);
        assert_eq!(pair.credit.net_amount_minor, 1000);
        assert_eq!(pair.credit.kind, EntryKind::Credit);
        assert_eq!(pair.credit.account_id, "to");
        assert_eq!(pair.credit.counterparty_account_id, "from");
    }

    #[test]
    fn stored_rate_is_the_rounded_inverse() {
        let order = order(1000, Currency::Eur);
        let fees = FeeBreakdown::compute(1000, 1.1654, 0.0, 0.0, 0).unwrap();
        let pair =
            EntryPair::build(&order, "host", Currency::Usd, 1.1654, 0.0, &fees, Utc::now())
                .unwrap();

        assert_eq!(pair.credit.host_currency_fx_rate, round_rate(1.0 / 1.1654));
        assert_eq!(pair.debit.host_currency_fx_rate, pair.credit.host_currency_fx_rate);
    }

    #[test]
    fn debit_mirrors_every_figure() {
        let order = order(1000, Currency::Eur);
        let fees = FeeBreakdown::compute(1000, 1.1654, 4.0, 5.0, 30).unwrap();
        let pair =
            EntryPair::build(&order, "host", Currency::Usd, 1.1654, 4.0, &fees, Utc::now())
                .unwrap();

        assert_eq!(pair.debit.kind, EntryKind::Debit);
        assert_eq!(pair.debit.account_id, "from");
        assert_eq!(pair.debit.counterparty_account_id, "to");
        assert_eq!(pair.debit.amount_minor, -1000);
        assert_eq!(pair.debit.amount_in_host_minor, -pair.credit.amount_in_host_minor);
        assert_eq!(pair.debit.host_fee_minor, 47);
        assert_eq!(pair.debit.platform_fee_minor, -pair.credit.platform_fee_minor);
        assert_eq!(
            pair.debit.payment_processor_fee_minor,
            -pair.credit.payment_processor_fee_minor
        );
        assert_eq!(pair.debit.currency, pair.credit.currency);
        pair.ensure_balanced().unwrap();
    }

    #[test]
    fn tampered_pair_fails_the_balance_check() {
        let order = order(1000, Currency::Eur);
        let fees = FeeBreakdown::compute(1000, 1.1654, 4.0, 0.0, 0).unwrap();
        let mut pair =
            EntryPair::build(&order, "host", Currency::Usd, 1.1654, 4.0, &fees, Utc::now())
                .unwrap();
        pair.debit.host_fee_minor += 1;

        let err = pair.ensure_balanced().unwrap_err();
        assert!(matches!(err, EngineError::Corruption(_)));
    }
}
