//! Order primitives.
//!
//! An `Order` is the intent to move funds from a source account to a
//! destination account. Authorization and counterparty resolution happen
//! first; realization then turns the order into exactly one ledger entry
//! pair. A realized order is immutable except for its status.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountSummary, Currency, EngineError, ResultEngine, util::model_currency};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl TryFrom<&str> for OrderStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::Validation(format!(
                "invalid order status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub payment_method_id: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub description: Option<String>,
    pub host_fee_percent: Option<f64>,
    pub platform_fee_percent: Option<f64>,
    pub status: OrderStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        from_account_id: String,
        to_account_id: String,
        payment_method_id: String,
        amount_minor: i64,
        currency: Currency,
        description: Option<String>,
        host_fee_percent: Option<f64>,
        platform_fee_percent: Option<f64>,
        created_by: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            from_account_id,
            to_account_id,
            payment_method_id,
            amount_minor,
            currency,
            description,
            host_fee_percent,
            platform_fee_percent,
            status: OrderStatus::Pending,
            created_by,
            created_at,
        })
    }
}

/// Result of a realized order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub order_id: String,
    pub from_account: AccountSummary,
    pub to_account: AccountSummary,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub payment_method_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub description: Option<String>,
    pub host_fee_percent: Option<f64>,
    pub platform_fee_percent: Option<f64>,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::entries::Entity")]
    Entries,
}

impl Related<super::entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Order> for ActiveModel {
    fn from(order: &Order) -> Self {
        Self {
            id: ActiveValue::Set(order.id.clone()),
            from_account_id: ActiveValue::Set(order.from_account_id.clone()),
            to_account_id: ActiveValue::Set(order.to_account_id.clone()),
            payment_method_id: ActiveValue::Set(order.payment_method_id.clone()),
            amount_minor: ActiveValue::Set(order.amount_minor),
            currency: ActiveValue::Set(order.currency.code().to_string()),
            description: ActiveValue::Set(order.description.clone()),
            host_fee_percent: ActiveValue::Set(order.host_fee_percent),
            platform_fee_percent: ActiveValue::Set(order.platform_fee_percent),
            status: ActiveValue::Set(order.status.as_str().to_string()),
            created_by: ActiveValue::Set(order.created_by.clone()),
            created_at: ActiveValue::Set(order.created_at),
        }
    }
}

impl TryFrom<Model> for Order {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            from_account_id: model.from_account_id,
            to_account_id: model.to_account_id,
            payment_method_id: model.payment_method_id,
            amount_minor: model.amount_minor,
            currency: model_currency(model.currency.as_str())?,
            description: model.description,
            host_fee_percent: model.host_fee_percent,
            platform_fee_percent: model.platform_fee_percent,
            status: OrderStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
