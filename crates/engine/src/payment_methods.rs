//! Payment methods.
//!
//! A payment method belongs to exactly one account, carries a fixed currency
//! and a unique opaque `token` used for external reference. Its usable
//! balance is always derived from the ledger, never stored.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, util::model_currency};

/// Service backing a payment method.
///
/// `Collective` is the internal reserve (funds already held by the host on
/// behalf of the account); the others are externally custodied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodService {
    Stripe,
    Paypal,
    Collective,
}

impl PaymentMethodService {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Paypal => "paypal",
            Self::Collective => "collective",
        }
    }

    #[must_use]
    pub fn is_external(self) -> bool {
        !matches!(self, Self::Collective)
    }
}

impl TryFrom<&str> for PaymentMethodService {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "stripe" => Ok(Self::Stripe),
            "paypal" => Ok(Self::Paypal),
            "collective" => Ok(Self::Collective),
            other => Err(EngineError::Validation(format!(
                "invalid payment method service: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub account_id: String,
    pub service: PaymentMethodService,
    pub currency: Currency,
    pub token: String,
    pub name: Option<String>,
    pub archived: bool,
}

impl PaymentMethod {
    pub fn new(
        account_id: String,
        service: PaymentMethodService,
        currency: Currency,
        name: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id,
            service,
            currency,
            token: Uuid::new_v4().to_string(),
            name,
            archived: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_methods")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub service: String,
    pub currency: String,
    pub token: String,
    pub name: Option<String>,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PaymentMethod> for ActiveModel {
    fn from(pm: &PaymentMethod) -> Self {
        Self {
            id: ActiveValue::Set(pm.id.clone()),
            account_id: ActiveValue::Set(pm.account_id.clone()),
            service: ActiveValue::Set(pm.service.as_str().to_string()),
            currency: ActiveValue::Set(pm.currency.code().to_string()),
            token: ActiveValue::Set(pm.token.clone()),
            name: ActiveValue::Set(pm.name.clone()),
            archived: ActiveValue::Set(pm.archived),
        }
    }
}

impl TryFrom<Model> for PaymentMethod {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            account_id: model.account_id,
            service: PaymentMethodService::try_from(model.service.as_str())?,
            currency: model_currency(model.currency.as_str())?,
            token: model.token,
            name: model.name,
            archived: model.archived,
        })
    }
}
