//! Accounts: the parties that send or receive funds.
//!
//! A single `Account` type covers individuals, organizations, hosted
//! collectives and hosts. The host relationship is a nullable self-reference
//! (`host_account_id`) plus the `can_host` capability flag; a host is itself
//! an ordinary account that happens to hold funds on behalf of others.
//!
//! Accounts are never deleted, only soft-retired via `archived`.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, util::model_currency};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Individual,
    Organization,
    Collective,
    Host,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Organization => "organization",
            Self::Collective => "collective",
            Self::Host => "host",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "individual" => Ok(Self::Individual),
            "organization" => Ok(Self::Organization),
            "collective" => Ok(Self::Collective),
            "host" => Ok(Self::Host),
            other => Err(EngineError::Validation(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub kind: AccountKind,
    pub currency: Currency,
    pub website: Option<String>,
    pub host_account_id: Option<String>,
    pub can_host: bool,
    pub host_fee_percent: Option<f64>,
    pub created_by: Option<String>,
    pub archived: bool,
}

impl Account {
    pub fn new(name: String, slug: String, kind: AccountKind, currency: Currency) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            slug,
            kind,
            currency,
            website: None,
            host_account_id: None,
            can_host: false,
            host_fee_percent: None,
            created_by: None,
            archived: false,
        }
    }

    /// Returns `true` when `host_id` is this account's current host.
    #[must_use]
    pub fn is_hosted_by(&self, host_id: &str) -> bool {
        self.host_account_id.as_deref() == Some(host_id)
    }
}

/// Flat summary used in operation results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub kind: AccountKind,
    pub currency: Currency,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            slug: account.slug.clone(),
            name: account.name.clone(),
            kind: account.kind,
            currency: account.currency,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub slug: String,
    pub kind: String,
    pub currency: String,
    pub website: Option<String>,
    pub host_account_id: Option<String>,
    pub can_host: bool,
    pub host_fee_percent: Option<f64>,
    pub created_by: Option<String>,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payment_methods::Entity")]
    PaymentMethods,
}

impl Related<super::payment_methods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentMethods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(account: &Account) -> Self {
        Self {
            id: ActiveValue::Set(account.id.clone()),
            name: ActiveValue::Set(account.name.clone()),
            slug: ActiveValue::Set(account.slug.clone()),
            kind: ActiveValue::Set(account.kind.as_str().to_string()),
            currency: ActiveValue::Set(account.currency.code().to_string()),
            website: ActiveValue::Set(account.website.clone()),
            host_account_id: ActiveValue::Set(account.host_account_id.clone()),
            can_host: ActiveValue::Set(account.can_host),
            host_fee_percent: ActiveValue::Set(account.host_fee_percent),
            created_by: ActiveValue::Set(account.created_by.clone()),
            archived: ActiveValue::Set(account.archived),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            kind: AccountKind::try_from(model.kind.as_str())?,
            currency: model_currency(model.currency.as_str())?,
            website: model.website,
            host_account_id: model.host_account_id,
            can_host: model.can_host,
            host_fee_percent: model.host_fee_percent,
            created_by: model.created_by,
            archived: model.archived,
        })
    }
}
