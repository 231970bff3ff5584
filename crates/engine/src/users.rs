//! Users table (minimal identity record).
//!
//! The engine stores memberships and audit references by `email`. A user row
//! is created explicitly, or minimally by the counterparty resolver when an
//! order provisions a new organization for a not-yet-onboarded contact.
//!
//! `is_root` marks the privileged operator allowed to override platform-level
//! fee settings.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_root: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
