//! Counterparty resolution.
//!
//! When an order names a not-yet-onboarded organization instead of an
//! existing source account, this module provisions it: a fresh
//! organization-category account, a minimal identity for the contact email
//! when needed, and the admin membership wiring them together.
//!
//! Provisioning runs in its own transaction and **commits before order
//! realization begins**, so the atomic entry-pair creation never branches on
//! whether its source account exists. The flip side: two concurrent orders
//! naming the same organization both provision one. Only the slug is
//! serialized (unique index); duplicate accounts are an accepted outcome,
//! not an error.

use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::util::slugify;
use crate::{
    Account, AccountKind, Currency, MembershipRole, NewOrganization, RemoteUser, ResultEngine,
    accounts, memberships, users,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Provisions a new organization owned by the acting identity.
    ///
    /// Calling twice with the same name creates two accounts (slug suffix
    /// aside); idempotency is the caller's job via the returned identifier.
    pub(super) async fn provision_organization(
        &self,
        organization: &NewOrganization,
        contact: Option<&RemoteUser>,
        actor_email: &str,
        currency: Currency,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(&organization.name, "organization")?;
        with_tx!(self, |db_tx| {
            let slug = self.unique_slug(&db_tx, &slugify(&name)).await?;
            let mut account = Account::new(name, slug, AccountKind::Organization, currency);
            account.website = normalize_optional_text(organization.website.as_deref());
            account.created_by = Some(actor_email.to_string());
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;

            let admin_email = match contact {
                Some(contact) => {
                    if self.find_user(&db_tx, &contact.email).await?.is_none() {
                        let user = users::ActiveModel {
                            email: ActiveValue::Set(contact.email.clone()),
                            name: ActiveValue::Set(
                                contact
                                    .name
                                    .clone()
                                    .unwrap_or_else(|| contact.email.clone()),
                            ),
                            // Placeholder credential; the contact signs in
                            // through a reset flow, never with this value.
                            password: ActiveValue::Set(Uuid::new_v4().to_string()),
                            is_root: ActiveValue::Set(false),
                        };
                        user.insert(&db_tx).await?;
                    }
                    contact.email.clone()
                }
                None => actor_email.to_string(),
            };

            let membership = memberships::ActiveModel {
                account_id: ActiveValue::Set(account.id.clone()),
                user_email: ActiveValue::Set(admin_email),
                role: ActiveValue::Set(MembershipRole::Admin.as_str().to_string()),
            };
            membership.insert(&db_tx).await?;

            Ok(account)
        })
    }

    /// First free slug: the base, then `base-1`, `base-2`, …
    pub(super) async fn unique_slug<C: ConnectionTrait>(
        &self,
        db: &C,
        base: &str,
    ) -> ResultEngine<String> {
        if !self.slug_exists(db, base).await? {
            return Ok(base.to_string());
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}-{suffix}");
            if !self.slug_exists(db, &candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    pub(super) async fn slug_exists<C: ConnectionTrait>(
        &self,
        db: &C,
        slug: &str,
    ) -> ResultEngine<bool> {
        accounts::Entity::find()
            .filter(accounts::Column::Slug.eq(slug.to_string()))
            .one(db)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }
}
