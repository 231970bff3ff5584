//! Authorization helpers and the order-access policy.
//!
//! Lookup helpers load state; the policy itself ([`OrderAccess::check`]) is a
//! pure decision over that state, with no queries of its own. Rules evaluate
//! in a fixed order and the first failure wins.

use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{
    Account, EngineError, MembershipRole, PaymentMethod, ResultEngine, accounts, memberships,
    payment_methods, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn find_user<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
    ) -> ResultEngine<Option<users::Model>> {
        users::Entity::find_by_id(email.to_string())
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        email: &str,
    ) -> ResultEngine<users::Model> {
        self.find_user(db, email)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Looks an account up by id, falling back to its slug.
    pub(super) async fn find_account_by_ref<C: ConnectionTrait>(
        &self,
        db: &C,
        account_ref: &str,
    ) -> ResultEngine<Option<Account>> {
        if let Some(model) = accounts::Entity::find_by_id(account_ref.to_string())
            .one(db)
            .await?
        {
            return Ok(Some(Account::try_from(model)?));
        }
        accounts::Entity::find()
            .filter(accounts::Column::Slug.eq(account_ref.to_string()))
            .one(db)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    pub(super) async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_ref: &str,
    ) -> ResultEngine<Account> {
        self.find_account_by_ref(db, account_ref)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    pub(super) async fn membership_role<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: &str,
        email: &str,
    ) -> ResultEngine<Option<MembershipRole>> {
        let row =
            memberships::Entity::find_by_id((account_id.to_string(), email.to_string()))
                .one(db)
                .await?;
        row.as_ref()
            .map(|m| MembershipRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// The account creator and every `admin` member administer the account.
    pub(super) async fn is_account_admin<C: ConnectionTrait>(
        &self,
        db: &C,
        account: &Account,
        email: &str,
    ) -> ResultEngine<bool> {
        if account.created_by.as_deref() == Some(email) {
            return Ok(true);
        }
        Ok(self
            .membership_role(db, &account.id, email)
            .await?
            .is_some_and(MembershipRole::can_admin))
    }

    pub(super) async fn require_account_admin<C: ConnectionTrait>(
        &self,
        db: &C,
        account: &Account,
        email: &str,
    ) -> ResultEngine<()> {
        if !self.is_account_admin(db, account, email).await? {
            return Err(EngineError::Unauthorized(format!(
                "insufficient permissions to administer the {} {}",
                account.kind.as_str(),
                account.name
            )));
        }
        Ok(())
    }

    /// Any membership (or root) grants read access; masked as not-found so
    /// probing cannot distinguish hidden accounts from missing ones.
    pub(super) async fn require_account_member<C: ConnectionTrait>(
        &self,
        db: &C,
        account: &Account,
        email: &str,
    ) -> ResultEngine<()> {
        if self.is_account_admin(db, account, email).await? {
            return Ok(());
        }
        if self
            .find_user(db, email)
            .await?
            .is_some_and(|user| user.is_root)
        {
            return Ok(());
        }
        if self.membership_role(db, &account.id, email).await?.is_some() {
            return Ok(());
        }
        Err(EngineError::KeyNotFound("account not exists".to_string()))
    }

    pub(super) async fn require_payment_method_by_token<C: ConnectionTrait>(
        &self,
        db: &C,
        token: &str,
    ) -> ResultEngine<PaymentMethod> {
        payment_methods::Entity::find()
            .filter(payment_methods::Column::Token.eq(token.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("payment method not exists".to_string()))?
            .try_into()
    }
}

/// State an order-creation attempt is judged on.
///
/// All fields are loaded by the caller; `check` performs no lookups.
pub(crate) struct OrderAccess<'a> {
    pub actor: Option<&'a users::Model>,
    /// The explicitly identified source account, when the order names one.
    pub source: Option<&'a Account>,
    pub actor_admins_source: bool,
    pub platform_fee_override: bool,
    pub payment_method_account: &'a Account,
    pub actor_admins_pm_account: bool,
    pub destination: &'a Account,
}

impl<'a> OrderAccess<'a> {
    /// Evaluates the access rules in order; first failure wins.
    ///
    /// Returns the authenticated actor so callers cannot proceed with an
    /// unchecked identity.
    pub(crate) fn check(&self) -> ResultEngine<&'a users::Model> {
        let Some(actor) = self.actor else {
            return Err(EngineError::Unauthorized(
                "you need to be logged in to create an order".to_string(),
            ));
        };

        if let Some(source) = self.source
            && source.can_host
            && !self.actor_admins_source
        {
            return Err(EngineError::Unauthorized(format!(
                "insufficient permissions to create an order on behalf of the {} {}",
                source.kind.as_str(),
                source.name
            )));
        }

        if self.platform_fee_override && !actor.is_root {
            return Err(EngineError::Unauthorized(
                "only a root operator can change the platform fee".to_string(),
            ));
        }

        // Using the host's own payment method to add funds to one of its
        // hosted accounts is allowed without administering the method's
        // owner: rule 2 already required host adminship for that source.
        let pm_account = self.payment_method_account;
        let add_funds_as_host = pm_account.can_host
            && self.destination.is_hosted_by(&pm_account.id)
            && self.source.is_some_and(|source| source.id == pm_account.id);
        if !self.actor_admins_pm_account && !add_funds_as_host {
            return Err(EngineError::Unauthorized(
                "insufficient permissions to access this payment method".to_string(),
            ));
        }

        if pm_account.can_host {
            match self.destination.host_account_id.as_deref() {
                Some(host_id) if host_id == pm_account.id => {}
                Some(host_id) => {
                    return Err(EngineError::Validation(format!(
                        "you must use the payment method of host {host_id} to add funds to this destination"
                    )));
                }
                None => {
                    return Err(EngineError::Validation(
                        "destination account has no host".to_string(),
                    ));
                }
            }
        }

        Ok(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccountKind, Currency};

    fn user(email: &str, is_root: bool) -> users::Model {
        users::Model {
            email: email.to_string(),
            name: email.to_string(),
            password: "secret".to_string(),
            is_root,
        }
    }

    fn account(slug: &str, can_host: bool) -> Account {
        let mut account = Account::new(
            slug.to_string(),
            slug.to_string(),
            AccountKind::Collective,
            Currency::Usd,
        );
        account.can_host = can_host;
        account
    }

    fn base<'a>(
        actor: &'a users::Model,
        pm_account: &'a Account,
        destination: &'a Account,
    ) -> OrderAccess<'a> {
        OrderAccess {
            actor: Some(actor),
            source: None,
            actor_admins_source: false,
            platform_fee_override: false,
            payment_method_account: pm_account,
            actor_admins_pm_account: true,
            destination,
        }
    }

    #[test]
    fn unauthenticated_is_always_denied() {
        let actor = user("x@example.com", false);
        let pm_account = account("backer", false);
        let destination = account("dest", false);
        let mut access = base(&actor, &pm_account, &destination);
        access.actor = None;

        let err = access.check().unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized(_)));
    }

    #[test]
    fn host_source_requires_adminship() {
        let actor = user("alice@example.com", false);
        let pm_account = account("backer", false);
        let destination = account("dest", false);
        let source = account("big-host", true);

        let mut access = base(&actor, &pm_account, &destination);
        access.source = Some(&source);
        let err = access.check().unwrap_err();
        assert_eq!(
            err,
            EngineError::Unauthorized(
                "insufficient permissions to create an order on behalf of the collective big-host"
                    .to_string()
            )
        );

        access.actor_admins_source = true;
        access.check().unwrap();
    }

    #[test]
    fn platform_fee_is_root_only() {
        let actor = user("alice@example.com", false);
        let root = user("root@example.com", true);
        let pm_account = account("backer", false);
        let destination = account("dest", false);

        let mut access = base(&actor, &pm_account, &destination);
        access.platform_fee_override = true;
        let err = access.check().unwrap_err();
        assert_eq!(
            err,
            EngineError::Unauthorized("only a root operator can change the platform fee".to_string())
        );

        access.actor = Some(&root);
        access.check().unwrap();
    }

    #[test]
    fn foreign_payment_method_is_denied() {
        let actor = user("alice@example.com", false);
        let pm_account = account("someone-else", false);
        let destination = account("dest", false);

        let mut access = base(&actor, &pm_account, &destination);
        access.actor_admins_pm_account = false;
        let err = access.check().unwrap_err();
        assert_eq!(
            err,
            EngineError::Unauthorized(
                "insufficient permissions to access this payment method".to_string()
            )
        );
    }

    #[test]
    fn host_method_must_match_destination_host() {
        let actor = user("alice@example.com", false);
        let host = account("host-a", true);
        let mut destination = account("dest", false);
        destination.host_account_id = Some("host-b".to_string());

        let access = base(&actor, &host, &destination);
        let err = access.check().unwrap_err();
        assert_eq!(
            err,
            EngineError::Validation(
                "you must use the payment method of host host-b to add funds to this destination"
                    .to_string()
            )
        );
    }

    #[test]
    fn add_funds_as_host_passes_without_pm_adminship() {
        let actor = user("alice@example.com", false);
        let host = account("host-a", true);
        let mut destination = account("dest", false);
        destination.host_account_id = Some(host.id.clone());

        let mut access = base(&actor, &host, &destination);
        access.source = Some(&host);
        access.actor_admins_source = true;
        access.actor_admins_pm_account = false;
        access.check().unwrap();
    }
}
