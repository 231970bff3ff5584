//! Account management.
//!
//! Accounts are created explicitly here or implicitly by the counterparty
//! resolver. There is no delete path: retirement is the `archived` flag.

use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::fees::validate_fee_percent;
use crate::util::slugify;
use crate::{
    Account, EngineError, MembershipRole, NewAccountCmd, ResultEngine, accounts, memberships,
};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Creates an account and the creator's admin membership.
    pub async fn new_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_name(&cmd.name, "account")?;
        if let Some(percent) = cmd.host_fee_percent {
            validate_fee_percent(percent, "host fee")?;
        }

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.created_by).await?;

            let slug = match cmd.slug.as_deref() {
                Some(requested) => {
                    let slug = slugify(requested);
                    if self.slug_exists(&db_tx, &slug).await? {
                        return Err(EngineError::ExistingKey(slug));
                    }
                    slug
                }
                None => self.unique_slug(&db_tx, &slugify(&name)).await?,
            };

            let host_account_id = match cmd.host_account_id.as_deref() {
                Some(host_ref) => {
                    let host = self.require_account(&db_tx, host_ref).await?;
                    if !host.can_host {
                        return Err(EngineError::Validation(format!(
                            "account {} cannot host",
                            host.slug
                        )));
                    }
                    Some(host.id)
                }
                None => None,
            };

            let mut account = Account::new(name, slug, cmd.kind, cmd.currency);
            account.host_account_id = host_account_id;
            account.can_host = cmd.can_host;
            account.host_fee_percent = cmd.host_fee_percent;
            account.created_by = Some(cmd.created_by.clone());
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;

            let membership = memberships::ActiveModel {
                account_id: ActiveValue::Set(account.id.clone()),
                user_email: ActiveValue::Set(cmd.created_by.clone()),
                role: ActiveValue::Set(MembershipRole::Admin.as_str().to_string()),
            };
            membership.insert(&db_tx).await?;

            Ok(account)
        })
    }

    /// Returns an account by id or slug.
    pub async fn account_snapshot(&self, account_ref: &str) -> ResultEngine<Account> {
        self.require_account(&self.database, account_ref).await
    }

    /// Soft-retires an account (admin only). Ledger rows referencing it are
    /// untouched.
    pub async fn retire_account(&self, account_ref: &str, user_email: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_ref).await?;
            self.require_account_admin(&db_tx, &account, user_email)
                .await?;

            let model = accounts::ActiveModel {
                id: ActiveValue::Set(account.id.clone()),
                archived: ActiveValue::Set(true),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }
}
