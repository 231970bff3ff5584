use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, MembershipRole, ResultEngine, memberships};

use super::{Engine, with_tx};

impl Engine {
    /// Adds or updates an account member (admin-only).
    pub async fn upsert_account_member(
        &self,
        account_ref: &str,
        member_email: &str,
        role: &str,
        user_email: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_ref).await?;
            self.require_account_admin(&db_tx, &account, user_email)
                .await?;
            self.require_user(&db_tx, member_email).await?;
            let _role = MembershipRole::try_from(role)?;

            let active = memberships::ActiveModel {
                account_id: ActiveValue::Set(account.id.clone()),
                user_email: ActiveValue::Set(member_email.to_string()),
                role: ActiveValue::Set(role.to_string()),
            };

            // Upsert: insert if missing, otherwise update role.
            match memberships::Entity::find_by_id((
                account.id.clone(),
                member_email.to_string(),
            ))
            .one(&db_tx)
            .await?
            {
                Some(_) => {
                    active.update(&db_tx).await?;
                }
                None => {
                    active.insert(&db_tx).await?;
                }
            }

            Ok(())
        })
    }

    /// Removes an account member (admin-only).
    pub async fn remove_account_member(
        &self,
        account_ref: &str,
        member_email: &str,
        user_email: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_ref).await?;
            self.require_account_admin(&db_tx, &account, user_email)
                .await?;
            if account.created_by.as_deref() == Some(member_email) {
                return Err(EngineError::Validation(
                    "cannot remove the account creator".to_string(),
                ));
            }

            memberships::Entity::delete_by_id((account.id.clone(), member_email.to_string()))
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }

    /// Lists account members (admin-only).
    pub async fn list_account_members(
        &self,
        account_ref: &str,
        user_email: &str,
    ) -> ResultEngine<Vec<(String, String)>> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_ref).await?;
            self.require_account_admin(&db_tx, &account, user_email)
                .await?;

            let rows = memberships::Entity::find()
                .filter(memberships::Column::AccountId.eq(account.id.clone()))
                .all(&db_tx)
                .await?;
            Ok(rows.into_iter().map(|m| (m.user_email, m.role)).collect())
        })
    }
}
