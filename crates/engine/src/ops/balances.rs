//! Balance aggregation.
//!
//! A balance is never stored: it is the sum over the entity's ledger rows of
//! the host-currency amount plus the (negative) fee sub-amounts, converted to
//! the entity's own currency through each row's stored inverse rate when the
//! currencies differ. One read-only aggregate query, no read-then-write.

use sea_orm::{ConnectionTrait, DatabaseTransaction, Statement, TransactionTrait, Value};

use crate::{Currency, ResultEngine};

use super::{Engine, with_tx};

impl Engine {
    /// Current balance of an account, in the account's own currency.
    pub async fn balance_of_account(&self, account_ref: &str) -> ResultEngine<(i64, Currency)> {
        with_tx!(self, |db_tx| {
            let account = self.require_account(&db_tx, account_ref).await?;
            let balance = self
                .sum_entries(
                    &db_tx,
                    "WHERE account_id = ?",
                    vec![account.id.clone().into()],
                    account.currency,
                )
                .await?;
            Ok((balance, account.currency))
        })
    }

    /// Current balance of a payment method, in the method's currency.
    ///
    /// Only rows on the owning account's ledger that reference the method
    /// contribute.
    pub async fn balance_of_payment_method(&self, token: &str) -> ResultEngine<(i64, Currency)> {
        with_tx!(self, |db_tx| {
            let payment_method = self.require_payment_method_by_token(&db_tx, token).await?;
            let balance = self
                .sum_entries(
                    &db_tx,
                    "WHERE payment_method_id = ? AND account_id = ?",
                    vec![
                        payment_method.id.clone().into(),
                        payment_method.account_id.clone().into(),
                    ],
                    payment_method.currency,
                )
                .await?;
            Ok((balance, payment_method.currency))
        })
    }

    async fn sum_entries(
        &self,
        db_tx: &DatabaseTransaction,
        where_clause: &str,
        values: Vec<Value>,
        currency: Currency,
    ) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let sql = format!(
            "SELECT COALESCE(SUM(CASE WHEN host_currency = ? \
             THEN (amount_in_host_minor + host_fee_minor + platform_fee_minor + payment_processor_fee_minor) \
             ELSE CAST(ROUND((amount_in_host_minor + host_fee_minor + platform_fee_minor + payment_processor_fee_minor) * host_currency_fx_rate) AS INTEGER) \
             END), 0) AS sum \
             FROM entries {where_clause}"
        );
        let stmt = Statement::from_sql_and_values(backend, sql, {
            let mut args: Vec<Value> = vec![currency.code().into()];
            args.extend(values);
            args
        });
        let row = db_tx.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }
}
