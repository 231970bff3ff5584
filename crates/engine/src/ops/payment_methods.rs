use sea_orm::{ActiveModelTrait, TransactionTrait};

use crate::{NewPaymentMethodCmd, PaymentMethod, ResultEngine, payment_methods};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Creates a payment method owned by an account the caller administers.
    pub async fn new_payment_method(
        &self,
        cmd: NewPaymentMethodCmd,
    ) -> ResultEngine<PaymentMethod> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.created_by).await?;
            let account = self.require_account(&db_tx, &cmd.account_id).await?;
            self.require_account_admin(&db_tx, &account, &cmd.created_by)
                .await?;

            let payment_method = PaymentMethod::new(
                account.id,
                cmd.service,
                cmd.currency,
                normalize_optional_text(cmd.name.as_deref()),
            );
            payment_methods::ActiveModel::from(&payment_method)
                .insert(&db_tx)
                .await?;

            Ok(payment_method)
        })
    }

    /// Returns a payment method by its opaque token.
    pub async fn payment_method(&self, token: &str) -> ResultEngine<PaymentMethod> {
        self.require_payment_method_by_token(&self.database, token)
            .await
    }
}
