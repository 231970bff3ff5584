//! Order creation: the funds-flow orchestrator.
//!
//! `create_order` is the only write path into the ledger. It runs in phases:
//! validate input, load state, authorize (pure policy), resolve the
//! counterparty (committed separately), fetch the single fx rate (outside any
//! transaction), compute fees, then realize the balanced entry pair inside
//! one atomic write unit. No phase holds database resources across an
//! external call.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use tracing::{error, info};

use crate::fees::validate_fee_percent;
use crate::{
    AccountSummary, EngineError, EntryPair, FeeBreakdown, LedgerEntry, Order, OrderCmd,
    OrderCreated, OrderStatus, ResultEngine, entries, orders,
};

use super::access::OrderAccess;
use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Realizes an order into exactly one CREDIT/DEBIT entry pair.
    ///
    /// On a transient failure ([`EngineError::is_transient`]) nothing was
    /// committed and the caller may retry the same command unchanged.
    pub async fn create_order(&self, cmd: OrderCmd) -> ResultEngine<OrderCreated> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        if let Some(percent) = cmd.host_fee_percent {
            validate_fee_percent(percent, "host fee")?;
        }
        if let Some(percent) = cmd.platform_fee_percent {
            validate_fee_percent(percent, "platform fee")?;
        }

        let db = &self.database;
        let actor = match cmd.created_by.as_deref() {
            Some(email) => self.find_user(db, email).await?,
            None => None,
        };
        let destination = self.require_account(db, &cmd.to_account).await?;
        if destination.archived {
            return Err(EngineError::Validation(
                "destination account is retired".to_string(),
            ));
        }
        let payment_method = self
            .require_payment_method_by_token(db, &cmd.payment_method)
            .await?;
        if payment_method.archived {
            return Err(EngineError::Validation(
                "payment method is retired".to_string(),
            ));
        }
        let pm_account = self.require_account(db, &payment_method.account_id).await?;
        let explicit_source = match cmd.from_account_id.as_deref() {
            Some(account_ref) => Some(self.require_account(db, account_ref).await?),
            None => None,
        };

        let actor_admins_source = match (&actor, &explicit_source) {
            (Some(user), Some(source)) => self.is_account_admin(db, source, &user.email).await?,
            _ => false,
        };
        let actor_admins_pm_account = match &actor {
            Some(user) => self.is_account_admin(db, &pm_account, &user.email).await?,
            None => false,
        };

        let actor = OrderAccess {
            actor: actor.as_ref(),
            source: explicit_source.as_ref(),
            actor_admins_source,
            platform_fee_override: cmd.platform_fee_percent.is_some(),
            payment_method_account: &pm_account,
            actor_admins_pm_account,
            destination: &destination,
        }
        .check()?
        .clone();

        let currency = cmd.currency.unwrap_or(destination.currency);

        // The host administering the payment method: the method's owner when
        // it can host (rule 5 already pinned it to the destination's host),
        // otherwise the destination's current host.
        let host = if pm_account.can_host {
            pm_account
        } else {
            let host_id = destination.host_account_id.clone().ok_or_else(|| {
                EngineError::Validation("destination account has no host".to_string())
            })?;
            self.require_account(db, &host_id).await?
        };

        // Counterparty resolution commits (or fails) before realization, so
        // the atomic section never branches on account existence.
        let source = match explicit_source {
            Some(account) => account,
            None => {
                let organization = cmd.new_organization.as_ref().ok_or_else(|| {
                    EngineError::Validation(
                        "missing source account: provide an existing identifier or a new organization"
                            .to_string(),
                    )
                })?;
                self.provision_organization(
                    organization,
                    cmd.remote_user.as_ref(),
                    &actor.email,
                    currency,
                )
                .await?
            }
        };

        // One rate per order, fetched before the atomic write unit; every
        // derived figure below reuses it.
        let fx_rate = self.fx.rate(currency, host.currency, Utc::now()).await?;

        let host_fee_percent = cmd
            .host_fee_percent
            .or(destination.host_fee_percent)
            .or(host.host_fee_percent)
            .unwrap_or(0.0);
        let platform_fee_percent = cmd.platform_fee_percent.unwrap_or(0.0);
        let fee_breakdown = FeeBreakdown::compute(
            cmd.amount_minor,
            fx_rate,
            host_fee_percent,
            platform_fee_percent,
            cmd.payment_processor_fee_minor.unwrap_or(0),
        )?;

        let order = Order::new(
            source.id.clone(),
            destination.id.clone(),
            payment_method.id.clone(),
            cmd.amount_minor,
            currency,
            normalize_optional_text(cmd.description.as_deref()),
            cmd.host_fee_percent,
            cmd.platform_fee_percent,
            actor.email.clone(),
            Utc::now(),
        )?;

        with_tx!(self, |db_tx| {
            let pair = EntryPair::build(
                &order,
                &host.id,
                host.currency,
                fx_rate,
                host_fee_percent,
                &fee_breakdown,
                order.created_at,
            )?;
            if let Err(err) = pair.ensure_balanced() {
                error!(order_id = %order.id, "aborting realization: {err}");
                return Err(err);
            }

            orders::ActiveModel::from(&order).insert(&db_tx).await?;
            entries::ActiveModel::from(&pair.credit).insert(&db_tx).await?;
            entries::ActiveModel::from(&pair.debit).insert(&db_tx).await?;

            let paid = orders::ActiveModel {
                id: ActiveValue::Set(order.id.clone()),
                status: ActiveValue::Set(OrderStatus::Paid.as_str().to_string()),
                ..Default::default()
            };
            paid.update(&db_tx).await?;
            Ok::<(), EngineError>(())
        })?;

        info!(
            order_id = %order.id,
            from = %source.slug,
            to = %destination.slug,
            amount_minor = order.amount_minor,
            currency = %order.currency,
            "order realized"
        );

        Ok(OrderCreated {
            order_id: order.id,
            from_account: AccountSummary::from(&source),
            to_account: AccountSummary::from(&destination),
        })
    }

    /// Returns an order by id.
    pub async fn order(&self, order_id: &str) -> ResultEngine<Order> {
        orders::Entity::find_by_id(order_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("order not exists".to_string()))?
            .try_into()
    }

    /// Returns the entry pair realized from an order, CREDIT first.
    pub async fn order_entries(&self, order_id: &str) -> ResultEngine<Vec<LedgerEntry>> {
        let models = entries::Entity::find()
            .filter(entries::Column::OrderId.eq(order_id.to_string()))
            .order_by_asc(entries::Column::Kind)
            .all(&self.database)
            .await?;
        models.into_iter().map(LedgerEntry::try_from).collect()
    }
}
