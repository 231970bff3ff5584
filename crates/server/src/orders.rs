//! Order submission endpoint.

use api_types::order::{OrderAccountView, OrderCreated, OrderNew};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, to_engine_currency};
use engine::users;

/// Bounded retry of transient engine failures; nothing was committed when a
/// transient error surfaces, so the same command can be resubmitted as-is.
const MAX_ATTEMPTS: u32 = 3;

fn account_view(summary: engine::AccountSummary) -> OrderAccountView {
    OrderAccountView {
        id: summary.id,
        slug: summary.slug,
        name: summary.name,
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<OrderNew>,
) -> Result<Json<OrderCreated>, ServerError> {
    let mut cmd = engine::OrderCmd::new(
        payload.collective,
        payload.payment_method,
        payload.total_amount,
    )
    .created_by(user.email);

    if let Some(currency) = payload.currency {
        cmd = cmd.currency(to_engine_currency(currency));
    }
    if let Some(from_collective) = payload.from_collective {
        cmd = cmd.from_account(from_collective);
    }
    if let Some(organization) = payload.new_organization {
        let mut new_organization = engine::NewOrganization::new(organization.name);
        if let Some(website) = organization.website {
            new_organization = new_organization.website(website);
        }
        cmd = cmd.on_behalf_of(new_organization);
    }
    if let Some(order_user) = payload.user {
        let mut remote_user = engine::RemoteUser::new(order_user.email);
        if let Some(name) = order_user.name {
            remote_user = remote_user.name(name);
        }
        cmd = cmd.remote_user(remote_user);
    }
    if let Some(percent) = payload.host_fee_percent {
        cmd = cmd.host_fee_percent(percent);
    }
    if let Some(percent) = payload.platform_fee_percent {
        cmd = cmd.platform_fee_percent(percent);
    }
    if let Some(fee) = payload.payment_processor_fee {
        cmd = cmd.payment_processor_fee_minor(fee);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let mut attempt = 1;
    let created = loop {
        match state.engine.create_order(cmd.clone()).await {
            Ok(created) => break created,
            Err(err) if err.is_transient() && attempt < MAX_ATTEMPTS => {
                tracing::warn!("transient failure creating order (attempt {attempt}): {err}");
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    };

    Ok(Json(OrderCreated {
        id: created.order_id,
        from_account: account_view(created.from_account),
        to_account: account_view(created.to_account),
    }))
}
