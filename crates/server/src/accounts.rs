//! Account API endpoints.

use api_types::account::{AccountKind as ApiKind, AccountNew, AccountView};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState, to_api_currency, to_engine_currency};
use engine::users;

fn map_kind(kind: engine::AccountKind) -> ApiKind {
    match kind {
        engine::AccountKind::Individual => ApiKind::Individual,
        engine::AccountKind::Organization => ApiKind::Organization,
        engine::AccountKind::Collective => ApiKind::Collective,
        engine::AccountKind::Host => ApiKind::Host,
    }
}

fn to_engine_kind(kind: ApiKind) -> engine::AccountKind {
    match kind {
        ApiKind::Individual => engine::AccountKind::Individual,
        ApiKind::Organization => engine::AccountKind::Organization,
        ApiKind::Collective => engine::AccountKind::Collective,
        ApiKind::Host => engine::AccountKind::Host,
    }
}

fn account_view(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        slug: account.slug,
        name: account.name,
        kind: map_kind(account.kind),
        currency: to_api_currency(account.currency),
        host_account_id: account.host_account_id,
        can_host: account.can_host,
        archived: account.archived,
    }
}

/// Handle requests for creating a new account.
pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<Json<AccountView>, ServerError> {
    let currency = payload
        .currency
        .map(to_engine_currency)
        .unwrap_or_default();

    let mut cmd = engine::NewAccountCmd::new(
        payload.name,
        to_engine_kind(payload.kind),
        currency,
        user.email,
    )
    .can_host(payload.can_host);
    if let Some(slug) = payload.slug {
        cmd = cmd.slug(slug);
    }
    if let Some(host) = payload.host {
        cmd = cmd.host(host);
    }
    if let Some(percent) = payload.host_fee_percent {
        cmd = cmd.host_fee_percent(percent);
    }

    let account = state.engine.new_account(cmd).await?;
    Ok(Json(account_view(account)))
}

/// Handle requests for reading an account by id or slug.
pub async fn get(
    Extension(_user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(account_ref): Path<String>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account_snapshot(&account_ref).await?;
    Ok(Json(account_view(account)))
}
