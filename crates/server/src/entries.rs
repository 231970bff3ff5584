//! Ledger entry API endpoints.

use api_types::entry::{EntryKind as ApiKind, EntryList, EntryListResponse, EntryView};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState, to_api_currency};
use engine::users;

fn map_kind(kind: engine::EntryKind) -> ApiKind {
    match kind {
        engine::EntryKind::Credit => ApiKind::Credit,
        engine::EntryKind::Debit => ApiKind::Debit,
    }
}

fn entry_view(entry: engine::LedgerEntry) -> EntryView {
    EntryView {
        id: entry.id,
        kind: map_kind(entry.kind),
        order_id: entry.order_id,
        counterparty_account_id: entry.counterparty_account_id,
        amount_minor: entry.amount_minor,
        currency: to_api_currency(entry.currency),
        host_currency: to_api_currency(entry.host_currency),
        host_currency_fx_rate: entry.host_currency_fx_rate,
        amount_in_host_minor: entry.amount_in_host_minor,
        host_fee_minor: entry.host_fee_minor,
        platform_fee_minor: entry.platform_fee_minor,
        payment_processor_fee_minor: entry.payment_processor_fee_minor,
        net_amount_minor: entry.net_amount_minor,
        created_at: entry.created_at,
    }
}

/// Lists the rows on an account's ledger, newest first.
pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EntryList>,
) -> Result<Json<EntryListResponse>, ServerError> {
    let limit = payload.limit.unwrap_or(50);

    let (entries, next_cursor) = state
        .engine
        .list_entries_for_account_page(
            &payload.account,
            &user.email,
            limit,
            payload.cursor.as_deref(),
        )
        .await?;

    Ok(Json(EntryListResponse {
        entries: entries.into_iter().map(entry_view).collect(),
        next_cursor,
    }))
}
