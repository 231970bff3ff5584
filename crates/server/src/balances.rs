//! Balance lookup endpoint.

use api_types::payment_method::BalanceResponse;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{ServerError, server::ServerState, to_api_currency};
use engine::users;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    /// Payment method token.
    pub payment_method: Option<String>,
    /// Account id or slug.
    pub account: Option<String>,
}

/// Handle balance lookups by payment method token or account reference.
pub async fn get(
    Extension(_user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let (balance, currency) = match (query.payment_method, query.account) {
        (Some(token), None) => state.engine.balance_of_payment_method(&token).await?,
        (None, Some(account)) => state.engine.balance_of_account(&account).await?,
        _ => {
            return Err(ServerError::Generic(
                "provide exactly one of payment_method or account".to_string(),
            ));
        }
    };

    Ok(Json(BalanceResponse {
        balance,
        currency: to_api_currency(currency),
    }))
}
