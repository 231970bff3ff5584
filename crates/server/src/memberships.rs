//! Account membership API endpoints.

use api_types::membership::{MemberUpsert, MemberView, MembersResponse, MembershipRole};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::users;

pub async fn upsert(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(account_ref): Path<String>,
    Json(payload): Json<MemberUpsert>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .upsert_account_member(
            &account_ref,
            &payload.email,
            payload.role.as_str(),
            &user.email,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path((account_ref, member_email)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .remove_account_member(&account_ref, &member_email, &user.email)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(account_ref): Path<String>,
) -> Result<Json<MembersResponse>, ServerError> {
    let members = state
        .engine
        .list_account_members(&account_ref, &user.email)
        .await?;

    let members = members
        .into_iter()
        .map(|(email, role)| {
            let role = match role.as_str() {
                "admin" => MembershipRole::Admin,
                _ => MembershipRole::Member,
            };
            MemberView { email, role }
        })
        .collect();

    Ok(Json(MembersResponse { members }))
}
