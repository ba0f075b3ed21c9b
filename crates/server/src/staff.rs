//! Staff management API endpoints

use api_types::staff::{RoleUpdate, StaffListParams, UserNew, UserView, UsersResponse};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    ServerError,
    permissions::{map_role, map_role_api},
    server::ServerState,
    user,
};

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .create_user(
            &payload.username,
            &payload.password,
            map_role_api(payload.role),
            &user.username,
        )
        .await?;

    Ok(StatusCode::CREATED)
}

pub async fn set_role(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Json(payload): Json<RoleUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_user_role(&username, map_role_api(payload.role), &user.username)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.archive_user(&username, &user.username).await?;
    Ok(StatusCode::OK)
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<StaffListParams>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .list_users(params.include_archived.unwrap_or(false), &user.username)
        .await?;

    Ok(Json(UsersResponse {
        users: users
            .into_iter()
            .map(|member| UserView {
                username: member.username,
                role: map_role(member.role),
                archived: member.archived,
            })
            .collect(),
    }))
}
