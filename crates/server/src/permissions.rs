//! Permission management API endpoints

use api_types::permission::{
    AuditEntryView, AuditParams, AuditResponse, PermissionGrantView, PermissionUpdate,
    RolePermissionsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Permission, Role};

use crate::{ServerError, server::ServerState, user};

pub(crate) fn map_role(role: Role) -> api_types::Role {
    match role {
        Role::Admin => api_types::Role::Admin,
        Role::Staff => api_types::Role::Staff,
        Role::Client => api_types::Role::Client,
    }
}

pub(crate) fn map_role_api(role: api_types::Role) -> Role {
    match role {
        api_types::Role::Admin => Role::Admin,
        api_types::Role::Staff => Role::Staff,
        api_types::Role::Client => Role::Client,
    }
}

fn parse_role(raw: &str) -> Result<Role, ServerError> {
    Role::try_from(raw).map_err(ServerError::from)
}

pub async fn get_role(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(role): Path<String>,
) -> Result<Json<RolePermissionsResponse>, ServerError> {
    let role = parse_role(&role)?;
    let grants = state
        .engine
        .effective_permissions(role, &user.username)
        .await?;

    Ok(Json(RolePermissionsResponse {
        role: map_role(role),
        permissions: grants
            .into_iter()
            .map(|grant| PermissionGrantView {
                permission: grant.permission.as_str().to_string(),
                category: grant.permission.category().to_string(),
                allowed: grant.allowed,
                overridden: grant.overridden,
            })
            .collect(),
    }))
}

pub async fn set_role(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(role): Path<String>,
    Json(payload): Json<PermissionUpdate>,
) -> Result<StatusCode, ServerError> {
    let role = parse_role(&role)?;
    let permission = Permission::try_from(payload.permission.as_str())?;

    state
        .engine
        .set_permission(role, permission, payload.allowed, &user.username, Utc::now())
        .await?;

    Ok(StatusCode::OK)
}

pub async fn audit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<AuditParams>,
) -> Result<Json<AuditResponse>, ServerError> {
    let entries = state
        .engine
        .permission_audit(params.limit.unwrap_or(50), &user.username)
        .await?;

    Ok(Json(AuditResponse {
        entries: entries
            .into_iter()
            .map(|entry| AuditEntryView {
                role: map_role(entry.role),
                permission: entry.permission.as_str().to_string(),
                allowed: entry.allowed,
                changed_by: entry.changed_by,
                changed_at: entry.changed_at,
            })
            .collect(),
    }))
}
