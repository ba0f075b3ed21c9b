//! Client API endpoints

use api_types::client::{ClientListParams, ClientNew, ClientUpdate, ClientView, ClientsResponse};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(client: engine::Client) -> ClientView {
    ClientView {
        id: client.id,
        name: client.name,
        email: client.email,
        phone: client.phone,
        archived: client.archived,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ClientNew>,
) -> Result<(StatusCode, Json<ClientView>), ServerError> {
    let client = state
        .engine
        .new_client(
            &payload.name,
            payload.email.as_deref(),
            payload.phone.as_deref(),
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(client))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientUpdate>,
) -> Result<Json<ClientView>, ServerError> {
    let client = state
        .engine
        .update_client(
            id,
            payload.name.as_deref(),
            payload.email.as_deref(),
            payload.phone.as_deref(),
            &user.username,
        )
        .await?;

    Ok(Json(view(client)))
}

pub async fn archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.archive_client(id, &user.username).await?;
    Ok(StatusCode::OK)
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<ClientListParams>,
) -> Result<Json<ClientsResponse>, ServerError> {
    let clients = state
        .engine
        .list_clients(params.include_archived.unwrap_or(false), &user.username)
        .await?;

    Ok(Json(ClientsResponse {
        clients: clients.into_iter().map(view).collect(),
    }))
}
