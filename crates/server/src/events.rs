//! Event API endpoints

use api_types::event::{
    EventCancel, EventListParams, EventListResponse, EventNew, EventStatus as ApiStatus,
    EventStatusUpdate, EventUpdate, EventView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, map_currency, server::ServerState, user};

fn map_status(status: engine::EventStatus) -> ApiStatus {
    match status {
        engine::EventStatus::Booked => ApiStatus::Booked,
        engine::EventStatus::Confirmed => ApiStatus::Confirmed,
        engine::EventStatus::Completed => ApiStatus::Completed,
        engine::EventStatus::Canceled => ApiStatus::Canceled,
    }
}

fn map_status_api(status: ApiStatus) -> engine::EventStatus {
    match status {
        ApiStatus::Booked => engine::EventStatus::Booked,
        ApiStatus::Confirmed => engine::EventStatus::Confirmed,
        ApiStatus::Completed => engine::EventStatus::Completed,
        ApiStatus::Canceled => engine::EventStatus::Canceled,
    }
}

fn view(event: engine::Event) -> EventView {
    EventView {
        id: event.id,
        client_id: event.client_id,
        name: event.name,
        event_date: event.event_date,
        package_id: event.package_id,
        adult_count: event.adult_count,
        child_count: event.child_count,
        upcharge_ids: event.upcharge_ids,
        gratuity_percent: event.gratuity_percent,
        subtotal_minor: event.subtotal.minor(),
        gratuity_minor: event.gratuity.minor(),
        total_minor: event.total.minor(),
        currency: map_currency(event.currency),
        status: map_status(event.status),
        note: event.note,
        created_by: event.created_by,
        canceled_at: event.canceled_at,
    }
}

pub async fn book(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<EventNew>,
) -> Result<(StatusCode, Json<EventView>), ServerError> {
    let event = state
        .engine
        .book_event(engine::BookEventCmd {
            client_id: payload.client_id,
            name: payload.name,
            event_date: payload.event_date,
            package_id: payload.package_id,
            adult_count: payload.adult_count,
            child_count: payload.child_count,
            upcharge_ids: payload.upcharge_ids,
            gratuity_percent: payload.gratuity_percent,
            note: payload.note,
            user_id: user.username.clone(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(event))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventUpdate>,
) -> Result<Json<EventView>, ServerError> {
    let event = state
        .engine
        .update_event(
            id,
            engine::UpdateEventCmd {
                name: payload.name,
                event_date: payload.event_date,
                package_id: payload.package_id,
                adult_count: payload.adult_count,
                child_count: payload.child_count,
                upcharge_ids: payload.upcharge_ids,
                gratuity_percent: payload.gratuity_percent,
                note: payload.note,
            },
            &user.username,
        )
        .await?;

    Ok(Json(view(event)))
}

pub async fn set_status(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventStatusUpdate>,
) -> Result<Json<EventView>, ServerError> {
    let event = state
        .engine
        .update_event_status(id, map_status_api(payload.status), &user.username)
        .await?;

    Ok(Json(view(event)))
}

pub async fn cancel(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventCancel>,
) -> Result<StatusCode, ServerError> {
    let canceled_at = payload
        .canceled_at
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    state
        .engine
        .cancel_event(id, &user.username, canceled_at)
        .await?;

    Ok(StatusCode::OK)
}

pub async fn get_detail(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventView>, ServerError> {
    let event = state.engine.event(id, &user.username).await?;
    Ok(Json(view(event)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<EventListParams>,
) -> Result<Json<EventListResponse>, ServerError> {
    let filter = engine::EventListFilter {
        status: params.status.map(map_status_api),
        from: params.from,
        to: params.to,
    };

    let (events, next_cursor) = state
        .engine
        .list_events_page(
            params.limit.unwrap_or(50),
            params.cursor.as_deref(),
            &filter,
            &user.username,
        )
        .await?;

    Ok(Json(EventListResponse {
        events: events.into_iter().map(view).collect(),
        next_cursor,
    }))
}
