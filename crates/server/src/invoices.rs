//! Invoice API endpoints

use api_types::invoice::{
    InvoiceIssue, InvoiceListParams, InvoicePay, InvoiceStatus as ApiStatus, InvoiceView,
    InvoiceVoid, InvoicesResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, map_currency, server::ServerState, user};

fn map_status(status: engine::InvoiceStatus) -> ApiStatus {
    match status {
        engine::InvoiceStatus::Issued => ApiStatus::Issued,
        engine::InvoiceStatus::Paid => ApiStatus::Paid,
        engine::InvoiceStatus::Void => ApiStatus::Void,
    }
}

fn view(invoice: engine::Invoice) -> InvoiceView {
    InvoiceView {
        id: invoice.id,
        event_id: invoice.event_id,
        client_id: invoice.client_id,
        number: invoice.number,
        issued_on: invoice.issued_on,
        due_on: invoice.due_on,
        total_minor: invoice.total.minor(),
        currency: map_currency(invoice.currency),
        status: map_status(invoice.status),
        paid_at: invoice.paid_at,
        voided_at: invoice.voided_at,
    }
}

pub async fn issue(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<InvoiceIssue>,
) -> Result<(StatusCode, Json<InvoiceView>), ServerError> {
    let issued_on = payload
        .issued_on
        .unwrap_or_else(|| Utc::now().date_naive());
    let invoice = state
        .engine
        .issue_invoice(engine::IssueInvoiceCmd {
            event_id: payload.event_id,
            issued_on,
            due_on: payload.due_on,
            user_id: user.username.clone(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(invoice))))
}

pub async fn pay(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoicePay>,
) -> Result<Json<InvoiceView>, ServerError> {
    let paid_at = payload
        .paid_at
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let invoice = state
        .engine
        .mark_invoice_paid(id, paid_at, &user.username)
        .await?;

    Ok(Json(view(invoice)))
}

pub async fn void_invoice(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoiceVoid>,
) -> Result<Json<InvoiceView>, ServerError> {
    let voided_at = payload
        .voided_at
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let invoice = state
        .engine
        .void_invoice(id, &user.username, voided_at)
        .await?;

    Ok(Json(view(invoice)))
}

pub async fn get_detail(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceView>, ServerError> {
    let invoice = state.engine.invoice(id, &user.username).await?;
    Ok(Json(view(invoice)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<InvoiceListParams>,
) -> Result<Json<InvoicesResponse>, ServerError> {
    let invoices = state
        .engine
        .list_invoices(params.include_void.unwrap_or(false), &user.username)
        .await?;

    Ok(Json(InvoicesResponse {
        invoices: invoices.into_iter().map(view).collect(),
    }))
}
