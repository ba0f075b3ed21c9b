//! Revenue and analytics API endpoints

use api_types::revenue::{
    ClientBucketView, MonthlyBucketView, PaymentMethod as ApiMethod, RevenueListResponse,
    RevenueNew, RevenueRangeParams, RevenueReportView, RevenueView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use engine::Money;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_method(method: engine::PaymentMethod) -> ApiMethod {
    match method {
        engine::PaymentMethod::Cash => ApiMethod::Cash,
        engine::PaymentMethod::Card => ApiMethod::Card,
        engine::PaymentMethod::Transfer => ApiMethod::Transfer,
        engine::PaymentMethod::Check => ApiMethod::Check,
    }
}

fn map_method_api(method: ApiMethod) -> engine::PaymentMethod {
    match method {
        ApiMethod::Cash => engine::PaymentMethod::Cash,
        ApiMethod::Card => engine::PaymentMethod::Card,
        ApiMethod::Transfer => engine::PaymentMethod::Transfer,
        ApiMethod::Check => engine::PaymentMethod::Check,
    }
}

fn view(record: engine::RevenueRecord) -> RevenueView {
    RevenueView {
        id: record.id,
        event_id: record.event_id,
        client_id: record.client_id,
        occurred_on: record.occurred_on,
        gross_revenue_minor: record.gross_revenue.minor(),
        food_cost_minor: record.food_cost.minor(),
        labor_cost_minor: record.labor_cost.minor(),
        other_expenses_minor: record.other_expenses.minor(),
        net_profit_minor: record.net_profit.minor(),
        payment_method: map_method(record.payment_method),
        created_by: record.created_by,
    }
}

pub async fn record(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RevenueNew>,
) -> Result<(StatusCode, Json<RevenueView>), ServerError> {
    let record = state
        .engine
        .record_revenue(engine::RecordRevenueCmd {
            event_id: payload.event_id,
            client_id: payload.client_id,
            occurred_on: payload.occurred_on,
            gross_revenue: Money::new(payload.gross_revenue_minor),
            food_cost: Money::new(payload.food_cost_minor),
            labor_cost: Money::new(payload.labor_cost_minor),
            other_expenses: Money::new(payload.other_expenses_minor),
            net_profit: Money::new(payload.net_profit_minor),
            payment_method: map_method_api(payload.payment_method),
            user_id: user.username.clone(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(record))))
}

pub async fn delete_record(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_revenue_record(id, &user.username)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<RevenueRangeParams>,
) -> Result<Json<RevenueListResponse>, ServerError> {
    let records = state
        .engine
        .list_revenue_records(params.from, params.to, &user.username)
        .await?;

    Ok(Json(RevenueListResponse {
        records: records.into_iter().map(view).collect(),
    }))
}

pub async fn report(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<RevenueRangeParams>,
) -> Result<Json<RevenueReportView>, ServerError> {
    let report = state
        .engine
        .revenue_report(params.from, params.to, &user.username)
        .await?;

    Ok(Json(RevenueReportView {
        by_month: report
            .by_month
            .into_iter()
            .map(|bucket| MonthlyBucketView {
                month: bucket.month,
                revenue_minor: bucket.revenue.minor(),
                profit_minor: bucket.profit.minor(),
                event_count: bucket.event_count,
            })
            .collect(),
        by_client: report
            .by_client
            .into_iter()
            .map(|bucket| ClientBucketView {
                client_id: bucket.client_id,
                client_name: bucket.client_name,
                revenue_minor: bucket.revenue.minor(),
                profit_minor: bucket.profit.minor(),
                event_count: bucket.event_count,
            })
            .collect(),
        total_revenue_minor: report.total_revenue.minor(),
        total_profit_minor: report.total_profit.minor(),
        profit_margin_percent: report.profit_margin_percent,
        average_event_revenue_minor: report.average_event_revenue.minor(),
        top_payment_method: report.top_payment_method.map(map_method),
    }))
}

pub async fn report_csv(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<RevenueRangeParams>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state
        .engine
        .revenue_report_csv(params.from, params.to, &user.username)
        .await?;

    Ok(([(header::CONTENT_TYPE, "text/csv")], data))
}
