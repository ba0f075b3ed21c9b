//! Menu catalog API endpoints: packages and upcharges

use api_types::catalog::{
    CatalogListParams, PackageNew, PackageUpdate, PackageView, PackagesResponse, UpchargeNew,
    UpchargeUpdate, UpchargeView, UpchargesResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::Money;
use uuid::Uuid;

use crate::{ServerError, map_currency, server::ServerState, user};

fn package_view(package: engine::MenuPackage) -> PackageView {
    PackageView {
        id: package.id,
        name: package.name,
        adult_price_minor: package.adult_price.minor(),
        child_price_minor: package.child_price.minor(),
        min_guests: package.min_guests,
        vegetarian: package.vegetarian,
        gluten_free: package.gluten_free,
        currency: map_currency(package.currency),
        archived: package.archived,
    }
}

fn upcharge_view(upcharge: engine::Upcharge) -> UpchargeView {
    UpchargeView {
        id: upcharge.id,
        name: upcharge.name,
        amount_minor: upcharge.amount.minor(),
        archived: upcharge.archived,
    }
}

pub async fn package_create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<PackageNew>,
) -> Result<(StatusCode, Json<PackageView>), ServerError> {
    let package = state
        .engine
        .new_package(
            &payload.name,
            Money::new(payload.adult_price_minor),
            Money::new(payload.child_price_minor),
            payload.min_guests,
            payload.vegetarian,
            payload.gluten_free,
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(package_view(package))))
}

pub async fn package_update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PackageUpdate>,
) -> Result<Json<PackageView>, ServerError> {
    let package = state
        .engine
        .update_package(
            id,
            payload.name.as_deref(),
            payload.adult_price_minor.map(Money::new),
            payload.child_price_minor.map(Money::new),
            payload.min_guests,
            payload.vegetarian,
            payload.gluten_free,
            &user.username,
        )
        .await?;

    Ok(Json(package_view(package)))
}

pub async fn package_archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.archive_package(id, &user.username).await?;
    Ok(StatusCode::OK)
}

pub async fn package_list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<CatalogListParams>,
) -> Result<Json<PackagesResponse>, ServerError> {
    let packages = state
        .engine
        .list_packages(params.include_archived.unwrap_or(false), &user.username)
        .await?;

    Ok(Json(PackagesResponse {
        packages: packages.into_iter().map(package_view).collect(),
    }))
}

pub async fn upcharge_create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<UpchargeNew>,
) -> Result<(StatusCode, Json<UpchargeView>), ServerError> {
    let upcharge = state
        .engine
        .new_upcharge(&payload.name, Money::new(payload.amount_minor), &user.username)
        .await?;

    Ok((StatusCode::CREATED, Json(upcharge_view(upcharge))))
}

pub async fn upcharge_update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpchargeUpdate>,
) -> Result<Json<UpchargeView>, ServerError> {
    let upcharge = state
        .engine
        .update_upcharge(id, Money::new(payload.amount_minor), &user.username)
        .await?;

    Ok(Json(upcharge_view(upcharge)))
}

pub async fn upcharge_archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.archive_upcharge(id, &user.username).await?;
    Ok(StatusCode::OK)
}

pub async fn upcharge_list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<CatalogListParams>,
) -> Result<Json<UpchargesResponse>, ServerError> {
    let upcharges = state
        .engine
        .list_upcharges(params.include_archived.unwrap_or(false), &user.username)
        .await?;

    Ok(Json(UpchargesResponse {
        upcharges: upcharges.into_iter().map(upcharge_view).collect(),
    }))
}
