use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod catalog;
mod clients;
mod events;
mod invoices;
mod permissions;
mod quotes;
mod recipes;
mod revenue;
mod server;
mod staff;
mod user;

pub mod types {
    pub mod client {
        pub use api_types::client::{ClientListParams, ClientNew, ClientUpdate, ClientView, ClientsResponse};
    }

    pub mod catalog {
        pub use api_types::catalog::{
            CatalogListParams, PackageNew, PackageUpdate, PackageView, PackagesResponse,
            UpchargeNew, UpchargeUpdate, UpchargeView, UpchargesResponse,
        };
    }

    pub mod quote {
        pub use api_types::quote::{QuoteRequest, QuoteView};
    }

    pub mod event {
        pub use api_types::event::{
            EventCancel, EventListParams, EventListResponse, EventNew, EventStatus,
            EventStatusUpdate, EventUpdate, EventView,
        };
    }

    pub mod revenue {
        pub use api_types::revenue::{
            ClientBucketView, MonthlyBucketView, PaymentMethod, RevenueListResponse, RevenueNew,
            RevenueRangeParams, RevenueReportView, RevenueView,
        };
    }

    pub mod invoice {
        pub use api_types::invoice::{
            InvoiceIssue, InvoiceListParams, InvoicePay, InvoiceStatus, InvoiceView, InvoiceVoid,
            InvoicesResponse,
        };
    }

    pub mod permission {
        pub use api_types::permission::{
            AuditEntryView, AuditParams, AuditResponse, PermissionGrantView, PermissionUpdate,
            RolePermissionsResponse,
        };
    }

    pub mod staff {
        pub use api_types::staff::{RoleUpdate, StaffListParams, UserNew, UserView, UsersResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidRole(_)
        | EngineError::InvalidStatus(_)
        | EngineError::InvalidCursor(_)
        | EngineError::InvalidId(_)
        | EngineError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Export(export_err) => {
            tracing::error!("export error: {export_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

pub(crate) fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Eur => api_types::Currency::Eur,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res =
            ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::InvalidStatus("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::InvalidCursor("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
