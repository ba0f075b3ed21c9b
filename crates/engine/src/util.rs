//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
        .map_err(|_| EngineError::CurrencyMismatch(format!("invalid currency: {value}")))
}

/// Parse a non-negative stored count into `u32`.
pub(crate) fn model_count(value: i32, label: &str) -> ResultEngine<u32> {
    u32::try_from(value).map_err(|_| EngineError::InvalidAmount(format!("invalid {label}")))
}
