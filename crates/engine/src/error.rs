//! The module contains the error the engine can throw.
//!
//! Validation errors carry a human-readable message that the server surfaces
//! verbatim; [`Database`] errors are logged at the boundary and replaced with
//! a generic message.
//!
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid role: {0}")]
    InvalidRole(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidRole(a), Self::InvalidRole(b)) => a == b,
            (Self::InvalidStatus(a), Self::InvalidStatus(b)) => a == b,
            (Self::InvalidCursor(a), Self::InvalidCursor(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
