//! Invoices issued for booked events.
//!
//! Numbers are allocated sequentially per calendar year (`INV-YYYY-NNNN`).
//! Voiding is a soft operation recording who and when; paid invoices can
//! never be voided.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Issued,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Paid => "paid",
            Self::Void => "void",
        }
    }
}

impl TryFrom<&str> for InvoiceStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "issued" => Ok(Self::Issued),
            "paid" => Ok(Self::Paid),
            "void" => Ok(Self::Void),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid invoice status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub event_id: Uuid,
    pub client_id: Uuid,
    pub number: String,
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    pub total: Money,
    pub currency: Currency,
    pub status: InvoiceStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub voided_at: Option<DateTime<Utc>>,
    pub voided_by: Option<String>,
    pub created_by: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub event_id: String,
    pub client_id: String,
    pub number: String,
    pub issued_on: Date,
    pub due_on: Date,
    pub total_minor: i64,
    pub currency: String,
    pub status: String,
    pub paid_at: Option<DateTimeUtc>,
    pub voided_at: Option<DateTimeUtc>,
    pub voided_by: Option<String>,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Invoice> for ActiveModel {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: ActiveValue::Set(invoice.id.to_string()),
            event_id: ActiveValue::Set(invoice.event_id.to_string()),
            client_id: ActiveValue::Set(invoice.client_id.to_string()),
            number: ActiveValue::Set(invoice.number.clone()),
            issued_on: ActiveValue::Set(invoice.issued_on),
            due_on: ActiveValue::Set(invoice.due_on),
            total_minor: ActiveValue::Set(invoice.total.minor()),
            currency: ActiveValue::Set(invoice.currency.code().to_string()),
            status: ActiveValue::Set(invoice.status.as_str().to_string()),
            paid_at: ActiveValue::Set(invoice.paid_at),
            voided_at: ActiveValue::Set(invoice.voided_at),
            voided_by: ActiveValue::Set(invoice.voided_by.clone()),
            created_by: ActiveValue::Set(invoice.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for Invoice {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "invoice")?,
            event_id: util::parse_uuid(&model.event_id, "event")?,
            client_id: util::parse_uuid(&model.client_id, "client")?,
            number: model.number,
            issued_on: model.issued_on,
            due_on: model.due_on,
            total: Money::new(model.total_minor),
            currency: util::model_currency(&model.currency)?,
            status: InvoiceStatus::try_from(model.status.as_str())?,
            paid_at: model.paid_at,
            voided_at: model.voided_at,
            voided_by: model.voided_by,
            created_by: model.created_by,
        })
    }
}
