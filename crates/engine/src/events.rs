//! Event bookings.
//!
//! An event snapshots its quote (subtotal/gratuity/total) at booking time so
//! later catalog price changes never silently reprice an agreed booking.
//! Re-quoting happens only through an explicit update.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, util};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Booked,
    Confirmed,
    Completed,
    Canceled,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

impl TryFrom<&str> for EventStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "booked" => Ok(Self::Booked),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "canceled" => Ok(Self::Canceled),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid event status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub event_date: NaiveDate,
    pub package_id: Uuid,
    pub adult_count: u32,
    pub child_count: u32,
    /// Selected upcharges; loaded separately from `event_upcharges`.
    pub upcharge_ids: Vec<Uuid>,
    pub gratuity_percent: u8,
    pub subtotal: Money,
    pub gratuity: Money,
    pub total: Money,
    pub currency: Currency,
    pub status: EventStatus,
    pub note: Option<String>,
    pub created_by: String,
    pub canceled_at: Option<DateTime<Utc>>,
    pub canceled_by: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub event_date: Date,
    pub package_id: String,
    pub adult_count: i32,
    pub child_count: i32,
    pub gratuity_percent: i32,
    pub subtotal_minor: i64,
    pub gratuity_minor: i64,
    pub total_minor: i64,
    pub currency: String,
    pub status: String,
    pub note: Option<String>,
    pub created_by: String,
    pub canceled_at: Option<DateTimeUtc>,
    pub canceled_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_upcharges::Entity")]
    EventUpcharges,
}

impl Related<super::event_upcharges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EventUpcharges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Event> for ActiveModel {
    fn from(event: &Event) -> Self {
        Self {
            id: ActiveValue::Set(event.id.to_string()),
            client_id: ActiveValue::Set(event.client_id.to_string()),
            name: ActiveValue::Set(event.name.clone()),
            event_date: ActiveValue::Set(event.event_date),
            package_id: ActiveValue::Set(event.package_id.to_string()),
            adult_count: ActiveValue::Set(event.adult_count as i32),
            child_count: ActiveValue::Set(event.child_count as i32),
            gratuity_percent: ActiveValue::Set(i32::from(event.gratuity_percent)),
            subtotal_minor: ActiveValue::Set(event.subtotal.minor()),
            gratuity_minor: ActiveValue::Set(event.gratuity.minor()),
            total_minor: ActiveValue::Set(event.total.minor()),
            currency: ActiveValue::Set(event.currency.code().to_string()),
            status: ActiveValue::Set(event.status.as_str().to_string()),
            note: ActiveValue::Set(event.note.clone()),
            created_by: ActiveValue::Set(event.created_by.clone()),
            canceled_at: ActiveValue::Set(event.canceled_at),
            canceled_by: ActiveValue::Set(event.canceled_by.clone()),
        }
    }
}

impl TryFrom<Model> for Event {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let gratuity_percent = u8::try_from(model.gratuity_percent)
            .map_err(|_| EngineError::InvalidAmount("invalid gratuity_percent".to_string()))?;
        Ok(Self {
            id: util::parse_uuid(&model.id, "event")?,
            client_id: util::parse_uuid(&model.client_id, "client")?,
            name: model.name,
            event_date: model.event_date,
            package_id: util::parse_uuid(&model.package_id, "package")?,
            adult_count: util::model_count(model.adult_count, "adult_count")?,
            child_count: util::model_count(model.child_count, "child_count")?,
            upcharge_ids: Vec::new(),
            gratuity_percent,
            subtotal: Money::new(model.subtotal_minor),
            gratuity: Money::new(model.gratuity_minor),
            total: Money::new(model.total_minor),
            currency: util::model_currency(&model.currency)?,
            status: EventStatus::try_from(model.status.as_str())?,
            note: model.note,
            created_by: model.created_by,
            canceled_at: model.canceled_at,
            canceled_by: model.canceled_by,
        })
    }
}
