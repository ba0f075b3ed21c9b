//! Revenue records: the flat rows the analytics aggregation runs over.
//!
//! `net_profit` is stored alongside the cost breakdown and trusted as-is;
//! the aggregator never recomputes it from `gross - costs`.

use chrono::NaiveDate;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, reports::PaymentMethod, util};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueRecord {
    pub id: Uuid,
    /// Optional link to the event this revenue came from.
    pub event_id: Option<Uuid>,
    pub client_id: Uuid,
    pub occurred_on: NaiveDate,
    pub gross_revenue: Money,
    pub food_cost: Money,
    pub labor_cost: Money,
    pub other_expenses: Money,
    pub net_profit: Money,
    pub payment_method: PaymentMethod,
    pub created_by: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "revenue_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub event_id: Option<String>,
    pub client_id: String,
    pub occurred_on: Date,
    pub gross_revenue_minor: i64,
    pub food_cost_minor: i64,
    pub labor_cost_minor: i64,
    pub other_expenses_minor: i64,
    pub net_profit_minor: i64,
    pub payment_method: String,
    pub created_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&RevenueRecord> for ActiveModel {
    fn from(record: &RevenueRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id.to_string()),
            event_id: ActiveValue::Set(record.event_id.map(|id| id.to_string())),
            client_id: ActiveValue::Set(record.client_id.to_string()),
            occurred_on: ActiveValue::Set(record.occurred_on),
            gross_revenue_minor: ActiveValue::Set(record.gross_revenue.minor()),
            food_cost_minor: ActiveValue::Set(record.food_cost.minor()),
            labor_cost_minor: ActiveValue::Set(record.labor_cost.minor()),
            other_expenses_minor: ActiveValue::Set(record.other_expenses.minor()),
            net_profit_minor: ActiveValue::Set(record.net_profit.minor()),
            payment_method: ActiveValue::Set(record.payment_method.as_str().to_string()),
            created_by: ActiveValue::Set(record.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for RevenueRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "revenue record")?,
            event_id: model
                .event_id
                .as_deref()
                .map(|id| util::parse_uuid(id, "event"))
                .transpose()?,
            client_id: util::parse_uuid(&model.client_id, "client")?,
            occurred_on: model.occurred_on,
            gross_revenue: Money::new(model.gross_revenue_minor),
            food_cost: Money::new(model.food_cost_minor),
            labor_cost: Money::new(model.labor_cost_minor),
            other_expenses: Money::new(model.other_expenses_minor),
            net_profit: Money::new(model.net_profit_minor),
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            created_by: model.created_by,
        })
    }
}
