//! Upcharges: fixed per-guest surcharges for premium menu options.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, util};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upcharge {
    pub id: Uuid,
    pub name: String,
    /// Per-guest surcharge applied on top of the package base price.
    pub amount: Money,
    pub archived: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "upcharges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub amount_minor: i64,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Upcharge> for ActiveModel {
    fn from(upcharge: &Upcharge) -> Self {
        Self {
            id: ActiveValue::Set(upcharge.id.to_string()),
            name: ActiveValue::Set(upcharge.name.clone()),
            amount_minor: ActiveValue::Set(upcharge.amount.minor()),
            archived: ActiveValue::Set(upcharge.archived),
        }
    }
}

impl TryFrom<Model> for Upcharge {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "upcharge")?,
            name: model.name,
            amount: Money::new(model.amount_minor),
            archived: model.archived,
        })
    }
}
