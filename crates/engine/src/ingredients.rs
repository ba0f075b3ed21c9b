//! Ingredients: the costing catalog plus on-hand stock.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, util};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: Uuid,
    pub name: String,
    /// Unit the quantity and cost refer to (kg, l, pieces).
    pub unit: String,
    pub cost_per_unit: Money,
    pub stock_quantity: f64,
    pub archived: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub unit: String,
    pub cost_per_unit_minor: i64,
    pub stock_quantity: f64,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Ingredient> for ActiveModel {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            id: ActiveValue::Set(ingredient.id.to_string()),
            name: ActiveValue::Set(ingredient.name.clone()),
            unit: ActiveValue::Set(ingredient.unit.clone()),
            cost_per_unit_minor: ActiveValue::Set(ingredient.cost_per_unit.minor()),
            stock_quantity: ActiveValue::Set(ingredient.stock_quantity),
            archived: ActiveValue::Set(ingredient.archived),
        }
    }
}

impl TryFrom<Model> for Ingredient {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "ingredient")?,
            name: model.name,
            unit: model.unit,
            cost_per_unit: Money::new(model.cost_per_unit_minor),
            stock_quantity: model.stock_quantity,
            archived: model.archived,
        })
    }
}
