//! Menu packages: the priceable catalog items a quote is built from.
//!
//! A package carries per-guest base prices for adults and children, a
//! minimum guest count, and dietary flags surfaced in the menu views.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, Money, util};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuPackage {
    pub id: Uuid,
    pub name: String,
    pub adult_price: Money,
    pub child_price: Money,
    pub min_guests: u32,
    pub vegetarian: bool,
    pub gluten_free: bool,
    pub currency: Currency,
    pub archived: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "menu_packages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub adult_price_minor: i64,
    pub child_price_minor: i64,
    pub min_guests: i32,
    pub vegetarian: bool,
    pub gluten_free: bool,
    pub currency: String,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MenuPackage> for ActiveModel {
    fn from(package: &MenuPackage) -> Self {
        Self {
            id: ActiveValue::Set(package.id.to_string()),
            name: ActiveValue::Set(package.name.clone()),
            adult_price_minor: ActiveValue::Set(package.adult_price.minor()),
            child_price_minor: ActiveValue::Set(package.child_price.minor()),
            min_guests: ActiveValue::Set(package.min_guests as i32),
            vegetarian: ActiveValue::Set(package.vegetarian),
            gluten_free: ActiveValue::Set(package.gluten_free),
            currency: ActiveValue::Set(package.currency.code().to_string()),
            archived: ActiveValue::Set(package.archived),
        }
    }
}

impl TryFrom<Model> for MenuPackage {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "package")?,
            name: model.name,
            adult_price: Money::new(model.adult_price_minor),
            child_price: Money::new(model.child_price_minor),
            min_guests: util::model_count(model.min_guests, "min_guests")?,
            vegetarian: model.vegetarian,
            gluten_free: model.gluten_free,
            currency: util::model_currency(&model.currency)?,
            archived: model.archived,
        })
    }
}
