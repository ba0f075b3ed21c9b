//! Recipes: named ingredient compositions used for dish costing.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, costing::IngredientUsage, util};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    /// How many servings one batch yields; always > 0.
    pub servings: u32,
    /// Ingredient lines; loaded separately from `recipe_ingredients`.
    #[serde(skip)]
    pub items: Vec<IngredientUsage>,
    pub archived: bool,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub servings: i32,
    pub archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe_ingredients::Entity")]
    RecipeIngredients,
}

impl Related<super::recipe_ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Recipe> for ActiveModel {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: ActiveValue::Set(recipe.id.to_string()),
            name: ActiveValue::Set(recipe.name.clone()),
            servings: ActiveValue::Set(recipe.servings as i32),
            archived: ActiveValue::Set(recipe.archived),
        }
    }
}

impl TryFrom<Model> for Recipe {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: util::parse_uuid(&model.id, "recipe")?,
            name: model.name,
            servings: util::model_count(model.servings, "servings")?,
            items: Vec::new(),
            archived: model.archived,
        })
    }
}

impl IngredientUsage {
    pub(crate) fn try_from_line(model: &super::recipe_ingredients::Model) -> Result<Self, EngineError> {
        Ok(Self {
            ingredient_id: util::parse_uuid(&model.ingredient_id, "ingredient")?,
            quantity: model.quantity,
        })
    }
}
