//! Ingredient catalog, stock and recipe costing operations.

use std::collections::HashMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money, Permission, ResultEngine,
    costing::{self, IngredientUsage},
    ingredients, ingredients::Ingredient,
    recipe_ingredients, recipes, recipes::Recipe,
};

use super::{Engine, normalize_required_name, with_tx};

/// Cost breakdown for one recipe batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecipeCost {
    pub total: Money,
    /// `total / servings`, rounded to the nearest cent.
    pub cost_per_serving: Money,
    pub currency: Currency,
}

fn validate_items(items: &[IngredientUsage]) -> ResultEngine<()> {
    for item in items {
        if item.quantity <= 0.0 || !item.quantity.is_finite() {
            return Err(EngineError::InvalidAmount(
                "ingredient quantity must be > 0".to_string(),
            ));
        }
    }
    let mut seen: Vec<Uuid> = Vec::with_capacity(items.len());
    for item in items {
        if seen.contains(&item.ingredient_id) {
            return Err(EngineError::ExistingKey(
                "duplicate ingredient line".to_string(),
            ));
        }
        seen.push(item.ingredient_id);
    }
    Ok(())
}

impl Engine {
    pub(super) async fn require_ingredient(
        &self,
        db: &DatabaseTransaction,
        ingredient_id: Uuid,
    ) -> ResultEngine<Ingredient> {
        let model = ingredients::Entity::find_by_id(ingredient_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("ingredient not exists".to_string()))?;
        Ingredient::try_from(model)
    }

    async fn require_recipe_model(
        &self,
        db: &DatabaseTransaction,
        recipe_id: Uuid,
    ) -> ResultEngine<Recipe> {
        let model = recipes::Entity::find_by_id(recipe_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("recipe not exists".to_string()))?;
        Recipe::try_from(model)
    }

    async fn load_recipe_items(
        &self,
        db: &DatabaseTransaction,
        recipe_id: Uuid,
    ) -> ResultEngine<Vec<IngredientUsage>> {
        let lines = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id.to_string()))
            .all(db)
            .await?;
        lines
            .iter()
            .map(IngredientUsage::try_from_line)
            .collect()
    }

    /// Creates an ingredient with a unit cost and an opening stock level.
    pub async fn new_ingredient(
        &self,
        name: &str,
        unit: &str,
        cost_per_unit: Money,
        stock_quantity: f64,
        user_id: &str,
    ) -> ResultEngine<Ingredient> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesEdit)
                .await?;
            let name = normalize_required_name(name, "ingredient")?;
            let unit = normalize_required_name(unit, "unit")?;
            if cost_per_unit.is_negative() {
                return Err(EngineError::InvalidAmount(
                    "cost_per_unit must not be negative".to_string(),
                ));
            }
            if stock_quantity < 0.0 || !stock_quantity.is_finite() {
                return Err(EngineError::InvalidAmount(
                    "stock_quantity must not be negative".to_string(),
                ));
            }

            let taken = ingredients::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(name));
            }

            let ingredient = Ingredient {
                id: Uuid::new_v4(),
                name,
                unit,
                cost_per_unit,
                stock_quantity,
                archived: false,
            };
            ingredients::ActiveModel::from(&ingredient)
                .insert(&db_tx)
                .await?;
            Ok(ingredient)
        })
    }

    /// Updates the unit cost of an ingredient.
    pub async fn update_ingredient_cost(
        &self,
        ingredient_id: Uuid,
        cost_per_unit: Money,
        user_id: &str,
    ) -> ResultEngine<Ingredient> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesEdit)
                .await?;
            if cost_per_unit.is_negative() {
                return Err(EngineError::InvalidAmount(
                    "cost_per_unit must not be negative".to_string(),
                ));
            }
            let mut ingredient = self.require_ingredient(&db_tx, ingredient_id).await?;
            ingredient.cost_per_unit = cost_per_unit;

            let model = ingredients::ActiveModel {
                id: ActiveValue::Set(ingredient_id.to_string()),
                cost_per_unit_minor: ActiveValue::Set(cost_per_unit.minor()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(ingredient)
        })
    }

    /// Adjusts on-hand stock by a signed delta; the result must stay >= 0.
    pub async fn adjust_ingredient_stock(
        &self,
        ingredient_id: Uuid,
        delta: f64,
        user_id: &str,
    ) -> ResultEngine<Ingredient> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesEdit)
                .await?;
            if !delta.is_finite() {
                return Err(EngineError::InvalidAmount(
                    "stock delta must be finite".to_string(),
                ));
            }
            let mut ingredient = self.require_ingredient(&db_tx, ingredient_id).await?;

            let new_stock = ingredient.stock_quantity + delta;
            if new_stock < 0.0 {
                return Err(EngineError::InvalidAmount(format!(
                    "stock for \"{}\" cannot go below zero",
                    ingredient.name
                )));
            }
            ingredient.stock_quantity = new_stock;

            let model = ingredients::ActiveModel {
                id: ActiveValue::Set(ingredient_id.to_string()),
                stock_quantity: ActiveValue::Set(new_stock),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(ingredient)
        })
    }

    pub async fn archive_ingredient(&self, ingredient_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesEdit)
                .await?;
            self.require_ingredient(&db_tx, ingredient_id).await?;

            let model = ingredients::ActiveModel {
                id: ActiveValue::Set(ingredient_id.to_string()),
                archived: ActiveValue::Set(true),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn list_ingredients(
        &self,
        include_archived: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<Ingredient>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesView)
                .await?;

            let mut query = ingredients::Entity::find().order_by_asc(ingredients::Column::Name);
            if !include_archived {
                query = query.filter(ingredients::Column::Archived.eq(false));
            }

            let models = query.all(&db_tx).await?;
            models.into_iter().map(Ingredient::try_from).collect()
        })
    }

    /// Creates a recipe with its ingredient lines.
    pub async fn new_recipe(
        &self,
        name: &str,
        servings: u32,
        items: Vec<IngredientUsage>,
        user_id: &str,
    ) -> ResultEngine<Recipe> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesEdit)
                .await?;
            let name = normalize_required_name(name, "recipe")?;
            if servings == 0 {
                return Err(EngineError::InvalidAmount(
                    "servings must be > 0".to_string(),
                ));
            }
            validate_items(&items)?;
            for item in &items {
                self.require_ingredient(&db_tx, item.ingredient_id).await?;
            }

            let taken = recipes::Entity::find()
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(name));
            }

            let recipe = Recipe {
                id: Uuid::new_v4(),
                name,
                servings,
                items: items.clone(),
                archived: false,
            };
            recipes::ActiveModel::from(&recipe).insert(&db_tx).await?;
            for item in &items {
                let line = recipe_ingredients::ActiveModel {
                    recipe_id: ActiveValue::Set(recipe.id.to_string()),
                    ingredient_id: ActiveValue::Set(item.ingredient_id.to_string()),
                    quantity: ActiveValue::Set(item.quantity),
                };
                line.insert(&db_tx).await?;
            }
            Ok(recipe)
        })
    }

    /// Replaces the ingredient lines of a recipe.
    pub async fn set_recipe_items(
        &self,
        recipe_id: Uuid,
        items: Vec<IngredientUsage>,
        user_id: &str,
    ) -> ResultEngine<Recipe> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesEdit)
                .await?;
            validate_items(&items)?;
            let mut recipe = self.require_recipe_model(&db_tx, recipe_id).await?;
            for item in &items {
                self.require_ingredient(&db_tx, item.ingredient_id).await?;
            }

            recipe_ingredients::Entity::delete_many()
                .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id.to_string()))
                .exec(&db_tx)
                .await?;
            for item in &items {
                let line = recipe_ingredients::ActiveModel {
                    recipe_id: ActiveValue::Set(recipe_id.to_string()),
                    ingredient_id: ActiveValue::Set(item.ingredient_id.to_string()),
                    quantity: ActiveValue::Set(item.quantity),
                };
                line.insert(&db_tx).await?;
            }

            recipe.items = items;
            Ok(recipe)
        })
    }

    pub async fn archive_recipe(&self, recipe_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesEdit)
                .await?;
            self.require_recipe_model(&db_tx, recipe_id).await?;

            let model = recipes::ActiveModel {
                id: ActiveValue::Set(recipe_id.to_string()),
                archived: ActiveValue::Set(true),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Returns a recipe with its ingredient lines loaded.
    pub async fn recipe(&self, recipe_id: Uuid, user_id: &str) -> ResultEngine<Recipe> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesView)
                .await?;
            let mut recipe = self.require_recipe_model(&db_tx, recipe_id).await?;
            recipe.items = self.load_recipe_items(&db_tx, recipe_id).await?;
            Ok(recipe)
        })
    }

    /// Lists recipes ordered by name. Ingredient lines are not loaded here;
    /// use [`Engine::recipe`] for the full composition.
    pub async fn list_recipes(
        &self,
        include_archived: bool,
        user_id: &str,
    ) -> ResultEngine<Vec<Recipe>> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesView)
                .await?;

            let mut query = recipes::Entity::find().order_by_asc(recipes::Column::Name);
            if !include_archived {
                query = query.filter(recipes::Column::Archived.eq(false));
            }

            let models = query.all(&db_tx).await?;
            models.into_iter().map(Recipe::try_from).collect()
        })
    }

    /// Costs one recipe batch against the current ingredient catalog.
    ///
    /// Lines whose ingredient row has disappeared contribute nothing, per the
    /// costing contract.
    pub async fn recipe_cost(&self, recipe_id: Uuid, user_id: &str) -> ResultEngine<RecipeCost> {
        with_tx!(self, |db_tx| {
            self.require_permission(&db_tx, user_id, Permission::RecipesView)
                .await?;
            let recipe = self.require_recipe_model(&db_tx, recipe_id).await?;
            let items = self.load_recipe_items(&db_tx, recipe_id).await?;

            let mut catalog: HashMap<Uuid, Money> = HashMap::new();
            for model in ingredients::Entity::find().all(&db_tx).await? {
                let ingredient = Ingredient::try_from(model)?;
                catalog.insert(ingredient.id, ingredient.cost_per_unit);
            }

            let total = costing::recipe_cost(&items, &catalog);
            let servings = i64::from(recipe.servings);
            let cost_per_serving = Money::new((total.minor() + servings / 2) / servings);

            Ok(RecipeCost {
                total,
                cost_per_serving,
                currency: Currency::default(),
            })
        })
    }
}
