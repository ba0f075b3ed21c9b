//! Ingredient and recipe API endpoints

use api_types::catalog::CatalogListParams;
use api_types::recipe::{
    IngredientCostUpdate, IngredientNew, IngredientView, IngredientsResponse, RecipeCostView,
    RecipeItem, RecipeItemsUpdate, RecipeNew, RecipeView, RecipesResponse, StockAdjust,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{IngredientUsage, Money};
use uuid::Uuid;

use crate::{ServerError, map_currency, server::ServerState, user};

fn ingredient_view(ingredient: engine::Ingredient) -> IngredientView {
    IngredientView {
        id: ingredient.id,
        name: ingredient.name,
        unit: ingredient.unit,
        cost_per_unit_minor: ingredient.cost_per_unit.minor(),
        stock_quantity: ingredient.stock_quantity,
        archived: ingredient.archived,
    }
}

fn recipe_view(recipe: engine::Recipe) -> RecipeView {
    RecipeView {
        id: recipe.id,
        name: recipe.name,
        servings: recipe.servings,
        items: recipe
            .items
            .into_iter()
            .map(|item| RecipeItem {
                ingredient_id: item.ingredient_id,
                quantity: item.quantity,
            })
            .collect(),
        archived: recipe.archived,
    }
}

fn usages(items: Vec<RecipeItem>) -> Vec<IngredientUsage> {
    items
        .into_iter()
        .map(|item| IngredientUsage {
            ingredient_id: item.ingredient_id,
            quantity: item.quantity,
        })
        .collect()
}

pub async fn ingredient_create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<IngredientNew>,
) -> Result<(StatusCode, Json<IngredientView>), ServerError> {
    let ingredient = state
        .engine
        .new_ingredient(
            &payload.name,
            &payload.unit,
            Money::new(payload.cost_per_unit_minor),
            payload.stock_quantity,
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ingredient_view(ingredient))))
}

pub async fn ingredient_update_cost(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<IngredientCostUpdate>,
) -> Result<Json<IngredientView>, ServerError> {
    let ingredient = state
        .engine
        .update_ingredient_cost(id, Money::new(payload.cost_per_unit_minor), &user.username)
        .await?;

    Ok(Json(ingredient_view(ingredient)))
}

pub async fn ingredient_adjust_stock(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockAdjust>,
) -> Result<Json<IngredientView>, ServerError> {
    let ingredient = state
        .engine
        .adjust_ingredient_stock(id, payload.delta, &user.username)
        .await?;

    Ok(Json(ingredient_view(ingredient)))
}

pub async fn ingredient_archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.archive_ingredient(id, &user.username).await?;
    Ok(StatusCode::OK)
}

pub async fn ingredient_list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<CatalogListParams>,
) -> Result<Json<IngredientsResponse>, ServerError> {
    let ingredients = state
        .engine
        .list_ingredients(params.include_archived.unwrap_or(false), &user.username)
        .await?;

    Ok(Json(IngredientsResponse {
        ingredients: ingredients.into_iter().map(ingredient_view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecipeNew>,
) -> Result<(StatusCode, Json<RecipeView>), ServerError> {
    let recipe = state
        .engine
        .new_recipe(
            &payload.name,
            payload.servings,
            usages(payload.items),
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(recipe_view(recipe))))
}

pub async fn set_items(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeItemsUpdate>,
) -> Result<Json<RecipeView>, ServerError> {
    let recipe = state
        .engine
        .set_recipe_items(id, usages(payload.items), &user.username)
        .await?;

    Ok(Json(recipe_view(recipe)))
}

pub async fn archive(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.archive_recipe(id, &user.username).await?;
    Ok(StatusCode::OK)
}

pub async fn get_detail(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeView>, ServerError> {
    let recipe = state.engine.recipe(id, &user.username).await?;
    Ok(Json(recipe_view(recipe)))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(params): Query<CatalogListParams>,
) -> Result<Json<RecipesResponse>, ServerError> {
    let recipes = state
        .engine
        .list_recipes(params.include_archived.unwrap_or(false), &user.username)
        .await?;

    Ok(Json(RecipesResponse {
        recipes: recipes.into_iter().map(recipe_view).collect(),
    }))
}

pub async fn cost(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeCostView>, ServerError> {
    let cost = state.engine.recipe_cost(id, &user.username).await?;
    Ok(Json(RecipeCostView {
        total_minor: cost.total.minor(),
        cost_per_serving_minor: cost.cost_per_serving.minor(),
        currency: map_currency(cost.currency),
    }))
}
