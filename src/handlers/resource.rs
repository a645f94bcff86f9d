//! CRUD handlers shared by every resource: list, create, retrieve, update, partial update, delete.

use crate::error::AppError;
use crate::extractors::Payload;
use crate::filter::{IngredientFilter, RecipeFilter, RestaurantFilter};
use crate::model::{
    Ingredient, IngredientChanges, Recipe, RecipeChanges, Restaurant, RestaurantChanges,
};
use crate::response::{created, no_content, ok};
use crate::service::{convert, Body, Mode};
use crate::state::AppState;
use crate::store::Store;
use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Serialize;
use std::collections::HashMap;

/// A named resource: how its bodies convert and which store calls serve it.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Singular name used in not-found messages.
    const LABEL: &'static str;

    type Record: Serialize + Send;
    type Filter: Send + Sync;
    type Changes: Send;

    fn filter(params: &HashMap<String, String>) -> Self::Filter;
    fn new_record(body: &Body) -> Result<Self::Record, AppError>;
    fn changes(body: &Body, mode: Mode) -> Result<Self::Changes, AppError>;

    async fn list(store: &dyn Store, filter: &Self::Filter) -> Result<Vec<Self::Record>, AppError>;
    async fn get(store: &dyn Store, nome: &str) -> Result<Option<Self::Record>, AppError>;
    async fn create(store: &dyn Store, new: Self::Record) -> Result<Self::Record, AppError>;
    async fn update(
        store: &dyn Store,
        nome: &str,
        changes: Self::Changes,
    ) -> Result<Option<Self::Record>, AppError>;
    async fn delete(store: &dyn Store, nome: &str) -> Result<bool, AppError>;
}

/// `/ingredienti/`
pub struct Ingredients;

#[async_trait]
impl Resource for Ingredients {
    const LABEL: &'static str = "ingrediente";

    type Record = Ingredient;
    type Filter = IngredientFilter;
    type Changes = IngredientChanges;

    fn filter(params: &HashMap<String, String>) -> IngredientFilter {
        IngredientFilter::from_params(params)
    }

    fn new_record(body: &Body) -> Result<Ingredient, AppError> {
        convert::new_ingredient(body)
    }

    fn changes(body: &Body, mode: Mode) -> Result<IngredientChanges, AppError> {
        convert::ingredient_changes(body, mode)
    }

    async fn list(store: &dyn Store, filter: &IngredientFilter) -> Result<Vec<Ingredient>, AppError> {
        store.list_ingredients(filter).await
    }

    async fn get(store: &dyn Store, nome: &str) -> Result<Option<Ingredient>, AppError> {
        store.get_ingredient(nome).await
    }

    async fn create(store: &dyn Store, new: Ingredient) -> Result<Ingredient, AppError> {
        store.create_ingredient(new).await
    }

    async fn update(
        store: &dyn Store,
        nome: &str,
        changes: IngredientChanges,
    ) -> Result<Option<Ingredient>, AppError> {
        store.update_ingredient(nome, changes).await
    }

    async fn delete(store: &dyn Store, nome: &str) -> Result<bool, AppError> {
        store.delete_ingredient(nome).await
    }
}

/// `/ricette/`
pub struct Recipes;

#[async_trait]
impl Resource for Recipes {
    const LABEL: &'static str = "ricetta";

    type Record = Recipe;
    type Filter = RecipeFilter;
    type Changes = RecipeChanges;

    fn filter(params: &HashMap<String, String>) -> RecipeFilter {
        RecipeFilter::from_params(params)
    }

    fn new_record(body: &Body) -> Result<Recipe, AppError> {
        convert::new_recipe(body)
    }

    fn changes(body: &Body, mode: Mode) -> Result<RecipeChanges, AppError> {
        convert::recipe_changes(body, mode)
    }

    async fn list(store: &dyn Store, filter: &RecipeFilter) -> Result<Vec<Recipe>, AppError> {
        store.list_recipes(filter).await
    }

    async fn get(store: &dyn Store, nome: &str) -> Result<Option<Recipe>, AppError> {
        store.get_recipe(nome).await
    }

    async fn create(store: &dyn Store, new: Recipe) -> Result<Recipe, AppError> {
        store.create_recipe(new).await
    }

    async fn update(
        store: &dyn Store,
        nome: &str,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>, AppError> {
        store.update_recipe(nome, changes).await
    }

    async fn delete(store: &dyn Store, nome: &str) -> Result<bool, AppError> {
        store.delete_recipe(nome).await
    }
}

/// `/ristoranti/`
pub struct Restaurants;

#[async_trait]
impl Resource for Restaurants {
    const LABEL: &'static str = "ristorante";

    type Record = Restaurant;
    type Filter = RestaurantFilter;
    type Changes = RestaurantChanges;

    fn filter(params: &HashMap<String, String>) -> RestaurantFilter {
        RestaurantFilter::from_params(params)
    }

    fn new_record(body: &Body) -> Result<Restaurant, AppError> {
        convert::new_restaurant(body)
    }

    fn changes(body: &Body, mode: Mode) -> Result<RestaurantChanges, AppError> {
        convert::restaurant_changes(body, mode)
    }

    async fn list(store: &dyn Store, filter: &RestaurantFilter) -> Result<Vec<Restaurant>, AppError> {
        store.list_restaurants(filter).await
    }

    async fn get(store: &dyn Store, nome: &str) -> Result<Option<Restaurant>, AppError> {
        store.get_restaurant(nome).await
    }

    async fn create(store: &dyn Store, new: Restaurant) -> Result<Restaurant, AppError> {
        store.create_restaurant(new).await
    }

    async fn update(
        store: &dyn Store,
        nome: &str,
        changes: RestaurantChanges,
    ) -> Result<Option<Restaurant>, AppError> {
        store.update_restaurant(nome, changes).await
    }

    async fn delete(store: &dyn Store, nome: &str) -> Result<bool, AppError> {
        store.delete_restaurant(nome).await
    }
}

fn not_found<R: Resource>(nome: &str) -> AppError {
    AppError::NotFound(format!("{} '{}'", R::LABEL, nome))
}

pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = R::filter(&params);
    let rows = R::list(state.store.as_ref(), &filter).await?;
    Ok(ok(rows))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Payload(body): Payload,
) -> Result<impl IntoResponse, AppError> {
    let new = R::new_record(&body)?;
    let row = R::create(state.store.as_ref(), new).await?;
    Ok(created(row))
}

pub async fn retrieve<R: Resource>(
    State(state): State<AppState>,
    Path(nome): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let row = R::get(state.store.as_ref(), &nome)
        .await?
        .ok_or_else(|| not_found::<R>(&nome))?;
    Ok(ok(row))
}

/// The target must exist before the body is looked at: an unknown name is 404 whatever the body.
async fn apply_update<R: Resource>(
    state: AppState,
    nome: String,
    body: Body,
    mode: Mode,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    if R::get(store, &nome).await?.is_none() {
        return Err(not_found::<R>(&nome));
    }
    let changes = R::changes(&body, mode)?;
    let row = R::update(store, &nome, changes)
        .await?
        .ok_or_else(|| not_found::<R>(&nome))?;
    Ok(ok(row))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(nome): Path<String>,
    Payload(body): Payload,
) -> Result<impl IntoResponse, AppError> {
    apply_update::<R>(state, nome, body, Mode::Full).await
}

pub async fn partial_update<R: Resource>(
    State(state): State<AppState>,
    Path(nome): Path<String>,
    Payload(body): Payload,
) -> Result<impl IntoResponse, AppError> {
    apply_update::<R>(state, nome, body, Mode::Partial).await
}

pub async fn destroy<R: Resource>(
    State(state): State<AppState>,
    Path(nome): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !R::delete(state.store.as_ref(), &nome).await? {
        return Err(not_found::<R>(&nome));
    }
    Ok(no_content())
}
