//! Persistence for ingredients, recipes and restaurants.
//!
//! Two backends share one contract: [`PgStore`] on PostgreSQL and [`MemoryStore`] in process.
//! Lookups return `Ok(None)` / `Ok(false)` for unknown names; handlers turn that into 404.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::filter::{IngredientFilter, RecipeFilter, RestaurantFilter};
use crate::model::{
    Ingredient, IngredientChanges, Recipe, RecipeChanges, Restaurant, RestaurantChanges,
};
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness check for readiness probes.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list_ingredients(&self, filter: &IngredientFilter) -> Result<Vec<Ingredient>, AppError>;
    async fn get_ingredient(&self, nome: &str) -> Result<Option<Ingredient>, AppError>;
    /// Fails with `Conflict` when the name is taken.
    async fn create_ingredient(&self, new: Ingredient) -> Result<Ingredient, AppError>;
    async fn update_ingredient(
        &self,
        nome: &str,
        changes: IngredientChanges,
    ) -> Result<Option<Ingredient>, AppError>;
    /// Also drops the ingredient from every recipe.
    async fn delete_ingredient(&self, nome: &str) -> Result<bool, AppError>;

    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, AppError>;
    async fn get_recipe(&self, nome: &str) -> Result<Option<Recipe>, AppError>;
    /// Every ingredient name must exist.
    async fn create_recipe(&self, new: Recipe) -> Result<Recipe, AppError>;
    async fn update_recipe(&self, nome: &str, changes: RecipeChanges) -> Result<Option<Recipe>, AppError>;
    /// Also drops the recipe from every restaurant.
    async fn delete_recipe(&self, nome: &str) -> Result<bool, AppError>;

    async fn list_restaurants(&self, filter: &RestaurantFilter) -> Result<Vec<Restaurant>, AppError>;
    async fn get_restaurant(&self, nome: &str) -> Result<Option<Restaurant>, AppError>;
    /// Every recipe name must exist.
    async fn create_restaurant(&self, new: Restaurant) -> Result<Restaurant, AppError>;
    async fn update_restaurant(
        &self,
        nome: &str,
        changes: RestaurantChanges,
    ) -> Result<Option<Restaurant>, AppError>;
    async fn delete_restaurant(&self, nome: &str) -> Result<bool, AppError>;
}

pub(crate) fn duplicate(resource: &str) -> AppError {
    AppError::Conflict(format!("{} with this nome already exists", resource))
}

/// Reject association targets that do not exist.
pub(crate) fn missing_refs(field: &str, missing: &[String]) -> Result<(), AppError> {
    if missing.is_empty() {
        return Ok(());
    }
    let messages = missing
        .iter()
        .map(|n| format!("Invalid pk \"{}\" - object does not exist.", n))
        .collect();
    let mut fields = crate::error::FieldErrors::new();
    fields.insert(field.to_string(), messages);
    Err(AppError::InvalidFields(fields))
}
