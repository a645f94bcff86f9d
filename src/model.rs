//! Resource records and change sets. Field names are the wire names.

use serde::{Deserialize, Serialize};

/// Maximum length, in characters, of every stored text column.
pub const MAX_TEXT_LEN: usize = 100;

/// Body fields that always carry a list of names.
pub const LIST_FIELDS: &[&str] = &["ingredienti", "ricette"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub nome: String,
    pub produttore: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub nome: String,
    /// Names of associated ingredients, ascending.
    pub ingredienti: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub nome: String,
    pub indirizzo: String,
    /// Names of served recipes, ascending.
    pub ricette: Vec<String>,
}

/// Fields to change on an ingredient; `None` leaves the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngredientChanges {
    pub nome: Option<String>,
    pub produttore: Option<String>,
}

/// Fields to change on a recipe. `Some` ingredient list replaces the stored set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub nome: Option<String>,
    pub ingredienti: Option<Vec<String>>,
}

/// Fields to change on a restaurant. `Some` recipe list replaces the stored set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestaurantChanges {
    pub nome: Option<String>,
    pub indirizzo: Option<String>,
    pub ricette: Option<Vec<String>>,
}

/// Sort and deduplicate a set of names.
pub fn normalize_names(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}
