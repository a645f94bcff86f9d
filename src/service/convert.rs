//! Validated request bodies to records and change sets.

use super::validation::{
    Body, Mode, RequestValidator, INGREDIENT_RULES, RECIPE_RULES, RESTAURANT_RULES,
};
use crate::error::AppError;
use crate::model::{
    normalize_names, Ingredient, IngredientChanges, Recipe, RecipeChanges, Restaurant,
    RestaurantChanges,
};
use serde_json::Value;

/// Leading and trailing whitespace is dropped from text fields and from every listed name.
fn trimmed(body: &Body) -> Body {
    body.iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(s) => Value::String(s.trim().to_string()),
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => Value::String(s.trim().to_string()),
                            other => other.clone(),
                        })
                        .collect(),
                ),
                other => other.clone(),
            };
            (k.clone(), v)
        })
        .collect()
}

fn text(body: &Body, field: &str) -> Option<String> {
    body.get(field).and_then(Value::as_str).map(str::to_string)
}

fn name_list(body: &Body, field: &str) -> Option<Vec<String>> {
    let items = body.get(field)?.as_array()?;
    Some(normalize_names(
        items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
    ))
}

/// Pull a field that full-mode validation guarantees.
fn required(body: &Body, field: &str) -> Result<String, AppError> {
    text(body, field).ok_or_else(|| AppError::field(field, "This field is required."))
}

pub fn new_ingredient(body: &Body) -> Result<Ingredient, AppError> {
    let body = &trimmed(body);
    RequestValidator::validate(body, INGREDIENT_RULES, Mode::Full)?;
    Ok(Ingredient {
        nome: required(body, "nome")?,
        produttore: required(body, "produttore")?,
    })
}

pub fn ingredient_changes(body: &Body, mode: Mode) -> Result<IngredientChanges, AppError> {
    let body = &trimmed(body);
    RequestValidator::validate(body, INGREDIENT_RULES, mode)?;
    Ok(IngredientChanges {
        nome: text(body, "nome"),
        produttore: text(body, "produttore"),
    })
}

pub fn new_recipe(body: &Body) -> Result<Recipe, AppError> {
    let body = &trimmed(body);
    RequestValidator::validate(body, RECIPE_RULES, Mode::Full)?;
    Ok(Recipe {
        nome: required(body, "nome")?,
        ingredienti: name_list(body, "ingredienti").unwrap_or_default(),
    })
}

pub fn recipe_changes(body: &Body, mode: Mode) -> Result<RecipeChanges, AppError> {
    let body = &trimmed(body);
    RequestValidator::validate(body, RECIPE_RULES, mode)?;
    Ok(RecipeChanges {
        nome: text(body, "nome"),
        ingredienti: name_list(body, "ingredienti"),
    })
}

pub fn new_restaurant(body: &Body) -> Result<Restaurant, AppError> {
    let body = &trimmed(body);
    RequestValidator::validate(body, RESTAURANT_RULES, Mode::Full)?;
    Ok(Restaurant {
        nome: required(body, "nome")?,
        indirizzo: required(body, "indirizzo")?,
        ricette: name_list(body, "ricette").unwrap_or_default(),
    })
}

pub fn restaurant_changes(body: &Body, mode: Mode) -> Result<RestaurantChanges, AppError> {
    let body = &trimmed(body);
    RequestValidator::validate(body, RESTAURANT_RULES, mode)?;
    Ok(RestaurantChanges {
        nome: text(body, "nome"),
        indirizzo: text(body, "indirizzo"),
        ricette: name_list(body, "ricette"),
    })
}
