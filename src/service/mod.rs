//! Request validation and conversion of request bodies into store inputs.

pub mod convert;
mod validation;
pub use validation::{
    Body, FieldKind, FieldRule, Mode, RequestValidator, INGREDIENT_RULES, RECIPE_RULES,
    RESTAURANT_RULES,
};
