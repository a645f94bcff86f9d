//! Relational list filters built from query parameters. All matches are exact.

use std::collections::HashMap;

pub const PARAM_INGREDIENTE: &str = "nome_ingrediente";
pub const PARAM_RICETTA: &str = "nome_ricetta";
pub const PARAM_RISTORANTE: &str = "nome_ristorante";

fn param(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}

/// `ricetta` and `ristorante` must hold for the same associated recipe.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngredientFilter {
    pub nome: Option<String>,
    pub ricetta: Option<String>,
    pub ristorante: Option<String>,
}

impl IngredientFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            nome: param(params, PARAM_INGREDIENTE),
            ricetta: param(params, PARAM_RICETTA),
            ristorante: param(params, PARAM_RISTORANTE),
        }
    }

    pub fn by_name(nome: &str) -> Self {
        Self {
            nome: Some(nome.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub nome: Option<String>,
    pub ristorante: Option<String>,
    pub ingrediente: Option<String>,
}

impl RecipeFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            nome: param(params, PARAM_RICETTA),
            ristorante: param(params, PARAM_RISTORANTE),
            ingrediente: param(params, PARAM_INGREDIENTE),
        }
    }

    pub fn by_name(nome: &str) -> Self {
        Self {
            nome: Some(nome.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RestaurantFilter {
    pub nome: Option<String>,
    pub ricetta: Option<String>,
}

impl RestaurantFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            nome: param(params, PARAM_RISTORANTE),
            ricetta: param(params, PARAM_RICETTA),
        }
    }

    pub fn by_name(nome: &str) -> Self {
        Self {
            nome: Some(nome.to_string()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn ingredient_filter_reads_all_three_params() {
        let f = IngredientFilter::from_params(&params(&[
            ("nome_ingrediente", "Pomodoro"),
            ("nome_ricetta", "Pizza Margherita"),
            ("nome_ristorante", "Da Mario"),
        ]));
        assert_eq!(f.nome.as_deref(), Some("Pomodoro"));
        assert_eq!(f.ricetta.as_deref(), Some("Pizza Margherita"));
        assert_eq!(f.ristorante.as_deref(), Some("Da Mario"));
    }

    #[test]
    fn empty_and_unknown_params_are_ignored() {
        let f = RecipeFilter::from_params(&params(&[("nome_ricetta", ""), ("limit", "5")]));
        assert_eq!(f, RecipeFilter::default());
    }

    #[test]
    fn restaurant_filter_ignores_ingredient_param() {
        let f = RestaurantFilter::from_params(&params(&[
            ("nome_ingrediente", "Pomodoro"),
            ("nome_ricetta", "Insalata Caprese"),
        ]));
        assert_eq!(f.nome, None);
        assert_eq!(f.ricetta.as_deref(), Some("Insalata Caprese"));
    }
}
