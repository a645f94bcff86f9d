//! Request validation against per-resource field rules.

use crate::error::{AppError, FieldErrors};
use crate::model::MAX_TEXT_LEN;
use serde_json::Value;
use std::collections::HashMap;

pub type Body = HashMap<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// List of names referencing another resource.
    TextList,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_length: Option<usize>,
}

const fn text(name: &'static str) -> FieldRule {
    FieldRule {
        name,
        kind: FieldKind::Text,
        required: true,
        max_length: Some(MAX_TEXT_LEN),
    }
}

const fn names(name: &'static str) -> FieldRule {
    FieldRule {
        name,
        kind: FieldKind::TextList,
        required: false,
        max_length: None,
    }
}

pub const INGREDIENT_RULES: &[FieldRule] = &[text("nome"), text("produttore")];
pub const RECIPE_RULES: &[FieldRule] = &[text("nome"), names("ingredienti")];
pub const RESTAURANT_RULES: &[FieldRule] = &[text("nome"), text("indirizzo"), names("ricette")];

/// Full (POST/PUT) enforces required fields; partial (PATCH) checks only what is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate every rule and report all failing fields at once. Fields without a rule are ignored.
    pub fn validate(body: &Body, rules: &[FieldRule], mode: Mode) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        for rule in rules {
            let messages = match body.get(rule.name) {
                None if rule.required && mode == Mode::Full => vec!["This field is required.".to_string()],
                None => continue,
                Some(v) => validate_field(v, rule),
            };
            if !messages.is_empty() {
                errors.insert(rule.name.to_string(), messages);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidFields(errors))
        }
    }
}

fn validate_field(v: &Value, rule: &FieldRule) -> Vec<String> {
    match (rule.kind, v) {
        (_, Value::Null) => vec!["This field may not be null.".to_string()],
        (FieldKind::Text, Value::String(s)) => validate_text(s, rule),
        (FieldKind::Text, _) => vec!["Not a valid string.".to_string()],
        (FieldKind::TextList, Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => None,
                Value::String(_) => Some("Names may not be blank.".to_string()),
                other => Some(format!("Incorrect type. Expected a name, received {}.", type_name(other))),
            })
            .collect(),
        (FieldKind::TextList, other) => vec![format!(
            "Expected a list of items but got type \"{}\".",
            type_name(other)
        )],
    }
}

fn validate_text(s: &str, rule: &FieldRule) -> Vec<String> {
    let mut out = Vec::new();
    if s.trim().is_empty() {
        out.push("This field may not be blank.".to_string());
    }
    if let Some(max) = rule.max_length {
        if s.chars().count() > max {
            out.push(format!("Ensure this field has no more than {} characters.", max));
        }
    }
    out
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Body {
        match v {
            Value::Object(m) => m.into_iter().collect(),
            _ => unreachable!(),
        }
    }

    fn field_errors(err: AppError) -> FieldErrors {
        match err {
            AppError::InvalidFields(f) => f,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn full_mode_reports_every_missing_field() {
        let err = RequestValidator::validate(&body(json!({})), RESTAURANT_RULES, Mode::Full).unwrap_err();
        let fields = field_errors(err);
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["indirizzo", "nome"]);
    }

    #[test]
    fn partial_mode_skips_missing_fields() {
        let b = body(json!({"indirizzo": "Via Po 3"}));
        assert!(RequestValidator::validate(&b, RESTAURANT_RULES, Mode::Partial).is_ok());
    }

    #[test]
    fn associations_are_optional_on_create() {
        let b = body(json!({"nome": "Pizza Margherita"}));
        assert!(RequestValidator::validate(&b, RECIPE_RULES, Mode::Full).is_ok());
    }

    #[test]
    fn length_is_counted_in_characters() {
        let ok = "à".repeat(MAX_TEXT_LEN);
        let b = body(json!({"nome": ok, "produttore": "Esselunga"}));
        assert!(RequestValidator::validate(&b, INGREDIENT_RULES, Mode::Full).is_ok());

        let long = "a".repeat(MAX_TEXT_LEN + 1);
        let b = body(json!({"nome": long, "produttore": "Esselunga"}));
        let fields = field_errors(RequestValidator::validate(&b, INGREDIENT_RULES, Mode::Full).unwrap_err());
        assert_eq!(fields["nome"], vec!["Ensure this field has no more than 100 characters."]);
    }

    #[test]
    fn blank_null_and_wrong_types_are_rejected() {
        let b = body(json!({"nome": "  ", "produttore": null}));
        let fields = field_errors(RequestValidator::validate(&b, INGREDIENT_RULES, Mode::Partial).unwrap_err());
        assert_eq!(fields["nome"], vec!["This field may not be blank."]);
        assert_eq!(fields["produttore"], vec!["This field may not be null."]);

        let b = body(json!({"ingredienti": "Pomodoro"}));
        let fields = field_errors(RequestValidator::validate(&b, RECIPE_RULES, Mode::Partial).unwrap_err());
        assert_eq!(fields["ingredienti"], vec!["Expected a list of items but got type \"str\"."]);

        let b = body(json!({"ingredienti": ["Pomodoro", 3]}));
        let fields = field_errors(RequestValidator::validate(&b, RECIPE_RULES, Mode::Partial).unwrap_err());
        assert_eq!(fields["ingredienti"].len(), 1);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let b = body(json!({"nome": "Basilico", "produttore": "Produttore Locale", "ricette": ["Pizza Margherita"]}));
        assert!(RequestValidator::validate(&b, INGREDIENT_RULES, Mode::Full).is_ok());
    }
}
