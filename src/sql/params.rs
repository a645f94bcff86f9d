//! Values bound to PostgreSQL queries.

use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// A value that can be bound to a query parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    /// Bound as `text[]`.
    TextList(Vec<String>),
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::Text(s.to_string())
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::Text(s)
    }
}

impl From<&[String]> for BindValue {
    fn from(v: &[String]) -> Self {
        BindValue::TextList(v.to_vec())
    }
}

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Bind params in order ($1, $2, ...).
pub fn bind_params<'q>(mut query: PgQuery<'q>, params: &'q [BindValue]) -> PgQuery<'q> {
    for p in params {
        query = match p {
            BindValue::Text(s) => query.bind(s.as_str()),
            BindValue::TextList(v) => query.bind(v.as_slice()),
        };
    }
    query
}
