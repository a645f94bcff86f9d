//! Restaurant manager: REST backend for ingredients, recipes and restaurants.
//!
//! Each resource is a named record; recipes link to ingredients and restaurants link to
//! recipes through explicit join relations. Collections filter on related names through
//! the `nome_ingrediente`, `nome_ricetta` and `nome_ristorante` query parameters.

pub mod config;
pub mod error;
pub mod extractors;
pub mod filter;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{Settings, StoreBackend};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use routes::{app, common_routes, resource_routes};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store};
