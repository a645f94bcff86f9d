//! Runtime settings.

use std::net::SocketAddr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local storage; contents are lost on exit.
    Memory,
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Required for [`StoreBackend::Postgres`].
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    /// PostgreSQL schema holding the tables.
    pub db_schema: String,
    pub max_connections: u32,
    /// Mount point of the resource routes, e.g. `/restaurant_manager`. Empty mounts at root.
    pub api_prefix: String,
    pub body_limit: usize,
    pub backend: StoreBackend,
}

pub const DEFAULT_SCHEMA: &str = "restaurant_manager";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT: usize = 64 * 1024;

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            db_schema: DEFAULT_SCHEMA.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            api_prefix: String::new(),
            body_limit: DEFAULT_BODY_LIMIT,
            backend: StoreBackend::Postgres,
        }
    }
}
