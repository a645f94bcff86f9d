//! Shared application state for all routes.

use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Prefix the resource routes are nested under; used to build links in the API root.
    pub api_prefix: String,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, api_prefix: impl Into<String>) -> Self {
        Self {
            store,
            api_prefix: api_prefix.into(),
        }
    }
}
