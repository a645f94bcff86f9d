#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use restaurant_manager::model::{Ingredient, Recipe, Restaurant};
use restaurant_manager::{app, apply_migrations, AppState, MemoryStore, PgStore, Store};
use sqlx::postgres::PgPoolOptions;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const BODY_LIMIT: usize = 64 * 1024;

pub struct TestApp {
    pub store: Arc<dyn Store>,
    pub router: Router,
}

pub fn names(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

impl TestApp {
    pub fn empty() -> Self {
        Self::with_prefix("")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), prefix)
    }

    pub fn with_store(store: Arc<dyn Store>, prefix: &str) -> Self {
        let state = AppState::new(store.clone(), prefix);
        Self {
            store,
            router: app(state, BODY_LIMIT),
        }
    }

    /// Fresh `schema` on the server named by `TEST_DATABASE_URL`; `None` when it is unset.
    pub async fn postgres(schema: &str) -> Option<Self> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = PgPoolOptions::new().max_connections(2).connect(&url).await.unwrap();
        sqlx::query(&format!("DROP SCHEMA IF EXISTS \"{}\" CASCADE", schema))
            .execute(&pool)
            .await
            .unwrap();
        apply_migrations(&pool, schema).await.unwrap();
        Some(Self::with_store(Arc::new(PgStore::new(pool, schema)), ""))
    }

    /// Pomodoro, Mozzarella; Pizza Margherita and Insalata Caprese (both ingredients);
    /// Da Mario serves Pizza Margherita, La Pergola serves Insalata Caprese.
    pub async fn seeded() -> Self {
        Self::empty().seed().await
    }

    pub async fn seed(self) -> Self {
        let app = self;
        for nome in ["Pomodoro", "Mozzarella"] {
            app.store
                .create_ingredient(Ingredient {
                    nome: nome.into(),
                    produttore: "Produttore Locale".into(),
                })
                .await
                .unwrap();
        }
        for nome in ["Pizza Margherita", "Insalata Caprese"] {
            app.store
                .create_recipe(Recipe {
                    nome: nome.into(),
                    ingredienti: names(&["Mozzarella", "Pomodoro"]),
                })
                .await
                .unwrap();
        }
        for (nome, indirizzo, ricetta) in [
            ("Da Mario", "Via Roma 1", "Pizza Margherita"),
            ("La Pergola", "Via Milano 2", "Insalata Caprese"),
        ] {
            app.store
                .create_restaurant(Restaurant {
                    nome: nome.into(),
                    indirizzo: indirizzo.into(),
                    ricette: names(&[ricetta]),
                })
                .await
                .unwrap();
        }
        app
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// POST with a JSON body and no `Content-Length`, so the size limit applies while streaming.
    pub async fn post_unsized(&self, uri: &str, body: Vec<u8>) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    pub async fn form(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }
}

/// `nome` of every item in a list response.
pub fn nomi(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["nome"].as_str().unwrap().to_string())
        .collect()
}
