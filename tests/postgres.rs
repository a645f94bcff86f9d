//! `PgStore` through the router. Runs only when `TEST_DATABASE_URL` points at a server;
//! each test works in its own schema.

mod common;

use axum::http::{Method, StatusCode};
use common::{names, nomi, TestApp};
use serde_json::json;

async fn seeded(schema: &str) -> Option<TestApp> {
    Some(TestApp::postgres(schema).await?.seed().await)
}

#[tokio::test]
async fn recipe_filter_and_aggregated_ingredients() {
    let Some(app) = seeded("rm_test_recipes").await else {
        return;
    };
    let (status, body) = app.get("/ricette/?nome_ingrediente=Pomodoro").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nomi(&body), names(&["Insalata Caprese", "Pizza Margherita"]));
    assert_eq!(body[1]["ingredienti"], json!(["Mozzarella", "Pomodoro"]));

    let (_, body) = app.get("/ricette/?nome_ristorante=La%20Pergola").await;
    assert_eq!(nomi(&body), names(&["Insalata Caprese"]));
}

#[tokio::test]
async fn ingredient_filters_share_one_recipe() {
    let Some(app) = seeded("rm_test_ingredients").await else {
        return;
    };
    let (_, body) = app.get("/ingredienti/?nome_ristorante=Da%20Mario").await;
    assert_eq!(nomi(&body), names(&["Mozzarella", "Pomodoro"]));

    let (_, body) = app
        .get("/ingredienti/?nome_ricetta=Insalata%20Caprese&nome_ristorante=Da%20Mario")
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn rename_cascades_into_links() {
    let Some(app) = seeded("rm_test_rename").await else {
        return;
    };
    let (status, _) = app
        .json(Method::PATCH, "/ricette/Pizza%20Margherita/", json!({"nome": "Margherita"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/ristoranti/Da%20Mario/").await;
    assert_eq!(body["ricette"], json!(["Margherita"]));
    let (_, body) = app.get("/ricette/Margherita/").await;
    assert_eq!(body["ingredienti"], json!(["Mozzarella", "Pomodoro"]));

    let (status, body) = app
        .json(Method::PATCH, "/ricette/Margherita/", json!({"nome": "Insalata Caprese"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "conflict");
}

#[tokio::test]
async fn failed_link_write_rolls_back() {
    let Some(app) = seeded("rm_test_rollback").await else {
        return;
    };
    let (status, _) = app
        .json(Method::POST, "/ricette/", json!({"nome": "Tiramisù", "ingredienti": ["Mascarpone"]}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/ricette/Tiramis%C3%B9/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .json(
            Method::PATCH,
            "/ricette/Pizza%20Margherita/",
            json!({"nome": "Margherita", "ingredienti": ["Mascarpone"]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = app.get("/ricette/Pizza%20Margherita/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingredienti"], json!(["Mozzarella", "Pomodoro"]));
}

#[tokio::test]
async fn delete_removes_links_only() {
    let Some(app) = seeded("rm_test_delete").await else {
        return;
    };
    let (status, _) = app.delete("/ingredienti/Mozzarella/").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = app.get("/ricette/").await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["ingredienti"], json!(["Pomodoro"]));

    let (status, _) = app.delete("/ristoranti/Da%20Mario/").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get("/ricette/Pizza%20Margherita/").await;
    assert_eq!(status, StatusCode::OK);
}
