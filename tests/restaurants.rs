mod common;

use axum::http::{Method, StatusCode};
use common::{names, nomi, TestApp};
use serde_json::json;

#[tokio::test]
async fn list_and_filters() {
    let app = TestApp::seeded().await;
    let (status, body) = app.get("/ristoranti/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nomi(&body), names(&["Da Mario", "La Pergola"]));
    assert_eq!(body[0]["ricette"], json!(["Pizza Margherita"]));

    let (_, body) = app.get("/ristoranti/?nome_ristorante=La%20Pergola").await;
    assert_eq!(nomi(&body), names(&["La Pergola"]));

    let (_, body) = app.get("/ristoranti/?nome_ricetta=Pizza%20Margherita").await;
    assert_eq!(nomi(&body), names(&["Da Mario"]));
}

#[tokio::test]
async fn retrieve_without_trailing_slash() {
    let app = TestApp::seeded().await;
    let (status, body) = app.get("/ristoranti/Da%20Mario").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"nome": "Da Mario", "indirizzo": "Via Roma 1", "ricette": ["Pizza Margherita"]})
    );
}

#[tokio::test]
async fn create_with_recipes() {
    let app = TestApp::seeded().await;
    let (status, body) = app
        .form(
            Method::POST,
            "/ristoranti/",
            "nome=Trattoria&indirizzo=Via+Po+3&ricette=Pizza+Margherita&ricette=Insalata+Caprese",
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["ricette"], json!(["Insalata Caprese", "Pizza Margherita"]));

    let (_, body) = app.get("/ristoranti/?nome_ricetta=Insalata%20Caprese").await;
    assert_eq!(nomi(&body), names(&["La Pergola", "Trattoria"]));
}

#[tokio::test]
async fn create_requires_name_and_address() {
    let app = TestApp::seeded().await;
    let (status, body) = app.json(Method::POST, "/ristoranti/", json!({"ricette": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["nome"].is_array());
    assert!(body["error"]["details"]["indirizzo"].is_array());
}

#[tokio::test]
async fn create_duplicate_or_unknown_recipe_fails() {
    let app = TestApp::seeded().await;
    let (status, _) = app
        .json(Method::POST, "/ristoranti/", json!({"nome": "Da Mario", "indirizzo": "Via Nuova 9"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            Method::POST,
            "/ristoranti/",
            json!({"nome": "Osteria", "indirizzo": "Via Po 3", "ricette": ["Carbonara"]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["ricette"].is_array());
    let (_, body) = app.get("/ristoranti/").await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn address_longer_than_limit_is_rejected() {
    let app = TestApp::empty();
    let (status, _) = app
        .json(Method::POST, "/ristoranti/", json!({"nome": "Osteria", "indirizzo": "x".repeat(101)}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_address_keeps_name_and_recipes() {
    let app = TestApp::seeded().await;
    let (status, body) = app
        .json(Method::PATCH, "/ristoranti/Da%20Mario/", json!({"indirizzo": "Via Garibaldi 7"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"nome": "Da Mario", "indirizzo": "Via Garibaldi 7", "ricette": ["Pizza Margherita"]})
    );
}

#[tokio::test]
async fn put_without_recipes_keeps_them() {
    let app = TestApp::seeded().await;
    let (status, body) = app
        .json(
            Method::PUT,
            "/ristoranti/La%20Pergola/",
            json!({"nome": "La Pergola", "indirizzo": "Via Milano 4"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ricette"], json!(["Insalata Caprese"]));
}

#[tokio::test]
async fn delete_keeps_recipes() {
    let app = TestApp::seeded().await;
    let (_, before) = app.get("/ristoranti/").await;
    let (status, _) = app.delete("/ristoranti/Da%20Mario/").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, after) = app.get("/ristoranti/").await;
    assert_eq!(after.as_array().unwrap().len(), before.as_array().unwrap().len() - 1);

    let (_, recipes) = app.get("/ricette/").await;
    assert!(nomi(&recipes).contains(&"Pizza Margherita".to_string()));
}
