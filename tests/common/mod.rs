#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use catalog_server::config::AppConfig;
use catalog_server::startup::{build_router, setup_backend};
use serde_json::{json, Value};
use std::sync::Arc;

/// In-memory SQLite configuration with the stock pagination and language defaults
pub fn create_test_app_config() -> AppConfig {
    AppConfig::default_config()
}

/// Build the full application against a fresh in-memory database
pub async fn setup_test_app(app_config: AppConfig) -> Result<Router, Box<dyn std::error::Error>> {
    let backend = setup_backend(&app_config).await?;
    Ok(build_router(backend, Arc::new(app_config)))
}

pub async fn setup_test_server() -> TestServer {
    let app = setup_test_app(create_test_app_config()).await.unwrap();
    TestServer::new(app).unwrap()
}

pub fn create_test_movie_json(
    duration: i64,
    genres: &[&str],
    release_date: &str,
    names: &[(&str, &str)],
) -> Value {
    let translations: Vec<Value> = names
        .iter()
        .map(|(language, name)| json!({"language": language, "name": name}))
        .collect();
    json!({
        "duration": duration,
        "genres": genres,
        "release_date": release_date,
        "age_rating": 12,
        "translations": translations,
    })
}

/// POST an entry and return its id
pub async fn create_entry(server: &TestServer, kind: &str, body: &Value) -> i64 {
    let response = server.post(&format!("/api/v1/{}", kind)).json(body).await;
    response.assert_status(http::StatusCode::CREATED);
    response.json::<Value>()["id"].as_i64().unwrap()
}

/// Three movies:
/// - Alpha: 50 min, Drama + Horror, en-US and es-ES
/// - Bravo: 60 min, Drama, en-US, es-ES and fr-FR
/// - Charlie: 90 min, Comedy, en-US only
pub async fn seed_movies(server: &TestServer) -> Vec<i64> {
    let movies = [
        create_test_movie_json(
            50,
            &["Drama", "Horror"],
            "2019-03-01",
            &[("en-US", "Alpha"), ("es-ES", "Alfa")],
        ),
        create_test_movie_json(
            60,
            &["Drama"],
            "2020-06-15",
            &[("en-US", "Bravo"), ("es-ES", "Bravo ES"), ("fr-FR", "Bravo FR")],
        ),
        create_test_movie_json(90, &["Comedy"], "2021-12-24", &[("en-US", "Charlie")]),
    ];

    let mut ids = Vec::new();
    for movie in &movies {
        ids.push(create_entry(server, "movies", movie).await);
    }
    ids
}

/// English names of the returned items, in response order
pub fn item_names(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["translations"][0]["name"].as_str().unwrap().to_string())
        .collect()
}
