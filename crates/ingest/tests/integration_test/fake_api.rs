use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use skillboard_core::config::AdzunaConfig;

pub const APP_ID: &str = "test-id";
pub const APP_KEY: &str = "test-key";

/// Scripted Adzuna stand-in.
#[derive(Clone, Default)]
pub struct FakeApi {
    /// Number of leading attempts per page that answer 503.
    pub failures: Arc<HashMap<u32, u32>>,
    /// Pages answered with a body that has no `results` key.
    pub empty_pages: Arc<HashSet<u32>>,
    pub calls: Arc<Mutex<HashMap<u32, u32>>>,
    pub last_query: Arc<Mutex<HashMap<String, String>>>,
}

impl FakeApi {
    pub fn failing(pages: &[(u32, u32)]) -> Self {
        Self {
            failures: Arc::new(pages.iter().copied().collect()),
            ..Self::default()
        }
    }

    pub fn calls_for(&self, page: u32) -> u32 {
        self.calls.lock().unwrap().get(&page).copied().unwrap_or(0)
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn serve(self) -> String {
        let app = Router::new()
            .route("/{country}/search/{page}", get(search))
            .with_state(self);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn search(
    State(api): State<FakeApi>,
    Path((country, page)): Path<(String, u32)>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    *api.last_query.lock().unwrap() = query.clone();

    if query.get("app_id").map(String::as_str) != Some(APP_ID)
        || query.get("app_key").map(String::as_str) != Some(APP_KEY)
    {
        return (StatusCode::UNAUTHORIZED, "bad credentials").into_response();
    }

    let attempt = {
        let mut calls = api.calls.lock().unwrap();
        let count = calls.entry(page).or_default();
        *count += 1;
        *count
    };
    if attempt <= api.failures.get(&page).copied().unwrap_or(0) {
        return (StatusCode::SERVICE_UNAVAILABLE, "try again later").into_response();
    }
    if api.empty_pages.contains(&page) {
        return Json(json!({ "count": 0 })).into_response();
    }

    Json(json!({
        "count": 1000,
        "results": [
            { "id": format!("{country}-{page}-a"), "title": "Rust Engineer" },
            { "id": format!("{country}-{page}-b"), "title": "Python Developer" },
        ]
    }))
    .into_response()
}

pub fn config(base_url: &str, max_pages: u32) -> AdzunaConfig {
    AdzunaConfig {
        app_id: Some(APP_ID.into()),
        app_key: Some(APP_KEY.into()),
        base_url: base_url.to_string(),
        country: "us".into(),
        query: "software".into(),
        location: String::new(),
        results_per_page: 2,
        max_pages,
        max_retries: 3,
        rate_limit_ms: 1,
    }
}
