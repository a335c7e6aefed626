// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use food_ledger::config::Config;
use food_ledger::db::{FirestoreDb, MemoryStore, NutritionStore};
use food_ledger::error::AppError;
use food_ledger::models::{parse_estimate, NutritionEstimate};
use food_ledger::routes::create_router;
use food_ledger::services::{
    BrandCatalog, DailyGoalLedger, ImagePayload, IntakeService, NutritionExtractor,
};
use food_ledger::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Well-formed extractor reply: two items, 220 calories.
#[allow(dead_code)]
pub const EGGS_AND_TOAST: &str = r#"{
  "items": [
    {"name": "scrambled eggs", "quantity": 2, "calories": 140, "carbs": 1, "protein": 12, "fiber": 0, "fat": 10},
    {"name": "toast", "quantity": 1, "calories": 80, "carbs": 15, "protein": 3, "fiber": 1, "fat": 1}
  ],
  "totals": {"calories": 220, "carbs": 16, "protein": 15, "fiber": 1, "fat": 11}
}"#;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// What the scripted extractor answers with.
#[allow(dead_code)]
#[derive(Clone)]
pub enum Reply {
    /// Raw model output, run through the real parser
    Raw(String),
    /// The extractor endpoint cannot be reached
    Unavailable,
}

/// Extractor double that replays a configured reply and counts calls.
pub struct ScriptedExtractor {
    reply: Mutex<Reply>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedExtractor {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<NutritionEstimate, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply.lock().unwrap().clone() {
            Reply::Raw(raw) => Ok(parse_estimate(&raw)?),
            Reply::Unavailable => Err(AppError::Extractor("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl NutritionExtractor for ScriptedExtractor {
    async fn extract_from_text(&self, _text: &str) -> Result<NutritionEstimate, AppError> {
        self.answer()
    }

    async fn extract_from_image(
        &self,
        _image: &ImagePayload,
    ) -> Result<NutritionEstimate, AppError> {
        self.answer()
    }
}

/// Router plus handles for inspecting what it did.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub extractor: Arc<ScriptedExtractor>,
}

fn build_state(
    store: Arc<dyn NutritionStore>,
    extractor: Arc<ScriptedExtractor>,
) -> Arc<AppState> {
    let config = Config::test_default();
    let catalog = BrandCatalog::load_from_file(&config.brand_catalog_path)
        .expect("Failed to load brand catalog");

    let intake = IntakeService::new(
        extractor,
        Arc::new(catalog),
        DailyGoalLedger::new(store.clone()),
        config.ledger_offset(),
        config.max_image_bytes,
    );

    Arc::new(AppState {
        config,
        store,
        intake,
    })
}

/// Create a test app over the in-memory store and a scripted extractor.
#[allow(dead_code)]
pub fn create_test_app(reply: Reply) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let extractor = Arc::new(ScriptedExtractor::new(reply));
    let state = build_state(store.clone(), extractor.clone());

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        extractor,
    }
}

/// Create a test app whose store is an offline Firestore client.
#[allow(dead_code)]
pub fn create_offline_app(reply: Reply) -> (Router, Arc<AppState>) {
    let extractor = Arc::new(ScriptedExtractor::new(reply));
    let state = build_state(Arc::new(FirestoreDb::new_mock()), extractor);
    (create_router(state.clone()), state)
}

/// POST a JSON body and return the status and parsed response.
#[allow(dead_code)]
pub async fn post_json(
    router: &Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

/// GET a URI and return the status and parsed response.
#[allow(dead_code)]
pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}
