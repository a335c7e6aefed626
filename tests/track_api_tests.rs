// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end tests for the intake tracking endpoints.

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use food_ledger::db::NutritionStore;
use serde_json::json;

mod common;
use common::{create_offline_app, create_test_app, post_json, Reply, EGGS_AND_TOAST};

fn eggs() -> Reply {
    Reply::Raw(EGGS_AND_TOAST.to_string())
}

fn png_data_url() -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG test image"))
}

#[tokio::test]
async fn test_track_food_via_extractor() {
    let app = create_test_app(eggs());

    let (status, body) = post_json(
        &app.router,
        "/trackFood",
        json!({"uid": "user-1", "text": "two scrambled eggs and toast"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(app.extractor.calls(), 1);
    assert_eq!(body["source"], "extractor-text");
    assert_eq!(body["nutrition"]["calories"], 220.0);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["message"],
        "Tracked: 2 scrambled eggs - 140 cal, 1g carbs, 12g protein, 0g fiber, 10g fat; \
         1 toast - 80 cal, 15g carbs, 3g protein, 1g fiber, 1g fat. \
         Total: 220 cal, 16g carbs, 15g protein, 1g fiber, 11g fat."
    );

    // Budget reduced by exactly the reported totals
    let goal = &body["goal"]["goal"];
    let remaining = &body["goal"]["remaining"];
    for (field, amount) in [
        ("calories", 220.0),
        ("carbs", 16.0),
        ("protein", 15.0),
        ("fiber", 1.0),
        ("fat", 11.0),
    ] {
        let delta = goal[field].as_f64().unwrap() - remaining[field].as_f64().unwrap();
        assert_eq!(delta, amount, "field {}", field);
    }

    let rows = body["nutrients"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["key"], "calories");
    assert_eq!(rows[0]["consumed"], 220);

    assert_eq!(app.store.food_log_count(), 1);
    assert_eq!(app.store.goal_count(), 1);
}

#[tokio::test]
async fn test_brand_match_bypasses_extractor() {
    let app = create_test_app(eggs());

    let (status, body) = post_json(
        &app.router,
        "/trackFood",
        json!({"uid": "user-1", "text": "I had a ZestBev Citrus Kick"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.extractor.calls(), 0);
    assert_eq!(body["source"], "brand-catalog");
    assert_eq!(body["items"][0]["name"], "ZestBev Citrus Kick");
    assert_eq!(body["items"][0]["quantity"], 1.0);
    assert_eq!(body["nutrition"]["calories"], 100.0);
}

#[tokio::test]
async fn test_two_brand_matches_sum_totals() {
    let app = create_test_app(eggs());

    let (status, body) = post_json(
        &app.router,
        "/trackFood",
        json!({"uid": "user-1", "text": "a crunchco granola bar with a zestbev citrus kick"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nutrition"]["calories"], 220.0);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_extractor_output_mutates_nothing() {
    let app = create_test_app(Reply::Raw(
        "I think that was about 300 calories?".to_string(),
    ));

    let (status, body) = post_json(
        &app.router,
        "/trackFood",
        json!({"uid": "user-1", "text": "some stew"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "extraction_parse_error");
    assert_eq!(body["retryable"], true);
    assert!(body["message"].as_str().unwrap().contains("clearer"));

    assert_eq!(app.store.food_log_count(), 0);
    assert_eq!(app.store.goal_count(), 0);
    let today = app.state.intake.ledger_date(chrono::Utc::now());
    assert!(app.store.read_goal("user-1", &today).await.unwrap().is_none());
}

#[tokio::test]
async fn test_negative_extractor_numbers_rejected() {
    let app = create_test_app(Reply::Raw(
        r#"{"items": [{"name": "void", "quantity": 1, "calories": -50}]}"#.to_string(),
    ));

    let (status, body) = post_json(
        &app.router,
        "/trackFood",
        json!({"uid": "user-1", "text": "antimatter"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["details"].as_str().unwrap().contains("calories"));
    assert_eq!(app.store.food_log_count(), 0);
}

#[tokio::test]
async fn test_extractor_outage_is_infrastructure_error() {
    let app = create_test_app(Reply::Unavailable);

    let (status, body) = post_json(
        &app.router,
        "/trackFood",
        json!({"uid": "user-1", "text": "an apple"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "extractor_error");
    assert!(!body["message"].as_str().unwrap().contains("clearer"));
    assert_eq!(app.store.goal_count(), 0);
}

#[tokio::test]
async fn test_missing_fields_rejected_before_extraction() {
    let app = create_test_app(eggs());

    for payload in [
        json!({"text": "an apple"}),
        json!({"uid": "user-1"}),
        json!({"uid": "", "text": "an apple"}),
        json!({"uid": 42, "text": "an apple"}),
    ] {
        let (status, body) = post_json(&app.router, "/trackFood", payload.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["error"], "invalid_input");
    }

    assert_eq!(app.extractor.calls(), 0);
    assert_eq!(app.store.goal_count(), 0);
}

#[tokio::test]
async fn test_retry_with_request_id_is_idempotent() {
    let app = create_test_app(eggs());
    let payload = json!({"uid": "user-1", "text": "eggs and toast", "requestId": "msg-17"});

    let (_, first) = post_json(&app.router, "/trackFood", payload.clone()).await;
    let (status, second) = post_json(&app.router, "/trackFood", payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["entryId"], second["entryId"]);
    assert_eq!(first["goal"], second["goal"]);
    assert_eq!(app.store.food_log_count(), 1);
}

#[tokio::test]
async fn test_track_food_image() {
    let app = create_test_app(eggs());

    let (status, body) = post_json(
        &app.router,
        "/trackFoodImage",
        json!({
            "uid": "user-1",
            "image": png_data_url(),
            "imageUrl": "https://storage.example.com/chat-images/user-1.png"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["source"], "extractor-vision");
    assert_eq!(body["nutrition"]["calories"], 220.0);

    let logs = app.store.list_food_logs("user-1", None, 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].input, "[Image]");
    assert_eq!(
        logs[0].image_url.as_deref(),
        Some("https://storage.example.com/chat-images/user-1.png")
    );
}

#[tokio::test]
async fn test_invalid_image_payloads_rejected() {
    let app = create_test_app(eggs());
    let oversized = format!(
        "data:image/png;base64,{}",
        STANDARD.encode(vec![0u8; app.state.config.max_image_bytes + 1])
    );

    for image in [
        "".to_string(),
        "https://example.com/photo.png".to_string(),
        "data:image/bmp;base64,AAAA".to_string(),
        "data:image/png;base64,@@@@".to_string(),
        oversized,
    ] {
        let (status, body) = post_json(
            &app.router,
            "/trackFoodImage",
            json!({"uid": "user-1", "image": image}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_input");
    }

    let (status, _) = post_json(
        &app.router,
        "/trackFoodImage",
        json!({"image": png_data_url()}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.extractor.calls(), 0);
}

#[tokio::test]
async fn test_store_outage_returns_503() {
    let (router, _state) = create_offline_app(eggs());

    let (status, body) = post_json(
        &router,
        "/trackFood",
        json!({"uid": "user-1", "text": "eggs and toast"}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "store_unavailable");
    assert_eq!(body["retryable"], true);
    assert!(body.get("details").is_none());
}
