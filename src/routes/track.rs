// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Intake tracking endpoints used by the chat client.

use crate::error::{AppError, Result};
use crate::models::{FoodItem, GoalState, LogSource, NutrientVector};
use crate::services::{ImageIntake, NutrientDisplay, TextIntake, TrackOutcome};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Longest accepted free-text report, in characters.
const MAX_TEXT_CHARS: u64 = 2000;
/// Longest accepted client request ID.
const MAX_REQUEST_ID_CHARS: u64 = 128;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trackFood", post(track_food))
        .route("/trackFoodImage", post(track_food_image))
}

// ─── Requests ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackFoodRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing uid"))]
    pub uid: String,
    #[serde(default)]
    #[validate(length(min = 1, max = MAX_TEXT_CHARS, message = "Text must be 1-2000 characters"))]
    pub text: String,
    #[validate(length(max = MAX_REQUEST_ID_CHARS))]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrackFoodImageRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing uid"))]
    pub uid: String,
    /// `data:image/<type>;base64,<payload>`
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing image data"))]
    pub image: String,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(max = MAX_REQUEST_ID_CHARS))]
    pub request_id: Option<String>,
}

/// Unwrap a JSON body and run its field validators.
fn validated<T: Validate>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    let Json(body) =
        payload.map_err(|e| AppError::InvalidInput(format!("Invalid request body: {}", e)))?;
    body.validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    Ok(body)
}

// ─── Response ────────────────────────────────────────────────

/// Reply to a tracked intake.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TrackFoodResponse {
    /// Chat reply, e.g. "Tracked: 1 apple - 95 cal, ... Total: ..."
    pub message: String,
    pub items: Vec<FoodItem>,
    /// Totals deducted from today's budget
    pub nutrition: NutrientVector,
    pub goal: GoalState,
    /// Progress rows for the goal summary
    pub nutrients: Vec<NutrientDisplay>,
    pub source: LogSource,
    pub entry_id: String,
    pub date: String,
}

impl From<TrackOutcome> for TrackFoodResponse {
    fn from(outcome: TrackOutcome) -> Self {
        let message = outcome.message();
        Self {
            message,
            items: outcome.entry.items,
            nutrition: outcome.entry.totals,
            goal: outcome.state,
            nutrients: outcome.nutrients,
            source: outcome.entry.source,
            entry_id: outcome.entry.entry_id,
            date: outcome.entry.date,
        }
    }
}

// ─── Handlers ────────────────────────────────────────────────

/// Track a free-text intake report.
async fn track_food(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TrackFoodRequest>, JsonRejection>,
) -> Result<Json<TrackFoodResponse>> {
    let req = validated(payload)?;

    let outcome = state
        .intake
        .track_text(TextIntake {
            user_id: &req.uid,
            text: &req.text,
            request_id: req.request_id.as_deref(),
        })
        .await?;

    Ok(Json(outcome.into()))
}

/// Track a photo intake report.
async fn track_food_image(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TrackFoodImageRequest>, JsonRejection>,
) -> Result<Json<TrackFoodResponse>> {
    let req = validated(payload)?;

    let outcome = state
        .intake
        .track_image(ImageIntake {
            user_id: &req.uid,
            data_url: &req.image,
            image_url: req.image_url.as_deref(),
            request_id: req.request_id.as_deref(),
        })
        .await?;

    Ok(Json(outcome.into()))
}
