// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read API for goals and food logs.

use crate::db::LogCursor;
use crate::error::{AppError, Result};
use crate::models::{FoodLogEntry, NutrientVector};
use crate::services::{display_for, require_user, NutrientDisplay};
use crate::time_utils::parse_ledger_date;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/{uid}/goals/{date}", get(get_goal))
        .route("/api/users/{uid}/food-logs", get(get_food_logs))
}

// ─── Daily Goals ─────────────────────────────────────────────

/// A day's goal with its progress rows.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GoalResponse {
    pub user_id: String,
    pub date: String,
    pub goal: NutrientVector,
    pub remaining: NutrientVector,
    pub nutrients: Vec<NutrientDisplay>,
}

/// Get a user's goal for one day.
///
/// Never creates a goal; days without intake are 404.
async fn get_goal(
    State(state): State<Arc<AppState>>,
    Path((uid, date)): Path<(String, String)>,
) -> Result<Json<GoalResponse>> {
    let uid = require_user(&uid)?.to_string();
    if parse_ledger_date(&date).is_none() {
        return Err(AppError::InvalidInput(
            "Invalid date: must be YYYY-MM-DD".to_string(),
        ));
    }

    let goal_state = state
        .intake
        .ledger()
        .current(&uid, &date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No goal for {} on {}", uid, date)))?;

    Ok(Json(GoalResponse {
        user_id: uid,
        date,
        goal: goal_state.goal,
        remaining: goal_state.remaining,
        nutrients: display_for(&goal_state),
    }))
}

// ─── Food Logs ───────────────────────────────────────────────

#[derive(Deserialize)]
struct FoodLogsQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 100;
const CURSOR_SEPARATOR: char = '|';

fn parse_cursor(cursor: Option<&str>) -> Result<Option<LogCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor = || AppError::InvalidInput("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let (logged_at, entry_id) = decoded_str
                .split_once(CURSOR_SEPARATOR)
                .ok_or_else(invalid_cursor)?;
            if entry_id.is_empty() || chrono::DateTime::parse_from_rfc3339(logged_at).is_err() {
                return Err(invalid_cursor());
            }

            Ok(LogCursor {
                logged_at: logged_at.to_string(),
                entry_id: entry_id.to_string(),
            })
        })
        .transpose()
}

fn encode_cursor(cursor: &LogCursor) -> String {
    let payload = format!("{}{}{}", cursor.logged_at, CURSOR_SEPARATOR, cursor.entry_id);
    URL_SAFE_NO_PAD.encode(payload)
}

#[derive(Serialize)]
pub struct FoodLogsResponse {
    pub entries: Vec<FoodLogEntry>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// List a user's food log, newest first.
async fn get_food_logs(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
    Query(params): Query<FoodLogsQuery>,
) -> Result<Json<FoodLogsResponse>> {
    let uid = require_user(&uid)?;
    tracing::debug!(
        user_id = %uid,
        cursor = ?params.cursor,
        per_page = params.per_page,
        "Fetching food logs"
    );

    if params.per_page < 1 {
        return Err(AppError::InvalidInput(
            "per_page must be greater than 0".to_string(),
        ));
    }
    let limit = params.per_page.min(MAX_PER_PAGE);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    // Fetch one extra item to determine if another page is available.
    let mut entries = state
        .store
        .list_food_logs(uid, cursor.as_ref(), limit.saturating_add(1))
        .await?;

    let has_more = entries.len() > limit as usize;
    if has_more {
        entries.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        entries.last().map(|e| encode_cursor(&LogCursor::after(e)))
    } else {
        None
    };

    Ok(Json(FoodLogsResponse {
        entries,
        per_page: limit,
        next_cursor,
    }))
}
