// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food log entry model for storage and API.

use crate::models::NutrientVector;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Input label stored for photo-based entries.
pub const IMAGE_INPUT_LABEL: &str = "[Image]";

/// Where an entry's nutrition numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "kebab-case")]
pub enum LogSource {
    ExtractorText,
    ExtractorVision,
    BrandCatalog,
}

/// A single food within a logged intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FoodItem {
    pub name: String,
    pub quantity: f64,
    pub nutrients: NutrientVector,
}

/// Append-only intake record.
///
/// Stored at: `food_logs/{entry_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    /// Document ID; also the idempotency key for ledger deduction
    pub entry_id: String,
    pub user_id: String,
    /// Ledger day this entry was deducted from
    pub date: String,
    /// Original text, or `[Image]` for photos
    pub input: String,
    pub items: Vec<FoodItem>,
    pub totals: NutrientVector,
    pub source: LogSource,
    pub image_url: Option<String>,
    /// When the entry was logged (RFC3339, millisecond precision)
    pub logged_at: String,
}
