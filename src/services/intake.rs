// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Intake tracking pipeline.
//!
//! Input → brand catalog (text only) or extractor → food log entry →
//! ledger commit → summary. Nothing is written unless the extractor
//! produced a usable estimate.

use crate::error::AppError;
use crate::models::{FoodLogEntry, GoalState, LogSource, NutritionEstimate, IMAGE_INPUT_LABEL};
use crate::services::brands::BrandCatalog;
use crate::services::extractor::NutritionExtractor;
use crate::services::image::ImagePayload;
use crate::services::ledger::DailyGoalLedger;
use crate::services::summary::{display_for, normalize, IntakeSummary, NutrientDisplay};
use crate::time_utils::{format_utc_rfc3339, ledger_date};
use chrono::{DateTime, FixedOffset, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Result of a tracked intake.
#[derive(Debug, Clone)]
pub struct TrackOutcome {
    pub entry: FoodLogEntry,
    pub state: GoalState,
    pub summary: IntakeSummary,
    pub nutrients: Vec<NutrientDisplay>,
}

impl TrackOutcome {
    pub fn message(&self) -> String {
        self.summary.message()
    }
}

/// A text intake report.
#[derive(Debug, Clone, Copy)]
pub struct TextIntake<'a> {
    pub user_id: &'a str,
    pub text: &'a str,
    /// Client-chosen idempotency key
    pub request_id: Option<&'a str>,
}

/// A photo intake report.
#[derive(Debug, Clone, Copy)]
pub struct ImageIntake<'a> {
    pub user_id: &'a str,
    /// `data:image/<type>;base64,<payload>`
    pub data_url: &'a str,
    /// Where the client stored the original photo, if anywhere
    pub image_url: Option<&'a str>,
    pub request_id: Option<&'a str>,
}

/// Orchestrates extraction, logging and ledger updates.
#[derive(Clone)]
pub struct IntakeService {
    extractor: Arc<dyn NutritionExtractor>,
    catalog: Arc<BrandCatalog>,
    ledger: DailyGoalLedger,
    offset: FixedOffset,
    max_image_bytes: usize,
}

impl IntakeService {
    pub fn new(
        extractor: Arc<dyn NutritionExtractor>,
        catalog: Arc<BrandCatalog>,
        ledger: DailyGoalLedger,
        offset: FixedOffset,
        max_image_bytes: usize,
    ) -> Self {
        Self {
            extractor,
            catalog,
            ledger,
            offset,
            max_image_bytes,
        }
    }

    pub fn ledger(&self) -> &DailyGoalLedger {
        &self.ledger
    }

    /// Ledger day for an instant in the reference timezone.
    pub fn ledger_date(&self, now: DateTime<Utc>) -> String {
        ledger_date(now, self.offset)
    }

    /// Track a free-text report.
    ///
    /// Catalog matches take precedence over the extractor.
    pub async fn track_text(&self, intake: TextIntake<'_>) -> Result<TrackOutcome, AppError> {
        let user_id = require_user(intake.user_id)?;
        let text = intake.text.trim();
        if text.is_empty() {
            return Err(AppError::InvalidInput("Missing text".to_string()));
        }

        let (estimate, source) = match self.catalog.estimate_for(text) {
            Some(estimate) => {
                tracing::debug!(user_id, matches = estimate.items.len(), "Brand catalog match");
                (estimate, LogSource::BrandCatalog)
            }
            None => (
                self.extractor.extract_from_text(text).await?,
                LogSource::ExtractorText,
            ),
        };

        self.record(user_id, text, None, intake.request_id, estimate, source)
            .await
    }

    /// Track a photo report.
    pub async fn track_image(&self, intake: ImageIntake<'_>) -> Result<TrackOutcome, AppError> {
        let user_id = require_user(intake.user_id)?;
        let image = ImagePayload::parse_data_url(intake.data_url, self.max_image_bytes)?;

        let estimate = self.extractor.extract_from_image(&image).await?;

        let image_url = intake
            .image_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        self.record(
            user_id,
            IMAGE_INPUT_LABEL,
            image_url,
            intake.request_id,
            estimate,
            LogSource::ExtractorVision,
        )
        .await
    }

    async fn record(
        &self,
        user_id: &str,
        input: &str,
        image_url: Option<String>,
        request_id: Option<&str>,
        estimate: NutritionEstimate,
        source: LogSource,
    ) -> Result<TrackOutcome, AppError> {
        if estimate.items.is_empty() {
            return Err(AppError::ExtractionParse(
                "No food items recognized".to_string(),
            ));
        }

        let now = Utc::now();
        let entry = FoodLogEntry {
            entry_id: entry_id(user_id, request_id),
            user_id: user_id.to_string(),
            date: self.ledger_date(now),
            input: input.to_string(),
            items: estimate.items,
            totals: estimate.totals,
            source,
            image_url,
            logged_at: format_utc_rfc3339(now),
        };

        let state = self.ledger.commit(&entry).await?;
        let summary = normalize(&entry.items, &entry.totals);
        let nutrients = display_for(&state);

        tracing::info!(
            user_id,
            date = %entry.date,
            items = entry.items.len(),
            source = ?entry.source,
            calories = entry.totals.calories,
            "Intake tracked"
        );

        Ok(TrackOutcome {
            entry,
            state,
            summary,
            nutrients,
        })
    }
}

/// Trimmed user ID; empty IDs are rejected.
pub fn require_user(user_id: &str) -> Result<&str, AppError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::InvalidInput("Missing uid".to_string()));
    }
    Ok(user_id)
}

/// Stable ID when the client supplies a request ID, random otherwise.
///
/// Hashing the user in keeps two users' request IDs from colliding.
pub fn entry_id(user_id: &str, request_id: Option<&str>) -> String {
    match request_id.map(str::trim).filter(|r| !r.is_empty()) {
        Some(request_id) => {
            let mut hasher = Sha256::new();
            hasher.update(user_id.as_bytes());
            hasher.update(b":");
            hasher.update(request_id.as_bytes());
            hex::encode(hasher.finalize())
        }
        None => uuid::Uuid::new_v4().simple().to_string(),
    }
}
