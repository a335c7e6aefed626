// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod brands;
pub mod extractor;
pub mod image;
pub mod intake;
pub mod ledger;
pub mod summary;

pub use brands::{BrandCatalog, CatalogError};
pub use extractor::{NutritionExtractor, OpenAiExtractor};
pub use image::ImagePayload;
pub use intake::{require_user, ImageIntake, IntakeService, TextIntake, TrackOutcome};
pub use ledger::{DailyGoalLedger, GoalPolicy, GoalRange};
pub use summary::{derive_display, display_for, normalize, IntakeSummary, NutrientDisplay};
