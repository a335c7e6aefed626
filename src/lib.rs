// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food-Ledger: track food intake against a daily nutrient budget
//!
//! This crate provides the backend API that turns free-text or photo intake
//! reports into structured nutrition data and keeps a per-user, per-day
//! goal ledger up to date.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::NutritionStore;
use services::IntakeService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn NutritionStore>,
    pub intake: IntakeService,
}
