// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, with an in-process store for tests and local runs).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{DailyGoal, FoodLogEntry, GoalState, NutrientVector};
use async_trait::async_trait;
use std::cmp::Ordering;

/// Collection names as constants.
pub mod collections {
    /// Daily goal ledger rows (keyed by `{user_id}_{date}`)
    pub const DAILY_GOALS: &str = "daily_goals";
    /// Append-only intake records (keyed by entry_id)
    pub const FOOD_LOGS: &str = "food_logs";
}

/// Position in a user's newest-first food log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCursor {
    pub logged_at: String,
    pub entry_id: String,
}

impl LogCursor {
    pub fn after(entry: &FoodLogEntry) -> Self {
        Self {
            logged_at: entry.logged_at.clone(),
            entry_id: entry.entry_id.clone(),
        }
    }

    /// True if `entry` belongs after this cursor (strictly older in newest-first order).
    pub fn admits(&self, entry: &FoodLogEntry) -> bool {
        (entry.logged_at.as_str(), entry.entry_id.as_str())
            < (self.logged_at.as_str(), self.entry_id.as_str())
    }
}

/// Newest-first ordering for food log entries, ties broken by entry ID.
pub fn newest_first(a: &FoodLogEntry, b: &FoodLogEntry) -> Ordering {
    (b.logged_at.as_str(), b.entry_id.as_str()).cmp(&(a.logged_at.as_str(), a.entry_id.as_str()))
}

/// Persistence for the goal ledger and the food log.
#[async_trait]
pub trait NutritionStore: Send + Sync {
    /// Read the ledger row for a user and day.
    async fn read_goal(&self, user_id: &str, date: &str) -> Result<Option<DailyGoal>, AppError>;

    /// Atomically apply intake to a day's ledger row.
    ///
    /// In a single transaction keyed on `(candidate.user_id, candidate.date)`:
    /// 1. Insert `candidate` if no row exists yet (create-if-absent).
    /// 2. Subtract `totals` from `remaining`, clamping at zero.
    /// 3. Append `entry` to the food log, if given.
    ///
    /// If `entry` was already committed, nothing is written and the current
    /// state of the day it was logged on is returned, even when `candidate`
    /// names a later day. Retries never deduct twice.
    async fn apply_intake(
        &self,
        candidate: DailyGoal,
        totals: &NutrientVector,
        entry: Option<&FoodLogEntry>,
    ) -> Result<GoalState, AppError>;

    /// List a user's food log entries newest-first, starting after `cursor`.
    async fn list_food_logs(
        &self,
        user_id: &str,
        cursor: Option<&LogCursor>,
        limit: u32,
    ) -> Result<Vec<FoodLogEntry>, AppError>;
}

/// Document ID for a ledger row.
///
/// User IDs are percent-encoded so they cannot contain `/`.
pub fn goal_doc_id(user_id: &str, date: &str) -> String {
    format!("{}_{}", urlencoding::encode(user_id), date)
}
