// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store backed by `DashMap`.
//!
//! Used for tests and for running locally without Firestore. A ledger row's
//! map entry stays locked for the whole create/deduct/append sequence, which
//! gives the same per-day atomicity as the Firestore transaction.

use crate::db::{goal_doc_id, newest_first, LogCursor, NutritionStore};
use crate::error::AppError;
use crate::models::{DailyGoal, FoodLogEntry, GoalState, NutrientVector};
use async_trait::async_trait;
use dashmap::DashMap;

/// Store that keeps everything in memory.
#[derive(Default)]
pub struct MemoryStore {
    goals: DashMap<String, DailyGoal>,
    /// Food log entries per user, in insertion order
    food_logs: DashMap<String, Vec<FoodLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ledger rows across all users.
    pub fn goal_count(&self) -> usize {
        self.goals.len()
    }

    /// Number of food log entries across all users.
    pub fn food_log_count(&self) -> usize {
        self.food_logs.iter().map(|logs| logs.len()).sum()
    }
}

#[async_trait]
impl NutritionStore for MemoryStore {
    async fn read_goal(&self, user_id: &str, date: &str) -> Result<Option<DailyGoal>, AppError> {
        Ok(self
            .goals
            .get(&goal_doc_id(user_id, date))
            .map(|goal| goal.value().clone()))
    }

    async fn apply_intake(
        &self,
        candidate: DailyGoal,
        totals: &NutrientVector,
        entry: Option<&FoodLogEntry>,
    ) -> Result<GoalState, AppError> {
        let doc_id = goal_doc_id(&candidate.user_id, &candidate.date);

        let Some(entry) = entry else {
            return Ok(self.goals.entry(doc_id).or_insert(candidate).apply(totals));
        };

        // Lock order: user's log, then ledger row
        let mut logs = self.food_logs.entry(candidate.user_id.clone()).or_default();
        if let Some(logged) = logs.iter().find(|e| e.entry_id == entry.entry_id) {
            tracing::debug!(
                entry_id = %entry.entry_id,
                date = %logged.date,
                "Food log entry already applied (idempotent skip)"
            );
            return self
                .goals
                .get(&goal_doc_id(&logged.user_id, &logged.date))
                .map(|goal| goal.state())
                .ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!(
                        "Food log entry {} has no ledger row",
                        logged.entry_id
                    ))
                });
        }

        let state = self.goals.entry(doc_id).or_insert(candidate).apply(totals);
        logs.push(entry.clone());
        Ok(state)
    }

    async fn list_food_logs(
        &self,
        user_id: &str,
        cursor: Option<&LogCursor>,
        limit: u32,
    ) -> Result<Vec<FoodLogEntry>, AppError> {
        let Some(logs) = self.food_logs.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut entries: Vec<FoodLogEntry> = logs
            .iter()
            .filter(|e| cursor.map_or(true, |c| c.admits(e)))
            .cloned()
            .collect();
        entries.sort_by(newest_first);
        entries.truncate(limit as usize);
        Ok(entries)
    }
}
