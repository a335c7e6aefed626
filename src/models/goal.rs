// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily goal ledger model.

use crate::models::NutrientVector;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How a day's goal was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalSource {
    /// Drawn from the jittered baseline ranges.
    Random,
    /// Reserved for goals set by a coach or plan.
    Prescribed,
}

/// Per-user, per-day nutrient budget.
///
/// Stored at: `daily_goals/{user_id}_{date}`
///
/// `goal` is written once, at creation. Only `remaining` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub user_id: String,
    /// Ledger day ("YYYY-MM-DD") in the configured reference timezone
    pub date: String,
    pub goal: NutrientVector,
    pub remaining: NutrientVector,
    /// When the goal was created (RFC3339)
    pub created_at: String,
    pub source: GoalSource,
}

impl DailyGoal {
    /// A fresh goal with the full allowance remaining.
    pub fn new(
        user_id: impl Into<String>,
        date: impl Into<String>,
        goal: NutrientVector,
        source: GoalSource,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            date: date.into(),
            goal,
            remaining: goal,
            created_at: created_at.into(),
            source,
        }
    }

    /// Deduct logged totals from the remaining budget.
    pub fn apply(&mut self, totals: &NutrientVector) -> GoalState {
        self.remaining = self.remaining.saturating_sub(totals).clamp_to(&self.goal);
        self.state()
    }

    pub fn state(&self) -> GoalState {
        GoalState {
            goal: self.goal,
            remaining: self.remaining,
        }
    }
}

/// Snapshot of a day's goal and remaining budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GoalState {
    pub goal: NutrientVector,
    pub remaining: NutrientVector,
}
