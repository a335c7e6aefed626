// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily goal ledger.
//!
//! Owns the per-user, per-day nutrient budget:
//! - Draws a new goal on the first intake of a day
//! - Deducts logged totals from the remaining budget
//! - Commits food log entries together with their deduction

use crate::db::NutritionStore;
use crate::error::AppError;
use crate::models::{DailyGoal, FoodLogEntry, GoalSource, GoalState, Nutrient, NutrientVector};
use crate::time_utils::format_utc_rfc3339;
use rand::Rng;
use std::sync::Arc;

/// Inclusive lower bound and width of the uniform draw for one nutrient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalRange {
    pub base: u32,
    pub span: u32,
}

impl GoalRange {
    pub const fn new(base: u32, span: u32) -> Self {
        Self { base, span }
    }

    /// Largest value a draw can produce.
    pub fn max(&self) -> u32 {
        self.base + self.span.saturating_sub(1)
    }

    fn draw<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.span == 0 {
            return f64::from(self.base);
        }
        f64::from(self.base + rng.gen_range(0..self.span))
    }

    fn contains(&self, value: f64) -> bool {
        value.fract() == 0.0 && value >= f64::from(self.base) && value <= f64::from(self.max())
    }
}

/// How new daily goals are generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalPolicy {
    pub calories: GoalRange,
    pub carbs: GoalRange,
    pub protein: GoalRange,
    pub fiber: GoalRange,
    pub fat: GoalRange,
}

impl Default for GoalPolicy {
    fn default() -> Self {
        Self {
            calories: GoalRange::new(1800, 500),
            carbs: GoalRange::new(180, 40),
            protein: GoalRange::new(120, 40),
            fiber: GoalRange::new(25, 10),
            fat: GoalRange::new(60, 20),
        }
    }
}

impl GoalPolicy {
    pub fn range(&self, nutrient: Nutrient) -> GoalRange {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Carbs => self.carbs,
            Nutrient::Protein => self.protein,
            Nutrient::Fiber => self.fiber,
            Nutrient::Fat => self.fat,
        }
    }

    /// Draw each nutrient independently.
    pub fn draw<R: Rng>(&self, rng: &mut R) -> NutrientVector {
        NutrientVector::from_fn(|n| self.range(n).draw(&mut *rng))
    }

    /// True if every field of `goal` is a value `draw` could have produced.
    pub fn contains(&self, goal: &NutrientVector) -> bool {
        Nutrient::ALL
            .iter()
            .all(|&n| self.range(n).contains(goal.get(n)))
    }
}

/// Ledger service over a [`NutritionStore`].
#[derive(Clone)]
pub struct DailyGoalLedger {
    store: Arc<dyn NutritionStore>,
    policy: GoalPolicy,
}

impl DailyGoalLedger {
    pub fn new(store: Arc<dyn NutritionStore>) -> Self {
        Self::with_policy(store, GoalPolicy::default())
    }

    pub fn with_policy(store: Arc<dyn NutritionStore>, policy: GoalPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &GoalPolicy {
        &self.policy
    }

    /// Ensure a goal exists for `(user_id, date)` and deduct `totals` from it.
    ///
    /// The returned `goal` is the one stored for the day, which may have been
    /// created by a concurrent request rather than this one.
    pub async fn ensure_and_apply(
        &self,
        user_id: &str,
        date: &str,
        totals: &NutrientVector,
    ) -> Result<GoalState, AppError> {
        validate_totals(totals)?;
        let candidate = self.candidate(user_id, date);
        self.store.apply_intake(candidate, totals, None).await
    }

    /// Log `entry` and deduct its totals from the entry's day, atomically.
    ///
    /// Committing the same `entry_id` again returns the current state
    /// without deducting twice.
    pub async fn commit(&self, entry: &FoodLogEntry) -> Result<GoalState, AppError> {
        validate_totals(&entry.totals)?;
        let candidate = self.candidate(&entry.user_id, &entry.date);
        let state = self
            .store
            .apply_intake(candidate, &entry.totals, Some(entry))
            .await?;

        tracing::info!(
            user_id = %entry.user_id,
            date = %entry.date,
            entry_id = %entry.entry_id,
            calories_left = state.remaining.calories,
            "Food log committed"
        );
        Ok(state)
    }

    /// Current goal state for a day, without creating one.
    pub async fn current(&self, user_id: &str, date: &str) -> Result<Option<GoalState>, AppError> {
        Ok(self
            .store
            .read_goal(user_id, date)
            .await?
            .map(|goal| goal.state()))
    }

    /// Goal to insert if the day has none yet.
    fn candidate(&self, user_id: &str, date: &str) -> DailyGoal {
        // thread_rng is !Send; draw before any await
        let goal = self.policy.draw(&mut rand::thread_rng());
        DailyGoal::new(
            user_id,
            date,
            goal,
            GoalSource::Random,
            format_utc_rfc3339(chrono::Utc::now()),
        )
    }
}

fn validate_totals(totals: &NutrientVector) -> Result<(), AppError> {
    if totals.is_non_negative() {
        Ok(())
    } else {
        Err(AppError::InvalidInput(
            "Intake totals must be non-negative".to_string(),
        ))
    }
}
