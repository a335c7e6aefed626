// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod brand;
pub mod estimate;
pub mod food_log;
pub mod goal;
pub mod nutrients;

pub use brand::BrandedItem;
pub use estimate::{parse_estimate, EstimateError, NutritionEstimate};
pub use food_log::{FoodItem, FoodLogEntry, LogSource, IMAGE_INPUT_LABEL};
pub use goal::{DailyGoal, GoalSource, GoalState};
pub use nutrients::{Nutrient, NutrientVector};
