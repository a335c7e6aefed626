// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconciliation of logged intake and ledger state into summaries.
//!
//! Everything here is pure: the same inputs always produce the same output.

use crate::models::{FoodItem, GoalState, Nutrient, NutrientVector};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Display metadata for one nutrient row.
struct DisplaySpec {
    nutrient: Nutrient,
    label: &'static str,
    unit: &'static str,
}

/// Rows shown in the goal summary, in display order.
const DISPLAY_NUTRIENTS: [DisplaySpec; 4] = [
    DisplaySpec {
        nutrient: Nutrient::Calories,
        label: "Calories",
        unit: "",
    },
    DisplaySpec {
        nutrient: Nutrient::Protein,
        label: "Protein",
        unit: "g",
    },
    DisplaySpec {
        nutrient: Nutrient::Carbs,
        label: "Carbs",
        unit: "g",
    },
    DisplaySpec {
        nutrient: Nutrient::Fat,
        label: "Fats",
        unit: "g",
    },
];

/// One rounded progress row for the goal summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NutrientDisplay {
    pub key: String,
    pub label: String,
    pub unit: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub consumed: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub goal: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub left: i64,
    /// 0..=100
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub percent: i64,
}

/// Derive the goal summary rows from a ledger snapshot.
///
/// `percent` is 0 when the goal for a nutrient is 0.
pub fn derive_display(goal: &NutrientVector, remaining: &NutrientVector) -> Vec<NutrientDisplay> {
    DISPLAY_NUTRIENTS
        .iter()
        .map(|spec| {
            let target = goal.get(spec.nutrient);
            let left = remaining.get(spec.nutrient);
            let consumed = (target - left).max(0.0);
            let percent = if target > 0.0 {
                (consumed / target * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            };

            NutrientDisplay {
                key: spec.nutrient.key().to_string(),
                label: spec.label.to_string(),
                unit: spec.unit.to_string(),
                consumed: round(consumed),
                goal: round(target),
                left: round(left),
                percent: round(percent),
            }
        })
        .collect()
}

/// Convenience wrapper over [`derive_display`] for a ledger snapshot.
pub fn display_for(state: &GoalState) -> Vec<NutrientDisplay> {
    derive_display(&state.goal, &state.remaining)
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

/// Human-readable rendering of a logged intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct IntakeSummary {
    pub items_text: String,
    pub totals_text: String,
}

impl IntakeSummary {
    /// Chat reply for a tracked intake.
    pub fn message(&self) -> String {
        format!("Tracked: {}. Total: {}.", self.items_text, self.totals_text)
    }
}

/// Render items and totals as text.
pub fn normalize(items: &[FoodItem], totals: &NutrientVector) -> IntakeSummary {
    let items_text = items
        .iter()
        .map(|item| {
            format!(
                "{} {} - {}",
                format_amount(item.quantity),
                item.name,
                format_nutrients(&item.nutrients)
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    IntakeSummary {
        items_text,
        totals_text: format_nutrients(totals),
    }
}

fn format_nutrients(n: &NutrientVector) -> String {
    format!(
        "{} cal, {}g carbs, {}g protein, {}g fiber, {}g fat",
        format_amount(n.calories),
        format_amount(n.carbs),
        format_amount(n.protein),
        format_amount(n.fiber),
        format_amount(n.fat)
    )
}

/// Whole numbers without a decimal point, anything else to one decimal place.
fn format_amount(value: f64) -> String {
    let tenths = (value * 10.0).round() / 10.0;
    if tenths.fract() == 0.0 {
        format!("{}", tenths as i64)
    } else {
        format!("{:.1}", tenths)
    }
}
