// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutrition extractor output and its validation.
//!
//! Wire format:
//!
//! ```json
//! {
//!   "items": [{"name": "scrambled eggs", "quantity": 2, "calories": 140,
//!              "carbs": 1, "protein": 12, "fiber": 0, "fat": 10}],
//!   "totals": {"calories": 140, "carbs": 1, "protein": 12, "fiber": 0, "fat": 10}
//! }
//! ```
//!
//! Absent or null numbers are read as zero so partial extractor output is
//! still usable. Numeric strings are accepted. Negative, non-finite or
//! non-numeric values reject the whole estimate.

use crate::error::AppError;
use crate::models::{FoodItem, Nutrient, NutrientVector};
use serde_json::{Map, Value};

/// Validated extractor output.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionEstimate {
    pub items: Vec<FoodItem>,
    /// Taken as reported by the extractor; only summed from `items` when
    /// the extractor omitted it.
    pub totals: NutrientVector,
}

impl NutritionEstimate {
    /// Build an estimate whose totals are the sum of its items.
    pub fn from_items(items: Vec<FoodItem>) -> Self {
        let totals = items.iter().map(|i| &i.nutrients).sum();
        Self { items, totals }
    }
}

/// Reasons an extractor response was rejected.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EstimateError {
    #[error("Extractor returned no content")]
    Empty,

    #[error("Extractor output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Extractor output has the wrong shape: {0}")]
    Shape(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidNumber { field: String, value: String },
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        AppError::ExtractionParse(err.to_string())
    }
}

/// Parse and validate raw extractor output.
pub fn parse_estimate(raw: &str) -> Result<NutritionEstimate, EstimateError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(EstimateError::Empty);
    }

    let root: Value =
        serde_json::from_str(body).map_err(|e| EstimateError::InvalidJson(e.to_string()))?;
    let root = root
        .as_object()
        .ok_or_else(|| EstimateError::Shape("expected a JSON object".to_string()))?;

    let items = match root.get("items") {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(idx, item)| parse_item(idx, item))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(EstimateError::Shape("'items' must be an array".to_string())),
        None => return Err(EstimateError::Shape("missing 'items'".to_string())),
    };

    match root.get("totals") {
        Some(Value::Object(totals)) => Ok(NutritionEstimate {
            items,
            totals: parse_nutrients("totals", totals)?,
        }),
        None | Some(Value::Null) => Ok(NutritionEstimate::from_items(items)),
        Some(_) => Err(EstimateError::Shape("'totals' must be an object".to_string())),
    }
}

fn parse_item(idx: usize, value: &Value) -> Result<FoodItem, EstimateError> {
    let obj = value
        .as_object()
        .ok_or_else(|| EstimateError::Shape(format!("items[{}] must be an object", idx)))?;

    let name = match obj.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            return Err(EstimateError::Shape(format!(
                "items[{}] needs a non-empty 'name'",
                idx
            )))
        }
    };

    let prefix = format!("items[{}]", idx);
    Ok(FoodItem {
        name,
        quantity: amount(&prefix, "quantity", obj.get("quantity"))?,
        nutrients: parse_nutrients(&prefix, obj)?,
    })
}

fn parse_nutrients(prefix: &str, obj: &Map<String, Value>) -> Result<NutrientVector, EstimateError> {
    let mut values = [0.0; 5];
    for (slot, nutrient) in values.iter_mut().zip(Nutrient::ALL) {
        *slot = amount(prefix, nutrient.key(), obj.get(nutrient.key()))?;
    }
    let [calories, carbs, protein, fiber, fat] = values;
    Ok(NutrientVector::new(calories, carbs, protein, fiber, fat))
}

/// Read a non-negative amount, tolerating absence and numeric strings.
fn amount(prefix: &str, field: &str, value: Option<&Value>) -> Result<f64, EstimateError> {
    let invalid = |v: &Value| EstimateError::InvalidNumber {
        field: format!("{}.{}", prefix, field),
        value: v.to_string(),
    };

    let Some(v) = value else {
        return Ok(0.0);
    };

    let parsed = match v {
        Value::Null => return Ok(0.0),
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid(v))?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| invalid(v))?,
        _ => return Err(invalid(v)),
    };

    if !parsed.is_finite() || parsed < 0.0 {
        return Err(invalid(v));
    }
    Ok(parsed)
}

/// Strip a surrounding Markdown code fence (```json ... ```), if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
