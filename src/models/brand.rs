// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Branded product catalog entry.

use crate::models::NutrientVector;
use serde::{Deserialize, Serialize};

/// A known product with authoritative nutrition values.
///
/// Catalog files list nutrients inline:
/// `{"name": "ZestBev Citrus Kick", "calories": 100, "carbs": 25, ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandedItem {
    pub name: String,
    #[serde(flatten)]
    pub nutrients: NutrientVector,
}
