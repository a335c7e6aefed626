// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Branded product catalog loading and matching.

use crate::models::{BrandedItem, FoodItem, NutritionEstimate};
use std::fs;
use std::path::Path;

/// Catalog of known products, matched against free-text intake.
#[derive(Default, Clone)]
pub struct BrandCatalog {
    items: Vec<BrandedItem>,
    /// Lowercased names, parallel to `items`
    needles: Vec<String>,
}

impl BrandCatalog {
    /// Load the catalog from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let json_data =
            fs::read_to_string(path.as_ref()).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::load_from_json(&json_data)
    }

    /// Load the catalog from a JSON array of branded items.
    pub fn load_from_json(json_data: &str) -> Result<Self, CatalogError> {
        let items: Vec<BrandedItem> = serde_json::from_str(json_data)
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        if let Some(bad) = items
            .iter()
            .find(|i| i.name.trim().is_empty() || !i.nutrients.is_non_negative())
        {
            return Err(CatalogError::InvalidEntry(bad.name.clone()));
        }

        let catalog = Self::from_items(items);
        tracing::info!(count = catalog.items.len(), "Loaded brand catalog");
        Ok(catalog)
    }

    pub fn from_items(items: Vec<BrandedItem>) -> Self {
        let needles = items.iter().map(|i| i.name.trim().to_lowercase()).collect();
        Self { items, needles }
    }

    /// Get the list of catalog entries.
    pub fn items(&self) -> &[BrandedItem] {
        &self.items
    }

    /// Find every catalog entry whose name appears in `text` (case-insensitive).
    ///
    /// Results follow catalog order. A message can mention several products,
    /// so all matches are returned.
    pub fn find_matches(&self, text: &str) -> Vec<&BrandedItem> {
        let haystack = text.to_lowercase();
        self.items
            .iter()
            .zip(&self.needles)
            .filter(|(_, needle)| !needle.is_empty() && haystack.contains(needle.as_str()))
            .map(|(item, _)| item)
            .collect()
    }

    /// Build an estimate from catalog matches, or `None` if nothing matched.
    ///
    /// Each match counts as one serving; totals are the sum of the matches.
    pub fn estimate_for(&self, text: &str) -> Option<NutritionEstimate> {
        let matches = self.find_matches(text);
        if matches.is_empty() {
            return None;
        }

        let items = matches
            .into_iter()
            .map(|brand| FoodItem {
                name: brand.name.clone(),
                quantity: 1.0,
                nutrients: brand.nutrients,
            })
            .collect();
        Some(NutritionEstimate::from_items(items))
    }
}

/// Errors from catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read file: {0}")]
    IoError(String),

    #[error("Failed to parse brand catalog: {0}")]
    ParseError(String),

    #[error("Invalid catalog entry: {0:?}")]
    InvalidEntry(String),
}
