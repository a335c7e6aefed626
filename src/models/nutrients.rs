// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-field nutrient vector used for goals, budgets, items and totals.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One of the tracked nutrients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Calories,
    Carbs,
    Protein,
    Fiber,
    Fat,
}

impl Nutrient {
    /// Every nutrient, in storage order.
    pub const ALL: [Nutrient; 5] = [
        Nutrient::Calories,
        Nutrient::Carbs,
        Nutrient::Protein,
        Nutrient::Fiber,
        Nutrient::Fat,
    ];

    /// Field name as it appears in JSON and Firestore.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Carbs => "carbs",
            Nutrient::Protein => "protein",
            Nutrient::Fiber => "fiber",
            Nutrient::Fat => "fat",
        }
    }
}

/// Amounts for every tracked nutrient.
///
/// Calories are kcal, everything else is grams. Missing fields in stored
/// documents deserialize as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(default)]
pub struct NutrientVector {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fiber: f64,
    pub fat: f64,
}

impl NutrientVector {
    pub const ZERO: NutrientVector = NutrientVector {
        calories: 0.0,
        carbs: 0.0,
        protein: 0.0,
        fiber: 0.0,
        fat: 0.0,
    };

    pub fn new(calories: f64, carbs: f64, protein: f64, fiber: f64, fat: f64) -> Self {
        Self {
            calories,
            carbs,
            protein,
            fiber,
            fat,
        }
    }

    /// Build a vector by evaluating `f` once per nutrient.
    pub fn from_fn(mut f: impl FnMut(Nutrient) -> f64) -> Self {
        Self {
            calories: f(Nutrient::Calories),
            carbs: f(Nutrient::Carbs),
            protein: f(Nutrient::Protein),
            fiber: f(Nutrient::Fiber),
            fat: f(Nutrient::Fat),
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Carbs => self.carbs,
            Nutrient::Protein => self.protein,
            Nutrient::Fiber => self.fiber,
            Nutrient::Fat => self.fat,
        }
    }

    /// Field-wise `max(self - other, 0)`.
    pub fn saturating_sub(&self, other: &NutrientVector) -> Self {
        Self::from_fn(|n| (self.get(n) - other.get(n)).max(0.0))
    }

    /// Field-wise clamp of each value into `[0, ceiling]`.
    pub fn clamp_to(&self, ceiling: &NutrientVector) -> Self {
        Self::from_fn(|n| self.get(n).max(0.0).min(ceiling.get(n)))
    }

    pub fn is_non_negative(&self) -> bool {
        Nutrient::ALL.iter().all(|&n| self.get(n) >= 0.0)
    }

    /// True if every field is `<=` the matching field of `other`.
    pub fn fits_within(&self, other: &NutrientVector) -> bool {
        Nutrient::ALL.iter().all(|&n| self.get(n) <= other.get(n))
    }
}

impl Add for NutrientVector {
    type Output = NutrientVector;

    fn add(self, rhs: NutrientVector) -> NutrientVector {
        NutrientVector::from_fn(|n| self.get(n) + rhs.get(n))
    }
}

impl AddAssign for NutrientVector {
    fn add_assign(&mut self, rhs: NutrientVector) {
        *self = *self + rhs;
    }
}

impl Sum for NutrientVector {
    fn sum<I: Iterator<Item = NutrientVector>>(iter: I) -> Self {
        iter.fold(NutrientVector::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a NutrientVector> for NutrientVector {
    fn sum<I: Iterator<Item = &'a NutrientVector>>(iter: I) -> Self {
        iter.copied().sum()
    }
}
