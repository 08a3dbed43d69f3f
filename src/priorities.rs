// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Census Trend Engine - Priority Table

//! Per-category importance weights.
//!
//! A raw count delta is multiplied by its category weight before it enters
//! the trend, so losing a civil centre (50) outweighs losing a house (5).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Category, CategoryRecord, MobileRecord, StaticRecord};

/// Static weights for every category. Immutable once built; shared by `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityTable {
    weights: CategoryRecord,
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            weights: CategoryRecord {
                mobile: MobileRecord {
                    support_unit: dec!(1.5),
                    citizen_soldier: dec!(2),
                    cavalry: dec!(3),
                    infantry_melee: dec!(2),
                    infantry_ranged: dec!(2),
                    siege: dec!(4),
                },
                structures: StaticRecord {
                    house: dec!(5),
                    farmstead: dec!(3),
                    field: dec!(15),
                    barracks: dec!(20),
                    civil_centre: dec!(50),
                    market: dec!(12),
                    temple: dec!(15),
                    storehouse: dec!(15),
                    defense_tower: dec!(20),
                },
            },
        }
    }
}

impl PriorityTable {
    pub fn new(weights: CategoryRecord) -> Self {
        Self { weights }
    }

    /// Every category weighted equally, handy for isolating one category.
    pub fn uniform(weight: Decimal) -> Self {
        Self { weights: CategoryRecord::from_fn(|_| weight) }
    }

    /// Copy of this table with one weight replaced.
    pub fn with_weight(mut self, category: Category, weight: Decimal) -> Self {
        self.weights.set(category, weight);
        self
    }

    pub fn weight(&self, category: Category) -> Decimal {
        self.weights.get(category)
    }

    pub fn weights(&self) -> &CategoryRecord {
        &self.weights
    }

    /// First category whose weight is zero or negative, if any.
    pub fn first_non_positive(&self) -> Option<(Category, Decimal)> {
        self.weights.iter().find(|(_, w)| *w <= Decimal::ZERO)
    }

    /// `value * weight[category]`, saturating at the `Decimal` bounds.
    pub fn weigh(&self, category: Category, value: Decimal) -> Decimal {
        let weight = self.weight(category);
        value.checked_mul(weight).unwrap_or(
            if value.is_sign_negative() != weight.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            },
        )
    }

    /// `record` with every field multiplied by its weight.
    pub fn apply(&self, record: &CategoryRecord) -> CategoryRecord {
        CategoryRecord::from_fn(|c| self.weigh(c, record.get(c)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
