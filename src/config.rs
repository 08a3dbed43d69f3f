// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Census Trend Engine - Tracker Configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::history::{DEFAULT_CAPACITY, MAX_CAPACITY, MIN_CAPACITY};
use crate::priorities::PriorityTable;
use crate::reactor::{TrendTrigger, DEFAULT_SUPPORT_THRESHOLD};
use crate::types::Category;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("history capacity {0} is below the minimum of 2")]
    CapacityTooSmall(usize),

    #[error("history capacity {0} is above the maximum of 64")]
    CapacityTooLarge(usize),

    #[error("priority weight for {category} must be positive, got {weight}")]
    NonPositiveWeight { category: Category, weight: Decimal },
}

// ---------------------------------------------------------------------------
// TrackerConfig
// ---------------------------------------------------------------------------

/// Everything a coordinator needs besides its data source and action layer.
///
/// Missing JSON fields fall back to the reference values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub history_capacity: usize,
    /// Support-unit trend below which the economy is declared in disaster.
    pub support_threshold: Decimal,
    /// Optional second check; `None` keeps the military phase idle.
    pub military_trigger: Option<TrendTrigger>,
    pub priorities: PriorityTable,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            support_threshold: DEFAULT_SUPPORT_THRESHOLD,
            military_trigger: None,
            priorities: PriorityTable::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse and validate.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity < MIN_CAPACITY {
            return Err(ConfigError::CapacityTooSmall(self.history_capacity));
        }
        if self.history_capacity > MAX_CAPACITY {
            return Err(ConfigError::CapacityTooLarge(self.history_capacity));
        }
        if let Some((category, weight)) = self.priorities.first_non_positive() {
            return Err(ConfigError::NonPositiveWeight { category, weight });
        }
        Ok(())
    }

    pub fn support_trigger(&self) -> TrendTrigger {
        TrendTrigger::new(Category::SUPPORT_UNIT, self.support_threshold)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
