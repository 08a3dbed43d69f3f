// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Census Trend Engine - History Window

//! Bounded, most-recent-first window of committed samples.
//!
//! The trend summary is a recency-decayed sum of weighted successive
//! differences:
//!
//! ```text
//! diff[i]    = (sample[i] - sample[i+1]) * weight / 2^i
//! summary    = diff[0] + diff[1] + ... + diff[len-2]
//! ```
//!
//! so the newest step counts fully, the one before it half, and so on.
//! Everything derived is recomputed from scratch on each commit; the window
//! is small enough that incremental bookkeeping buys nothing.

use std::collections::VecDeque;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::priorities::PriorityTable;
use crate::types::{CategoryRecord, Sample};

/// Reference window length.
pub const DEFAULT_CAPACITY: usize = 10;

/// Smallest capacity that can ever yield a trend.
pub const MIN_CAPACITY: usize = 2;

/// Largest supported capacity; keeps the `2^i` divisor well inside `Decimal`.
pub const MAX_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Span / Unavailable
// ---------------------------------------------------------------------------

/// Which older sample `compare_endpoints` measures the newest one against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    /// Newest vs oldest.
    Full,
    /// Newest vs the sample at `len / 2`.
    Half,
    /// Newest vs the third-newest. Needs at least three samples.
    Recent3,
}

/// Why a trend or comparison could not be produced.
///
/// Not a fault: callers treat it as "skip this check".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("insufficient history: need {required} samples, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("compared endpoints are the same sample")]
    IdenticalEndpoints,
}

// ---------------------------------------------------------------------------
// HistoryWindow
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct HistoryWindow {
    samples: VecDeque<Arc<Sample>>,
    capacity: usize,
    priorities: Arc<PriorityTable>,
    differences: Vec<CategoryRecord>,
    summary: Option<CategoryRecord>,
}

impl HistoryWindow {
    /// Capacity is clamped to `MIN_CAPACITY..=MAX_CAPACITY`.
    pub fn new(capacity: usize, priorities: Arc<PriorityTable>) -> Self {
        let capacity = capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            priorities,
            differences: Vec::with_capacity(capacity - 1),
            summary: None,
        }
    }

    pub fn with_default_priorities(capacity: usize) -> Self {
        Self::new(capacity, Arc::new(PriorityTable::default()))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn priorities(&self) -> &PriorityTable {
        &self.priorities
    }

    /// Sample at `index`, 0 being the newest.
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index).map(|s| s.as_ref())
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().map(|s| s.as_ref())
    }

    /// Prepend `sample`, evicting the oldest when over capacity.
    ///
    /// Does not touch the summary; call [`recompute_summary`](Self::recompute_summary).
    pub fn push(&mut self, sample: impl Into<Arc<Sample>>) {
        self.samples.push_front(sample.into());
        while self.samples.len() > self.capacity {
            self.samples.pop_back();
        }
    }

    /// Rebuild the difference records and the summary from the window.
    ///
    /// Pure function of the current contents: repeated calls without a push
    /// produce identical results. Fewer than two samples clears the summary.
    pub fn recompute_summary(&mut self) -> Option<&CategoryRecord> {
        self.differences.clear();
        if self.samples.len() < MIN_CAPACITY {
            self.summary = None;
            return None;
        }

        let mut summary = CategoryRecord::default();
        let mut divisor = Decimal::ONE;
        for (newer, older) in self.samples.iter().zip(self.samples.iter().skip(1)) {
            let diff = CategoryRecord::from_fn(|c| {
                self.priorities.weigh(c, delta(newer.count(c), older.count(c))) / divisor
            });
            for (c, v) in diff.iter() {
                let total = summary.get_mut(c);
                *total = total.checked_add(v).unwrap_or(if v.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                });
            }
            self.differences.push(diff);
            divisor *= Decimal::TWO;
        }

        self.summary = Some(summary);
        self.summary.as_ref()
    }

    /// Last computed trend, `None` until a recompute has seen two samples.
    pub fn summary(&self) -> Option<&CategoryRecord> {
        self.summary.as_ref()
    }

    /// Per-step weighted differences from the last recompute, newest pair first.
    pub fn differences(&self) -> &[CategoryRecord] {
        &self.differences
    }

    /// Newest sample with every count scaled by its weight.
    pub fn head(&self) -> Option<CategoryRecord> {
        self.samples.front().map(|s| self.priorities.apply(&s.counts))
    }

    /// Weighted `(newest - other) * weight` for the sample chosen by `span`.
    pub fn compare_endpoints(&self, span: Span) -> Result<CategoryRecord, Unavailable> {
        let len = self.samples.len();
        let (index, required) = match span {
            Span::Full => (len.saturating_sub(1), 1),
            Span::Half => (len / 2, 1),
            Span::Recent3 => (2, 3),
        };
        if len < required {
            debug!(?span, len, required, "endpoint comparison skipped: window too short");
            return Err(Unavailable::InsufficientHistory { required, available: len });
        }

        let first = &self.samples[0];
        let other = &self.samples[index];
        if index == 0 || Arc::ptr_eq(first, other) {
            debug!(?span, len, "endpoint comparison skipped: identical endpoints");
            return Err(Unavailable::IdenticalEndpoints);
        }

        Ok(CategoryRecord::from_fn(|c| {
            self.priorities.weigh(c, delta(first.count(c), other.count(c)))
        }))
    }

    /// One line per sample, newest first, listing only non-zero counts:
    /// `#0 cycle 7: mobile.support_unit=12 static.house=3`.
    pub fn render(&self) -> Vec<String> {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                let counts: Vec<String> = sample
                    .counts
                    .iter()
                    .filter(|(_, v)| !v.is_zero())
                    .map(|(c, v)| format!("{}={}", c, v))
                    .collect();
                format!("#{} cycle {}: {}", i, sample.cycle, counts.join(" "))
            })
            .collect()
    }

    /// Log the rendered window at debug level.
    pub fn dump(&self) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        for line in self.render() {
            debug!(window = %line, "history window");
        }
    }

    /// Drop all samples and derived state.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.differences.clear();
        self.summary = None;
    }
}

/// `newer - older`, saturating at the `Decimal` bounds.
fn delta(newer: Decimal, older: Decimal) -> Decimal {
    newer.checked_sub(older).unwrap_or(if older.is_sign_negative() {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
