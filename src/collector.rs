// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Census Trend Engine - Phased Collector

//! Three-tick sampling cycle.
//!
//! Counting every entity type and re-summarizing in a single tick is the
//! expensive path; the collector spreads it so each tick does one slice:
//!
//! ```text
//! CountMobile -> CountStatic -> Commit -> CountMobile -> ...
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::history::HistoryWindow;
use crate::types::{Category, CategoryGroup, Sample};

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Failure reported by a [`CountSource`]. The collector absorbs it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("count source unavailable: {0}")]
    Unavailable(String),

    #[error("no count recorded for {0}")]
    Missing(Category),
}

/// The environment query layer: how many entities of `category` exist now.
pub trait CountSource {
    fn count(&mut self, category: Category) -> Result<u32, SourceError>;
}

impl<F> CountSource for F
where
    F: FnMut(Category) -> Result<u32, SourceError>,
{
    fn count(&mut self, category: Category) -> Result<u32, SourceError> {
        self(category)
    }
}

/// Host-fed table of current counts.
///
/// Categories never set read as zero unless the table is `strict`, in which
/// case they report [`SourceError::Missing`].
#[derive(Debug, Clone, Default)]
pub struct CountTable {
    counts: HashMap<Category, u32>,
    strict: bool,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { counts: HashMap::new(), strict: true }
    }

    pub fn set(&mut self, category: Category, count: u32) {
        self.counts.insert(category, count);
    }

    pub fn get(&self, category: Category) -> Option<u32> {
        self.counts.get(&category).copied()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}

impl CountSource for CountTable {
    fn count(&mut self, category: Category) -> Result<u32, SourceError> {
        match self.counts.get(&category) {
            Some(&n) => Ok(n),
            None if self.strict => Err(SourceError::Missing(category)),
            None => Ok(0),
        }
    }
}

// ---------------------------------------------------------------------------
// CollectorPhase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectorPhase {
    #[default]
    CountMobile,
    CountStatic,
    Commit,
}

impl CollectorPhase {
    pub fn next(self) -> Self {
        match self {
            Self::CountMobile => Self::CountStatic,
            Self::CountStatic => Self::Commit,
            Self::Commit => Self::CountMobile,
        }
    }
}

// ---------------------------------------------------------------------------
// PhasedCollector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PhasedCollector {
    phase: CollectorPhase,
    pending: Sample,
    history: HistoryWindow,
    cycle: u64,
    source_failures: u64,
}

impl PhasedCollector {
    pub fn new(history: HistoryWindow) -> Self {
        Self {
            phase: CollectorPhase::default(),
            pending: Sample::new(0),
            history,
            cycle: 0,
            source_failures: 0,
        }
    }

    /// Phase the next call to [`advance`](Self::advance) will run.
    pub fn phase(&self) -> CollectorPhase {
        self.phase
    }

    pub fn history(&self) -> &HistoryWindow {
        &self.history
    }

    /// The sample still being filled in; not visible to the trend.
    pub fn pending(&self) -> &Sample {
        &self.pending
    }

    /// Number of samples committed so far.
    pub fn cycles_completed(&self) -> u64 {
        self.cycle
    }

    /// Count queries that failed and were read as zero.
    pub fn source_failures(&self) -> u64 {
        self.source_failures
    }

    /// Run exactly one phase and rotate. Returns the phase that ran.
    pub fn advance<S: CountSource + ?Sized>(&mut self, source: &mut S) -> CollectorPhase {
        let ran = self.phase;
        match ran {
            CollectorPhase::CountMobile => self.count_group(source, CategoryGroup::Mobile),
            CollectorPhase::CountStatic => self.count_group(source, CategoryGroup::Static),
            CollectorPhase::Commit => self.commit(),
        }
        self.phase = ran.next();
        ran
    }

    /// Restart from an empty window and phase zero.
    pub fn reset(&mut self) {
        self.phase = CollectorPhase::default();
        self.pending = Sample::new(0);
        self.history.clear();
        self.cycle = 0;
        self.source_failures = 0;
    }

    fn count_group<S: CountSource + ?Sized>(&mut self, source: &mut S, group: CategoryGroup) {
        for category in group.categories() {
            let count = match source.count(category) {
                Ok(n) => n,
                Err(err) => {
                    self.source_failures += 1;
                    warn!(cycle = self.cycle, %category, %err, "count query failed, using 0");
                    0
                }
            };
            self.pending.set_count(category, Decimal::from(count));
        }
        debug!(cycle = self.cycle, group = group.name(), "group counted");
    }

    fn commit(&mut self) {
        self.cycle += 1;
        let next = Sample::new(self.cycle);
        let mut sample = std::mem::replace(&mut self.pending, next);
        sample.cycle = self.cycle;
        self.history.push(sample);
        let has_trend = self.history.recompute_summary().is_some();
        debug!(cycle = self.cycle, window = self.history.len(), has_trend, "sample committed");
        self.history.dump();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
