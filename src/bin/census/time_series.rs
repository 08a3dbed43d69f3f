// Per-Tick JSONL Time Series Recorder
// Outputs one JSON line per tick for independent analysis

use serde::Serialize;
use census_engine::adapter::from_decimal;
use census_engine::{Category, TickReport, Transition};
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub support_count: u32,
    /// Support-unit trend at the end of the tick; None before two commits.
    pub support_trend: Option<f64>,
    pub window_len: usize,
    pub in_disaster: bool,
    pub transition: Option<Transition>,
}

impl TickSnapshot {
    pub fn new(
        report: &TickReport,
        support_count: u32,
        summary: Option<&census_engine::CategoryRecord>,
        window_len: usize,
    ) -> Self {
        Self {
            tick: report.tick,
            support_count,
            support_trend: summary.map(|s| from_decimal(s.get(Category::SUPPORT_UNIT))),
            window_len,
            in_disaster: report.in_disaster,
            transition: report.transition,
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, snapshot: TickSnapshot) {
        self.snapshots.push(snapshot);
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
