// Scenario Report Types
// Structured JSON output for the census scenario runner

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub scenario: String,
    pub seed: u64,
    pub pass: bool,
    pub disaster_entries: u32,
    pub first_disaster_tick: Option<u64>,
    /// Ticks between the first raid and the first disaster entry.
    pub reaction_ticks: Option<u64>,
    pub in_disaster_at_end: bool,
    pub final_support: u32,
    pub source_failures: u64,
    pub elapsed_ms: f64,
}

// ─── Scenario Aggregate ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub runs: usize,
    pub pass_rate: f64,
    pub disaster_entries: Stats,
    pub reaction_ticks: Stats,
    pub final_support: Stats,
    pub source_failures: Stats,
    pub elapsed_ms: Stats,
    pub results: Vec<RunResult>,
}

// ─── Suite Report ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct SuiteReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub config: census_engine::TrackerConfig,
    pub summary: SuiteSummary,
    pub scenarios: Vec<ScenarioReport>,
}
