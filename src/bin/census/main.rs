// Census Scenario Runner: disaster detector validation over synthetic populations
// Monte Carlo (N=30), seedable PRNG, optional per-tick JSONL trail
//
// Usage:
//   cargo run --release --bin census                        # Run all scenarios (30 runs each)
//   cargo run --release --bin census -- --runs 5            # Quick mode (5 runs each)
//   cargo run --release --bin census -- RAID                # Filter by name, label or category
//   cargo run --release --bin census -- --time-series       # Enable JSONL output
//   cargo run --release --bin census -- --seed 42           # Custom base seed
//   cargo run --release --bin census -- --config cfg.json   # Tracker configuration
//
// Log verbosity follows RUST_LOG (default: warn).

mod population;
mod report;
mod scenarios;
mod monte_carlo;
mod time_series;

use census_engine::{ConfigError, TrackerConfig};
use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PASS_THRESHOLD: f64 = 0.933;

#[derive(Debug, thiserror::Error)]
enum RunnerError {
    #[error("no scenarios match filter: {0:?}")]
    NoScenarios(Option<String>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    time_series: bool,
    config: Option<PathBuf>,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        time_series: false,
        config: None,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(PathBuf::from(&args[i]));
                }
            }
            "--time-series" => {
                cli.time_series = true;
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn load_config(path: Option<&PathBuf>) -> Result<TrackerConfig, RunnerError> {
    match path {
        Some(p) => {
            let json = std::fs::read_to_string(p)?;
            let config = TrackerConfig::from_json(&json)?;
            info!(path = %p.display(), "loaded tracker config");
            Ok(config)
        }
        None => Ok(TrackerConfig::default()),
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("census: {}", err);
            ExitCode::from(2)
        }
    }
}

/// Returns whether every selected scenario passed.
fn run() -> Result<bool, RunnerError> {
    let cli = parse_args();
    let config = load_config(cli.config.as_ref())?;
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        return Err(RunnerError::NoScenarios(cli.filter));
    }

    let ts_dir = cli.time_series.then(|| PathBuf::from("census-results/time-series"));

    println!("\n  Census Scenario Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Window: {} | Support threshold: {}", config.history_capacity, config.support_threshold);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<36} {:>5} {:>9} {:>10} {:>8} {:>6} {:>7}",
        "Scenario", "Pass%", "Entries", "Reaction", "Support", "Fails", "Time");
    println!("  {}", "-".repeat(88));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(
            scenario,
            &config,
            cli.runs,
            cli.seed,
            ts_dir.as_deref(),
        )?;

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= PASS_THRESHOLD { "PASS" } else { "FAIL" };
        let reaction = if report.reaction_ticks.n > 0 {
            format!("{:.1}", report.reaction_ticks.mean)
        } else {
            "-".to_string()
        };

        println!("  {:<36} {:>4}% {:>9.2} {:>10} {:>8.1} {:>6.1} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.disaster_entries.mean,
            reaction,
            report.final_support.mean,
            report.source_failures.mean,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= PASS_THRESHOLD).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(88));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = SuiteReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        config,
        summary: SuiteSummary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: mc_reports,
    };

    let dir = std::path::Path::new("census-results");
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("census-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, &json)?;
    println!("  Results saved to: {}\n", path.display());

    Ok(failed == 0)
}
