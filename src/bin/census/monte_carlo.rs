// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N (wrapping), computing mean ± 95% CI

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use census_engine::*;
use tracing::{debug, warn};

use crate::population::Population;
use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::{TickSnapshot, TimeSeriesRecorder};

use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    config: &TrackerConfig,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> Result<RunResult, ConfigError> {
    let start = Instant::now();
    let rng = ChaCha8Rng::seed_from_u64(seed);
    let population = Population::new(rng, scenario.support, scenario.soldiers, scenario.structures)
        .with_dynamics(scenario.growth, scenario.attrition, scenario.failure_rate);
    let mut tracker = Coordinator::with_config(config, population, DisasterLog::new())?;

    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    for tick in 0..scenario.ticks {
        {
            let population = tracker.source_mut();
            population.evolve();
            for raid in scenario.raids.iter().filter(|r| r.tick == tick) {
                population.apply_raid(raid);
            }
        }

        let report = tracker.tick();

        if let Some(ts) = time_series.as_mut() {
            ts.record(TickSnapshot::new(
                &report,
                tracker.source().support(),
                tracker.summary(),
                tracker.history().len(),
            ));
        }
    }

    if let (Some(dir), Some(ts)) = (time_series_dir, time_series.as_ref()) {
        let path = dir.join(format!("{}-seed{}.jsonl", scenario.name.to_lowercase(), seed));
        match ts.write_jsonl(&path) {
            Ok(()) => debug!(path = %path.display(), rows = ts.len(), "time series written"),
            Err(err) => warn!(path = %path.display(), %err, "failed to write time series"),
        }
    }

    let entries = tracker.action().entries();
    let first_disaster_tick = entries.first().map(|e| e.tick);
    let reaction_ticks = match (scenario.first_raid_tick(), first_disaster_tick) {
        (Some(raid), Some(hit)) if hit >= raid => Some(hit - raid),
        _ => None,
    };
    let in_disaster_at_end = tracker.in_disaster();

    let criteria = &scenario.criteria;
    let mut pass = true;
    if let Some(expect) = criteria.expect_disaster {
        pass &= expect == !entries.is_empty();
    }
    if let Some(max) = criteria.max_reaction_ticks {
        pass &= reaction_ticks.map_or(false, |r| r <= max);
    }
    if criteria.require_recovery {
        pass &= !in_disaster_at_end;
    }

    Ok(RunResult {
        scenario: scenario.name.to_string(),
        seed,
        pass,
        disaster_entries: entries.len() as u32,
        first_disaster_tick,
        reaction_ticks,
        in_disaster_at_end,
        final_support: tracker.source().support(),
        source_failures: tracker.collector().source_failures(),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    })
}

/// Run `runs` seeds of one scenario and aggregate.
pub fn run_monte_carlo(
    scenario: &Scenario,
    config: &TrackerConfig,
    runs: usize,
    base_seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> Result<ScenarioReport, ConfigError> {
    let results = (0..runs as u64)
        .map(|i| run_single(scenario, config, base_seed.wrapping_add(i), time_series_dir))
        .collect::<Result<Vec<_>, _>>()?;

    let collect = |f: &dyn Fn(&RunResult) -> Option<f64>| -> Vec<f64> {
        results.iter().filter_map(f).collect()
    };

    let passed = results.iter().filter(|r| r.pass).count();
    Ok(ScenarioReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        runs,
        pass_rate: if runs > 0 { passed as f64 / runs as f64 } else { 0.0 },
        disaster_entries: Stats::from_samples(&collect(&|r| Some(r.disaster_entries as f64))),
        reaction_ticks: Stats::from_samples(&collect(&|r| r.reaction_ticks.map(|t| t as f64))),
        final_support: Stats::from_samples(&collect(&|r| Some(r.final_support as f64))),
        source_failures: Stats::from_samples(&collect(&|r| Some(r.source_failures as f64))),
        elapsed_ms: Stats::from_samples(&collect(&|r| Some(r.elapsed_ms))),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::scenarios;

    fn scenario(name: &str) -> Scenario {
        scenarios()
            .into_iter()
            .find(|s| s.name == name)
            .expect("test: scenario exists")
    }

    #[test]
    fn steady_state_never_triggers() {
        let r = run_single(&scenario("STEADY_STATE"), &TrackerConfig::default(), 0, None)
            .expect("test: default config is valid");
        assert_eq!(r.disaster_entries, 0);
        assert!(r.pass);
    }

    #[test]
    fn raid_is_detected() {
        let r = run_single(&scenario("RAID_WORKERS"), &TrackerConfig::default(), 0, None)
            .expect("test: default config is valid");
        assert!(r.disaster_entries >= 1);
        let reaction = r.reaction_ticks.expect("test: disaster after raid");
        assert!(reaction <= 9, "reaction {}", reaction);
    }

    #[test]
    fn runs_are_reproducible() {
        let s = scenario("SLOW_ATTRITION");
        let a = run_single(&s, &TrackerConfig::default(), 11, None).expect("test: run");
        let b = run_single(&s, &TrackerConfig::default(), 11, None).expect("test: run");
        assert_eq!(a.first_disaster_tick, b.first_disaster_tick);
        assert_eq!(a.disaster_entries, b.disaster_entries);
        assert_eq!(a.final_support, b.final_support);
    }

    #[test]
    fn monte_carlo_aggregates_every_run() {
        let report = run_monte_carlo(&scenario("STEADY_STATE"), &TrackerConfig::default(), 3, 0, None)
            .expect("test: run");
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.disaster_entries.n, 3);
        assert_eq!(report.pass_rate, 1.0);
    }

    #[test]
    fn seed_range_wraps_at_u64_max() {
        let report = run_monte_carlo(&scenario("STEADY_STATE"), &TrackerConfig::default(), 2, u64::MAX, None)
            .expect("test: run");
        let seeds: Vec<u64> = report.results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![u64::MAX, 0]);
    }
}
