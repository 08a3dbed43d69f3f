// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Census Trend Engine - Coordinator

use std::sync::Arc;

use serde::Serialize;

use crate::collector::{CollectorPhase, CountSource, PhasedCollector};
use crate::config::{ConfigError, TrackerConfig};
use crate::history::HistoryWindow;
use crate::reactor::{DisasterAction, PhasedReactor, ReactorPhase, Transition};
use crate::types::CategoryRecord;

// ─── TickReport ──────────────────────────────────────────────────────────────

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub reactor_phase: ReactorPhase,
    pub collector_phase: CollectorPhase,
    pub transition: Option<Transition>,
    /// Whether a trend existed when the reactor looked.
    pub summary_available: bool,
    pub in_disaster: bool,
}

// ─── Coordinator ─────────────────────────────────────────────────────────────

/// One tracked actor: collector, reactor, and the two collaborators they use.
///
/// Each `tick` runs the reactor against the last committed trend first and
/// only then advances the collector, so the reactor never sees a half-built
/// sample.
pub struct Coordinator<S, A> {
    collector: PhasedCollector,
    reactor: PhasedReactor,
    source: S,
    action: A,
    tick: u64,
}

impl<S: CountSource, A: DisasterAction> Coordinator<S, A> {
    /// Reference configuration.
    pub fn new(source: S, action: A) -> Self {
        Self::build(&TrackerConfig::default(), source, action)
    }

    pub fn with_config(config: &TrackerConfig, source: S, action: A) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, source, action))
    }

    fn build(config: &TrackerConfig, source: S, action: A) -> Self {
        let history = HistoryWindow::new(config.history_capacity, Arc::new(config.priorities.clone()));
        Self {
            collector: PhasedCollector::new(history),
            reactor: PhasedReactor::new(config.support_trigger(), config.military_trigger),
            source,
            action,
            tick: 0,
        }
    }

    pub fn tick(&mut self) -> TickReport {
        let tick = self.tick;
        let summary = self.collector.history().summary();
        let summary_available = summary.is_some();
        let step = self.reactor.step(summary, &mut self.action, tick);
        let collector_phase = self.collector.advance(&mut self.source);
        self.tick += 1;

        TickReport {
            tick,
            reactor_phase: step.phase,
            collector_phase,
            transition: step.transition,
            summary_available,
            in_disaster: self.reactor.in_disaster(),
        }
    }

    /// Run `ticks` ticks, returning every transition that happened.
    pub fn run(&mut self, ticks: u64) -> Vec<(u64, Transition)> {
        (0..ticks)
            .filter_map(|_| {
                let report = self.tick();
                report.transition.map(|t| (report.tick, t))
            })
            .collect()
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn summary(&self) -> Option<&CategoryRecord> {
        self.collector.history().summary()
    }

    pub fn history(&self) -> &HistoryWindow {
        self.collector.history()
    }

    pub fn collector(&self) -> &PhasedCollector {
        &self.collector
    }

    pub fn reactor(&self) -> &PhasedReactor {
        &self.reactor
    }

    pub fn in_disaster(&self) -> bool {
        self.reactor.in_disaster()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn action_mut(&mut self) -> &mut A {
        &mut self.action
    }

    /// Forget all history and flags; collaborators are kept.
    pub fn reset(&mut self) {
        self.collector.reset();
        self.reactor.reset();
        self.tick = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::CountTable;
    use crate::reactor::{DisasterKind, DisasterLog};
    use crate::types::Category;
    use rust_decimal_macros::dec;

    fn tracker() -> Coordinator<CountTable, DisasterLog> {
        Coordinator::new(CountTable::new(), DisasterLog::new())
    }

    #[test]
    fn reactor_runs_before_collector() {
        let mut c = tracker();
        let reports: Vec<TickReport> = (0..6).map(|_| c.tick()).collect();
        // The second commit happens on tick 5; the reactor on that tick has
        // only seen one sample.
        assert!(reports.iter().all(|r| !r.summary_available));
        assert!(c.summary().is_some());
        assert!(c.tick().summary_available);
    }

    #[test]
    fn phases_advance_in_lockstep() {
        let mut c = tracker();
        let phases: Vec<(ReactorPhase, CollectorPhase)> =
            (0..4).map(|_| c.tick()).map(|r| (r.reactor_phase, r.collector_phase)).collect();
        assert_eq!(
            phases,
            vec![
                (ReactorPhase::SupportCheck, CollectorPhase::CountMobile),
                (ReactorPhase::MilitaryCheck, CollectorPhase::CountStatic),
                (ReactorPhase::Rest, CollectorPhase::Commit),
                (ReactorPhase::SupportCheck, CollectorPhase::CountMobile),
            ]
        );
    }

    #[test]
    fn population_crash_triggers_action_once() {
        let mut c = tracker();
        c.source_mut().set(Category::SUPPORT_UNIT, 20);
        c.run(6);
        c.source_mut().set(Category::SUPPORT_UNIT, 10);
        let transitions = c.run(12);
        assert_eq!(transitions.len(), 1, "got {:?}", transitions);
        assert_eq!(transitions[0].1, Transition::Entered(DisasterKind::Support));
        assert_eq!(c.action().len(), 1);
        assert!(c.in_disaster());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = TrackerConfig { history_capacity: 0, ..TrackerConfig::default() };
        assert!(Coordinator::with_config(&config, CountTable::new(), DisasterLog::new()).is_err());
    }

    #[test]
    fn reset_keeps_collaborators() {
        let mut c = tracker();
        c.source_mut().set(Category::SUPPORT_UNIT, 3);
        c.run(9);
        c.reset();
        assert_eq!(c.ticks(), 0);
        assert!(c.summary().is_none());
        assert_eq!(c.source().get(Category::SUPPORT_UNIT), Some(3));
    }

    #[test]
    fn support_trend_matches_reference_example() {
        let mut c = tracker();
        c.source_mut().set(Category::SUPPORT_UNIT, 5);
        c.run(3);
        c.source_mut().set(Category::SUPPORT_UNIT, 2);
        c.run(3);
        // newest (2) minus older (5), weight 1.5
        assert_eq!(c.summary().map(|s| s.get(Category::SUPPORT_UNIT)), Some(dec!(-4.5)));
    }
}
