#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use census_engine::{
        Category, CensusTracker, Coordinator, CountTable, DisasterContext, DisasterKind,
        DisasterLog, HistoryWindow, MobileCategory, Sample, SourceError, Span, StaticCategory,
        TickReport, TrackerConfig, Transition, TrendTrigger, Unavailable,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    type Tracker = Coordinator<CountTable, DisasterLog>;

    fn support(cycle: u64, n: i64) -> Sample {
        Sample::new(cycle).with(Category::SUPPORT_UNIT, Decimal::from(n))
    }

    /// Feed one full collection cycle (three ticks) with `n` support units.
    fn cycle(tracker: &mut Tracker, n: u32) -> Vec<(u64, Transition)> {
        tracker.source_mut().set(Category::SUPPORT_UNIT, n);
        tracker.run(3)
    }

    fn support_trend(tracker: &Tracker) -> Option<Decimal> {
        tracker.summary().map(|s| s.get(Category::SUPPORT_UNIT))
    }

    // ========== History Window ==========

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut w = HistoryWindow::with_default_priorities(3);
        for cycle in 1..=5 {
            w.push(support(cycle, cycle as i64));
            assert!(w.len() <= 3);
        }
        let cycles: Vec<u64> = w.iter().map(|s| s.cycle).collect();
        assert_eq!(cycles, vec![5, 4, 3], "newest first, oldest evicted");
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut w = HistoryWindow::with_default_priorities(10);
        for (i, n) in [12, 9, 14, 3].into_iter().enumerate() {
            w.push(support(i as u64, n));
        }
        let first = w.recompute_summary().cloned();
        let second = w.recompute_summary().cloned();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_decayed_sum_of_differences() {
        // Pushed oldest first: 10, 6, 4.
        let mut w = HistoryWindow::with_default_priorities(10);
        w.push(support(1, 10));
        w.push(support(2, 6));
        w.push(support(3, 4));
        let summary = w.recompute_summary().expect("three samples");
        // (4-6)*1.5 + (6-10)*1.5/2
        assert_eq!(summary.get(Category::SUPPORT_UNIT), dec!(-6));
        assert_eq!(w.differences().len(), 2);
        assert_eq!(w.differences()[1].get(Category::SUPPORT_UNIT), dec!(-3));
    }

    #[test]
    fn test_single_sample_has_no_trend() {
        let mut w = HistoryWindow::with_default_priorities(10);
        w.push(support(1, 8));
        assert!(w.recompute_summary().is_none());
        assert!(w.summary().is_none());
    }

    #[test]
    fn test_recent3_needs_three_samples() {
        let mut w = HistoryWindow::with_default_priorities(10);
        w.push(support(1, 2));
        w.push(support(2, 4));
        assert_eq!(
            w.compare_endpoints(Span::Recent3),
            Err(Unavailable::InsufficientHistory { required: 3, available: 2 })
        );
        let full = w.compare_endpoints(Span::Full).expect("two distinct samples");
        assert_eq!(full.get(Category::SUPPORT_UNIT), dec!(3));
    }

    #[test]
    fn test_same_sample_twice_is_degenerate() {
        let mut w = HistoryWindow::with_default_priorities(2);
        let shared = Arc::new(support(1, 5));
        w.push(Arc::clone(&shared));
        w.push(shared);
        assert_eq!(w.compare_endpoints(Span::Full), Err(Unavailable::IdenticalEndpoints));
        assert_eq!(w.compare_endpoints(Span::Half), Err(Unavailable::IdenticalEndpoints));
    }

    // ========== Coordinator End-to-End ==========

    #[test]
    fn test_support_drop_enters_disaster_on_next_check() {
        let mut tracker: Tracker = Coordinator::new(CountTable::new(), DisasterLog::new());
        assert!(cycle(&mut tracker, 5).is_empty());
        assert!(cycle(&mut tracker, 2).is_empty());
        assert_eq!(support_trend(&tracker), Some(dec!(-4.5)));

        let report = tracker.tick();
        assert_eq!(report.tick, 6);
        assert_eq!(report.transition, Some(Transition::Entered(DisasterKind::Support)));

        let entries = tracker.action().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].trend, dec!(-4.5));
        assert_eq!(entries[0].threshold, dec!(-2));
        assert_eq!(entries[0].tick, 6);
    }

    #[test]
    fn test_support_growth_is_positive_trend() {
        let mut tracker: Tracker = Coordinator::new(CountTable::new(), DisasterLog::new());
        cycle(&mut tracker, 2);
        cycle(&mut tracker, 5);
        assert_eq!(support_trend(&tracker), Some(dec!(4.5)));
        assert!(tracker.run(30).is_empty());
        assert!(!tracker.in_disaster());
    }

    #[test]
    fn test_hysteresis_enter_clear_reenter() {
        let mut tracker: Tracker = Coordinator::new(CountTable::new(), DisasterLog::new());
        let transitions: Vec<(u64, Transition)> = [10, 10, 8, 8, 8, 5, 5]
            .into_iter()
            .flat_map(|n| cycle(&mut tracker, n))
            .collect();

        assert_eq!(
            transitions,
            vec![
                (9, Transition::Entered(DisasterKind::Support)),
                (12, Transition::Cleared(DisasterKind::Support)),
                (18, Transition::Entered(DisasterKind::Support)),
            ]
        );
        assert_eq!(tracker.action().len(), 2, "action fires on entry only");
    }

    #[test]
    fn test_sustained_decline_fires_action_once() {
        let mut tracker: Tracker = Coordinator::new(CountTable::new(), DisasterLog::new());
        for n in [40, 35, 30, 25, 20, 15, 10, 5] {
            cycle(&mut tracker, n);
        }
        assert!(tracker.in_disaster());
        assert_eq!(tracker.action().len(), 1);
    }

    #[test]
    fn test_military_trigger_is_independent() {
        let barracks = Category::Static(StaticCategory::Barracks);
        let config = TrackerConfig {
            military_trigger: Some(TrendTrigger::new(barracks, dec!(-10))),
            ..TrackerConfig::default()
        };
        let mut tracker =
            Coordinator::with_config(&config, CountTable::new(), DisasterLog::new()).expect("valid");
        tracker.source_mut().set(barracks, 3);
        cycle(&mut tracker, 10);
        tracker.source_mut().set(barracks, 1);
        cycle(&mut tracker, 10);

        // Support check on tick 6, military check on tick 7.
        let reports: Vec<TickReport> = (0..2).map(|_| tracker.tick()).collect();
        assert_eq!(reports[0].transition, None);
        assert_eq!(reports[1].transition, Some(Transition::Entered(DisasterKind::Military)));
        assert!(tracker.reactor().military_disaster());
        assert!(!tracker.in_disaster(), "support flag untouched");
        assert_eq!(tracker.action().entries()[0].category, barracks);
    }

    #[test]
    fn test_closure_action_layer() {
        let mut fired: Vec<DisasterContext> = Vec::new();
        {
            let mut tracker = Coordinator::new(CountTable::new(), |ctx: &DisasterContext| {
                fired.push(ctx.clone())
            });
            tracker.source_mut().set(Category::SUPPORT_UNIT, 30);
            tracker.run(6);
            tracker.source_mut().set(Category::SUPPORT_UNIT, 0);
            tracker.run(6);
        }
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, DisasterKind::Support);
    }

    #[test]
    fn test_identical_inputs_identical_runs() {
        let drive = || {
            let mut turn = 0u32;
            let source = move |category: Category| -> Result<u32, SourceError> {
                turn += 1;
                Ok(match category {
                    Category::Mobile(MobileCategory::SupportUnit) => 50u32.saturating_sub(turn / 4),
                    _ => turn % 7,
                })
            };
            let mut tracker = Coordinator::new(source, DisasterLog::new());
            let reports: Vec<TickReport> = (0..120).map(|_| tracker.tick()).collect();
            (reports, tracker.summary().cloned(), tracker.action().entries().to_vec())
        };
        assert_eq!(drive(), drive());
    }

    #[test]
    fn test_flaky_source_never_panics() {
        let mut calls = 0u64;
        let flaky = move |_: Category| -> Result<u32, SourceError> {
            calls += 1;
            if calls % 3 == 0 {
                Err(SourceError::Unavailable("entity query timed out".into()))
            } else {
                Ok(12)
            }
        };
        let mut tracker = Coordinator::new(flaky, DisasterLog::new());
        tracker.run(300);
        assert_eq!(tracker.ticks(), 300);
        assert!(tracker.collector().source_failures() > 0);
        assert_eq!(tracker.history().len(), 10);
    }

    #[test]
    fn test_reset_forgets_history_and_flags() {
        let mut tracker: Tracker = Coordinator::new(CountTable::new(), DisasterLog::new());
        cycle(&mut tracker, 9);
        cycle(&mut tracker, 1);
        tracker.tick();
        assert!(tracker.in_disaster());

        tracker.reset();
        assert!(!tracker.in_disaster());
        assert!(tracker.history().is_empty());
        assert!(tracker.summary().is_none());
        assert_eq!(tracker.ticks(), 0);
        assert_eq!(tracker.action().len(), 1, "collaborators survive reset");
    }

    #[test]
    fn test_largest_window_runs_without_fault() {
        let config = TrackerConfig {
            history_capacity: census_engine::history::MAX_CAPACITY,
            ..TrackerConfig::default()
        };
        let mut tracker =
            Coordinator::with_config(&config, CountTable::new(), DisasterLog::new()).expect("valid");
        for n in (0..120u32).rev() {
            cycle(&mut tracker, n);
        }
        assert_eq!(tracker.history().len(), census_engine::history::MAX_CAPACITY);
        assert!(tracker.summary().is_some());
    }

    #[test]
    fn test_oversized_capacity_rejected_before_building() {
        for capacity in [120, usize::MAX] {
            let config = TrackerConfig { history_capacity: capacity, ..TrackerConfig::default() };
            assert!(Coordinator::with_config(&config, CountTable::new(), DisasterLog::new()).is_err());
            assert!(CensusTracker::from_config(config).is_err());
        }
    }

    #[test]
    fn test_huge_weight_saturates_instead_of_panicking() {
        let config = TrackerConfig {
            priorities: census_engine::PriorityTable::default()
                .with_weight(Category::SUPPORT_UNIT, Decimal::MAX),
            ..TrackerConfig::default()
        };
        let mut tracker =
            Coordinator::with_config(&config, CountTable::new(), DisasterLog::new()).expect("valid");
        for n in [u32::MAX, 0, u32::MAX, 0] {
            cycle(&mut tracker, n);
        }
        tracker.run(30);
        assert!(tracker.summary().is_some());
        assert!(tracker.action().len() >= 1);
    }

    // ========== Host Surface ==========

    #[test]
    fn test_tracker_accepts_bare_and_qualified_names() {
        let mut tracker = CensusTracker::new();
        assert!(tracker.set_count("support_unit", 5));
        assert!(tracker.set_count("static.house", 2));
        assert!(!tracker.set_count("dragon", 1));

        let source = tracker.coordinator().source();
        assert_eq!(source.get(Category::SUPPORT_UNIT), Some(5));
        assert_eq!(source.get(Category::Static(StaticCategory::House)), Some(2));
        assert!(!tracker.in_disaster());
        assert_eq!(tracker.ticks(), 0);
    }

    #[test]
    fn test_tracker_config_json() {
        let tracker = CensusTracker::from_config(
            TrackerConfig::from_json(r#"{ "history_capacity": 4 }"#).expect("valid json"),
        )
        .expect("valid config");
        assert_eq!(tracker.coordinator().history().capacity(), 4);

        let bad = TrackerConfig { history_capacity: 1, ..TrackerConfig::default() };
        assert!(CensusTracker::from_config(bad).is_err());
    }

    #[test]
    fn test_tracker_reset_keeps_config() {
        let config = TrackerConfig { history_capacity: 3, ..TrackerConfig::default() };
        let mut tracker = CensusTracker::from_config(config).expect("valid config");
        tracker.set_count("support_unit", 7);
        tracker.reset();
        assert_eq!(tracker.coordinator().history().capacity(), 3);
        assert_eq!(tracker.coordinator().source().get(Category::SUPPORT_UNIT), None);
    }
}
