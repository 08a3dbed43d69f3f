// Scenario Definitions: population shocks the disaster detector must (or must not) react to
// All scenario logic lives in the population dynamics and scripted raids

use crate::population::Raid;

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub ticks: u64,
    pub support: u32,
    pub soldiers: u32,
    pub structures: u32,
    /// Expected support units trained per tick.
    pub growth: f64,
    /// Per-unit death chance per tick.
    pub attrition: f64,
    /// Chance each count query fails.
    pub failure_rate: f64,
    pub raids: Vec<Raid>,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    /// Some(true): must enter disaster; Some(false): must never.
    pub expect_disaster: Option<bool>,
    /// Max ticks from the first raid to the first disaster entry.
    pub max_reaction_ticks: Option<u64>,
    /// Disaster must have cleared by the final tick.
    pub require_recovery: bool,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            expect_disaster: None,
            max_reaction_ticks: None,
            require_recovery: false,
        }
    }
}

impl Scenario {
    pub fn first_raid_tick(&self) -> Option<u64> {
        self.raids.iter().map(|r| r.tick).min()
    }
}

// ─── Scenario Catalogue ─────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "STEADY_STATE",
            label: "Steady economy, no shocks",
            category: "baseline",
            ticks: 300,
            support: 40,
            soldiers: 10,
            structures: 3,
            growth: 0.0,
            attrition: 0.0,
            failure_rate: 0.0,
            raids: Vec::new(),
            criteria: PassCriteria { expect_disaster: Some(false), ..PassCriteria::default() },
        },
        Scenario {
            name: "BOOM_ECONOMY",
            label: "Fast support growth",
            category: "baseline",
            ticks: 300,
            support: 10,
            soldiers: 5,
            structures: 2,
            growth: 0.8,
            attrition: 0.0,
            failure_rate: 0.0,
            raids: Vec::new(),
            criteria: PassCriteria { expect_disaster: Some(false), ..PassCriteria::default() },
        },
        Scenario {
            name: "RAID_WORKERS",
            label: "Raid kills half the support units",
            category: "shock",
            ticks: 300,
            support: 40,
            soldiers: 10,
            structures: 3,
            growth: 0.3,
            attrition: 0.0,
            failure_rate: 0.0,
            raids: vec![Raid { tick: 120, support_loss: 0.5, structure_loss: 0.0 }],
            criteria: PassCriteria {
                expect_disaster: Some(true),
                max_reaction_ticks: Some(9),
                require_recovery: true,
            },
        },
        Scenario {
            name: "DOUBLE_RAID",
            label: "Two raids, disaster re-entered",
            category: "shock",
            ticks: 400,
            support: 50,
            soldiers: 10,
            structures: 3,
            growth: 0.4,
            attrition: 0.0,
            failure_rate: 0.0,
            raids: vec![
                Raid { tick: 100, support_loss: 0.4, structure_loss: 0.2 },
                Raid { tick: 250, support_loss: 0.4, structure_loss: 0.2 },
            ],
            criteria: PassCriteria {
                expect_disaster: Some(true),
                max_reaction_ticks: Some(9),
                require_recovery: true,
            },
        },
        Scenario {
            name: "SLOW_ATTRITION",
            label: "Gradual losses without replacement",
            category: "drift",
            ticks: 400,
            support: 60,
            soldiers: 10,
            structures: 3,
            growth: 0.0,
            attrition: 0.01,
            failure_rate: 0.0,
            raids: Vec::new(),
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "FLAKY_SOURCE",
            label: "Steady economy, 1% query failures",
            category: "robustness",
            ticks: 300,
            support: 40,
            soldiers: 10,
            structures: 3,
            growth: 0.0,
            attrition: 0.0,
            failure_rate: 0.01,
            raids: Vec::new(),
            criteria: PassCriteria::default(),
        },
    ]
}
