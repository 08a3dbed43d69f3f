// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Census Trend Engine - Phased Reactor

//! Disaster detection over the committed trend.
//!
//! Rotates through one check per tick:
//!
//! ```text
//! SupportCheck -> MilitaryCheck -> Rest -> SupportCheck -> ...
//! ```
//!
//! A check enters its disaster state when the watched trend drops below the
//! threshold and leaves it as soon as the trend recovers. Only entry invokes
//! the [`DisasterAction`]; exit is silent apart from the returned
//! [`Transition`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{Category, CategoryRecord};

/// Reference support-unit trend below which a disaster is declared.
pub const DEFAULT_SUPPORT_THRESHOLD: Decimal = dec!(-2);

// ---------------------------------------------------------------------------
// Triggers and context
// ---------------------------------------------------------------------------

/// Fires when `summary[category] < threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendTrigger {
    pub category: Category,
    pub threshold: Decimal,
}

impl TrendTrigger {
    pub fn new(category: Category, threshold: Decimal) -> Self {
        Self { category, threshold }
    }

    pub fn support_default() -> Self {
        Self::new(Category::SUPPORT_UNIT, DEFAULT_SUPPORT_THRESHOLD)
    }

    pub fn is_tripped(&self, summary: &CategoryRecord) -> bool {
        summary.get(self.category) < self.threshold
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterKind {
    /// Economy collapse: support units are being lost.
    Support,
    /// Military or structure losses.
    Military,
}

/// Handed to the action layer on disaster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisasterContext {
    pub kind: DisasterKind,
    pub category: Category,
    /// Trend value that tripped the threshold.
    pub trend: Decimal,
    pub threshold: Decimal,
    pub tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "edge", content = "kind")]
pub enum Transition {
    Entered(DisasterKind),
    Cleared(DisasterKind),
}

// ---------------------------------------------------------------------------
// Action layer
// ---------------------------------------------------------------------------

/// Whatever pauses and clears the host's active plans.
///
/// Invoked once per false→true edge of a disaster flag, never on exit or on
/// steady state.
pub trait DisasterAction {
    fn on_disaster_enter(&mut self, context: &DisasterContext);
}

impl<F> DisasterAction for F
where
    F: FnMut(&DisasterContext),
{
    fn on_disaster_enter(&mut self, context: &DisasterContext) {
        self(context)
    }
}

/// Records every entry so a host can drain them after the tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisasterLog {
    entries: Vec<DisasterContext>,
}

impl DisasterLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[DisasterContext] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn take(&mut self) -> Vec<DisasterContext> {
        std::mem::take(&mut self.entries)
    }
}

impl DisasterAction for DisasterLog {
    fn on_disaster_enter(&mut self, context: &DisasterContext) {
        self.entries.push(context.clone());
    }
}

// ---------------------------------------------------------------------------
// ReactorPhase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactorPhase {
    #[default]
    SupportCheck,
    MilitaryCheck,
    /// Idle tick that restarts the rotation.
    Rest,
}

impl ReactorPhase {
    pub fn next(self) -> Self {
        match self {
            Self::SupportCheck => Self::MilitaryCheck,
            Self::MilitaryCheck => Self::Rest,
            Self::Rest => Self::SupportCheck,
        }
    }
}

/// Outcome of one [`PhasedReactor::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactorStep {
    pub phase: ReactorPhase,
    pub transition: Option<Transition>,
}

// ---------------------------------------------------------------------------
// PhasedReactor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PhasedReactor {
    phase: ReactorPhase,
    support: TrendTrigger,
    military: Option<TrendTrigger>,
    support_disaster: bool,
    military_disaster: bool,
}

impl Default for PhasedReactor {
    fn default() -> Self {
        Self::new(TrendTrigger::support_default(), None)
    }
}

impl PhasedReactor {
    /// `military = None` leaves the second check as a no-op.
    pub fn new(support: TrendTrigger, military: Option<TrendTrigger>) -> Self {
        Self {
            phase: ReactorPhase::default(),
            support,
            military,
            support_disaster: false,
            military_disaster: false,
        }
    }

    /// Phase the next call to [`step`](Self::step) will run.
    pub fn phase(&self) -> ReactorPhase {
        self.phase
    }

    /// The support-unit disaster flag.
    pub fn in_disaster(&self) -> bool {
        self.support_disaster
    }

    pub fn military_disaster(&self) -> bool {
        self.military_disaster
    }

    /// Run the current phase's check against `summary` and rotate.
    ///
    /// `summary = None` (not enough history) skips the check and leaves the
    /// flags as they were.
    pub fn step<A: DisasterAction + ?Sized>(
        &mut self,
        summary: Option<&CategoryRecord>,
        action: &mut A,
        tick: u64,
    ) -> ReactorStep {
        let phase = self.phase;
        let transition = match (phase, summary) {
            (ReactorPhase::SupportCheck, Some(summary)) => Self::evaluate(
                DisasterKind::Support,
                &self.support,
                &mut self.support_disaster,
                summary,
                action,
                tick,
            ),
            (ReactorPhase::MilitaryCheck, Some(summary)) => match &self.military {
                Some(trigger) => Self::evaluate(
                    DisasterKind::Military,
                    trigger,
                    &mut self.military_disaster,
                    summary,
                    action,
                    tick,
                ),
                None => None,
            },
            (ReactorPhase::Rest, _) => None,
            (_, None) => {
                debug!(tick, ?phase, "no trend yet, check skipped");
                None
            }
        };
        self.phase = phase.next();
        ReactorStep { phase, transition }
    }

    pub fn reset(&mut self) {
        self.phase = ReactorPhase::default();
        self.support_disaster = false;
        self.military_disaster = false;
    }

    fn evaluate<A: DisasterAction + ?Sized>(
        kind: DisasterKind,
        trigger: &TrendTrigger,
        flag: &mut bool,
        summary: &CategoryRecord,
        action: &mut A,
        tick: u64,
    ) -> Option<Transition> {
        let trend = summary.get(trigger.category);
        match (trigger.is_tripped(summary), *flag) {
            (true, false) => {
                *flag = true;
                info!(tick, ?kind, category = %trigger.category, %trend, "entering disaster state");
                action.on_disaster_enter(&DisasterContext {
                    kind,
                    category: trigger.category,
                    trend,
                    threshold: trigger.threshold,
                    tick,
                });
                Some(Transition::Entered(kind))
            }
            (false, true) => {
                *flag = false;
                info!(tick, ?kind, category = %trigger.category, %trend, "disaster state cleared");
                Some(Transition::Cleared(kind))
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
