// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Census Trend Engine

pub mod types;
pub mod priorities;
pub mod history;
pub mod collector;
pub mod reactor;
pub mod coordinator;
pub mod config;
pub mod adapter;

pub use types::*;
pub use priorities::PriorityTable;
pub use history::{HistoryWindow, Span, Unavailable};
pub use collector::{CollectorPhase, CountSource, CountTable, PhasedCollector, SourceError};
pub use reactor::{
    DisasterAction, DisasterContext, DisasterKind, DisasterLog, PhasedReactor, ReactorPhase,
    Transition, TrendTrigger,
};
pub use coordinator::{Coordinator, TickReport};
pub use config::{ConfigError, TrackerConfig};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser-facing tracker for one actor.
///
/// The host writes current counts with `set_count`, calls `tick` once per
/// turn, and drains disaster entries with `take_disasters`.
#[wasm_bindgen]
pub struct CensusTracker {
    inner: Coordinator<CountTable, DisasterLog>,
    config: TrackerConfig,
}

impl CensusTracker {
    pub fn from_config(config: TrackerConfig) -> Result<CensusTracker, ConfigError> {
        let inner = Coordinator::with_config(&config, CountTable::new(), DisasterLog::new())?;
        Ok(Self { inner, config })
    }

    pub fn coordinator(&self) -> &Coordinator<CountTable, DisasterLog> {
        &self.inner
    }
}

impl Default for CensusTracker {
    fn default() -> Self {
        Self {
            inner: Coordinator::new(CountTable::new(), DisasterLog::new()),
            config: TrackerConfig::default(),
        }
    }
}

#[wasm_bindgen]
impl CensusTracker {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self::default()
    }

    pub fn from_config_json(json: &str) -> Result<CensusTracker, JsValue> {
        let config = TrackerConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        CensusTracker::from_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Record the current count for `category` (bare or group-qualified
    /// name). Returns false for an unknown name.
    pub fn set_count(&mut self, category: &str, count: u32) -> bool {
        match category.parse::<Category>() {
            Ok(c) => {
                self.inner.source_mut().set(c, count);
                true
            }
            Err(_) => false,
        }
    }

    pub fn tick(&mut self) -> JsValue {
        let report = self.inner.tick();
        serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
    }

    /// Current trend as `{ "group.category": number }`, or null.
    pub fn summary(&self) -> JsValue {
        match self.inner.summary() {
            Some(s) => serde_wasm_bindgen::to_value(&adapter::record_to_f64(s)).unwrap_or(JsValue::NULL),
            None => JsValue::NULL,
        }
    }

    /// `span` is one of `full`, `half`, `recent3`; null when unavailable.
    pub fn compare(&self, span: &str) -> JsValue {
        let span = match span {
            "full" => Span::Full,
            "half" => Span::Half,
            "recent3" => Span::Recent3,
            _ => return JsValue::NULL,
        };
        match self.inner.history().compare_endpoints(span) {
            Ok(r) => serde_wasm_bindgen::to_value(&adapter::record_to_f64(&r)).unwrap_or(JsValue::NULL),
            Err(_) => JsValue::NULL,
        }
    }

    pub fn in_disaster(&self) -> bool {
        self.inner.in_disaster()
    }

    pub fn ticks(&self) -> u64 {
        self.inner.ticks()
    }

    /// Disaster entries since the last call.
    pub fn take_disasters(&mut self) -> JsValue {
        let entries = self.inner.action_mut().take();
        serde_wasm_bindgen::to_value(&entries).unwrap_or(JsValue::NULL)
    }

    /// Reset to the initial state, keeping the configuration.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = match CensusTracker::from_config(config) {
            Ok(tracker) => tracker,
            Err(_) => CensusTracker::default(),
        };
    }
}
