//! Adapter layer: converts the engine's Decimal records to the f64 values
//! hosts and reports work with.

use std::collections::BTreeMap;

use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::types::CategoryRecord;

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Flatten a record to `"group.category" -> value`, sorted by key.
pub fn record_to_f64(record: &CategoryRecord) -> BTreeMap<String, f64> {
    record.iter().map(|(c, v)| (c.to_string(), from_decimal(v))).collect()
}
