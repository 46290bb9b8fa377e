//! Notification policies applied after diffing, and variant highlighting.

use invbot_core::{config::NotifyConfig, model::InventoryRecord};

/// Decides whether a detected record is worth notifying about.
pub trait RecordFilter: Send + Sync {
    fn accepts(&self, record: &InventoryRecord) -> bool;
}

/// Lets everything through.
pub struct AcceptAll;

impl RecordFilter for AcceptAll {
    fn accepts(&self, _record: &InventoryRecord) -> bool {
        true
    }
}

/// Keeps records whose display price is known and at or below `max`.
#[derive(Debug, Clone, Copy)]
pub struct PriceCeiling {
    max: f64,
}

impl PriceCeiling {
    pub fn new(max: f64) -> Self {
        Self { max }
    }
}

impl RecordFilter for PriceCeiling {
    fn accepts(&self, record: &InventoryRecord) -> bool {
        matches!(record.display_price(), Some(p) if p.is_finite() && p <= self.max)
    }
}

/// Notification filter for the configured price ceiling, if any.
pub fn filter_from_config(config: &NotifyConfig) -> Box<dyn RecordFilter> {
    match config.price_ceiling() {
        Some(max) => Box::new(PriceCeiling::new(max)),
        None => Box::new(AcceptAll),
    }
}

/// Marks notable variants in rendered output.
pub trait Highlight: Send + Sync {
    fn is_highlighted(&self, record: &InventoryRecord) -> bool;
}

/// Never highlights.
pub struct NoHighlight;

impl Highlight for NoHighlight {
    fn is_highlighted(&self, _record: &InventoryRecord) -> bool {
        false
    }
}

/// Highlights records whose option `group` has a numeric value of at least `min`.
///
/// Only the leading number of the value counts, so `"568"`, `"568 km"` and
/// `"568.5"` all parse. Missing groups and non-numeric values never match.
#[derive(Debug, Clone)]
pub struct MinSpec {
    pub group: String,
    pub min: f64,
}

impl MinSpec {
    pub fn new(group: impl Into<String>, min: f64) -> Self {
        Self {
            group: group.into(),
            min,
        }
    }
}

impl Default for MinSpec {
    fn default() -> Self {
        Self::new("SPECS_RANGE", 568.0)
    }
}

impl Highlight for MinSpec {
    fn is_highlighted(&self, record: &InventoryRecord) -> bool {
        record
            .option(&self.group)
            .and_then(|o| leading_number(&o.value))
            .is_some_and(|v| v >= self.min)
    }
}

/// Highlight predicate from config. A non-positive minimum or an empty group disables it.
pub fn highlight_from_config(config: &NotifyConfig) -> Box<dyn Highlight> {
    if config.highlight_group.trim().is_empty() || config.highlight_min <= 0.0 {
        Box::new(NoHighlight)
    } else {
        Box::new(MinSpec::new(
            config.highlight_group.trim(),
            config.highlight_min,
        ))
    }
}

fn leading_number(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (c == '.' && i > 0) || (c == '-' && i == 0)))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}
