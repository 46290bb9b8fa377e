//! Change detection between the stored snapshot and a fresh fetch.
//!
//! Identity is the VIN alone. Records without one can't be matched across
//! fetches, so they are never reported as new.

use crate::filter::RecordFilter;
use invbot_core::model::InventoryRecord;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A vehicle present in both sets whose display price moved.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    /// The record as seen in the current fetch.
    pub record: InventoryRecord,
    pub old_price: f64,
    pub new_price: f64,
}

impl PriceChange {
    pub fn delta(&self) -> f64 {
        self.new_price - self.old_price
    }
}

/// Result of comparing two result sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    /// Records whose VIN was not in the previous set, in current order.
    pub new: Vec<InventoryRecord>,
    /// Known records with a different price, in current order.
    pub price_changes: Vec<PriceChange>,
    /// Current records skipped for lack of a VIN.
    pub unidentified: usize,
}

impl Changes {
    /// Nothing worth notifying about.
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.price_changes.is_empty()
    }

    /// Keep only what `filter` accepts. Identity comparison is untouched.
    pub fn filtered(mut self, filter: &dyn RecordFilter) -> Self {
        self.new.retain(|r| filter.accepts(r));
        self.price_changes.retain(|c| filter.accepts(&c.record));
        self
    }
}

/// Compare `current` against `previous`.
///
/// Linear in both inputs. Logs one warning per current record without a VIN.
pub fn diff(previous: &[InventoryRecord], current: &[InventoryRecord]) -> Changes {
    let known: HashMap<&str, Option<f64>> = previous
        .iter()
        .filter_map(|r| r.vin.as_deref().map(|vin| (vin, r.display_price())))
        .collect();

    let mut changes = Changes::default();
    let mut seen_moves: HashSet<&str> = HashSet::new();

    for record in current {
        let Some(vin) = record.vin.as_deref() else {
            warn!(
                "diff: record without VIN skipped (trim: {}, price: {})",
                record.trim_name.as_deref().unwrap_or("?"),
                record
                    .display_price()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "?".into())
            );
            changes.unidentified += 1;
            continue;
        };

        match known.get(vin) {
            None => changes.new.push(record.clone()),
            Some(old) => {
                if let (Some(old_price), Some(new_price)) = (*old, record.display_price()) {
                    if old_price != new_price && seen_moves.insert(vin) {
                        changes.price_changes.push(PriceChange {
                            record: record.clone(),
                            old_price,
                            new_price,
                        });
                    }
                }
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PriceCeiling;

    fn rec(vin: Option<&str>, price: Option<f64>) -> InventoryRecord {
        InventoryRecord {
            vin: vin.map(String::from),
            model: "my".into(),
            trim_name: Some("Model Y".into()),
            price: None,
            inventory_price: price,
            paint: vec![],
            interior: vec![],
            wheels: vec![],
            options: vec![],
        }
    }

    fn vins(records: &[InventoryRecord]) -> Vec<&str> {
        records.iter().filter_map(|r| r.vin.as_deref()).collect()
    }

    #[test]
    fn test_one_removed_two_added() {
        let previous = vec![rec(Some("VIN1"), Some(1.0)), rec(Some("VIN2"), Some(2.0))];
        let current = vec![
            rec(Some("VIN2"), Some(2.0)),
            rec(Some("VIN3"), Some(3.0)),
            rec(Some("VIN4"), Some(4.0)),
        ];
        let changes = diff(&previous, &current);
        assert_eq!(vins(&changes.new), vec!["VIN3", "VIN4"]);
        assert!(changes.price_changes.is_empty());
        assert_eq!(changes.unidentified, 0);
    }

    #[test]
    fn test_identical_sets_have_no_changes() {
        let set = vec![
            rec(Some("A"), Some(1.0)),
            rec(Some("B"), Some(2.0)),
            rec(None, Some(3.0)),
        ];
        let changes = diff(&set, &set);
        assert!(changes.new.is_empty());
        assert!(changes.is_empty());
    }

    #[test]
    fn test_new_preserves_current_order() {
        let current = vec![
            rec(Some("Z"), None),
            rec(Some("A"), None),
            rec(Some("M"), None),
        ];
        let changes = diff(&[], &current);
        assert_eq!(vins(&changes.new), vec!["Z", "A", "M"]);
    }

    #[test]
    fn test_records_without_vin_are_never_new() {
        let previous = vec![rec(None, Some(1.0))];
        let current = vec![rec(None, Some(1.0)), rec(None, Some(5.0)), rec(Some("X"), None)];
        let changes = diff(&previous, &current);
        assert_eq!(vins(&changes.new), vec!["X"]);
        assert_eq!(changes.new.len(), 1);
        assert_eq!(changes.unidentified, 2);
    }

    #[test]
    fn test_previous_without_vin_does_not_mask_new() {
        let previous = vec![rec(None, Some(1.0))];
        let current = vec![rec(Some("VIN1"), Some(1.0))];
        assert_eq!(vins(&diff(&previous, &current).new), vec!["VIN1"]);
    }

    #[test]
    fn test_price_change_detected_for_known_vin() {
        let previous = vec![rec(Some("A"), Some(2_000_000.0)), rec(Some("B"), Some(1.0))];
        let current = vec![rec(Some("A"), Some(1_950_000.0)), rec(Some("B"), Some(1.0))];
        let changes = diff(&previous, &current);
        assert!(changes.new.is_empty());
        assert_eq!(changes.price_changes.len(), 1);
        let moved = &changes.price_changes[0];
        assert_eq!(moved.record.vin.as_deref(), Some("A"));
        assert_eq!(moved.delta(), -50_000.0);
    }

    #[test]
    fn test_unknown_price_is_not_a_price_change() {
        let previous = vec![rec(Some("A"), None)];
        let current = vec![rec(Some("A"), Some(10.0))];
        assert!(diff(&previous, &current).is_empty());
    }

    #[test]
    fn test_filter_applies_after_diff() {
        let previous = vec![rec(Some("A"), Some(100.0))];
        let current = vec![
            rec(Some("A"), Some(90.0)),
            rec(Some("B"), Some(50.0)),
            rec(Some("C"), Some(500.0)),
            rec(Some("D"), None),
        ];
        let all = diff(&previous, &current);
        assert_eq!(vins(&all.new), vec!["B", "C", "D"]);

        let cheap = all.filtered(&PriceCeiling::new(100.0));
        assert_eq!(vins(&cheap.new), vec!["B"]);
        assert_eq!(cheap.price_changes.len(), 1);
    }
}
