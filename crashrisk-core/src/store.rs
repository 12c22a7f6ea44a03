//! In-memory incident record store
//!
//! Global invariants enforced:
//! - Loaded once, read-only afterwards
//! - Ingestion order is preserved, duplicates are kept
//! - Loading never fails; unusable rows are dropped

use crate::record::{IncidentRecord, RawRow};
use tracing::debug;

/// Ordered, immutable collection of historical incidents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<IncidentRecord>,
    dropped: usize,
}

impl RecordStore {
    /// Parse raw rows into a store, dropping rows that cannot be parsed
    pub fn load<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut records = Vec::new();
        let mut dropped = 0;

        for (index, row) in rows.into_iter().enumerate() {
            match IncidentRecord::from_row(&row) {
                Some(record) => records.push(record),
                None => {
                    debug!(row = index, "dropping incident row without identifying fields");
                    dropped += 1;
                }
            }
        }

        debug!(loaded = records.len(), dropped, "incident records loaded");
        RecordStore { records, dropped }
    }

    /// Build a store directly from already-parsed records
    pub fn from_records(records: Vec<IncidentRecord>) -> Self {
        RecordStore {
            records,
            dropped: 0,
        }
    }

    /// Store with no records
    pub fn empty() -> Self {
        RecordStore::default()
    }

    /// All records in ingestion order
    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    /// The trailing `window` records (all records if fewer)
    pub fn recent(&self, window: usize) -> &[IncidentRecord] {
        let start = self.records.len().saturating_sub(window);
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows dropped during ingestion
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(vehicle: &str, speed: &str) -> RawRow {
        let mut r = RawRow::new();
        r.insert("vehicle_type".to_string(), vehicle.to_string());
        r.insert("speed".to_string(), speed.to_string());
        r
    }

    #[test]
    fn test_load_preserves_order_and_duplicates() {
        let store = RecordStore::load(vec![row("Car", "50"), row("Bus", "40"), row("Car", "50")]);
        assert_eq!(store.len(), 3);
        let vehicles: Vec<_> = store
            .records()
            .iter()
            .map(|r| r.vehicle_type.as_deref().unwrap())
            .collect();
        assert_eq!(vehicles, vec!["Car", "Bus", "Car"]);
    }

    #[test]
    fn test_load_drops_blank_rows() {
        let store = RecordStore::load(vec![row("Car", "50"), RawRow::new(), row("", "")]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.dropped(), 2);
    }

    #[test]
    fn test_load_empty_is_valid() {
        let store = RecordStore::load(Vec::new());
        assert!(store.is_empty());
        assert_eq!(store.recent(10).len(), 0);
    }

    #[test]
    fn test_recent_window() {
        let rows: Vec<_> = (0..15).map(|i| row("Car", &i.to_string())).collect();
        let store = RecordStore::load(rows);
        let recent = store.recent(10);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].speed, Some(5.0));
        assert_eq!(recent[9].speed, Some(14.0));
        assert_eq!(store.recent(100).len(), 15);
    }
}
