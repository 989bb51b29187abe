//! Bounded in-memory log of detected plates.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub plate: String,
    /// Final scored confidence, 0-100.
    pub confidence: f32,
    /// Unix timestamp (seconds).
    pub timestamp: u64,
    /// Whether the entry was looked up in an external registry.
    pub consulted: bool,
}

/// Ring of the most recent detections, newest first.
#[derive(Debug, Clone)]
pub struct DetectionHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for DetectionHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl DetectionHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a detection, evicting the oldest entry when full. Returns
    /// the new entry's id.
    pub fn add(&mut self, plate: impl Into<String>, confidence: f32, timestamp: u64) -> Uuid {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            plate: plate.into(),
            confidence,
            timestamp,
            consulted: false,
        };
        let id = entry.id;
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
        id
    }

    /// Entries in newest-first order.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flag an entry as consulted. Returns false when the id is unknown
    /// (e.g. already evicted).
    pub fn mark_consulted(&mut self, id: Uuid) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.consulted = true;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Export the history as pretty-printed JSON.
    pub fn export_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_entry_comes_first() {
        let mut history = DetectionHistory::default();
        history.add("XY1234", 81.0, 100);
        history.add("ABCD13", 89.1, 200);

        let plates: Vec<&str> = history.entries().map(|e| e.plate.as_str()).collect();
        assert_eq!(plates, vec!["ABCD13", "XY1234"]);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = DetectionHistory::with_capacity(3);
        for i in 0..5 {
            history.add(format!("AB{i:04}"), 50.0, i);
        }
        assert_eq!(history.len(), 3);
        // The two oldest entries are gone.
        assert!(history.entries().all(|e| e.plate != "AB0000" && e.plate != "AB0001"));
    }

    #[test]
    fn mark_consulted_by_id() {
        let mut history = DetectionHistory::default();
        let id = history.add("XY1234", 81.0, 100);

        assert!(history.mark_consulted(id));
        assert!(history.entries().next().is_some_and(|e| e.consulted));
        assert!(!history.mark_consulted(Uuid::new_v4()));
    }

    #[test]
    fn clear_and_export() {
        let mut history = DetectionHistory::default();
        history.add("XY1234", 81.0, 100);

        let json = history.export_json().unwrap();
        let parsed: Vec<HistoryEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].plate, "XY1234");

        history.clear();
        assert!(history.is_empty());
    }
}
