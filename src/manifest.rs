// Segment manifests — bundled time-coverage indexes for multi-file missions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::{Error, Result};

/// One kernel segment: file, source URL, and inclusive coverage interval.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub file: String,
    pub url: String,
    pub start: NaiveDate,
    pub stop: NaiveDate,
}

/// Inclusive query window. `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: NaiveDate,
    end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Parse-once view of the bundled segment manifests.
///
/// Entries are stable-sorted ascending by coverage start, so revisions
/// sharing a start keep their manifest order and the later (more
/// authoritative) one loads last.
pub struct ManifestStore {
    cached: Mutex<HashMap<String, Arc<[ManifestEntry]>>>,
}

impl ManifestStore {
    pub fn builtin() -> Self {
        Self {
            cached: Mutex::new(HashMap::new()),
        }
    }

    /// Pre-seed a manifest, shadowing any bundled one with the same id.
    pub fn with_manifest(self, id: &str, mut entries: Vec<ManifestEntry>) -> Self {
        sort_by_start(&mut entries);
        self.cached.lock().insert(id.to_string(), entries.into());
        self
    }

    /// All segments for a manifest id, ascending coverage start.
    pub fn segments_for(&self, id: &str) -> Result<Arc<[ManifestEntry]>> {
        if let Some(entries) = self.cached.lock().get(id) {
            return Ok(entries.clone());
        }

        let raw = bundled(id).ok_or_else(|| Error::Manifest {
            id: id.to_string(),
            reason: "no bundled manifest".to_string(),
        })?;
        let mut entries: Vec<ManifestEntry> =
            serde_json::from_str(raw).map_err(|e| Error::Manifest {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        sort_by_start(&mut entries);

        let entries: Arc<[ManifestEntry]> = entries.into();
        self.cached.lock().insert(id.to_string(), entries.clone());
        Ok(entries)
    }

    /// Segments whose coverage intersects `window`, in load order.
    ///
    /// Overlapping entries are all included; the selection preserves the
    /// ascending-start order of `segments_for`, so of any overlapping pair
    /// the more authoritative entry sorts last and wins in the engine.
    /// An empty result is valid, not an error.
    pub fn select(&self, id: &str, window: Window) -> Result<Vec<ManifestEntry>> {
        let segments = self.segments_for(id)?;
        Ok(segments
            .iter()
            .filter(|s| s.start <= window.end() && s.stop >= window.start())
            .cloned()
            .collect())
    }

    /// Full coverage span of a manifest, when it has any entries.
    pub fn coverage(&self, id: &str) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let segments = self.segments_for(id)?;
        let first = segments.iter().map(|s| s.start).min();
        let last = segments.iter().map(|s| s.stop).max();
        Ok(first.zip(last))
    }
}

fn sort_by_start(entries: &mut [ManifestEntry]) {
    // Stable: equal starts keep manifest order.
    entries.sort_by_key(|e| e.start);
}

fn bundled(id: &str) -> Option<&'static str> {
    Some(match id {
        "cassini" => include_str!("manifests/cassini.json"),
        "mro" => include_str!("manifests/mro.json"),
        "mars2020" => include_str!("manifests/mars2020.json"),
        "lro" => include_str!("manifests/lro.json"),
        "lunar_prospector" => include_str!("manifests/lunar_prospector.json"),
        "mgs" => include_str!("manifests/mgs.json"),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_window_rejects_inverted() {
        assert!(Window::new(date("2005-01-02"), date("2005-01-01")).is_err());
        assert!(Window::new(date("2005-01-01"), date("2005-01-01")).is_ok());
    }

    #[test]
    fn test_bundled_manifests_parse_sorted() {
        let store = ManifestStore::builtin();
        for id in ["cassini", "mro", "mars2020", "lro", "lunar_prospector", "mgs"] {
            let segments = store.segments_for(id).unwrap();
            assert!(!segments.is_empty(), "{id} manifest is empty");
            for pair in segments.windows(2) {
                assert!(pair[0].start <= pair[1].start, "{id} not sorted by start");
            }
        }
    }
}
