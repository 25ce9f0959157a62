// On-disk kernel cache — the directory scan is the sole source of truth.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{DeletionFailure, DeletionReport, Error, Result};

/// Mission key for generic (mission-independent) kernels.
pub const GENERIC_KEY: &str = "GENERIC";

/// Bucket for cache files attributable to no known mission.
pub const OTHER_KEY: &str = "OTHER";

const PART_SUFFIX: &str = ".part";

/// Maps cache filenames to mission keys: exact names first, then
/// filename-prefix rules, then the `OTHER` bucket.
#[derive(Debug, Clone, Default)]
pub struct Attribution {
    exact: HashMap<String, String>,
    prefixes: Vec<(String, String)>,
}

impl Attribution {
    pub fn new(exact: HashMap<String, String>, prefixes: Vec<(String, String)>) -> Self {
        Self { exact, prefixes }
    }

    pub fn classify(&self, filename: &str) -> &str {
        if let Some(key) = self.exact.get(filename) {
            return key;
        }
        self.prefixes
            .iter()
            .find(|(prefix, _)| filename.starts_with(prefix.as_str()))
            .map(|(_, key)| key.as_str())
            .unwrap_or(OTHER_KEY)
    }
}

/// A cached kernel file observed on disk.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub name: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MissionUsage {
    pub bytes: u64,
    pub files: Vec<CacheEntry>,
}

impl MissionUsage {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheUsage {
    pub total_bytes: u64,
    pub file_count: usize,
    pub missions: BTreeMap<String, MissionUsage>,
}

/// The flat cache directory of kernel files, named by their canonical
/// upstream filenames. Every inspection re-derives state from a directory
/// scan; nothing here may disagree with the filesystem.
pub struct CacheStore {
    dir: PathBuf,
    attribution: Attribution,
}

impl CacheStore {
    pub fn new(dir: PathBuf, attribution: Attribution) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, attribution })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cached and non-empty.
    pub fn has(&self, filename: &str) -> bool {
        fs::metadata(self.path_for(filename))
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Where `filename` lives (or would live) in the cache.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub fn classify(&self, filename: &str) -> &str {
        self.attribution.classify(filename)
    }

    /// Scan the directory and attribute every regular file to a mission.
    pub fn usage(&self) -> CacheUsage {
        let mut usage = CacheUsage::default();
        for entry in self.scan() {
            usage.total_bytes += entry.bytes;
            usage.file_count += 1;
            let key = self.attribution.classify(&entry.name).to_string();
            let mission = usage.missions.entry(key).or_default();
            mission.bytes += entry.bytes;
            mission.files.push(entry);
        }
        usage
    }

    /// Names of cached files currently attributed to `key`.
    pub fn files_for(&self, key: &str) -> Vec<String> {
        self.scan()
            .into_iter()
            .filter(|e| self.attribution.classify(&e.name) == key)
            .map(|e| e.name)
            .collect()
    }

    /// Delete every file attributed to `key`. Idempotent when nothing is
    /// attributed.
    pub fn delete_mission(&self, key: &str) -> Result<DeletionReport> {
        self.delete_files(&self.files_for(key))
    }

    /// Best-effort deletion: every name is attempted even after a failure;
    /// failures are collected and reported together at the end.
    pub fn delete_files(&self, names: &[String]) -> Result<DeletionReport> {
        let mut report = DeletionReport::default();
        let mut failures: Vec<DeletionFailure> = Vec::new();

        for name in names {
            let path = self.path_for(name);
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => match fs::remove_file(&path) {
                    Ok(()) => {
                        report.deleted.push(name.clone());
                        report.freed_bytes += meta.len();
                    }
                    Err(e) => failures.push(DeletionFailure {
                        name: name.clone(),
                        reason: e.to_string(),
                    }),
                },
                Ok(_) => failures.push(DeletionFailure {
                    name: name.clone(),
                    reason: "not a regular file".to_string(),
                }),
                Err(_) => failures.push(DeletionFailure {
                    name: name.clone(),
                    reason: "not found in cache".to_string(),
                }),
            }
        }

        info!(
            "deleted {} cached kernel file(s), {} bytes freed",
            report.deleted.len(),
            report.freed_bytes
        );

        if failures.is_empty() {
            Ok(report)
        } else {
            Err(Error::PartialDeletion {
                deleted: report.deleted,
                freed_bytes: report.freed_bytes,
                failures,
            })
        }
    }

    /// Remove every cached file; the directory itself stays.
    pub fn purge(&self) -> Result<DeletionReport> {
        let names: Vec<String> = self.scan().into_iter().map(|e| e.name).collect();
        self.delete_files(&names)
    }

    /// Regular files in the cache directory, sorted by name. In-progress
    /// `.part` downloads are invisible.
    fn scan(&self) -> Vec<CacheEntry> {
        let mut entries = Vec::new();
        let Ok(read) = fs::read_dir(&self.dir) else {
            return entries;
        };
        for entry in read.flatten() {
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(PART_SUFFIX) {
                continue;
            }
            entries.push(CacheEntry {
                name,
                bytes: meta.len(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }
}
