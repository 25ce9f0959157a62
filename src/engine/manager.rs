// Kernel manager — orchestrates registry, manifests, downloader, cache, and pool.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, LISTING_TIMEOUT_SECS};
use crate::engine::cache::{Attribution, CacheStore, CacheUsage, GENERIC_KEY, OTHER_KEY};
use crate::engine::downloader::Downloader;
use crate::engine::pool::KernelPool;
use crate::error::{Error, Result};
use crate::manifest::{ManifestStore, Window};
use crate::registry::tables::ATTRIBUTION_PREFIXES;
use crate::registry::{KernelFile, KernelSource, MissionRegistry};
use crate::spice::traits::{EphemerisEngine, StateVector};

/// Cache summary returned by `get_cache_info`.
#[derive(Debug, Clone)]
pub struct CacheInfo {
    pub cache_dir: PathBuf,
    pub usage: CacheUsage,
}

/// One row of `list_missions`.
#[derive(Debug, Clone)]
pub struct MissionSummary {
    pub key: String,
    pub naif_id: i32,
    pub has_kernels: bool,
    pub segmented: bool,
}

/// One remote directory inspected by `check_remote_kernels`.
#[derive(Debug, Clone)]
pub struct RemoteDirectory {
    pub url: String,
    pub bsp_files: Vec<String>,
    pub error: Option<String>,
}

/// Report of `.bsp` files present upstream but not in the configured set.
#[derive(Debug, Clone)]
pub struct RemoteKernelReport {
    pub mission: String,
    pub configured_files: Vec<String>,
    pub directories: Vec<RemoteDirectory>,
    pub other_files: Vec<String>,
}

/// Orchestrator for kernel acquisition and load state.
///
/// Construct one per process: the pool inside owns the engine's global
/// load state, and the per-destination guards only deduplicate downloads
/// within a single manager.
pub struct KernelManager {
    registry: MissionRegistry,
    manifests: ManifestStore,
    cache: CacheStore,
    downloader: Downloader,
    pool: Arc<KernelPool>,
    listing_client: reqwest::Client,
    /// Serializes the one-time generic download-and-load step.
    generic_guard: tokio::sync::Mutex<()>,
    /// Per-destination guards so concurrent ensures of the same file
    /// perform exactly one network fetch.
    inflight: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KernelManager {
    pub fn new(config: EngineConfig, engine: Arc<dyn EphemerisEngine>) -> Result<Self> {
        Self::with_parts(
            config,
            engine,
            MissionRegistry::builtin(),
            ManifestStore::builtin(),
        )
    }

    /// Wire an explicit registry and manifest store.
    pub fn with_parts(
        config: EngineConfig,
        engine: Arc<dyn EphemerisEngine>,
        registry: MissionRegistry,
        manifests: ManifestStore,
    ) -> Result<Self> {
        let cache_dir = config.resolve_cache_dir();
        let attribution = build_attribution(&registry, &manifests);
        let cache = CacheStore::new(cache_dir, attribution)?;
        let downloader = Downloader::new(config.download_timeout());
        let pool = Arc::new(KernelPool::new(engine));

        Ok(Self {
            registry,
            manifests,
            cache,
            downloader,
            pool,
            listing_client: reqwest::Client::new(),
            generic_guard: tokio::sync::Mutex::new(()),
            inflight: tokio::sync::Mutex::new(HashMap::new()),
        })
    }

    pub fn pool(&self) -> &Arc<KernelPool> {
        &self.pool
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn registry(&self) -> &MissionRegistry {
        &self.registry
    }

    /// Download (if needed) and load a mission's fixed kernel set, generic
    /// kernels first. Idempotent: nothing touches the network or disk when
    /// everything is already loaded.
    pub async fn ensure_mission_kernels(&self, name: &str) -> Result<()> {
        let descriptor = self.registry.resolve(name)?;
        match &descriptor.kernels {
            KernelSource::Generic => self.ensure_generic().await,
            KernelSource::Segmented { .. } => Err(Error::SegmentedMission {
                key: descriptor.key.clone(),
            }),
            KernelSource::SingleFile { files } => {
                self.ensure_generic().await?;
                for file in files {
                    let path = self.ensure_cached(file).await?;
                    self.pool.load(&path)?;
                }
                info!("mission kernels loaded: {}", descriptor.key);
                Ok(())
            }
        }
    }

    /// Download (if needed) and load the segments covering `window`, in
    /// manifest order. Already-cached and already-loaded segments pass
    /// through as no-ops, so load order stays correct across repeated
    /// calls with different windows.
    pub async fn ensure_segmented_kernels(&self, name: &str, window: Window) -> Result<()> {
        let descriptor = self.registry.resolve(name)?;
        let KernelSource::Segmented { manifest } = &descriptor.kernels else {
            return Err(Error::Manifest {
                id: descriptor.key.clone(),
                reason: "mission has no segment manifest".to_string(),
            });
        };

        self.ensure_generic().await?;

        let selected = self.manifests.select(manifest, window)?;
        if selected.is_empty() {
            match self.manifests.coverage(manifest)? {
                Some((first, last)) => warn!(
                    "no {} segments cover {} to {}; available coverage {} to {}",
                    descriptor.key,
                    window.start(),
                    window.end(),
                    first,
                    last
                ),
                None => warn!("segment manifest for {} is empty", descriptor.key),
            }
            return Ok(());
        }

        let mut paths = Vec::with_capacity(selected.len());
        for segment in &selected {
            let file = KernelFile {
                name: segment.file.clone(),
                urls: vec![segment.url.clone()],
            };
            paths.push(self.ensure_cached(&file).await?);
        }
        self.pool.load_many(&paths)?;

        if let (Some(first), Some(last)) = (selected.first(), selected.last()) {
            info!(
                "segmented kernels loaded for {}: {} segment(s) ({} to {})",
                descriptor.key,
                selected.len(),
                first.start,
                last.stop
            );
        }
        Ok(())
    }

    /// Cache usage grouped by mission, plus the directory location.
    pub fn get_cache_info(&self) -> CacheInfo {
        CacheInfo {
            cache_dir: self.cache.dir().to_path_buf(),
            usage: self.cache.usage(),
        }
    }

    /// Delete every cached file attributed to a mission, unloading each
    /// from the pool first so the engine never holds a deleted file.
    /// Accepts mission names/aliases plus the "GENERIC" and "OTHER"
    /// buckets. Idempotent when nothing is cached.
    pub async fn delete_mission_cache(&self, name: &str) -> Result<crate::error::DeletionReport> {
        let key = self.resolve_cache_key(name)?;
        let names = self.cache.files_for(&key);
        for n in &names {
            self.pool.unload(&self.cache.path_for(n));
        }
        self.cache.delete_files(&names)
    }

    /// Delete an explicit list of cached files, unloading them first.
    pub async fn delete_cached_files(
        &self,
        names: &[String],
    ) -> Result<crate::error::DeletionReport> {
        for n in names {
            self.pool.unload(&self.cache.path_for(n));
        }
        self.cache.delete_files(names)
    }

    /// Remove every cached file. Everything the engine holds is unloaded
    /// first — the files about to disappear must not stay furnished.
    pub async fn purge_cache(&self) -> Result<crate::error::DeletionReport> {
        self.pool.unload_all();
        self.cache.purge()
    }

    /// Unload everything from the engine. The cache is untouched.
    pub fn unload_all(&self) {
        self.pool.unload_all();
    }

    /// File names currently loaded, in load order.
    pub fn list_loaded(&self) -> Vec<String> {
        self.pool
            .loaded()
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(String::from))
            .collect()
    }

    /// Supported spacecraft with their NAIF ids and kernel availability.
    pub fn list_missions(&self) -> Vec<MissionSummary> {
        self.registry
            .list()
            .iter()
            .filter(|m| m.is_spacecraft())
            .map(|m| MissionSummary {
                key: m.key.clone(),
                naif_id: m.naif_id,
                has_kernels: m.has_kernels(),
                segmented: m.is_segmented(),
            })
            .collect()
    }

    /// Cancel in-flight downloads and refuse new ones.
    pub fn shutdown(&self) {
        self.downloader.shutdown();
    }

    /// Resolve both bodies, ensure their kernels, and evaluate the state
    /// of `target` relative to `observer` at a UTC instant.
    ///
    /// Single-file missions are ensured automatically; segmented missions
    /// need a prior `ensure_segmented_kernels` call for the query window.
    pub async fn state(
        &self,
        target: &str,
        observer: &str,
        time_utc: &str,
        frame: &str,
    ) -> Result<StateVector> {
        let target_id = self.ensure_body(target).await?;
        let observer_id = self.ensure_body(observer).await?;
        self.pool.evaluate_state(target_id, observer_id, time_utc, frame)
    }

    /// Inspect the configured upstream directories of a single-file
    /// mission and report `.bsp` files not in the configured set.
    /// Per-directory fetch errors land in the report, not in `Err`.
    pub async fn check_remote_kernels(&self, name: &str) -> Result<RemoteKernelReport> {
        let descriptor = self.registry.resolve(name)?;
        let files = match &descriptor.kernels {
            KernelSource::SingleFile { files } => files.clone(),
            KernelSource::Segmented { .. } => {
                return Err(Error::SegmentedMission {
                    key: descriptor.key.clone(),
                })
            }
            KernelSource::Generic => {
                return Err(Error::NoKernels {
                    key: descriptor.key.clone(),
                })
            }
        };
        let mission = descriptor.key.clone();

        let mut configured: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        configured.sort_unstable();

        // Unique parent directories across every candidate URL, in order.
        let mut parents: Vec<String> = Vec::new();
        for file in &files {
            for url in &file.urls {
                if let Some(idx) = url.rfind('/') {
                    let parent = format!("{}/", &url[..idx]);
                    if !parents.contains(&parent) {
                        parents.push(parent);
                    }
                }
            }
        }

        let mut directories = Vec::with_capacity(parents.len());
        let mut other: Vec<String> = Vec::new();

        for dir_url in parents {
            match self.fetch_bsp_listing(&dir_url).await {
                Ok(bsp_files) => {
                    for f in &bsp_files {
                        if !configured.contains(f) && !other.contains(f) {
                            other.push(f.clone());
                        }
                    }
                    directories.push(RemoteDirectory {
                        url: dir_url,
                        bsp_files,
                        error: None,
                    });
                }
                Err(reason) => {
                    warn!("remote listing failed for {}: {}", dir_url, reason);
                    directories.push(RemoteDirectory {
                        url: dir_url,
                        bsp_files: Vec::new(),
                        error: Some(reason),
                    });
                }
            }
        }

        other.sort_unstable();
        Ok(RemoteKernelReport {
            mission,
            configured_files: configured,
            directories,
            other_files: other,
        })
    }

    /// Fetch a directory listing and pull out `.bsp` hrefs, sorted.
    async fn fetch_bsp_listing(&self, dir_url: &str) -> std::result::Result<Vec<String>, String> {
        let resp = tokio::time::timeout(
            Duration::from_secs(LISTING_TIMEOUT_SECS),
            self.listing_client.get(dir_url).send(),
        )
        .await
        .map_err(|_| "timed out".to_string())?
        .map_err(|e| e.to_string())?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status().as_u16()));
        }
        let body = resp.text().await.map_err(|e| e.to_string())?;

        let mut names: Vec<String> = href_regex()
            .captures_iter(&body)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .filter(|href| href.to_ascii_lowercase().ends_with(".bsp"))
            .filter_map(|href| href.trim_end_matches('/').rsplit('/').next())
            .map(String::from)
            .collect();
        names.sort_unstable();
        names.dedup();
        Ok(names)
    }

    /// Generic download-and-load step: exactly one download pass and one
    /// furnish sequence per process, double-checked under its own guard.
    async fn ensure_generic(&self) -> Result<()> {
        if self.pool.is_generic_loaded() {
            return Ok(());
        }
        let _guard = self.generic_guard.lock().await;
        if self.pool.is_generic_loaded() {
            return Ok(());
        }

        let generic: Vec<KernelFile> = self.registry.generic_kernels().to_vec();
        let mut paths = Vec::new();
        for file in &generic {
            paths.push(self.ensure_cached(file).await?);
        }
        self.pool.ensure_generic_loaded(&paths)
    }

    /// Download `file` into the cache unless it is already present. The
    /// per-destination guard makes concurrent ensures of the same file
    /// perform exactly one network fetch; the cache check repeats inside
    /// the guard because another caller may have finished first.
    async fn ensure_cached(&self, file: &KernelFile) -> Result<PathBuf> {
        let dest = self.cache.path_for(&file.name);
        if self.cache.has(&file.name) {
            debug!("kernel cached: {}", file.name);
            return Ok(dest);
        }

        let guard = {
            let mut inflight = self.inflight.lock().await;
            inflight.entry(file.name.clone()).or_default().clone()
        };
        let _locked = guard.lock().await;

        if self.cache.has(&file.name) {
            return Ok(dest);
        }

        info!("downloading kernel: {}", file.name);
        self.downloader.fetch(&file.urls, &dest).await?;
        Ok(dest)
    }

    /// Ensure kernels for one body of a state query and return its NAIF id.
    async fn ensure_body(&self, name: &str) -> Result<i32> {
        let descriptor = self.registry.resolve(name)?;
        let key = descriptor.key.clone();
        let naif_id = descriptor.naif_id;

        match &descriptor.kernels {
            KernelSource::Generic => self.ensure_generic().await?,
            KernelSource::SingleFile { .. } => self.ensure_mission_kernels(&key).await?,
            KernelSource::Segmented { .. } => {
                self.ensure_generic().await?;
                let covered = self.pool.loaded().iter().any(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| self.cache.classify(n) == key)
                        .unwrap_or(false)
                });
                if !covered {
                    return Err(Error::InsufficientCoverage {
                        reason: format!(
                            "mission {key} uses segmented kernels; \
                             call ensure_segmented_kernels for the query window first"
                        ),
                    });
                }
            }
        }
        Ok(naif_id)
    }

    /// Map a user-facing name to a cache attribution key.
    fn resolve_cache_key(&self, name: &str) -> Result<String> {
        let upper = name.trim().to_uppercase();
        if upper == GENERIC_KEY || upper == OTHER_KEY {
            return Ok(upper);
        }
        Ok(self.registry.resolve(name)?.key.clone())
    }
}

/// Exact filename map from the registry and manifests, then the static
/// prefix rules. An unreadable manifest only loses attribution detail.
fn build_attribution(registry: &MissionRegistry, manifests: &ManifestStore) -> Attribution {
    let mut exact: HashMap<String, String> = HashMap::new();
    for file in registry.generic_kernels() {
        exact.insert(file.name.clone(), GENERIC_KEY.to_string());
    }
    for mission in registry.list() {
        match &mission.kernels {
            KernelSource::SingleFile { files } => {
                for f in files {
                    exact.insert(f.name.clone(), mission.key.clone());
                }
            }
            KernelSource::Segmented { manifest } => {
                if let Ok(segments) = manifests.segments_for(manifest) {
                    for s in segments.iter() {
                        exact.insert(s.file.clone(), mission.key.clone());
                    }
                }
            }
            KernelSource::Generic => {}
        }
    }
    let prefixes = ATTRIBUTION_PREFIXES
        .iter()
        .map(|(p, k)| (p.to_string(), k.to_string()))
        .collect();
    Attribution::new(exact, prefixes)
}

fn href_regex() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| Regex::new(r#"href="([^"]+)""#).expect("static href pattern"))
}
