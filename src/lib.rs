// SPICE kernel acquisition, caching, and load-state coordination.
//
// The numerical ephemeris engine itself is an external collaborator reached
// through the `EphemerisEngine` trait; this crate owns everything above it:
// which kernel files a query needs, where to fetch them, where they live on
// disk, and in what order the engine must hold them.

pub mod config;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod spice;

pub use config::EngineConfig;
pub use engine::cache::{CacheEntry, CacheStore, CacheUsage, MissionUsage};
pub use engine::downloader::Downloader;
pub use engine::manager::{
    CacheInfo, KernelManager, MissionSummary, RemoteDirectory, RemoteKernelReport,
};
pub use engine::pool::{KernelPool, LoadedKernelRecord};
pub use error::{DeletionFailure, DeletionReport, DownloadAttempt, Error, Result};
pub use manifest::{ManifestEntry, ManifestStore, Window};
pub use registry::{KernelFile, KernelSource, MissionDescriptor, MissionRegistry};
pub use spice::traits::{EngineError, EphemerisEngine, StateVector};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initialize tracing output once per process. Safe to call repeatedly.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();
    });
}
