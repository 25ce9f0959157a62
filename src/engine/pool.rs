// Kernel pool — the single serialization point for the engine's global load state.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::spice::traits::{EphemerisEngine, StateVector};

/// One kernel the engine currently holds, and when it was loaded.
#[derive(Debug, Clone)]
pub struct LoadedKernelRecord {
    pub path: PathBuf,
    pub order: u64,
}

#[derive(Default)]
struct PoolState {
    records: Vec<LoadedKernelRecord>,
    generic_loaded: bool,
    next_order: u64,
}

/// Thread-safe record of what the engine has loaded, in load order.
///
/// The engine's load state is process-global and its primitives are not
/// concurrency-safe, so every operation here holds the one lock across the
/// underlying engine call. Load order is an observable correctness
/// property: the engine prefers the most recently furnished covering
/// kernel, and generic kernels always precede mission-specific ones.
///
/// Construct exactly one per process and share it by `Arc`.
pub struct KernelPool {
    engine: Arc<dyn EphemerisEngine>,
    state: Mutex<PoolState>,
}

impl KernelPool {
    pub fn new(engine: Arc<dyn EphemerisEngine>) -> Self {
        Self {
            engine,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Furnish the ordered generic kernel set exactly once per process.
    /// Idempotent; must precede any mission-specific load.
    pub fn ensure_generic_loaded(&self, paths: &[PathBuf]) -> Result<()> {
        let mut state = self.state.lock();
        if state.generic_loaded {
            return Ok(());
        }
        for path in paths {
            Self::load_locked(&self.engine, &mut state, path)?;
        }
        state.generic_loaded = true;
        info!("generic kernels loaded ({})", paths.len());
        Ok(())
    }

    pub fn is_generic_loaded(&self) -> bool {
        self.state.lock().generic_loaded
    }

    /// Furnish `path` unless it is already loaded.
    pub fn load(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock();
        Self::load_locked(&self.engine, &mut state, path)
    }

    /// Furnish several kernels strictly in the given order. The order is a
    /// correctness contract (revision precedence), never reordered here.
    /// Already-loaded paths pass through as no-ops.
    pub fn load_many(&self, paths: &[PathBuf]) -> Result<()> {
        let mut state = self.state.lock();
        for path in paths {
            Self::load_locked(&self.engine, &mut state, path)?;
        }
        Ok(())
    }

    fn load_locked(
        engine: &Arc<dyn EphemerisEngine>,
        state: &mut PoolState,
        path: &Path,
    ) -> Result<()> {
        if state.records.iter().any(|r| r.path.as_path() == path) {
            return Ok(());
        }
        engine.furnish(path).map_err(|e| Error::KernelLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let order = state.next_order;
        state.next_order += 1;
        state.records.push(LoadedKernelRecord {
            path: path.to_path_buf(),
            order,
        });
        debug!("loaded kernel {}", path.display());
        Ok(())
    }

    /// Unfurnish `path` and drop its record if present; no-op otherwise.
    pub fn unload(&self, path: &Path) {
        let mut state = self.state.lock();
        if let Some(pos) = state.records.iter().position(|r| r.path.as_path() == path) {
            self.engine.unfurnish(path);
            state.records.remove(pos);
            debug!("unloaded kernel {}", path.display());
        }
    }

    /// Drop everything the engine holds and reset all pool state,
    /// including the generic-loaded flag.
    pub fn unload_all(&self) {
        let mut state = self.state.lock();
        self.engine.clear();
        state.records.clear();
        state.generic_loaded = false;
        state.next_order = 0;
        info!("unloaded all kernels");
    }

    /// Paths currently loaded, in load order.
    pub fn loaded(&self) -> Vec<PathBuf> {
        self.state
            .lock()
            .records
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }

    /// Snapshot of the load records, in load order.
    pub fn records(&self) -> Vec<LoadedKernelRecord> {
        self.state.lock().records.clone()
    }

    /// Evaluate a state query under the pool lock — the engine shares one
    /// global kernel set with every load/unload above, so queries must
    /// serialize with them.
    pub fn evaluate_state(
        &self,
        target: i32,
        observer: i32,
        time_utc: &str,
        frame: &str,
    ) -> Result<StateVector> {
        let _state = self.state.lock();
        self.engine
            .evaluate_state(target, observer, time_utc, frame)
            .map_err(|e| Error::InsufficientCoverage {
                reason: e.to_string(),
            })
    }
}
