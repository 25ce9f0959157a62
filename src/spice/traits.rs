use std::fmt;
use std::path::Path;

/// Position and velocity of a target relative to an observer at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
    pub light_time_s: f64,
}

/// Failure reported by the engine for a single call.
#[derive(Debug, Clone)]
pub struct EngineError(pub String);

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for EngineError {}

/// The numerical kernel-reading engine.
///
/// Implementations hold one process-global kernel set; none of these
/// methods are concurrency-safe, so callers must serialize every call
/// externally (`KernelPool` holds its lock across each one). When several
/// loaded kernels cover the same instant, implementations are required to
/// prefer the most recently furnished one — load order is how revision
/// precedence is expressed.
pub trait EphemerisEngine: Send + Sync {
    /// Load a kernel file into the engine's active set.
    fn furnish(&self, path: &Path) -> Result<(), EngineError>;

    /// Remove a previously furnished kernel. Unknown paths are ignored.
    fn unfurnish(&self, path: &Path);

    /// Drop every loaded kernel.
    fn clear(&self);

    /// Evaluate the target's state relative to the observer at a UTC
    /// instant, in the given reference frame. Fails when no loaded kernel
    /// covers the request.
    fn evaluate_state(
        &self,
        target: i32,
        observer: i32,
        time_utc: &str,
        frame: &str,
    ) -> Result<StateVector, EngineError>;
}
