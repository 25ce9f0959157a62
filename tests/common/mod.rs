// Shared test fixtures: a recording mock engine and a local kernel mirror.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use spice_kernel_engine::{EngineError, EphemerisEngine, StateVector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Furnish(PathBuf),
    Unfurnish(PathBuf),
    Clear,
}

/// Mock engine that records every call and can be told to reject files.
#[derive(Default)]
pub struct RecordingEngine {
    pub calls: Mutex<Vec<EngineCall>>,
    pub reject: Mutex<HashSet<String>>,
}

impl RecordingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reject_file(&self, name: &str) {
        self.reject.lock().insert(name.to_string());
    }

    pub fn furnish_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, EngineCall::Furnish(_)))
            .count()
    }

    pub fn furnished_names(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                EngineCall::Furnish(p) => {
                    p.file_name().and_then(|n| n.to_str()).map(String::from)
                }
                _ => None,
            })
            .collect()
    }
}

impl EphemerisEngine for RecordingEngine {
    fn furnish(&self, path: &Path) -> Result<(), EngineError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if self.reject.lock().contains(name) {
            return Err(EngineError(format!("unreadable kernel: {name}")));
        }
        self.calls
            .lock()
            .push(EngineCall::Furnish(path.to_path_buf()));
        Ok(())
    }

    fn unfurnish(&self, path: &Path) {
        self.calls
            .lock()
            .push(EngineCall::Unfurnish(path.to_path_buf()));
    }

    fn clear(&self) {
        self.calls.lock().push(EngineCall::Clear);
    }

    fn evaluate_state(
        &self,
        _target: i32,
        _observer: i32,
        _time_utc: &str,
        _frame: &str,
    ) -> Result<StateVector, EngineError> {
        if self.furnish_count() == 0 {
            return Err(EngineError("no kernels loaded".to_string()));
        }
        Ok(StateVector {
            position_km: [1.0e8, 2.0e7, 3.0e6],
            velocity_km_s: [10.0, -5.0, 1.0],
            light_time_s: 400.0,
        })
    }
}

#[derive(Clone)]
struct MirrorState {
    files: Arc<HashMap<String, Vec<u8>>>,
    listing: Option<String>,
    hits: Arc<AtomicUsize>,
    delay_ms: u64,
}

async fn serve_listing(State(state): State<MirrorState>) -> impl IntoResponse {
    match state.listing {
        Some(html) => (StatusCode::OK, html).into_response(),
        None => (StatusCode::NOT_FOUND, String::new()).into_response(),
    }
}

async fn serve_kernel(
    State(state): State<MirrorState>,
    AxumPath(name): AxumPath<String>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if state.delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(state.delay_ms)).await;
    }
    match state.files.get(&name) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Vec::new()).into_response(),
    }
}

/// Local mock mirror serving fixed kernel bodies at /kernels/{name}.
pub struct MockMirror {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl MockMirror {
    pub async fn start(files: HashMap<String, Vec<u8>>) -> Self {
        Self::start_with_delay(files, 0).await
    }

    /// `delay_ms` widens race windows for concurrency tests.
    pub async fn start_with_delay(files: HashMap<String, Vec<u8>>, delay_ms: u64) -> Self {
        Self::start_inner(files, None, delay_ms).await
    }

    /// Also serve `listing` as the directory index at /kernels/.
    pub async fn start_with_listing(files: HashMap<String, Vec<u8>>, listing: &str) -> Self {
        Self::start_inner(files, Some(listing.to_string()), 0).await
    }

    async fn start_inner(
        files: HashMap<String, Vec<u8>>,
        listing: Option<String>,
        delay_ms: u64,
    ) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = MirrorState {
            files: Arc::new(files),
            listing,
            hits: hits.clone(),
            delay_ms,
        };
        let app = Router::new()
            .route("/kernels/{name}", get(serve_kernel))
            // The directory index at /kernels/ (and anything else unmatched)
            // serves the configured listing, when there is one.
            .fallback(get(serve_listing))
            .with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, hits }
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("http://{}/kernels/{}", self.addr, name)
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
