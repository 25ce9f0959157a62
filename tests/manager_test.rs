mod common;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use spice_kernel_engine::{
    EngineConfig, Error, KernelFile, KernelManager, KernelSource, ManifestEntry, ManifestStore,
    MissionDescriptor, MissionRegistry, Window,
};

use common::{MockMirror, RecordingEngine};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn kernel_file(mirror: &MockMirror, name: &str) -> KernelFile {
    KernelFile {
        name: name.to_string(),
        urls: vec![mirror.url_for(name)],
    }
}

/// Registry with one single-file mission (PSP), one segmented mission
/// (CASSINI), and one bare body (SUN), all served by the mock mirror.
fn test_registry(mirror: &MockMirror) -> MissionRegistry {
    MissionRegistry::new(vec![
        MissionDescriptor {
            key: "PSP".to_string(),
            naif_id: -96,
            aliases: vec!["Parker Solar Probe".to_string()],
            kernels: KernelSource::SingleFile {
                files: vec![kernel_file(mirror, "spp_nom.bsp")],
            },
        },
        MissionDescriptor {
            key: "CASSINI".to_string(),
            naif_id: -82,
            aliases: vec![],
            kernels: KernelSource::Segmented { manifest: "cassini" },
        },
        MissionDescriptor {
            key: "SUN".to_string(),
            naif_id: 10,
            aliases: vec![],
            kernels: KernelSource::Generic,
        },
    ])
    .with_generic(vec![
        kernel_file(mirror, "naif0012.tls"),
        kernel_file(mirror, "de440s.bsp"),
    ])
}

fn test_manifests(mirror: &MockMirror) -> ManifestStore {
    let entry = |file: &str, start: &str, stop: &str| ManifestEntry {
        file: file.to_string(),
        url: mirror.url_for(file),
        start: date(start),
        stop: date(stop),
    };
    ManifestStore::builtin().with_manifest(
        "cassini",
        vec![
            entry("seg_a.bsp", "2004-05-14", "2004-06-19"),
            entry("seg_b.bsp", "2004-06-19", "2004-08-01"),
            entry("seg_c.bsp", "2005-01-01", "2005-03-01"),
        ],
    )
}

fn mirror_files() -> HashMap<String, Vec<u8>> {
    [
        "naif0012.tls",
        "de440s.bsp",
        "spp_nom.bsp",
        "seg_a.bsp",
        "seg_b.bsp",
        "seg_c.bsp",
    ]
    .into_iter()
    .map(|n| (n.to_string(), format!("kernel:{n}").into_bytes()))
    .collect()
}

struct Fixture {
    mirror: MockMirror,
    engine: Arc<RecordingEngine>,
    manager: Arc<KernelManager>,
    _cache_dir: tempfile::TempDir,
}

async fn fixture() -> Fixture {
    fixture_with_delay(0).await
}

async fn fixture_with_delay(delay_ms: u64) -> Fixture {
    let mirror = MockMirror::start_with_delay(mirror_files(), delay_ms).await;
    let engine = RecordingEngine::new();
    let cache_dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        cache_dir: Some(cache_dir.path().to_path_buf()),
        download_timeout_secs: 10,
    };
    let manager = Arc::new(
        KernelManager::with_parts(
            config,
            engine.clone(),
            test_registry(&mirror),
            test_manifests(&mirror),
        )
        .unwrap(),
    );
    Fixture {
        mirror,
        engine,
        manager,
        _cache_dir: cache_dir,
    }
}

#[tokio::test]
async fn test_ensure_mission_kernels_downloads_and_loads() -> anyhow::Result<()> {
    let fx = fixture().await;
    fx.manager.ensure_mission_kernels("PSP").await?;

    // Generic kernels load first, in order, then the mission kernel.
    assert_eq!(
        fx.engine.furnished_names(),
        ["naif0012.tls", "de440s.bsp", "spp_nom.bsp"]
    );
    assert!(fx.manager.cache().has("spp_nom.bsp"));
    assert_eq!(fx.mirror.hit_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_ensure_mission_kernels_idempotent() {
    let fx = fixture().await;
    fx.manager.ensure_mission_kernels("PSP").await.unwrap();
    let hits = fx.mirror.hit_count();
    let furnishes = fx.engine.furnish_count();

    // Aliased and re-cased names land on the same state, with no new
    // network or engine work.
    fx.manager.ensure_mission_kernels("psp").await.unwrap();
    fx.manager
        .ensure_mission_kernels("Parker Solar Probe")
        .await
        .unwrap();

    assert_eq!(fx.mirror.hit_count(), hits);
    assert_eq!(fx.engine.furnish_count(), furnishes);
}

#[tokio::test]
async fn test_concurrent_ensures_download_once() {
    let fx = fixture_with_delay(100).await;

    let a = {
        let m = fx.manager.clone();
        tokio::spawn(async move { m.ensure_mission_kernels("PSP").await })
    };
    let b = {
        let m = fx.manager.clone();
        tokio::spawn(async move { m.ensure_mission_kernels("PSP").await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    // One fetch per distinct file, despite two racing ensures.
    assert_eq!(fx.mirror.hit_count(), 3);
    assert_eq!(fx.engine.furnish_count(), 3);
}

#[tokio::test]
async fn test_ensure_mission_kernels_unknown() {
    let fx = fixture().await;
    let err = fx
        .manager
        .ensure_mission_kernels("NOT_A_MISSION")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownMission { .. }));
}

#[tokio::test]
async fn test_ensure_mission_kernels_rejects_segmented() {
    let fx = fixture().await;
    let err = fx
        .manager
        .ensure_mission_kernels("CASSINI")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SegmentedMission { .. }));
}

#[tokio::test]
async fn test_ensure_segmented_kernels_window_selection() {
    let fx = fixture().await;
    let window = Window::new(date("2004-06-01"), date("2004-07-01")).unwrap();
    fx.manager
        .ensure_segmented_kernels("CASSINI", window)
        .await
        .unwrap();

    // Generic first, then exactly the two covering segments in order.
    assert_eq!(
        fx.engine.furnished_names(),
        ["naif0012.tls", "de440s.bsp", "seg_a.bsp", "seg_b.bsp"]
    );
    assert!(!fx.manager.cache().has("seg_c.bsp"));
}

#[tokio::test]
async fn test_ensure_segmented_kernels_incremental_windows() {
    let fx = fixture().await;
    let first = Window::new(date("2004-06-01"), date("2004-06-10")).unwrap();
    fx.manager
        .ensure_segmented_kernels("CASSINI", first)
        .await
        .unwrap();
    let hits = fx.mirror.hit_count();

    // A second window re-selects seg_a (already cached and loaded: no new
    // work) and adds seg_c.
    let second = Window::new(date("2004-06-01"), date("2005-02-01")).unwrap();
    fx.manager
        .ensure_segmented_kernels("CASSINI", second)
        .await
        .unwrap();

    assert_eq!(fx.mirror.hit_count(), hits + 2); // seg_b and seg_c only
    assert_eq!(
        fx.engine.furnished_names(),
        ["naif0012.tls", "de440s.bsp", "seg_a.bsp", "seg_b.bsp", "seg_c.bsp"]
    );
}

#[tokio::test]
async fn test_ensure_segmented_kernels_empty_window_ok() {
    let fx = fixture().await;
    let window = Window::new(date("2010-01-01"), date("2010-02-01")).unwrap();
    // No coverage: valid, generic-only.
    fx.manager
        .ensure_segmented_kernels("CASSINI", window)
        .await
        .unwrap();
    assert_eq!(fx.engine.furnished_names(), ["naif0012.tls", "de440s.bsp"]);
}

#[tokio::test]
async fn test_get_cache_info() {
    let fx = fixture().await;
    fx.manager.ensure_mission_kernels("PSP").await.unwrap();

    let info = fx.manager.get_cache_info();
    assert_eq!(info.usage.file_count, 3);
    assert!(info.usage.total_bytes > 0);
    assert!(info.usage.missions.contains_key("GENERIC"));
    assert!(info.usage.missions.contains_key("PSP"));
}

#[tokio::test]
async fn test_delete_mission_cache_unloads_first() {
    let fx = fixture().await;
    fx.manager.ensure_mission_kernels("PSP").await.unwrap();

    let report = fx.manager.delete_mission_cache("PSP").await.unwrap();
    assert_eq!(report.deleted, vec!["spp_nom.bsp".to_string()]);

    // Nothing PSP-attributed remains on disk or in the pool.
    let info = fx.manager.get_cache_info();
    assert!(!info.usage.missions.contains_key("PSP"));
    assert!(!fx.manager.list_loaded().contains(&"spp_nom.bsp".to_string()));
    // Generic kernels stay loaded.
    assert!(fx.manager.list_loaded().contains(&"naif0012.tls".to_string()));

    // Idempotent on an absent mission.
    let report = fx.manager.delete_mission_cache("PSP").await.unwrap();
    assert!(report.deleted.is_empty());
}

#[tokio::test]
async fn test_purge_cache_empties_everything() -> anyhow::Result<()> {
    let fx = fixture().await;
    fx.manager.ensure_mission_kernels("PSP").await?;
    let window = Window::new(date("2004-06-01"), date("2004-07-01"))?;
    fx.manager.ensure_segmented_kernels("CASSINI", window).await?;

    let report = fx.manager.purge_cache().await?;
    assert_eq!(report.deleted.len(), 5);

    let info = fx.manager.get_cache_info();
    assert_eq!(info.usage.file_count, 0);
    assert_eq!(info.usage.total_bytes, 0);
    assert!(fx.manager.list_loaded().is_empty());
    assert!(!fx.manager.pool().is_generic_loaded());
    Ok(())
}

#[tokio::test]
async fn test_unload_all_keeps_cache() {
    let fx = fixture().await;
    fx.manager.ensure_mission_kernels("PSP").await.unwrap();

    fx.manager.unload_all();
    assert!(fx.manager.list_loaded().is_empty());
    // The cache is untouched.
    assert!(fx.manager.cache().has("spp_nom.bsp"));

    // Re-ensuring reloads from cache without touching the network.
    let hits = fx.mirror.hit_count();
    fx.manager.ensure_mission_kernels("PSP").await.unwrap();
    assert_eq!(fx.mirror.hit_count(), hits);
    assert!(fx.manager.list_loaded().contains(&"spp_nom.bsp".to_string()));
}

#[tokio::test]
async fn test_delete_cached_files_reports_missing() {
    let fx = fixture().await;
    fx.manager.ensure_mission_kernels("PSP").await.unwrap();

    let err = fx
        .manager
        .delete_cached_files(&["spp_nom.bsp".to_string(), "ghost.bsp".to_string()])
        .await
        .unwrap_err();
    let Error::PartialDeletion { deleted, failures, .. } = err else {
        panic!("expected PartialDeletion");
    };
    assert_eq!(deleted, vec!["spp_nom.bsp".to_string()]);
    assert_eq!(failures[0].name, "ghost.bsp");
}

#[tokio::test]
async fn test_corrupt_cached_file_recovery() {
    let fx = fixture().await;
    fx.engine.reject_file("spp_nom.bsp");

    let err = fx.manager.ensure_mission_kernels("PSP").await.unwrap_err();
    assert!(matches!(err, Error::KernelLoad { .. }));

    // Recommended recovery: drop the one bad file and redownload.
    fx.engine.reject.lock().clear();
    fx.manager
        .delete_cached_files(&["spp_nom.bsp".to_string()])
        .await
        .unwrap();
    fx.manager.ensure_mission_kernels("PSP").await.unwrap();
    assert!(fx.manager.list_loaded().contains(&"spp_nom.bsp".to_string()));
}

#[tokio::test]
async fn test_state_evaluates_after_ensure() {
    let fx = fixture().await;
    let state = fx
        .manager
        .state("PSP", "SUN", "2024-01-01T00:00:00", "ECLIPJ2000")
        .await
        .unwrap();
    assert!(state.light_time_s > 0.0);
    // The ensure happened implicitly.
    assert!(fx.manager.list_loaded().contains(&"spp_nom.bsp".to_string()));
}

#[tokio::test]
async fn test_state_segmented_requires_prior_window() {
    let fx = fixture().await;
    let err = fx
        .manager
        .state("CASSINI", "SUN", "2004-06-15T00:00:00", "ECLIPJ2000")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientCoverage { .. }));

    let window = Window::new(date("2004-06-01"), date("2004-07-01")).unwrap();
    fx.manager
        .ensure_segmented_kernels("CASSINI", window)
        .await
        .unwrap();
    fx.manager
        .state("CASSINI", "SUN", "2004-06-15T00:00:00", "ECLIPJ2000")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_missions_summaries() {
    let fx = fixture().await;
    let missions = fx.manager.list_missions();
    // Spacecraft only: SUN is absent.
    assert!(missions.iter().all(|m| m.naif_id < 0));

    let psp = missions.iter().find(|m| m.key == "PSP").unwrap();
    assert!(psp.has_kernels && !psp.segmented);
    let cassini = missions.iter().find(|m| m.key == "CASSINI").unwrap();
    assert!(cassini.has_kernels && cassini.segmented);
}

#[tokio::test]
async fn test_check_remote_kernels_reports_new_files() {
    // Directory listing with one configured and one unknown .bsp file.
    let listing = r#"<html><body>
        <a href="spp_nom.bsp">spp_nom.bsp</a>
        <a href="spp_new_v044.bsp">spp_new_v044.bsp</a>
        <a href="readme.txt">readme.txt</a>
    </body></html>"#;
    // The listing is served at the parent of the configured kernel URL.
    let mirror = MockMirror::start_with_listing(mirror_files(), listing).await;
    let engine = RecordingEngine::new();
    let cache_dir = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        cache_dir: Some(cache_dir.path().to_path_buf()),
        download_timeout_secs: 10,
    };
    let manager = KernelManager::with_parts(
        config,
        engine,
        test_registry(&mirror),
        test_manifests(&mirror),
    )
    .unwrap();

    let report = manager.check_remote_kernels("PSP").await.unwrap();
    assert_eq!(report.mission, "PSP");
    assert_eq!(report.configured_files, vec!["spp_nom.bsp".to_string()]);
    assert_eq!(report.directories.len(), 1);
    assert!(report.directories[0].error.is_none());
    assert_eq!(report.other_files, vec!["spp_new_v044.bsp".to_string()]);
}

#[tokio::test]
async fn test_check_remote_kernels_rejects_segmented() {
    let fx = fixture().await;
    let err = fx.manager.check_remote_kernels("CASSINI").await.unwrap_err();
    assert!(matches!(err, Error::SegmentedMission { .. }));
}
