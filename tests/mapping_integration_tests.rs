use chrono::{TimeDelta, TimeZone, Utc};
use soccerverse_bot::{
    commands::run_admin_update,
    error::AppError,
    mappings::{MappingRefresher, MappingStore, RefreshPhase, RemoteDataSource, SnapshotFile},
    testing_utils::{DataPackBuilder, PropertyTesting},
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn refresher_at(server_uri: &str, snapshot_path: &Path) -> MappingRefresher {
    let source = RemoteDataSource::new(format!("{server_uri}/pack.json"), 5)
        .unwrap()
        .with_retry_policy(0, Duration::from_millis(1));
    MappingRefresher::new(
        Arc::new(MappingStore::new()),
        source,
        SnapshotFile::new(snapshot_path),
    )
}

fn full_pack() -> DataPackBuilder {
    DataPackBuilder::new()
        .club("2180", "Olympique Test")
        .club("2181", "Leeds United")
        .player("42", Some("Zinedine"), Some("Zidane"))
        .player("43", None, Some("Ronaldinho"))
        .league("CHE", 1, "Super League")
        .league("FRA", 2, "Ligue 2")
        .stadium("7", "Parc des Tests")
        .cup("CUP_FRA", "Coupe de France")
}

async fn mount_pack(server: &MockServer, document: serde_json::Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/pack.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .expect(expected)
        .mount(server)
        .await;
}

/// Startup without a snapshot downloads the pack exactly once and persists it
#[tokio::test]
async fn test_startup_without_snapshot_fetches_once() {
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 1).await;
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("mappings").join("soccerverse_data.json");
    let refresher = refresher_at(&server.uri(), &snapshot_path);

    let phase = refresher.initialize().await;

    assert!(matches!(
        phase,
        RefreshPhase::Ready {
            last_update: Some(_)
        }
    ));
    assert!(snapshot_path.exists());
    let stats = refresher.stats();
    assert_eq!(stats.counts.clubs, 2);
    assert_eq!(stats.counts.players, 2);
    assert_eq!(stats.counts.leagues, 2);
    assert_eq!(stats.counts.stadiums, 1);
    assert_eq!(stats.counts.cups, 1);
}

/// A persisted snapshot reloaded in a new process resolves the same names
#[tokio::test]
async fn test_snapshot_reload_resolves_identical_names() {
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 1).await;
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");

    let first = refresher_at(&server.uri(), &snapshot_path);
    first.force_refresh().await.unwrap();

    let second = refresher_at("http://127.0.0.1:9", &snapshot_path);
    let last_update = second.load_persisted_snapshot().await.unwrap();
    assert_eq!(last_update, first.store().last_update());

    let (a, b) = (first.store(), second.store());
    for id in [2180, 2181, 9999] {
        assert_eq!(a.resolve_club_name(id), b.resolve_club_name(id));
    }
    for id in [42, 43, 44] {
        assert_eq!(a.resolve_player_name(id), b.resolve_player_name(id));
    }
    assert_eq!(a.resolve_league_name("CHE", 0), b.resolve_league_name("CHE", 0));
    assert_eq!(a.resolve_stadium_name(7), b.resolve_stadium_name(7));
    assert_eq!(a.resolve_cup_name("CUP_FRA"), b.resolve_cup_name("CUP_FRA"));
    assert_eq!(b.resolve_player_name(42), "Zinedine Zidane");
    assert_eq!(b.resolve_player_name(43), "Ronaldinho");
}

#[tokio::test]
async fn test_snapshot_older_than_a_week_is_refreshed() {
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 1).await;
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");

    let stale = DataPackBuilder::new()
        .club("1", "Old Name")
        .last_update(now - TimeDelta::days(8))
        .build_document();
    SnapshotFile::new(&snapshot_path).write(&stale).await.unwrap();

    let refresher = refresher_at(&server.uri(), &snapshot_path);
    refresher.load_persisted_snapshot().await.unwrap();
    assert_eq!(refresher.store().resolve_club_name(1), "Old Name");

    assert!(refresher.check_and_refresh_if_stale_at(now).await);
    assert_eq!(refresher.store().resolve_club_name(2180), "Olympique Test");
    assert_eq!(refresher.store().resolve_club_name(1), "Club #1");
}

#[tokio::test]
async fn test_fresh_snapshot_is_not_refreshed() {
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 0).await;
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");

    let fresh = DataPackBuilder::new()
        .club("1", "Current Name")
        .last_update(now - TimeDelta::days(6))
        .build_document();
    SnapshotFile::new(&snapshot_path).write(&fresh).await.unwrap();

    let refresher = refresher_at(&server.uri(), &snapshot_path);
    refresher.load_persisted_snapshot().await.unwrap();

    assert!(!refresher.check_and_refresh_if_stale_at(now).await);
    assert_eq!(refresher.store().resolve_club_name(1), "Current Name");
}

/// A snapshot without metadata loads its tables but counts as stale
#[tokio::test]
async fn test_snapshot_without_meta_is_stale() {
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");
    let document = DataPackBuilder::new().club("5", "No Meta FC").build_document();
    SnapshotFile::new(&snapshot_path).write(&document).await.unwrap();

    let refresher = refresher_at("http://127.0.0.1:9", &snapshot_path);
    assert_eq!(refresher.load_persisted_snapshot().await.unwrap(), None);
    assert_eq!(refresher.store().resolve_club_name(5), "No Meta FC");
    assert!(refresher.is_stale_at(Utc::now()));
}

#[tokio::test]
async fn test_corrupt_snapshot_forces_refresh_on_startup() {
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 1).await;
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");
    tokio::fs::write(&snapshot_path, "{ not json").await.unwrap();

    let refresher = refresher_at(&server.uri(), &snapshot_path);
    refresher.initialize().await;

    assert_eq!(refresher.store().resolve_club_name(2180), "Olympique Test");
    let persisted = SnapshotFile::new(&snapshot_path).read().await.unwrap();
    assert!(PropertyTesting::validate_snapshot_document(&persisted).is_ok());
}

/// Two concurrent forced refreshes share a single download
#[tokio::test]
async fn test_concurrent_refreshes_fetch_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pack.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(full_pack().build_document())
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let refresher = refresher_at(&server.uri(), &dir.path().join("snapshot.json"));

    let (first, second) = tokio::join!(refresher.force_refresh(), refresher.force_refresh());

    let first = first.unwrap();
    let second = second.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.counts.clubs, 2);
}

/// A joined caller sees the failure of the refresh it waited for
#[tokio::test]
async fn test_concurrent_refreshes_share_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pack.json"))
        .respond_with(ResponseTemplate::new(404).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let refresher = refresher_at(&server.uri(), &dir.path().join("snapshot.json"));

    let (first, second) = tokio::join!(refresher.force_refresh(), refresher.force_refresh());

    assert!(matches!(first.unwrap_err(), AppError::ApiNotFound { .. }));
    assert!(matches!(second.unwrap_err(), AppError::RefreshFailed(_)));
}

/// A failed download leaves both the live tables and the snapshot untouched
#[tokio::test]
async fn test_failed_refresh_keeps_tables_and_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");
    let previous = DataPackBuilder::new()
        .club("2180", "Before FC")
        .last_update(Utc::now() - TimeDelta::days(10))
        .build_document();
    SnapshotFile::new(&snapshot_path).write(&previous).await.unwrap();
    let before = tokio::fs::read_to_string(&snapshot_path).await.unwrap();

    let refresher = refresher_at(&server.uri(), &snapshot_path);
    refresher.load_persisted_snapshot().await.unwrap();

    let error = refresher.force_refresh().await.unwrap_err();
    assert!(error.is_transport_failure());
    assert_eq!(refresher.store().resolve_club_name(2180), "Before FC");
    assert_eq!(
        tokio::fs::read_to_string(&snapshot_path).await.unwrap(),
        before
    );
}

#[tokio::test]
async fn test_document_without_pack_data_is_rejected() {
    let server = MockServer::start().await;
    mount_pack(&server, serde_json::json!({"meta": {"version": "1"}}), 1).await;
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");
    let refresher = refresher_at(&server.uri(), &snapshot_path);
    refresher
        .store()
        .rebuild_from(&DataPackBuilder::new().club("1", "Kept").build_pack());

    let error = refresher.force_refresh().await.unwrap_err();
    assert!(error.is_malformed_document());
    assert_eq!(refresher.store().resolve_club_name(1), "Kept");
    assert!(!snapshot_path.exists());
}

/// When the snapshot cannot be written the new tables still serve lookups
#[tokio::test]
async fn test_persistence_failure_keeps_in_memory_update() {
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 1).await;
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    tokio::fs::write(&blocker, "a file, not a directory")
        .await
        .unwrap();
    let refresher = refresher_at(&server.uri(), &blocker.join("snapshot.json"));

    let error = refresher.force_refresh().await.unwrap_err();
    assert!(error.is_persistence_failure());
    assert_eq!(refresher.store().resolve_club_name(2180), "Olympique Test");
    assert!(refresher.stats().last_update.is_some());
}

#[tokio::test]
async fn test_known_and_unknown_club_ids() {
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 1).await;
    let dir = tempdir().unwrap();
    let refresher = refresher_at(&server.uri(), &dir.path().join("snapshot.json"));
    refresher.force_refresh().await.unwrap();

    let store = refresher.store();
    assert_eq!(store.resolve_club_name(2180), "Olympique Test");
    assert_eq!(store.resolve_club_name(9999), "Club #9999");
    assert_eq!(store.club_details(9999), None);
    assert_eq!(store.search_clubs_by_name("UNITED", 10).len(), 1);
}

/// Pack divisions are 1-based, lookups use the 0-based index of the game API
#[tokio::test]
async fn test_league_division_index_is_shifted() {
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 1).await;
    let dir = tempdir().unwrap();
    let refresher = refresher_at(&server.uri(), &dir.path().join("snapshot.json"));
    refresher.force_refresh().await.unwrap();

    let store = refresher.store();
    assert_eq!(store.resolve_league_name("CHE", 0), "Super League");
    assert_eq!(store.resolve_league_name("FRA", 1), "Ligue 2");
    assert_eq!(store.resolve_league_name("CHE", 1), "Ligue CHE D2");
}

#[tokio::test]
async fn test_admin_gate_denies_without_request() {
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 0).await;
    let dir = tempdir().unwrap();
    let refresher = refresher_at(&server.uri(), &dir.path().join("snapshot.json"));

    let error = run_admin_update(&refresher, false).await.unwrap_err();
    assert!(matches!(error, AppError::PermissionDenied(_)));
    assert_eq!(refresher.stats().counts.total(), 0);
}

#[tokio::test]
async fn test_persisted_snapshot_document_is_valid() {
    let server = MockServer::start().await;
    mount_pack(&server, full_pack().build_document(), 1).await;
    let dir = tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");
    let refresher = refresher_at(&server.uri(), &snapshot_path);
    refresher.force_refresh().await.unwrap();

    let persisted = SnapshotFile::new(&snapshot_path).read().await.unwrap();
    PropertyTesting::validate_snapshot_document(&persisted).unwrap();
    assert_eq!(
        persisted["PackData"]["ClubData"]["C"][0]["n"],
        "Olympique Test"
    );
}

/// A server asking for an hour-long `Retry-After` cannot stall a forced refresh
#[tokio::test]
async fn test_forced_refresh_wait_is_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pack.json"))
        .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "3600"))
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let source = RemoteDataSource::new(format!("{}/pack.json", server.uri()), 2)
        .unwrap()
        .with_retry_policy(1, Duration::from_millis(1))
        .with_max_retry_after(Duration::from_millis(100));
    let refresher = MappingRefresher::new(
        Arc::new(MappingStore::new()),
        source,
        SnapshotFile::new(dir.path().join("snapshot.json")),
    );

    let outcome = tokio::time::timeout(Duration::from_secs(5), refresher.force_refresh())
        .await
        .expect("forced refresh should finish within the retry bound");
    assert!(matches!(
        outcome.unwrap_err(),
        AppError::ApiServiceUnavailable { status: 503, .. }
    ));
}
