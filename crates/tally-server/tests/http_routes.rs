#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use tally_server::{app_state::AppState, config, router};

fn app_with_file_store(state_path: &Path, durability: &str) -> Router {
    let yaml = format!(
        r#"
version: 1
counter:
  persistence: file
  path: "{}"
  durability: {durability}
"#,
        state_path.display()
    );
    let cfg = config::load_from_str(&yaml).expect("test config must parse");
    router::build_router(AppState::new(cfg))
}

fn app_with_memory_store() -> Router {
    let cfg = config::load_from_str("counter: { persistence: memory }").unwrap();
    router::build_router(AppState::new(cfg))
}

async fn get(app: &Router, path: &str) -> (StatusCode, Vec<u8>) {
    let res = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let body = res.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, body)
}

fn visits_in(body: &[u8]) -> u64 {
    let v: Value = serde_json::from_slice(body).expect("body must be JSON");
    v["visits"].as_u64().expect("visits must be an integer")
}

#[tokio::test]
async fn health_route_is_side_effect_free() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("counter.json");
    let app = app_with_file_store(&state_path, "relaxed");

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.is_empty());

    // No state file appears: the counter was never touched.
    assert!(!state_path.exists());
}

#[tokio::test]
async fn first_visit_returns_one() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_file_store(&dir.path().join("counter.json"), "relaxed");

    let (status, body) = get(&app, "/visits").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(visits_in(&body), 1);
}

#[tokio::test]
async fn seeded_state_increments_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("counter.json");
    fs::write(&state_path, br#"{"visits": 7}"#).unwrap();

    let app = app_with_file_store(&state_path, "relaxed");
    let (_, body) = get(&app, "/visits").await;
    assert_eq!(visits_in(&body), 8);

    let on_disk: Value = serde_json::from_slice(&fs::read(&state_path).unwrap()).unwrap();
    assert_eq!(on_disk["visits"], 8);
}

#[tokio::test]
async fn malformed_state_counts_from_one() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("counter.json");
    fs::write(&state_path, b"not json at all").unwrap();

    let app = app_with_file_store(&state_path, "relaxed");
    let (_, body) = get(&app, "/visits").await;
    assert_eq!(visits_in(&body), 1);
}

#[tokio::test]
async fn state_survives_service_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("counter.json");
    fs::write(&state_path, br#"{"visits": 41}"#).unwrap();

    // First instance takes the counter to 42, then goes away.
    let app = app_with_file_store(&state_path, "relaxed");
    let (_, body) = get(&app, "/visits").await;
    assert_eq!(visits_in(&body), 42);
    drop(app);

    let app = app_with_file_store(&state_path, "relaxed");
    let (_, body) = get(&app, "/visits").await;
    assert_eq!(visits_in(&body), 43);
}

#[tokio::test]
async fn memory_store_resets_per_instance() {
    let app = app_with_memory_store();
    let (_, body) = get(&app, "/visits").await;
    assert_eq!(visits_in(&body), 1);
    let (_, body) = get(&app, "/visits").await;
    assert_eq!(visits_in(&body), 2);

    // A fresh instance models a process restart: the count is gone.
    let app = app_with_memory_store();
    let (_, body) = get(&app, "/visits").await;
    assert_eq!(visits_in(&body), 1);
}

#[tokio::test]
async fn preflight_short_circuits_without_counting() {
    let dir = tempfile::tempdir().unwrap();
    let state_path = dir.path().join("counter.json");
    let app = app_with_file_store(&state_path, "relaxed");

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/visits")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        res.headers()["access-control-allow-methods"],
        "GET, POST, OPTIONS"
    );
    assert_eq!(
        res.headers()["access-control-allow-headers"],
        "Origin, Content-Type, Accept"
    );

    let body = res.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
    assert!(!state_path.exists(), "preflight must not touch the counter");
}

#[tokio::test]
async fn cors_headers_are_present_on_normal_responses() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_with_file_store(&dir.path().join("counter.json"), "relaxed");

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn cors_can_be_disabled() {
    let cfg = config::load_from_str(
        "server: { cors: false }\ncounter: { persistence: memory }",
    )
    .unwrap();
    let app = router::build_router(AppState::new(cfg));

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(!res.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn strict_durability_surfaces_storage_failure() {
    let dir = tempfile::tempdir().unwrap();
    // Writes under a directory that does not exist always fail.
    let state_path = dir.path().join("no-such-dir").join("counter.json");
    let app = app_with_file_store(&state_path, "strict");

    let (status, body) = get(&app, "/visits").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let v: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(v["error"], "STORAGE");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_visits_have_no_duplicates_or_gaps() {
    const CALLS: u64 = 50;

    let dir = tempfile::tempdir().unwrap();
    let app = app_with_file_store(&dir.path().join("counter.json"), "relaxed");

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..CALLS {
        let app = app.clone();
        tasks.spawn(async move {
            let res = app
                .oneshot(Request::builder().uri("/visits").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            let body = res.into_body().collect().await.unwrap().to_bytes();
            visits_in(&body)
        });
    }

    let mut seen = BTreeSet::new();
    while let Some(v) = tasks.join_next().await {
        assert!(seen.insert(v.unwrap()), "duplicate visit value");
    }
    assert_eq!(seen.first().copied(), Some(1));
    assert_eq!(seen.last().copied(), Some(CALLS));
    assert_eq!(seen.len() as u64, CALLS);
}
