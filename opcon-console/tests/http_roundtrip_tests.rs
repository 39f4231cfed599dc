//! End-to-end tests against a real aggregation service
//!
//! Each test serves the opcon-agg router over a private in-memory database
//! on an ephemeral port and drives it through the HTTP client.

use opcon_agg::{build_router, db, AppState};
use opcon_common::events::SessionEvent;
use opcon_common::models::{MediaItem, MediaKind, SessionId};
use opcon_console::client::{AggregationService, HttpAggregationClient};
use opcon_console::session::{SessionController, SessionState};
use opcon_console::transport::TransportAdapter;
use opcon_console::Error;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

/// Test helper: serve a fresh database, return a client for it
async fn serve() -> (Arc<HttpAggregationClient>, SqlitePool) {
    let pool = db::connect_in_memory()
        .await
        .expect("Should open in-memory database");
    let app = build_router(AppState::new(pool.clone(), "test.sqlite3"));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind ephemeral port");
    let addr = listener.local_addr().expect("Should have local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server should run");
    });

    let client = HttpAggregationClient::new(&format!("http://{}", addr), Duration::from_secs(5))
        .expect("Should build client");
    (Arc::new(client), pool)
}

async fn sample(client: &HttpAggregationClient, title: &str) -> MediaItem {
    client
        .fetch_media(None)
        .await
        .expect("Should list media")
        .into_iter()
        .find(|item| item.title == title)
        .expect("Sample item should exist")
}

#[tokio::test]
async fn test_tracked_session_reaches_projections() {
    let (client, pool) = serve().await;
    let mut controller = SessionController::new(client.clone(), TransportAdapter::simulated());

    let operator = controller.register_operator("  Ana  ", "x123").await.unwrap();
    assert_eq!(operator.name, "Ana");
    assert_eq!(operator.dni, "X123");

    let item = sample(&client, "Sample MP4 10s").await;
    assert_eq!(item.kind, MediaKind::Video);
    let session = controller.load_media(item).await.unwrap().expect("Should be tracked");

    controller.play().await.unwrap();
    controller.tick(3.0).await;
    assert_eq!(controller.seek_by(2.0).unwrap(), 5.0);
    controller.tick(10.0).await;
    assert_eq!(controller.session_state(), SessionState::Idle);

    let types = db::sessions::event_types_for(&pool, session).await.unwrap();
    assert_eq!(types, vec!["load", "play", "seek", "ended"]);

    let history = controller.dashboard().history.clone().expect("History fetched");
    assert_eq!(history.len(), 1);
    assert!(history[0].completed);
    assert_eq!(history[0].last_position, 10.0);
    assert_eq!(history[0].title, "Sample MP4 10s");

    let leaders = controller.dashboard().leaders.clone().expect("Leaderboard fetched");
    assert_eq!(leaders[0].name, "Ana");
    assert_eq!(leaders[0].total_sessions, 1);
    assert_eq!(leaders[0].completions, 1);
    assert_eq!(leaders[0].avg_position, 10.0);

    let stats = controller.dashboard().stats.clone().expect("Stats fetched");
    assert_eq!(stats.media_total, 4);
    assert_eq!(stats.operators_total, 1);
    assert_eq!(stats.sessions_total, 1);
    assert_eq!(stats.events_total, 4);
}

#[tokio::test]
async fn test_superseded_and_stopped_sessions_are_uncompleted() {
    let (client, pool) = serve().await;
    let mut controller = SessionController::new(client.clone(), TransportAdapter::simulated());

    controller.register_operator("Bea", "555").await.unwrap();
    let first = sample(&client, "Sample MP3 6s").await;
    let second = sample(&client, "Sample MP4 5s").await;

    let first_session = controller.load_media(first).await.unwrap().unwrap();
    controller.play().await.unwrap();
    controller.tick(2.0).await;

    let second_session = controller.load_media(second).await.unwrap().unwrap();
    assert_ne!(first_session, second_session);
    controller.play().await.unwrap();
    controller.tick(1.0).await;
    controller.stop().await;

    let history = controller.dashboard().history.clone().unwrap();
    // Most recent first
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].title, "Sample MP4 5s");
    assert!(!history[0].completed);
    assert_eq!(history[0].last_position, 0.0);
    assert_eq!(history[1].title, "Sample MP3 6s");
    assert!(!history[1].completed);
    assert_eq!(history[1].last_position, 2.0);

    let types = db::sessions::event_types_for(&pool, second_session).await.unwrap();
    assert_eq!(types, vec!["load", "play", "stop"]);
}

#[tokio::test]
async fn test_service_errors_are_classified() {
    let (client, _pool) = serve().await;

    let err = client.register_operator("", "1").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(err.to_string(), "Name and DNI are required.");

    let operator = client.register_operator("Cid", "9").await.unwrap();
    let err = client.start_session(operator.operator_id, 999).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let media = client.fetch_media(Some(MediaKind::Audio)).await.unwrap();
    assert_eq!(media.len(), 2);
    let session = client.start_session(operator.operator_id, media[0].id).await.unwrap();
    client.end_session(session, 1.0, false).await.unwrap();

    // Closed sessions reject further writes
    let late = SessionEvent::Pause.record(1.0);
    assert!(matches!(
        client.record_event(session, &late).await,
        Err(Error::Service(_))
    ));
    assert!(matches!(
        client.end_session(session, 1.0, true).await,
        Err(Error::Service(_))
    ));

    let err = client
        .record_event(SessionId(session.0 + 100), &late)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_unknown_operator_history_is_empty() {
    let (client, _pool) = serve().await;
    assert!(client.fetch_history(4242, 8).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_seed_populates_leaderboard() {
    let (client, _pool) = serve().await;
    let mut controller = SessionController::new(client.clone(), TransportAdapter::simulated());

    let message = controller.seed_demo().await.unwrap();
    assert!(message.starts_with("Demo data created ("));

    let leaders = controller.dashboard().leaders.clone().unwrap();
    assert!(!leaders.is_empty());
    assert!(leaders.len() <= 10);
    let stats = controller.dashboard().stats.clone().unwrap();
    assert_eq!(stats.operators_total, 3);
    assert_eq!(stats.media_total, 6);
}

#[tokio::test]
async fn test_unreachable_service_leaves_views_empty() {
    let client = HttpAggregationClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
    let mut controller = SessionController::new(Arc::new(client), TransportAdapter::simulated());

    controller.refresh_all().await;
    assert!(controller.dashboard().stats.is_none());
    assert!(controller.dashboard().leaders.is_none());

    let err = controller.register_operator("Ana", "1").await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(controller.status().is_error());
}

#[tokio::test]
async fn test_added_media_is_listed_and_playable() {
    let (client, pool) = serve().await;
    let mut controller = SessionController::new(client.clone(), TransportAdapter::simulated());

    let media_id = controller
        .add_media("Station intro", MediaKind::Audio, "https://example.com/intro.mp3", 4, Some("Station ID"))
        .await
        .unwrap();
    assert_eq!(controller.status().message(), format!("Added: Station intro (#{})", media_id));

    let library = controller.dashboard().library.clone().expect("Library fetched");
    assert_eq!(library.len(), 5);
    assert_eq!(library[0].id, media_id);
    assert_eq!(library[0].genre, "Station ID");
    assert_eq!(controller.dashboard().stats.as_ref().map(|s| s.media_total), Some(5));

    controller.register_operator("Dan", "77").await.unwrap();
    let session = controller.load_media_by_id(media_id).await.unwrap().unwrap();
    controller.play().await.unwrap();
    controller.tick(5.0).await;
    let types = db::sessions::event_types_for(&pool, session).await.unwrap();
    assert_eq!(types, vec!["load", "play", "ended"]);

    // The service's own validation still applies
    let err = client
        .add_media("", MediaKind::Video, "https://example.com/x.mp4", 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
