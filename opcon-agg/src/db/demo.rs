//! Demo data generator
//!
//! Adds a few demo operators, two extra catalog items and a handful of
//! finished sessions per operator so the leaderboard and history views have
//! something to show on a fresh install.
//!
//! The random plan is drawn up front in plain synchronous code; `ThreadRng`
//! is not `Send` and must never be held across an `.await`.

use opcon_common::events::EventType;
use opcon_common::models::MediaKind;
use opcon_common::time::now_iso;
use rand::Rng;
use sqlx::SqlitePool;

use super::media::{self, NewMedia};
use crate::error::Result;

const DEMO_OPERATORS: [&str; 3] = ["Ana Demo", "Carlos Test", "Lucia QA"];

/// Events written for every demo session, in order
const DEMO_EVENTS: [EventType; 3] = [EventType::Play, EventType::Pause, EventType::Stop];

#[derive(Debug, Clone)]
struct PlannedSession {
    /// Picks a catalog item once ids are known (taken modulo the count)
    media_slot: usize,
    completed: bool,
    last_position: f64,
    event_positions: [f64; 3],
}

#[derive(Debug, Clone)]
struct PlannedOperator {
    name: String,
    dni: String,
    sessions: Vec<PlannedSession>,
}

fn demo_media() -> Vec<NewMedia> {
    vec![
        NewMedia::new("Alpha Symphony", MediaKind::Audio, "https://samplelib.com/lib/preview/mp3/sample-9s.mp3", 9, "Classical"),
        NewMedia::new("Beta Clip", MediaKind::Video, "https://samplelib.com/lib/preview/mp4/sample-15s.mp4", 15, "Documentary"),
    ]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn plan() -> Vec<PlannedOperator> {
    let mut rng = rand::thread_rng();
    DEMO_OPERATORS
        .iter()
        .map(|name| {
            let session_count = rng.gen_range(2..=5);
            let sessions = (0..session_count)
                .map(|_| {
                    let last_position = round2(rng.gen_range(0.0..30.0));
                    let mut event_positions = [0.0; 3];
                    for position in event_positions.iter_mut() {
                        *position = round2(rng.gen_range(0.0..=last_position));
                    }
                    PlannedSession {
                        media_slot: rng.gen_range(0..usize::MAX),
                        completed: rng.gen_bool(0.5),
                        last_position,
                        event_positions,
                    }
                })
                .collect();
            PlannedOperator {
                name: name.to_string(),
                dni: format!("DEMO-{}", rng.gen_range(1000..=9999)),
                sessions,
            }
        })
        .collect()
}

/// Insert demo operators, media and sessions. Returns sessions created.
pub async fn seed_demo(db: &SqlitePool) -> Result<usize> {
    let operators = plan();

    media::seed_samples(db).await?;
    for item in demo_media() {
        media::insert_media(db, &item).await?;
    }
    let media_ids = media::media_ids(db).await?;

    let mut tx = db.begin().await?;
    let mut created = 0;

    for operator in &operators {
        let operator_id = sqlx::query("INSERT INTO operators (name, dni, created_at) VALUES (?, ?, ?)")
            .bind(&operator.name)
            .bind(&operator.dni)
            .bind(now_iso())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for session in &operator.sessions {
            let media_item_id = media_ids[session.media_slot % media_ids.len()];
            let now = now_iso();
            let session_id = sqlx::query(
                r#"
                INSERT INTO playback_sessions
                    (operator_id, media_item_id, started_at, ended_at, last_position, completed)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(operator_id)
            .bind(media_item_id)
            .bind(&now)
            .bind(&now)
            .bind(session.last_position)
            .bind(session.completed as i64)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

            for (event_type, position) in DEMO_EVENTS.iter().zip(session.event_positions) {
                sqlx::query(
                    r#"
                    INSERT INTO playback_events (session_id, event_type, position, payload_json, created_at)
                    VALUES (?, ?, ?, '{}', ?)
                    "#,
                )
                .bind(session_id)
                .bind(event_type.as_str())
                .bind(position)
                .bind(now_iso())
                .execute(&mut *tx)
                .await?;
            }
            created += 1;
        }
    }

    tx.commit().await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_shape() {
        let operators = plan();
        assert_eq!(operators.len(), DEMO_OPERATORS.len());
        for operator in &operators {
            assert!(operator.dni.starts_with("DEMO-"));
            assert!((2..=5).contains(&operator.sessions.len()));
            for session in &operator.sessions {
                assert!(session.last_position >= 0.0 && session.last_position <= 30.0);
                for position in session.event_positions {
                    assert!(position <= session.last_position);
                }
            }
        }
    }

    #[tokio::test]
    async fn test_seed_demo_populates_tables() {
        let db = crate::db::connect_in_memory().await.unwrap();
        let created = seed_demo(&db).await.unwrap();
        assert!((6..=15).contains(&created));

        let stats = crate::db::aggregates::stats(&db).await.unwrap();
        assert_eq!(stats.operators_total, 3);
        assert_eq!(stats.media_total, 6);
        assert_eq!(stats.sessions_total, created as i64);
        assert_eq!(stats.events_total, created as i64 * 3);
    }
}
