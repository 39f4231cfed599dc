//! Session event vocabulary
//!
//! Every transport or user action taken while a session is open becomes one
//! [`EventRecord`]: an event type, the playback position at the moment of the
//! action, and a small JSON payload describing the action.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

use crate::models::MediaKind;
use crate::Error;

/// Event type tag as stored by the aggregation service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Load,
    Play,
    Pause,
    Stop,
    Seek,
    Speed,
    Volume,
    Ended,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        EventType::Load,
        EventType::Play,
        EventType::Pause,
        EventType::Stop,
        EventType::Seek,
        EventType::Speed,
        EventType::Volume,
        EventType::Ended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Load => "load",
            EventType::Play => "play",
            EventType::Pause => "pause",
            EventType::Stop => "stop",
            EventType::Seek => "seek",
            EventType::Speed => "speed",
            EventType::Volume => "volume",
            EventType::Ended => "ended",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown event type '{}'", s)))
    }
}

/// Seek request: relative skip or absolute position, both in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    Delta(f64),
    Absolute(f64),
}

/// A playback action worth recording against the open session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Media bound to a freshly started session
    Load { title: String, kind: MediaKind },
    /// Playback confirmed started
    Play { rate: f64, volume: f64 },
    Pause,
    /// Transport paused and rewound to 0
    Stop,
    Seek(SeekTarget),
    Speed { value: f64 },
    Volume { value: f64 },
    /// Natural end of media
    Ended,
}

impl SessionEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            SessionEvent::Load { .. } => EventType::Load,
            SessionEvent::Play { .. } => EventType::Play,
            SessionEvent::Pause => EventType::Pause,
            SessionEvent::Stop => EventType::Stop,
            SessionEvent::Seek(_) => EventType::Seek,
            SessionEvent::Speed { .. } => EventType::Speed,
            SessionEvent::Volume { .. } => EventType::Volume,
            SessionEvent::Ended => EventType::Ended,
        }
    }

    /// JSON payload sent alongside the event
    pub fn payload(&self) -> Value {
        match self {
            SessionEvent::Load { title, kind } => json!({ "title": title, "kind": kind }),
            SessionEvent::Play { rate, volume } => json!({ "rate": rate, "volume": volume }),
            SessionEvent::Pause | SessionEvent::Stop => json!({}),
            SessionEvent::Seek(SeekTarget::Delta(delta)) => json!({ "delta": delta }),
            SessionEvent::Seek(SeekTarget::Absolute(absolute)) => json!({ "absolute": absolute }),
            SessionEvent::Speed { value } | SessionEvent::Volume { value } => {
                json!({ "value": value })
            }
            SessionEvent::Ended => json!({ "ended": true }),
        }
    }

    /// Capture this event at the given playback position
    pub fn record(&self, position: f64) -> EventRecord {
        EventRecord {
            event_type: self.event_type(),
            position: clamp_position(position),
            payload: self.payload(),
        }
    }
}

/// Positioned event as delivered to the aggregation service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub event_type: EventType,
    pub position: f64,
    #[serde(default)]
    pub payload: Value,
}

/// Playback positions are never negative; unusable readings become 0
pub fn clamp_position(position: f64) -> f64 {
    if position.is_finite() {
        position.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_round_trip_names() {
        for t in EventType::ALL {
            assert_eq!(t.as_str().parse::<EventType>().unwrap(), t);
        }
        assert!("rewind".parse::<EventType>().is_err());
    }

    #[test]
    fn test_seek_payload_shapes() {
        let delta = SessionEvent::Seek(SeekTarget::Delta(10.0));
        assert_eq!(delta.payload(), json!({ "delta": 10.0 }));

        let absolute = SessionEvent::Seek(SeekTarget::Absolute(42.5));
        assert_eq!(absolute.payload(), json!({ "absolute": 42.5 }));
        assert_eq!(absolute.event_type(), EventType::Seek);
    }

    #[test]
    fn test_load_payload_carries_title_and_kind() {
        let event = SessionEvent::Load {
            title: "Sample".to_string(),
            kind: MediaKind::Audio,
        };
        assert_eq!(event.payload(), json!({ "title": "Sample", "kind": "audio" }));
    }

    #[test]
    fn test_record_clamps_position() {
        assert_eq!(SessionEvent::Pause.record(-3.0).position, 0.0);
        assert_eq!(SessionEvent::Pause.record(f64::NAN).position, 0.0);
        assert_eq!(SessionEvent::Pause.record(f64::INFINITY).position, 0.0);
        assert_eq!(SessionEvent::Pause.record(12.25).position, 12.25);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = SessionEvent::Ended.record(99.0);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["eventType"], "ended");
        assert_eq!(value["position"], 99.0);
        assert_eq!(value["payload"]["ended"], true);
    }
}
