//! Session lifecycle state machine
//!
//! ```text
//! Idle ──begin_start──► Loading ──activate──► Active ──begin_end──► Ending ──finish_end──► Idle
//!                          │
//!                          └──fail_start / abandon_start──► Idle
//! ```
//!
//! Every state past `Idle` carries the generation it was started under, so
//! a start response arriving for an abandoned load is recognized as stale.

use opcon_common::models::SessionId;
use thiserror::Error;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session bound
    #[default]
    Idle,
    /// Start call in flight
    Loading { generation: u64 },
    /// Session bound; events are dispatched against it
    Active { session_id: SessionId, generation: u64 },
    /// End call in flight; events are rejected
    Ending { session_id: SessionId, generation: u64 },
}

/// Attempted transition not allowed from the current state
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Cannot {action} while {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub action: &'static str,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Loading { .. } => "loading",
            SessionState::Active { .. } => "active",
            SessionState::Ending { .. } => "ending",
        }
    }

    fn invalid(&self, action: &'static str) -> InvalidTransition {
        InvalidTransition {
            state: self.name(),
            action,
        }
    }

    /// Session id events may be dispatched against; only set while `Active`
    pub fn active_session(&self) -> Option<SessionId> {
        match self {
            SessionState::Active { session_id, .. } => Some(*session_id),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            SessionState::Idle => None,
            SessionState::Loading { generation }
            | SessionState::Active { generation, .. }
            | SessionState::Ending { generation, .. } => Some(*generation),
        }
    }

    /// `Idle → Loading`
    pub fn begin_start(self, generation: u64) -> Result<Self, InvalidTransition> {
        match self {
            SessionState::Idle => Ok(SessionState::Loading { generation }),
            other => Err(other.invalid("start a session")),
        }
    }

    /// `Loading → Active`, only for the generation that is loading
    pub fn activate(self, session_id: SessionId, generation: u64) -> Result<Self, InvalidTransition> {
        match self {
            SessionState::Loading { generation: loading } if loading == generation => {
                Ok(SessionState::Active { session_id, generation })
            }
            other => Err(other.invalid("bind a stale session")),
        }
    }

    /// `Loading → Idle` after a failed start of the same generation
    pub fn fail_start(self, generation: u64) -> Result<Self, InvalidTransition> {
        match self {
            SessionState::Loading { generation: loading } if loading == generation => {
                Ok(SessionState::Idle)
            }
            other => Err(other.invalid("abandon a start")),
        }
    }

    /// Drop whatever start is in flight: `Loading → Idle`, other states unchanged
    pub fn abandon_start(self) -> Self {
        match self {
            SessionState::Loading { .. } => SessionState::Idle,
            other => other,
        }
    }

    /// `Active → Ending`
    pub fn begin_end(self) -> Result<Self, InvalidTransition> {
        match self {
            SessionState::Active { session_id, generation } => {
                Ok(SessionState::Ending { session_id, generation })
            }
            other => Err(other.invalid("end a session")),
        }
    }

    /// `Ending → Idle`; the session id is dropped whatever the end call returned
    pub fn finish_end(self) -> Result<Self, InvalidTransition> {
        match self {
            SessionState::Ending { .. } => Ok(SessionState::Idle),
            other => Err(other.invalid("finish ending")),
        }
    }
}
