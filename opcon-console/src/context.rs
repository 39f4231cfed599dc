//! Operator context owned by the session controller
//!
//! Starts empty, gets its operator from registration and has its media and
//! session replaced by every load. Nothing outside the controller mutates it.

use opcon_common::models::{MediaItem, Operator, SessionId};

use crate::session::SessionState;

#[derive(Debug, Clone, Default)]
pub struct OperatorContext {
    operator: Option<Operator>,
    media: Option<MediaItem>,
    session: SessionState,
}

impl OperatorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    pub fn operator_id(&self) -> Option<i64> {
        self.operator.as_ref().map(|o| o.operator_id)
    }

    pub(crate) fn set_operator(&mut self, operator: Operator) {
        self.operator = Some(operator);
    }

    pub fn media(&self) -> Option<&MediaItem> {
        self.media.as_ref()
    }

    pub(crate) fn set_media(&mut self, item: MediaItem) {
        self.media = Some(item);
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub(crate) fn set_session(&mut self, state: SessionState) {
        self.session = state;
    }

    /// Session events may currently be dispatched against
    pub fn active_session(&self) -> Option<SessionId> {
        self.session.active_session()
    }
}
