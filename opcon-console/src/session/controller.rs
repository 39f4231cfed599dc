//! Session controller
//!
//! Ties the transport to the server-tracked session. Every operator action
//! goes through here: the transport is mutated first, then the matching
//! event is emitted against the active session (if any). Session boundaries
//! (load, stop, natural end) drive the start and end calls.
//!
//! Ordering rules:
//! - a load ends the previous session and waits for that end before the
//!   next start is sent
//! - each session's events are queued before its end call
//! - only a natural end reports `completed = true`

use opcon_common::events::{SeekTarget, SessionEvent};
use opcon_common::models::{MediaItem, MediaKind, Operator, SessionId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::state::SessionState;
use crate::client::AggregationService;
use crate::context::OperatorContext;
use crate::emitter::{EventEmitter, PendingEnd};
use crate::error::{Error, Result};
use crate::presentation::{Dashboard, ProgressView};
use crate::status::StatusLine;
use crate::transport::{TransportAdapter, TransportSignal};

/// Seconds skipped by back/forward
pub const SKIP_SECONDS: f64 = 10.0;

/// Default history page size
pub const DEFAULT_HISTORY_LIMIT: i64 = 8;

pub struct SessionController {
    context: OperatorContext,
    transport: TransportAdapter,
    signals: mpsc::UnboundedReceiver<TransportSignal>,
    emitter: EventEmitter,
    service: Arc<dyn AggregationService>,
    /// Bumped on every tracked load; tags start calls
    generation: u64,
    status: StatusLine,
    progress: ProgressView,
    dashboard: Dashboard,
    history_limit: i64,
}

impl SessionController {
    /// Create a controller. Spawns the event dispatcher, so it must be called
    /// inside a Tokio runtime.
    pub fn new(service: Arc<dyn AggregationService>, mut transport: TransportAdapter) -> Self {
        let signals = transport.subscribe();
        let emitter = EventEmitter::spawn(Arc::clone(&service));

        Self {
            context: OperatorContext::new(),
            transport,
            signals,
            emitter,
            service,
            generation: 0,
            status: StatusLine::default(),
            progress: ProgressView::default(),
            dashboard: Dashboard::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, history_limit: i64) -> Self {
        self.history_limit = history_limit.max(1);
        self
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn context(&self) -> &OperatorContext {
        &self.context
    }

    pub fn session_state(&self) -> SessionState {
        self.context.session()
    }

    pub fn transport(&self) -> &TransportAdapter {
        &self.transport
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn progress(&self) -> &ProgressView {
        &self.progress
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Events delivered / dropped so far
    pub fn event_counts(&self) -> (u64, u64) {
        (self.emitter.delivered(), self.emitter.failed())
    }

    /// Wait until every queued event has reached the service (or failed)
    pub async fn flush_events(&self) {
        self.emitter.flush().await;
    }

    fn fail<T>(&mut self, e: Error) -> Result<T> {
        self.status.error(e.to_string());
        Err(e)
    }

    // ========================================
    // Operator
    // ========================================

    /// Register the operator for subsequent loads.
    ///
    /// A session already running stays attributed to the operator it was
    /// started for.
    pub async fn register_operator(&mut self, name: &str, dni: &str) -> Result<Operator> {
        let name = name.trim();
        let dni = dni.trim();
        if name.is_empty() || dni.is_empty() {
            return self.fail(Error::Validation("Name and DNI are required.".to_string()));
        }

        let operator = match self.service.register_operator(name, dni).await {
            Ok(operator) => operator,
            Err(e) => {
                error!(error = %e, "Operator registration failed");
                return self.fail(e);
            }
        };

        info!(operator_id = operator.operator_id, name = %operator.name, "Operator registered");
        self.status
            .info(format!("Active operator: {} ({})", operator.name, operator.dni));
        self.context.set_operator(operator.clone());
        self.refresh_all().await;
        Ok(operator)
    }

    // ========================================
    // Session boundaries
    // ========================================

    /// Load an item into the transport, ending the current session first.
    ///
    /// With an operator registered a new session is started; returns its id.
    /// Without one the item plays untracked and `None` is returned. A failed
    /// start leaves the item loaded and playable, untracked.
    pub async fn load_media(&mut self, item: MediaItem) -> Result<Option<SessionId>> {
        let last_position = self.transport.position();
        if let Some(pending) = self.issue_end(last_position, false) {
            self.await_end(pending).await;
        }

        self.transport.load(&item);
        self.drain_signals();
        self.context.set_media(item.clone());

        let Some(operator_id) = self.context.operator_id() else {
            info!(media_id = item.id, "Media loaded without operator, not tracked");
            self.status.info(format!(
                "Loaded: {} [{}] (preview, not tracked)",
                item.title, item.kind
            ));
            return Ok(None);
        };

        self.generation += 1;
        let generation = self.generation;
        let loading = match self.context.session().begin_start(generation) {
            Ok(state) => state,
            Err(e) => return self.fail(Error::Service(e.to_string())),
        };
        self.context.set_session(loading);

        match self.service.start_session(operator_id, item.id).await {
            Ok(session_id) => match self.context.session().activate(session_id, generation) {
                Ok(active) => {
                    self.context.set_session(active);
                    info!(session_id = %session_id, operator_id, media_id = item.id, "Session started");
                    self.emit(SessionEvent::Load {
                        title: item.title.clone(),
                        kind: item.kind,
                    });
                    self.status.info(format!("Loaded: {} [{}]", item.title, item.kind));
                    self.refresh_stats_quietly().await;
                    Ok(Some(session_id))
                }
                Err(e) => {
                    warn!(session_id = %session_id, generation, error = %e, "Ignoring stale start response");
                    let idle = self.context.session().abandon_start();
                    self.context.set_session(idle);
                    Ok(None)
                }
            },
            Err(e) => {
                if let Ok(idle) = self.context.session().fail_start(generation) {
                    self.context.set_session(idle);
                }
                error!(operator_id, media_id = item.id, error = %e, "Session start failed");
                self.fail(e)
            }
        }
    }

    /// Load by catalog id, listing the catalog first if the id is not known yet
    pub async fn load_media_by_id(&mut self, media_id: i64) -> Result<Option<SessionId>> {
        if self.dashboard.library_item(media_id).is_none() {
            if let Err(e) = self.refresh_library(None).await {
                return self.fail(e);
            }
        }
        match self.dashboard.library_item(media_id).cloned() {
            Some(item) => self.load_media(item).await,
            None => self.fail(Error::NotFound(format!("Media item {} not found.", media_id))),
        }
    }

    /// Mark the active session `Ending` and queue its end call
    fn issue_end(&mut self, last_position: f64, completed: bool) -> Option<PendingEnd> {
        let state = self.context.session();
        let session_id = state.active_session()?;
        let ending = state.begin_end().ok()?;
        self.context.set_session(ending);

        info!(session_id = %session_id, last_position, completed, "Ending session");
        Some(self.emitter.end(session_id, last_position, completed))
    }

    /// Wait for a queued end; the session is dropped locally either way
    async fn await_end(&mut self, pending: PendingEnd) {
        if let Err(e) = pending.wait().await {
            debug!(error = %e, "End call failed, clearing session anyway");
        }
        let idle = self.context.session().finish_end().unwrap_or_default();
        self.context.set_session(idle);
    }

    // ========================================
    // Transport actions
    // ========================================

    fn emit(&self, event: SessionEvent) -> bool {
        let position = self.transport.position();
        self.emitter.emit(self.context.session(), &event, position)
    }

    /// Start playback. A refused start is surfaced and records no event.
    pub async fn play(&mut self) -> Result<()> {
        if self.context.media().is_none() {
            return self.fail(Error::Playback("Load a library item first.".to_string()));
        }
        if let Err(e) = self.transport.play().await {
            error!(error = %e, "Playback failed to start");
            return self.fail(e);
        }

        self.emit(SessionEvent::Play {
            rate: self.transport.rate(),
            volume: self.transport.volume(),
        });
        self.status.info("Playing");
        Ok(())
    }

    pub fn pause(&mut self) {
        self.transport.pause();
        self.emit(SessionEvent::Pause);
        self.status.info("Paused");
    }

    /// Pause, rewind and end the session as not completed
    pub async fn stop(&mut self) {
        self.transport.stop();
        self.drain_signals();
        self.emit(SessionEvent::Stop);

        let pending = self.issue_end(self.transport.position(), false);
        // Progress is zeroed once the end is issued, not when it returns
        self.progress.reset();
        self.status.info("Stopped");

        if let Some(pending) = pending {
            self.await_end(pending).await;
            self.refresh_all().await;
        }
    }

    /// Skip relative to the playhead; returns the new position
    pub fn seek_by(&mut self, delta: f64) -> Result<f64> {
        if !delta.is_finite() {
            return self.fail(Error::Validation("Seek offset must be a number.".to_string()));
        }
        let position = self.transport.seek(SeekTarget::Delta(delta));
        self.drain_signals();
        self.emit(SessionEvent::Seek(SeekTarget::Delta(delta)));
        self.status.info(format!("Position {}", self.progress.label()));
        Ok(position)
    }

    /// Jump to a percentage of the known duration; returns the new position
    pub fn seek_to_percent(&mut self, percent: f64) -> Result<f64> {
        if !percent.is_finite() {
            return self.fail(Error::Validation("Seek percentage must be a number.".to_string()));
        }
        let duration = self.transport.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return self.fail(Error::Validation(
                "Duration unknown, cannot seek by percentage.".to_string(),
            ));
        }

        let target = duration * percent.clamp(0.0, 100.0) / 100.0;
        let position = self.transport.seek(SeekTarget::Absolute(target));
        self.drain_signals();
        self.emit(SessionEvent::Seek(SeekTarget::Absolute(position)));
        self.status.info(format!("Position {}", self.progress.label()));
        Ok(position)
    }

    pub fn set_speed(&mut self, rate: f64) -> Result<()> {
        if let Err(e) = self.transport.set_rate(rate) {
            return self.fail(e);
        }
        self.emit(SessionEvent::Speed { value: rate });
        self.status.info(format!("Speed {}x", rate));
        Ok(())
    }

    /// Returns the applied (clamped) volume
    pub fn set_volume(&mut self, volume: f64) -> Result<f64> {
        let applied = match self.transport.set_volume(volume) {
            Ok(applied) => applied,
            Err(e) => return self.fail(e),
        };
        self.emit(SessionEvent::Volume { value: applied });
        self.status.info(format!("Volume {:.0}%", applied * 100.0));
        Ok(applied)
    }

    /// Advance the transport clock by `dt` seconds and react to its signals
    pub async fn tick(&mut self, dt: f64) {
        self.transport.tick(dt);
        if self.drain_signals() {
            self.handle_natural_end().await;
        }
    }

    /// Apply pending transport signals; true if a natural end was among them
    fn drain_signals(&mut self) -> bool {
        let mut ended = false;
        while let Ok(signal) = self.signals.try_recv() {
            match signal {
                TransportSignal::Progress { position, duration } => {
                    self.progress.update(position, duration);
                }
                TransportSignal::Ended => ended = true,
            }
        }
        ended
    }

    async fn handle_natural_end(&mut self) {
        if self.context.active_session().is_none() {
            self.status.info("Playback completed (not tracked)");
            return;
        }

        let position = self.transport.position();
        self.emit(SessionEvent::Ended);
        if let Some(pending) = self.issue_end(position, true) {
            self.await_end(pending).await;
        }
        self.status.info("Playback completed");
        self.refresh_all().await;
    }

    // ========================================
    // Projections
    // ========================================

    /// Re-fetch stats, leaderboard and history after queued events land.
    /// Failures leave the affected view empty.
    pub async fn refresh_all(&mut self) {
        if let Err(e) = self.refresh_stats().await {
            warn!(error = %e, "Stats refresh failed");
        }
        if let Err(e) = self.refresh_leaderboard().await {
            warn!(error = %e, "Leaderboard refresh failed");
        }
        if let Err(e) = self.refresh_history().await {
            warn!(error = %e, "History refresh failed");
        }
    }

    async fn refresh_stats_quietly(&mut self) {
        if let Err(e) = self.refresh_stats().await {
            warn!(error = %e, "Stats refresh failed");
        }
    }

    pub async fn refresh_stats(&mut self) -> Result<()> {
        self.emitter.flush().await;
        self.dashboard.stats = None;
        self.dashboard.stats = Some(self.service.fetch_stats().await?);
        Ok(())
    }

    pub async fn refresh_leaderboard(&mut self) -> Result<()> {
        self.emitter.flush().await;
        self.dashboard.leaders = None;
        self.dashboard.leaders = Some(self.service.fetch_leaderboard().await?);
        Ok(())
    }

    /// History stays `None` while no operator is registered
    pub async fn refresh_history(&mut self) -> Result<()> {
        self.dashboard.history = None;
        let Some(operator_id) = self.context.operator_id() else {
            return Ok(());
        };
        self.emitter.flush().await;
        self.dashboard.history = Some(
            self.service
                .fetch_history(operator_id, self.history_limit)
                .await?,
        );
        Ok(())
    }

    pub async fn refresh_library(&mut self, kind: Option<MediaKind>) -> Result<()> {
        self.dashboard.library = None;
        self.dashboard.library = Some(self.service.fetch_media(kind).await?);
        Ok(())
    }

    // ========================================
    // Catalog
    // ========================================

    /// Add a catalog entry, then refresh the library and stats.
    /// Returns the new media id.
    pub async fn add_media(
        &mut self,
        title: &str,
        kind: MediaKind,
        source_url: &str,
        duration_seconds: i64,
        genre: Option<&str>,
    ) -> Result<i64> {
        let title = title.trim();
        let source_url = source_url.trim();
        if title.is_empty() || source_url.is_empty() {
            return self.fail(Error::Validation("Title and URL are required.".to_string()));
        }
        if duration_seconds < 0 {
            return self.fail(Error::Validation("Duration cannot be negative.".to_string()));
        }
        let genre = genre.map(str::trim).filter(|g| !g.is_empty());

        let media_id = match self
            .service
            .add_media(title, kind, source_url, duration_seconds, genre)
            .await
        {
            Ok(media_id) => media_id,
            Err(e) => {
                error!(error = %e, "Adding media failed");
                return self.fail(e);
            }
        };

        info!(media_id, title, kind = %kind, "Media added");
        self.status.info(format!("Added: {} (#{})", title, media_id));
        if let Err(e) = self.refresh_library(None).await {
            warn!(error = %e, "Library refresh failed");
        }
        self.refresh_stats_quietly().await;
        Ok(media_id)
    }

    /// Ask the service for demo data, then refresh everything
    pub async fn seed_demo(&mut self) -> Result<String> {
        let message = match self.service.seed_demo().await {
            Ok(message) => message,
            Err(e) => return self.fail(e),
        };
        info!("Demo data requested");
        self.status.info(message.clone());
        self.refresh_all().await;
        if let Err(e) = self.refresh_library(None).await {
            warn!(error = %e, "Library refresh failed");
        }
        Ok(message)
    }

    /// End any open session (not completed) and drain the event queue
    pub async fn shutdown(mut self) {
        let last_position = self.transport.position();
        if let Some(pending) = self.issue_end(last_position, false) {
            self.await_end(pending).await;
        }
        self.emitter.shutdown().await;
        info!("Session controller stopped");
    }
}
