//! Kind-agnostic transport over the video and audio elements
//!
//! Exactly one element is active at a time, chosen by the loaded item's
//! kind. The inactive one is always paused and hidden. Progress and
//! completion are published to subscribers in the order they happen.

use opcon_common::events::SeekTarget;
use opcon_common::models::{MediaItem, MediaKind};
use tokio::sync::mpsc;
use tracing::debug;

use super::element::{Advance, MediaElement, SimulatedElement};
use crate::error::{Error, Result};

/// Fastest playback rate accepted
pub const MAX_RATE: f64 = 16.0;

/// Notification published by the adapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportSignal {
    /// Playhead moved (playback, seek, stop or load)
    Progress { position: f64, duration: f64 },
    /// Natural completion; published once per completion
    Ended,
}

/// Transport over a pair of media elements
pub struct TransportAdapter {
    video: Box<dyn MediaElement>,
    audio: Box<dyn MediaElement>,
    active: MediaKind,
    subscribers: Vec<mpsc::UnboundedSender<TransportSignal>>,
}

impl TransportAdapter {
    /// Video element starts out active and visible
    pub fn new(video: Box<dyn MediaElement>, audio: Box<dyn MediaElement>) -> Self {
        let mut adapter = Self {
            video,
            audio,
            active: MediaKind::Video,
            subscribers: Vec::new(),
        };
        adapter.video.set_visible(true);
        adapter.audio.set_visible(false);
        adapter
    }

    /// Adapter over two simulated elements
    pub fn simulated() -> Self {
        Self::new(Box::new(SimulatedElement::new()), Box::new(SimulatedElement::new()))
    }

    /// Receive every signal published from now on
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TransportSignal> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self, signal: TransportSignal) {
        // Drop subscribers whose receiver is gone
        self.subscribers.retain(|tx| tx.send(signal).is_ok());
    }

    fn publish_progress(&mut self) {
        let signal = TransportSignal::Progress {
            position: self.position(),
            duration: self.duration(),
        };
        self.publish(signal);
    }

    fn element(&self, kind: MediaKind) -> &dyn MediaElement {
        match kind {
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Audio => self.audio.as_ref(),
        }
    }

    fn element_mut(&mut self, kind: MediaKind) -> &mut dyn MediaElement {
        match kind {
            MediaKind::Video => self.video.as_mut(),
            MediaKind::Audio => self.audio.as_mut(),
        }
    }

    fn active(&self) -> &dyn MediaElement {
        self.element(self.active)
    }

    fn active_mut(&mut self) -> &mut dyn MediaElement {
        self.element_mut(self.active)
    }

    pub fn active_kind(&self) -> MediaKind {
        self.active
    }

    pub fn is_visible(&self, kind: MediaKind) -> bool {
        self.element(kind).is_visible()
    }

    pub fn is_paused_element(&self, kind: MediaKind) -> bool {
        self.element(kind).is_paused()
    }

    /// Switch to the item's element and assign its source, at position 0
    pub fn load(&mut self, item: &MediaItem) {
        let other = match item.kind {
            MediaKind::Video => MediaKind::Audio,
            MediaKind::Audio => MediaKind::Video,
        };
        {
            let inactive = self.element_mut(other);
            inactive.pause();
            inactive.set_visible(false);
        }

        self.active = item.kind;
        let element = self.active_mut();
        element.load(&item.source_url, item.duration_seconds as f64);
        element.set_visible(true);

        debug!(media_id = item.id, kind = %item.kind, "Transport loaded");
        self.publish_progress();
    }

    pub fn has_source(&self) -> bool {
        self.active().source().is_some()
    }

    /// Start the active element; fails with `Playback` when it refuses
    pub async fn play(&mut self) -> Result<()> {
        self.active_mut().play().await
    }

    pub fn pause(&mut self) {
        self.active_mut().pause();
    }

    /// Pause and rewind to 0
    pub fn stop(&mut self) {
        let element = self.active_mut();
        element.pause();
        element.set_current_time(0.0);
        self.publish_progress();
    }

    /// Move the playhead; returns the resulting position
    pub fn seek(&mut self, target: SeekTarget) -> f64 {
        let current = self.position();
        let requested = match target {
            SeekTarget::Delta(delta) => current + delta,
            SeekTarget::Absolute(seconds) => seconds,
        };
        self.active_mut().set_current_time(requested);
        self.publish_progress();
        self.position()
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 || rate > MAX_RATE {
            return Err(Error::Validation(format!(
                "Playback rate must be greater than 0 and at most {}.",
                MAX_RATE
            )));
        }
        self.active_mut().set_rate(rate);
        Ok(())
    }

    /// Set volume, clamped to 0..=1; returns the applied value
    pub fn set_volume(&mut self, volume: f64) -> Result<f64> {
        if !volume.is_finite() {
            return Err(Error::Validation("Volume must be a number between 0 and 1.".to_string()));
        }
        let element = self.active_mut();
        element.set_volume(volume);
        Ok(element.volume())
    }

    /// Current playhead, never negative
    pub fn position(&self) -> f64 {
        let position = self.active().current_time();
        if position.is_finite() {
            position.max(0.0)
        } else {
            0.0
        }
    }

    pub fn duration(&self) -> f64 {
        self.active().duration()
    }

    pub fn is_paused(&self) -> bool {
        self.active().is_paused()
    }

    pub fn rate(&self) -> f64 {
        self.active().rate()
    }

    pub fn volume(&self) -> f64 {
        self.active().volume()
    }

    /// Advance the virtual clock and publish what happened
    pub fn tick(&mut self, dt: f64) {
        match self.active_mut().advance(dt) {
            Advance::Idle => {}
            Advance::Progressed => self.publish_progress(),
            Advance::Ended => {
                self.publish_progress();
                self.publish(TransportSignal::Ended);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, kind: MediaKind, duration_seconds: i64) -> MediaItem {
        MediaItem {
            id,
            title: format!("Item {}", id),
            kind,
            genre: "General".to_string(),
            duration_seconds,
            source_url: format!("memory://{}", id),
            created_at: None,
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TransportSignal>) -> Vec<TransportSignal> {
        let mut signals = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            signals.push(signal);
        }
        signals
    }

    #[tokio::test]
    async fn test_load_switches_active_element() {
        let mut adapter = TransportAdapter::simulated();
        adapter.load(&item(1, MediaKind::Video, 20));
        adapter.play().await.unwrap();

        adapter.load(&item(2, MediaKind::Audio, 10));
        assert_eq!(adapter.active_kind(), MediaKind::Audio);
        assert!(adapter.is_visible(MediaKind::Audio));
        assert!(!adapter.is_visible(MediaKind::Video));
        assert!(adapter.is_paused_element(MediaKind::Video));
        // Loading never plays
        assert!(adapter.is_paused());
        assert_eq!(adapter.position(), 0.0);
    }

    #[tokio::test]
    async fn test_stop_rewinds() {
        let mut adapter = TransportAdapter::simulated();
        adapter.load(&item(1, MediaKind::Video, 20));
        adapter.play().await.unwrap();
        adapter.tick(4.0);
        assert_eq!(adapter.position(), 4.0);

        adapter.stop();
        assert!(adapter.is_paused());
        assert_eq!(adapter.position(), 0.0);
    }

    #[test]
    fn test_seek_clamps_at_zero() {
        let mut adapter = TransportAdapter::simulated();
        adapter.load(&item(1, MediaKind::Audio, 60));
        assert_eq!(adapter.seek(SeekTarget::Delta(10.0)), 10.0);
        assert_eq!(adapter.seek(SeekTarget::Delta(-25.0)), 0.0);
        assert_eq!(adapter.seek(SeekTarget::Absolute(45.0)), 45.0);
    }

    #[test]
    fn test_rate_and_volume_validation() {
        let mut adapter = TransportAdapter::simulated();
        assert!(adapter.set_rate(0.0).is_err());
        assert!(adapter.set_rate(f64::NAN).is_err());
        adapter.set_rate(1.5).unwrap();
        assert_eq!(adapter.rate(), 1.5);

        assert_eq!(adapter.set_volume(1.7).unwrap(), 1.0);
        assert_eq!(adapter.set_volume(-1.0).unwrap(), 0.0);
        assert!(adapter.set_volume(f64::INFINITY).is_err());
    }

    #[tokio::test]
    async fn test_signals_in_order_with_single_end() {
        let mut adapter = TransportAdapter::simulated();
        let mut rx = adapter.subscribe();
        adapter.load(&item(1, MediaKind::Video, 2));
        adapter.play().await.unwrap();
        adapter.tick(1.0);
        adapter.tick(1.0);
        adapter.tick(1.0);

        let signals = drain(&mut rx);
        assert_eq!(
            signals,
            vec![
                TransportSignal::Progress { position: 0.0, duration: 2.0 },
                TransportSignal::Progress { position: 1.0, duration: 2.0 },
                TransportSignal::Progress { position: 2.0, duration: 2.0 },
                TransportSignal::Ended,
            ]
        );
    }

    #[tokio::test]
    async fn test_play_failure_propagates() {
        let mut adapter = TransportAdapter::simulated();
        assert!(matches!(adapter.play().await, Err(Error::Playback(_))));
    }
}
