//! Media element contract and its simulated implementation
//!
//! A media element is one physical player: it holds a source, a paused
//! flag, a playhead, a rate and a volume, and it can be shown or hidden.
//! [`SimulatedElement`] runs on a virtual clock so the console and the tests
//! can drive playback deterministically through [`MediaElement::advance`].

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Result of advancing an element's clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Element is paused or has no source; nothing moved
    Idle,
    /// Playhead moved forward
    Progressed,
    /// Playhead reached the end during this advance
    Ended,
}

/// One physical player
#[async_trait]
pub trait MediaElement: Send {
    /// Assign a new source. Resets the playhead to 0 and pauses; never plays.
    ///
    /// `duration` is the declared length in seconds (non-positive when unknown).
    fn load(&mut self, source: &str, duration: f64);

    fn source(&self) -> Option<&str>;

    /// Start playback; resolves once the element is actually playing
    async fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Length in seconds; NaN while unknown
    fn duration(&self) -> f64;

    fn rate(&self) -> f64;

    fn set_rate(&mut self, rate: f64);

    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Let `dt` seconds of wall time pass
    fn advance(&mut self, dt: f64) -> Advance;
}

/// Virtual-clock media element
#[derive(Debug, Clone)]
pub struct SimulatedElement {
    source: Option<String>,
    paused: bool,
    current_time: f64,
    duration: f64,
    rate: f64,
    volume: f64,
    visible: bool,
    autoplay_blocked: bool,
}

impl Default for SimulatedElement {
    fn default() -> Self {
        Self {
            source: None,
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            rate: 1.0,
            volume: 1.0,
            visible: false,
            autoplay_blocked: false,
        }
    }
}

impl SimulatedElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `play()` fail, as a browser does when autoplay is denied
    pub fn set_autoplay_blocked(&mut self, blocked: bool) {
        self.autoplay_blocked = blocked;
    }

    fn at_end(&self) -> bool {
        self.duration.is_finite() && self.current_time >= self.duration
    }
}

#[async_trait]
impl MediaElement for SimulatedElement {
    fn load(&mut self, source: &str, duration: f64) {
        self.source = Some(source.to_string());
        self.paused = true;
        self.current_time = 0.0;
        self.duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            f64::NAN
        };
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    async fn play(&mut self) -> Result<()> {
        if self.source.is_none() {
            return Err(Error::Playback("No media source loaded.".to_string()));
        }
        if self.autoplay_blocked {
            return Err(Error::Playback("Playback was blocked by the player.".to_string()));
        }
        // Playing a finished element starts it over
        if self.at_end() {
            self.current_time = 0.0;
        }
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.current_time = if self.duration.is_finite() {
            seconds.min(self.duration)
        } else {
            seconds
        };
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn advance(&mut self, dt: f64) -> Advance {
        if self.paused || self.source.is_none() || !dt.is_finite() || dt <= 0.0 {
            return Advance::Idle;
        }

        self.current_time += dt * self.rate;
        if self.duration.is_finite() && self.current_time >= self.duration {
            self.current_time = self.duration;
            self.paused = true;
            return Advance::Ended;
        }
        Advance::Progressed
    }
}
