//! Playback session lifecycle

pub mod controller;
pub mod state;

pub use controller::SessionController;
pub use state::{InvalidTransition, SessionState};
