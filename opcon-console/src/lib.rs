//! opcon-console library
//!
//! Operator-facing side of the media console: the transport over the video
//! and audio elements, the session controller that turns operator actions
//! into tracked sessions and events, and the client for the aggregation
//! service.

pub mod client;
pub mod commands;
pub mod config;
pub mod context;
pub mod emitter;
pub mod error;
pub mod presentation;
pub mod session;
pub mod status;
pub mod transport;

pub use error::{Error, Result};
