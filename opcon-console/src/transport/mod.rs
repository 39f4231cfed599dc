//! Media transport
//!
//! [`MediaElement`] is the contract of one physical player;
//! [`TransportAdapter`] puts a video and an audio element behind a single
//! transport that picks the element by media kind.

pub mod adapter;
pub mod element;

pub use adapter::{TransportAdapter, TransportSignal};
pub use element::{Advance, MediaElement, SimulatedElement};
