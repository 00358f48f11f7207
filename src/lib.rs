//! Resilient sessions with a PulseAudio sound server.
//!
//! audio-block connects to a sound server that may still be booting, keeps
//! trying until it answers, and then offers volume control in percent and
//! a stream of play/stop events for its sinks.
//!
//! Speaking the native protocol is left to an implementation of
//! [`protocol::ProtocolClient`].
//!
//! # Modules
//!
//! * [`session`] - session setup and playback events
//! * [`connection`] - connecting with retries
//! * [`volume`] - volume in percent
//! * [`events`] - play/stop events
//! * [`config`] and [`address`] - configuration
//! * [`error`] - error types
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod address;
pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod protocol;
pub mod session;
pub mod volume;

pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use events::Event;
pub use session::{Session, SessionInfo};
