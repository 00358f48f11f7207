//! The sound server protocol as seen by a session.
//!
//! Speaking the PulseAudio native protocol (framing, authentication
//! cookies, tag structures) is the job of a protocol client. This module
//! defines the capabilities a session needs from such a client as the
//! [`ProtocolClient`] trait, along with the data it hands back.
//!
//! # Change Notifications
//!
//! After [`ProtocolClient::subscribe`] the server reports every change to
//! its objects as a [`Change`]. A change only identifies the object; its
//! new state has to be fetched separately.

mod types;

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;

use async_trait::async_trait;
use tokio::sync::broadcast;

pub use types::{AuthInfo, ChannelVolume, ClientInfo, ServerInfo, Sink, SinkRef, SinkState};

use crate::{address::Address, error::Result};

/// Capabilities a session needs from a sound server protocol client.
///
/// Implementations own the socket. All methods take `&self` so that a
/// client can be shared between the session and its notification task.
#[async_trait]
pub trait ProtocolClient: Send + Sync {
    /// Opens a connection to the server at `address` and performs the
    /// authentication handshake.
    async fn connect(&self, address: &Address) -> Result<AuthInfo>;

    /// Advertises `name` as this client's name.
    async fn set_client_name(&self, name: &str) -> Result<ClientInfo>;

    async fn server_info(&self) -> Result<ServerInfo>;

    /// Enables change notifications and returns a receiver for them.
    async fn subscribe(&self) -> Result<broadcast::Receiver<Change>>;

    /// Fetches the current state of a sink.
    async fn sink(&self, sink: &SinkRef) -> Result<Sink>;

    /// Sets all channels of the sink at `index` to the raw volume `level`.
    async fn set_sink_volume(&self, index: u32, level: u32) -> Result<()>;
}

/// Notification that an object on the server changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Change {
    pub facility: Facility,
    pub operation: Operation,

    /// Index of the object within its facility.
    pub index: u32,
}

/// Kind of server object a [`Change`] is about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Facility {
    Sink,
    Source,
    SinkInput,
    SourceOutput,
    Module,
    Client,
    SampleCache,
    Server,
    Card,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    New,
    Changed,
    Removed,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} #{} {:?}", self.facility, self.index, self.operation)
    }
}
