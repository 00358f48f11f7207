use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of the authentication handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthInfo {
    /// Native protocol version negotiated with the server.
    pub protocol_version: u32,

    /// Whether the server offered shared-memory transport.
    pub shm: bool,
}

/// Server-side record of this client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientInfo {
    pub index: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerInfo {
    pub package_name: String,
    pub package_version: String,
    pub user_name: String,
    pub host_name: String,

    /// Name of the sink new streams play to.
    pub default_sink: String,

    /// Name of the source new recordings read from.
    pub default_source: String,
}

/// Per-channel raw volumes of a sink.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelVolume {
    pub volumes: Vec<u32>,
}

/// An audio output device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sink {
    pub index: u32,
    pub name: String,
    pub description: String,
    pub state: SinkState,

    /// Raw volume that corresponds to 100%.
    pub base_volume: u32,

    pub channel_volume: ChannelVolume,
    pub mute: bool,
}

/// Playback state of a sink.
///
/// Converts losslessly from and to the `i32` the server sends, including
/// values this crate does not know about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum SinkState {
    Unlinked,
    Init,
    #[default]
    Invalid,
    /// Streams are playing to the sink.
    Running,
    /// The sink is open but nothing plays.
    Idle,
    /// The sink was closed by the server, for example after idling.
    Suspended,
    Unknown(i32),
}

impl From<i32> for SinkState {
    fn from(state: i32) -> Self {
        match state {
            -3 => Self::Unlinked,
            -2 => Self::Init,
            -1 => Self::Invalid,
            0 => Self::Running,
            1 => Self::Idle,
            2 => Self::Suspended,
            other => Self::Unknown(other),
        }
    }
}

impl From<SinkState> for i32 {
    fn from(state: SinkState) -> Self {
        match state {
            SinkState::Unlinked => -3,
            SinkState::Init => -2,
            SinkState::Invalid => -1,
            SinkState::Running => 0,
            SinkState::Idle => 1,
            SinkState::Suspended => 2,
            SinkState::Unknown(other) => other,
        }
    }
}

impl fmt::Display for SinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlinked => write!(f, "unlinked"),
            Self::Init => write!(f, "init"),
            Self::Invalid => write!(f, "invalid"),
            Self::Running => write!(f, "running"),
            Self::Idle => write!(f, "idle"),
            Self::Suspended => write!(f, "suspended"),
            Self::Unknown(state) => write!(f, "unknown ({state})"),
        }
    }
}

/// Reference to a sink by index or by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SinkRef {
    Index(u32),
    Name(String),
}

impl From<u32> for SinkRef {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for SinkRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for SinkRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&Sink> for SinkRef {
    fn from(sink: &Sink) -> Self {
        Self::Index(sink.index)
    }
}

impl fmt::Display for SinkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{index}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}
