//! Scripted in-memory protocol client for tests.

use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{
    AuthInfo, Change, ChannelVolume, ClientInfo, Facility, Operation, ProtocolClient, ServerInfo,
    Sink, SinkRef, SinkState,
};
use crate::{
    address::Address,
    error::{Error, Result},
};

pub const BASE_VOLUME: u32 = 65536;

pub struct FakeClient {
    /// Number of connect attempts that fail before one succeeds. `None`
    /// fails forever.
    failures: Option<u32>,
    /// Time each connect attempt takes.
    latency: Duration,
    attempts: AtomicU32,
    pub addresses: Mutex<Vec<Address>>,

    pub server: ServerInfo,
    fail_server_info: bool,
    sinks: Mutex<Vec<Sink>>,

    pub client_names: Mutex<Vec<String>>,
    pub volume_calls: Mutex<Vec<(u32, u32)>>,
    pub sink_lookups: Mutex<Vec<SinkRef>>,
    changes: Mutex<Option<broadcast::Sender<Change>>>,
    subscriptions: AtomicU32,
}

pub fn sink(index: u32, name: &str, state: SinkState) -> Sink {
    Sink {
        index,
        name: name.to_owned(),
        description: format!("Sink {index}"),
        state,
        base_volume: BASE_VOLUME,
        channel_volume: ChannelVolume {
            volumes: vec![BASE_VOLUME / 2, BASE_VOLUME / 2],
        },
        mute: false,
    }
}

impl FakeClient {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            failures: Some(0),
            latency: Duration::ZERO,
            attempts: AtomicU32::new(0),
            addresses: Mutex::new(Vec::new()),
            server: ServerInfo {
                package_name: "pulseaudio".to_owned(),
                package_version: "16.1".to_owned(),
                user_name: "pulse".to_owned(),
                host_name: "audio".to_owned(),
                default_sink: "balena-sound.output".to_owned(),
                default_source: "balena-sound.input".to_owned(),
            },
            fail_server_info: false,
            sinks: Mutex::new(vec![
                sink(0, "alsa_output.builtin", SinkState::Suspended),
                sink(1, "balena-sound.output", SinkState::Idle),
                sink(2, "alsa_output.hdmi", SinkState::Idle),
            ]),
            client_names: Mutex::new(Vec::new()),
            volume_calls: Mutex::new(Vec::new()),
            sink_lookups: Mutex::new(Vec::new()),
            changes: Mutex::new(Some(changes)),
            subscriptions: AtomicU32::new(0),
        }
    }

    /// Fails the first `failures` connect attempts.
    pub fn failing(failures: u32) -> Self {
        Self {
            failures: Some(failures),
            ..Self::new()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            failures: None,
            ..Self::new()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_failing_server_info(mut self) -> Self {
        self.fail_server_info = true;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn subscriptions(&self) -> u32 {
        self.subscriptions.load(Ordering::SeqCst)
    }

    pub fn set_state(&self, index: u32, state: SinkState) {
        let mut sinks = self.sinks.lock().unwrap();
        if let Some(sink) = sinks.iter_mut().find(|sink| sink.index == index) {
            sink.state = state;
        }
    }

    pub fn set_base_volume(&self, index: u32, base_volume: u32) {
        let mut sinks = self.sinks.lock().unwrap();
        if let Some(sink) = sinks.iter_mut().find(|sink| sink.index == index) {
            sink.base_volume = base_volume;
        }
    }

    pub fn set_volumes(&self, index: u32, volumes: Vec<u32>) {
        let mut sinks = self.sinks.lock().unwrap();
        if let Some(sink) = sinks.iter_mut().find(|sink| sink.index == index) {
            sink.channel_volume.volumes = volumes;
        }
    }

    /// Announces a change to an object, as the server would after a
    /// subscribe.
    pub fn notify(&self, facility: Facility, index: u32) {
        self.announce(Change {
            facility,
            operation: Operation::Changed,
            index,
        });
    }

    /// Unplugs a sink and announces its removal.
    pub fn remove(&self, index: u32) {
        self.sinks.lock().unwrap().retain(|sink| sink.index != index);
        self.announce(Change {
            facility: Facility::Sink,
            operation: Operation::Removed,
            index,
        });
    }

    fn announce(&self, change: Change) {
        if let Some(changes) = self.changes.lock().unwrap().as_ref() {
            let _ = changes.send(change);
        }
    }

    /// Ends the change notification stream, as a server going away would.
    pub fn close(&self) {
        self.changes.lock().unwrap().take();
    }
}

#[async_trait]
impl ProtocolClient for FakeClient {
    async fn connect(&self, address: &Address) -> Result<AuthInfo> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.addresses.lock().unwrap().push(address.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.failures {
            Some(failures) if attempt > failures => Ok(AuthInfo {
                protocol_version: 35,
                shm: false,
            }),
            _ => Err(Error::unavailable(format!(
                "connection refused (attempt {attempt})"
            ))),
        }
    }

    async fn set_client_name(&self, name: &str) -> Result<ClientInfo> {
        self.client_names.lock().unwrap().push(name.to_owned());
        Ok(ClientInfo { index: 42 })
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        if self.fail_server_info {
            return Err(Error::aborted("connection reset by peer"));
        }
        Ok(self.server.clone())
    }

    async fn subscribe(&self) -> Result<broadcast::Receiver<Change>> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.changes
            .lock()
            .unwrap()
            .as_ref()
            .map(broadcast::Sender::subscribe)
            .ok_or_else(|| Error::unavailable("connection closed"))
    }

    async fn sink(&self, sink: &SinkRef) -> Result<Sink> {
        self.sink_lookups.lock().unwrap().push(sink.clone());
        let sinks = self.sinks.lock().unwrap();
        sinks
            .iter()
            .find(|candidate| match sink {
                SinkRef::Index(index) => candidate.index == *index,
                SinkRef::Name(name) => candidate.name == *name,
            })
            .cloned()
            .ok_or_else(|| Error::not_found(format!("no such sink: {sink}")))
    }

    async fn set_sink_volume(&self, index: u32, level: u32) -> Result<()> {
        self.volume_calls.lock().unwrap().push((index, level));
        let mut sinks = self.sinks.lock().unwrap();
        let sink = sinks
            .iter_mut()
            .find(|sink| sink.index == index)
            .ok_or_else(|| Error::not_found(format!("no such sink: #{index}")))?;
        for volume in &mut sink.channel_volume.volumes {
            *volume = level;
        }
        Ok(())
    }
}
