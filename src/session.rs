//! Sessions with a sound server.
//!
//! A [`Session`] connects to the sound server, announces itself, learns the
//! default sink and, if configured, watches sinks for playback changes.
//!
//! # Events
//!
//! Every change notification for a sink makes the session fetch that sink
//! and translate its state into an [`Event`]. Notifications are handled
//! concurrently, so events for different sinks may arrive in any order.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use audio_block::{config::Config, events::Event, session::Session};
//!
//! let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! let mut session = Session::new(Arc::new(client), Config::default());
//! session.register(event_tx);
//!
//! let info = session.listen().await?;
//! println!("connected to {}", info.server.host_name);
//!
//! while let Some(event) = event_rx.recv().await {
//!     match event {
//!         Event::Play(sink) => session.set_volume(75.0, Some(sink.index.into())).await?,
//!         Event::Stop(_) => {}
//!     }
//! }
//! ```

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::{
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};

use crate::{
    config::Config,
    connection::ConnectionManager,
    error::{Error, Result},
    events::{Event, EventSender},
    protocol::{
        AuthInfo, Change, ClientInfo, Facility, Operation, ProtocolClient, ServerInfo, SinkRef,
    },
};

/// What the sound server told us while setting up a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionInfo {
    pub client: ClientInfo,
    pub protocol: AuthInfo,
    pub server: ServerInfo,
}

pub struct Session<C> {
    connection: ConnectionManager<C>,
    config: Config,

    /// Sink name as reported by the server when the session was set up.
    default_sink: Option<String>,

    event_tx: Option<EventSender>,
    watcher: Option<JoinHandle<()>>,
}

impl<C> Session<C>
where
    C: ProtocolClient + 'static,
{
    #[must_use]
    pub fn new(client: Arc<C>, config: Config) -> Self {
        let connection = ConnectionManager::new(client, config.address.clone(), config.retry);
        Self {
            connection,
            config,
            default_sink: None,
            event_tx: None,
            watcher: None,
        }
    }

    /// Replaces the default logging of failed connect attempts.
    #[must_use]
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(u32, &Error) + Send + Sync + 'static,
    {
        self.connection.set_hook(hook);
        self
    }

    /// Registers a channel to receive playback events.
    ///
    /// Must be called before [`listen`](Self::listen) for events to be
    /// delivered.
    pub fn register(&mut self, event_tx: EventSender) {
        self.event_tx = Some(event_tx);
    }

    /// Connects to the sound server and sets up the session.
    ///
    /// Retries connecting as configured. Once connected, advertises the
    /// client name, fetches the server info and, if subscribing is
    /// enabled, starts watching sinks for playback changes.
    ///
    /// # Errors
    ///
    /// Returns a `DeadlineExceeded` error if the server could not be
    /// reached in time. Errors from the protocol client after connecting
    /// are returned unchanged. The session then stays connected but is
    /// only partially set up.
    pub async fn listen(&mut self) -> Result<SessionInfo> {
        let protocol = self.connection.connect_with_retry().await?;
        let client = Arc::clone(self.connection.client());

        let client_info = client.set_client_name(&self.config.client_name).await?;
        debug!(
            "registered as \"{}\" (client #{})",
            self.config.client_name, client_info.index
        );

        let server = client.server_info().await?;
        debug!(
            "server: {} {} on {}; default sink: {}",
            server.package_name, server.package_version, server.host_name, server.default_sink
        );
        self.default_sink = Some(server.default_sink.clone());

        if self.config.subscribe {
            let changes = client.subscribe().await?;
            let watcher = tokio::spawn(watch(client, changes, self.event_tx.clone()));
            if let Some(previous) = self.watcher.replace(watcher) {
                previous.abort();
            }
            debug!("watching sinks for playback changes");
        }

        Ok(SessionInfo {
            client: client_info,
            protocol,
            server,
        })
    }

    /// Fetches fresh information about the server.
    ///
    /// # Errors
    ///
    /// Returns a `FailedPrecondition` error if not connected, or the error
    /// of the protocol client.
    pub async fn info(&self) -> Result<ServerInfo> {
        self.connection.check_connected()?;
        self.connection.client().server_info().await
    }

    /// The default sink as of session setup.
    ///
    /// The server may have changed its default since.
    #[must_use]
    pub fn default_sink(&self) -> Option<&str> {
        self.default_sink.as_deref()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn connection(&self) -> &ConnectionManager<C> {
        &self.connection
    }
}

impl<C> Drop for Session<C> {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

impl<C> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connection", &self.connection)
            .field("config", &self.config)
            .field("default_sink", &self.default_sink)
            .field("watching", &self.watcher.is_some())
            .finish_non_exhaustive()
    }
}

/// Handles change notifications until the server stops sending them.
async fn watch<C>(
    client: Arc<C>,
    mut changes: broadcast::Receiver<Change>,
    event_tx: Option<EventSender>,
) where
    C: ProtocolClient + 'static,
{
    loop {
        match changes.recv().await {
            // A removed sink has no state left to fetch.
            Ok(change)
                if change.facility == Facility::Sink && change.operation == Operation::Removed =>
            {
                debug!("sink #{} removed", change.index);
            }
            Ok(change) if change.facility == Facility::Sink => {
                trace!("{change}");

                // A slow sink fetch must not hold up other notifications.
                let client = Arc::clone(&client);
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = on_sink_change(&*client, change.index, event_tx.as_ref()).await
                    {
                        error!("error handling change of sink #{}: {e}", change.index);
                    }
                });
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!("skipped {skipped} change notifications");
            }
            Err(RecvError::Closed) => {
                debug!("change notifications ended");
                break;
            }
        }
    }
}

/// Fetches the sink that changed and emits the event its state maps to.
async fn on_sink_change<C>(client: &C, index: u32, event_tx: Option<&EventSender>) -> Result<()>
where
    C: ProtocolClient + ?Sized,
{
    // Notifications only carry the index, so the state has to be fetched.
    let sink = client.sink(&SinkRef::Index(index)).await?;
    trace!("sink #{index} ({}) is {}", sink.name, sink.state);

    let Some(event) = Event::from_sink(sink) else {
        return Ok(());
    };

    match event_tx {
        Some(tx) => {
            if tx.send(event).is_err() {
                debug!("event receiver dropped");
            }
        }
        None => trace!("no event receiver registered"),
    }

    Ok(())
}
