//! Connection establishment with retries.
//!
//! A sound server on an embedded device may take a while to come up after
//! boot. [`ConnectionManager`] keeps trying to connect at a fixed interval
//! until the server answers or the overall time budget of the
//! [`RetryPolicy`] runs out.
//!
//! Failed attempts are not errors to the caller. They are reported to a
//! [`FailureHook`], which by default logs them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use audio_block::{address::Address, config::RetryPolicy, connection::ConnectionManager};
//!
//! let mut connection = ConnectionManager::new(Arc::new(client), Address::default(), RetryPolicy::default())
//!     .with_hook(|attempt, e| eprintln!("attempt {attempt} failed: {e}"));
//!
//! let auth = connection.connect_with_retry().await?;
//! assert!(connection.is_connected());
//! ```

use std::{fmt, sync::Arc};

use crate::{
    address::Address,
    config::RetryPolicy,
    error::{Error, Result},
    protocol::{AuthInfo, ProtocolClient},
};

/// Observer of failed connect attempts.
///
/// Called with the 1-based attempt number and the error of that attempt.
pub type FailureHook = Box<dyn Fn(u32, &Error) + Send + Sync>;

/// Owns connection establishment and tracks whether it succeeded.
pub struct ConnectionManager<C> {
    client: Arc<C>,
    address: Address,
    policy: RetryPolicy,
    on_failure: FailureHook,
    connected: bool,
}

impl<C> ConnectionManager<C>
where
    C: ProtocolClient,
{
    #[must_use]
    pub fn new(client: Arc<C>, address: Address, policy: RetryPolicy) -> Self {
        Self {
            client,
            address,
            policy,
            on_failure: Box::new(|attempt: u32, e: &Error| {
                warn!("error connecting to audio server (attempt {attempt}): {e}");
            }),
            connected: false,
        }
    }

    /// Replaces the default logging of failed attempts.
    #[must_use]
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(u32, &Error) + Send + Sync + 'static,
    {
        self.set_hook(hook);
        self
    }

    pub fn set_hook<F>(&mut self, hook: F)
    where
        F: Fn(u32, &Error) + Send + Sync + 'static,
    {
        self.on_failure = Box::new(hook);
    }

    /// Connects to the sound server, retrying until it succeeds or the
    /// retry budget runs out.
    ///
    /// An attempt that is still in flight when the budget runs out is
    /// abandoned.
    ///
    /// # Errors
    ///
    /// Returns a `DeadlineExceeded` error when no attempt succeeded within
    /// the policy's timeout. The connection is then still marked as not
    /// connected.
    pub async fn connect_with_retry(&mut self) -> Result<AuthInfo> {
        let client = &self.client;
        let address = &self.address;
        let on_failure = &self.on_failure;
        let delay = self.policy.delay;

        let attempts = async {
            let mut attempt: u32 = 0;
            loop {
                attempt = attempt.saturating_add(1);
                trace!("connect attempt {attempt} to {address}");

                match client.connect(address).await {
                    Ok(auth) => break (attempt, auth),
                    Err(e) => {
                        on_failure(attempt, &e);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        };

        let (attempt, auth) = tokio::time::timeout(self.policy.timeout, attempts)
            .await
            .map_err(|_| {
                debug!("giving up on {}", self.address);
                Error::connection_timeout(self.policy.timeout)
            })?;

        self.connected = true;
        info!(
            "connected to audio server at {} after {attempt} attempt{}; protocol version {}",
            self.address,
            if attempt == 1 { "" } else { "s" },
            auth.protocol_version
        );

        Ok(auth)
    }

    /// Fails unless a connect has succeeded.
    ///
    /// # Errors
    ///
    /// Returns a `FailedPrecondition` error when not connected.
    pub fn check_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::not_connected())
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    #[must_use]
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    #[must_use]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl<C> fmt::Debug for ConnectionManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("address", &self.address)
            .field("policy", &self.policy)
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}
