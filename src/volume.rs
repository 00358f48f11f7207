//! Volume control in percent.
//!
//! Sinks report volumes in raw units where the sink's base volume is 100%.
//! The operations here scale between that and a percentage.
//!
//! # Sink Resolution
//!
//! Every operation takes an optional sink. Without one, the default sink
//! learned at session setup is used, and without that the sink at index 0.
//!
//! # Channels
//!
//! Setting a volume applies to all channels of a sink. Reading it only
//! looks at the first channel; balance is not modeled.

use crate::{
    error::{Error, Result},
    protocol::{ProtocolClient, SinkRef},
    session::Session,
};

/// Converts a percentage into the raw volume of a sink with the given base
/// volume.
///
/// Percentages outside `0..=100` are clamped. `NaN` maps to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_level(percent: f64, base_volume: u32) -> u32 {
    let ratio = percent.clamp(0.0, 100.0) / 100.0;
    // Saturating cast: `NaN` becomes 0.
    (ratio * f64::from(base_volume)).round() as u32
}

/// Converts a raw volume into a rounded percentage of the base volume.
///
/// The result can exceed 100 when a sink is amplified beyond its base
/// volume.
///
/// # Errors
///
/// Returns an `OutOfRange` error when `base_volume` is zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_percent(level: u32, base_volume: u32) -> Result<u32> {
    if base_volume == 0 {
        return Err(Error::out_of_range("sink has a base volume of zero"));
    }

    let ratio = f64::from(level) / f64::from(base_volume);
    Ok((ratio * 100.0).round() as u32)
}

impl<C> Session<C>
where
    C: ProtocolClient + 'static,
{
    /// Picks the sink an operation applies to.
    fn resolve(&self, sink: Option<SinkRef>) -> SinkRef {
        sink.or_else(|| self.default_sink().map(SinkRef::from))
            .unwrap_or(SinkRef::Index(0))
    }

    /// Sets the volume of a sink in percent.
    ///
    /// Without `sink`, applies to the default sink. Volumes below 0 or
    /// above 100 are clamped.
    ///
    /// # Errors
    ///
    /// Returns a `FailedPrecondition` error if not connected, or the error
    /// of the protocol client.
    pub async fn set_volume(&self, volume: f64, sink: Option<SinkRef>) -> Result<()> {
        self.connection().check_connected()?;

        let target = self.resolve(sink);
        let client = self.connection().client();
        let sink = client.sink(&target).await?;

        let level = to_level(volume, sink.base_volume);
        debug!(
            "setting volume of sink #{} ({}) to {volume}% ({level}/{})",
            sink.index, sink.name, sink.base_volume
        );

        client.set_sink_volume(sink.index, level).await
    }

    /// Gets the volume of a sink in percent.
    ///
    /// Without `sink`, reads the default sink. Only the first channel is
    /// taken into account.
    ///
    /// # Errors
    ///
    /// Returns a `FailedPrecondition` error if not connected, a `NotFound`
    /// error if the sink has no channels, an `OutOfRange` error if the sink
    /// has no base volume, or the error of the protocol client.
    pub async fn get_volume(&self, sink: Option<SinkRef>) -> Result<u32> {
        self.connection().check_connected()?;

        let target = self.resolve(sink);
        let sink = self.connection().client().sink(&target).await?;

        let level = sink
            .channel_volume
            .volumes
            .first()
            .copied()
            .ok_or_else(|| Error::not_found(format!("sink #{} has no channels", sink.index)))?;

        to_percent(level, sink.base_volume)
    }
}
