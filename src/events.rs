//! Playback events derived from sink state changes.
//!
//! The sound server reports every change to a sink: volume, mute, port,
//! state. Consumers usually only care whether audio started or stopped
//! playing. This module collapses a sink's state into such an [`Event`].
//!
//! # Example
//!
//! ```rust
//! use audio_block::events::Event;
//!
//! fn handle_event(event: Event) {
//!     match event {
//!         Event::Play(sink) => println!("{} started playing", sink.name),
//!         Event::Stop(sink) => println!("{} stopped playing", sink.name),
//!     }
//! }
//! ```

use tokio::sync::mpsc;

use crate::protocol::{Sink, SinkState};

/// Channel end that receives events from a session.
pub type EventSender = mpsc::UnboundedSender<Event>;

/// Events emitted by a session.
///
/// Each event carries the sink as it was fetched right after the change
/// was announced.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A sink started running: something is playing through it.
    Play(Sink),

    /// A sink went idle: nothing plays through it anymore.
    Stop(Sink),
}

impl Event {
    /// Translates a sink's state into an event.
    ///
    /// Only running and idle sinks produce events. Suspended sinks and
    /// other states are administrative and yield `None`.
    #[must_use]
    pub fn from_sink(sink: Sink) -> Option<Self> {
        match sink.state {
            SinkState::Running => Some(Self::Play(sink)),
            SinkState::Idle => Some(Self::Stop(sink)),
            SinkState::Suspended
            | SinkState::Invalid
            | SinkState::Init
            | SinkState::Unlinked
            | SinkState::Unknown(_) => None,
        }
    }

    #[must_use]
    pub fn sink(&self) -> &Sink {
        match self {
            Self::Play(sink) | Self::Stop(sink) => sink,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::fake::sink;

    #[test]
    fn running_plays_and_idle_stops() {
        let running = sink(1, "hdmi", SinkState::Running);
        assert_eq!(
            Event::from_sink(running.clone()),
            Some(Event::Play(running))
        );

        let idle = sink(1, "hdmi", SinkState::Idle);
        let event = Event::from_sink(idle.clone()).unwrap();
        assert_eq!(event, Event::Stop(idle.clone()));
        assert_eq!(event.sink(), &idle);
    }

    #[test]
    fn other_states_are_silent() {
        let states = [
            SinkState::from(2),
            SinkState::from(-1),
            SinkState::from(-2),
            SinkState::from(-3),
            SinkState::from(3),
            SinkState::from(i32::MAX),
        ];

        for state in states {
            assert_eq!(Event::from_sink(sink(0, "builtin", state)), None, "{state}");
        }
    }
}
