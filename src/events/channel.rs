//! Progress channel between the pipeline and its observer.
//!
//! The channel is always unbounded: the scanner and the fingerprint
//! drain loop never wait on a slow progress bar.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Pipeline side of the progress channel. Cheap to clone.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event without blocking.
    ///
    /// Events are discarded once the observer has gone away.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Observer side of the progress channel.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Returns an iterator over received events
    ///
    /// Ends once every sender has been dropped.
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructor for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create a new event channel
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender for headless runs; every event is dropped.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
