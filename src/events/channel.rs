//! Progress channel between an import run and whoever is watching it.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Handle the walker, planner and executor report progress through.
///
/// Clones share one channel; rayon workers extracting metadata each
/// hold a reference to the same sender.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Report `event`. A run with nobody listening drops it.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Listening end, usually drained by the CLI's progress thread.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Blocks between events; ends once the run has dropped its senders
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }

    /// Everything already queued, without waiting for more
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Unbounded, so a slow terminal never stalls extraction
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender for library callers that run without a display
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
