//! Multiplexed wait handle over any number of input ports.
//!
//! Every open input connection holds an `InputProducer`; all of them feed
//! one channel, so a single blocking wait covers every port at once. The
//! mux outlives reopen cycles: a reader blocked in [`InputMux::read_blocking`]
//! keeps working when the set of producers changes under it.

use crossbeam_channel::{unbounded, Receiver, Sender};
use midithru_midi::MidiEvent;

/// Producer handle held by one input port's receive callback.
#[derive(Clone)]
pub struct InputProducer {
    tx: Sender<MidiEvent>,
}

impl InputProducer {
    /// Returns `false` only if the mux itself is gone.
    #[inline]
    pub fn push(&self, event: MidiEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub struct InputMux {
    tx: Sender<MidiEvent>,
    rx: Receiver<MidiEvent>,
}

impl InputMux {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn producer(&self) -> InputProducer {
        InputProducer {
            tx: self.tx.clone(),
        }
    }

    /// Drain everything pending without waiting. Never blocks.
    pub fn drain(&self) -> Vec<MidiEvent> {
        self.rx.try_iter().collect()
    }

    /// Wait for at least one event, then also grab whatever else is already
    /// pending so a burst arriving during the wait comes back in one call.
    pub fn read_blocking(&self) -> Vec<MidiEvent> {
        let mut events = Vec::new();
        // recv() cannot fail while the mux holds its own sender clone.
        if let Ok(first) = self.rx.recv() {
            events.push(first);
            events.extend(self.rx.try_iter());
        }
        events
    }

    #[inline]
    pub fn has_pending(&self) -> bool {
        !self.rx.is_empty()
    }
}

impl Default for InputMux {
    fn default() -> Self {
        Self::new()
    }
}
