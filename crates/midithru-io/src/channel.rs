//! Engine-to-presentation event queue.
//!
//! The engine owns the sender, the presentation layer owns the receiver;
//! there is no shared callback. The queue is bounded so a stalled UI can
//! never back up the pass-through loop.

use crossbeam_channel::{bounded, Receiver, Sender};
use midithru_midi::MidiEvent;

const DEFAULT_CAPACITY: usize = 1024;

/// Producer side -- the engine pushes observed events here.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<MidiEvent>,
}

impl EventSender {
    /// Non-blocking. Returns `false` if the queue is full or the receiver
    /// is gone; the caller is expected to drop the event in that case.
    #[inline]
    pub fn send(&self, event: MidiEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }
}

/// Consumer side -- the presentation layer drains on its own schedule.
pub struct EventReceiver {
    rx: Receiver<MidiEvent>,
}

impl EventReceiver {
    #[inline]
    pub fn poll(&self) -> Option<MidiEvent> {
        self.rx.try_recv().ok()
    }

    /// Drain everything currently queued without blocking.
    pub fn drain(&self) -> Vec<MidiEvent> {
        self.rx.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.rx.len()
    }
}

pub fn event_channel() -> (EventSender, EventReceiver) {
    event_channel_with_capacity(DEFAULT_CAPACITY)
}

pub fn event_channel_with_capacity(capacity: usize) -> (EventSender, EventReceiver) {
    let (tx, rx) = bounded(capacity);
    (EventSender { tx }, EventReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use midithru_midi::MidiMessage;

    fn event(note: u8) -> MidiEvent {
        MidiEvent::new(0.0, MidiMessage::note_on(0, note, 100))
    }

    #[test]
    fn test_send_and_drain_preserves_order() {
        let (tx, rx) = event_channel();
        assert!(tx.send(event(60)));
        assert!(tx.send(event(64)));
        assert!(tx.send(event(67)));

        let events = rx.drain();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].message.bytes()[1], 60);
        assert_eq!(events[1].message.bytes()[1], 64);
        assert_eq!(events[2].message.bytes()[1], 67);
    }

    #[test]
    fn test_send_fails_when_full() {
        let (tx, _rx) = event_channel_with_capacity(2);
        assert!(tx.send(event(60)));
        assert!(tx.send(event(61)));
        assert!(!tx.send(event(62)));
    }

    #[test]
    fn test_send_fails_when_receiver_dropped() {
        let (tx, rx) = event_channel();
        drop(rx);
        assert!(!tx.send(event(60)));
    }

    #[test]
    fn test_poll_empty_returns_none() {
        let (_tx, rx) = event_channel();
        assert!(rx.poll().is_none());
        assert_eq!(rx.pending_count(), 0);
    }
}
