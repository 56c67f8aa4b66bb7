//! The pass-through engine.
//!
//! A dedicated worker thread blocks on the registry's multiplexed read,
//! hands each event to the observer queue, then forwards it unmodified to
//! every open output. The engine itself never drops an event; only the
//! per-device policies in the registry can lose a partial write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use parking_lot::Mutex;
use tracing::{debug, warn};

use midithru_midi::MidiEvent;

use crate::channel::EventSender;
use crate::registry::{PortRegistry, ReadMode};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);
const IDLE_BACKOFF: Duration = Duration::from_millis(50);

/// Seam between the engine and the device layer.
pub trait EventPorts: Send + Sync {
    fn read_events(&self, mode: ReadMode) -> Vec<MidiEvent>;
    fn send_event(&self, event: &MidiEvent);
}

impl<B: crate::backend::PortBackend + 'static> EventPorts for PortRegistry<B> {
    fn read_events(&self, mode: ReadMode) -> Vec<MidiEvent> {
        PortRegistry::read_events(self, mode)
    }

    fn send_event(&self, event: &MidiEvent) {
        PortRegistry::send_event(self, event)
    }
}

struct Worker {
    handle: JoinHandle<()>,
    done_rx: Receiver<()>,
    running: Arc<AtomicBool>,
}

pub struct PassThroughEngine<P: EventPorts + 'static> {
    ports: Arc<P>,
    observer: Option<EventSender>,
    worker: Mutex<Option<Worker>>,
}

impl<P: EventPorts + 'static> PassThroughEngine<P> {
    pub fn new(ports: Arc<P>, observer: Option<EventSender>) -> Self {
        Self {
            ports,
            observer,
            worker: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .map_or(false, |w| w.running.load(Ordering::Acquire))
    }

    /// Spawn the loop thread and return immediately. No-op when already
    /// running; the worker slot is guarded by a mutex, so exactly one
    /// loop ever runs per engine.
    pub fn start(&self) {
        let mut slot = self.worker.lock();
        if slot.is_some() {
            return;
        }

        // Each worker owns its run flag. A worker detached on a stop
        // timeout keeps its cleared flag and exits on its next wakeup,
        // no matter how many times the engine is restarted meanwhile.
        let running = Arc::new(AtomicBool::new(true));
        let ports = Arc::clone(&self.ports);
        let observer = self.observer.clone();
        let loop_flag = Arc::clone(&running);
        let (done_tx, done_rx) = bounded(1);

        let handle = thread::Builder::new()
            .name("midithru-engine".to_string())
            .spawn(move || {
                run_loop(ports.as_ref(), observer.as_ref(), &loop_flag);
                let _ = done_tx.send(());
            })
            .expect("Failed to spawn engine thread");

        *slot = Some(Worker {
            handle,
            done_rx,
            running,
        });
    }

    /// Signal the loop and wait (bounded) for it to exit. No-op when not
    /// running.
    ///
    /// The loop's only suspension point is the blocking read, which has no
    /// cancellation wired into it: a stop issued while the loop is waiting
    /// for hardware input only takes effect once the next event arrives.
    /// After [`SHUTDOWN_TIMEOUT`] the worker is detached rather than
    /// hanging the caller; its flag stays cleared, so it winds down as
    /// soon as its read returns.
    pub fn stop(&self) {
        let worker = self.worker.lock().take();
        let Some(worker) = worker else { return };
        worker.running.store(false, Ordering::Release);
        match worker.done_rx.recv_timeout(SHUTDOWN_TIMEOUT) {
            Ok(()) => {
                let _ = worker.handle.join();
            }
            Err(_) => {
                warn!(
                    timeout = ?SHUTDOWN_TIMEOUT,
                    "engine loop still blocked on input after stop; detaching"
                );
            }
        }
    }
}

impl<P: EventPorts + 'static> Drop for PassThroughEngine<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop<P: EventPorts>(ports: &P, observer: Option<&EventSender>, running: &AtomicBool) {
    debug!("engine loop started");
    while running.load(Ordering::Acquire) {
        let events = ports.read_events(ReadMode::Blocking);
        if events.is_empty() {
            // No open inputs to wait on; back off instead of spinning.
            thread::sleep(IDLE_BACKOFF);
            continue;
        }
        for event in events {
            if let Some(observer) = observer {
                // A full or disconnected observer queue is a presentation
                // problem; it must never stall or kill forwarding.
                observer.send(event.clone());
            }
            ports.send_event(&event);
        }
    }
    debug!("engine loop stopped");
}
