//! MIDI port registry.
//!
//! Owns every open device handle, indexed by port name. Opening replaces
//! the previous selection (close all, then open the requested set) so the
//! registry never leaks a connection across reconfiguration. All open
//! inputs feed one [`InputMux`], the single blocking wait point for the
//! engine.

use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, warn};

use midithru_midi::{MidiEvent, MidiMessage};

use crate::backend::{MidirBackend, PortBackend};
use crate::error::Error;
use crate::mux::InputMux;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Drain whatever is pending; never wait.
    NonBlocking,
    /// Wait for at least one event, then drain the rest of the burst.
    Blocking,
}

/// Per-port outcome of a batch open. A failed port never aborts the batch.
#[derive(Debug, Default)]
pub struct OpenSummary {
    pub opened: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

impl OpenSummary {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

struct OpenInput<H> {
    name: String,
    // Held for ownership; dropping it closes the device connection.
    _conn: H,
}

struct OpenOutput<H> {
    name: String,
    conn: H,
}

pub struct PortRegistry<B: PortBackend = MidirBackend> {
    backend: B,
    inputs: Mutex<Vec<OpenInput<B::InputHandle>>>,
    outputs: Mutex<Vec<OpenOutput<B::OutputHandle>>>,
    mux: InputMux,
    epoch: Instant,
}

impl PortRegistry {
    pub fn new() -> Self {
        Self::with_backend(MidirBackend::new())
    }
}

impl<B: PortBackend> PortRegistry<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            inputs: Mutex::new(Vec::new()),
            outputs: Mutex::new(Vec::new()),
            mux: InputMux::new(),
            epoch: Instant::now(),
        }
    }

    /// Enumerate input port names. Fresh query each call; may be empty.
    pub fn list_inputs(&self) -> crate::Result<Vec<String>> {
        self.backend.input_names()
    }

    pub fn list_outputs(&self) -> crate::Result<Vec<String>> {
        self.backend.output_names()
    }

    /// Replace the open input set with `names`. Duplicates in the request
    /// are opened once (first occurrence wins); a port that fails to open
    /// lands in the summary and the rest of the batch proceeds.
    pub fn open_inputs(&self, names: &[String]) -> OpenSummary {
        self.close_inputs();

        let mut summary = OpenSummary::default();
        let mut opened = Vec::new();
        for name in names {
            if summary.opened.contains(name) || summary.failed.iter().any(|(n, _)| n == name) {
                debug!(port = %name, "duplicate input name ignored");
                continue;
            }
            match self.connect_input(name) {
                Ok(conn) => {
                    debug!(port = %name, "opened MIDI input");
                    opened.push(OpenInput {
                        name: name.clone(),
                        _conn: conn,
                    });
                    summary.opened.push(name.clone());
                }
                Err(e) => {
                    warn!(port = %name, error = %e, "failed to open MIDI input");
                    summary.failed.push((name.clone(), e));
                }
            }
        }
        *self.inputs.lock() = opened;
        summary
    }

    /// Replace the open output set with `names`. Same semantics as
    /// [`open_inputs`](Self::open_inputs).
    pub fn open_outputs(&self, names: &[String]) -> OpenSummary {
        self.close_outputs();

        let mut summary = OpenSummary::default();
        let mut opened = Vec::new();
        for name in names {
            if summary.opened.contains(name) || summary.failed.iter().any(|(n, _)| n == name) {
                debug!(port = %name, "duplicate output name ignored");
                continue;
            }
            match self.backend.connect_output(name) {
                Ok(conn) => {
                    debug!(port = %name, "opened MIDI output");
                    opened.push(OpenOutput {
                        name: name.clone(),
                        conn,
                    });
                    summary.opened.push(name.clone());
                }
                Err(e) => {
                    warn!(port = %name, error = %e, "failed to open MIDI output");
                    summary.failed.push((name.clone(), e));
                }
            }
        }
        *self.outputs.lock() = opened;
        summary
    }

    fn connect_input(&self, name: &str) -> crate::Result<B::InputHandle> {
        let producer = self.mux.producer();
        let epoch = self.epoch;
        let source = name.to_string();
        self.backend.connect_input(
            name,
            Box::new(move |bytes| {
                let Ok(message) = MidiMessage::from_bytes(bytes) else {
                    return;
                };
                let event = MidiEvent::new(epoch.elapsed().as_secs_f64(), message)
                    .with_source(source.clone());
                producer.push(event);
            }),
        )
    }

    /// Idempotent. Close problems are swallowed: shutdown must not hang on
    /// a faulty driver.
    pub fn close_inputs(&self) {
        let drained = std::mem::take(&mut *self.inputs.lock());
        for input in drained {
            debug!(port = %input.name, "closing MIDI input");
            drop(input);
        }
    }

    pub fn close_outputs(&self) {
        let drained = std::mem::take(&mut *self.outputs.lock());
        for output in drained {
            debug!(port = %output.name, "closing MIDI output");
            drop(output);
        }
    }

    pub fn close(&self) {
        self.close_inputs();
        self.close_outputs();
    }

    /// Read captured events.
    ///
    /// `Blocking` waits on the mux until any open input produces a message,
    /// then also drains whatever else is already pending. With no open
    /// inputs it returns empty immediately instead of waiting for a port
    /// that cannot exist yet.
    pub fn read_events(&self, mode: ReadMode) -> Vec<MidiEvent> {
        match mode {
            ReadMode::NonBlocking => self.mux.drain(),
            ReadMode::Blocking => {
                if self.inputs.lock().is_empty() {
                    return Vec::new();
                }
                self.mux.read_blocking()
            }
        }
    }

    /// Write the event's bytes to every open output. A failure on one port
    /// is logged and never skips delivery to the rest.
    pub fn send_event(&self, event: &MidiEvent) {
        let mut outputs = self.outputs.lock();
        for output in outputs.iter_mut() {
            if let Err(e) = self.backend.send(&mut output.conn, event.message.bytes()) {
                warn!(port = %output.name, error = %e, "MIDI output write failed");
            }
        }
    }

    pub fn open_input_names(&self) -> Vec<String> {
        self.inputs.lock().iter().map(|p| p.name.clone()).collect()
    }

    pub fn open_output_names(&self) -> Vec<String> {
        self.outputs.lock().iter().map(|p| p.name.clone()).collect()
    }
}

impl Default for PortRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: PortBackend> std::fmt::Debug for PortRegistry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortRegistry")
            .field("open_inputs", &self.open_input_names())
            .field("open_outputs", &self.open_output_names())
            .finish()
    }
}
