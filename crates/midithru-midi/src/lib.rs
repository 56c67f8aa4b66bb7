//! Core MIDI types for the midithru pass-through utility.
//!
//! Messages are kept as raw bytes end to end; decoding is display-only.

pub mod error;
pub use error::{Error, Result};

mod message;
pub use message::{MessageKind, MidiMessage};

mod event;
pub use event::MidiEvent;
