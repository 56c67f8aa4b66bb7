//! Device backend seam.
//!
//! The registry talks to ports through [`PortBackend`], so its open,
//! replace, and fan-out semantics can be exercised without a MIDI stack.
//! [`MidirBackend`] is the real implementation over midir.

use midir::{Ignore, MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::error::{Error, Result};

const CLIENT_NAME: &str = "midithru";

/// Invoked from the device callback with the raw bytes of each incoming
/// message.
pub type MessageCallback = Box<dyn Fn(&[u8]) + Send + 'static>;

/// Handles are owned by the registry; dropping one closes the connection.
pub trait PortBackend: Send + Sync {
    type InputHandle: Send;
    type OutputHandle: Send;

    fn input_names(&self) -> Result<Vec<String>>;
    fn output_names(&self) -> Result<Vec<String>>;

    /// Connect to the named input port; `on_message` fires per message
    /// until the handle is dropped.
    fn connect_input(&self, name: &str, on_message: MessageCallback)
        -> Result<Self::InputHandle>;

    fn connect_output(&self, name: &str) -> Result<Self::OutputHandle>;

    fn send(&self, handle: &mut Self::OutputHandle, bytes: &[u8]) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MidirBackend;

impl MidirBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PortBackend for MidirBackend {
    type InputHandle = MidiInputConnection<()>;
    type OutputHandle = MidiOutputConnection;

    /// Fresh probe client each call; may be empty.
    fn input_names(&self) -> Result<Vec<String>> {
        let probe = MidiInput::new(CLIENT_NAME)?;
        Ok(probe
            .ports()
            .iter()
            .filter_map(|p| probe.port_name(p).ok())
            .collect())
    }

    fn output_names(&self) -> Result<Vec<String>> {
        let probe = MidiOutput::new(CLIENT_NAME)?;
        Ok(probe
            .ports()
            .iter()
            .filter_map(|p| probe.port_name(p).ok())
            .collect())
    }

    fn connect_input(
        &self,
        name: &str,
        on_message: MessageCallback,
    ) -> Result<MidiInputConnection<()>> {
        let mut probe = MidiInput::new(CLIENT_NAME)?;
        probe.ignore(Ignore::None);
        let port = probe
            .ports()
            .into_iter()
            .find(|p| probe.port_name(p).map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| Error::PortNotFound(name.to_string()))?;
        probe
            .connect(
                &port,
                CLIENT_NAME,
                move |_stamp, bytes, _| on_message(bytes),
                (),
            )
            .map_err(|e| Error::Connect(name.to_string(), e.to_string()))
    }

    fn connect_output(&self, name: &str) -> Result<MidiOutputConnection> {
        let probe = MidiOutput::new(CLIENT_NAME)?;
        let port = probe
            .ports()
            .into_iter()
            .find(|p| probe.port_name(p).map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| Error::PortNotFound(name.to_string()))?;
        probe
            .connect(&port, CLIENT_NAME)
            .map_err(|e| Error::Connect(name.to_string(), e.to_string()))
    }

    fn send(&self, handle: &mut MidiOutputConnection, bytes: &[u8]) -> Result<()> {
        handle.send(bytes).map_err(|e| Error::Backend(e.to_string()))
    }
}
