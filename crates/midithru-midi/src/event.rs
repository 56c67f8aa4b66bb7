//! Timestamped MIDI events.

use crate::message::MidiMessage;

/// A message captured from an input port, tagged with when it arrived and
/// where it came from. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiEvent {
    /// Seconds since the capturing registry's epoch (monotonic).
    pub timestamp: f64,
    pub message: MidiMessage,
    /// Name of the input port that produced the event, when known.
    pub source: Option<String>,
}

impl MidiEvent {
    pub fn new(timestamp: f64, message: MidiMessage) -> Self {
        Self {
            timestamp,
            message,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Log-line rendering: `12.345 [Port A] ch1 NoteOn { .. }`.
    pub fn log_line(&self) -> String {
        match self.source() {
            Some(source) => format!("{:9.3} [{}] {}", self.timestamp, source, self.message.summary()),
            None => format!("{:9.3} {}", self.timestamp, self.message.summary()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_source() {
        let event = MidiEvent::new(1.5, MidiMessage::note_on(0, 60, 100)).with_source("Keys");
        assert_eq!(event.source(), Some("Keys"));
        assert_eq!(event.timestamp, 1.5);
    }

    #[test]
    fn test_log_line_includes_source() {
        let event = MidiEvent::new(0.25, MidiMessage::note_off(0, 60, 0)).with_source("Pad");
        let line = event.log_line();
        assert!(line.contains("[Pad]"), "got: {line}");
        assert!(line.contains("0.250"), "got: {line}");
    }

    #[test]
    fn test_log_line_without_source() {
        let event = MidiEvent::new(2.0, MidiMessage::control_change(0, 7, 127));
        let line = event.log_line();
        assert!(line.starts_with("    2.000 "), "got: {line}");
        assert!(!line.starts_with("    2.000 ["), "got: {line}");
    }
}
