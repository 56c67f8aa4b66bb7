//! Raw MIDI message payloads.
//!
//! A `MidiMessage` is the opaque byte sequence received from (or sent to) a
//! port: status byte plus data bytes. Pass-through never rewrites the bytes;
//! decoding only happens for display.

use midi_msg::MidiMsg;
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Coarse classification derived from the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    NoteOff,
    NoteOn,
    PolyAftertouch,
    ControlChange,
    ProgramChange,
    ChannelAftertouch,
    PitchBend,
    SysEx,
    System,
    Other,
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::NoteOff => "note_off",
            MessageKind::NoteOn => "note_on",
            MessageKind::PolyAftertouch => "poly_aftertouch",
            MessageKind::ControlChange => "control_change",
            MessageKind::ProgramChange => "program_change",
            MessageKind::ChannelAftertouch => "aftertouch",
            MessageKind::PitchBend => "pitch_bend",
            MessageKind::SysEx => "sysex",
            MessageKind::System => "system",
            MessageKind::Other => "other",
        }
    }
}

/// Immutable raw MIDI message. Most messages are three bytes, so the payload
/// lives inline; SysEx spills to the heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiMessage {
    bytes: SmallVec<[u8; 3]>,
}

impl MidiMessage {
    /// Wrap arbitrary raw bytes (SysEx, system realtime, anything a port
    /// hands us). Rejects only the empty payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::EmptyMessage);
        }
        Ok(Self {
            bytes: SmallVec::from_slice(bytes),
        })
    }

    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        let channel = channel.min(15); // MIDI channels are 0-15
        Self {
            bytes: SmallVec::from_slice(&[0x90 | channel, note & 0x7F, velocity & 0x7F]),
        }
    }

    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        let channel = channel.min(15);
        Self {
            bytes: SmallVec::from_slice(&[0x80 | channel, note & 0x7F, velocity & 0x7F]),
        }
    }

    pub fn control_change(channel: u8, cc_number: u8, value: u8) -> Self {
        let channel = channel.min(15);
        Self {
            bytes: SmallVec::from_slice(&[0xB0 | channel, cc_number & 0x7F, value & 0x7F]),
        }
    }

    pub fn program_change(channel: u8, program: u8) -> Self {
        let channel = channel.min(15);
        Self {
            bytes: SmallVec::from_slice(&[0xC0 | channel, program & 0x7F]),
        }
    }

    /// `value`: signed 14-bit (-8192 to 8191).
    pub fn pitch_bend(channel: u8, value: i16) -> Self {
        let channel = channel.min(15);
        let unsigned = (value as i32 + 8192).clamp(0, 16383) as u16;
        let lsb = (unsigned & 0x7F) as u8;
        let msb = ((unsigned >> 7) & 0x7F) as u8;
        Self {
            bytes: SmallVec::from_slice(&[0xE0 | channel, lsb, msb]),
        }
    }

    pub fn aftertouch(channel: u8, pressure: u8) -> Self {
        let channel = channel.min(15);
        Self {
            bytes: SmallVec::from_slice(&[0xD0 | channel, pressure & 0x7F]),
        }
    }

    /// The exact bytes to write to an output port.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.bytes[0]
    }

    /// Channel number (0-15) for channel voice messages, `None` for system
    /// messages.
    pub fn channel(&self) -> Option<u8> {
        let status = self.status();
        if (0x80..0xF0).contains(&status) {
            Some(status & 0x0F)
        } else {
            None
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self.status() {
            0x80..=0x8F => MessageKind::NoteOff,
            0x90..=0x9F => MessageKind::NoteOn,
            0xA0..=0xAF => MessageKind::PolyAftertouch,
            0xB0..=0xBF => MessageKind::ControlChange,
            0xC0..=0xCF => MessageKind::ProgramChange,
            0xD0..=0xDF => MessageKind::ChannelAftertouch,
            0xE0..=0xEF => MessageKind::PitchBend,
            0xF0 => MessageKind::SysEx,
            0xF1..=0xFF => MessageKind::System,
            _ => MessageKind::Other,
        }
    }

    /// One-line human-readable description for the event log. Decodes via
    /// midi-msg; bytes it cannot parse fall back to a hex dump.
    pub fn summary(&self) -> String {
        match MidiMsg::from_midi(&self.bytes) {
            Ok((MidiMsg::ChannelVoice { channel, msg }, _)) => {
                format!("ch{:<2} {:?}", channel as u8 + 1, msg)
            }
            Ok((msg, _)) => format!("{msg:?}"),
            Err(_) => {
                let hex: Vec<String> = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("raw [{}]", hex.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on_bytes() {
        let msg = MidiMessage::note_on(0, 60, 100);
        assert_eq!(msg.bytes(), &[0x90, 60, 100]);
        assert_eq!(msg.kind(), MessageKind::NoteOn);
        assert_eq!(msg.channel(), Some(0));
    }

    #[test]
    fn test_note_off_bytes() {
        let msg = MidiMessage::note_off(3, 64, 0);
        assert_eq!(msg.bytes(), &[0x83, 64, 0]);
        assert_eq!(msg.kind(), MessageKind::NoteOff);
        assert_eq!(msg.channel(), Some(3));
    }

    #[test]
    fn test_cc_bytes() {
        let msg = MidiMessage::control_change(15, 64, 0);
        assert_eq!(msg.bytes(), &[0xBF, 64, 0]);
        assert_eq!(msg.kind(), MessageKind::ControlChange);
    }

    #[test]
    fn test_program_change_bytes() {
        let msg = MidiMessage::program_change(9, 42);
        assert_eq!(msg.bytes(), &[0xC9, 42]);
        assert_eq!(msg.kind(), MessageKind::ProgramChange);
    }

    #[test]
    fn test_pitch_bend_range() {
        // Center (no bend)
        let msg = MidiMessage::pitch_bend(0, 0);
        assert_eq!(msg.status(), 0xE0);
        assert_eq!((msg.bytes()[1] as u16) | ((msg.bytes()[2] as u16) << 7), 8192);

        // Max bend up
        let msg = MidiMessage::pitch_bend(0, 8191);
        assert_eq!((msg.bytes()[1] as u16) | ((msg.bytes()[2] as u16) << 7), 16383);

        // Max bend down
        let msg = MidiMessage::pitch_bend(0, -8192);
        assert_eq!((msg.bytes()[1] as u16) | ((msg.bytes()[2] as u16) << 7), 0);

        // Out-of-range values clamp
        let msg = MidiMessage::pitch_bend(0, i16::MAX);
        assert_eq!((msg.bytes()[1] as u16) | ((msg.bytes()[2] as u16) << 7), 16383);
    }

    #[test]
    fn test_channel_clamping_all_constructors() {
        assert_eq!(MidiMessage::note_on(200, 60, 100).status(), 0x9F);
        assert_eq!(MidiMessage::note_off(16, 60, 0).status(), 0x8F);
        assert_eq!(MidiMessage::control_change(255, 7, 127).status(), 0xBF);
        assert_eq!(MidiMessage::program_change(200, 42).status(), 0xCF);
        assert_eq!(MidiMessage::pitch_bend(128, 0).status(), 0xEF);
        assert_eq!(MidiMessage::aftertouch(99, 1).status(), 0xDF);
    }

    #[test]
    fn test_data_byte_masking() {
        let msg = MidiMessage::note_on(0, 0xFF, 0xFF);
        assert_eq!(msg.bytes()[1], 0x7F);
        assert_eq!(msg.bytes()[2], 0x7F);

        let msg = MidiMessage::program_change(0, 0xFF);
        assert_eq!(msg.bytes()[1], 0x7F);
    }

    #[test]
    fn test_from_bytes_rejects_empty() {
        assert!(matches!(
            MidiMessage::from_bytes(&[]),
            Err(Error::EmptyMessage)
        ));
    }

    #[test]
    fn test_from_bytes_preserves_payload() {
        let sysex = [0xF0, 0x7E, 0x00, 0x09, 0x01, 0xF7];
        let msg = MidiMessage::from_bytes(&sysex).unwrap();
        assert_eq!(msg.bytes(), &sysex);
        assert_eq!(msg.kind(), MessageKind::SysEx);
        assert_eq!(msg.channel(), None);
    }

    #[test]
    fn test_system_realtime_has_no_channel() {
        let clock = MidiMessage::from_bytes(&[0xF8]).unwrap();
        assert_eq!(clock.kind(), MessageKind::System);
        assert_eq!(clock.channel(), None);
    }

    #[test]
    fn test_summary_decodes_note_on() {
        let msg = MidiMessage::note_on(0, 60, 100);
        let summary = msg.summary();
        assert!(summary.contains("ch1"), "got: {summary}");
        assert!(summary.contains("60"), "got: {summary}");
    }

    #[test]
    fn test_summary_falls_back_to_hex() {
        // A lone data byte is not a valid message start.
        let msg = MidiMessage::from_bytes(&[0x42]).unwrap();
        assert!(msg.summary().starts_with("raw ["));
    }
}
