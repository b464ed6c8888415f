//! MIDI utilities and message types
//!
//! Provides parsing and encoding for the messages the gateway routes, plus
//! the `ControlEvent` view the router filters on. Pass-through forwarding
//! always carries the original raw bytes; parsing only drives routing
//! decisions, so messages outside this subset still flow through untouched.

use std::fmt;

/// MIDI message types routed by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },

    /// Note On: channel (0-15), note (0-127), velocity (0-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },

    /// Control Change: channel (0-15), cc (0-127), value (0-127)
    ControlChange { channel: u8, cc: u8, value: u8 },

    /// System Exclusive: data bytes without the 0xF0/0xF7 frame
    SysEx { data: Vec<u8> },
}

impl MidiMessage {
    /// Parse a MIDI message from raw bytes
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        let status = data[0];

        // Running status (data byte first) is not used by either device
        if status < 0x80 {
            return None;
        }

        if status < 0xF0 {
            let message_type = status & 0xF0;
            let channel = status & 0x0F;

            match message_type {
                0x80 => {
                    if data.len() < 3 { return None; }
                    Some(MidiMessage::NoteOff {
                        channel,
                        note: data[1] & 0x7F,
                        velocity: data[2] & 0x7F,
                    })
                }
                0x90 => {
                    // Note On with velocity 0 = Note Off
                    if data.len() < 3 { return None; }
                    let note = data[1] & 0x7F;
                    let velocity = data[2] & 0x7F;

                    if velocity == 0 {
                        Some(MidiMessage::NoteOff { channel, note, velocity: 0 })
                    } else {
                        Some(MidiMessage::NoteOn { channel, note, velocity })
                    }
                }
                0xB0 => {
                    if data.len() < 3 { return None; }
                    Some(MidiMessage::ControlChange {
                        channel,
                        cc: data[1] & 0x7F,
                        value: data[2] & 0x7F,
                    })
                }
                _ => None,
            }
        } else if status == 0xF0 {
            // System Exclusive - find the end (0xF7)
            if let Some(end) = data.iter().position(|&b| b == 0xF7) {
                Some(MidiMessage::SysEx { data: data[1..end].to_vec() })
            } else {
                None
            }
        } else {
            None
        }
    }

    /// Encode the message to MIDI bytes
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                vec![0x80 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                vec![0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F]
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                vec![0xB0 | (channel & 0x0F), cc & 0x7F, value & 0x7F]
            }
            MidiMessage::SysEx { ref data } => {
                let mut result = vec![0xF0];
                result.extend_from_slice(data);
                result.push(0xF7);
                result
            }
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MidiMessage::NoteOff { channel, note, velocity } => {
                write!(f, "NoteOff ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::NoteOn { channel, note, velocity } => {
                write!(f, "NoteOn ch:{} n:{} v:{}", channel + 1, note, velocity)
            }
            MidiMessage::ControlChange { channel, cc, value } => {
                write!(f, "CC ch:{} cc:{} v:{}", channel + 1, cc, value)
            }
            MidiMessage::SysEx { ref data } => {
                write!(f, "SysEx {} bytes", data.len())
            }
        }
    }
}

/// Which surface a message came from or goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortId {
    /// The Launchpad X itself
    Hardware,
    /// The downstream controller behind the virtual ports
    Controller,
}

/// Kind of a routable control event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoteOn,
    NoteOff,
    ControlChange,
}

/// Parsed view of a channel message, used for routing decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlEvent {
    pub port: PortId,
    pub kind: EventKind,
    pub channel: u8,
    /// Note number for note events, controller number for CC
    pub id: u8,
    /// Velocity for note events, controller value for CC
    pub value: u8,
}

impl ControlEvent {
    /// Build the routing view of a message; None for SysEx
    pub fn from_message(port: PortId, message: &MidiMessage) -> Option<Self> {
        match *message {
            MidiMessage::NoteOn { channel, note, velocity } => Some(Self {
                port,
                kind: EventKind::NoteOn,
                channel,
                id: note,
                value: velocity,
            }),
            MidiMessage::NoteOff { channel, note, velocity } => Some(Self {
                port,
                kind: EventKind::NoteOff,
                channel,
                id: note,
                value: velocity,
            }),
            MidiMessage::ControlChange { channel, cc, value } => Some(Self {
                port,
                kind: EventKind::ControlChange,
                channel,
                id: cc,
                value,
            }),
            MidiMessage::SysEx { .. } => None,
        }
    }

    /// Build the routing view directly from raw bytes
    pub fn from_raw(port: PortId, raw: &[u8]) -> Option<Self> {
        MidiMessage::parse(raw).and_then(|m| Self::from_message(port, &m))
    }
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
