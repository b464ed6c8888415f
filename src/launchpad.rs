//! Launchpad X device protocol
//!
//! Color palette, layout ids, and the SysEx/command vocabulary the gateway
//! sends to the hardware. Each `PadCommand` is one atomic outbound message;
//! the actual MIDI transport lives in [`crate::ports`].

use crate::midi::MidiMessage;

/// MIDI channel (raw, 0-based) carrying pads and right-column buttons.
/// The device documents this as channel 1.
pub const BUTTON_CHANNEL: u8 = 0;

/// MIDI channel (raw, 0-based) carrying the built-in fader banks.
/// The device documents this as channel 5.
pub const FADER_CHANNEL: u8 = 4;

/// SysEx header common to all Launchpad X commands
const SYSEX_HEADER: [u8; 5] = [0x00, 0x20, 0x29, 0x02, 0x0C];

/// Named entries of the device color palette
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadColor {
    Black = 0,
    SoftWhite = 1,
    White = 3,
    Red = 5,
    Orange = 9,
    Brown = 11,
    Yellow = 13,
    SoftGreen = 19,
    Green = 21,
    Blue = 45,
}

impl PadColor {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Device layouts selectable over SysEx
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Session = 0,
    Faders = 13,
}

/// Orientation of a configured fader bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaderOrientation {
    Vertical = 0,
    Horizontal = 1,
}

/// Polarity of a configured fader bank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaderPolarity {
    Unipolar = 0,
    Bipolar = 1,
}

/// One atomic outbound command to the Launchpad X
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadCommand {
    /// Light a grid pad with a palette color (Note On on the button channel)
    SetPad { note: u8, color: u8 },
    /// Turn a grid pad off (Note Off on the button channel)
    ClearPad { note: u8 },
    /// Color a right-column or top-row button (CC on the button channel)
    SetButton { cc: u8, color: PadColor },
    /// Enable or disable the DAW interface mode
    DawMode { enabled: bool },
    /// Switch the active device layout
    SelectLayout(Layout),
    /// Set the session button colors; (0, 0) resets to the device default
    SessionColor { active: u8, inactive: u8 },
    /// Configure the eight faders of the fader layout: orientation and,
    /// per fader, polarity, CC number (first_cc..first_cc+8) and color
    SetupFaders {
        orientation: FaderOrientation,
        polarity: FaderPolarity,
        first_cc: u8,
        color: PadColor,
    },
}

impl PadCommand {
    /// Encode the command as a single outbound MIDI message
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            PadCommand::SetPad { note, color } => MidiMessage::NoteOn {
                channel: BUTTON_CHANNEL,
                note,
                velocity: color,
            }
            .encode(),
            PadCommand::ClearPad { note } => MidiMessage::NoteOff {
                channel: BUTTON_CHANNEL,
                note,
                velocity: 0,
            }
            .encode(),
            PadCommand::SetButton { cc, color } => MidiMessage::ControlChange {
                channel: BUTTON_CHANNEL,
                cc,
                value: color.code(),
            }
            .encode(),
            PadCommand::DawMode { enabled } => {
                // 0 enables the DAW interface, 1 hands the surface back
                sysex(&[0x10, if enabled { 0 } else { 1 }])
            }
            PadCommand::SelectLayout(layout) => sysex(&[0x00, layout as u8]),
            PadCommand::SessionColor { active, inactive } => {
                sysex(&[0x14, active, inactive])
            }
            PadCommand::SetupFaders {
                orientation,
                polarity,
                first_cc,
                color,
            } => {
                let mut data = vec![0x01, 0x00, orientation as u8];
                for index in 0..8u8 {
                    data.extend_from_slice(&[
                        index,
                        polarity as u8,
                        first_cc + index,
                        color.code(),
                    ]);
                }
                sysex(&data)
            }
        }
    }
}

fn sysex(data: &[u8]) -> Vec<u8> {
    let mut payload = SYSEX_HEADER.to_vec();
    payload.extend_from_slice(data);
    MidiMessage::SysEx { data: payload }.encode()
}
