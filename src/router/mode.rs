//! Operating modes and the mixer view table

use crate::launchpad::{FaderOrientation, FaderPolarity, PadColor};

/// Button toggling between Session and the mixer group; also the way back
/// from Note and Custom
pub const MODE_TOGGLE_CC: u8 = 95;

/// Button switching to Note mode, from any mode
pub const NOTE_LAYOUT_CC: u8 = 96;

/// Button switching to Custom mode, from any mode
pub const CUSTOM_LAYOUT_CC: u8 = 97;

/// Right-column buttons whose controller-driven state survives the mixer
/// views (top to bottom)
pub const STORED_BUTTON_CCS: [u8; 8] = [89, 79, 69, 59, 49, 39, 29, 19];

/// Right-column buttons blanked while a mixer view is active
pub const AUX_BUTTON_CCS: [u8; 4] = [49, 39, 29, 19];

/// First CC of the mixer parameter range (4 banks of 8)
pub const MIXER_CC_FIRST: u8 = 30;

/// Width of the mixer parameter range
pub const MIXER_CC_COUNT: u8 = 32;

/// Active operating mode of the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Session,
    Mixer(MixerView),
    Note,
    Custom,
}

/// One of the four mixer views sharing the fader layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixerView {
    Volume,
    Pan,
    SendA,
    SendB,
}

/// Fader-bank configuration of one mixer view
#[derive(Debug, Clone, Copy)]
pub struct FaderBank {
    pub orientation: FaderOrientation,
    pub polarity: FaderPolarity,
    pub first_cc: u8,
    pub color: PadColor,
}

impl MixerView {
    pub const ALL: [MixerView; 4] = [
        MixerView::Volume,
        MixerView::Pan,
        MixerView::SendA,
        MixerView::SendB,
    ];

    /// Right-column button selecting this view while the group is active
    pub fn selector_cc(self) -> u8 {
        match self {
            MixerView::Volume => 89,
            MixerView::Pan => 79,
            MixerView::SendA => 69,
            MixerView::SendB => 59,
        }
    }

    /// View selected by a right-column button, if any
    pub fn from_selector(cc: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.selector_cc() == cc)
    }

    /// Fader-bank setup of this view
    pub fn bank(self) -> FaderBank {
        match self {
            MixerView::Volume => FaderBank {
                orientation: FaderOrientation::Vertical,
                polarity: FaderPolarity::Unipolar,
                first_cc: 30,
                color: PadColor::Orange,
            },
            MixerView::Pan => FaderBank {
                orientation: FaderOrientation::Horizontal,
                polarity: FaderPolarity::Bipolar,
                first_cc: 38,
                color: PadColor::Yellow,
            },
            MixerView::SendA => FaderBank {
                orientation: FaderOrientation::Vertical,
                polarity: FaderPolarity::Unipolar,
                first_cc: 46,
                color: PadColor::Green,
            },
            MixerView::SendB => FaderBank {
                orientation: FaderOrientation::Vertical,
                polarity: FaderPolarity::Unipolar,
                first_cc: 54,
                color: PadColor::Blue,
            },
        }
    }
}
