//! Intensity-to-color bucketing for grid LEDs
//!
//! Two palette scales: the normal scale for resting cells and a highlighted
//! scale for cells in the playhead column. Index 0 of each scale is the
//! background code for an empty cell; nonzero intensities are bucketed over
//! the remaining entries.

const COLORS_NORMAL: [u8; 8] = [0, 83, 127, 84, 61, 15, 14, 13];
const COLORS_HIGHLIGHT: [u8; 5] = [103, 7, 6, 5, 60];

/// Background code of the chosen scale, the threshold for pad-on framing
pub fn background(highlighted: bool) -> u8 {
    if highlighted {
        COLORS_HIGHLIGHT[0]
    } else {
        COLORS_NORMAL[0]
    }
}

/// Map an intensity (0-127) to a device color code
///
/// Monotonic non-decreasing in `value` for a fixed `highlighted` flag.
pub fn encode(value: u8, highlighted: bool) -> u8 {
    let scale: &[u8] = if highlighted {
        &COLORS_HIGHLIGHT
    } else {
        &COLORS_NORMAL
    };

    if value == 0 {
        return scale[0];
    }

    let index = 1 + value as usize * (scale.len() - 1) / 128;
    scale[index.min(scale.len() - 1)]
}
