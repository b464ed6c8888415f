//! Coordinate mapping between the pad grid, hardware note numbers and
//! sequencer parameter indices
//!
//! Three coordinate spaces meet here: the logical 8x8 grid (row 0 at the
//! top), the Launchpad's note numbering (note 11 is the bottom-left pad,
//! ten notes per physical row) and the x42-stepseq parameter space (the
//! first grid parameter is index 17, eight per row). All inverse mappings
//! are range-checked and return `None` for anything off the grid.

/// Grid side length; the sequencer exposes 8 steps of 8 notes
pub const GRID_SIZE: u8 = 8;

/// Parameter index of the top-left grid cell
const PARAM_BASE: i32 = 17;

/// Note number of the bottom-left grid pad
const NOTE_BASE: i32 = 11;

/// Notes per physical row (the rightmost column is the launch button column)
const NOTE_STRIDE: i32 = 10;

/// A position on the logical grid, both coordinates in 0..8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPos {
    pub row: u8,
    pub col: u8,
}

impl GridPos {
    /// Construct a position, `None` if either coordinate is off the grid
    pub fn new(row: i32, col: i32) -> Option<Self> {
        if (0..GRID_SIZE as i32).contains(&row) && (0..GRID_SIZE as i32).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Sequencer parameter index of this cell
    pub fn to_param(self) -> i32 {
        PARAM_BASE + self.row as i32 * GRID_SIZE as i32 + self.col as i32
    }

    /// Hardware note number of this cell
    pub fn to_note(self) -> u8 {
        (NOTE_BASE + (GRID_SIZE as i32 - 1 - self.row as i32) * NOTE_STRIDE + self.col as i32)
            as u8
    }

    /// Cell for a sequencer parameter index, `None` for ids outside the grid
    /// block (including the playhead parameter)
    pub fn from_param(param: i32) -> Option<Self> {
        let offset = param - PARAM_BASE;
        if offset < 0 {
            return None;
        }
        Self::new(offset / GRID_SIZE as i32, offset % GRID_SIZE as i32)
    }

    /// Cell for a hardware note number, `None` for notes outside the pad
    /// matrix (launch buttons, top row)
    pub fn from_note(note: u8) -> Option<Self> {
        let offset = note as i32 - NOTE_BASE;
        if offset < 0 {
            return None;
        }
        Self::new(
            GRID_SIZE as i32 - 1 - offset / NOTE_STRIDE,
            offset % NOTE_STRIDE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_param_corners() {
        assert_eq!(GridPos { row: 0, col: 0 }.to_param(), 17);
        assert_eq!(GridPos { row: 7, col: 7 }.to_param(), 80);
        assert_eq!(GridPos::from_param(17), Some(GridPos { row: 0, col: 0 }));
        assert_eq!(GridPos::from_param(25), Some(GridPos { row: 1, col: 0 }));
    }

    #[test]
    fn test_note_corners() {
        // row 0 is the top row of the device
        assert_eq!(GridPos { row: 0, col: 0 }.to_note(), 81);
        assert_eq!(GridPos { row: 7, col: 0 }.to_note(), 11);
        assert_eq!(GridPos { row: 7, col: 7 }.to_note(), 18);
        assert_eq!(GridPos::from_note(81), Some(GridPos { row: 0, col: 0 }));
    }

    #[test]
    fn test_out_of_range_is_none() {
        // playhead parameter and anything below the grid block
        assert_eq!(GridPos::from_param(7), None);
        assert_eq!(GridPos::from_param(16), None);
        assert_eq!(GridPos::from_param(81), None);

        // launch-button column (col 8 of each note row) and top row CCs
        assert_eq!(GridPos::from_note(19), None);
        assert_eq!(GridPos::from_note(89), None);
        assert_eq!(GridPos::from_note(10), None);
        assert_eq!(GridPos::from_note(91), None);
    }

    proptest! {
        #[test]
        fn prop_param_round_trip(row in 0u8..8, col in 0u8..8) {
            let pos = GridPos { row, col };
            prop_assert_eq!(GridPos::from_param(pos.to_param()), Some(pos));
        }

        #[test]
        fn prop_note_round_trip(row in 0u8..8, col in 0u8..8) {
            let pos = GridPos { row, col };
            prop_assert_eq!(GridPos::from_note(pos.to_note()), Some(pos));
        }

        #[test]
        fn prop_invalid_params_never_panic(param in -1000i32..1000) {
            // either maps onto the grid or cleanly refuses
            if let Some(pos) = GridPos::from_param(param) {
                prop_assert_eq!(pos.to_param(), param);
            }
        }
    }
}
