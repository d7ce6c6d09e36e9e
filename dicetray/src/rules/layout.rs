use serde::{Deserialize, Serialize};

use crate::error::DiceError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    pub columns: usize,
    pub rows: usize,
}

impl GridDimensions {
    pub const fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Row and column of the given slot, counting left to right, top to bottom.
    pub fn position(&self, index: usize) -> Option<(usize, usize)> {
        if self.columns == 0 || index >= self.columns * self.rows {
            return None;
        }
        Some((index / self.columns, index % self.columns))
    }
}

/// Grid used to arrange `dice_count` dice on screen.
///
/// Counts above [`MAX_DICE`](crate::rules::dice::MAX_DICE) have no layout; renderers that want to show
/// something anyway must pick their own fallback.
pub fn layout_for(dice_count: usize) -> Result<GridDimensions, DiceError> {
    let dims = match dice_count {
        0 => GridDimensions::new(0, 0),
        1 => GridDimensions::new(1, 1),
        2 => GridDimensions::new(2, 1),
        3 => GridDimensions::new(3, 1),
        4 => GridDimensions::new(2, 2),
        5 | 6 => GridDimensions::new(3, 2),
        7 | 8 => GridDimensions::new(4, 2),
        n => return Err(DiceError::InvalidDiceCount(n)),
    };
    Ok(dims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::dice::MAX_DICE;

    #[test]
    fn test_layout_table() {
        let expected = [
            (0, (0, 0)),
            (1, (1, 1)),
            (2, (2, 1)),
            (3, (3, 1)),
            (4, (2, 2)),
            (5, (3, 2)),
            (6, (3, 2)),
            (7, (4, 2)),
            (8, (4, 2)),
        ];
        for (count, (columns, rows)) in expected {
            assert_eq!(
                layout_for(count).unwrap(),
                GridDimensions::new(columns, rows),
                "layout for {count}"
            );
        }
    }

    #[test]
    fn test_layout_holds_every_die() {
        for count in 1..=MAX_DICE {
            let dims = layout_for(count).unwrap();
            assert!(dims.columns * dims.rows >= count);
        }
    }

    #[test]
    fn test_layout_out_of_range() {
        assert_eq!(layout_for(9), Err(DiceError::InvalidDiceCount(9)));
        assert_eq!(layout_for(100), Err(DiceError::InvalidDiceCount(100)));
    }

    #[test]
    fn test_position() {
        let dims = layout_for(5).unwrap();
        assert_eq!(dims.position(0), Some((0, 0)));
        assert_eq!(dims.position(4), Some((1, 1)));
        assert_eq!(dims.position(6), None);
    }
}
