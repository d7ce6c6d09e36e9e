use dicetray::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieCell {
    pub symbol: &'static str,
    pub state: DieVisualState,
}

impl Default for DieCell {
    fn default() -> Self {
        Self {
            symbol: Face::ONE.symbol(FaceSymbols::default()),
            state: DieVisualState::default(),
        }
    }
}

/// What the screen currently shows. Filled in by the controller, read by the
/// draw functions.
#[derive(Debug, Default, Clone)]
pub struct DiceBoard {
    pub grid: GridDimensions,
    pub cells: Vec<DieCell>,
    pub sum: u32,
    pub frequencies: String,
    pub roll_count: u64,
    pub status: String,
}

impl DiceBoard {
    pub fn is_rolling(&self) -> bool {
        self.cells.iter().any(|c| c.state.rolling)
    }

    fn cell_mut(&mut self, die: DieId) -> Option<&mut DieCell> {
        self.cells.get_mut(die.index())
    }
}

impl RenderingSurface for DiceBoard {
    fn show_layout(&mut self, dice_count: usize, grid: GridDimensions) {
        self.grid = grid;
        self.cells.resize(dice_count, DieCell::default());
    }

    fn show_face(&mut self, die: DieId, symbol: &'static str) {
        if let Some(cell) = self.cell_mut(die) {
            cell.symbol = symbol;
        }
    }

    fn show_die_state(&mut self, die: DieId, state: DieVisualState) {
        if let Some(cell) = self.cell_mut(die) {
            cell.state = state;
        }
    }

    fn show_sum(&mut self, sum: u32) {
        self.sum = sum;
    }

    fn show_frequencies(&mut self, text: &str) {
        self.frequencies = text.to_string();
    }

    fn show_roll_count(&mut self, roll_count: u64) {
        self.roll_count = roll_count;
    }

    fn show_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_resizes_cells() {
        let mut board = DiceBoard::default();
        board.show_layout(3, GridDimensions::new(3, 1));
        assert_eq!(board.cells.len(), 3);
        board.show_face(DieId(2), "⚅");
        board.show_layout(2, GridDimensions::new(2, 1));
        assert_eq!(board.cells.len(), 2);
        // out of range updates are dropped
        board.show_face(DieId(2), "⚅");
        assert!(board.cells.iter().all(|c| c.symbol == "⚀"));
    }

    #[test]
    fn test_rolling_flag() {
        let mut board = DiceBoard::default();
        board.show_layout(2, GridDimensions::new(2, 1));
        assert!(!board.is_rolling());
        board.show_die_state(
            DieId(1),
            DieVisualState {
                rolling: true,
                ..Default::default()
            },
        );
        assert!(board.is_rolling());
    }
}
