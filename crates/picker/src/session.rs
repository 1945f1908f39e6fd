use shared::{
    domain::Round,
    protocol::{CellView, TextPreview, ViewModel},
};

use crate::{
    color::Color,
    error::PickerError,
    grid::{Grid, GridGenerator, Stage},
};

/// A pick, by position in the displayed grid or by colour value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Index(usize),
    Color(Color),
    /// A colour taken from the grid shown for `round`. Rejected once the
    /// session has moved past that round.
    Shown { round: Round, color: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The session moved on to a tighter grid centred on the pick.
    Narrowed { round: Round, center: Color },
    /// The fine round's pick was recorded and the session is back at round 0.
    Finalized(Color),
}

/// Per-user narrowing state.
///
/// The displayed grid is kept alongside the state so picks can be checked
/// against what the user was actually shown.
#[derive(Debug, Clone)]
pub struct NarrowingSession {
    grid: Grid,
    last_selected: Option<Color>,
    background_reversed: bool,
}

impl NarrowingSession {
    pub fn new(generator: &GridGenerator) -> Self {
        Self {
            grid: generator.generate(Stage::Coarse),
            last_selected: None,
            background_reversed: false,
        }
    }

    pub fn round(&self) -> Round {
        self.grid.round()
    }

    pub fn center(&self) -> Option<Color> {
        self.grid.stage().center()
    }

    pub fn last_selected(&self) -> Option<Color> {
        self.last_selected
    }

    pub fn background_is_reversed(&self) -> bool {
        self.background_reversed
    }

    pub fn current_grid(&self) -> &Grid {
        &self.grid
    }

    /// Applies a pick. A pick that is not in the displayed grid is rejected
    /// and leaves the session untouched.
    pub fn select(
        &mut self,
        generator: &GridGenerator,
        selection: Selection,
    ) -> Result<SelectionOutcome, PickerError> {
        let color = self.resolve(selection)?;
        match self.grid.stage().after_pick(color) {
            Some(next) => {
                self.grid = generator.generate(next);
                Ok(SelectionOutcome::Narrowed {
                    round: next.round(),
                    center: color,
                })
            }
            None => {
                self.last_selected = Some(color);
                self.grid = generator.generate(Stage::Coarse);
                Ok(SelectionOutcome::Finalized(color))
            }
        }
    }

    pub fn toggle_background(&mut self) -> bool {
        self.background_reversed = !self.background_reversed;
        self.background_reversed
    }

    pub fn render(&self) -> ViewModel {
        let grid = &self.grid;
        let layout = grid.layout();
        let cells = grid
            .cells()
            .map(|cell| {
                let text = cell.color.contrasting_text_colors();
                CellView {
                    index: cell.index,
                    row: cell.row,
                    column: cell.column,
                    hex: cell.color.to_hex(),
                    preview: TextPreview {
                        black_hex: text.black.to_hex(),
                        white_hex: text.white.to_hex(),
                    },
                }
            })
            .collect();
        ViewModel {
            round: grid.round(),
            center_hex: self.center().map(Color::to_hex),
            rows: layout.rows,
            columns: layout.columns,
            first_hex: grid.first().unwrap_or(Color::BLACK).to_hex(),
            last_hex: grid.last().unwrap_or(Color::WHITE).to_hex(),
            step: grid.step(),
            cells,
            last_selected_hex: self.last_selected.map(Color::to_hex),
            background_is_reversed: self.background_reversed,
        }
    }

    fn resolve(&self, selection: Selection) -> Result<Color, PickerError> {
        let found = match selection {
            Selection::Index(index) => self.grid.get(index),
            Selection::Color(color) => self.grid.contains(color).then_some(color),
            Selection::Shown { round, color } => {
                (round == self.round() && self.grid.contains(color)).then_some(color)
            }
        };
        found.ok_or_else(|| PickerError::InvalidSelection {
            selection: match selection {
                Selection::Index(index) => format!("cell {index}"),
                Selection::Color(color) => color.to_hex(),
                Selection::Shown { round, color } => format!("{color} from the {round:?} grid"),
            },
            round: self.round(),
        })
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
