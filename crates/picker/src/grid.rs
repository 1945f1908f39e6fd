use serde::{Deserialize, Serialize};
use shared::domain::Round;

use crate::{color::Color, error::PickerError};

pub const DEFAULT_LEVELS: [u16; 3] = [8, 8, 4];

/// Distinct values of one colour channel.
const CHANNEL_VALUES: u64 = 256;

/// Grid geometry per round.
///
/// `levels[r]` is the number of values sampled per channel in round `r`, so
/// that round's grid holds `levels[r]³` colours. Every cell stands for a bin
/// of channel values one step wide, and each round splits the bin picked in
/// the round before into `levels[r]` equal steps. The levels must multiply
/// to 256 so the last round's step is 1 and every colour can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    pub levels: [u16; 3],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), PickerError> {
        if let Some((round, levels)) = Round::ALL
            .into_iter()
            .zip(self.levels)
            .find(|&(_, levels)| levels == 0)
        {
            return Err(PickerError::InvalidConfig(format!(
                "{round:?} grid needs at least 1 level per channel, got {levels}"
            )));
        }
        if self.levels.windows(2).any(|pair| pair[0] < pair[1]) {
            return Err(PickerError::InvalidConfig(format!(
                "grids must not grow from round to round, got levels {:?}",
                self.levels
            )));
        }
        let product: u64 = self.levels.iter().map(|&l| u64::from(l)).product();
        if product != CHANNEL_VALUES {
            return Err(PickerError::InvalidConfig(format!(
                "levels {:?} multiply to {product}, not {CHANNEL_VALUES}: some channel values would be unreachable",
                self.levels
            )));
        }
        Ok(())
    }

    pub fn levels(&self, round: Round) -> u16 {
        self.levels[round.index()]
    }

    pub fn grid_size(&self, round: Round) -> usize {
        usize::from(self.levels(round)).pow(3)
    }

    /// Width of the bin each cell of `round` stands for.
    pub fn step(&self, round: Round) -> u16 {
        let divisor: u64 = self.levels[..=round.index()]
            .iter()
            .map(|&l| u64::from(l.max(1)))
            .product();
        u16::try_from((CHANNEL_VALUES / divisor).max(1)).unwrap_or(u16::MAX)
    }

    /// Per-channel spread around the centre; `None` for the full-space round.
    pub fn radius(&self, round: Round) -> Option<u16> {
        let previous = Round::from_index(round.index().checked_sub(1)?)?;
        Some(self.step(previous) / 2)
    }
}

/// A round together with the colour its grid is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Coarse,
    Near(Color),
    VeryNear(Color),
}

impl Stage {
    /// Fails fast on round indices outside `0..=2` and on a neighbourhood
    /// round without a centre. The centre is ignored for round 0.
    pub fn from_parts(round: usize, center: Option<Color>) -> Result<Self, PickerError> {
        let round = Round::from_index(round).ok_or(PickerError::InvalidRound(round))?;
        match (round, center) {
            (Round::Coarse, _) => Ok(Stage::Coarse),
            (Round::Medium, Some(center)) => Ok(Stage::Near(center)),
            (Round::Fine, Some(center)) => Ok(Stage::VeryNear(center)),
            (round, None) => Err(PickerError::MissingCenter(round)),
        }
    }

    pub fn round(self) -> Round {
        match self {
            Stage::Coarse => Round::Coarse,
            Stage::Near(_) => Round::Medium,
            Stage::VeryNear(_) => Round::Fine,
        }
    }

    pub fn center(self) -> Option<Color> {
        match self {
            Stage::Coarse => None,
            Stage::Near(center) | Stage::VeryNear(center) => Some(center),
        }
    }

    /// The stage a pick of `color` leads to, or `None` once the fine round is done.
    pub fn after_pick(self, color: Color) -> Option<Stage> {
        match self {
            Stage::Coarse => Some(Stage::Near(color)),
            Stage::Near(_) => Some(Stage::VeryNear(color)),
            Stage::VeryNear(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub rows: usize,
    pub columns: usize,
}

impl Layout {
    /// Screens are wider than tall, so there are at least as many columns as rows.
    pub fn for_cells(cells: usize) -> Self {
        if cells.is_power_of_two() {
            let log2 = cells.trailing_zeros();
            return Self {
                rows: 1 << (log2 / 2),
                columns: 1 << (log2 - log2 / 2),
            };
        }
        let mut columns = 1;
        while columns * columns < cells {
            columns += 1;
        }
        Self {
            rows: cells.div_ceil(columns),
            columns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    stage: Stage,
    colors: Vec<Color>,
    layout: Layout,
    step: u16,
}

impl Grid {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn round(&self) -> Round {
        self.stage.round()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    pub fn position(&self, color: Color) -> Option<usize> {
        self.colors.iter().position(|c| *c == color)
    }

    pub fn contains(&self, color: Color) -> bool {
        self.position(color).is_some()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Nominal distance between neighbouring channel values in this grid.
    pub fn step(&self) -> u16 {
        self.step
    }

    pub fn first(&self) -> Option<Color> {
        self.colors.first().copied()
    }

    pub fn last(&self) -> Option<Color> {
        self.colors.last().copied()
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let columns = self.layout.columns;
        self.colors.iter().enumerate().map(move |(index, &color)| Cell {
            index,
            row: index / columns,
            column: index % columns,
            color,
        })
    }
}

#[derive(Debug, Clone)]
pub struct GridGenerator {
    config: GridConfig,
}

impl GridGenerator {
    pub fn new(config: GridConfig) -> Result<Self, PickerError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn generate_for(&self, round: usize, center: Option<Color>) -> Result<Grid, PickerError> {
        Ok(self.generate(Stage::from_parts(round, center)?))
    }

    pub fn generate(&self, stage: Stage) -> Grid {
        let round = stage.round();
        let levels = self.config.levels(round);
        let step = self.config.step(round);
        let mut colors = match (stage.center(), self.config.radius(round)) {
            (Some(center), Some(radius)) => {
                let offsets = bin_offsets(levels, step, radius);
                lattice(&offsets, |dr, dg, db| center.offset(dr, dg, db))
            }
            _ => lattice(&bin_offsets(levels, step, 0), Color::from_channels),
        };
        colors.sort_by_cached_key(|c| c.palette_key());
        let layout = Layout::for_cells(colors.len());
        Grid {
            stage,
            colors,
            layout,
            step,
        }
    }
}

/// Midpoints of `levels` bins `step` wide, laid from `-radius` upwards.
///
/// For the full-space round `radius` is 0 and the midpoints span `0..=255`.
/// Around a centre they tile the bin the centre was picked from.
fn bin_offsets(levels: u16, step: u16, radius: u16) -> Vec<i32> {
    let (step, radius) = (i32::from(step), i32::from(radius));
    (0..i32::from(levels))
        .map(|i| -radius + step / 2 + step * i)
        .collect()
}

/// Every combination of `values` across the three channels; red varies fastest.
fn lattice(values: &[i32], make: impl Fn(i32, i32, i32) -> Color) -> Vec<Color> {
    let mut colors = Vec::with_capacity(values.len().pow(3));
    for &b in values {
        for &g in values {
            for &r in values {
                colors.push(make(r, g, b));
            }
        }
    }
    colors
}

#[cfg(test)]
#[path = "tests/grid_tests.rs"]
mod tests;
