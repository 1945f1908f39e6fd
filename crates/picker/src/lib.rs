//! Colour grids and the three-round narrowing session behind the picker.
//!
//! A [`NarrowingSession`] starts on a coarse grid spanning the whole RGB
//! cube. Each pick re-centres a tighter grid on the chosen colour until the
//! third pick, which records the final colour and starts over.

pub mod color;
pub mod error;
pub mod grid;
pub mod session;

pub use color::{clamp_channel, Color, ColorParseError, TextColors};
pub use error::PickerError;
pub use grid::{Cell, Grid, GridConfig, GridGenerator, Layout, Stage};
pub use session::{NarrowingSession, Selection, SelectionOutcome};
pub use shared::domain::Round;
