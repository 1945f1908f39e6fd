use serde::{Deserialize, Serialize};

use crate::domain::{Round, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPreview {
    pub black_hex: String,
    pub white_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub hex: String,
    pub preview: TextPreview,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub round: Round,
    pub center_hex: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub first_hex: String,
    pub last_hex: String,
    pub step: u16,
    pub cells: Vec<CellView>,
    pub last_selected_hex: Option<String>,
    pub background_is_reversed: bool,
}

impl ViewModel {
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// A pick submitted by a client, either by grid position or by colour value.
/// A colour may name the round it was shown in; picks from an earlier round
/// are then refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectRequest {
    Index {
        index: usize,
    },
    Hex {
        hex: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        round: Option<Round>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub session_id: SessionId,
    pub view: ViewModel,
}
