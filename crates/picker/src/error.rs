use shared::{
    domain::Round,
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

use crate::color::ColorParseError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickerError {
    #[error("round {0} is not a narrowing round (expected 0, 1 or 2)")]
    InvalidRound(usize),
    #[error("the {0:?} round needs a centre colour")]
    MissingCenter(Round),
    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),
    #[error("{selection} is not in the displayed {round:?} grid")]
    InvalidSelection { selection: String, round: Round },
    #[error("invalid grid configuration: {0}")]
    InvalidConfig(String),
}

impl From<PickerError> for ApiError {
    fn from(value: PickerError) -> Self {
        let code = match &value {
            PickerError::InvalidRound(_) | PickerError::MissingCenter(_) => ErrorCode::InvalidRound,
            PickerError::InvalidSelection { .. } => ErrorCode::InvalidSelection,
            PickerError::InvalidColor(_) | PickerError::InvalidConfig(_) => ErrorCode::Validation,
        };
        ApiError::new(code, value.to_string())
    }
}
