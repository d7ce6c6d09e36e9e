use thiserror::Error;

use crate::rules::dice::{MAX_DICE, MIN_DICE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("dice count must be between {MIN_DICE} and {MAX_DICE}, got {0}")]
    OutOfRange(usize),
    #[error("no grid layout exists for {0} dice")]
    InvalidDiceCount(usize),
    #[error("a roll is already in progress")]
    ConcurrentOperationRejected,
    #[error("dice animation failed: {0}")]
    AnimationFailure(String),
    #[error("roll ticket does not belong to the roll in progress")]
    StaleRollTicket,
}

impl DiceError {
    pub fn animation(reason: impl std::fmt::Display) -> Self {
        DiceError::AnimationFailure(reason.to_string())
    }
}
