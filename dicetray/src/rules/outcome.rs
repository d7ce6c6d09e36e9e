use serde::{Deserialize, Serialize};

use crate::simulation::transition::Delta;

/// A benign refusal: the request was understood but there is nothing to do.
/// The session is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    CapacityReached,
    MinimumReached,
    NoDiceToRoll,
    AllDiceLocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied(Delta),
    Rejected(Rejection),
}

impl Outcome {
    pub fn delta(&self) -> Option<&Delta> {
        match self {
            Outcome::Applied(delta) => Some(delta),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Rejected(rejection) => Some(*rejection),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }
}
