use derive_more::IntoIterator;
use serde::{Deserialize, Serialize};

use crate::rules::dice::{DieId, Face};

/// A change represents a ***single*** field of the dice session moving from one value to another.
///
/// Every mutating session operation reports what it touched as an ordered list of changes, so
/// a renderer can update exactly the affected cells instead of watching the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Change {
    DiceCount { from: usize, to: usize },
    Face { die: DieId, from: Face, to: Face },
    Lock { die: DieId, locked: bool },
    Selection { from: DieId, to: DieId },
    Rolling(bool),
    RollCount { from: u64, to: u64 },
}

impl Change {
    pub fn emoji(&self) -> &'static str {
        match self {
            Change::DiceCount { from, to } => {
                if to >= from {
                    "➕"
                } else {
                    "➖"
                }
            }
            Change::Face { .. } => "🎲",
            Change::Lock { locked, .. } => {
                if *locked {
                    "🔒"
                } else {
                    "🔓"
                }
            }
            Change::Selection { .. } => "👉",
            Change::Rolling(true) => "🌀",
            Change::Rolling(false) => "🏁",
            Change::RollCount { .. } => "🔢",
        }
    }

    #[allow(clippy::match_like_matches_macro)]
    pub fn is_quiet(&self) -> bool {
        match self {
            Change::Selection { .. } => true,
            _ => false,
        }
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        match self {
            Change::DiceCount { from, to } => write!(f, "dice count {from} -> {to}"),
            Change::Face { die, from, to } => write!(f, "die {die} {from} -> {to}"),
            Change::Lock { die, locked } => {
                write!(f, "die {die} {}", if *locked { "locked" } else { "unlocked" })
            }
            Change::Selection { from, to } => write!(f, "selection {from} -> {to}"),
            Change::Rolling(true) => write!(f, "roll started"),
            Change::Rolling(false) => write!(f, "roll finished"),
            Change::RollCount { from, to } => write!(f, "roll count {from} -> {to}"),
        }
    }
}

/// The ordered set of changes produced by one session operation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, IntoIterator)]
#[serde(transparent)]
pub struct Delta {
    #[into_iterator(owned, ref)]
    changes: Vec<Change>,
}

impl Delta {
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    pub fn changes_dice_count(&self) -> bool {
        self.iter().any(|c| matches!(c, Change::DiceCount { .. }))
    }

    pub fn changes_faces(&self) -> bool {
        self.iter().any(|c| matches!(c, Change::Face { .. }))
    }
}

impl FromIterator<Change> for Delta {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}
