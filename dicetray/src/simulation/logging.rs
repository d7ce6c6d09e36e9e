use derive_more::IntoIterator;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

use crate::{
    rules::dice::{DieId, Face},
    simulation::transition::Change,
};

pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// One completed roll: which dice were thrown and the full board afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
    pub roll_number: u64,
    pub rolled: Vec<DieId>,
    pub results: Vec<Face>,
    pub sum: u32,
    pub at: Timestamp,
}

impl RollRecord {
    /// Faces of the dice that were actually thrown, skipping locked ones.
    pub fn rolled_faces(&self) -> impl Iterator<Item = Face> + '_ {
        self.rolled
            .iter()
            .filter_map(|die| self.results.get(die.index()).copied())
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "Roll #{}: [", self.roll_number)?;
        for (i, face) in self.results.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.rolled.contains(&DieId(i)) {
                write!(f, "{face}")?;
            } else {
                write!(f, "({face})")?;
            }
        }
        write!(f, "] = {}", self.sum)
    }
}

/// In-memory history of the session's completed rolls.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, IntoIterator)]
#[serde(transparent)]
pub struct RollLog {
    #[into_iterator(owned, ref)]
    entries: Vec<RollRecord>,
}

impl RollLog {
    pub fn log(&mut self, record: RollRecord) {
        let mut buf = format_emoji("🎲", 2);
        buf.push(' ');
        record.pretty_print(&mut buf).ok();
        log::info!("{}", buf);

        self.entries.push(record);
    }

    pub fn entries(&self) -> &[RollRecord] {
        &self.entries
    }

    pub fn last(&self) -> Option<&RollRecord> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &self)?;
        Ok(())
    }
}

/// Writes a non-quiet session change to the debug log.
pub fn log_change(change: &Change) {
    if change.is_quiet() {
        return;
    }
    let mut buf = format_emoji(change.emoji(), 2);
    buf.push(' ');
    change.pretty_print(&mut buf).ok();
    log::debug!("{}", buf);
}

fn emoji_emoji_presentation(s: &str) -> String {
    if s.chars().any(|c| c == '\u{FE0F}' || c == '\u{200D}') {
        s.to_string()
    } else {
        format!("{s}\u{FE0F}")
    }
}

fn pad_cells(s: &str, field_cells: usize) -> String {
    let w = s.width();
    let pad = field_cells.saturating_sub(w);
    format!("{s}{}", " ".repeat(pad))
}

pub(crate) fn format_emoji(emoji: &str, field_cells: usize) -> String {
    let e = emoji_emoji_presentation(emoji);
    pad_cells(&e, field_cells)
}
