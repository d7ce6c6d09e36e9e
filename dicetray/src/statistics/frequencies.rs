use serde::{Deserialize, Serialize};

use crate::rules::dice::{FACES, Face, FaceSymbols};

pub const NO_RESULTS: &str = "No results yet";

/// How many times each face appears in a set of results. Every face is
/// present, including those with a count of zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frequencies {
    counts: [usize; FACES as usize],
}

impl Frequencies {
    pub fn get(&self, face: Face) -> usize {
        self.counts[usize::from(face.value() - 1)]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Face, usize)> + '_ {
        Face::ALL.into_iter().zip(self.counts.iter().copied())
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn record(&mut self, face: Face) {
        self.counts[usize::from(face.value() - 1)] += 1;
    }
}

impl FromIterator<Face> for Frequencies {
    fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> Self {
        let mut freq = Frequencies::default();
        for face in iter {
            freq.record(face);
        }
        freq
    }
}

pub fn compute_sum(results: &[Face]) -> u32 {
    results.iter().map(|f| u32::from(f.value())).sum()
}

pub fn compute_frequencies(results: &[Face]) -> Frequencies {
    results.iter().copied().collect()
}

/// Renders e.g. `1x⚀ | 2x⚁ | 1x⚅`, listing only faces that occurred.
pub fn format_frequencies(freq: &Frequencies, symbols: FaceSymbols) -> String {
    let parts: Vec<String> = freq
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(face, count)| format!("{count}x{}", face.symbol(symbols)))
        .collect();
    if parts.is_empty() {
        NO_RESULTS.to_string()
    } else {
        parts.join(" | ")
    }
}
