use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

pub const MIN_DICE: usize = 1;
pub const MAX_DICE: usize = 8;
pub const FACES: u8 = 6;

/// A stable handle for one die in the session, equal to its position in the
/// results list. Renderers map it to whatever widget or cell shows the die.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Ord,
    Eq,
    Hash,
    From,
    Into,
    Display,
    Serialize,
    Deserialize,
)]
#[display("#{}", _0 + 1)]
pub struct DieId(pub usize);

impl DieId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The value showing on top of a six-sided die. Always within `1..=6`.
#[derive(
    Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
#[display("{_0}")]
pub struct Face(u8);

impl Face {
    pub const ONE: Face = Face(1);

    pub const ALL: [Face; FACES as usize] = [Face(1), Face(2), Face(3), Face(4), Face(5), Face(6)];

    pub fn new(value: u8) -> Option<Self> {
        (1..=FACES).contains(&value).then_some(Face(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn symbol(self, symbols: FaceSymbols) -> &'static str {
        symbols.table()[usize::from(self.0 - 1)]
    }
}

impl Default for Face {
    fn default() -> Self {
        Face::ONE
    }
}

impl TryFrom<u8> for Face {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Face::new(value).ok_or_else(|| format!("die face must be between 1 and {FACES}, got {value}"))
    }
}

impl From<Face> for u8 {
    fn from(face: Face) -> Self {
        face.0
    }
}

/// Glyph set used to draw faces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceSymbols {
    #[default]
    Unicode,
    Ascii,
}

impl FaceSymbols {
    const UNICODE: [&'static str; 6] = ["⚀", "⚁", "⚂", "⚃", "⚄", "⚅"];
    const ASCII: [&'static str; 6] = ["1", "2", "3", "4", "5", "6"];

    pub fn for_terminal(emoji_support: bool) -> Self {
        if emoji_support {
            FaceSymbols::Unicode
        } else {
            FaceSymbols::Ascii
        }
    }

    fn table(self) -> &'static [&'static str; 6] {
        match self {
            FaceSymbols::Unicode => &Self::UNICODE,
            FaceSymbols::Ascii => &Self::ASCII,
        }
    }
}
