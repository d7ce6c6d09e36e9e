use serde::{Deserialize, Serialize};

use crate::rules::{dice::DieId, layout::GridDimensions};

pub const MIN_TERMINAL_WIDTH: u16 = 60;
pub const MIN_TERMINAL_HEIGHT: u16 = 20;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DieVisualState {
    pub selected: bool,
    pub locked: bool,
    pub rolling: bool,
}

/// Whatever draws the dice. The controller pushes updates into it and never
/// reads anything back.
#[allow(unused)]
pub trait RenderingSurface {
    fn show_layout(&mut self, dice_count: usize, grid: GridDimensions) {}
    fn show_face(&mut self, die: DieId, symbol: &'static str) {}
    fn show_die_state(&mut self, die: DieId, state: DieVisualState) {}
    fn show_sum(&mut self, sum: u32) {}
    fn show_frequencies(&mut self, text: &str) {}
    fn show_roll_count(&mut self, roll_count: u64) {}
    fn show_status(&mut self, status: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeEvent {
    DieAdded,
    DieRemoved,
    CountSet,
    CapacityReached,
    MinimumReached,
    OutOfRange,
    RollBusy,
    RollStarted,
    RollSummary,
    NoDiceToRoll,
    AllDiceLocked,
    AnimationFailure,
    Reset,
    Validation,
    TerminalTooSmall,
    EmojiUnsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub event: NoticeEvent,
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(event: NoticeEvent, message: impl Into<String>) -> Self {
        Self {
            event,
            severity: Severity::Information,
            message: message.into(),
        }
    }

    pub fn warning(event: NoticeEvent, message: impl Into<String>) -> Self {
        Self {
            event,
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(event: NoticeEvent, message: impl Into<String>) -> Self {
        Self {
            event,
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Fire-and-forget destination for short user-facing messages.
pub trait NotificationSink {
    fn notify(&mut self, notice: Notice);
}

impl NotificationSink for Vec<Notice> {
    fn notify(&mut self, notice: Notice) {
        self.push(notice);
    }
}

/// What the terminal can do, probed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerminalCapabilities {
    pub width: u16,
    pub height: u16,
    pub emoji_support: bool,
    pub color_support: bool,
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            emoji_support: false,
            color_support: false,
        }
    }
}

impl TerminalCapabilities {
    /// Startup warnings worth showing the user. Purely advisory.
    pub fn advisories(&self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if self.width < MIN_TERMINAL_WIDTH || self.height < MIN_TERMINAL_HEIGHT {
            notices.push(Notice::warning(
                NoticeEvent::TerminalTooSmall,
                format!(
                    "Terminal may be too small ({}x{}). Recommended minimum: {MIN_TERMINAL_WIDTH}x{MIN_TERMINAL_HEIGHT}.",
                    self.width, self.height
                ),
            ));
        }
        if !self.emoji_support {
            notices.push(Notice::info(
                NoticeEvent::EmojiUnsupported,
                "Dice faces unsupported by this terminal; showing digits instead.",
            ));
        }
        notices
    }
}
