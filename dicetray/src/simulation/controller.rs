use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::{
    error::DiceError,
    rules::{
        dice::{DieId, Face, FaceSymbols, MAX_DICE, MIN_DICE},
        layout::layout_for,
        outcome::{Outcome, Rejection},
    },
    simulation::{
        animation::{AnimationCoordinator, FrameSink, NoFrames, SpinFrame},
        session::{DiceSession, Direction, RollStart, RollTicket},
        surface::{
            DieVisualState, Notice, NoticeEvent, NotificationSink, RenderingSurface,
            TerminalCapabilities,
        },
        transition::{Change, Delta},
    },
    statistics::{
        frequencies::format_frequencies, roller::Roller, validation::validate_history,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    AddDie,
    RemoveDie,
    SetCount(usize),
    Select(Direction),
    ToggleLock,
    LockAll,
    UnlockAll,
    Reset,
    Roll,
    Validate,
    Quit,
}

pub type FaceMap = BTreeMap<DieId, Face>;

/// Owns the dice session and keeps a renderer and a notification sink in step
/// with it.
pub struct Controller<R, N> {
    session: DiceSession,
    coordinator: AnimationCoordinator,
    roller: Roller,
    symbols: FaceSymbols,
    surface: R,
    notices: N,
}

impl<R: RenderingSurface, N: NotificationSink> Controller<R, N> {
    pub fn new(roller: Roller, coordinator: AnimationCoordinator, surface: R, notices: N) -> Self {
        Self {
            session: DiceSession::new(),
            coordinator,
            roller,
            symbols: FaceSymbols::default(),
            surface,
            notices,
        }
    }

    pub fn session(&self) -> &DiceSession {
        &self.session
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn notices(&self) -> &N {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut N {
        &mut self.notices
    }

    pub fn symbols(&self) -> FaceSymbols {
        self.symbols
    }

    /// Picks a glyph set for the terminal, reports any advisories and draws
    /// the initial board.
    pub fn startup(&mut self, capabilities: &TerminalCapabilities, symbols: FaceSymbols) {
        self.symbols = if capabilities.emoji_support {
            symbols
        } else {
            FaceSymbols::Ascii
        };
        for notice in capabilities.advisories() {
            log::warn!("{}", notice.message);
            self.notices.notify(notice);
        }
        self.render_all();
    }

    /// Applies a command. Returns a ticket when a roll was started; the caller
    /// is then responsible for animating it and calling [`Controller::complete_roll`].
    pub fn handle(&mut self, command: Command) -> Option<RollTicket> {
        let result = match command {
            Command::AddDie => self.session.add_die(),
            Command::RemoveDie => self.session.remove_die(),
            Command::SetCount(n) => self.session.set_dice_count(n),
            Command::Select(direction) => self.session.select_die(direction),
            Command::ToggleLock => self.session.toggle_lock(),
            Command::LockAll => self.session.lock_all(),
            Command::UnlockAll => self.session.unlock_all(),
            Command::Reset => self.session.reset(),
            Command::Roll => return self.begin_roll(),
            Command::Validate => {
                self.validate();
                return None;
            }
            Command::Quit => return None,
        };

        match result {
            Ok(Outcome::Applied(delta)) => {
                self.render(&delta);
                self.announce(command, &delta);
            }
            Ok(Outcome::Rejected(rejection)) => self.reject(rejection),
            Err(e) => self.fail(e),
        }
        None
    }

    fn begin_roll(&mut self) -> Option<RollTicket> {
        match self.session.begin_roll() {
            Ok(RollStart::Started(ticket, delta)) => {
                self.render(&delta);
                self.notices
                    .notify(Notice::info(NoticeEvent::RollStarted, "Rolling dice..."));
                Some(ticket)
            }
            Ok(RollStart::Rejected(rejection)) => {
                self.reject(rejection);
                None
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    /// Starts the spin animation for `ticket` on the tokio runtime, with its own
    /// fork of the random source.
    pub fn spawn_animation(
        &mut self,
        ticket: &RollTicket,
        frames: Arc<dyn FrameSink>,
    ) -> JoinHandle<Result<FaceMap, DiceError>> {
        let coordinator = self.coordinator;
        let mut roller = self.roller.fork();
        let dice = ticket.dice().to_vec();
        tokio::spawn(async move { coordinator.animate_all(&dice, &mut roller, frames).await })
    }

    /// Shows a cosmetic face on a spinning die.
    pub fn spin_frame(&mut self, frame: SpinFrame) {
        if self.session.is_rolling() && !self.session.is_locked(frame.die) {
            self.surface
                .show_face(frame.die, frame.face.symbol(self.symbols));
        }
    }

    /// Commits (or discards) the animation result for `ticket` and redraws.
    pub fn complete_roll(&mut self, ticket: RollTicket, faces: Result<FaceMap, DiceError>) {
        let rolled: Vec<DieId> = ticket.dice().to_vec();
        match self.session.finish_roll(ticket, faces) {
            Ok(delta) => {
                self.render(&delta);
                let message = format!(
                    "Roll #{} results: {}",
                    self.session.roll_count(),
                    self.session.sum()
                );
                self.notices
                    .notify(Notice::info(NoticeEvent::RollSummary, message));
            }
            Err(e) => {
                // spinning dice showed random faces; put the real ones back
                for die in rolled {
                    if let Some(face) = self.session.face(die) {
                        self.surface.show_face(die, face.symbol(self.symbols));
                    }
                }
                self.render_flags(self.session.dice());
                self.fail(e);
            }
        }
    }

    /// Runs a whole roll without frame output.
    pub async fn roll(&mut self) {
        if let Some(ticket) = self.begin_roll() {
            let faces = self
                .coordinator
                .animate_all(ticket.dice(), &mut self.roller, Arc::new(NoFrames))
                .await;
            self.complete_roll(ticket, faces);
        }
    }

    fn validate(&mut self) {
        match validate_history(self.session.history()) {
            Ok(report) => {
                let notice = if report.is_valid {
                    Notice::info(NoticeEvent::Validation, report.summary())
                } else {
                    Notice::warning(NoticeEvent::Validation, report.summary())
                };
                log::info!("{}", report.summary());
                self.notices.notify(notice);
            }
            Err(e) => {
                log::error!("Validation failed: {}", e);
                self.notices.notify(Notice::error(
                    NoticeEvent::Validation,
                    format!("Validation failed: {e}"),
                ));
            }
        }
    }

    fn announce(&mut self, command: Command, delta: &Delta) {
        if delta.is_empty() {
            return;
        }
        let count = self.session.dice_count();
        let notice = match command {
            Command::AddDie => Notice::info(NoticeEvent::DieAdded, format!("Added die. Now {count}.")),
            Command::RemoveDie => {
                Notice::info(NoticeEvent::DieRemoved, format!("Removed die. Now {count}."))
            }
            Command::SetCount(_) => {
                Notice::info(NoticeEvent::CountSet, format!("Set dice count to {count}."))
            }
            Command::Reset => Notice::info(NoticeEvent::Reset, "Dice and session stats reset."),
            _ => return,
        };
        self.notices.notify(notice);
    }

    fn reject(&mut self, rejection: Rejection) {
        let notice = match rejection {
            Rejection::CapacityReached => Notice::warning(
                NoticeEvent::CapacityReached,
                format!("Maximum {MAX_DICE} dice allowed."),
            ),
            Rejection::MinimumReached => Notice::warning(
                NoticeEvent::MinimumReached,
                format!("Minimum {MIN_DICE} die required."),
            ),
            Rejection::NoDiceToRoll => {
                Notice::warning(NoticeEvent::NoDiceToRoll, "No dice to roll.")
            }
            Rejection::AllDiceLocked => Notice::warning(
                NoticeEvent::AllDiceLocked,
                "All dice are locked. Unlock a die to roll.",
            ),
        };
        log::warn!("{}", notice.message);
        self.notices.notify(notice);
    }

    fn fail(&mut self, error: DiceError) {
        let notice = match &error {
            DiceError::OutOfRange(_) => Notice::error(
                NoticeEvent::OutOfRange,
                format!("Dice count must be between {MIN_DICE} and {MAX_DICE}."),
            ),
            DiceError::ConcurrentOperationRejected => Notice::warning(
                NoticeEvent::RollBusy,
                "Wait for the dice to stop rolling.",
            ),
            DiceError::AnimationFailure(_) | DiceError::StaleRollTicket => {
                log::error!("{}", error);
                Notice::error(NoticeEvent::AnimationFailure, format!("Roll failed: {error}"))
            }
            DiceError::InvalidDiceCount(_) => {
                log::error!("{}", error);
                Notice::error(NoticeEvent::OutOfRange, error.to_string())
            }
        };
        self.notices.notify(notice);
    }

    fn render(&mut self, delta: &Delta) {
        if delta.changes_dice_count() {
            self.render_all();
            return;
        }

        let mut dirty = BTreeSet::new();
        let mut all_dirty = false;
        for change in delta {
            match *change {
                Change::Face { die, to, .. } => {
                    self.surface.show_face(die, to.symbol(self.symbols));
                }
                Change::Lock { die, .. } => {
                    dirty.insert(die);
                }
                Change::Selection { from, to } => {
                    dirty.insert(from);
                    dirty.insert(to);
                }
                Change::Rolling(_) => all_dirty = true,
                Change::RollCount { to, .. } => self.surface.show_roll_count(to),
                Change::DiceCount { .. } => {}
            }
        }

        if delta.changes_faces() {
            self.render_stats();
        }
        if all_dirty {
            self.render_flags(self.session.dice());
        } else {
            self.render_flags(dirty.into_iter());
        }
        self.render_status();
    }

    fn render_all(&mut self) {
        let count = self.session.dice_count();
        // count is always within MIN_DICE..=MAX_DICE, which every layout covers
        let grid = layout_for(count).unwrap_or_default();
        self.surface.show_layout(count, grid);
        for die in self.session.dice() {
            if let Some(face) = self.session.face(die) {
                self.surface.show_face(die, face.symbol(self.symbols));
            }
        }
        self.render_flags(self.session.dice());
        self.render_stats();
        self.surface.show_roll_count(self.session.roll_count());
        self.render_status();
    }

    fn render_flags(&mut self, dice: impl Iterator<Item = DieId>) {
        for die in dice {
            if die.index() >= self.session.dice_count() {
                continue;
            }
            let locked = self.session.is_locked(die);
            let state = DieVisualState {
                selected: self.session.selected() == die,
                locked,
                rolling: self.session.is_rolling() && !locked,
            };
            self.surface.show_die_state(die, state);
        }
    }

    fn render_stats(&mut self) {
        self.surface.show_sum(self.session.sum());
        let text = format_frequencies(&self.session.frequencies(), self.symbols);
        self.surface.show_frequencies(&text);
    }

    fn render_status(&mut self) {
        let count = self.session.dice_count();
        let status = format!(
            "{count} {} | Sum: {} | Roll #{}",
            if count == 1 { "die" } else { "dice" },
            self.session.sum(),
            self.session.roll_count()
        );
        self.surface.show_status(&status);
    }
}
