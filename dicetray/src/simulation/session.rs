use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::DiceError,
    rules::{
        dice::{DieId, Face, MAX_DICE, MIN_DICE},
        layout::layout_for,
        outcome::{Outcome, Rejection},
    },
    simulation::{
        animation::{AnimationCoordinator, FrameSink},
        logging::{RollLog, RollRecord, log_change},
        transition::{Change, Delta},
    },
    statistics::{
        frequencies::{Frequencies, compute_frequencies, compute_sum},
        roller::Roller,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Proof that a roll was started. Handed back to [`DiceSession::finish_roll`]
/// together with the faces the animation produced.
#[derive(Debug, PartialEq, Eq)]
pub struct RollTicket {
    roll_number: u64,
    dice: Vec<DieId>,
}

impl RollTicket {
    /// The unlocked dice being thrown, in ascending order.
    pub fn dice(&self) -> &[DieId] {
        &self.dice
    }

    pub fn roll_number(&self) -> u64 {
        self.roll_number
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum RollStart {
    Started(RollTicket, Delta),
    Rejected(Rejection),
}

/// All dice state for one running app.
///
/// Every public operation either applies completely and reports a [`Delta`],
/// or leaves the session untouched. While a roll is in flight, everything
/// except reads and [`DiceSession::finish_roll`] is refused with
/// [`DiceError::ConcurrentOperationRejected`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceSession {
    dice_count: usize,
    results: Vec<Face>,
    locked: BTreeSet<DieId>,
    selected: DieId,
    rolling: bool,
    roll_count: u64,
    history: RollLog,
}

impl Default for DiceSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceSession {
    pub fn new() -> Self {
        Self {
            dice_count: MIN_DICE,
            results: vec![Face::ONE; MIN_DICE],
            locked: BTreeSet::new(),
            selected: DieId(0),
            rolling: false,
            roll_count: 0,
            history: RollLog::default(),
        }
    }

    pub fn dice_count(&self) -> usize {
        self.dice_count
    }

    pub fn results(&self) -> &[Face] {
        &self.results
    }

    pub fn face(&self, die: DieId) -> Option<Face> {
        self.results.get(die.index()).copied()
    }

    pub fn dice(&self) -> impl Iterator<Item = DieId> + use<> {
        (0..self.dice_count).map(DieId)
    }

    pub fn locked(&self) -> &BTreeSet<DieId> {
        &self.locked
    }

    pub fn is_locked(&self, die: DieId) -> bool {
        self.locked.contains(&die)
    }

    pub fn selected(&self) -> DieId {
        self.selected
    }

    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    pub fn roll_count(&self) -> u64 {
        self.roll_count
    }

    pub fn history(&self) -> &RollLog {
        &self.history
    }

    pub fn sum(&self) -> u32 {
        compute_sum(&self.results)
    }

    pub fn frequencies(&self) -> Frequencies {
        compute_frequencies(&self.results)
    }

    pub fn unlocked(&self) -> Vec<DieId> {
        self.dice().filter(|d| !self.locked.contains(d)).collect()
    }

    /// True when the documented session invariants hold.
    pub fn invariants_hold(&self) -> bool {
        (MIN_DICE..=MAX_DICE).contains(&self.dice_count)
            && self.results.len() == self.dice_count
            && self.locked.iter().all(|d| d.index() < self.dice_count)
            && self.selected.index() < self.dice_count
    }

    fn ensure_idle(&self) -> Result<(), DiceError> {
        if self.rolling {
            log::warn!("Rejected session change while a roll is in progress");
            return Err(DiceError::ConcurrentOperationRejected);
        }
        Ok(())
    }

    fn commit(delta: Delta) -> Outcome {
        Outcome::Applied(Self::logged(delta))
    }

    fn logged(delta: Delta) -> Delta {
        for change in delta.iter() {
            log_change(change);
        }
        delta
    }

    pub fn set_dice_count(&mut self, count: usize) -> Result<Outcome, DiceError> {
        self.ensure_idle()?;
        if !(MIN_DICE..=MAX_DICE).contains(&count) {
            return Err(DiceError::OutOfRange(count));
        }

        let mut delta = Delta::default();
        if count == self.dice_count {
            return Ok(Outcome::Applied(delta));
        }

        delta.push(Change::DiceCount {
            from: self.dice_count,
            to: count,
        });
        self.dice_count = count;
        self.results.resize(count, Face::ONE);

        let dropped: Vec<DieId> = self.locked.split_off(&DieId(count)).into_iter().collect();
        for die in dropped {
            delta.push(Change::Lock { die, locked: false });
        }

        let clamped = DieId(self.selected.index().min(count - 1));
        if clamped != self.selected {
            delta.push(Change::Selection {
                from: self.selected,
                to: clamped,
            });
            self.selected = clamped;
        }

        Ok(Self::commit(delta))
    }

    pub fn add_die(&mut self) -> Result<Outcome, DiceError> {
        self.ensure_idle()?;
        if self.dice_count >= MAX_DICE {
            return Ok(Outcome::Rejected(Rejection::CapacityReached));
        }
        self.set_dice_count(self.dice_count + 1)
    }

    pub fn remove_die(&mut self) -> Result<Outcome, DiceError> {
        self.ensure_idle()?;
        if self.dice_count <= MIN_DICE {
            return Ok(Outcome::Rejected(Rejection::MinimumReached));
        }
        self.set_dice_count(self.dice_count - 1)
    }

    /// Moves the selection around the on-screen grid, stopping at the first
    /// and last die rather than wrapping.
    pub fn select_die(&mut self, direction: Direction) -> Result<Outcome, DiceError> {
        self.ensure_idle()?;
        let mut delta = Delta::default();
        if self.dice_count == 0 {
            return Ok(Outcome::Applied(delta));
        }

        let columns = layout_for(self.dice_count)?.columns.max(1);
        let last = self.dice_count - 1;
        let current = self.selected.index();
        let next = match direction {
            Direction::Up => current.saturating_sub(columns),
            Direction::Down => (current + columns).min(last),
            Direction::Left => current.saturating_sub(1),
            Direction::Right => (current + 1).min(last),
        };

        if next != current {
            delta.push(Change::Selection {
                from: self.selected,
                to: DieId(next),
            });
            self.selected = DieId(next);
        }
        Ok(Self::commit(delta))
    }

    pub fn toggle_lock(&mut self) -> Result<Outcome, DiceError> {
        self.ensure_idle()?;
        let die = self.selected;
        let locked = if self.locked.remove(&die) {
            false
        } else {
            self.locked.insert(die);
            true
        };
        let delta = [Change::Lock { die, locked }].into_iter().collect();
        Ok(Self::commit(delta))
    }

    pub fn lock_all(&mut self) -> Result<Outcome, DiceError> {
        self.ensure_idle()?;
        let delta: Delta = self
            .dice()
            .filter(|die| self.locked.insert(*die))
            .map(|die| Change::Lock { die, locked: true })
            .collect();
        Ok(Self::commit(delta))
    }

    pub fn unlock_all(&mut self) -> Result<Outcome, DiceError> {
        self.ensure_idle()?;
        let delta: Delta = std::mem::take(&mut self.locked)
            .into_iter()
            .map(|die| Change::Lock { die, locked: false })
            .collect();
        Ok(Self::commit(delta))
    }

    /// Shows face 1 on every die, releases all locks and zeroes the roll
    /// counter and history. Dice count and selection are kept.
    pub fn reset(&mut self) -> Result<Outcome, DiceError> {
        self.ensure_idle()?;
        let mut delta = Delta::default();
        for (i, face) in self.results.iter_mut().enumerate() {
            if *face != Face::ONE {
                delta.push(Change::Face {
                    die: DieId(i),
                    from: *face,
                    to: Face::ONE,
                });
                *face = Face::ONE;
            }
        }
        for die in std::mem::take(&mut self.locked) {
            delta.push(Change::Lock { die, locked: false });
        }
        if self.roll_count != 0 {
            delta.push(Change::RollCount {
                from: self.roll_count,
                to: 0,
            });
            self.roll_count = 0;
        }
        self.history.clear();
        Ok(Self::commit(delta))
    }

    /// First half of a roll: checks there is something to throw and marks the
    /// session as rolling.
    pub fn begin_roll(&mut self) -> Result<RollStart, DiceError> {
        self.ensure_idle()?;
        if self.dice_count == 0 {
            return Ok(RollStart::Rejected(Rejection::NoDiceToRoll));
        }
        let dice = self.unlocked();
        if dice.is_empty() {
            return Ok(RollStart::Rejected(Rejection::AllDiceLocked));
        }

        self.rolling = true;
        let ticket = RollTicket {
            roll_number: self.roll_count + 1,
            dice,
        };
        let delta = [Change::Rolling(true)].into_iter().collect();
        log::debug!("Rolling {} dice", ticket.dice.len());
        Ok(RollStart::Started(ticket, delta))
    }

    /// Second half of a roll. On success, writes the new faces of the ticket's
    /// dice, bumps the roll counter by one and records the roll. On failure, or
    /// when `faces` does not cover exactly the ticket's dice, no result changes.
    /// Either way the session is idle afterwards. A started roll is never
    /// rejected, so success is always a delta.
    pub fn finish_roll(
        &mut self,
        ticket: RollTicket,
        faces: Result<BTreeMap<DieId, Face>, DiceError>,
    ) -> Result<Delta, DiceError> {
        if !self.rolling || ticket.roll_number != self.roll_count + 1 {
            return Err(DiceError::StaleRollTicket);
        }
        self.rolling = false;

        let faces = faces?;
        if !faces.keys().eq(ticket.dice.iter()) {
            return Err(DiceError::animation(format!(
                "expected faces for {} dice, got {}",
                ticket.dice.len(),
                faces.len()
            )));
        }

        let mut delta = Delta::default();
        for (&die, &to) in &faces {
            let from = self.results[die.index()];
            self.results[die.index()] = to;
            delta.push(Change::Face { die, from, to });
        }
        delta.push(Change::RollCount {
            from: self.roll_count,
            to: self.roll_count + 1,
        });
        self.roll_count += 1;
        delta.push(Change::Rolling(false));

        self.history.log(RollRecord {
            roll_number: self.roll_count,
            rolled: ticket.dice,
            results: self.results.clone(),
            sum: self.sum(),
            at: chrono::Utc::now(),
        });

        Ok(Self::logged(delta))
    }

    /// Throws every unlocked die: starts the roll, animates it to completion and
    /// commits the faces.
    pub async fn roll_unlocked(
        &mut self,
        coordinator: &AnimationCoordinator,
        roller: &mut Roller,
        frames: Arc<dyn FrameSink>,
    ) -> Result<Outcome, DiceError> {
        let ticket = match self.begin_roll()? {
            RollStart::Started(ticket, _) => ticket,
            RollStart::Rejected(rejection) => return Ok(Outcome::Rejected(rejection)),
        };
        let faces = coordinator.animate_all(ticket.dice(), roller, frames).await;
        self.finish_roll(ticket, faces).map(Outcome::Applied)
    }
}
