pub mod error;
pub mod rules;
pub mod simulation;
pub mod statistics;

pub mod prelude {
    pub use crate::error::DiceError;
    pub use crate::rules::{
        dice::{DieId, FACES, Face, FaceSymbols, MAX_DICE, MIN_DICE},
        layout::{GridDimensions, layout_for},
        outcome::{Outcome, Rejection},
    };
    pub use crate::simulation::{
        animation::{AnimationCoordinator, AnimationTiming, FrameSink, NoFrames, SpinFrame},
        controller::{Command, Controller, FaceMap},
        logging::{RollLog, RollRecord},
        session::{DiceSession, Direction, RollStart, RollTicket},
        surface::{
            DieVisualState, Notice, NoticeEvent, NotificationSink, RenderingSurface, Severity,
            TerminalCapabilities,
        },
        transition::{Change, Delta},
    };
    pub use crate::statistics::{
        frequencies::{Frequencies, compute_frequencies, compute_sum, format_frequencies},
        roller::Roller,
        validation::{ValidationReport, validate_history},
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::prelude::*;

    #[tokio::test(start_paused = true)]
    async fn test_demo() -> anyhow::Result<()> {
        let mut session = DiceSession::new();
        let coordinator = AnimationCoordinator::default();
        let mut roller = Roller::test_rng();

        session.set_dice_count(5)?;
        session.select_die(Direction::Down)?;
        session.toggle_lock()?;

        for _ in 0..50 {
            let outcome = session
                .roll_unlocked(&coordinator, &mut roller, Arc::new(NoFrames))
                .await?;
            assert!(!outcome.is_rejected());
            assert!(session.invariants_hold());
        }

        assert_eq!(session.roll_count(), 50);
        assert_eq!(session.results()[3], Face::ONE);

        let freq = session.frequencies();
        println!(
            "Sum {} | {}",
            session.sum(),
            format_frequencies(&freq, FaceSymbols::Unicode)
        );

        let report = validate_history(session.history())?;
        println!("{}", report.summary());
        assert_eq!(report.samples, 200);

        Ok(())
    }
}
