use std::{collections::BTreeMap, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, task::JoinSet};

use crate::{
    error::DiceError,
    rules::dice::{DieId, Face},
    statistics::roller::Roller,
};

/// A cosmetic face shown while a die spins. Says nothing about where the die lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpinFrame {
    pub die: DieId,
    pub face: Face,
}

/// Receives spin frames as they are produced. An error fails the die's animation,
/// and with it the whole roll.
pub trait FrameSink: Send + Sync {
    fn show(&self, frame: SpinFrame) -> anyhow::Result<()>;
}

/// Discards every frame, for headless rolls.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFrames;

impl FrameSink for NoFrames {
    fn show(&self, _frame: SpinFrame) -> anyhow::Result<()> {
        Ok(())
    }
}

impl FrameSink for mpsc::UnboundedSender<SpinFrame> {
    fn show(&self, frame: SpinFrame) -> anyhow::Result<()> {
        self.send(frame)
            .map_err(|_| anyhow::anyhow!("frame receiver for die {} dropped", frame.die))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationTiming {
    pub min_duration: Duration,
    pub max_duration: Duration,
    pub frame_interval: Duration,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            min_duration: Duration::from_millis(300),
            max_duration: Duration::from_millis(600),
            frame_interval: Duration::from_millis(50),
        }
    }
}

impl AnimationTiming {
    /// Number of frames shown over `duration`; never less than one.
    pub fn frame_count(&self, duration: Duration) -> u32 {
        if self.frame_interval.is_zero() {
            return 1;
        }
        let frames = duration.as_nanos() / self.frame_interval.as_nanos();
        u32::try_from(frames).unwrap_or(u32::MAX).max(1)
    }
}

/// Spins a set of dice concurrently and reports where each one lands.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnimationCoordinator {
    pub timing: AnimationTiming,
}

impl AnimationCoordinator {
    pub fn new(timing: AnimationTiming) -> Self {
        Self { timing }
    }

    /// Runs one task per die and waits for all of them. Each task draws its own
    /// duration and frames from a fork of `roller`, then draws the final face.
    ///
    /// If any die fails, the other tasks are aborted and awaited before the
    /// error is returned, so no face is ever reported for a failed roll.
    /// Must be called from within a tokio runtime.
    pub async fn animate_all(
        &self,
        dice: &[DieId],
        roller: &mut Roller,
        frames: Arc<dyn FrameSink>,
    ) -> Result<BTreeMap<DieId, Face>, DiceError> {
        let mut tasks = JoinSet::new();
        for &die in dice {
            let roller = roller.fork();
            let frames = Arc::clone(&frames);
            let timing = self.timing;
            tasks.spawn(async move { (die, spin(die, roller, timing, frames).await) });
        }

        let mut faces = BTreeMap::new();
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((die, Ok(face))) => {
                    faces.insert(die, face);
                }
                Ok((_, Err(e))) => {
                    failure = Some(e);
                    break;
                }
                Err(e) => {
                    failure = Some(DiceError::animation(format!("die task aborted: {e}")));
                    break;
                }
            }
        }

        if let Some(e) = failure {
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
            log::error!("Roll animation failed: {}", e);
            return Err(e);
        }

        Ok(faces)
    }
}

async fn spin(
    die: DieId,
    mut roller: Roller,
    timing: AnimationTiming,
    frames: Arc<dyn FrameSink>,
) -> Result<Face, DiceError> {
    let duration = roller
        .duration(timing.min_duration, timing.max_duration)
        .map_err(|e| DiceError::animation(format!("die {die}: {e}")))?;
    for _ in 0..timing.frame_count(duration) {
        let face = roller.face();
        frames
            .show(SpinFrame { die, face })
            .map_err(|e| DiceError::animation(format!("die {die}: {e}")))?;
        tokio::time::sleep(timing.frame_interval).await;
    }
    Ok(roller.face())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[derive(Default)]
    struct Recorder {
        frames: Mutex<Vec<SpinFrame>>,
    }

    impl FrameSink for Recorder {
        fn show(&self, frame: SpinFrame) -> anyhow::Result<()> {
            self.frames.lock().unwrap().push(frame);
            Ok(())
        }
    }

    struct FailFor {
        die: DieId,
        calls: AtomicUsize,
    }

    impl FrameSink for FailFor {
        fn show(&self, frame: SpinFrame) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if frame.die == self.die {
                anyhow::bail!("display for die {} is gone", frame.die);
            }
            Ok(())
        }
    }

    #[test]
    fn test_frame_count() {
        let timing = AnimationTiming::default();
        assert_eq!(timing.frame_count(Duration::from_millis(300)), 6);
        assert_eq!(timing.frame_count(Duration::from_millis(599)), 11);
        assert_eq!(timing.frame_count(Duration::from_millis(10)), 1);
        assert_eq!(timing.frame_count(Duration::ZERO), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animate_all_resolves_every_die() {
        let coordinator = AnimationCoordinator::default();
        let mut roller = Roller::test_rng();
        let dice = [DieId(0), DieId(2), DieId(5)];
        let recorder = Arc::new(Recorder::default());

        let faces = coordinator
            .animate_all(&dice, &mut roller, recorder.clone())
            .await
            .unwrap();

        assert_eq!(faces.keys().copied().collect::<Vec<_>>(), dice.to_vec());
        let frames = recorder.frames.lock().unwrap();
        for die in dice {
            let shown = frames.iter().filter(|f| f.die == die).count();
            assert!((6..=11).contains(&shown), "die {die} showed {shown} frames");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dice_spin_concurrently() {
        let coordinator = AnimationCoordinator::default();
        let mut roller = Roller::test_rng();
        let dice: Vec<DieId> = (0..8).map(DieId).collect();

        let start = tokio::time::Instant::now();
        coordinator
            .animate_all(&dice, &mut roller, Arc::new(NoFrames))
            .await
            .unwrap();

        // Sequential spinning would take at least 8 * 300ms.
        assert!(start.elapsed() < Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_all_or_nothing() {
        let coordinator = AnimationCoordinator::default();
        let mut roller = Roller::test_rng();
        let dice = [DieId(0), DieId(1), DieId(2)];
        let sink = Arc::new(FailFor {
            die: DieId(1),
            calls: AtomicUsize::new(0),
        });

        let result = coordinator
            .animate_all(&dice, &mut roller, sink.clone())
            .await;

        match result {
            Err(DiceError::AnimationFailure(reason)) => assert!(reason.contains("#2"), "{reason}"),
            other => panic!("expected animation failure, got {other:?}"),
        }

        // siblings were aborted and awaited: nothing keeps spinning afterwards
        let calls_at_return = sink.calls.load(Ordering::SeqCst);
        tokio::time::sleep(coordinator.timing.max_duration * 2).await;
        assert_eq!(sink.calls.load(Ordering::SeqCst), calls_at_return);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_duration_timing() {
        let timing = AnimationTiming {
            min_duration: Duration::from_millis(100),
            max_duration: Duration::from_millis(100),
            frame_interval: Duration::from_millis(25),
        };
        let coordinator = AnimationCoordinator::new(timing);
        let mut roller = Roller::test_rng();
        let dice = [DieId(0), DieId(1)];
        let recorder = Arc::new(Recorder::default());

        let start = tokio::time::Instant::now();
        let faces = coordinator
            .animate_all(&dice, &mut roller, recorder.clone())
            .await
            .unwrap();

        assert_eq!(faces.len(), 2);
        assert!(start.elapsed() < Duration::from_millis(150));
        let frames = recorder.frames.lock().unwrap();
        for die in dice {
            assert_eq!(frames.iter().filter(|f| f.die == die).count(), 4);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_sink_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let coordinator = AnimationCoordinator::default();
        let mut roller = Roller::test_rng();
        let result = coordinator
            .animate_all(&[DieId(0)], &mut roller, Arc::new(tx))
            .await;
        assert!(matches!(result, Err(DiceError::AnimationFailure(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_dice_is_empty_map() {
        let coordinator = AnimationCoordinator::default();
        let mut roller = Roller::test_rng();
        let faces = coordinator
            .animate_all(&[], &mut roller, Arc::new(NoFrames))
            .await
            .unwrap();
        assert!(faces.is_empty());
    }
}
