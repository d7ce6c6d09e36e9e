use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use dicetray::prelude::*;
use futures::StreamExt;
use ratatui::{Terminal, backend::Backend};
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinHandle},
};

use crate::{keys, ui};

pub mod board;
pub mod toasts;

pub use board::{DiceBoard, DieCell};
pub use toasts::Toasts;

pub type DiceController = Controller<DiceBoard, Toasts>;

const TICK: Duration = Duration::from_millis(250);

struct InFlight {
    ticket: RollTicket,
    handle: JoinHandle<Result<FaceMap, DiceError>>,
}

enum Wake {
    Input(Option<std::io::Result<Event>>),
    Frame(SpinFrame),
    Finished(Result<Result<FaceMap, DiceError>, JoinError>),
    Tick,
}

pub struct App {
    pub controller: DiceController,
    pub color: bool,
    frames_tx: mpsc::UnboundedSender<SpinFrame>,
    frames_rx: mpsc::UnboundedReceiver<SpinFrame>,
    in_flight: Option<InFlight>,
    quit: bool,
}

impl App {
    pub fn new(
        roller: Roller,
        capabilities: &TerminalCapabilities,
        symbols: FaceSymbols,
        dice: usize,
    ) -> Self {
        let mut controller = Controller::new(
            roller,
            AnimationCoordinator::default(),
            DiceBoard::default(),
            Toasts::default(),
        );
        if dice != MIN_DICE {
            controller.handle(Command::SetCount(dice));
            // the initial count is not news
            controller.notices_mut().clear();
        }
        controller.startup(capabilities, symbols);

        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            color: capabilities.color_support,
            frames_tx,
            frames_rx,
            in_flight: None,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let Some(command) = keys::command_for(key) else {
            return;
        };
        log::debug!("Key {:?} -> {:?}", key.code, command);
        if command == Command::Quit {
            self.quit = true;
            return;
        }
        if let Some(ticket) = self.controller.handle(command) {
            let handle = self
                .controller
                .spawn_animation(&ticket, Arc::new(self.frames_tx.clone()));
            self.in_flight = Some(InFlight { ticket, handle });
        }
    }

    fn on_finished(&mut self, joined: Result<Result<FaceMap, DiceError>, JoinError>) {
        let Some(InFlight { ticket, .. }) = self.in_flight.take() else {
            return;
        };
        let faces = joined.unwrap_or_else(|e| Err(DiceError::animation(e)));
        // frames still queued belong to the roll being finished
        while let Ok(frame) = self.frames_rx.try_recv() {
            self.controller.spin_frame(frame);
        }
        self.controller.complete_roll(ticket, faces);
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let mut events = EventStream::new();
        let mut ticker = tokio::time::interval(TICK);

        while !self.should_quit() {
            terminal.draw(|f| ui::draw(f, self))?;

            let rolling = self.in_flight.is_some();
            let wake = tokio::select! {
                event = events.next() => Wake::Input(event),
                Some(frame) = self.frames_rx.recv() => Wake::Frame(frame),
                joined = join(&mut self.in_flight), if rolling => Wake::Finished(joined),
                _ = ticker.tick() => Wake::Tick,
            };

            match wake {
                Wake::Input(None) => {
                    log::info!("Input stream closed");
                    self.quit = true;
                }
                Wake::Input(Some(event)) => match event? {
                    Event::Key(key) => self.on_key(key),
                    Event::Resize(width, height) => {
                        log::debug!("Resized to {width}x{height}");
                    }
                    _ => {}
                },
                Wake::Frame(frame) => self.controller.spin_frame(frame),
                Wake::Finished(joined) => self.on_finished(joined),
                Wake::Tick => {
                    self.controller.notices_mut().expire(Instant::now());
                }
            }
        }

        if let Some(in_flight) = self.in_flight.take() {
            log::warn!("Quit during roll; discarding animation");
            in_flight.handle.abort();
        }
        Ok(())
    }
}

async fn join(
    in_flight: &mut Option<InFlight>,
) -> Result<Result<FaceMap, DiceError>, JoinError> {
    match in_flight {
        Some(in_flight) => (&mut in_flight.handle).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    fn roomy() -> TerminalCapabilities {
        TerminalCapabilities {
            width: 100,
            height: 30,
            emoji_support: true,
            color_support: true,
        }
    }

    fn press(app: &mut App, c: char) {
        app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    #[test]
    fn test_initial_dice_count() {
        let app = App::new(Roller::from_seed(42), &roomy(), FaceSymbols::Unicode, 4);
        assert_eq!(app.controller.session().dice_count(), 4);
        assert_eq!(app.controller.surface().cells.len(), 4);
        assert!(app.controller.notices().is_empty());
    }

    #[test]
    fn test_quit_key() {
        let mut app = App::new(Roller::from_seed(42), &roomy(), FaceSymbols::Unicode, 1);
        press(&mut app, 'q');
        assert!(app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_roll_through_app() {
        let mut app = App::new(Roller::from_seed(42), &roomy(), FaceSymbols::Unicode, 3);
        press(&mut app, 'r');
        assert!(app.in_flight.is_some());
        assert!(app.controller.surface().is_rolling());

        // a second roll is refused while the first spins
        press(&mut app, 'r');
        assert_eq!(app.controller.session().roll_count(), 0);

        let joined = join(&mut app.in_flight).await;
        app.on_finished(joined);

        assert!(app.in_flight.is_none());
        assert!(!app.controller.surface().is_rolling());
        assert_eq!(app.controller.session().roll_count(), 1);
        assert_eq!(
            app.controller.surface().sum,
            app.controller.session().sum()
        );
        let symbols: Vec<_> = app
            .controller
            .surface()
            .cells
            .iter()
            .map(|c| c.symbol)
            .collect();
        let expected: Vec<_> = app
            .controller
            .session()
            .results()
            .iter()
            .map(|f| f.symbol(FaceSymbols::Unicode))
            .collect();
        assert_eq!(symbols, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_animation_commits_nothing() {
        let mut app = App::new(Roller::from_seed(42), &roomy(), FaceSymbols::Unicode, 2);
        press(&mut app, 'r');
        if let Some(in_flight) = app.in_flight.as_ref() {
            in_flight.handle.abort();
        }
        let joined = join(&mut app.in_flight).await;
        assert!(joined.is_err());
        app.on_finished(joined);

        assert!(!app.controller.session().is_rolling());
        assert_eq!(app.controller.session().roll_count(), 0);
        let last = app.controller.notices().iter().last().unwrap();
        assert_eq!(last.event, NoticeEvent::AnimationFailure);
    }
}
