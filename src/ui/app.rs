use std::collections::HashSet;
use std::io;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use tracing::debug;

use crate::ai::SearchOutcome;
use crate::config::AppConfig;
use crate::game::{GameController, GameEvent, StatusUpdate};

use super::game_view::{self, View};

pub struct App {
    game: GameController,
    events: mpsc::Receiver<GameEvent>,
    /// Result channel of the search running on a worker thread
    pending: Option<mpsc::Receiver<SearchOutcome>>,
    selected_column: usize,
    markers: HashSet<(usize, usize)>,
    should_quit: bool,
    message: Option<String>,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let game = config.build_controller(tx);
        let selected_column = game.board().cols() / 2;
        let mut app = App {
            game,
            events: rx,
            pending: None,
            selected_column,
            markers: HashSet::new(),
            should_quit: false,
            message: None,
        };
        app.drain_events();
        app
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            self.poll_search();
            self.start_search();
            self.drain_events();

            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Hand the computer's turn to a worker thread
    fn start_search(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(job) = self.game.search_job() else {
            return;
        };
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            // The receiver is gone if the user undid or restarted meanwhile
            let _ = tx.send(job.run());
        });
        self.pending = Some(rx);
    }

    fn poll_search(&mut self) {
        let Some(rx) = &self.pending else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                if let Err(err) = self.game.apply_search(&outcome) {
                    debug!(%err, "discarded search result");
                }
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => self.pending = None,
        }
    }

    /// Fold engine events into the markers and the status line
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                GameEvent::Board(update) => {
                    if update.marker {
                        self.markers.insert((update.column, update.row));
                    } else {
                        self.markers.remove(&(update.column, update.row));
                    }
                }
                GameEvent::Status(status) => {
                    if let StatusUpdate::Started(_) = status {
                        self.markers.clear();
                    }
                    self.message = self.status_text(status);
                }
            }
        }
    }

    fn status_text(&self, status: StatusUpdate) -> Option<String> {
        match status {
            StatusUpdate::Started(piece) => self
                .game
                .player(piece)
                .map(|player| format!("{} starts", player.name())),
            StatusUpdate::Won(piece) => Some(format!("{piece} wins!")),
            StatusUpdate::Draw => Some("It's a draw!".to_string()),
            StatusUpdate::Illegal(err) => Some(format!("Illegal move: {err}")),
            StatusUpdate::WillWin(piece) => Some(format!("{piece}: I will win!")),
            StatusUpdate::MayLose(piece) => Some(format!("{piece}: Uups ...")),
            StatusUpdate::Cleared => None,
        }
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.selected_column + 1 < self.game.board().cols() {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.message = None;
                // Refusals come back as an Illegal status event
                let _ = self.game.human_move(self.selected_column);
            }
            KeyCode::Char('h') => {
                if self.pending.is_none() {
                    let piece = self.game.current_player().piece();
                    if let Some(col) = self.game.compute_best_move(piece) {
                        self.selected_column = col;
                        self.message = Some(format!("Hint: column {}", col + 1));
                    }
                }
            }
            KeyCode::Char('u') => {
                self.pending = None;
                self.game.undo();
            }
            KeyCode::Char('n') | KeyCode::Char('r') => {
                self.pending = None;
                self.game.new_game();
                self.selected_column = self.game.board().cols() / 2;
            }
            _ => {}
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        game_view::render(
            frame,
            &View {
                game: &self.game,
                selected_column: self.selected_column,
                markers: &self.markers,
                message: self.message.as_deref(),
                thinking: self.pending.is_some(),
            },
        );
    }
}
