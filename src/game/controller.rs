use serde::Serialize;
use tracing::{debug, info};

use crate::ai::{evaluate, SearchEngine, SearchJob, SearchOutcome, Verdict};
use crate::error::MoveError;

use super::board::{Board, Piece};
use super::events::{BoardUpdate, GameEvent, GameListener, StatusUpdate};
use super::lines::{LineRegistry, LINE_LEN};
use super::player::Player;

/// Default depth used when a human asks for a move suggestion.
pub const DEFAULT_HINT_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    FirstWins,
    SecondWins,
    Draw,
}

impl GameStatus {
    fn won_by(piece: Piece) -> GameStatus {
        match piece {
            Piece::Red => GameStatus::FirstWins,
            _ => GameStatus::SecondWins,
        }
    }

    pub fn is_over(self) -> bool {
        self != GameStatus::InProgress
    }

    pub fn winner(self) -> Option<Piece> {
        match self {
            GameStatus::FirstWins => Some(Piece::Red),
            GameStatus::SecondWins => Some(Piece::Yellow),
            _ => None,
        }
    }
}

/// A committed move, kept on the undo stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    pub column: usize,
    pub row: usize,
    pub piece: Piece,
}

/// Owns one game: board, working lines, both players, turn and undo history.
///
/// Red (the first player) always starts. Every change is reported to the
/// listener as a [`GameEvent`].
pub struct GameController {
    board: Board,
    lines: LineRegistry,
    players: [Player; 2],
    current: usize,
    status: GameStatus,
    history: Vec<MoveRecord>,
    /// Bumped on every change of position; ties search results to the board they ran on
    generation: u64,
    engine: SearchEngine,
    hint_depth: usize,
    listener: Box<dyn GameListener>,
}

impl GameController {
    pub fn new(
        board: Board,
        red: Player,
        yellow: Player,
        listener: impl GameListener + 'static,
    ) -> Self {
        assert_eq!(red.piece(), Piece::Red, "first player must play Red");
        assert_eq!(yellow.piece(), Piece::Yellow, "second player must play Yellow");

        let lines = LineRegistry::new(board.cols(), board.rows());
        let engine = SearchEngine::new(board.cols());
        let mut controller = GameController {
            board,
            lines,
            players: [red, yellow],
            current: 0,
            status: GameStatus::InProgress,
            history: Vec::new(),
            generation: 0,
            engine,
            hint_depth: DEFAULT_HINT_DEPTH,
            listener: Box::new(listener),
        };
        controller.new_game();
        controller
    }

    pub fn with_engine(mut self, engine: SearchEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_hint_depth(mut self, depth: usize) -> Self {
        self.hint_depth = depth;
        self
    }

    /// Discard the current game and start over with Red to move.
    pub fn new_game(&mut self) {
        self.board = Board::new(self.board.cols(), self.board.rows());
        self.lines = LineRegistry::new(self.board.cols(), self.board.rows());
        self.history.clear();
        self.status = GameStatus::InProgress;
        self.current = 0;
        self.generation += 1;
        self.adapt_players();

        info!(
            red = self.players[0].name(),
            yellow = self.players[1].name(),
            "new game"
        );
        self.emit(GameEvent::Status(StatusUpdate::Started(Piece::Red)));
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn lines(&self) -> &LineRegistry {
        &self.lines
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn player(&self, piece: Piece) -> Option<&Player> {
        self.players.iter().find(|p| p.piece() == piece)
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Cells of the first completed line, if the game has been won.
    pub fn winning_cells(&self) -> Option<[(usize, usize); LINE_LEN]> {
        evaluate::winning_line(&self.board, &self.lines).map(|line| *line.cells())
    }

    /// Drop the current player's piece in `column`; returns the row it landed in.
    pub fn attempt_move(&mut self, column: usize) -> Result<usize, MoveError> {
        let piece = self.current_player().piece();
        self.attempt_move_as(piece, column)
    }

    /// Like [`attempt_move`](Self::attempt_move), but refuses unless `piece` is to move.
    pub fn attempt_move_as(&mut self, piece: Piece, column: usize) -> Result<usize, MoveError> {
        match self.commit(piece, column) {
            Ok(record) => Ok(record.row),
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Move for a human player; refused while a computer is to move.
    pub fn human_move(&mut self, column: usize) -> Result<usize, MoveError> {
        let player = self.current_player();
        if player.is_computer() && !self.is_over() {
            let piece = player.piece();
            return Err(self.reject(MoveError::WrongTurn(piece)));
        }
        self.attempt_move(column)
    }

    /// Best column for `piece` on the current board.
    ///
    /// Computer players search at their adaptive depth, humans at the hint
    /// depth. The board is restored before returning.
    pub fn compute_best_move(&mut self, piece: Piece) -> Option<usize> {
        if self.is_over() {
            return None;
        }
        let depth = self
            .player(piece)?
            .search_depth()
            .unwrap_or(self.hint_depth)
            .max(1)
            .min(self.board.remaining());
        self.engine
            .best_move(&mut self.board, &self.lines, piece, depth)
            .column
    }

    /// Snapshot for searching the computer's move off this thread.
    pub fn search_job(&self) -> Option<SearchJob> {
        let player = self.current_player();
        let depth = player.search_depth()?;
        if self.is_over() {
            return None;
        }
        Some(SearchJob {
            board: self.board.clone(),
            lines: self.lines.clone(),
            piece: player.piece(),
            depth,
            engine: self.engine.clone(),
            generation: self.generation,
        })
    }

    /// Commit a finished search for the computer that is to move.
    ///
    /// Refused with [`MoveError::StaleSearch`] when the position changed since
    /// the job was taken.
    pub fn apply_search(&mut self, outcome: &SearchOutcome) -> Result<MoveRecord, MoveError> {
        if self.is_over() {
            return Err(self.reject(MoveError::GameOver));
        }
        if outcome.generation != self.generation {
            return Err(self.reject(MoveError::StaleSearch));
        }
        let player = self.current_player();
        if !player.is_computer() || player.piece() != outcome.piece {
            return Err(self.reject(MoveError::WrongTurn(outcome.piece)));
        }
        let Some(column) = outcome.column else {
            return Err(self.reject(MoveError::GameOver));
        };

        self.announce(outcome);
        self.commit(outcome.piece, column)
            .map_err(|err| self.reject(err))
    }

    /// Search and play the move of the computer that is to move.
    pub fn computer_move(&mut self) -> Result<MoveRecord, MoveError> {
        let player = self.current_player();
        let piece = player.piece();
        let Some(depth) = player.search_depth() else {
            return Err(self.reject(MoveError::WrongTurn(piece)));
        };
        if self.is_over() {
            return Err(self.reject(MoveError::GameOver));
        }

        info!(player = player.name(), depth, "thinking");
        let mut outcome = self.engine.best_move(&mut self.board, &self.lines, piece, depth);
        outcome.generation = self.generation;
        self.apply_search(&outcome)
    }

    /// Take back moves and reopen the game.
    ///
    /// Against a computer this rewinds to the human's last turn (normally two
    /// plies); otherwise exactly one ply. Returns the number of plies undone.
    pub fn undo(&mut self) -> usize {
        if self.history.is_empty() {
            return 0;
        }

        if let Some(cells) = self.winning_cells() {
            for (column, row) in cells {
                let piece = self.board.piece_at(column, row);
                self.emit_board(piece, column, row, false);
            }
        }
        self.status = GameStatus::InProgress;

        let mixed = self.players[0].is_computer() != self.players[1].is_computer();
        let mut undone = 0;
        while let Some(record) = self.history.pop() {
            let (row, piece) = self.board.remove(record.column);
            debug_assert_eq!((row, piece), (record.row, record.piece));
            self.emit_board(Piece::Empty, record.column, row, false);
            self.current = Self::index_of(piece);
            undone += 1;

            if !(mixed && self.current_player().is_computer()) {
                break;
            }
        }

        self.lines.refresh_after_undo(&self.board);
        self.generation += 1;
        self.adapt_players();
        info!(undone, to_move = self.current_player().name(), "undo");
        self.emit(GameEvent::Status(StatusUpdate::Cleared));
        undone
    }

    fn commit(&mut self, piece: Piece, column: usize) -> Result<MoveRecord, MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        if piece != self.current_player().piece() {
            return Err(MoveError::WrongTurn(piece));
        }

        let row = self.board.put(column, piece)?;
        self.lines.refresh_after_move(&self.board);
        let record = MoveRecord { column, row, piece };
        self.history.push(record);
        self.generation += 1;
        debug!(
            piece = %piece,
            column,
            row,
            active_lines = self.lines.active_count(),
            "move"
        );
        self.emit_board(piece, column, row, false);

        if let Some(cells) = self.winning_cells() {
            self.status = GameStatus::won_by(piece);
            info!(winner = %piece, moves = self.history.len(), "game won");
            self.emit(GameEvent::Status(StatusUpdate::Won(piece)));
            for (column, row) in cells {
                self.emit_board(piece, column, row, true);
            }
        } else if self.board.is_full() {
            self.status = GameStatus::Draw;
            info!(moves = self.history.len(), "game drawn");
            self.emit(GameEvent::Status(StatusUpdate::Draw));
        } else {
            self.current = 1 - self.current;
        }

        self.adapt_players();
        Ok(record)
    }

    fn announce(&mut self, outcome: &SearchOutcome) {
        let status = match outcome.verdict {
            Verdict::WillWin => StatusUpdate::WillWin(outcome.piece),
            Verdict::MayLose => StatusUpdate::MayLose(outcome.piece),
            Verdict::Open => return,
        };
        self.emit(GameEvent::Status(status));
    }

    fn reject(&mut self, err: MoveError) -> MoveError {
        debug!(%err, "move rejected");
        self.emit(GameEvent::Status(StatusUpdate::Illegal(err)));
        err
    }

    fn adapt_players(&mut self) {
        for player in &mut self.players {
            player.adapt(&self.board);
        }
    }

    fn index_of(piece: Piece) -> usize {
        match piece {
            Piece::Yellow => 1,
            _ => 0,
        }
    }

    fn emit_board(&mut self, piece: Piece, column: usize, row: usize, marker: bool) {
        self.emit(GameEvent::Board(BoardUpdate {
            piece,
            column,
            row,
            marker,
        }));
    }

    fn emit(&mut self, event: GameEvent) {
        self.listener.notify(&event);
    }
}
