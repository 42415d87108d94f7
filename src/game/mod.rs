//! Core Connect Four game logic: board representation, winning lines, players,
//! and the game controller with undo and event reporting.

mod board;
mod controller;
mod events;
mod lines;
mod player;

pub use board::{Board, Piece, Placed, COLS, ROWS};
pub use controller::{GameController, GameStatus, MoveRecord, DEFAULT_HINT_DEPTH};
pub use events::{BoardUpdate, GameEvent, GameListener, NullListener, StatusUpdate};
pub use lines::{Direction, Line, LineRegistry, LINE_LEN};
pub use player::{ComputerPlayer, Player, PlayerKind};
