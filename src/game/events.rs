//! Events the controller emits for whatever renders the game.

use std::sync::mpsc;

use serde::Serialize;

use crate::error::MoveError;

use super::board::Piece;

/// A cell changed, or a winning cell got (un)marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardUpdate {
    pub piece: Piece,
    pub column: usize,
    pub row: usize,
    pub marker: bool,
}

/// Semantic status; wording is up to the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StatusUpdate {
    Started(Piece),
    Won(Piece),
    Draw,
    Illegal(MoveError),
    /// Advisory: the computer found a forced win
    WillWin(Piece),
    /// Advisory: the computer found no move that avoids a loss
    MayLose(Piece),
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Board(BoardUpdate),
    Status(StatusUpdate),
}

/// Receives controller events. Calls happen synchronously on the controller's thread.
pub trait GameListener: Send {
    fn notify(&mut self, event: &GameEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullListener;

impl GameListener for NullListener {
    fn notify(&mut self, _event: &GameEvent) {}
}

impl GameListener for mpsc::Sender<GameEvent> {
    fn notify(&mut self, event: &GameEvent) {
        // A dropped receiver just means nobody is watching any more
        let _ = self.send(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_forwards_events() {
        let (mut tx, rx) = mpsc::channel();
        tx.notify(&GameEvent::Status(StatusUpdate::Draw));
        assert_eq!(rx.try_recv(), Ok(GameEvent::Status(StatusUpdate::Draw)));
    }

    #[test]
    fn sender_ignores_closed_channel() {
        let (mut tx, rx) = mpsc::channel();
        drop(rx);
        tx.notify(&GameEvent::Status(StatusUpdate::Cleared));
    }

    #[test]
    fn events_serialize_as_tagged_json() {
        let event = GameEvent::Board(BoardUpdate {
            piece: Piece::Red,
            column: 3,
            row: 0,
            marker: false,
        });
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"board","piece":"red","column":3,"row":0,"marker":false}"#
        );

        let event = GameEvent::Status(StatusUpdate::Won(Piece::Yellow));
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"event":"status","status":"won","detail":"yellow"}"#
        );
    }
}
