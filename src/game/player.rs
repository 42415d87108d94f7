use crate::ai::DepthPolicy;

use super::board::{Board, Piece};

/// How a player picks its columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerKind {
    /// Columns arrive from outside (keyboard, mouse, tests)
    Human,
    /// Columns come from the search engine
    Computer(ComputerPlayer),
}

/// Search settings carried by a computer player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerPlayer {
    policy: DepthPolicy,
    depth: usize,
}

impl ComputerPlayer {
    pub fn new(policy: DepthPolicy) -> Self {
        ComputerPlayer {
            policy,
            depth: policy.base,
        }
    }

    /// Depth for the next search
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Recompute the search depth for the current board
    pub fn adapt(&mut self, board: &Board) {
        self.depth = self.policy.depth_for(board);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    piece: Piece,
    name: String,
    kind: PlayerKind,
}

impl Player {
    pub fn human(piece: Piece) -> Self {
        Player {
            piece,
            name: format!("Human ({})", piece.name()),
            kind: PlayerKind::Human,
        }
    }

    pub fn computer(piece: Piece, policy: DepthPolicy) -> Self {
        Player {
            piece,
            name: format!("Computer ({})", piece.name()),
            kind: PlayerKind::Computer(ComputerPlayer::new(policy)),
        }
    }

    pub fn piece(&self) -> Piece {
        self.piece
    }

    /// Get player name for display
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_computer(&self) -> bool {
        matches!(self.kind, PlayerKind::Computer(_))
    }

    /// Current search depth, `None` for humans
    pub fn search_depth(&self) -> Option<usize> {
        match &self.kind {
            PlayerKind::Computer(ai) => Some(ai.depth()),
            PlayerKind::Human => None,
        }
    }

    pub(crate) fn adapt(&mut self, board: &Board) {
        if let PlayerKind::Computer(ai) = &mut self.kind {
            ai.adapt(board);
        }
    }
}
