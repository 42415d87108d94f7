use serde::{Deserialize, Serialize};

use crate::game::Board;

/// Search depth that grows as the board fills up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthPolicy {
    /// Depth used in the opening
    pub base: usize,
    /// Depth once three or more columns are full
    pub endgame: usize,
    /// Piece count above which the base depth gains one ply
    pub midgame_pieces: usize,
}

impl DepthPolicy {
    pub fn new(base: usize) -> Self {
        DepthPolicy {
            base,
            ..Self::default()
        }
    }

    /// Depth to search from the given position: at least one ply, never more
    /// than the plies left.
    pub fn depth_for(&self, board: &Board) -> usize {
        let target = match board.full_columns() {
            0 | 1 if board.total_pieces() > self.midgame_pieces => self.base + 1,
            0 | 1 => self.base,
            2 => self.base + 2,
            _ => self.endgame.max(self.base + 2),
        };
        target.max(1).min(board.remaining())
    }
}

impl Default for DepthPolicy {
    fn default() -> Self {
        DepthPolicy {
            base: 10,
            endgame: 18,
            midgame_pieces: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Piece, COLS, ROWS};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn opening_uses_base_depth() {
        let policy = DepthPolicy::new(7);
        assert_eq!(policy.depth_for(&Board::default()), 7);
    }

    #[test]
    fn zero_base_searches_one_ply() {
        let policy = DepthPolicy::new(0);
        assert_eq!(policy.depth_for(&Board::default()), 1);

        let mut board = Board::default();
        board.put(0, Piece::Red).unwrap();
        assert_eq!(policy.depth_for(&board), 1);
    }

    #[test]
    fn midgame_adds_one_ply() {
        let policy = DepthPolicy::new(7);
        let mut board = Board::default();
        // 17 pieces, no full column
        for col in 0..COLS {
            for _ in 0..2 {
                board.put(col, Piece::Red).unwrap();
            }
        }
        for col in 0..3 {
            board.put(col, Piece::Yellow).unwrap();
        }
        assert_eq!(board.full_columns(), 0);
        assert_eq!(policy.depth_for(&board), 8);
    }

    #[test]
    fn full_columns_raise_depth() {
        let policy = DepthPolicy::new(7);
        let mut board = Board::default();
        for col in 0..2 {
            for _ in 0..ROWS {
                board.put(col, Piece::Red).unwrap();
            }
        }
        assert_eq!(policy.depth_for(&board), 9);

        for _ in 0..ROWS {
            board.put(2, Piece::Red).unwrap();
        }
        assert_eq!(policy.depth_for(&board), 18);
    }

    #[test]
    fn depth_clamped_to_remaining_plies() {
        let policy = DepthPolicy::new(7);
        let mut board = Board::default();
        for col in 0..COLS - 1 {
            for _ in 0..ROWS {
                board.put(col, Piece::Yellow).unwrap();
            }
        }
        board.put(COLS - 1, Piece::Red).unwrap();
        assert_eq!(board.remaining(), 5);
        assert_eq!(policy.depth_for(&board), 5);
    }

    #[test]
    fn depth_never_decreases_during_a_game() {
        let policy = DepthPolicy::new(4);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            let mut board = Board::default();
            let mut piece = Piece::Red;
            let mut last = policy.depth_for(&board);
            while !board.is_full() {
                let legal: Vec<usize> = board.legal_columns().collect();
                let col = legal[rng.random_range(0..legal.len())];
                board.put(col, piece).unwrap();
                piece = -piece;

                let depth = policy.depth_for(&board);
                assert!(depth <= board.remaining());
                // Only the clamp to the remaining plies may lower it
                assert!(depth >= last || depth == board.remaining());
                last = depth;
            }
        }
    }
}
