//! Line-potential scoring of a position.

use crate::game::{Board, Line, LineRegistry, Piece, LINE_LEN};

/// Score of a completed four-in-a-row.
pub const WIN_SCORE: i32 = 1000;

/// Score the board from `perspective`'s point of view.
///
/// A completed line short-circuits to `+WIN_SCORE` for the perspective's own
/// win and `-WIN_SCORE` for the opponent's. Otherwise the result is the sum of
/// the active line values, signed by the perspective.
pub fn score(board: &Board, lines: &LineRegistry, perspective: Piece) -> i32 {
    let p = perspective.value();
    let mut sum = 0;
    for line in lines.active_lines() {
        let v = line.value(board);
        if v.unsigned_abs() as usize == LINE_LEN {
            return p * v * (WIN_SCORE / LINE_LEN as i32);
        }
        sum += v;
    }
    p * sum
}

/// First completed line in enumeration order, if any.
pub fn winning_line<'a>(board: &Board, lines: &'a LineRegistry) -> Option<&'a Line> {
    lines.active_lines().find(|line| line.is_complete(board))
}

pub fn is_win(score: i32) -> bool {
    score.abs() == WIN_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{COLS, ROWS};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn setup(moves: &[(usize, Piece)]) -> (Board, LineRegistry) {
        let mut board = Board::default();
        let mut lines = LineRegistry::new(COLS, ROWS);
        for &(col, piece) in moves {
            board.put(col, piece).unwrap();
            lines.refresh_after_move(&board);
        }
        (board, lines)
    }

    #[test]
    fn empty_board_is_zero() {
        let (board, lines) = setup(&[]);
        assert_eq!(score(&board, &lines, Piece::Red), 0);
        assert_eq!(score(&board, &lines, Piece::Yellow), 0);
    }

    #[test]
    fn single_piece_counts_its_lines() {
        // Bottom center cell: 1 vertical, 4 horizontal, 1 per diagonal
        let (board, lines) = setup(&[(3, Piece::Red)]);
        assert_eq!(score(&board, &lines, Piece::Red), 7);
        assert_eq!(score(&board, &lines, Piece::Yellow), -7);

        // Corner: 1 vertical, 1 horizontal, 1 diagonal
        let (board, lines) = setup(&[(0, Piece::Red)]);
        assert_eq!(score(&board, &lines, Piece::Red), 3);
    }

    #[test]
    fn own_win_is_positive_for_either_color() {
        let red_win: Vec<_> = (0..4).map(|c| (c, Piece::Red)).collect();
        let (board, lines) = setup(&red_win);
        assert_eq!(score(&board, &lines, Piece::Red), WIN_SCORE);
        assert_eq!(score(&board, &lines, Piece::Yellow), -WIN_SCORE);

        let yellow_win = vec![(5, Piece::Yellow); 4];
        let (board, lines) = setup(&yellow_win);
        assert_eq!(score(&board, &lines, Piece::Yellow), WIN_SCORE);
        assert_eq!(score(&board, &lines, Piece::Red), -WIN_SCORE);
        assert!(is_win(score(&board, &lines, Piece::Red)));
    }

    #[test]
    fn winning_line_reports_cells() {
        let (board, lines) = setup(&[
            (0, Piece::Red),
            (0, Piece::Yellow),
            (1, Piece::Red),
            (1, Piece::Yellow),
            (2, Piece::Red),
            (2, Piece::Yellow),
            (3, Piece::Red),
        ]);
        let line = winning_line(&board, &lines).expect("red has four");
        assert_eq!(line.cells(), &[(0, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn no_winning_line_with_three() {
        let (board, lines) = setup(&[(0, Piece::Red), (1, Piece::Red), (2, Piece::Red)]);
        assert!(winning_line(&board, &lines).is_none());
        assert!(!is_win(score(&board, &lines, Piece::Red)));
    }

    #[test]
    fn pruning_does_not_change_score() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..50 {
            let mut board = Board::default();
            let mut pruned = LineRegistry::new(COLS, ROWS);
            let full = LineRegistry::new(COLS, ROWS);
            let mut piece = Piece::Red;
            for _ in 0..rng.random_range(0..30) {
                let legal: Vec<usize> = board.legal_columns().collect();
                let col = legal[rng.random_range(0..legal.len())];
                board.put(col, piece).unwrap();
                pruned.refresh_after_move(&board);
                piece = -piece;
                if winning_line(&board, &pruned).is_some() {
                    break;
                }
            }
            assert_eq!(
                score(&board, &pruned, Piece::Red),
                score(&board, &full, Piece::Red)
            );
        }
    }

    #[test]
    fn score_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let mut board = Board::default();
            let mut lines = LineRegistry::new(COLS, ROWS);
            let mut piece = Piece::Red;
            for _ in 0..rng.random_range(0..42) {
                let legal: Vec<usize> = board.legal_columns().collect();
                if legal.is_empty() {
                    break;
                }
                let col = legal[rng.random_range(0..legal.len())];
                board.put(col, piece).unwrap();
                lines.refresh_after_move(&board);
                piece = -piece;
            }
            assert_eq!(
                score(&board, &lines, Piece::Red),
                -score(&board, &lines, Piece::Yellow)
            );
        }
    }
}
