use serde::Serialize;
use tracing::debug;

use crate::game::{Board, LineRegistry, Piece};

use super::evaluate::{self, WIN_SCORE};

/// Column ordering for the standard board: center-first for better alpha-beta pruning.
const MOVE_ORDER: [usize; 7] = [3, 4, 2, 1, 5, 0, 6];

/// Bound wider than any score the evaluator can produce.
const INFINITY: i32 = 1_000_000;

/// What the root score says about the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Open,
    WillWin,
    MayLose,
}

impl Verdict {
    fn from_score(score: i32) -> Verdict {
        if score == WIN_SCORE {
            Verdict::WillWin
        } else if score == -WIN_SCORE {
            Verdict::MayLose
        } else {
            Verdict::Open
        }
    }
}

/// Result of a root search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub piece: Piece,
    /// Chosen column, `None` when no move was possible
    pub column: Option<usize>,
    /// Best root score from `piece`'s perspective
    pub score: i32,
    pub depth: usize,
    pub nodes: u64,
    pub verdict: Verdict,
    /// Position the search ran on, as counted by the game controller
    pub generation: u64,
}

struct Node {
    score: i32,
    column: Option<usize>,
}

/// Negamax with alpha-beta pruning over a shared board.
///
/// Moves are tried in a fixed priority order and only a strictly better score
/// replaces the running best, so equal boards always yield equal columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEngine {
    order: Vec<usize>,
    fallback_depth: usize,
}

impl SearchEngine {
    pub fn new(cols: usize) -> Self {
        SearchEngine {
            order: column_order(cols),
            fallback_depth: 0,
        }
    }

    /// Re-search at `depth` when every move loses, to avoid an immediate loss.
    /// Zero disables the fallback.
    pub fn with_fallback_depth(mut self, depth: usize) -> Self {
        self.fallback_depth = depth;
        self
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Pick a column for `piece`, searching `depth` plies.
    ///
    /// The board is borrowed mutably for temporary moves and is left exactly
    /// as it was. `lines` should be the working set for this board.
    pub fn best_move(
        &self,
        board: &mut Board,
        lines: &LineRegistry,
        piece: Piece,
        depth: usize,
    ) -> SearchOutcome {
        let mut nodes = 0;
        let root = self.negamax(board, lines, piece, 0, depth, -INFINITY, INFINITY, &mut nodes);
        let verdict = Verdict::from_score(root.score);
        let mut outcome = SearchOutcome {
            piece,
            column: root.column,
            score: root.score,
            depth,
            nodes,
            verdict,
            generation: 0,
        };
        debug!(
            piece = %piece,
            depth,
            nodes,
            score = root.score,
            column = ?root.column,
            "search finished"
        );

        if verdict == Verdict::MayLose && self.fallback_depth != 0 && self.fallback_depth != depth {
            let fallback = self.negamax(
                board,
                lines,
                piece,
                0,
                self.fallback_depth,
                -INFINITY,
                INFINITY,
                &mut outcome.nodes,
            );
            debug!(
                depth = self.fallback_depth,
                column = ?fallback.column,
                "every move loses, re-searched shallow"
            );
            if fallback.column.is_some() {
                outcome.column = fallback.column;
            }
        }

        outcome
    }

    /// Score of the position for `piece`, plus the best column at the root.
    ///
    /// `ply` is the distance from the root; the root never cuts off so that all
    /// of its children are scored before a column is chosen.
    #[allow(clippy::too_many_arguments)]
    fn negamax(
        &self,
        board: &mut Board,
        lines: &LineRegistry,
        piece: Piece,
        ply: usize,
        max_depth: usize,
        mut alpha: i32,
        beta: i32,
        nodes: &mut u64,
    ) -> Node {
        *nodes += 1;

        let score = evaluate::score(board, lines, piece);
        if ply >= max_depth || board.is_full() || evaluate::is_win(score) {
            return Node {
                score,
                column: None,
            };
        }

        let mut best = Node {
            score: -INFINITY,
            column: None,
        };

        for &col in &self.order {
            if board.is_column_full(col) {
                continue;
            }
            let score = match board.place(col, piece) {
                Ok(mut placed) => {
                    -self
                        .negamax(
                            &mut placed,
                            lines,
                            -piece,
                            ply + 1,
                            max_depth,
                            -beta,
                            -alpha,
                            nodes,
                        )
                        .score
                }
                Err(_) => continue,
            };

            if score > best.score {
                best = Node {
                    score,
                    column: Some(col),
                };
            }
            if score > alpha {
                alpha = score;
                if alpha > beta && ply > 0 {
                    break;
                }
            }
        }

        best
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new(MOVE_ORDER.len())
    }
}

/// Center-out column priority. Non-standard widths order by distance from the
/// center, ties toward the lower index.
pub fn column_order(cols: usize) -> Vec<usize> {
    if cols == MOVE_ORDER.len() {
        return MOVE_ORDER.to_vec();
    }
    let mut order: Vec<usize> = (0..cols).collect();
    order.sort_by_key(|&c| ((2 * c).abs_diff(cols - 1), c));
    order
}

/// Owned search input that can be sent to a worker thread.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub board: Board,
    pub lines: LineRegistry,
    pub piece: Piece,
    pub depth: usize,
    pub engine: SearchEngine,
    pub generation: u64,
}

impl SearchJob {
    pub fn run(mut self) -> SearchOutcome {
        let mut outcome =
            self.engine.best_move(&mut self.board, &self.lines, self.piece, self.depth);
        outcome.generation = self.generation;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{COLS, ROWS};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn setup(moves: &[usize]) -> (Board, LineRegistry, Piece) {
        let mut board = Board::default();
        let mut lines = LineRegistry::new(COLS, ROWS);
        let mut piece = Piece::Red;
        for &col in moves {
            board.put(col, piece).unwrap();
            lines.refresh_after_move(&board);
            piece = -piece;
        }
        (board, lines, piece)
    }

    /// Plain minimax over the same tree, no pruning.
    fn minimax(
        board: &mut Board,
        lines: &LineRegistry,
        order: &[usize],
        piece: Piece,
        ply: usize,
        max_depth: usize,
    ) -> (i32, Option<usize>) {
        let score = evaluate::score(board, lines, piece);
        if ply >= max_depth || board.is_full() || evaluate::is_win(score) {
            return (score, None);
        }
        let mut best = (-INFINITY, None);
        for &col in order {
            if board.is_column_full(col) {
                continue;
            }
            let mut placed = board.place(col, piece).unwrap();
            let score = -minimax(&mut placed, lines, order, -piece, ply + 1, max_depth).0;
            if score > best.0 {
                best = (score, Some(col));
            }
        }
        best
    }

    fn random_position(rng: &mut StdRng) -> (Board, LineRegistry, Piece) {
        loop {
            let mut moves = Vec::new();
            let mut board = Board::default();
            let mut lines = LineRegistry::new(COLS, ROWS);
            let mut piece = Piece::Red;
            let mut finished = false;
            for _ in 0..rng.random_range(0..20) {
                let legal: Vec<usize> = board.legal_columns().collect();
                let col = legal[rng.random_range(0..legal.len())];
                board.put(col, piece).unwrap();
                lines.refresh_after_move(&board);
                moves.push(col);
                piece = -piece;
                if evaluate::winning_line(&board, &lines).is_some() {
                    finished = true;
                    break;
                }
            }
            if !finished {
                return (board, lines, piece);
            }
        }
    }

    #[test]
    fn empty_board_opens_center() {
        let engine = SearchEngine::default();
        let (mut board, lines, piece) = setup(&[]);
        for depth in 4..=5 {
            let outcome = engine.best_move(&mut board, &lines, piece, depth);
            assert_eq!(outcome.column, Some(3), "depth {depth}");
            assert_eq!(outcome.verdict, Verdict::Open);
        }
    }

    #[test]
    fn takes_winning_move() {
        // Red holds the bottom of columns 0..3, Yellow the row above
        let (mut board, lines, piece) = setup(&[0, 0, 1, 1, 2, 2]);
        assert_eq!(piece, Piece::Red);
        let outcome = SearchEngine::default().best_move(&mut board, &lines, piece, 4);
        assert_eq!(outcome.column, Some(3), "Should take winning move at col 3");
        assert_eq!(outcome.score, WIN_SCORE);
        assert_eq!(outcome.verdict, Verdict::WillWin);
    }

    #[test]
    fn blocks_opponent_win() {
        // Yellow has [0,1,2] at the bottom row; Red must play col 3
        let (mut board, lines, piece) = setup(&[6, 0, 6, 1, 5, 2]);
        assert_eq!(piece, Piece::Red);
        let outcome = SearchEngine::default().best_move(&mut board, &lines, piece, 4);
        assert_eq!(outcome.column, Some(3), "Should block opponent's winning move at col 3");
    }

    #[test]
    fn search_leaves_board_untouched() {
        let mut rng = StdRng::seed_from_u64(42);
        let engine = SearchEngine::default();
        for _ in 0..10 {
            let (mut board, lines, piece) = random_position(&mut rng);
            let before = board.clone();
            engine.best_move(&mut board, &lines, piece, 4);
            assert_eq!(board, before);
        }
    }

    #[test]
    fn repeated_searches_agree() {
        let engine = SearchEngine::default();
        let (mut board, lines, piece) = setup(&[3, 3, 2, 4]);
        let first = engine.best_move(&mut board, &lines, piece, 5);
        let second = engine.best_move(&mut board, &lines, piece, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn alpha_beta_matches_plain_minimax() {
        let mut rng = StdRng::seed_from_u64(2024);
        let engine = SearchEngine::default();
        for _ in 0..25 {
            let (mut board, lines, piece) = random_position(&mut rng);
            let pruned = engine.best_move(&mut board, &lines, piece, 4);
            let (score, column) = minimax(&mut board, &lines, engine.order(), piece, 0, 4);
            assert_eq!((pruned.score, pruned.column), (score, column));
        }
    }

    #[test]
    fn pruning_visits_fewer_nodes() {
        let engine = SearchEngine::default();
        let (mut board, lines, piece) = setup(&[]);
        let outcome = engine.best_move(&mut board, &lines, piece, 5);
        // 1 + 7 + 7^2 + ... + 7^5 nodes without pruning
        assert!(outcome.nodes < 19_608, "visited {} nodes", outcome.nodes);
    }

    #[test]
    fn terminal_root_has_no_column() {
        let engine = SearchEngine::default();
        let (mut board, lines, piece) = setup(&[0, 1, 0, 1, 0, 1, 0]);
        let outcome = engine.best_move(&mut board, &lines, piece, 4);
        assert_eq!(outcome.column, None);
        assert_eq!(outcome.score, -WIN_SCORE);

        let outcome = engine.best_move(&mut board, &lines, piece, 0);
        assert_eq!(outcome.column, None);
    }

    #[test]
    fn lost_position_falls_back_to_shallow_search() {
        // Yellow is lost within four plies whatever it plays
        let (mut board, lines, piece) = setup(&[3, 3, 2, 3, 0, 0, 2, 4, 3]);
        assert_eq!(piece, Piece::Yellow);

        let deep = SearchEngine::default().best_move(&mut board, &lines, piece, 4);
        assert_eq!(deep.verdict, Verdict::MayLose);
        assert_eq!(deep.column, Some(3));

        let engine = SearchEngine::default().with_fallback_depth(2);
        let outcome = engine.best_move(&mut board, &lines, piece, 4);
        assert_eq!(outcome.verdict, Verdict::MayLose);
        assert_eq!(outcome.score, -WIN_SCORE);
        assert_eq!(outcome.column, Some(1));

        // The shallow pick survives Red's next move
        board.put(1, piece).unwrap();
        let lines = LineRegistry::for_board(&board);
        for col in board.legal_columns().collect::<Vec<_>>() {
            let placed = board.place(col, -piece).unwrap();
            assert!(evaluate::winning_line(&placed, &lines).is_none());
        }
    }

    #[test]
    fn column_order_standard_board() {
        assert_eq!(column_order(7), vec![3, 4, 2, 1, 5, 0, 6]);
    }

    #[test]
    fn column_order_other_widths() {
        assert_eq!(column_order(5), vec![2, 1, 3, 0, 4]);
        assert_eq!(column_order(6), vec![2, 3, 1, 4, 0, 5]);
        assert_eq!(column_order(4), vec![1, 2, 0, 3]);
    }

    #[test]
    fn job_runs_on_worker_thread() {
        let (board, lines, piece) = setup(&[0, 0, 1, 1, 2, 2]);
        let job = SearchJob {
            board,
            lines,
            piece,
            depth: 3,
            engine: SearchEngine::default(),
            generation: 7,
        };
        let outcome = std::thread::spawn(move || job.run()).join().unwrap();
        assert_eq!(outcome.column, Some(3));
        assert_eq!(outcome.generation, 7);
    }
}
