//! Move selection: line-potential evaluation, adaptive depth, and negamax
//! search with alpha-beta pruning.

mod depth;
pub mod evaluate;
mod negamax;

pub use depth::DepthPolicy;
pub use evaluate::WIN_SCORE;
pub use negamax::{column_order, SearchEngine, SearchJob, SearchOutcome, Verdict};
