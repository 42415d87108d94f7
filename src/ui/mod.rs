//! Terminal UI for playing against the engine. The computer's search runs on
//! a worker thread; engine events arrive over a channel.

mod app;
mod game_view;

pub use app::App;
