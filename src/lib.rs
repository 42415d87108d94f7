//! # Connect Four
//!
//! A Connect Four engine: board state, the registry of four-cell lines, a
//! line-based position evaluator and an alpha-beta negamax search, tied
//! together by a game controller. Ships a terminal UI built with Ratatui and
//! a headless computer-vs-computer mode.
//!
//! ## Modules
//!
//! - [`game`]: Board, lines, players and the game controller
//! - [`ai`]: Evaluation, negamax search and adaptive depth
//! - [`ui`]: Terminal UI
//! - [`config`]: TOML configuration loading and validation
//! - [`error`]: Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod ui;
