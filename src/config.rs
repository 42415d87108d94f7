use std::path::Path;

use tracing::warn;

use crate::ai::{DepthPolicy, SearchEngine};
use crate::error::ConfigError;
use crate::game::{Board, GameController, GameListener, Piece, Player, COLS, ROWS};

/// Board geometry.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub cols: usize,
    pub rows: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            cols: COLS,
            rows: ROWS,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKindConfig {
    Human,
    Computer,
}

/// One side of the game. A player table must name its `kind`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlayerConfig {
    pub kind: PlayerKindConfig,
    /// Base search depth when `kind` is computer
    #[serde(default = "default_depth")]
    pub depth: usize,
}

fn default_depth() -> usize {
    10
}

impl PlayerConfig {
    fn human(depth: usize) -> Self {
        PlayerConfig {
            kind: PlayerKindConfig::Human,
            depth,
        }
    }

    fn computer(depth: usize) -> Self {
        PlayerConfig {
            kind: PlayerKindConfig::Computer,
            depth,
        }
    }
}

/// Search tuning shared by both computer players.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Depth once three or more columns are full
    pub endgame_depth: usize,
    /// Above this many pieces the base depth gains one ply
    pub midgame_pieces: usize,
    /// Re-search depth when every move loses; 0 turns the fallback off
    pub fallback_depth: usize,
    /// Depth used to suggest a move to a human
    pub hint_depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            endgame_depth: 18,
            midgame_pieces: 16,
            fallback_depth: 2,
            hint_depth: 8,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub board: BoardConfig,
    pub red: PlayerConfig,
    pub yellow: PlayerConfig,
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            board: BoardConfig::default(),
            red: PlayerConfig::human(11),
            yellow: PlayerConfig::computer(10),
            search: SearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(4..=16).contains(&self.board.cols) {
            return Err(ConfigError::Validation(
                "board.cols must be in 4..=16".into(),
            ));
        }
        if !(4..=16).contains(&self.board.rows) {
            return Err(ConfigError::Validation(
                "board.rows must be in 4..=16".into(),
            ));
        }
        if self.red.depth == 0 {
            return Err(ConfigError::Validation("red.depth must be >= 1".into()));
        }
        if self.yellow.depth == 0 {
            return Err(ConfigError::Validation(
                "yellow.depth must be >= 1".into(),
            ));
        }
        if self.search.endgame_depth == 0 {
            return Err(ConfigError::Validation(
                "search.endgame_depth must be >= 1".into(),
            ));
        }
        if self.search.hint_depth == 0 {
            return Err(ConfigError::Validation(
                "search.hint_depth must be >= 1".into(),
            ));
        }
        Ok(())
    }

    pub fn depth_policy(&self, base: usize) -> DepthPolicy {
        DepthPolicy {
            base,
            endgame: self.search.endgame_depth,
            midgame_pieces: self.search.midgame_pieces,
        }
    }

    fn player(&self, piece: Piece, config: &PlayerConfig) -> Player {
        match config.kind {
            PlayerKindConfig::Human => Player::human(piece),
            PlayerKindConfig::Computer => Player::computer(piece, self.depth_policy(config.depth)),
        }
    }

    /// Build a controller for a fresh game described by this configuration.
    pub fn build_controller(&self, listener: impl GameListener + 'static) -> GameController {
        let engine =
            SearchEngine::new(self.board.cols).with_fallback_depth(self.search.fallback_depth);
        GameController::new(
            Board::new(self.board.cols, self.board.rows),
            self.player(Piece::Red, &self.red),
            self.player(Piece::Yellow, &self.yellow),
            listener,
        )
        .with_engine(engine)
        .with_hint_depth(self.search.hint_depth)
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
