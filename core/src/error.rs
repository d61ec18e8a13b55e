use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid level, dimensions or mine count out of range")]
    InvalidLevel,
    #[error("Mine layout does not match the level size")]
    InvalidBoardShape,
    #[error("Game is not being played, no moves are accepted")]
    NotPlaying,
    #[error("Game is not paused")]
    NotPaused,
    #[error("Action does not apply to the cell in its current state")]
    IllegalCellState,
    #[error("No cursor is placed on the board")]
    NoCursor,
}

pub type Result<T> = core::result::Result<T, GameError>;
