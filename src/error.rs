use crate::entity::{Direction, Position};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid size {0} is too small (minimum 2)")]
    GridTooSmall(i32),

    #[error("grid size {0} is too large (maximum {})", crate::config::MAX_GRID_SIZE)]
    GridTooLarge(i32),

    #[error("initial snake must have at least one segment")]
    EmptySnake,

    #[error("initial snake segment {position} lies outside a {size}x{size} grid")]
    SegmentOutOfBounds { position: Position, size: i32 },

    #[error("initial snake visits {0} more than once")]
    DuplicateSegment(Position),

    #[error("initial snake segments {0} and {1} are not adjacent")]
    DisjointSegments(Position, Position),

    #[error("initial direction {0:?} points back into the snake's body")]
    ReversedDirection(Direction),
}
