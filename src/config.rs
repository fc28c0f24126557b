use crate::entity::{Direction, Position};
use crate::error::ConfigError;
use std::time::Duration;

/// Largest side length accepted; food placement scans every cell.
pub const MAX_GRID_SIZE: i32 = 1024;

/// Static game parameters. None of these change while a game is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Side length of the square grid
    pub grid_size: i32,
    /// Period of the tick timer driven by the host
    pub tick_interval: Duration,
    /// Starting body, head first
    pub initial_snake: Vec<Position>,
    pub initial_direction: Direction,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            tick_interval: Duration::from_millis(200),
            initial_snake: vec![
                Position::new(8, 7),
                Position::new(8, 8),
                Position::new(8, 9),
            ],
            initial_direction: Direction::Down,
        }
    }
}

impl GameConfig {
    /// Default configuration on a grid of a different size.
    pub fn with_grid_size(grid_size: i32) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < 2 {
            return Err(ConfigError::GridTooSmall(self.grid_size));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridTooLarge(self.grid_size));
        }

        if self.initial_snake.is_empty() {
            return Err(ConfigError::EmptySnake);
        }

        for (i, &segment) in self.initial_snake.iter().enumerate() {
            if !segment.in_bounds(self.grid_size) {
                return Err(ConfigError::SegmentOutOfBounds {
                    position: segment,
                    size: self.grid_size,
                });
            }
            if self.initial_snake[..i].contains(&segment) {
                return Err(ConfigError::DuplicateSegment(segment));
            }
        }

        for pair in self.initial_snake.windows(2) {
            if pair[0].manhattan_distance(pair[1]) != 1 {
                return Err(ConfigError::DisjointSegments(pair[0], pair[1]));
            }
        }

        // A head moving straight into its neck would die on the first tick
        if let [head, neck, ..] = self.initial_snake.as_slice() {
            if head.moved(self.initial_direction) == *neck {
                return Err(ConfigError::ReversedDirection(self.initial_direction));
            }
        }

        Ok(())
    }
}
