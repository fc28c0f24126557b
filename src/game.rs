use crate::config::GameConfig;
use crate::entity::{Direction, Position};
use crate::error::ConfigError;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;

/// What a renderer should draw at a given grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Snake,
    SnakeHead,
    Food,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    Wall,
    SelfCollision,
    /// The snake covers every cell, so there is nowhere left to put food.
    BoardFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Over(GameOverCause),
}

/// Result of a single `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The game was already over; nothing changed.
    Idle,
    Moved,
    Ate,
    GameOver(GameOverCause),
}

/// The Snake engine.
///
/// All mutation goes through `handle_input`/`handle_key`, `tick` and
/// `restart`; hosts read the rest through the accessors.
pub struct Game {
    config: GameConfig,
    snake: VecDeque<Position>,
    food: Option<Position>,
    direction: Direction,
    pending_direction: Option<Direction>,
    score: u32,
    state: GameState,
    rng: StdRng,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, StdRng::from_entropy()))
    }

    /// Same as `new`, but food placement is reproducible for a given seed.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, StdRng::seed_from_u64(seed)))
    }

    fn build(config: GameConfig, rng: StdRng) -> Self {
        let mut game = Self {
            snake: config.initial_snake.iter().copied().collect(),
            food: None,
            direction: config.initial_direction,
            pending_direction: None,
            score: 0,
            state: GameState::Playing,
            rng,
            config,
        };
        game.food = game.place_food();
        game
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid_size(&self) -> i32 {
        self.config.grid_size
    }

    /// Snake body, head first.
    pub fn snake(&self) -> &VecDeque<Position> {
        &self.snake
    }

    pub fn head(&self) -> Position {
        self.snake[0]
    }

    /// `None` only once the snake has filled the board.
    pub fn food(&self) -> Option<Position> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.state, GameState::Over(_))
    }

    pub fn game_over_cause(&self) -> Option<GameOverCause> {
        match self.state {
            GameState::Over(cause) => Some(cause),
            GameState::Playing => None,
        }
    }

    pub fn cell_at(&self, pos: Position) -> Cell {
        if self.head() == pos {
            Cell::SnakeHead
        } else if self.snake.contains(&pos) {
            Cell::Snake
        } else if self.food == Some(pos) {
            Cell::Food
        } else {
            Cell::Empty
        }
    }

    /// Queues a direction change for the next tick.
    ///
    /// The direct reverse of the committed direction is rejected. A later
    /// accepted input replaces an earlier one that has not been applied yet.
    /// Returns whether the input was accepted.
    pub fn handle_input(&mut self, direction: Direction) -> bool {
        if self.is_game_over() {
            return false;
        }

        if direction == self.direction.opposite() {
            debug!(
                "Rejected direction change: {:?} -> {:?}",
                self.direction, direction
            );
            return false;
        }

        debug!(
            "Queued direction change: {:?} -> {:?}",
            self.direction, direction
        );
        self.pending_direction = Some(direction);
        true
    }

    /// Keyboard entry point. Only the arrow keys have an effect.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(direction) => self.handle_input(direction),
            None => false,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.is_game_over() {
            return TickOutcome::Idle;
        }

        let direction = self.pending_direction.take().unwrap_or(self.direction);
        if direction != self.direction {
            debug!("Applying direction: {:?}", direction);
        }
        self.direction = direction;

        let new_head = self.head().moved(direction);

        if !new_head.in_bounds(self.config.grid_size) {
            return self.end(GameOverCause::Wall, new_head);
        }

        // The tail still counts: it only moves after the head lands
        if self.snake.contains(&new_head) {
            return self.end(GameOverCause::SelfCollision, new_head);
        }

        self.snake.push_front(new_head);

        if self.food == Some(new_head) {
            self.score += 1;
            info!("Food eaten at {}, score {}", new_head, self.score);

            self.food = self.place_food();
            if self.food.is_none() {
                return self.end(GameOverCause::BoardFull, new_head);
            }
            return TickOutcome::Ate;
        }

        self.snake.pop_back();
        trace!("Snake moved to {:?}", self.snake);
        TickOutcome::Moved
    }

    pub fn restart(&mut self) {
        info!("Restarting game");
        self.snake = self.config.initial_snake.iter().copied().collect();
        self.direction = self.config.initial_direction;
        self.pending_direction = None;
        self.score = 0;
        self.state = GameState::Playing;
        self.food = self.place_food();
    }

    fn end(&mut self, cause: GameOverCause, at: Position) -> TickOutcome {
        info!("Game over ({:?}) at {}, score {}", cause, at, self.score);
        self.state = GameState::Over(cause);
        TickOutcome::GameOver(cause)
    }

    /// Picks a cell uniformly among those the snake does not occupy.
    fn place_food(&mut self) -> Option<Position> {
        let size = self.config.grid_size;
        let mut occupied = vec![false; (size * size) as usize];
        for segment in &self.snake {
            occupied[(segment.row * size + segment.col) as usize] = true;
        }

        let free: Vec<Position> = (0..size)
            .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
            .filter(|p| !occupied[(p.row * size + p.col) as usize])
            .collect();

        free.choose(&mut self.rng).copied()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::build(GameConfig::default(), StdRng::from_entropy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn p(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    // Strategy for generating valid directions
    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    // Strategy for generating sequences of moves
    fn move_sequence_strategy() -> impl Strategy<Value = Vec<Direction>> {
        prop::collection::vec(direction_strategy(), 1..100)
    }

    /// 6x6 board so random walks eat food now and then.
    fn small_config() -> GameConfig {
        GameConfig {
            grid_size: 6,
            initial_snake: vec![p(1, 1), p(1, 2), p(1, 3)],
            ..Default::default()
        }
    }

    /// 3x3 board with a single free cell at (2, 2).
    fn nearly_full_config() -> GameConfig {
        GameConfig {
            grid_size: 3,
            initial_snake: vec![
                p(0, 0),
                p(0, 1),
                p(0, 2),
                p(1, 2),
                p(1, 1),
                p(1, 0),
                p(2, 0),
                p(2, 1),
            ],
            initial_direction: Direction::Down,
            ..Default::default()
        }
    }

    fn default_game() -> Game {
        Game::with_seed(GameConfig::default(), 7).unwrap()
    }

    proptest! {
        /// Length is constant unless food is eaten, the head moves exactly one
        /// cell in the committed direction, and the board stays consistent.
        #[test]
        fn prop_tick_moves_head_one_cell(
            seed in any::<u64>(),
            moves in move_sequence_strategy()
        ) {
            let mut game = Game::with_seed(small_config(), seed).unwrap();

            for direction in moves {
                if game.is_game_over() {
                    break;
                }

                game.handle_input(direction);
                let committed = game.pending_direction().unwrap_or(game.direction());
                let before: Vec<Position> = game.snake().iter().copied().collect();
                let food_before = game.food();
                let score_before = game.score();

                match game.tick() {
                    TickOutcome::Moved => {
                        prop_assert_eq!(game.snake().len(), before.len());
                        prop_assert_eq!(game.score(), score_before);
                    }
                    TickOutcome::Ate => {
                        prop_assert_eq!(game.snake().len(), before.len() + 1);
                        prop_assert_eq!(Some(game.head()), food_before);
                        prop_assert_eq!(game.score(), score_before + 1);
                    }
                    TickOutcome::GameOver(GameOverCause::BoardFull) => {
                        prop_assert_eq!(game.snake().len(), before.len() + 1);
                    }
                    TickOutcome::GameOver(_) => {
                        prop_assert_eq!(game.snake(), &before);
                        break;
                    }
                    TickOutcome::Idle => {
                        prop_assert!(false, "tick reported Idle while playing");
                    }
                }

                prop_assert_eq!(game.direction(), committed);
                prop_assert_eq!(game.pending_direction(), None);
                prop_assert_eq!(game.head(), before[0].moved(committed));
                prop_assert_eq!(game.head().manhattan_distance(before[0]), 1);

                let unique: HashSet<Position> = game.snake().iter().copied().collect();
                prop_assert_eq!(unique.len(), game.snake().len(), "snake overlaps itself");
                for segment in game.snake() {
                    prop_assert!(segment.in_bounds(game.grid_size()));
                }
                if let Some(food) = game.food() {
                    prop_assert!(
                        !game.snake().contains(&food),
                        "food {:?} placed on the snake", food
                    );
                }
            }
        }

        #[test]
        fn prop_reverse_input_is_rejected(current in direction_strategy()) {
            let mut game = default_game();
            game.direction = current;

            prop_assert!(!game.handle_input(current.opposite()));
            prop_assert_eq!(game.pending_direction(), None);
        }

        /// The only free cell must be chosen whatever the seed.
        #[test]
        fn prop_food_lands_on_free_cell(seed in any::<u64>()) {
            let game = Game::with_seed(nearly_full_config(), seed).unwrap();
            prop_assert_eq!(game.food(), Some(p(2, 2)));
        }

        #[test]
        fn prop_restart_restores_initial_state(
            seed in any::<u64>(),
            moves in move_sequence_strategy()
        ) {
            let mut game = Game::with_seed(small_config(), seed).unwrap();
            for direction in moves {
                game.handle_input(direction);
                game.tick();
            }

            game.restart();

            prop_assert_eq!(game.snake(), &small_config().initial_snake);
            prop_assert_eq!(game.score(), 0);
            prop_assert!(!game.is_game_over());
            prop_assert_eq!(game.direction(), Direction::Down);
            prop_assert_eq!(game.pending_direction(), None);
            let food = game.food().unwrap();
            prop_assert!(!game.snake().contains(&food));
        }
    }

    #[test]
    fn test_first_tick_moves_down() {
        let mut game = default_game();
        game.food = Some(p(0, 0));

        assert_eq!(game.tick(), TickOutcome::Moved);
        assert_eq!(game.snake(), &vec![p(9, 7), p(8, 7), p(8, 8)]);
        assert_eq!(game.score(), 0);
        assert!(!game.is_game_over());
    }

    #[test]
    fn test_eating_food_grows_and_scores() {
        let mut game = default_game();
        game.food = Some(p(9, 7));

        assert_eq!(game.tick(), TickOutcome::Ate);
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake(), &vec![p(9, 7), p(8, 7), p(8, 8), p(8, 9)]);

        let food = game.food().unwrap();
        assert!(!game.snake().contains(&food));
        assert!(food.in_bounds(game.grid_size()));
    }

    #[test]
    fn test_hitting_left_wall_ends_game() {
        let mut game = default_game();
        game.food = Some(p(0, 19));

        assert!(game.handle_input(Direction::Left));
        for _ in 0..7 {
            assert_eq!(game.tick(), TickOutcome::Moved);
        }
        assert_eq!(game.head(), p(8, 0));

        let before = game.snake().clone();
        assert_eq!(game.tick(), TickOutcome::GameOver(GameOverCause::Wall));
        assert!(game.is_game_over());
        assert_eq!(game.game_over_cause(), Some(GameOverCause::Wall));
        assert_eq!(game.snake(), &before);
    }

    #[test]
    fn test_hitting_bottom_wall_ends_game() {
        let mut game = default_game();
        game.snake = VecDeque::from(vec![p(19, 5), p(18, 5), p(17, 5)]);
        game.food = Some(p(0, 0));

        assert_eq!(game.tick(), TickOutcome::GameOver(GameOverCause::Wall));
        assert_eq!(game.head(), p(19, 5));
    }

    #[test]
    fn test_hitting_right_wall_ends_game() {
        let mut game = default_game();
        game.snake = VecDeque::from(vec![p(4, 19), p(4, 18), p(4, 17)]);
        game.direction = Direction::Right;
        game.food = Some(p(0, 0));

        let before = game.snake().clone();
        assert_eq!(game.tick(), TickOutcome::GameOver(GameOverCause::Wall));
        assert!(game.is_game_over());
        assert_eq!(game.snake(), &before);
        assert_eq!(game.head(), p(4, 19));
    }

    #[test]
    fn test_hitting_own_body_ends_game() {
        let mut game = default_game();
        game.snake = VecDeque::from(vec![p(5, 5), p(5, 6), p(6, 6), p(6, 5), p(6, 4)]);
        game.direction = Direction::Left;
        game.food = Some(p(0, 0));

        assert!(game.handle_input(Direction::Down));
        assert_eq!(
            game.tick(),
            TickOutcome::GameOver(GameOverCause::SelfCollision)
        );
        assert_eq!(game.snake().len(), 5);
    }

    #[test]
    fn test_moving_into_tail_cell_ends_game() {
        let mut game = default_game();
        game.snake = VecDeque::from(vec![p(5, 5), p(5, 6), p(6, 6), p(6, 5)]);
        game.direction = Direction::Left;
        game.food = Some(p(0, 0));

        game.handle_input(Direction::Down);
        assert_eq!(
            game.tick(),
            TickOutcome::GameOver(GameOverCause::SelfCollision)
        );
    }

    #[test]
    fn test_turning_into_neck_at_start_is_fatal() {
        // The initial body trails to the right while heading down
        let mut game = default_game();
        game.food = Some(p(0, 0));

        assert!(game.handle_input(Direction::Right));
        assert_eq!(
            game.tick(),
            TickOutcome::GameOver(GameOverCause::SelfCollision)
        );
    }

    #[test]
    fn test_cannot_reverse_direction() {
        let mut game = default_game();
        game.direction = Direction::Left;

        assert!(!game.handle_input(Direction::Right));
        assert_eq!(game.pending_direction(), None);
    }

    #[test]
    fn test_later_input_overwrites_pending() {
        let mut game = default_game();
        game.food = Some(p(0, 0));

        assert!(game.handle_input(Direction::Left));
        assert!(game.handle_input(Direction::Down));
        assert_eq!(game.pending_direction(), Some(Direction::Down));

        game.tick();
        assert_eq!(game.head(), p(9, 7));
    }

    #[test]
    fn test_reverse_is_checked_against_committed_direction() {
        let mut game = default_game();

        assert!(game.handle_input(Direction::Left));
        // Up reverses the committed Down, even with Left pending
        assert!(!game.handle_input(Direction::Up));
        assert_eq!(game.pending_direction(), Some(Direction::Left));
    }

    #[test]
    fn test_pending_direction_consumed_once() {
        let mut game = default_game();
        game.food = Some(p(0, 0));

        game.handle_input(Direction::Left);
        game.tick();
        assert_eq!(game.direction(), Direction::Left);
        assert_eq!(game.pending_direction(), None);
        assert_eq!(game.head(), p(8, 6));

        game.tick();
        assert_eq!(game.head(), p(8, 5));
    }

    #[test]
    fn test_handle_key_ignores_non_arrows() {
        let mut game = default_game();

        assert!(!game.handle_key("a"));
        assert!(!game.handle_key(" "));
        assert_eq!(game.pending_direction(), None);

        assert!(game.handle_key("ArrowLeft"));
        assert_eq!(game.pending_direction(), Some(Direction::Left));
        assert!(!game.handle_key("ArrowUp"));
    }

    #[test]
    fn test_game_over_freezes_state() {
        let mut game = default_game();
        game.snake = VecDeque::from(vec![p(19, 5), p(18, 5), p(17, 5)]);
        game.tick();
        assert!(game.is_game_over());

        let snake = game.snake().clone();
        assert!(!game.handle_input(Direction::Left));
        assert_eq!(game.pending_direction(), None);
        assert_eq!(game.tick(), TickOutcome::Idle);
        assert_eq!(game.snake(), &snake);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut game = default_game();
        game.food = Some(p(9, 7));
        game.tick();
        assert_eq!(game.score(), 1);

        game.snake = VecDeque::from(vec![p(19, 5), p(18, 5), p(17, 5)]);
        game.tick();
        assert!(game.is_game_over());

        game.restart();
        assert_eq!(game.snake(), &vec![p(8, 7), p(8, 8), p(8, 9)]);
        assert_eq!(game.score(), 0);
        assert!(!game.is_game_over());
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.direction(), Direction::Down);
        assert!(!game.snake().contains(&game.food().unwrap()));
    }

    #[test]
    fn test_filling_board_ends_game() {
        let config = GameConfig {
            grid_size: 2,
            initial_snake: vec![p(0, 0), p(0, 1), p(1, 1)],
            initial_direction: Direction::Down,
            ..Default::default()
        };
        let mut game = Game::with_seed(config, 1).unwrap();
        assert_eq!(game.food(), Some(p(1, 0)));

        assert_eq!(
            game.tick(),
            TickOutcome::GameOver(GameOverCause::BoardFull)
        );
        assert_eq!(game.score(), 1);
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.food(), None);
    }

    #[test]
    fn test_cell_at_classifies_cells() {
        let mut game = default_game();
        game.food = Some(p(0, 0));

        assert_eq!(game.cell_at(p(8, 7)), Cell::SnakeHead);
        assert_eq!(game.cell_at(p(8, 9)), Cell::Snake);
        assert_eq!(game.cell_at(p(0, 0)), Cell::Food);
        assert_eq!(game.cell_at(p(5, 5)), Cell::Empty);
    }

    #[test]
    fn test_same_seed_same_food() {
        let a = Game::with_seed(GameConfig::default(), 42).unwrap();
        let b = Game::with_seed(GameConfig::default(), 42).unwrap();
        assert_eq!(a.food(), b.food());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Game::new(GameConfig::with_grid_size(5));
        assert!(matches!(
            result,
            Err(ConfigError::SegmentOutOfBounds { size: 5, .. })
        ));
    }

    #[test]
    fn test_oversized_grid_is_rejected_before_placing_food() {
        let result = Game::with_seed(GameConfig::with_grid_size(50_000), 1);
        assert!(matches!(result, Err(ConfigError::GridTooLarge(50_000))));
    }

    #[test]
    fn test_default_game_is_playable() {
        let game = Game::default();
        assert_eq!(game.grid_size(), 20);
        assert_eq!(game.snake().len(), 3);
        assert!(game.food().is_some());
        assert_eq!(game.state(), GameState::Playing);
    }
}
