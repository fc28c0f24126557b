use crate::entity::Direction;
use crate::game::Game;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Direction(Direction),
    Quit,
    Restart,
}

impl Input {
    /// Applies the input to the engine. Restart only takes effect once the
    /// game is over. Returns false for `Quit`, which the host handles.
    pub fn apply(self, game: &mut Game) -> bool {
        match self {
            Input::Direction(direction) => {
                game.handle_input(direction);
            }
            Input::Restart if game.is_game_over() => game.restart(),
            Input::Restart => {}
            Input::Quit => return false,
        }
        true
    }
}

/// FIFO of inputs shared between event callbacks and the game loop.
///
/// Every event is kept until the loop drains it, so two key presses between
/// frames both reach the engine in order.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    inputs: Rc<RefCell<VecDeque<Input>>>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, input: Input) {
        self.inputs.borrow_mut().push_back(input);
    }

    pub fn pop(&self) -> Option<Input> {
        self.inputs.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inputs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.borrow().is_empty()
    }
}

/// Trait that abstracts rendering implementation.
/// This allows for different rendering backends (CLI, Web, etc.)
pub trait Renderer {
    /// Initialize the renderer
    fn init(&mut self) -> io::Result<()>;

    /// Render the current game state
    fn render(&mut self, game: &Game) -> io::Result<()>;

    /// Clean up and restore terminal/display state
    fn cleanup(&mut self) -> io::Result<()>;

    /// Poll for input from the user
    fn poll_input(&mut self) -> io::Result<Option<Input>>;
}
