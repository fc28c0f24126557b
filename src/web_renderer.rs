use crate::entity::{Direction, Position};
use crate::game::{Cell, Game, GameOverCause};
use crate::renderer::{Input, InputQueue, Renderer};
use std::io;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent};

const CELL_SIZE: f64 = 20.0;
const CELL_GAP: f64 = 1.0;
const UI_HEIGHT: f64 = 60.0;
const TARGET_FRAME_TIME: f64 = 16.0; // ~60 FPS

const COLOR_BACKGROUND: &str = "#1E1E1E";
const COLOR_EMPTY: &str = "#2D2D2D";
const COLOR_SNAKE: &str = "#3CB043";
const COLOR_HEAD: &str = "#7CFC00";
const COLOR_FOOD: &str = "#E0301E";
const COLOR_UI: &str = "#FFFFFF";
const COLOR_OVERLAY: &str = "rgba(0, 0, 0, 0.6)";

/// Milliseconds from `performance.now()`, or wall-clock time where the
/// Performance API is missing.
pub(crate) fn now() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn js_err(value: JsValue) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{:?}", value))
}

/// What a frame showed, so unchanged frames can be skipped.
#[derive(Clone, PartialEq)]
struct FrameKey {
    head: Position,
    len: usize,
    food: Option<Position>,
    score: u32,
    game_over: bool,
}

impl FrameKey {
    fn from_game(game: &Game) -> Self {
        Self {
            head: game.head(),
            len: game.snake().len(),
            food: game.food(),
            score: game.score(),
            game_over: game.is_game_over(),
        }
    }
}

pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    window: web_sys::Window,
    device_pixel_ratio: f64,

    last_frame: Option<FrameKey>,
    last_render_time: f64,

    // Filled by the DOM listeners, drained by the game loop
    input_queue: InputQueue,
}

impl WebRenderer {
    pub fn new(canvas_id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        context.set_image_smoothing_enabled(false);

        // Get device pixel ratio for high DPI displays
        let device_pixel_ratio = window.device_pixel_ratio();

        Ok(Self {
            canvas,
            context,
            window,
            device_pixel_ratio,
            last_frame: None,
            last_render_time: 0.0,
            input_queue: InputQueue::new(),
        })
    }

    fn setup_keyboard_listener(&self) -> io::Result<()> {
        let input_queue = self.input_queue.clone();

        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let key = event.key();
            let input = match Direction::from_key(&key) {
                Some(direction) => Some(Input::Direction(direction)),
                None => match key.as_str() {
                    "r" | "R" | "Enter" => Some(Input::Restart),
                    _ => None,
                },
            };

            if let Some(input) = input {
                input_queue.push(input);
                event.prevent_default();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        self.window
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;

        closure.forget(); // Keep listener alive
        Ok(())
    }

    /// A click on the canvas stands in for the restart button.
    fn setup_click_listener(&self) -> io::Result<()> {
        let input_queue = self.input_queue.clone();

        let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
            input_queue.push(Input::Restart);
        }) as Box<dyn FnMut(MouseEvent)>);

        self.canvas
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(js_err)?;

        closure.forget();
        Ok(())
    }

    fn resize(&self, game: &Game) -> io::Result<(f64, f64)> {
        let display_width = game.grid_size() as f64 * CELL_SIZE;
        let display_height = game.grid_size() as f64 * CELL_SIZE + UI_HEIGHT;

        // Internal resolution (actual pixels, scaled for high DPI)
        let pixel_width = (display_width * self.device_pixel_ratio) as u32;
        let pixel_height = (display_height * self.device_pixel_ratio) as u32;

        if self.canvas.width() != pixel_width || self.canvas.height() != pixel_height {
            self.canvas.set_width(pixel_width);
            self.canvas.set_height(pixel_height);

            let element: &HtmlElement = self.canvas.unchecked_ref();
            let style = element.style();
            style
                .set_property("width", &format!("{}px", display_width))
                .map_err(js_err)?;
            style
                .set_property("height", &format!("{}px", display_height))
                .map_err(js_err)?;

            // Setting width/height resets the context transform
            self.context.set_image_smoothing_enabled(false);
            self.context
                .scale(self.device_pixel_ratio, self.device_pixel_ratio)
                .map_err(js_err)?;
        }

        Ok((display_width, display_height))
    }

    fn draw_board(&self, game: &Game) {
        for row in 0..game.grid_size() {
            for col in 0..game.grid_size() {
                let color = match game.cell_at(Position::new(row, col)) {
                    Cell::Empty => COLOR_EMPTY,
                    Cell::Snake => COLOR_SNAKE,
                    Cell::SnakeHead => COLOR_HEAD,
                    Cell::Food => COLOR_FOOD,
                };
                self.context.set_fill_style_str(color);
                self.context.fill_rect(
                    col as f64 * CELL_SIZE + CELL_GAP,
                    row as f64 * CELL_SIZE + CELL_GAP,
                    CELL_SIZE - 2.0 * CELL_GAP,
                    CELL_SIZE - 2.0 * CELL_GAP,
                );
            }
        }
    }

    fn draw_ui(&self, game: &Game) -> io::Result<()> {
        let board_size = game.grid_size() as f64 * CELL_SIZE;
        let y_offset = board_size + 10.0;

        self.context.set_fill_style_str(COLOR_UI);
        self.context.set_font("14px monospace");
        self.context.set_text_align("left");
        self.context.set_text_baseline("top");

        self.context
            .fill_text(&format!("Score: {}", game.score()), 5.0, y_offset)
            .map_err(js_err)?;
        self.context
            .fill_text("Arrow Keys: move | R / click: restart", 5.0, y_offset + 20.0)
            .map_err(js_err)?;

        if let Some(cause) = game.game_over_cause() {
            self.context.set_fill_style_str(COLOR_OVERLAY);
            self.context.fill_rect(0.0, 0.0, board_size, board_size);

            let title = match cause {
                GameOverCause::BoardFull => "Board Filled",
                GameOverCause::Wall | GameOverCause::SelfCollision => "Game Over",
            };

            self.context.set_fill_style_str(COLOR_UI);
            self.context.set_text_align("center");
            self.context.set_text_baseline("middle");
            self.context.set_font("28px monospace");
            self.context
                .fill_text(title, board_size / 2.0, board_size / 2.0 - 20.0)
                .map_err(js_err)?;
            self.context.set_font("14px monospace");
            self.context
                .fill_text(
                    "Press R or click to restart",
                    board_size / 2.0,
                    board_size / 2.0 + 15.0,
                )
                .map_err(js_err)?;
        }

        Ok(())
    }
}

impl Renderer for WebRenderer {
    fn init(&mut self) -> io::Result<()> {
        self.setup_keyboard_listener()?;
        self.setup_click_listener()?;
        self.last_render_time = now();
        Ok(())
    }

    fn render(&mut self, game: &Game) -> io::Result<()> {
        let current_time = now();

        // Frame rate limiting
        if current_time - self.last_render_time < TARGET_FRAME_TIME {
            return Ok(());
        }
        self.last_render_time = current_time;

        let frame = FrameKey::from_game(game);
        if self.last_frame.as_ref() == Some(&frame) {
            return Ok(());
        }

        let (width, height) = self.resize(game)?;

        self.context.set_fill_style_str(COLOR_BACKGROUND);
        self.context.fill_rect(0.0, 0.0, width, height);

        self.draw_board(game);
        self.draw_ui(game)?;

        self.last_frame = Some(frame);
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        // No cleanup needed for web
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Option<Input>> {
        Ok(self.input_queue.pop())
    }
}
