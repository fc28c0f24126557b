use crate::web_renderer::now;
use crate::{Game, GameConfig, Renderer, WebRenderer};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

struct GameLoop {
    game: Game,
    renderer: WebRenderer,
    tick_interval: f64,
    last_tick: f64,
}

impl GameLoop {
    fn new(canvas_id: &str) -> Result<Self, JsValue> {
        let config = GameConfig::default();
        let tick_interval = config.tick_interval.as_secs_f64() * 1000.0;
        let game = Game::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;

        let mut renderer = WebRenderer::new(canvas_id)?;
        renderer.init().map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(Self {
            game,
            renderer,
            tick_interval,
            last_tick: now(),
        })
    }

    fn update_frame(&mut self, current_time: f64) -> Result<(), JsValue> {
        // Drain everything queued since the last frame, in arrival order
        while let Some(input) = self
            .renderer
            .poll_input()
            .map_err(|e| JsValue::from_str(&e.to_string()))?
        {
            // There is no quitting a browser tab from here
            input.apply(&mut self.game);
        }

        // Update game logic at fixed rate
        if current_time - self.last_tick >= self.tick_interval {
            self.game.tick();
            self.last_tick = current_time;
        }

        self.renderer
            .render(&self.game)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(())
    }
}

fn request_animation_frame(callback: &Closure<dyn FnMut()>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    Ok(())
}

/// Starts the game on the `<canvas id="gameCanvas">` element.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    if crate::web_logger::init().is_err() {
        web_sys::console::warn_1(&"[WASM] Logger already installed".into());
    }

    log::info!("Starting snake initialization");
    let game_loop = Rc::new(RefCell::new(GameLoop::new("gameCanvas")?));

    // The closure reschedules itself, so it has to own a handle to itself
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let current_time = now();

        if let Err(e) = game_loop.borrow_mut().update_frame(current_time) {
            web_sys::console::error_1(&e);
            return; // Stop loop on error
        }

        if let Some(callback) = f.borrow().as_ref() {
            if let Err(e) = request_animation_frame(callback) {
                web_sys::console::error_1(&e);
            }
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        request_animation_frame(callback)?;
    }

    log::info!("Game loop started");
    Ok(())
}
