#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::io::Result<()> {
    cli::run()
}

// The browser build starts from `start_game` in the library instead
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use snake::{CliRenderer, Game, GameConfig, Renderer};
    use std::io;
    use std::time::Instant;

    pub fn run() -> io::Result<()> {
        // Logs go to stderr; run with `RUST_LOG=debug 2>snake.log` to keep them
        // off the game screen
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .init();

        let config = GameConfig::default();
        let (term_width, term_height) = crossterm::terminal::size()?;

        // Each cell is 2 chars wide, plus 4 lines for the info display
        let needed_width = (config.grid_size * 2) as u16;
        let needed_height = (config.grid_size + 4) as u16;
        if term_width < needed_width || term_height < needed_height {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "terminal is {}x{}, need at least {}x{}",
                    term_width, term_height, needed_width, needed_height
                ),
            ));
        }

        let mut game =
            Game::new(config).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let tick_interval = game.config().tick_interval;
        let mut renderer = CliRenderer::new();

        renderer.init()?;
        log::info!("Starting snake on a {0}x{0} grid", game.grid_size());

        let mut last_tick = Instant::now();

        loop {
            if let Some(input) = renderer.poll_input()? {
                if !input.apply(&mut game) {
                    break;
                }
            }

            // Update game logic at fixed rate
            if last_tick.elapsed() >= tick_interval {
                game.tick();
                last_tick = Instant::now();
            }

            // Let renderer decide when to actually render
            // (it manages its own frame rate internally)
            renderer.render(&game)?;
        }

        renderer.cleanup()?;
        Ok(())
    }
}
