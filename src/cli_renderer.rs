use crate::entity::{Direction, Position};
use crate::game::{Cell, Game, GameOverCause};
use crate::renderer::{Input, Renderer};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

pub struct CliRenderer {
    last_render: Instant,
    target_frame_time: Duration,
}

impl CliRenderer {
    pub fn new() -> Self {
        Self {
            last_render: Instant::now(),
            // Target 30 FPS for smooth rendering
            target_frame_time: Duration::from_millis(33),
        }
    }

    fn draw_cell(&self, cell: Cell, stdout: &mut io::Stdout) -> io::Result<()> {
        match cell {
            Cell::Empty => {
                queue!(stdout, SetBackgroundColor(Color::Black), Print("  "))?;
            }
            Cell::Snake => {
                queue!(stdout, SetBackgroundColor(Color::DarkGreen), Print("  "))?;
            }
            Cell::SnakeHead => {
                queue!(
                    stdout,
                    SetBackgroundColor(Color::Green),
                    SetForegroundColor(Color::Black),
                    Print("@@")
                )?;
            }
            Cell::Food => {
                queue!(
                    stdout,
                    SetBackgroundColor(Color::Black),
                    SetForegroundColor(Color::Red),
                    Print("()")
                )?;
            }
        }
        Ok(())
    }

    fn draw_info(&self, game: &Game, stdout: &mut io::Stdout) -> io::Result<()> {
        let size = game.grid_size() as u16;

        queue!(
            stdout,
            cursor::MoveTo(0, size + 1),
            ResetColor,
            terminal::Clear(ClearType::CurrentLine),
            Print(format!("Score: {}  Length: {}", game.score(), game.snake().len()))
        )?;

        queue!(
            stdout,
            cursor::MoveTo(0, size + 2),
            Print("Controls: Arrow Keys to move | Q to quit | R to restart")
        )?;

        queue!(
            stdout,
            cursor::MoveTo(0, size + 3),
            terminal::Clear(ClearType::CurrentLine)
        )?;
        if let Some(cause) = game.game_over_cause() {
            let message = match cause {
                GameOverCause::BoardFull => "BOARD FILLED! Press R to restart",
                GameOverCause::Wall | GameOverCause::SelfCollision => {
                    "GAME OVER! Press R to restart"
                }
            };
            queue!(
                stdout,
                SetForegroundColor(Color::Red),
                Print(message),
                ResetColor
            )?;
        }

        Ok(())
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;
        Ok(())
    }

    fn render(&mut self, game: &Game) -> io::Result<()> {
        // Frame rate limiting: skip rendering if not enough time has passed
        if self.last_render.elapsed() < self.target_frame_time {
            return Ok(());
        }

        self.last_render = Instant::now();

        let mut stdout = io::stdout();

        queue!(stdout, cursor::MoveTo(0, 0))?;

        for row in 0..game.grid_size() {
            for col in 0..game.grid_size() {
                self.draw_cell(game.cell_at(Position::new(row, col)), &mut stdout)?;
            }
            queue!(stdout, ResetColor, Print("\r\n"))?;
        }

        self.draw_info(game, &mut stdout)?;

        stdout.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Option<Input>> {
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
                // Windows reports releases too
                if kind != KeyEventKind::Press {
                    return Ok(None);
                }
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                        return Ok(Some(Input::Quit));
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => {
                        return Ok(Some(Input::Restart));
                    }
                    KeyCode::Up => return Ok(Some(Input::Direction(Direction::Up))),
                    KeyCode::Down => return Ok(Some(Input::Direction(Direction::Down))),
                    KeyCode::Left => return Ok(Some(Input::Direction(Direction::Left))),
                    KeyCode::Right => return Ok(Some(Input::Direction(Direction::Right))),
                    _ => {}
                }
            }
        }
        Ok(None)
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
