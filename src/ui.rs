//! Terminal front end: turns key presses into simulation intents and draws
//! snapshots with ratatui.

use crate::grid::{Cell, Direction};
use crate::shared::SharedSimulation;
use crate::sim::{Outcome, Snapshot};
use crate::ticker::Ticker;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::info;
use ratatui::{
    buffer::Buffer,
    layout::{self, Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Terminal columns per board cell, so cells come out roughly square.
const CELL_WIDTH: u16 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Running,
    Paused,
    Exit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Turn(Direction),
    TogglePause,
    Restart,
    Quit,
    None,
}

pub fn intent_for(key: KeyEvent) -> Intent {
    if key.kind != KeyEventKind::Press {
        return Intent::None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Intent::Quit;
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Intent::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Intent::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Intent::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            Intent::Turn(Direction::Right)
        }
        KeyCode::Char(' ') => Intent::TogglePause,
        KeyCode::Char('r') | KeyCode::Char('R') => Intent::Restart,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Intent::Quit,
        _ => Intent::None,
    }
}

/// Owns the ticker and forwards player intents to the shared simulation.
pub struct App {
    sim: Arc<SharedSimulation>,
    ticker: Option<Ticker>,
    tick_interval: Duration,
    mode: Mode,
}

impl App {
    pub fn new(sim: Arc<SharedSimulation>, tick_interval: Duration) -> io::Result<App> {
        let ticker = Ticker::spawn(Arc::clone(&sim), tick_interval)?;
        Ok(App {
            sim,
            ticker: Some(ticker),
            tick_interval,
            mode: Mode::Running,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> io::Result<()> {
        match (intent_for(key), self.mode) {
            (_, Mode::Exit) | (Intent::None, _) => {}
            (Intent::Quit, _) => {
                self.halt();
                self.mode = Mode::Exit;
            }
            (Intent::Restart, _) => self.restart()?,
            (Intent::TogglePause, _) if self.sim.game_over() => self.restart()?,
            (Intent::TogglePause, Mode::Running) => {
                self.halt();
                self.mode = Mode::Paused;
                info!("Paused");
            }
            (Intent::TogglePause, Mode::Paused) => {
                self.ticker = Some(Ticker::spawn(Arc::clone(&self.sim), self.tick_interval)?);
                self.mode = Mode::Running;
                info!("Resumed");
            }
            (Intent::Turn(direction), Mode::Running) => self.sim.request_turn(direction),
            (Intent::Turn(_), Mode::Paused) => {}
        }
        Ok(())
    }

    fn restart(&mut self) -> io::Result<()> {
        self.halt();
        self.sim.reset();
        self.ticker = Some(Ticker::spawn(Arc::clone(&self.sim), self.tick_interval)?);
        self.mode = Mode::Running;
        Ok(())
    }

    fn halt(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        let snapshot = self.sim.snapshot();

        let status = match self.mode {
            Mode::Paused => "    [paused, SPACE to continue]",
            _ => "",
        };
        let header = format!(
            "SNEK    Score: {}    Length: {}{}",
            snapshot.score,
            snapshot.snake.len(),
            status
        );

        let layout = Layout::default()
            .direction(layout::Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title + score
                Constraint::Min(0),    // Board
            ])
            .split(frame.area());

        frame.render_widget(
            Paragraph::new(header)
                .alignment(Alignment::Left)
                .block(Block::default().borders(Borders::ALL)),
            layout[0],
        );

        let board_area = board_rect(layout[1], snapshot.board_size);
        let block = Block::default().borders(Borders::ALL);
        let inner_area = block.inner(board_area);
        frame.render_widget(block, board_area);
        frame.render_widget(&snapshot, inner_area);

        if let Some(outcome) = snapshot.outcome {
            frame.render_widget(
                Paragraph::new(game_over_text(outcome, snapshot.score))
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::White)),
                inner_area,
            );
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.halt();
    }
}

fn game_over_text(outcome: Outcome, score: u32) -> String {
    let title = match outcome {
        Outcome::BoardFilled => "BOARD CLEARED",
        Outcome::HitWall | Outcome::HitSelf => "GAME OVER",
    };
    format!("{}\nFinal Score: {}\nPress R to restart", title, score)
}

/// The bordered board, clipped to what the terminal can show.
fn board_rect(area: Rect, board_size: u16) -> Rect {
    let width = (board_size * CELL_WIDTH + 2).min(area.width);
    let height = (board_size + 2).min(area.height);
    Rect {
        x: area.x,
        y: area.y,
        width,
        height,
    }
}

impl Widget for &Snapshot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut paint = |cell: Cell, symbols: [&str; 2], style: Style| {
            let column = cell.x * CELL_WIDTH;
            if column + CELL_WIDTH > area.width || cell.y >= area.height {
                return;
            }
            for (offset, symbol) in (0..CELL_WIDTH).zip(symbols) {
                if let Some(target) = buf.cell_mut((area.x + column + offset, area.y + cell.y)) {
                    target.set_symbol(symbol).set_style(style);
                }
            }
        };

        for &pos in self.snake.iter().skip(1) {
            paint(pos, [" ", " "], Style::default().bg(Color::Green));
        }

        if let Some(&head) = self.snake.first() {
            paint(head, [" ", " "], Style::default().bg(Color::Yellow));
        }

        if let Some(food) = self.food {
            paint(food, ["●", " "], Style::default().fg(Color::LightRed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GridSimulation, SimConfig};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn snapshot_at(snake: [Cell; 3], food: Cell) -> Snapshot {
        GridSimulation::with_layout(
            SimConfig::new(6).with_seed(1),
            snake,
            Direction::Right,
            food,
        )
        .unwrap()
        .snapshot()
    }

    #[test]
    fn test_arrow_and_wasd_keys() {
        assert_eq!(intent_for(press(KeyCode::Up)), Intent::Turn(Direction::Up));
        assert_eq!(intent_for(press(KeyCode::Char('s'))), Intent::Turn(Direction::Down));
        assert_eq!(intent_for(press(KeyCode::Char('A'))), Intent::Turn(Direction::Left));
        assert_eq!(intent_for(press(KeyCode::Right)), Intent::Turn(Direction::Right));
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(intent_for(press(KeyCode::Char(' '))), Intent::TogglePause);
        assert_eq!(intent_for(press(KeyCode::Char('r'))), Intent::Restart);
        assert_eq!(intent_for(press(KeyCode::Esc)), Intent::Quit);
        assert_eq!(
            intent_for(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Intent::Quit
        );
        assert_eq!(intent_for(press(KeyCode::Char('x'))), Intent::None);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut key = press(KeyCode::Up);
        key.kind = KeyEventKind::Release;
        assert_eq!(intent_for(key), Intent::None);
    }

    #[test]
    fn test_render_board_cells() {
        let snapshot = snapshot_at(
            [Cell::new(2, 1), Cell::new(1, 1), Cell::new(0, 1)],
            Cell::new(4, 3),
        );
        let area = Rect::new(0, 0, 12, 6);
        let mut buf = Buffer::empty(area);
        (&snapshot).render(area, &mut buf);

        assert_eq!(buf[(4, 1)].bg, Color::Yellow);
        assert_eq!(buf[(5, 1)].bg, Color::Yellow);
        assert_eq!(buf[(2, 1)].bg, Color::Green);
        assert_eq!(buf[(0, 1)].bg, Color::Green);
        assert_eq!(buf[(8, 3)].symbol(), "●");
        assert_eq!(buf[(8, 3)].fg, Color::LightRed);
    }

    #[test]
    fn test_render_clips_to_small_area() {
        let snapshot = snapshot_at(
            [Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)],
            Cell::new(0, 0),
        );
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        (&snapshot).render(area, &mut buf);

        // Only the food at the origin fits.
        assert_eq!(buf[(0, 0)].symbol(), "●");
    }

    #[test]
    fn test_pause_and_resume() {
        let sim = Arc::new(SharedSimulation::new(SimConfig::new(20).with_seed(4)).unwrap());
        let mut app = App::new(Arc::clone(&sim), Duration::from_secs(3600)).unwrap();
        assert_eq!(app.mode(), Mode::Running);

        app.handle_input(press(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.mode(), Mode::Paused);
        assert!(app.ticker.is_none());

        app.handle_input(press(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.mode(), Mode::Running);
        assert!(app.ticker.is_some());

        app.handle_input(press(KeyCode::Char('q'))).unwrap();
        assert_eq!(app.mode(), Mode::Exit);
        assert!(app.ticker.is_none());
    }

    #[test]
    fn test_game_over_text() {
        assert!(game_over_text(Outcome::HitWall, 4).starts_with("GAME OVER\nFinal Score: 4"));
        assert!(game_over_text(Outcome::BoardFilled, 6).starts_with("BOARD CLEARED"));
    }
}
