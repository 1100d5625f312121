use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gridsnek::sim::{SimConfig, DEFAULT_BOARD_SIZE};
use gridsnek::ui::{App, Mode};
use gridsnek::SharedSimulation;
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Redraw cadence, independent of the tick period.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Parser, Debug)]
#[command(name = "gridsnek", version, about = "Snake on a fixed grid, in the terminal")]
struct Cli {
    /// Board width and height in cells
    #[arg(long, default_value_t = DEFAULT_BOARD_SIZE)]
    size: u16,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "gridsnek.log")]
    log_file: PathBuf,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            board_size: self.size,
            seed: self.seed,
        }
    }
}

fn main() -> Result<(), io::Error> {
    let cli = Cli::parse();

    // Set up logging before anything else
    WriteLogger::init(cli.log_level, Config::default(), File::create(&cli.log_file)?)
        .expect("Failed to initialize logger");

    info!("Starting gridsnek with {:?}", cli);

    let sim = SharedSimulation::new(cli.sim_config()).map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    let sim = Arc::new(sim);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let result = App::new(sim, Duration::from_millis(cli.tick_ms))
        .and_then(|mut app| run(&mut terminal, &mut app));
    if let Err(e) = &result {
        error!("Game loop failed: {}", e);
    }

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Exiting gridsnek");
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    while app.mode() != Mode::Exit {
        terminal.draw(|f| app.render(f))?;

        if event::poll(FRAME_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.handle_input(key)?;
            }
        }
    }
    Ok(())
}
