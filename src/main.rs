mod app;
mod ui;

use std::io::{self, Stdout};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use fruitcade::config::LauncherOptions;
use fruitcade::event::{Event, EventHandler};
use fruitcade::{launcher, logging};

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()
}

fn main() -> anyhow::Result<()> {
    let opts = LauncherOptions::parse();
    logging::init();
    let games_dir = opts.games_dir.unwrap_or_else(launcher::default_games_dir);
    log::info!("launcher started, games in {}", games_dir.display());

    let mut terminal = setup_terminal().context("setting up terminal")?;
    let mut app = App::new();
    let mut events = EventHandler::new(std::time::Duration::from_millis(50));

    let result = run(&mut terminal, &mut app, &mut events, &games_dir);
    restore_terminal(&mut terminal)?;
    result
}

fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler, games_dir: &std::path::Path) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(variant) = app.take_pending() {
            // The child takes over the terminal until it exits.
            restore_terminal(terminal)?;
            let result = launcher::run_game(&launcher::game_path(games_dir, variant), variant);
            *terminal = setup_terminal()?;
            events.resync();
            app.finish(variant, result);
            continue;
        }

        match events.next()? {
            Event::Tick | Event::Mouse(_) => {}
            Event::Key(key) => app.on_key(key),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
