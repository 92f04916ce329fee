pub mod home;
pub mod tabs;

use ratatui::prelude::*;

use crate::app::{App, PostChoice, Screen};

pub fn render(frame: &mut Frame, app: &mut App) {
    let full = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),   // Content
        ])
        .split(full);

    tabs::render_tabs(frame, app, chunks[0]);

    match app.screen {
        Screen::Menu => home::render_home(frame, chunks[1], app.selected_game, &app.best, app.banner.as_deref()),
        Screen::Running(variant) => home::render_running(frame, chunks[1], variant),
        Screen::PostGame { variant, score } => {
            home::render_home(frame, chunks[1], app.selected_game, &app.best, None);
            home::render_post_game(frame, full, variant, score, app.post_choice == PostChoice::PlayAgain);
        }
    }
}
