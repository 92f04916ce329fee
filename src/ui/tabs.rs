use ratatui::prelude::*;
use ratatui::widgets::*;

use fruitcade::config::Variant;

use crate::app::{App, Screen};

const ACTIVE: Color = Color::Rgb(255, 220, 80);
const IDLE: Color = Color::Rgb(120, 120, 140);
const BEST: Color = Color::Rgb(120, 220, 140);

/// One tab: a play marker while that game runs, the title, and the best
/// score of this session once there is one.
fn tab_title(variant: Variant, best: Option<u32>, selected: bool, running: bool) -> Line<'static> {
    let title_style = if selected {
        Style::default().fg(ACTIVE).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(IDLE)
    };
    let mut spans = Vec::with_capacity(3);
    if running {
        spans.push(Span::styled("▶ ", Style::default().fg(BEST)));
    }
    spans.push(Span::styled(variant.title(), title_style));
    if let Some(score) = best {
        spans.push(Span::styled(format!(" ★{score}"), Style::default().fg(BEST)));
    }
    Line::from(spans)
}

pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let running = match app.screen {
        Screen::Running(variant) => Some(variant),
        _ => None,
    };
    let titles: Vec<Line> = Variant::all()
        .iter()
        .map(|v| {
            tab_title(
                *v,
                app.best[v.index()],
                v.index() == app.selected_game,
                running == Some(*v),
            )
        })
        .collect();

    let hint = match app.screen {
        Screen::Menu => " 1-3 pick · Enter play · q quit ",
        Screen::Running(_) => " game running ",
        Screen::PostGame { .. } => " Enter confirm · m menu ",
    };

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
                .border_type(BorderType::Rounded)
                .title(" 🍉 Fruitcade ")
                .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD))
                .title_top(Line::from(Span::styled(hint, Style::default().fg(IDLE))).right_aligned()),
        )
        .select(app.selected_game)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .divider(Span::styled(" │ ", Style::default().fg(Color::Rgb(60, 60, 80))));

    frame.render_widget(tabs, area);
}
