use ratatui::prelude::*;
use ratatui::widgets::*;

use fruitcade::config::Variant;

const BANNER: &str = r#"
 ╔════════════════════════════════════════════════════════════════════════╗
 ║  ███████╗██████╗ ██╗   ██╗██╗████████╗ ██████╗ █████╗ ██████╗ ███████╗  ║
 ║  ██╔════╝██╔══██╗██║   ██║██║╚══██╔══╝██╔════╝██╔══██╗██╔══██╗██╔════╝  ║
 ║  █████╗  ██████╔╝██║   ██║██║   ██║   ██║     ███████║██║  ██║█████╗    ║
 ║  ██╔══╝  ██╔══██╗██║   ██║██║   ██║   ██║     ██╔══██║██║  ██║██╔══╝    ║
 ║  ██║     ██║  ██║╚██████╔╝██║   ██║   ╚██████╗██║  ██║██████╔╝███████╗  ║
 ║  ╚═╝     ╚═╝  ╚═╝ ╚═════╝ ╚═╝   ╚═╝    ╚═════╝╚═╝  ╚═╝╚═════╝ ╚══════╝  ║
 ╚════════════════════════════════════════════════════════════════════════╝"#;

pub struct GameTile {
    pub key: &'static str,
    pub icon: &'static str,
    pub desc: &'static str,
    pub color: Color,
    pub border_color: Color,
}

/// In `Variant::all()` order.
pub const GAME_TILES: [GameTile; 3] = [
    GameTile { key: "1", icon: "👃🍎", desc: "Slice fruit with\nyour nose!", color: Color::Rgb(255, 120, 80), border_color: Color::Rgb(140, 60, 40) },
    GameTile { key: "2", icon: "😋🍌", desc: "Open wide and\neat the fruit!", color: Color::Rgb(255, 200, 60), border_color: Color::Rgb(140, 110, 30) },
    GameTile { key: "3", icon: "👐🍒", desc: "Hands together\nto catch fruit!", color: Color::Rgb(80, 220, 120), border_color: Color::Rgb(40, 120, 60) },
];

fn render_game_tile(frame: &mut Frame, area: Rect, variant: Variant, best: Option<u32>, selected: bool) {
    let tile = &GAME_TILES[variant.index()];
    let border_color = if selected { Color::Rgb(255, 220, 80) } else { tile.border_color };
    let border_type = if selected { BorderType::Double } else { BorderType::Rounded };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 || inner.width == 0 { return; }

    let mut lines: Vec<Line> = Vec::new();

    let name_color = if selected { Color::Rgb(255, 255, 255) } else { tile.color };
    lines.push(Line::from(vec![
        Span::styled(format!("[{}] ", tile.key), Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        Span::styled(format!("{} ", tile.icon), Style::default()),
        Span::styled(variant.title(), Style::default().fg(name_color).add_modifier(Modifier::BOLD)),
    ]));

    for desc_line in tile.desc.split('\n') {
        lines.push(Line::from(vec![
            Span::styled(desc_line, Style::default().fg(if selected { Color::Rgb(180, 180, 200) } else { Color::Rgb(120, 120, 140) })),
        ]));
    }

    let best_text = match best {
        Some(score) => format!("Best: {}", score),
        None => "Best: -".to_string(),
    };
    lines.push(Line::from(Span::styled(best_text, Style::default().fg(Color::Rgb(255, 215, 0)))));

    if selected {
        lines.push(Line::from(vec![
            Span::styled("▶ Enter to play", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        ]));
    }

    let p = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(p, inner);
}

fn key_line(keys: &'static str, action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("    {:<17}", keys), Style::default().fg(Color::Rgb(80, 200, 255))),
        Span::styled(action, Style::default().fg(Color::Rgb(140, 140, 140))),
    ])
}

fn game_controls(variant: Variant) -> Vec<Line<'static>> {
    let tile = &GAME_TILES[variant.index()];
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {} {}", tile.icon, variant.title()), Style::default().fg(tile.color).add_modifier(Modifier::BOLD)),
        ]),
    ];
    match variant {
        Variant::Slicer => {
            lines.push(Line::from(Span::styled("  Bombs cost a life, 15 points buy one back", Style::default().fg(Color::Rgb(100, 100, 120)))));
            lines.push(Line::from(""));
            lines.push(key_line("Mouse", "Move your nose"));
            lines.push(key_line("R", "Restart after game over"));
            lines.push(key_line("Q", "Quit after game over"));
        }
        Variant::Eater => {
            lines.push(Line::from(Span::styled("  One bomb and the meal is over", Style::default().fg(Color::Rgb(100, 100, 120)))));
            lines.push(Line::from(""));
            lines.push(key_line("Mouse", "Move your mouth"));
            lines.push(key_line("Left button", "Hold mouth open"));
            lines.push(key_line("Space", "Toggle mouth open"));
        }
        Variant::Catcher => {
            lines.push(Line::from(Span::styled("  Missed fruit and bombs cost a life", Style::default().fg(Color::Rgb(100, 100, 120)))));
            lines.push(Line::from(""));
            lines.push(key_line("Mouse", "Move the basket"));
            lines.push(key_line("R", "Restart after game over"));
            lines.push(key_line("Q", "Quit after game over"));
        }
    }
    lines.push(key_line("Esc / Ctrl+C", "Leave the game"));
    lines
}

pub fn render_home(frame: &mut Frame, area: Rect, selected_game: usize, best: &[Option<u32>; 3], banner: Option<&str>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Banner
            Constraint::Length(2),  // Subtitle or error
            Constraint::Length(8),  // Game tiles
            Constraint::Min(9),     // Controls area
            Constraint::Length(2),  // Footer
        ])
        .split(area);

    let logo = Paragraph::new(BANNER)
        .style(Style::default().fg(Color::Rgb(255, 140, 60)))
        .alignment(Alignment::Center);
    frame.render_widget(logo, chunks[0]);

    let subtitle = match banner {
        Some(message) => Line::from(Span::styled(
            format!("  ⚠ {} ", message),
            Style::default()
                .fg(Color::Rgb(255, 90, 90))
                .add_modifier(Modifier::BOLD),
        )),
        None => Line::from(Span::styled(
            "  🍉 Fruit Games For Your Terminal 🍉  ",
            Style::default()
                .fg(Color::Rgb(255, 220, 80))
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        )),
    };
    frame.render_widget(Paragraph::new(subtitle).alignment(Alignment::Center), chunks[1]);

    let games_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(" 🎮 Games: ←→ Select, Enter to Play ")
        .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD));
    let games_inner = games_block.inner(chunks[2]);
    frame.render_widget(games_block, chunks[2]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(games_inner);
    for (i, variant) in Variant::all().iter().enumerate() {
        render_game_tile(frame, cols[i], *variant, best[i], selected_game == i);
    }

    let ctrl_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(60),
        ])
        .split(chunks[3]);

    let controls = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  🔧 Navigation", Style::default().fg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD)),
        ]),
        key_line("1-3", "Launch game"),
        key_line("← →", "Select game"),
        key_line("Enter", "Play selected"),
        key_line("q / Esc / Ctrl+C", "Quit"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
            .title(" ⌨ Navigation Control ")
            .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(controls, ctrl_cols[0]);

    let variant = Variant::all()[selected_game];
    let game_ctrl = Paragraph::new(game_controls(variant))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Rgb(50, 100, 140)))
                .title(format!(" 🎮 {} Control ", variant.title()))
                .title_style(Style::default().fg(GAME_TILES[selected_game].color).add_modifier(Modifier::BOLD)),
        );
    frame.render_widget(game_ctrl, ctrl_cols[1]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("  🦀 ", Style::default().fg(Color::Rgb(255, 100, 50))),
        Span::styled(concat!("v", env!("CARGO_PKG_VERSION")), Style::default().fg(Color::Rgb(80, 80, 100))),
        Span::styled("  │  ", Style::default().fg(Color::Rgb(40, 40, 60))),
        Span::styled("Best scores last until you quit", Style::default().fg(Color::Rgb(100, 100, 130))),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[4]);
}

/// Result screen shown after a game exits normally.
pub fn render_post_game(frame: &mut Frame, area: Rect, variant: Variant, score: u32, play_again: bool) {
    let overlay_w = 44u16.min(area.width.saturating_sub(4));
    let overlay_h = 11u16.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(overlay_w)) / 2;
    let y = area.y + (area.height.saturating_sub(overlay_h)) / 2;
    let overlay_area = Rect::new(x, y, overlay_w, overlay_h);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Rgb(255, 220, 80)))
        .title(format!(" {} ", variant.title()))
        .title_style(Style::default().fg(GAME_TILES[variant.index()].color).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let button = |label: &'static str, active: bool| {
        if active {
            Span::styled(format!("[ {} ]", label), Style::default().fg(Color::Rgb(15, 15, 25)).bg(Color::Rgb(255, 220, 80)).add_modifier(Modifier::BOLD))
        } else {
            Span::styled(format!("[ {} ]", label), Style::default().fg(Color::Rgb(140, 140, 160)))
        }
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("💀 Game Over!!!", Style::default().fg(Color::Rgb(255, 90, 90)).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(format!("Score: {}", score), Style::default().fg(Color::Rgb(255, 215, 0)).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(vec![button("Menu", !play_again), Span::raw("   "), button("Play Again", play_again)]),
        Line::from(""),
        Line::from(Span::styled("←→ choose  Enter confirm", Style::default().fg(Color::Rgb(100, 100, 130)))),
    ];

    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    frame.render_widget(p, inner);
}

pub fn render_running(frame: &mut Frame, area: Rect, variant: Variant) {
    let tile = &GAME_TILES[variant.index()];
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("{} Starting {}…", tile.icon, variant.title()), Style::default().fg(tile.color).add_modifier(Modifier::BOLD))),
    ];
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Length(3), Constraint::Min(0)])
        .split(area);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rows[1]);
}
