pub mod catcher;
pub mod eater;
pub mod slicer;

use std::path::Path;
use std::time::Duration;

use crossterm::event::KeyEvent;
use image::RgbImage;
use rand::Rng;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::assets::{CatcherAssets, Manifest, SheetAssets, SpriteSheet};
use crate::canvas::Canvas;
use crate::config::Variant;
use crate::error::Result;
use crate::landmarks::Landmarks;
use crate::objects::ObjectKind;

/// What the render loop hands a game every tick.
pub struct FrameInput<'a> {
    pub now: Duration,
    pub landmarks: Option<&'a Landmarks>,
}

/// Sound effects a game asks for. Playback happens outside the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Slice,
    Explosion,
}

pub trait Game {
    fn update(&mut self, input: &FrameInput<'_>);
    fn handle_input(&mut self, key: KeyEvent, now: Duration);
    fn render(&mut self, frame: &mut Frame, area: Rect, background: &RgbImage);
    fn reset(&mut self, now: Duration);
    fn get_score(&self) -> u32;
    fn is_game_over(&self) -> bool;
    fn should_quit(&self) -> bool;
    fn drain_cues(&mut self) -> Vec<Cue>;
}

pub fn build(variant: Variant, assets_dir: &Path, now: Duration) -> Result<Box<dyn Game>> {
    let manifest = Manifest::load(assets_dir)?;
    Ok(match variant {
        Variant::Catcher => {
            let assets = CatcherAssets::load(assets_dir, &manifest.catcher)?;
            Box::new(catcher::Catcher::new(assets, now))
        }
        Variant::Slicer => {
            let assets = SheetAssets::load(assets_dir, &manifest.slicer)?;
            Box::new(slicer::Slicer::new(assets, now))
        }
        Variant::Eater => {
            let assets = SheetAssets::load(assets_dir, &manifest.eater)?;
            Box::new(eater::Eater::new(assets, now))
        }
    })
}

/// Sprite sheet pick shared by the slicing and eating variants: a uniform
/// choice of sheet and a scale in 0.60..=0.80 rounded to two places.
pub(crate) struct SheetPick {
    pub sprite: usize,
    pub kind: ObjectKind,
    pub width: f32,
    pub height: f32,
}

pub(crate) fn pick_sheet<R: Rng>(rng: &mut R, sheets: &[SpriteSheet]) -> SheetPick {
    let sprite = rng.gen_range(0..sheets.len());
    let scale = (rng.gen_range(0.6f32..=0.8) * 100.0).round() / 100.0;
    let (fw, fh) = sheets[sprite].frame_size();
    SheetPick {
        sprite,
        kind: sheets[sprite].kind,
        width: fw as f32 * scale,
        height: fh as f32 * scale,
    }
}

pub(crate) fn paint(frame: &mut Frame, area: Rect, canvas: &Canvas) {
    frame.render_widget(Paragraph::new(canvas.to_lines()), area);
}

/// Bold text on a dark backing so it reads over any camera frame.
pub(crate) fn outlined(text: impl Into<String>, color: Color) -> Span<'static> {
    Span::styled(
        format!(" {} ", text.into()),
        Style::default()
            .fg(color)
            .bg(Color::Rgb(0, 0, 0))
            .add_modifier(Modifier::BOLD),
    )
}

/// Heads-up display: `left` on the first row(s), `right` right-aligned on
/// the first row.
pub(crate) fn render_hud(frame: &mut Frame, area: Rect, left: Vec<Line<'static>>, right: Line<'static>) {
    if area.height == 0 {
        return;
    }
    let left_area = Rect::new(area.x + 1, area.y, area.width.saturating_sub(2), (left.len() as u16).min(area.height));
    frame.render_widget(Paragraph::new(left), left_area);
    let right_area = Rect::new(area.x, area.y, area.width.saturating_sub(1), 1);
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), right_area);
}

/// Centred text box drawn over the field.
pub(crate) fn render_banner(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>, accent: Color) {
    let w = (lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16 + 6).min(area.width);
    let h = (lines.len() as u16 + 2).min(area.height);
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    let banner_area = Rect::new(x, y, w, h);

    frame.render_widget(Clear, banner_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(accent))
        .style(Style::default().bg(Color::Rgb(15, 15, 25)));
    let inner = block.inner(banner_area);
    frame.render_widget(block, banner_area);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

pub(crate) fn help_line(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::Rgb(140, 140, 160))))
}
