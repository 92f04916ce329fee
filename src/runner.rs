//! The per-process game loop shared by the three game binaries.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use image::RgbImage;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use crate::camera::{self, VideoFrame};
use crate::config::{CapturePolicy, GameOptions, Variant};
use crate::error::Result;
use crate::event::{Event, EventHandler};
use crate::games::{self, FrameInput};
use crate::landmarks::{LandmarkProvider, PointerTracker};
use crate::logging;

#[cfg(unix)]
const CONSOLE: &str = "/dev/tty";
#[cfg(windows)]
const CONSOLE: &str = "CONOUT$";

type Backend = CrosstermBackend<Box<dyn Write>>;

/// Owns the terminal while a game runs and puts it back on drop.
struct TerminalGuard {
    terminal: Terminal<Backend>,
}

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        // stdout is reserved for the score line when a launcher captures it.
        let mut out: Box<dyn Write> = if io::stdout().is_terminal() {
            Box::new(io::stdout())
        } else {
            Box::new(
                OpenOptions::new()
                    .write(true)
                    .open(CONSOLE)
                    .with_context(|| format!("opening {CONSOLE}"))?,
            )
        };
        enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(out))?;
        terminal.clear()?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = self.terminal.show_cursor();
    }
}

/// Esc and Ctrl+C close the game from any screen.
pub fn is_quit(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') | KeyCode::Char('C') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// What the loop does with one capture attempt.
#[derive(Debug)]
pub enum FrameStep {
    Frame(VideoFrame),
    Skip,
    Stop,
}

/// A failed read counts as no frame; no frame stops or skips per `policy`.
pub fn capture_step(result: Result<Option<VideoFrame>>, policy: CapturePolicy) -> FrameStep {
    let frame = match result {
        Ok(frame) => frame,
        Err(err) => {
            log::warn!("frame capture failed: {err}");
            None
        }
    };
    match (frame, policy) {
        (Some(frame), _) => FrameStep::Frame(frame),
        (None, CapturePolicy::Skip) => FrameStep::Skip,
        (None, CapturePolicy::Abort) => FrameStep::Stop,
    }
}

/// Runs one game to completion and prints `Score: <n>` to stdout on every
/// exit path.
pub fn run(variant: Variant) -> ExitCode {
    let opts = GameOptions::parse();
    logging::init();

    let mut score = 0;
    let result = play(variant, &opts, &mut score);
    println!("Score: {score}");
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{} failed: {err:#}", variant.title());
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn play(variant: Variant, opts: &GameOptions, score: &mut u32) -> anyhow::Result<()> {
    let config = variant.config();
    let origin = Instant::now();
    let mut game = games::build(variant, &opts.assets, Duration::ZERO)
        .with_context(|| format!("loading assets from {}", opts.assets.display()))?;
    let mut source = camera::open_source(opts).context("opening frame source")?;
    log::info!("{} started, frames from {}", variant.title(), source.label());

    let mut tracker = PointerTracker::new();
    let mut guard = TerminalGuard::enter()?;
    let mut events = EventHandler::new(config.tick_rate());
    let mut background = RgbImage::new(1, 1);

    loop {
        let event = events.next()?;
        let now = origin.elapsed();
        match event {
            Event::Key(key) => {
                if is_quit(&key) {
                    break;
                }
                if key.code == KeyCode::Char(' ') {
                    tracker.toggle_mouth();
                }
                game.handle_input(key, now);
            }
            Event::Mouse(mouse) => {
                let size = guard.terminal.size()?;
                tracker.on_mouse(mouse, Rect::new(0, 0, size.width, size.height));
            }
            Event::Tick => {
                let frame = match capture_step(source.next_frame(), config.capture) {
                    FrameStep::Frame(frame) => frame,
                    FrameStep::Skip => continue,
                    FrameStep::Stop => {
                        log::warn!("no frame from {}, stopping", source.label());
                        break;
                    }
                };
                let landmarks = tracker.detect(&frame);
                background = frame.image;

                game.update(&FrameInput {
                    now,
                    landmarks: landmarks.as_ref(),
                });
                for cue in game.drain_cues() {
                    log::debug!("cue {:?}", cue);
                }
                guard.terminal.draw(|frame| {
                    let area = frame.area();
                    game.render(frame, area, &background);
                })?;
            }
        }

        *score = game.get_score();
        if game.should_quit() {
            break;
        }
    }

    log::info!("{} finished with score {}", variant.title(), score);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;

    #[test]
    fn quit_keys() {
        assert!(is_quit(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_quit(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    }

    fn frame() -> VideoFrame {
        VideoFrame {
            image: RgbImage::new(2, 2),
            index: 7,
        }
    }

    #[test]
    fn frames_pass_through_either_policy() {
        for policy in [CapturePolicy::Abort, CapturePolicy::Skip] {
            match capture_step(Ok(Some(frame())), policy) {
                FrameStep::Frame(f) => assert_eq!(f.index, 7),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn missing_frame_stops_or_skips() {
        assert!(matches!(capture_step(Ok(None), CapturePolicy::Abort), FrameStep::Stop));
        assert!(matches!(capture_step(Ok(None), CapturePolicy::Skip), FrameStep::Skip));
        for variant in [Variant::Catcher, Variant::Slicer] {
            assert!(matches!(capture_step(Ok(None), variant.config().capture), FrameStep::Stop));
        }
        assert!(matches!(capture_step(Ok(None), Variant::Eater.config().capture), FrameStep::Skip));
    }

    #[test]
    fn capture_error_counts_as_no_frame() {
        let err = || Err(GameError::Capture("device unplugged".into()));
        assert!(matches!(capture_step(err(), CapturePolicy::Abort), FrameStep::Stop));
        assert!(matches!(capture_step(err(), CapturePolicy::Skip), FrameStep::Skip));
    }
}
