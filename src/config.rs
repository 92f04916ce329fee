use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Slicer,
    Eater,
    Catcher,
}

impl Variant {
    /// Menu order.
    pub fn all() -> &'static [Variant] {
        &[Variant::Slicer, Variant::Eater, Variant::Catcher]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Variant::Slicer => "Nose Fruit",
            Variant::Eater => "Fruit Eater",
            Variant::Catcher => "Fruit Catcher",
        }
    }

    pub fn binary_name(&self) -> &'static str {
        match self {
            Variant::Slicer => "nose-fruit",
            Variant::Eater => "fruit-eater",
            Variant::Catcher => "fruit-catcher",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Variant::Slicer => 0,
            Variant::Eater => 1,
            Variant::Catcher => 2,
        }
    }

    pub fn config(&self) -> VariantConfig {
        match self {
            Variant::Catcher => VariantConfig {
                width: 1280.0,
                height: 720.0,
                fps: 60,
                gravity: 900.0,
                time_total: Duration::from_secs(60),
                lives: Some(3),
                capture: CapturePolicy::Abort,
            },
            Variant::Slicer => VariantConfig {
                width: 1200.0,
                height: 686.0,
                fps: 23,
                gravity: 1000.0,
                time_total: Duration::from_secs(140),
                lives: Some(5),
                capture: CapturePolicy::Abort,
            },
            Variant::Eater => VariantConfig {
                width: 1200.0,
                height: 686.0,
                fps: 23,
                gravity: 100.0,
                time_total: Duration::from_secs(60),
                lives: None,
                capture: CapturePolicy::Skip,
            },
        }
    }
}

/// What the loop does when the frame source yields nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapturePolicy {
    Abort,
    Skip,
}

/// Fixed per-variant loop parameters. World units are pixels of a
/// full-size game window, y pointing down.
#[derive(Clone, Copy, Debug)]
pub struct VariantConfig {
    pub width: f32,
    pub height: f32,
    pub fps: u32,
    pub gravity: f32,
    pub time_total: Duration,
    pub lives: Option<u32>,
    pub capture: CapturePolicy,
}

impl VariantConfig {
    pub fn timestep(&self) -> f32 {
        1.0 / self.fps as f32
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(1_000 / self.fps as u64)
    }
}

/// Options shared by the game binaries. Every flag has an environment
/// fallback so a game launched with no arguments still picks them up.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct GameOptions {
    /// Directory holding manifest.json and the sprites it names
    #[arg(long, env = "FRUITCADE_ASSETS", default_value = "assets")]
    pub assets: PathBuf,

    /// Replay still frames from this directory instead of the test card
    #[arg(long, env = "FRUITCADE_FRAMES")]
    pub frames: Option<PathBuf>,

    /// Capture from this camera index (needs the camera-nokhwa feature)
    #[arg(long, env = "FRUITCADE_CAMERA", conflicts_with = "frames")]
    pub camera: Option<u32>,

    /// Start the frame sequence over when it runs out
    #[arg(long, env = "FRUITCADE_LOOP_FRAMES")]
    pub loop_frames: bool,
}

/// Launcher options.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fruit minigame launcher", long_about = None)]
pub struct LauncherOptions {
    /// Where the game executables live; defaults to the launcher's own directory
    #[arg(long, env = "FRUITCADE_GAMES_DIR")]
    pub games_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_have_distinct_binaries() {
        let names: Vec<_> = Variant::all().iter().map(|v| v.binary_name()).collect();
        assert_eq!(names, vec!["nose-fruit", "fruit-eater", "fruit-catcher"]);
        for (i, v) in Variant::all().iter().enumerate() {
            assert_eq!(v.index(), i);
        }
    }

    #[test]
    fn tick_rate_follows_fps() {
        assert_eq!(Variant::Catcher.config().tick_rate(), Duration::from_millis(16));
        assert_eq!(Variant::Slicer.config().tick_rate(), Duration::from_millis(43));
        assert!((Variant::Eater.config().timestep() - 1.0 / 23.0).abs() < f32::EPSILON);
    }

    #[test]
    fn only_eater_skips_missing_frames() {
        assert_eq!(Variant::Eater.config().capture, CapturePolicy::Skip);
        assert_eq!(Variant::Slicer.config().capture, CapturePolicy::Abort);
        assert_eq!(Variant::Catcher.config().capture, CapturePolicy::Abort);
        assert_eq!(Variant::Eater.config().lives, None);
    }

    #[test]
    fn options_parse_without_arguments() {
        let opts = GameOptions::parse_from(["nose-fruit"]);
        assert!(opts.frames.is_none() || std::env::var_os("FRUITCADE_FRAMES").is_some());
    }
}
