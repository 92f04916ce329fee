//! Running a game as a child process and reading back its score.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::config::Variant;

/// Each message doubles as the banner the menu shows.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Error: {} not found.", .0.display())]
    NotFound(PathBuf),
    #[error("Error: could not start {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error running {game}: {stderr}")]
    Failed { game: &'static str, stderr: String },
}

/// The first line reading exactly `Score: <n>`, ignoring surrounding
/// whitespace. Anything else scores 0.
pub fn parse_score(stdout: &str) -> u32 {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("Score: ")?.parse().ok())
        .unwrap_or(0)
}

/// Directory holding the game executables: the launcher's own directory
/// unless overridden.
pub fn default_games_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn game_path(dir: &Path, variant: Variant) -> PathBuf {
    dir.join(format!("{}{}", variant.binary_name(), env::consts::EXE_SUFFIX))
}

/// Runs the game to completion. The child shares our terminal for input and
/// draws to it directly; only its stdout and stderr are captured.
pub fn run_game(path: &Path, variant: Variant) -> Result<u32, LaunchError> {
    if !path.exists() {
        return Err(LaunchError::NotFound(path.to_path_buf()));
    }
    log::info!("launching {}", path.display());
    let output = Command::new(path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| LaunchError::Spawn {
            path: path.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        log::warn!("{} exited with {}: {}", variant.title(), output.status, stderr);
        return Err(LaunchError::Failed {
            game: variant.title(),
            stderr,
        });
    }
    let score = parse_score(&String::from_utf8_lossy(&output.stdout));
    log::info!("{} scored {}", variant.title(), score);
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_line_is_found() {
        assert_eq!(parse_score("Score: 12\n"), 12);
        assert_eq!(parse_score("loading\n  Score: 7  \nScore: 9\n"), 7);
        assert_eq!(parse_score(""), 0);
        assert_eq!(parse_score("Score:\nScore: abc\n"), 0);
        assert_eq!(parse_score("Final Score: 5\n"), 0);
        assert_eq!(parse_score("Score: x\nScore: 3"), 3);
    }

    #[test]
    fn error_messages() {
        let err = LaunchError::NotFound(PathBuf::from("/tmp/nope"));
        assert_eq!(err.to_string(), "Error: /tmp/nope not found.");
        let err = LaunchError::Failed {
            game: Variant::Eater.title(),
            stderr: "boom".into(),
        };
        assert_eq!(err.to_string(), "Error running Fruit Eater: boom");
    }

    #[test]
    fn game_paths_are_siblings() {
        let path = game_path(Path::new("/opt/fruitcade"), Variant::Slicer);
        assert_eq!(path.parent(), Some(Path::new("/opt/fruitcade")));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("nose-fruit"));
    }

    #[test]
    fn missing_game_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fruit-catcher");
        assert!(matches!(run_game(&path, Variant::Catcher), Err(LaunchError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn child_output_is_scraped() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path();
        let scripts = [
            ("ok.sh", "#!/bin/sh\necho hello\necho 'Score: 42'\n"),
            ("fail.sh", "#!/bin/sh\necho 'Score: 3'\necho 'no camera' >&2\nexit 1\n"),
        ];
        // Write every script before running any of them.
        for (name, body) in scripts {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        assert_eq!(run_game(&dir.join("ok.sh"), Variant::Slicer).unwrap(), 42);
        match run_game(&dir.join("fail.sh"), Variant::Catcher) {
            Err(LaunchError::Failed { game, stderr }) => {
                assert_eq!(game, "Fruit Catcher");
                assert_eq!(stderr, "no camera");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
