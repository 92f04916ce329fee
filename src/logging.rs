use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;

const DEFAULT_LOG_FILE: &str = "fruitcade.log";

/// Sends `log` output to a file, since the terminal belongs to the UI.
/// Level comes from `RUST_LOG` and defaults to `info`.
pub fn init() {
    let path = env::var_os("FRUITCADE_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // No writable log file: stay quiet rather than scribble over the UI.
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    // A second init (tests, relaunch) keeps the first logger.
    let _ = builder.try_init();
}
