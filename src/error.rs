use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("asset manifest {} could not be read: {source}", .path.display())]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("asset manifest {} is malformed: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("asset file not found: {}", .0.display())]
    MissingAsset(PathBuf),
    #[error("asset manifest lists no {0}")]
    EmptyAssetList(&'static str),
    #[error("image {} could not be decoded: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("sprite sheet {} is too small for a {rows}x{cols} grid", .path.display())]
    SheetGrid { path: PathBuf, rows: u32, cols: u32 },
    #[error("no video frames found in {}", .0.display())]
    NoFrames(PathBuf),
    #[error("camera {index} is unavailable: {reason}")]
    CameraUnavailable { index: u32, reason: String },
    #[error("frame capture failed: {0}")]
    Capture(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
