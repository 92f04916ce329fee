//! Sprite and sound assets, described by `manifest.json` in the asset
//! directory. Every entry names its object kind explicitly; every file the
//! manifest lists must exist before a game starts.

use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, RgbImage, RgbaImage};
use serde::Deserialize;

use crate::error::{GameError, Result};
use crate::objects::ObjectKind;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub catcher: CatcherManifest,
    pub slicer: SheetManifest,
    pub eater: SheetManifest,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpriteEntry {
    pub path: PathBuf,
    pub kind: ObjectKind,
}

#[derive(Debug, Deserialize)]
pub struct CatcherManifest {
    pub sprites: Vec<SpriteEntry>,
    pub basket: PathBuf,
    pub game_over: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Grid {
    pub rows: u32,
    pub cols: u32,
}

#[derive(Debug, Deserialize)]
pub struct SoundManifest {
    pub slice: PathBuf,
    pub explosion: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SheetManifest {
    pub sheets: Vec<SpriteEntry>,
    pub grid: Grid,
    pub frames: usize,
    pub game_over: PathBuf,
    pub sounds: SoundManifest,
}

impl Manifest {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).map_err(|source| GameError::ManifestIo {
            path: path.clone(),
            source,
        })?;
        Self::parse(&text, &path)
    }

    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| GameError::Manifest {
            path: origin.to_path_buf(),
            source,
        })
    }
}

fn resolve(dir: &Path, rel: &Path) -> Result<PathBuf> {
    let path = dir.join(rel);
    if path.is_file() {
        Ok(path)
    } else {
        Err(GameError::MissingAsset(path))
    }
}

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| GameError::Image {
            path: path.to_path_buf(),
            source,
        })
}

fn load_rgb(path: &Path) -> Result<RgbImage> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| GameError::Image {
            path: path.to_path_buf(),
            source,
        })
}

pub struct Sprite {
    pub kind: ObjectKind,
    pub image: RgbaImage,
}

pub struct CatcherAssets {
    pub sprites: Vec<Sprite>,
    pub basket: RgbaImage,
    pub game_over: Option<RgbImage>,
}

impl CatcherAssets {
    pub fn load(dir: &Path, manifest: &CatcherManifest) -> Result<Self> {
        let sprites = manifest
            .sprites
            .iter()
            .map(|entry| {
                let path = resolve(dir, &entry.path)?;
                Ok(Sprite {
                    kind: entry.kind,
                    image: load_rgba(&path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if !sprites.iter().any(|s| s.kind == ObjectKind::Fruit) {
            return Err(GameError::EmptyAssetList("fruit sprites"));
        }
        if !sprites.iter().any(|s| s.kind == ObjectKind::Bomb) {
            return Err(GameError::EmptyAssetList("bomb sprites"));
        }
        let basket = load_rgba(&resolve(dir, &manifest.basket)?)?;
        let game_over = match &manifest.game_over {
            Some(rel) => Some(load_rgb(&resolve(dir, rel)?)?),
            None => None,
        };
        Ok(Self {
            sprites,
            basket,
            game_over,
        })
    }

    pub fn indices_of(&self, kind: ObjectKind) -> Vec<usize> {
        self.sprites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == kind)
            .map(|(i, _)| i)
            .collect()
    }
}

pub struct SpriteSheet {
    pub kind: ObjectKind,
    pub frames: Vec<RgbaImage>,
}

impl SpriteSheet {
    /// Cuts `image` into a `grid` and keeps the first `frames` cells in
    /// row-major order.
    pub fn split(image: &RgbaImage, kind: ObjectKind, grid: Grid, frames: usize, origin: &Path) -> Result<Self> {
        let (w, h) = image.dimensions();
        if grid.rows == 0 || grid.cols == 0 || w < grid.cols || h < grid.rows {
            return Err(GameError::SheetGrid {
                path: origin.to_path_buf(),
                rows: grid.rows,
                cols: grid.cols,
            });
        }
        let cell_w = w / grid.cols;
        let cell_h = h / grid.rows;
        let mut cells = Vec::with_capacity(frames);
        'outer: for row in 0..grid.rows {
            for col in 0..grid.cols {
                if cells.len() >= frames {
                    break 'outer;
                }
                let cell = imageops::crop_imm(image, col * cell_w, row * cell_h, cell_w, cell_h).to_image();
                cells.push(cell);
            }
        }
        Ok(Self { kind, frames: cells })
    }

    pub fn frame_size(&self) -> (u32, u32) {
        self.frames.first().map(|f| f.dimensions()).unwrap_or((0, 0))
    }

    pub fn last_frame(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }
}

#[derive(Clone, Debug)]
pub struct Sounds {
    pub slice: PathBuf,
    pub explosion: PathBuf,
}

pub struct SheetAssets {
    pub sheets: Vec<SpriteSheet>,
    pub game_over: RgbImage,
    pub sounds: Sounds,
}

impl SheetAssets {
    pub fn load(dir: &Path, manifest: &SheetManifest) -> Result<Self> {
        if manifest.sheets.is_empty() {
            return Err(GameError::EmptyAssetList("sprite sheets"));
        }
        let sheets = manifest
            .sheets
            .iter()
            .map(|entry| {
                let path = resolve(dir, &entry.path)?;
                let image = load_rgba(&path)?;
                SpriteSheet::split(&image, entry.kind, manifest.grid, manifest.frames, &path)
            })
            .collect::<Result<Vec<_>>>()?;
        let game_over = load_rgb(&resolve(dir, &manifest.game_over)?)?;
        let sounds = Sounds {
            slice: resolve(dir, &manifest.sounds.slice)?,
            explosion: resolve(dir, &manifest.sounds.explosion)?,
        };
        Ok(Self {
            sheets,
            game_over,
            sounds,
        })
    }
}
