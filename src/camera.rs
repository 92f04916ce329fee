use std::fs;
use std::path::{Path, PathBuf};

use image::{imageops, Rgb, RgbImage};

use crate::config::GameOptions;
use crate::error::{GameError, Result};

const TEST_CARD_WIDTH: u32 = 160;
const TEST_CARD_HEIGHT: u32 = 90;
const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Clone, Debug)]
pub struct VideoFrame {
    pub image: RgbImage,
    pub index: u64,
}

/// Where camera frames come from. `Ok(None)` means the read produced no
/// frame this time.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>>;
    fn label(&self) -> String;
}

/// Synthetic background used when no capture device is configured.
pub struct TestCard {
    tick: u64,
}

impl TestCard {
    pub fn new() -> Self {
        Self { tick: 0 }
    }
}

impl FrameSource for TestCard {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        let band = (self.tick % (TEST_CARD_HEIGHT as u64 * 4)) as u32 / 4;
        let image = RgbImage::from_fn(TEST_CARD_WIDTH, TEST_CARD_HEIGHT, |x, y| {
            let r = 20 + (x * 40 / TEST_CARD_WIDTH) as u8;
            let g = 30 + (y * 50 / TEST_CARD_HEIGHT) as u8;
            let b = 60u8;
            if y == band {
                Rgb([r + 10, g + 10, b + 20])
            } else {
                Rgb([r, g, b])
            }
        });
        let frame = VideoFrame {
            image,
            index: self.tick,
        };
        self.tick += 1;
        Ok(Some(frame))
    }

    fn label(&self) -> String {
        "test card".to_string()
    }
}

/// Replays still frames from a directory in file-name order, mirrored like
/// a selfie camera.
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    cursor: usize,
    looping: bool,
    index: u64,
}

impl ImageSequence {
    pub fn open(dir: &Path, looping: bool) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|_| GameError::NoFrames(dir.to_path_buf()))?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| FRAME_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        if paths.is_empty() {
            return Err(GameError::NoFrames(dir.to_path_buf()));
        }
        paths.sort();
        log::info!("replaying {} frames from {}", paths.len(), dir.display());
        Ok(Self {
            paths,
            cursor: 0,
            looping,
            index: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
        if self.cursor >= self.paths.len() {
            if !self.looping {
                return Ok(None);
            }
            self.cursor = 0;
        }
        let path = &self.paths[self.cursor];
        self.cursor += 1;
        let mut image = match image::open(path) {
            Ok(img) => img.to_rgb8(),
            Err(err) => {
                log::warn!("failed to decode frame {}: {err}", path.display());
                return Ok(None);
            }
        };
        imageops::flip_horizontal_in_place(&mut image);
        let frame = VideoFrame {
            image,
            index: self.index,
        };
        self.index += 1;
        Ok(Some(frame))
    }

    fn label(&self) -> String {
        format!("{} still frames", self.paths.len())
    }
}

#[cfg(feature = "camera-nokhwa")]
pub use device::DeviceCamera;

#[cfg(feature = "camera-nokhwa")]
mod device {
    use image::{imageops, RgbImage};
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{CameraIndex, CameraInfo, RequestedFormat, RequestedFormatType};
    use nokhwa::Camera;

    use super::{FrameSource, VideoFrame};
    use crate::error::{GameError, Result};

    fn format_camera_label(info: &CameraInfo) -> String {
        info.human_name()
    }

    /// A capture device read on the game's own thread, one frame per tick,
    /// mirrored like a selfie camera. The stream stops on drop.
    pub struct DeviceCamera {
        camera: Camera,
        label: String,
        index: u64,
    }

    impl DeviceCamera {
        pub fn open(index: u32) -> Result<Self> {
            let unavailable = |err: nokhwa::NokhwaError| GameError::CameraUnavailable {
                index,
                reason: err.to_string(),
            };
            let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
            let mut camera = Camera::new(CameraIndex::Index(index), requested).map_err(unavailable)?;
            camera.open_stream().map_err(unavailable)?;
            let label = format_camera_label(camera.info());
            log::info!("camera {index} open: {label}");
            Ok(Self {
                camera,
                label,
                index: 0,
            })
        }
    }

    impl FrameSource for DeviceCamera {
        fn next_frame(&mut self) -> Result<Option<VideoFrame>> {
            let buffer = self
                .camera
                .frame()
                .map_err(|err| GameError::Capture(err.to_string()))?;
            let decoded = buffer
                .decode_image::<RgbFormat>()
                .map_err(|err| GameError::Capture(err.to_string()))?;
            let (width, height) = decoded.dimensions();
            let Some(mut image) = RgbImage::from_raw(width, height, decoded.into_raw()) else {
                return Ok(None);
            };
            imageops::flip_horizontal_in_place(&mut image);
            let frame = VideoFrame {
                image,
                index: self.index,
            };
            self.index += 1;
            Ok(Some(frame))
        }

        fn label(&self) -> String {
            self.label.clone()
        }
    }

    impl Drop for DeviceCamera {
        fn drop(&mut self) {
            if let Err(err) = self.camera.stop_stream() {
                log::warn!("failed to stop camera stream: {err}");
            }
            log::debug!("camera released");
        }
    }
}

#[cfg(feature = "camera-nokhwa")]
fn open_camera(index: u32) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(DeviceCamera::open(index)?))
}

#[cfg(not(feature = "camera-nokhwa"))]
fn open_camera(index: u32) -> Result<Box<dyn FrameSource>> {
    Err(GameError::CameraUnavailable {
        index,
        reason: "built without the camera-nokhwa feature".to_string(),
    })
}

pub fn open_source(opts: &GameOptions) -> Result<Box<dyn FrameSource>> {
    if let Some(dir) = &opts.frames {
        return Ok(Box::new(ImageSequence::open(dir, opts.loop_frames)?));
    }
    match opts.camera {
        Some(index) => open_camera(index),
        None => Ok(Box::new(TestCard::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(frames: Option<&Path>, camera: Option<u32>) -> GameOptions {
        GameOptions {
            assets: PathBuf::from("assets"),
            frames: frames.map(Path::to_path_buf),
            camera,
            loop_frames: false,
        }
    }

    #[test]
    fn test_card_always_yields() {
        let mut card = TestCard::new();
        let a = card.next_frame().unwrap().unwrap();
        let b = card.next_frame().unwrap().unwrap();
        assert_eq!(a.image.dimensions(), (TEST_CARD_WIDTH, TEST_CARD_HEIGHT));
        assert_eq!(b.index, a.index + 1);
    }

    #[test]
    fn sequence_is_mirrored_and_ends() {
        let dir = TempDir::new().unwrap();
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 0, 255]));
        img.save(dir.path().join("000.png")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut seq = ImageSequence::open(dir.path(), false).unwrap();
        assert_eq!(seq.len(), 1);
        let frame = seq.next_frame().unwrap().unwrap();
        assert_eq!(frame.image.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert!(seq.next_frame().unwrap().is_none());
    }

    #[test]
    fn looping_sequence_restarts() {
        let dir = TempDir::new().unwrap();
        RgbImage::new(1, 1).save(dir.path().join("a.png")).unwrap();
        let mut seq = ImageSequence::open(dir.path(), true).unwrap();
        for i in 0..3 {
            assert_eq!(seq.next_frame().unwrap().unwrap().index, i);
        }
    }

    #[test]
    fn empty_directory_is_fatal() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(ImageSequence::open(dir.path(), false), Err(GameError::NoFrames(_))));
    }

    #[test]
    fn source_follows_options() {
        let dir = TempDir::new().unwrap();
        RgbImage::new(1, 1).save(dir.path().join("a.png")).unwrap();
        let seq = open_source(&options(Some(dir.path()), None)).unwrap();
        assert_eq!(seq.label(), "1 still frames");
        let card = open_source(&options(None, None)).unwrap();
        assert_eq!(card.label(), "test card");
    }

    #[cfg(not(feature = "camera-nokhwa"))]
    #[test]
    fn camera_without_support_is_fatal() {
        let err = open_source(&options(None, Some(0))).err().unwrap();
        assert!(matches!(err, GameError::CameraUnavailable { index: 0, .. }));
        assert!(err.to_string().starts_with("camera 0 is unavailable"));
    }

    #[cfg(feature = "camera-nokhwa")]
    #[test]
    fn missing_camera_is_fatal() {
        let err = open_source(&options(None, Some(u32::MAX))).err().unwrap();
        assert!(matches!(err, GameError::CameraUnavailable { .. }));
    }
}
