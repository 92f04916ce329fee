//! Body and face keypoints as seen by the games, and the providers that
//! produce them from a camera frame.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::camera::VideoFrame;
use crate::physics::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LandmarkId {
    Nose,
    LeftWrist,
    RightWrist,
    UpperLip,
    LowerLip,
}

impl LandmarkId {
    fn slot(self) -> usize {
        match self {
            LandmarkId::Nose => 0,
            LandmarkId::LeftWrist => 1,
            LandmarkId::RightWrist => 2,
            LandmarkId::UpperLip => 3,
            LandmarkId::LowerLip => 4,
        }
    }
}

/// One frame's worth of keypoints in normalised image coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Landmarks {
    points: [Option<Vec2>; 5],
}

impl Landmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: LandmarkId, x: f32, y: f32) -> Self {
        self.set(id, Vec2::new(x, y));
        self
    }

    pub fn set(&mut self, id: LandmarkId, point: Vec2) {
        self.points[id.slot()] = Some(point);
    }

    pub fn get(&self, id: LandmarkId) -> Option<Vec2> {
        self.points[id.slot()]
    }

    /// The keypoint scaled to a `width` x `height` play area.
    pub fn scaled(&self, id: LandmarkId, width: f32, height: f32) -> Option<Vec2> {
        self.get(id).map(|p| Vec2::new(p.x * width, p.y * height))
    }
}

pub trait LandmarkProvider {
    /// `None` when nobody is detected in the frame.
    fn detect(&mut self, frame: &VideoFrame) -> Option<Landmarks>;
}

const LIP_GAP_OPEN: f32 = 0.05;
const LIP_GAP_CLOSED: f32 = 0.01;

/// Stands in for the pose and face models in a terminal: the mouse pointer
/// is the tracked body part and the left button (or a toggle) opens the
/// mouth.
#[derive(Default)]
pub struct PointerTracker {
    pointer: Option<Vec2>,
    held: bool,
    toggled: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_mouse(&mut self, event: MouseEvent, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.held = true,
            MouseEventKind::Up(MouseButton::Left) => self.held = false,
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {}
            _ => return,
        }
        let x = (event.column.saturating_sub(area.x) as f32 + 0.5) / area.width as f32;
        let y = (event.row.saturating_sub(area.y) as f32 + 0.5) / area.height as f32;
        self.pointer = Some(Vec2::new(x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)));
    }

    pub fn toggle_mouth(&mut self) {
        self.toggled = !self.toggled;
    }

    pub fn mouth_open(&self) -> bool {
        self.held || self.toggled
    }
}

impl LandmarkProvider for PointerTracker {
    fn detect(&mut self, _frame: &VideoFrame) -> Option<Landmarks> {
        let p = self.pointer?;
        let gap = if self.mouth_open() { LIP_GAP_OPEN } else { LIP_GAP_CLOSED };
        Some(
            Landmarks::new()
                .with(LandmarkId::Nose, p.x, p.y)
                .with(LandmarkId::LeftWrist, p.x, p.y)
                .with(LandmarkId::RightWrist, p.x, p.y)
                .with(LandmarkId::UpperLip, p.x, p.y - gap / 2.0)
                .with(LandmarkId::LowerLip, p.x, p.y + gap / 2.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use image::RgbImage;

    fn frame() -> VideoFrame {
        VideoFrame {
            image: RgbImage::new(1, 1),
            index: 0,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn no_pointer_means_no_detection() {
        let mut tracker = PointerTracker::new();
        assert!(tracker.detect(&frame()).is_none());
    }

    #[test]
    fn pointer_maps_into_area() {
        let mut tracker = PointerTracker::new();
        let area = Rect::new(10, 5, 100, 50);
        tracker.on_mouse(mouse(MouseEventKind::Moved, 59, 29), area);
        let lm = tracker.detect(&frame()).unwrap();
        let nose = lm.get(LandmarkId::Nose).unwrap();
        assert!((nose.x - 0.495).abs() < 1e-4);
        assert!((nose.y - 0.49).abs() < 1e-4);
        assert_eq!(lm.get(LandmarkId::LeftWrist), lm.get(LandmarkId::RightWrist));
        let scaled = lm.scaled(LandmarkId::Nose, 1000.0, 100.0).unwrap();
        assert!((scaled.x - 495.0).abs() < 1e-2);
    }

    #[test]
    fn button_opens_mouth() {
        let mut tracker = PointerTracker::new();
        let area = Rect::new(0, 0, 80, 40);
        tracker.on_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 40, 20), area);
        let lm = tracker.detect(&frame()).unwrap();
        let gap = lm.get(LandmarkId::LowerLip).unwrap().y - lm.get(LandmarkId::UpperLip).unwrap().y;
        assert!(gap > 0.03);

        tracker.on_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 40, 20), area);
        let lm = tracker.detect(&frame()).unwrap();
        let gap = lm.get(LandmarkId::LowerLip).unwrap().y - lm.get(LandmarkId::UpperLip).unwrap().y;
        assert!(gap < 0.03);

        tracker.toggle_mouth();
        assert!(tracker.mouth_open());
    }

    #[test]
    fn scroll_is_ignored() {
        let mut tracker = PointerTracker::new();
        tracker.on_mouse(mouse(MouseEventKind::ScrollUp, 3, 3), Rect::new(0, 0, 10, 10));
        assert!(tracker.detect(&frame()).is_none());
    }
}
