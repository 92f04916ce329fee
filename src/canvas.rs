//! A pixel buffer sized to a terminal area, two pixels per cell, drawn in
//! world coordinates and turned into half-block lines for ratatui.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};
use ratatui::prelude::*;

use crate::physics::Vec2;

pub type Rgb = [u8; 3];

fn opaque([r, g, b]: Rgb) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

pub struct Canvas {
    image: RgbaImage,
    // World units to pixels.
    sx: f32,
    sy: f32,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16, world_width: f32, world_height: f32) -> Self {
        let width = cols as u32;
        let height = rows as u32 * 2;
        Self {
            image: RgbaImage::from_pixel(width, height, opaque([0, 0, 0])),
            sx: width as f32 / world_width,
            sy: height as f32 / world_height,
        }
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        let [r, g, b, _] = self.image.get_pixel(x as u32, y as u32).0;
        [r, g, b]
    }

    pub fn fill(&mut self, rgb: Rgb) {
        let px = opaque(rgb);
        for p in self.image.pixels_mut() {
            *p = px;
        }
    }

    /// Stretches `image` over the whole canvas.
    pub fn draw_background(&mut self, image: &RgbImage) {
        if self.is_empty() || image.width() == 0 || image.height() == 0 {
            return;
        }
        let stretched = imageops::resize(image, self.image.width(), self.image.height(), FilterType::Nearest);
        self.image = DynamicImage::ImageRgb8(stretched).into_rgba8();
    }

    /// Blends every pixel toward `rgb` by `alpha`.
    pub fn tint(&mut self, rgb: Rgb, alpha: f32) {
        let keep = 1.0 - alpha;
        for px in self.image.pixels_mut() {
            for c in 0..3 {
                px.0[c] = (px.0[c] as f32 * keep + rgb[c] as f32 * alpha).round() as u8;
            }
        }
    }

    /// Solid frame around the canvas edge, `thickness` pixels wide.
    pub fn border(&mut self, rgb: Rgb, thickness: u32) {
        let (w, h) = self.image.dimensions();
        let px = opaque(rgb);
        for (x, y, p) in self.image.enumerate_pixels_mut() {
            if x < thickness || y < thickness || x + thickness >= w || y + thickness >= h {
                *p = px;
            }
        }
    }

    /// Draws `sprite` centred on a world point, scaled to `w` x `h` world
    /// units and alpha-blended over what is already there.
    pub fn blit(&mut self, sprite: &RgbaImage, center: Vec2, w: f32, h: f32) {
        let pw = (w * self.sx).round();
        let ph = (h * self.sy).round();
        if sprite.width() == 0 || sprite.height() == 0 || pw < 1.0 || ph < 1.0 {
            return;
        }
        let scaled = imageops::resize(sprite, pw as u32, ph as u32, FilterType::Nearest);
        let left = (center.x * self.sx - pw / 2.0).round() as i64;
        let top = (center.y * self.sy - ph / 2.0).round() as i64;
        imageops::overlay(&mut self.image, &scaled, left, top);
    }

    /// Filled circle with a world-unit radius.
    pub fn disc(&mut self, center: Vec2, radius: f32, rgb: Rgb) {
        let cx = center.x * self.sx;
        let cy = center.y * self.sy;
        let rx = (radius * self.sx).max(0.5);
        let ry = (radius * self.sy).max(0.5);
        let px = opaque(rgb);
        for (x, y, p) in self.image.enumerate_pixels_mut() {
            let dx = (x as f32 + 0.5 - cx) / rx;
            let dy = (y as f32 + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                *p = px;
            }
        }
    }

    /// One line per pair of pixel rows: top pixel as foreground of `▀`,
    /// bottom pixel as background.
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        (0..self.height() / 2)
            .map(|row| {
                let spans: Vec<Span<'static>> = (0..self.width())
                    .map(|x| {
                        let [tr, tg, tb] = self.pixel(x, row * 2);
                        let [br, bg, bb] = self.pixel(x, row * 2 + 1);
                        Span::styled(
                            "▀",
                            Style::default()
                                .fg(Color::Rgb(tr, tg, tb))
                                .bg(Color::Rgb(br, bg, bb)),
                        )
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_has_two_pixels_per_cell() {
        let mut c = Canvas::new(4, 2, 400.0, 400.0);
        assert_eq!((c.width(), c.height()), (4, 4));
        c.fill([1, 2, 3]);
        let lines = c.to_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans.len(), 4);
        assert_eq!(lines[1].spans[3].style.fg, Some(Color::Rgb(1, 2, 3)));
        assert_eq!(lines[1].spans[3].style.bg, Some(Color::Rgb(1, 2, 3)));
    }

    #[test]
    fn background_is_stretched() {
        let mut c = Canvas::new(4, 2, 4.0, 4.0);
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 1, image::Rgb([200, 0, 0]));
        c.draw_background(&img);
        assert_eq!(c.pixel(0, 0), [0, 0, 0]);
        assert_eq!(c.pixel(3, 3), [200, 0, 0]);
        assert_eq!(c.pixel(2, 2), [200, 0, 0]);
        assert_eq!(c.pixel(1, 2), [0, 0, 0]);
    }

    #[test]
    fn blit_skips_transparent_pixels_and_clips() {
        let mut c = Canvas::new(10, 5, 10.0, 10.0);
        let mut sprite = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
        sprite.put_pixel(0, 0, Rgba([255, 255, 255, 0]));
        c.blit(&sprite, Vec2::new(5.0, 5.0), 4.0, 4.0);
        assert_eq!(c.pixel(3, 3), [0, 0, 0]);
        assert_eq!(c.pixel(4, 4), [0, 0, 0]);
        assert_eq!(c.pixel(5, 3), [0, 255, 0]);
        assert_eq!(c.pixel(6, 6), [0, 255, 0]);
        assert_eq!(c.pixel(7, 7), [0, 255, 0]);
        assert_eq!(c.pixel(8, 8), [0, 0, 0]);
        // Partly off-canvas draws must not panic.
        c.blit(&sprite, Vec2::new(-1.0, 9.5), 4.0, 4.0);
        assert_eq!(c.pixel(0, 9), [0, 255, 0]);
    }

    #[test]
    fn tint_blends_toward_colour() {
        let mut c = Canvas::new(1, 1, 1.0, 1.0);
        c.fill([100, 100, 100]);
        c.tint([250, 0, 0], 0.3);
        assert_eq!(c.pixel(0, 0), [145, 70, 70]);
    }

    #[test]
    fn border_and_disc() {
        let mut c = Canvas::new(6, 3, 6.0, 6.0);
        c.border([255, 0, 0], 1);
        assert_eq!(c.pixel(0, 3), [255, 0, 0]);
        assert_eq!(c.pixel(5, 5), [255, 0, 0]);
        assert_eq!(c.pixel(2, 2), [0, 0, 0]);
        c.disc(Vec2::new(3.0, 3.0), 1.0, [0, 0, 255]);
        assert_eq!(c.pixel(2, 2), [0, 0, 255]);
    }
}
