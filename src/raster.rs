//! PNG export: rasterize a [`Surface`] into an RGB image.
//!
//! Rectangles, gradients and lines are drawn exactly. Text is drawn only when
//! every character has a glyph in the small built-in font (digits and a few
//! symbols, enough for chromosome labels and axis ticks); other text is
//! skipped.

use image::{Rgb, RgbImage};
use log::debug;

use crate::color::Color;
use crate::surface::{Anchor, Layer, Paint, Shape, Surface};

const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;

/// 3×5 glyphs, one row per byte, most significant of the low three bits on the left.
fn glyph(c: char) -> Option<[u8; 5]> {
    Some(match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        _ => return None,
    })
}

/// Pixel bounds, half-open.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl Bounds {
    fn intersect(self, other: Bounds) -> Bounds {
        Bounds {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

struct Canvas<'s> {
    image: RgbImage,
    surface: &'s Surface,
    full: Bounds,
    clip: Bounds,
}

impl<'s> Canvas<'s> {
    fn new(surface: &'s Surface) -> Self {
        let width = surface.width.round().max(1.0) as u32;
        let height = surface.height.round().max(1.0) as u32;
        let full = Bounds {
            x0: 0,
            y0: 0,
            x1: width as i64,
            y1: height as i64,
        };
        let clip = match surface.clip {
            Some((x, y, w, h)) => full.intersect(Bounds {
                x0: (surface.origin.0 + x).floor() as i64,
                y0: (surface.origin.1 + y).floor() as i64,
                x1: (surface.origin.0 + x + w).ceil() as i64,
                y1: (surface.origin.1 + y + h).ceil() as i64,
            }),
            None => full,
        };
        Canvas {
            image: RgbImage::from_pixel(width, height, Rgb([255, 255, 255])),
            surface,
            full,
            clip,
        }
    }

    fn put(&mut self, x: i64, y: i64, bounds: Bounds, rgb: (u8, u8, u8)) {
        if x < bounds.x0 || x >= bounds.x1 || y < bounds.y0 || y >= bounds.y1 {
            return;
        }
        if let Some(pixel) = self.image.get_pixel_mut_checked(x as u32, y as u32) {
            *pixel = Rgb([rgb.0, rgb.1, rgb.2]);
        }
    }

    /// A rectangle in plot coordinates, at least one pixel wide and high.
    fn pixel_rect(&self, x: f64, y: f64, width: f64, height: f64) -> Bounds {
        let (ox, oy) = self.surface.origin;
        let x0 = (ox + x).round() as i64;
        let y0 = (oy + y).round() as i64;
        Bounds {
            x0,
            y0,
            x1: ((ox + x + width).round() as i64).max(x0 + 1),
            y1: ((oy + y + height).round() as i64).max(y0 + 1),
        }
    }

    fn fill_rect(&mut self, rect: Bounds, paint: &Paint, bounds: Bounds) {
        let span = (rect.x1 - rect.x0 - 1).max(1) as f64;
        for x in rect.x0.max(bounds.x0)..rect.x1.min(bounds.x1) {
            let color = match paint {
                Paint::Solid(color) => *color,
                Paint::Gradient(index) => match self.surface.gradients.get(*index) {
                    Some(gradient) => gradient.color_at((x - rect.x0) as f64 / span),
                    None => crate::color::SENTINEL,
                },
            };
            let rgb = color.to_rgb();
            for y in rect.y0.max(bounds.y0)..rect.y1.min(bounds.y1) {
                self.put(x, y, bounds, rgb);
            }
        }
    }

    fn outline(&mut self, rect: Bounds, color: Color, bounds: Bounds) {
        let rgb = color.to_rgb();
        let visible = rect.intersect(bounds);
        for x in visible.x0..visible.x1 {
            self.put(x, rect.y0, bounds, rgb);
            self.put(x, rect.y1 - 1, bounds, rgb);
        }
        for y in visible.y0..visible.y1 {
            self.put(rect.x0, y, bounds, rgb);
            self.put(rect.x1 - 1, y, bounds, rgb);
        }
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), color: Color, bounds: Bounds) {
        let (ox, oy) = self.surface.origin;
        let (x0, y0) = (ox + from.0, oy + from.1);
        let (x1, y1) = (ox + to.0, oy + to.1);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).round().max(1.0) as i64;
        let rgb = color.to_rgb();
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (x0 + t * (x1 - x0)).round() as i64;
            let y = (y0 + t * (y1 - y0)).round() as i64;
            self.put(x, y, bounds, rgb);
        }
    }

    fn text(&mut self, x: f64, y: f64, text: &str, anchor: Anchor, font_size: f64, dy: f64) {
        let glyphs: Option<Vec<[u8; 5]>> = text.chars().map(glyph).collect();
        let Some(glyphs) = glyphs else {
            debug!("Skipping text {:?} in raster output", text);
            return;
        };
        if glyphs.is_empty() {
            return;
        }

        let ratio = ((font_size / 6.0).round() as u32).max(1);
        let advance = (GLYPH_WIDTH + 1) * ratio;
        let width = (glyphs.len() as u32 * advance - ratio) as f64;
        let (ox, oy) = self.surface.origin;
        let left = match anchor {
            Anchor::Start => ox + x,
            Anchor::Middle => ox + x - width / 2.0,
            Anchor::End => ox + x - width,
        };
        let baseline = oy + y + dy * font_size;
        let base_x = left.round() as i64;
        let base_y = (baseline - (GLYPH_HEIGHT * ratio) as f64).round() as i64;

        let bounds = self.full;
        for (i, rows) in glyphs.iter().enumerate() {
            let glyph_x = base_x + (i as u32 * advance) as i64;
            for (j, row) in rows.iter().enumerate() {
                for z in (0..GLYPH_WIDTH).rev() {
                    if (row >> z) & 1 == 1 {
                        let px = glyph_x + ((GLYPH_WIDTH - 1 - z) * ratio) as i64;
                        let py = base_y + (j as u32 * ratio) as i64;
                        for rx in 0..ratio as i64 {
                            for ry in 0..ratio as i64 {
                                self.put(px + rx, py + ry, bounds, (0, 0, 0));
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Rasterize the surface; the image has the surface's size.
pub fn rasterize(surface: &Surface) -> RgbImage {
    let mut canvas = Canvas::new(surface);
    if surface.placeholder.is_some() {
        return canvas.image;
    }

    let order = [Layer::Tracks, Layer::Fragments, Layer::Labels, Layer::Axis, Layer::Legend];
    for layer in order {
        let bounds = if layer.is_clipped() { canvas.clip } else { canvas.full };
        for element in surface.layer(layer) {
            match &element.shape {
                Shape::Rect { x, y, width, height, fill, stroke } => {
                    let rect = canvas.pixel_rect(*x, *y, *width, *height);
                    canvas.fill_rect(rect, fill, bounds);
                    if let Some((color, _)) = stroke {
                        canvas.outline(rect, *color, bounds);
                    }
                }
                Shape::Line { x1, y1, x2, y2, stroke, .. } => {
                    canvas.line((*x1, *y1), (*x2, *y2), *stroke, bounds);
                }
                Shape::Text { x, y, text, anchor, font_size, dy } => {
                    canvas.text(*x, *y, text, *anchor, *font_size, *dy);
                }
            }
        }
    }
    canvas.image
}
