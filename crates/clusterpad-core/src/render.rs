//! Drawing surface abstraction.
//!
//! Widgets describe themselves through [`Surface`]; the render crate provides
//! the GPU implementation and [`RecordingSurface`] captures commands for tests.

use crate::palette::Rgba;
use kurbo::{Point, Rect};
use std::path::Path;
use std::sync::Arc;

/// Decoded RGBA8 image ready to be blitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub pixels: Arc<[u8]>,
}

impl Bitmap {
    /// Load an image file and scale it to exactly `width`×`height`.
    pub fn load(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, image::ImageError> {
        let img = image::open(path.as_ref())?;
        let scaled = img
            .resize_exact(
                width.max(1),
                height.max(1),
                image::imageops::FilterType::Triangle,
            )
            .to_rgba8();
        Ok(Self {
            width: scaled.width(),
            height: scaled.height(),
            pixels: Arc::from(scaled.into_raw()),
        })
    }
}

/// The 2D drawing primitives widgets need.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, width: f64);
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);
    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64);
    /// Stroke a closed polygon through `points`.
    fn stroke_polygon(&mut self, points: &[Point], color: Rgba, width: f64);
    /// Draw a single line of text with its top-left corner at `origin`.
    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Rgba);
    fn draw_image(&mut self, image: &Bitmap, rect: Rect);
    /// Restrict subsequent drawing to `rect` until the matching `pop_clip`.
    fn push_clip(&mut self, rect: Rect);
    fn pop_clip(&mut self);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect { rect: Rect, color: Rgba },
    StrokeRect { rect: Rect, color: Rgba, width: f64 },
    FillCircle { center: Point, radius: f64, color: Rgba },
    StrokeCircle { center: Point, radius: f64, color: Rgba, width: f64 },
    StrokePolygon { points: Vec<Point>, color: Rgba, width: f64 },
    Text { text: String, origin: Point, size: f64, color: Rgba },
    Image { width: u32, height: u32, rect: Rect },
    PushClip(Rect),
    PopClip,
}

/// A surface that records every call instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All text strings drawn so far, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, width: f64) {
        self.commands.push(DrawCommand::StrokeRect { rect, color, width });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Rgba, width: f64) {
        self.commands.push(DrawCommand::StrokePolygon {
            points: points.to_vec(),
            color,
            width,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, size: f64, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            size,
            color,
        });
    }

    fn draw_image(&mut self, image: &Bitmap, rect: Rect) {
        self.commands.push(DrawCommand::Image {
            width: image.width,
            height: image.height,
            rect,
        });
    }

    fn push_clip(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        self.commands.push(DrawCommand::PopClip);
    }
}
