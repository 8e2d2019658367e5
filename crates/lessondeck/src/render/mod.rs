pub mod diagram;
pub mod image_cache;
pub mod slide;
pub mod text;
pub mod transition;

use eframe::egui::{self, Pos2, Rect, Vec2, pos2, vec2};

use crate::layout::{CANVAS_HEIGHT, CANVAS_WIDTH, TextMeasure};

/// Maps the 1280x720 reference canvas onto a screen rect, letterboxed and
/// uniformly scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    origin: Pos2,
    pub scale: f32,
}

impl Canvas {
    pub fn fit(screen: Rect) -> Self {
        let scale = (screen.width() / CANVAS_WIDTH).min(screen.height() / CANVAS_HEIGHT);
        let size = vec2(CANVAS_WIDTH, CANVAS_HEIGHT) * scale;
        Self {
            origin: screen.center() - size / 2.0,
            scale,
        }
    }

    /// Same mapping moved horizontally by `dx` canvas units.
    pub fn shifted(&self, dx: f32) -> Self {
        Self {
            origin: self.origin + vec2(dx * self.scale, 0.0),
            scale: self.scale,
        }
    }

    pub fn to_screen(&self, p: Pos2) -> Pos2 {
        self.origin + p.to_vec2() * self.scale
    }

    pub fn to_canvas(&self, p: Pos2) -> Pos2 {
        pos2(
            (p.x - self.origin.x) / self.scale,
            (p.y - self.origin.y) / self.scale,
        )
    }

    pub fn rect_to_screen(&self, r: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(r.min), self.to_screen(r.max))
    }

    pub fn px(&self, v: f32) -> f32 {
        v * self.scale
    }

    /// Screen area covered by the canvas.
    pub fn bounds(&self) -> Rect {
        Rect::from_min_size(self.origin, vec2(CANVAS_WIDTH, CANVAS_HEIGHT) * self.scale)
    }
}

/// Text metrics from egui's font system, reported in canvas units.
pub struct PainterMeasure<'a> {
    painter: &'a egui::Painter,
    scale: f32,
}

impl<'a> PainterMeasure<'a> {
    pub fn new(painter: &'a egui::Painter, scale: f32) -> Self {
        Self { painter, scale }
    }
}

impl TextMeasure for PainterMeasure<'_> {
    fn measure_text(&self, text: &str, size: f32, bold: bool, wrap_width: f32) -> Vec2 {
        let galley = self.painter.layout(
            text.to_owned(),
            text::font(size, bold, self.scale),
            egui::Color32::WHITE,
            wrap_width * self.scale,
        );
        galley.rect.size() / self.scale
    }
}
