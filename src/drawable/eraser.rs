use std::sync::Arc;

use egui::Pos2;
use tiny_skia::{FilterQuality, Paint, Pattern, Pixmap, SpreadMode, Transform};

use super::Drawable;
use crate::error::Result;
use crate::id_generator::generate_id;
use crate::input::PointerSample;
use crate::surface::{self, Surface};

/// Canvas `blur(10px)` equivalent
pub const BLUR_SIGMA: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraserMode {
    /// Paints back the background image's pixels.
    Eraser,
    /// Paints a blurred copy of the canvas.
    Blur,
}

/// Stroke whose "ink" is a pixel buffer captured when the tool was created.
#[derive(Debug, Clone)]
pub struct Eraser {
    id: usize,
    mode: EraserMode,
    pub points: Vec<Pos2>,
    size: f32,
    source: Arc<Pixmap>,
}

impl Eraser {
    /// `captured` is the canvas (blur) or background image (eraser) at creation time.
    pub fn new(mode: EraserMode, size: f32, captured: Pixmap) -> Result<Self> {
        let source = match mode {
            EraserMode::Eraser => captured,
            EraserMode::Blur => surface::blurred(&captured, BLUR_SIGMA)?,
        };
        Ok(Self {
            id: generate_id(),
            mode,
            points: Vec::new(),
            size,
            source: Arc::new(source),
        })
    }

    pub fn mode(&self) -> EraserMode {
        self.mode
    }

    pub fn source(&self) -> &Pixmap {
        &self.source
    }
}

impl Drawable for Eraser {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        match self.mode {
            EraserMode::Eraser => "eraser",
            EraserMode::Blur => "blur",
        }
    }

    fn draw(&self, surface: &mut Surface) {
        let Some(path) = surface::polyline_path(&self.points) else {
            return;
        };
        let paint = Paint {
            shader: Pattern::new(
                (*self.source).as_ref(),
                SpreadMode::Pad,
                FilterQuality::Nearest,
                1.0,
                Transform::identity(),
            ),
            anti_alias: true,
            ..Paint::default()
        };
        surface.stroke_path(&path, &paint, &surface::round_stroke(self.size), Transform::identity());
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        self.points.push(sample.pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn eraser_paints_captured_pixels() {
        let mut captured = Pixmap::new(20, 20).unwrap();
        captured.fill(tiny_skia::Color::from_rgba8(0, 0, 255, 255));
        let mut eraser = Eraser::new(EraserMode::Eraser, 6.0, captured).unwrap();
        eraser.on_mouse_move(PointerSample::new(pos2(2.0, 10.0), 0.0));
        eraser.on_mouse_move(PointerSample::new(pos2(18.0, 10.0), 16.0));

        let mut surface = Surface::new(20, 20).unwrap();
        eraser.draw(&mut surface);
        let img = surface.to_rgba_image();
        assert_eq!(img.get_pixel(10, 10).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(10, 1).0[3], 0);
    }
}
