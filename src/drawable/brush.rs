use egui::{Color32, Pos2, Rect, vec2};
use tiny_skia::Transform;

use super::{Drawable, DrawingOptions};
use crate::id_generator::generate_id;
use crate::input::PointerSample;
use crate::surface::Surface;

const BRUSH_WIDTH: f32 = 10.0;
const BRUSH_HEIGHT: f32 = 30.0;
const STEP: f32 = 4.0;
const ROTATION_DEG: f32 = -45.0;
const STAMP_ALPHA: f32 = 0.1;

/// Marker-like brush made of translucent slanted stamps.
#[derive(Debug, Clone)]
pub struct Brush {
    id: usize,
    pub points: Vec<Pos2>,
    color: Color32,
    size: f32,
}

impl Brush {
    pub fn new(options: DrawingOptions) -> Self {
        Self {
            id: generate_id(),
            points: Vec::new(),
            color: options.color,
            size: options.size,
        }
    }

    /// Stamp centers every `STEP` pixels along each segment.
    pub fn stamp_positions(&self) -> Vec<Pos2> {
        let mut out = Vec::new();
        for pair in self.points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let distance = from.distance(to);
            if distance == 0.0 {
                continue;
            }
            let dir = (to - from) / distance;
            let mut j = 0.0;
            while j < distance {
                out.push(from + dir * j);
                j += STEP;
            }
        }
        out
    }
}

impl Drawable for Brush {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "brush"
    }

    fn draw(&self, surface: &mut Surface) {
        let [r, g, b, a] = self.color.to_srgba_unmultiplied();
        let stamp_color =
            Color32::from_rgba_unmultiplied(r, g, b, (f32::from(a) * STAMP_ALPHA).round() as u8);
        let w = BRUSH_WIDTH * self.size / 10.0;
        let h = BRUSH_HEIGHT * self.size / 10.0;
        let stamp = Rect::from_center_size(Pos2::ZERO, vec2(w, h));
        for at in self.stamp_positions() {
            let transform = Transform::from_translate(at.x, at.y).pre_rotate(ROTATION_DEG);
            surface.fill_rect(stamp, stamp_color, transform);
        }
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        self.points.push(sample.pos);
    }
}
