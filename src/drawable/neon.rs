use egui::{Color32, Pos2};
use tiny_skia::{FilterQuality, Pixmap, Transform};

use super::common::points_bounds;
use super::{Drawable, DrawingOptions};
use crate::id_generator::generate_id;
use crate::input::PointerSample;
use crate::surface::{self, Surface};

const GLOW_RADIUS: f32 = 20.0;
const CORE_COLOR: Color32 = Color32::WHITE;

/// Glowing stroke: a wide colored pass with a soft halo under a white core.
#[derive(Debug, Clone)]
pub struct Neon {
    id: usize,
    pub points: Vec<Pos2>,
    color: Color32,
    size: f32,
}

impl Neon {
    pub fn new(options: DrawingOptions) -> Self {
        Self {
            id: generate_id(),
            points: Vec::new(),
            color: options.color,
            size: options.size,
        }
    }

    /// Blurred copy of the wide pass, rendered only around the stroke.
    fn glow(&self) -> Option<(Pixmap, Transform)> {
        let margin = self.size + GLOW_RADIUS * 1.5;
        let bounds = points_bounds(&self.points, margin)?;
        let mut layer = Pixmap::new(bounds.width().ceil() as u32, bounds.height().ceil() as u32)?;
        let path = surface::polyline_path(&self.points)?;
        let to_layer = Transform::from_translate(-bounds.min.x, -bounds.min.y);
        layer.stroke_path(
            &path,
            &surface::solid_paint(self.color),
            &surface::round_stroke(self.size * 2.0),
            to_layer,
            None,
        );
        let glow = surface::blurred(&layer, GLOW_RADIUS / 2.0).ok()?;
        Some((glow, Transform::from_translate(bounds.min.x, bounds.min.y)))
    }
}

impl Drawable for Neon {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "neon"
    }

    fn draw(&self, surface: &mut Surface) {
        if self.points.is_empty() {
            return;
        }
        if let Some((glow, at)) = self.glow() {
            surface.draw_pixmap(&glow, at, FilterQuality::Nearest);
        }
        surface.stroke_polyline(&self.points, self.color, self.size * 2.0);
        surface.stroke_polyline(&self.points, CORE_COLOR, self.size);
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        self.points.push(sample.pos);
    }
}
