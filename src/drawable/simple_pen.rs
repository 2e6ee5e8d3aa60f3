use egui::{Color32, Pos2};

use super::{Drawable, DrawingOptions};
use crate::id_generator::generate_id;
use crate::input::PointerSample;
use crate::surface::Surface;

/// Fixed-width round polyline. No draw-tab tool creates one; hosts build it directly.
#[derive(Debug, Clone)]
pub struct SimplePen {
    id: usize,
    pub points: Vec<Pos2>,
    color: Color32,
    size: f32,
}

impl SimplePen {
    pub fn new(options: DrawingOptions) -> Self {
        Self {
            id: generate_id(),
            points: Vec::new(),
            color: options.color,
            size: options.size,
        }
    }
}

impl Drawable for SimplePen {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "simple_pen"
    }

    fn draw(&self, surface: &mut Surface) {
        surface.stroke_polyline(&self.points, self.color, self.size);
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
    fn strokes_the_points_it_was_fed() {
        let mut surface = Surface::new(30, 30).unwrap();
        let mut pen = SimplePen::new(DrawingOptions { color: Color32::BLUE, size: 4.0 });
        for x in [5.0, 15.0, 25.0] {
            pen.on_mouse_move(PointerSample::new(pos2(x, 15.0), 0.0));
        }
        pen.draw(&mut surface);

        assert_eq!(pen.points.len(), 3);
        assert_eq!(surface.pixmap().pixel(15, 15).unwrap().blue(), 255);
        assert_eq!(surface.pixmap().pixel(15, 2).unwrap().alpha(), 0);
    }
}
