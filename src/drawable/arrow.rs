use egui::{Color32, Pos2, vec2};

use super::{Drawable, DrawingOptions};
use crate::id_generator::generate_id;
use crate::input::PointerSample;
use crate::surface::Surface;

const HEAD_FRACTION: f32 = 0.2;
const WING_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

/// Straight arrow from the press point to the current pointer. The arrow tool
/// draws a smoothed pen with a head instead; hosts build this one directly.
#[derive(Debug, Clone)]
pub struct Arrow {
    id: usize,
    pub start: Pos2,
    pub end: Pos2,
    color: Color32,
    size: f32,
}

impl Arrow {
    pub fn new(start: Pos2, options: DrawingOptions) -> Self {
        Self {
            id: generate_id(),
            start,
            end: start,
            color: options.color,
            size: options.size,
        }
    }

    /// The two wing tips of the head.
    pub fn head(&self) -> [Pos2; 2] {
        let d = self.end - self.start;
        let length = d.length() * HEAD_FRACTION;
        let angle = d.y.atan2(d.x);
        let wing = |a: f32| self.end - vec2(a.cos(), a.sin()) * length;
        [wing(angle - WING_ANGLE), wing(angle + WING_ANGLE)]
    }
}

impl Drawable for Arrow {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "straight_arrow"
    }

    fn draw(&self, surface: &mut Surface) {
        surface.stroke_polyline(&[self.start, self.end], self.color, self.size);
        let [left, right] = self.head();
        surface.stroke_polyline(&[left, self.end, right], self.color, self.size);
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        self.end = sample.pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn head_is_a_fifth_of_the_shaft() {
        let mut arrow = Arrow::new(pos2(0.0, 0.0), DrawingOptions { color: Color32::RED, size: 4.0 });
        arrow.on_mouse_move(PointerSample::new(pos2(100.0, 0.0), 0.0));
        for wing in arrow.head() {
            assert!((wing.distance(arrow.end) - 20.0).abs() < 1e-3);
            assert!(wing.x < 100.0);
        }
    }
}
