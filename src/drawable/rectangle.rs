use egui::{Color32, Pos2, Rect};
use tiny_skia::Transform;

use super::Drawable;
use crate::id_generator::generate_id;
use crate::surface::Surface;

/// Filled rectangle. No draw-tab tool creates one; hosts build it directly.
#[derive(Debug, Clone)]
pub struct Rectangle {
    id: usize,
    pub rect: Rect,
    pub color: Color32,
}

impl Rectangle {
    pub fn new(rect: Rect, color: Color32) -> Self {
        Self {
            id: generate_id(),
            rect,
            color,
        }
    }
}

impl Drawable for Rectangle {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "rectangle"
    }

    fn draw(&self, surface: &mut Surface) {
        surface.fill_rect(self.rect, self.color, Transform::identity());
    }

    fn contains_point(&self, pos: Pos2) -> bool {
        self.rect.contains(pos)
    }
}
