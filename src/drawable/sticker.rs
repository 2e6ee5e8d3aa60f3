use egui::{CursorIcon, Pos2, Rect};
use tiny_skia::FilterQuality;

use super::common::rotation_about;
use super::transform_box::TransformBox;
use super::{Drawable, KeyOutcome, Resizable};
use crate::id_generator::generate_id;
use crate::image_source::ImageSource;
use crate::input::{KeyPress, PointerSample};
use crate::surface::Surface;

const PADDING: f32 = 6.0;
const MIN_SIZE: f32 = 10.0;

/// A bitmap placed over the photo that can be moved, scaled and rotated.
#[derive(Debug, Clone)]
pub struct Sticker {
    id: usize,
    bbox: TransformBox,
    source: ImageSource,
    /// Original width / height, kept through every resize.
    aspect: f32,
}

impl Sticker {
    pub fn new(source: ImageSource, rect: Rect) -> Self {
        let aspect = rect.width() / rect.height();
        Self {
            id: generate_id(),
            bbox: TransformBox::new(rect, PADDING),
            source,
            aspect,
        }
    }

    pub fn rect(&self) -> Rect {
        self.bbox.rect
    }

    /// Radians.
    pub fn angle(&self) -> f32 {
        self.bbox.angle
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }
}

impl Drawable for Sticker {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "sticker"
    }

    fn draw(&self, surface: &mut Surface) {
        let rect = self.bbox.rect;
        let src = self.source.pixmap();
        let transform = rotation_about(self.bbox.center(), self.bbox.angle)
            .pre_translate(rect.min.x, rect.min.y)
            .pre_scale(rect.width() / src.width() as f32, rect.height() / src.height() as f32);
        surface.draw_pixmap(src, transform, FilterQuality::Bilinear);
        if self.bbox.selected {
            self.bbox.draw_selection(surface);
        }
    }

    fn on_mouse_down(&mut self, pos: Pos2) {
        self.bbox.on_mouse_down(pos);
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        self.bbox.on_mouse_move(sample.pos, self.aspect, MIN_SIZE);
    }

    fn on_mouse_up(&mut self) {
        self.bbox.on_mouse_up();
    }

    fn contains_point(&self, pos: Pos2) -> bool {
        self.bbox.contains_point(pos)
    }

    fn cursor_at(&self, pos: Pos2) -> Option<CursorIcon> {
        Some(self.bbox.cursor_at(pos, CursorIcon::Grab))
    }
}

impl Resizable for Sticker {
    fn is_selected(&self) -> bool {
        self.bbox.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.bbox.selected = selected;
    }

    fn on_key_press(&mut self, key: &KeyPress) -> KeyOutcome {
        if key.is(egui::Key::Backspace) || key.is(egui::Key::Delete) {
            KeyOutcome::Remove
        } else if key.is(egui::Key::Escape) {
            self.bbox.selected = false;
            KeyOutcome::Handled
        } else {
            KeyOutcome::Ignored
        }
    }
}
