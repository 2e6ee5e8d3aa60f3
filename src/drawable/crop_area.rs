use egui::{Color32, CursorIcon, Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};
use tiny_skia::Transform;

use super::Drawable;
use super::common::{self, Corner, HANDLE_RADIUS};
use crate::id_generator::generate_id;
use crate::input::PointerSample;
use crate::surface::Surface;

pub const MIN_CROP_SIZE: f32 = 30.0;

const TINT: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 26);

/// Aspect constraint chosen in the crop tab.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[default]
    Free,
    /// The canvas's own ratio when the crop area was created.
    Original,
    /// width / height
    Ratio(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    None,
    Resize(Corner),
    Drag,
}

/// Interactive crop rectangle. Always lies within the canvas and never gets
/// smaller than [`MIN_CROP_SIZE`] on either side.
#[derive(Debug, Clone)]
pub struct CropArea {
    id: usize,
    canvas: Vec2,
    rect: Rect,
    initial: Rect,
    aspect: Option<f32>,
    gesture: Gesture,
    last_mouse: Pos2,
}

/// Largest `ratio`-shaped rectangle centered in `canvas`.
pub fn calculate_crop(canvas: Vec2, ratio: f32) -> Rect {
    let width = canvas.x.min(canvas.y * ratio);
    let height = canvas.y.min(canvas.x / ratio);
    Rect::from_min_size(pos2((canvas.x - width) / 2.0, (canvas.y - height) / 2.0), vec2(width, height))
}

impl CropArea {
    /// Covers the whole canvas, unconstrained.
    pub fn new(canvas: Vec2) -> Self {
        let rect = Rect::from_min_size(Pos2::ZERO, canvas);
        Self {
            id: generate_id(),
            canvas,
            rect,
            initial: rect,
            aspect: None,
            gesture: Gesture::None,
            last_mouse: Pos2::ZERO,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn aspect(&self) -> Option<f32> {
        self.aspect
    }

    fn bounds(&self) -> Rect {
        Rect::from_min_size(Pos2::ZERO, self.canvas)
    }

    pub fn accept_aspect_ratio(&mut self, ratio: AspectRatio) {
        let ratio = match ratio {
            AspectRatio::Free => {
                self.aspect = None;
                return;
            }
            AspectRatio::Original => self.initial.width() / self.initial.height(),
            AspectRatio::Ratio(r) if r > 0.0 && r.is_finite() => r,
            AspectRatio::Ratio(r) => {
                log::warn!("Ignoring invalid crop ratio {r}");
                return;
            }
        };
        self.rect = calculate_crop(self.canvas, ratio);
        self.aspect = Some(ratio);
    }

    fn clamp_to_canvas(&self, p: Pos2) -> Pos2 {
        let b = self.bounds();
        pos2(p.x.clamp(b.min.x, b.max.x), p.y.clamp(b.min.y, b.max.y))
    }

    fn corner_at(&self, pos: Pos2) -> Option<Corner> {
        Corner::ALL.into_iter().find(|c| {
            let h = c.of(self.rect);
            (pos.x - h.x).abs() <= HANDLE_RADIUS && (pos.y - h.y).abs() <= HANDLE_RADIUS
        })
    }

    /// New rectangle for dragging `corner` to `mouse`, or `None` when no
    /// rectangle satisfying the size, ratio and canvas limits exists.
    fn resized(&self, corner: Corner, mouse: Pos2) -> Option<Rect> {
        let anchor = corner.opposite().of(self.rect);
        let bounds = self.bounds();
        let (sx, sy) = (
            if corner.is_left() { -1.0 } else { 1.0 },
            if corner.is_top() { -1.0 } else { 1.0 },
        );
        // Room between the anchor and the canvas edge in the drag direction
        let room_x = if corner.is_left() { anchor.x - bounds.min.x } else { bounds.max.x - anchor.x };
        let room_y = if corner.is_top() { anchor.y - bounds.min.y } else { bounds.max.y - anchor.y };

        let mut w = ((mouse.x - anchor.x) * sx).max(MIN_CROP_SIZE);
        let mut h = ((mouse.y - anchor.y) * sy).max(MIN_CROP_SIZE);

        match self.aspect {
            None => {
                w = w.min(room_x);
                h = h.min(room_y);
            }
            Some(ratio) => {
                if w / h > ratio {
                    w = h * ratio;
                } else {
                    h = w / ratio;
                }
                let (min_w, min_h) = if ratio >= 1.0 {
                    (MIN_CROP_SIZE * ratio, MIN_CROP_SIZE)
                } else {
                    (MIN_CROP_SIZE, MIN_CROP_SIZE / ratio)
                };
                if w < min_w {
                    w = min_w;
                    h = min_h;
                }
                w = w.min(room_x).min(room_y * ratio);
                h = w / ratio;
            }
        }

        if w < MIN_CROP_SIZE - 1e-3 || h < MIN_CROP_SIZE - 1e-3 {
            return None;
        }
        let min = pos2(
            if corner.is_left() { anchor.x - w } else { anchor.x },
            if corner.is_top() { anchor.y - h } else { anchor.y },
        );
        Some(Rect::from_min_size(min, vec2(w, h)))
    }

    fn dragged(&self, delta: Vec2) -> Rect {
        let b = self.bounds();
        let size = self.rect.size();
        let x = (self.rect.min.x + delta.x).min(b.max.x - size.x).max(b.min.x);
        let y = (self.rect.min.y + delta.y).min(b.max.y - size.y).max(b.min.y);
        Rect::from_min_size(pos2(x, y), size)
    }
}

impl Drawable for CropArea {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "crop_area"
    }

    fn draw(&self, surface: &mut Surface) {
        let identity = Transform::identity();
        surface.fill_rect(self.rect, TINT, identity);
        let cell = self.rect.size() / 3.0;
        for row in 0..3 {
            for col in 0..3 {
                let min = self.rect.min + vec2(col as f32 * cell.x, row as f32 * cell.y);
                surface.stroke_rect(Rect::from_min_size(min, cell), Color32::WHITE, 1.0, None, identity);
            }
        }
        for corner in Corner::ALL {
            surface.fill_circle(corner.of(self.rect), HANDLE_RADIUS, Color32::WHITE, identity);
        }
    }

    fn on_mouse_down(&mut self, pos: Pos2) {
        if let Some(corner) = self.corner_at(pos) {
            self.gesture = Gesture::Resize(corner);
        } else if self.contains_point(pos) {
            self.gesture = Gesture::Drag;
        }
        self.last_mouse = self.clamp_to_canvas(pos);
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        let mouse = self.clamp_to_canvas(sample.pos);
        match self.gesture {
            Gesture::Resize(corner) => {
                if let Some(rect) = self.resized(corner, mouse) {
                    self.rect = rect;
                }
            }
            Gesture::Drag => self.rect = self.dragged(mouse - self.last_mouse),
            Gesture::None => {}
        }
        self.last_mouse = mouse;
    }

    fn on_mouse_up(&mut self) {
        self.gesture = Gesture::None;
    }

    fn contains_point(&self, pos: Pos2) -> bool {
        self.rect.contains(pos)
    }

    fn cursor_at(&self, pos: Pos2) -> Option<CursorIcon> {
        Some(match self.corner_at(pos) {
            Some(corner) => corner.cursor_icon(),
            None if self.contains_point(pos) => CursorIcon::Grab,
            None => CursorIcon::Default,
        })
    }
}
