//! Drag, resize and rotate state shared by text boxes and stickers.

use egui::{Color32, CursorIcon, Pos2, Rect, Vec2, pos2, vec2};

use super::common::{self, Corner, HIT_SLACK, SELECTION_DASH};
use crate::geometry::rotate_about;
use crate::surface::Surface;

/// Distance of the rotation handle above the selection frame.
pub const ROTATION_HANDLE_OFFSET: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Corner(Corner),
    Rotation,
}

impl Handle {
    pub fn cursor_icon(self) -> CursorIcon {
        match self {
            Handle::Corner(corner) => corner.cursor_icon(),
            Handle::Rotation => CursorIcon::Grab,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Gesture {
    #[default]
    None,
    Drag,
    Resize(Corner),
    Rotate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformBox {
    /// Content box before rotation.
    pub rect: Rect,
    /// Radians, clockwise.
    pub angle: f32,
    /// Gap between the content and the selection frame.
    pub padding: f32,
    pub selected: bool,
    gesture: Gesture,
    last_mouse: Option<Pos2>,
}

impl TransformBox {
    pub fn new(rect: Rect, padding: f32) -> Self {
        Self {
            rect,
            angle: 0.0,
            padding,
            selected: false,
            gesture: Gesture::None,
            last_mouse: None,
        }
    }

    pub fn center(&self) -> Pos2 {
        self.rect.center()
    }

    pub fn frame(&self) -> Rect {
        self.rect.expand(self.padding)
    }

    pub fn is_busy(&self) -> bool {
        self.gesture != Gesture::None
    }

    fn handles(&self) -> [(Handle, Pos2); 5] {
        let frame = self.frame();
        [
            (Handle::Corner(Corner::TopLeft), frame.left_top()),
            (Handle::Corner(Corner::TopRight), frame.right_top()),
            (Handle::Corner(Corner::BottomLeft), frame.left_bottom()),
            (Handle::Corner(Corner::BottomRight), frame.right_bottom()),
            (Handle::Rotation, pos2(frame.center().x, frame.top() - ROTATION_HANDLE_OFFSET)),
        ]
    }

    /// The handle under `pos`, comparing in the box's unrotated frame.
    pub fn handle_at(&self, pos: Pos2) -> Option<Handle> {
        let local = rotate_about(pos, self.center(), -self.angle);
        self.handles()
            .into_iter()
            .find(|&(_, at)| common::within_handle(local, at))
            .map(|(handle, _)| handle)
    }

    /// Coarse axis-aligned test; rotation is not compensated.
    pub fn contains_point(&self, pos: Pos2) -> bool {
        self.rect.expand(HIT_SLACK).contains(pos) || self.handle_at(pos).is_some()
    }

    pub fn cursor_at(&self, pos: Pos2, inside: CursorIcon) -> CursorIcon {
        match self.handle_at(pos) {
            Some(handle) if self.selected => handle.cursor_icon(),
            _ if self.contains_point(pos) => inside,
            _ => CursorIcon::Default,
        }
    }

    pub fn on_mouse_down(&mut self, pos: Pos2) {
        if self.selected {
            match self.handle_at(pos) {
                Some(Handle::Corner(corner)) => {
                    self.gesture = Gesture::Resize(corner);
                    self.last_mouse = Some(pos);
                    return;
                }
                Some(Handle::Rotation) => {
                    self.gesture = Gesture::Rotate;
                    self.last_mouse = Some(pos);
                    return;
                }
                None => {}
            }
        }
        if self.contains_point(pos) {
            self.gesture = Gesture::Drag;
            self.last_mouse = Some(pos);
        }
    }

    /// Advances the active gesture. Resizing keeps `aspect` (width / height)
    /// and refuses to shrink either side below `min_size`. Returns the
    /// resize scale when the box was resized.
    pub fn on_mouse_move(&mut self, pos: Pos2, aspect: f32, min_size: f32) -> Option<f32> {
        let last = self.last_mouse?;
        let mut scale = None;
        match self.gesture {
            Gesture::None => return None,
            Gesture::Drag => {
                self.rect = self.rect.translate(pos - last);
            }
            Gesture::Rotate => {
                let d = pos - self.center();
                self.angle = (d.y.atan2(d.x) + std::f32::consts::FRAC_PI_2)
                    % std::f32::consts::TAU;
            }
            Gesture::Resize(corner) => {
                // Pointer motion expressed in the box's own axes
                let delta = rotate_about(Pos2::ZERO + (pos - last), Pos2::ZERO, -self.angle).to_vec2();
                match self.resized(corner, delta, aspect, min_size) {
                    Some(rect) => {
                        scale = Some(rect.width() / self.rect.width());
                        self.rect = rect;
                    }
                    // Keep the old anchor so small moves accumulate
                    None => return None,
                }
            }
        }
        self.last_mouse = Some(pos);
        scale
    }

    fn resized(&self, corner: Corner, delta: Vec2, aspect: f32, min_size: f32) -> Option<Rect> {
        let size = self.rect.size();
        let mut w = if corner.is_left() { size.x - delta.x } else { size.x + delta.x };
        let mut h = if corner.is_top() { size.y - delta.y } else { size.y + delta.y };

        if w / h > aspect {
            h = w / aspect;
        } else {
            w = h * aspect;
        }
        if !(w >= min_size && h >= min_size) {
            return None;
        }

        let anchor = corner.opposite().of(self.rect);
        let min = pos2(
            if corner.is_left() { anchor.x - w } else { anchor.x },
            if corner.is_top() { anchor.y - h } else { anchor.y },
        );
        Some(Rect::from_min_size(min, vec2(w, h)))
    }

    pub fn on_mouse_up(&mut self) {
        self.gesture = Gesture::None;
        self.last_mouse = None;
    }

    /// Dashed frame plus the four corner handles and the rotation handle.
    pub fn draw_selection(&self, surface: &mut Surface) {
        let transform = common::rotation_about(self.center(), self.angle);
        surface.stroke_rect(self.frame(), Color32::WHITE, 1.0, Some(SELECTION_DASH), transform);
        for (_, at) in self.handles() {
            common::draw_handle(surface, at, transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed() -> TransformBox {
        let mut b = TransformBox::new(Rect::from_min_size(pos2(100.0, 100.0), vec2(100.0, 50.0)), 6.0);
        b.selected = true;
        b
    }

    #[test]
    fn drag_moves_the_box() {
        let mut b = boxed();
        b.on_mouse_down(pos2(150.0, 125.0));
        b.on_mouse_move(pos2(160.0, 135.0), 2.0, 10.0);
        b.on_mouse_up();
        assert_eq!(b.rect.min, pos2(110.0, 110.0));
    }

    #[test]
    fn corner_resize_keeps_aspect_and_anchor() {
        let mut b = boxed();
        b.on_mouse_down(pos2(206.0, 156.0));
        let scale = b.on_mouse_move(pos2(226.0, 166.0), 2.0, 10.0);
        assert!(scale.is_some());
        assert!((b.rect.width() / b.rect.height() - 2.0).abs() < 1e-4);
        assert_eq!(b.rect.min, pos2(100.0, 100.0));
    }

    #[test]
    fn resize_below_minimum_is_ignored() {
        let mut b = boxed();
        b.on_mouse_down(pos2(206.0, 156.0));
        assert!(b.on_mouse_move(pos2(90.0, 90.0), 2.0, 10.0).is_none());
        assert_eq!(b.rect.size(), vec2(100.0, 50.0));
    }

    #[test]
    fn handles_follow_rotation() {
        let mut b = boxed();
        b.angle = std::f32::consts::PI;
        // Unrotated top-left handle now sits at the bottom-right
        assert_eq!(b.handle_at(pos2(206.0, 156.0)), Some(Handle::Corner(Corner::TopLeft)));
    }

    #[test]
    fn rotation_handle_sets_angle() {
        let mut b = boxed();
        let handle = pos2(150.0, 94.0 - ROTATION_HANDLE_OFFSET);
        b.on_mouse_down(handle);
        // Pointer straight to the right of center is a quarter turn
        b.on_mouse_move(pos2(300.0, 125.0), 2.0, 10.0);
        assert!((b.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }
}
