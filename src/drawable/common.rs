use egui::{Color32, CursorIcon, Pos2, Rect};
use tiny_skia::Transform;

use crate::surface::Surface;

pub const HANDLE_RADIUS: f32 = 4.0;

/// Extra slack around a box for coarse hit-testing.
pub const HIT_SLACK: f32 = HANDLE_RADIUS + 2.0;

pub const HANDLE_OUTLINE: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);

/// Dash pattern for selection frames
pub const SELECTION_DASH: [f32; 2] = [5.0, 5.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn cursor_icon(self) -> CursorIcon {
        match self {
            Corner::TopLeft | Corner::BottomRight => CursorIcon::ResizeNwSe,
            Corner::TopRight | Corner::BottomLeft => CursorIcon::ResizeNeSw,
        }
    }

    pub fn is_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    pub fn is_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// Position of this corner on `rect`.
    pub fn of(self, rect: Rect) -> Pos2 {
        match self {
            Corner::TopLeft => rect.left_top(),
            Corner::TopRight => rect.right_top(),
            Corner::BottomLeft => rect.left_bottom(),
            Corner::BottomRight => rect.right_bottom(),
        }
    }

    /// The corner that stays fixed while this one is dragged.
    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }
}

/// Round white handle with a dark rim.
pub fn draw_handle(surface: &mut Surface, pos: Pos2, transform: Transform) {
    surface.fill_circle(pos, HANDLE_RADIUS + 1.0, HANDLE_OUTLINE, transform);
    surface.fill_circle(pos, HANDLE_RADIUS, Color32::WHITE, transform);
}

pub fn within_handle(pos: Pos2, handle: Pos2) -> bool {
    pos.distance(handle) <= HANDLE_RADIUS
}

/// Transform rotating by `angle` radians around `center`.
pub fn rotation_about(center: Pos2, angle: f32) -> Transform {
    Transform::from_rotate_at(angle.to_degrees(), center.x, center.y)
}

/// Bounding box of `points` grown by `padding`, or `None` for no points.
pub fn points_bounds(points: &[Pos2], padding: f32) -> Option<Rect> {
    let first = *points.first()?;
    let rect = points
        .iter()
        .fold(Rect::from_min_max(first, first), |r, &p| r.union(Rect::from_min_max(p, p)));
    Some(rect.expand(padding))
}
