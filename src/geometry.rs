//! Small geometric helpers shared by drawables and the session.

use egui::{Pos2, Vec2, pos2, vec2};

/// Space reserved around the canvas when the image is larger than its container
pub const CONTAINER_CHROME: f32 = 100.0;

/// Clamps `value` into `[from, to]`. Unlike `f32::clamp` this never panics
/// when the bounds are inverted; `from` wins.
pub fn clamp(from: f32, to: f32, value: f32) -> f32 {
    value.min(to).max(from)
}

/// Uniform Catmull-Rom interpolation between `p1` and `p2`.
pub fn catmull_rom(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, t: f32) -> Pos2 {
    let t2 = t * t;
    let t3 = t2 * t;
    let axis = |a: f32, b: f32, c: f32, d: f32| {
        0.5 * (2.0 * b
            + (-a + c) * t
            + (2.0 * a - 5.0 * b + 4.0 * c - d) * t2
            + (-a + 3.0 * b - 3.0 * c + d) * t3)
    };
    pos2(
        axis(p0.x, p1.x, p2.x, p3.x),
        axis(p0.y, p1.y, p2.y, p3.y),
    )
}

/// Scales an image down (never up) so it fits the canvas, keeping its aspect ratio.
pub fn fit_image_into_canvas(canvas: Vec2, image: Vec2) -> Vec2 {
    let ratio = (canvas.x / image.x).min(canvas.y / image.y).min(1.0);
    image * ratio
}

/// Canvas size for an image shown inside a host container of `container` size.
///
/// Each axis the image overflows loses [`CONTAINER_CHROME`] from that same
/// axis. A wide container is not narrowed to its height minus the chrome.
pub fn container_canvas_size(container: Vec2, image: Vec2) -> Vec2 {
    let mut available = container;
    if image.x >= available.x {
        available.x -= CONTAINER_CHROME;
    }
    if image.y >= available.y {
        available.y -= CONTAINER_CHROME;
    }
    let available = available.max(Vec2::splat(1.0));
    fit_image_into_canvas(available, image).min(available)
}

/// Scale factor that makes a `size` rectangle rotated by `angle_deg` cover its
/// unrotated bounds.
pub fn scale_for_rotation(angle_deg: f32, size: Vec2) -> f32 {
    let normalized = angle_deg.rem_euclid(360.0);
    let (sin, cos) = normalized.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let rotated_w = size.x * cos + size.y * sin;
    let rotated_h = size.x * sin + size.y * cos;
    (rotated_w / size.x).max(rotated_h / size.y)
}

/// Rotates `point` around `center` by `angle` radians (clockwise on a y-down surface).
pub fn rotate_about(point: Pos2, center: Pos2, angle: f32) -> Pos2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - center;
    center + vec2(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Sum of segment lengths along a polyline.
pub fn path_length<'a>(points: impl IntoIterator<Item = &'a Pos2>) -> f32 {
    let mut total = 0.0;
    let mut prev: Option<Pos2> = None;
    for &p in points {
        if let Some(q) = prev {
            total += p.distance(q);
        }
        prev = Some(p);
    }
    total
}
