//! The raster surface every drawable paints onto.
//!
//! Backed by a premultiplied [`tiny_skia::Pixmap`]. Pixel exchange with the
//! rest of the editor uses straight-alpha [`image::RgbaImage`] buffers.

use egui::{Color32, Pos2, Rect};
use image::RgbaImage;
use tiny_skia::{
    ColorU8, FillRule, IntRect, IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, StrokeDash, Transform,
};

use crate::error::{EditorError, Result};

pub struct Surface {
    pixmap: Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            pixmap: new_pixmap(width, height)?,
        })
    }

    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn size(&self) -> egui::Vec2 {
        egui::vec2(self.width() as f32, self.height() as f32)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    pub fn clear(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// Reallocates the surface; like resizing an HTML canvas, contents are lost.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.pixmap = new_pixmap(width, height)?;
        Ok(())
    }

    /// Replaces size and contents at once.
    pub fn restore(&mut self, pixmap: Pixmap) {
        self.pixmap = pixmap;
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        rgba_from_pixmap(&self.pixmap)
    }

    /// Copies a sub-rectangle. Returns `None` when the region does not
    /// intersect the surface.
    pub fn read_region(&self, x: i32, y: i32, width: u32, height: u32) -> Option<Pixmap> {
        let rect = IntRect::from_xywh(x, y, width, height)?;
        self.pixmap.clone_rect(rect)
    }

    pub fn stroke_polyline(&mut self, points: &[Pos2], color: Color32, width: f32) {
        if let Some(path) = polyline_path(points) {
            let paint = solid_paint(color);
            self.pixmap
                .stroke_path(&path, &paint, &round_stroke(width), Transform::identity(), None);
        }
    }

    pub fn stroke_path(&mut self, path: &Path, paint: &Paint<'_>, stroke: &Stroke, transform: Transform) {
        self.pixmap.stroke_path(path, paint, stroke, transform, None);
    }

    pub fn fill_path(&mut self, path: &Path, color: Color32, transform: Transform) {
        self.pixmap
            .fill_path(path, &solid_paint(color), FillRule::Winding, transform, None);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color32, transform: Transform) {
        if let Some(r) = skia_rect(rect) {
            self.pixmap.fill_rect(r, &solid_paint(color), transform, None);
        }
    }

    /// Outlines `rect`, optionally dashed as `[on, off]`.
    pub fn stroke_rect(
        &mut self,
        rect: Rect,
        color: Color32,
        width: f32,
        dash: Option<[f32; 2]>,
        transform: Transform,
    ) {
        let Some(r) = skia_rect(rect) else {
            return;
        };
        let path = PathBuilder::from_rect(r);
        let mut stroke = Stroke {
            width,
            ..Stroke::default()
        };
        stroke.dash = dash.and_then(|[on, off]| StrokeDash::new(vec![on, off], 0.0));
        self.pixmap
            .stroke_path(&path, &solid_paint(color), &stroke, transform, None);
    }

    pub fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32, transform: Transform) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.fill_path(&path, color, transform);
        }
    }

    pub fn stroke_circle(&mut self, center: Pos2, radius: f32, color: Color32, width: f32, transform: Transform) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &solid_paint(color), &stroke, transform, None);
        }
    }

    /// Composites `source` with its top-left corner mapped through `transform`.
    pub fn draw_pixmap(&mut self, source: &Pixmap, transform: Transform, quality: tiny_skia::FilterQuality) {
        let paint = PixmapPaint {
            quality,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
    }
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or(EditorError::InvalidDimensions { width, height })
}

pub fn to_skia_color(color: Color32) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

pub fn solid_paint(color: Color32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = true;
    paint
}

pub fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

pub fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.min.x, rect.min.y, rect.width(), rect.height())
}

/// Open path through `points`. A single point becomes a zero-length segment so
/// round caps still produce a dot.
pub fn polyline_path(points: &[Pos2]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    if rest.is_empty() {
        pb.line_to(first.x + 0.01, first.y);
    }
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}

/// Rectangle with circular corners of `radius`, built from quadratic arcs.
pub fn rounded_rect_path(rect: Rect, radius: f32) -> Option<Path> {
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    let (l, t, rt, b) = (rect.min.x, rect.min.y, rect.max.x, rect.max.y);
    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.quad_to(rt, t, rt, t + r);
    pb.line_to(rt, b - r);
    pb.quad_to(rt, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.quad_to(l, b, l, b - r);
    pb.line_to(l, t + r);
    pb.quad_to(l, t, l + r, t);
    pb.close();
    pb.finish()
}

pub fn pixmap_from_rgba(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = new_pixmap(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

pub fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    out
}

/// Gaussian blur of a premultiplied pixmap. Blurring premultiplied values keeps
/// every channel at or below its alpha.
pub fn blurred(pixmap: &Pixmap, sigma: f32) -> Result<Pixmap> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let raw = RgbaImage::from_raw(width, height, pixmap.data().to_vec()).ok_or(
        EditorError::PixelBufferSize {
            width,
            height,
            expected: width as usize * height as usize * 4,
            actual: pixmap.data().len(),
        },
    )?;
    let out = image::imageops::blur(&raw, sigma);
    let size = IntSize::from_wh(width, height).ok_or(EditorError::InvalidDimensions { width, height })?;
    Pixmap::from_vec(out.into_raw(), size).ok_or(EditorError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(matches!(
            Surface::new(0, 10),
            Err(EditorError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn opaque_pixels_survive_conversion() {
        let img = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 50, y as u8 * 60, 7, 255]));
        let pixmap = pixmap_from_rgba(&img).unwrap();
        assert_eq!(rgba_from_pixmap(&pixmap), img);
    }

    #[test]
    fn fill_rect_paints_inside_only() {
        let mut surface = Surface::new(10, 10).unwrap();
        surface.fill_rect(
            Rect::from_min_size(Pos2::new(2.0, 2.0), egui::vec2(4.0, 4.0)),
            Color32::RED,
            Transform::identity(),
        );
        let img = surface.to_rgba_image();
        assert_eq!(img.get_pixel(3, 3).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(8, 8).0[3], 0);
    }

    #[test]
    fn resize_clears_contents() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.pixmap_mut().fill(tiny_skia::Color::WHITE);
        surface.resize(6, 2).unwrap();
        assert_eq!((surface.width(), surface.height()), (6, 2));
        assert!(surface.to_rgba_image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn read_region_clips_to_bounds() {
        let surface = Surface::new(10, 10).unwrap();
        let region = surface.read_region(5, 5, 4, 4).unwrap();
        assert_eq!((region.width(), region.height()), (4, 4));
    }
}
