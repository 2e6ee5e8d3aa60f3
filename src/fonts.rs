//! Font lookup and glyph rasterization for the text tool.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use egui::Color32;
use tiny_skia::{Pixmap, PremultipliedColorU8};

use crate::error::{EditorError, Result};

/// Families offered by the text tab as `(title, family)`.
pub const FONT_FAMILIES: [(&str, &str); 9] = [
    ("Roboto", "Roboto, sans-serif"),
    ("Typewriter", "Courier, monospace"),
    ("Avenir Next", "Avenir Next"),
    ("Courier New", "Courier New"),
    ("Noteworthy", "Noteworthy"),
    ("Georgia", "Georgia"),
    ("Papyrus", "Papyrus"),
    ("Snell Roundhand", "Snell Roundhand"),
    ("Arial", "Arial, sans-serif"),
];

pub const DEFAULT_FAMILY: &str = FONT_FAMILIES[0].1;

/// Family used for the caret glyph.
pub const CARET_FAMILY: &str = "Arial, sans-serif";

/// Maps family names to parsed faces. Families without registered bytes fall
/// back to the bundled faces: monospace families to Hack, the rest to Ubuntu.
#[derive(Clone)]
pub struct FontBook {
    faces: HashMap<String, FontArc>,
    proportional: FontArc,
    monospace: FontArc,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("registered", &self.faces.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Result<Self> {
        let proportional = FontArc::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)
            .map_err(|_| EditorError::InvalidFont("Ubuntu-Light".into()))?;
        let monospace = FontArc::try_from_slice(epaint_default_fonts::HACK_REGULAR)
            .map_err(|_| EditorError::InvalidFont("Hack".into()))?;
        Ok(Self {
            faces: HashMap::new(),
            proportional,
            monospace,
        })
    }

    /// Registers real font bytes for `family`, replacing the bundled fallback.
    pub fn register(&mut self, family: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let family = family.into();
        let font = FontArc::try_from_vec(bytes).map_err(|_| {
            log::warn!("Rejected font data for {family:?}");
            EditorError::InvalidFont(family.clone())
        })?;
        log::info!("Registered font {family:?}");
        self.faces.insert(family, font);
        Ok(())
    }

    pub fn resolve(&self, family: &str) -> FontArc {
        if let Some(font) = self.faces.get(family) {
            return font.clone();
        }
        let lower = family.to_ascii_lowercase();
        if lower.contains("courier") || lower.contains("monospace") {
            self.monospace.clone()
        } else {
            self.proportional.clone()
        }
    }

    pub fn families(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        FONT_FAMILIES.iter().copied()
    }
}

/// `size` is in pixels per em, as in CSS `font-size`.
fn px_scale(font: &FontArc, size: f32) -> PxScale {
    match font.units_per_em() {
        Some(upem) => PxScale::from(size * font.height_unscaled() / upem),
        None => PxScale::from(size),
    }
}

/// Advance width of `text` at `size` pixels per em, kerning included.
pub fn measure_line(font: &FontArc, size: f32, text: &str) -> f32 {
    let scaled = font.as_scaled(px_scale(font, size));
    let mut width = 0.0;
    let mut prev = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

/// Coverage mask for a surface-sized area of `width` x `height` pixels.
pub struct Coverage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl Coverage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    /// Accumulates the glyphs of `text` with the baseline starting at `(x, baseline)`.
    pub fn add_line(&mut self, font: &FontArc, size: f32, text: &str, x: f32, baseline: f32) {
        let scaled = font.as_scaled(px_scale(font, size));
        let mut caret = x;
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                caret += scaled.kern(p, id);
            }
            let glyph = id.with_scale_and_position(scaled.scale(), point(caret, baseline));
            caret += scaled.h_advance(id);
            prev = Some(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, c| {
                let px = bounds.min.x as i64 + i64::from(gx);
                let py = bounds.min.y as i64 + i64::from(gy);
                if px < 0 || py < 0 || px >= i64::from(self.width) || py >= i64::from(self.height) {
                    return;
                }
                let idx = py as usize * self.width as usize + px as usize;
                self.data[idx] = (self.data[idx] + c).min(1.0);
            });
        }
    }

    /// Grows the mask by a disc of `radius` pixels (stroke of width `2 * radius`).
    pub fn dilated(&self, radius: f32) -> Coverage {
        let r = radius.ceil() as i64;
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let mut out = Coverage::new(self.width, self.height);
        for y in 0..h {
            for x in 0..w {
                let mut best: f32 = 0.0;
                for dy in -r..=r {
                    for dx in -r..=r {
                        let (sx, sy) = (x + dx, y + dy);
                        if sx < 0 || sy < 0 || sx >= w || sy >= h {
                            continue;
                        }
                        let dist = ((dx * dx + dy * dy) as f32).sqrt();
                        let falloff = (radius + 0.5 - dist).clamp(0.0, 1.0);
                        if falloff <= 0.0 {
                            continue;
                        }
                        let v = self.data[(sy * w + sx) as usize] * falloff;
                        best = best.max(v);
                    }
                }
                out.data[(y * w + x) as usize] = best;
            }
        }
        out
    }

    /// Source-over blends `color` through the mask onto `pixmap`.
    pub fn paint(&self, pixmap: &mut Pixmap, color: Color32) {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let width = self.width.min(pixmap.width()) as usize;
        let pw = pixmap.width() as usize;
        let pixels = pixmap.pixels_mut();
        for (i, &cov) in self.data.iter().enumerate() {
            if cov <= 0.0 {
                continue;
            }
            let (x, y) = (i % self.width as usize, i / self.width as usize);
            if x >= width {
                continue;
            }
            let Some(dst) = pixels.get_mut(y * pw + x) else {
                continue;
            };
            let sa = f32::from(a) / 255.0 * cov;
            let blend = |s: u8, d: u8| (f32::from(s) * sa + f32::from(d) * (1.0 - sa)).round() as u8;
            let out_a = blend(255, dst.alpha());
            let out = [blend(r, dst.red()), blend(g, dst.green()), blend(b, dst.blue())];
            if let Some(p) =
                PremultipliedColorU8::from_rgba(out[0].min(out_a), out[1].min(out_a), out[2].min(out_a), out_a)
            {
                *dst = p;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_faces_parse() {
        let book = FontBook::new().unwrap();
        let font = book.resolve(DEFAULT_FAMILY);
        assert!(measure_line(&font, 24.0, "Hello") > 0.0);
    }

    #[test]
    fn width_grows_with_size_and_text() {
        let book = FontBook::new().unwrap();
        let font = book.resolve("Georgia");
        let small = measure_line(&font, 12.0, "abc");
        let large = measure_line(&font, 24.0, "abc");
        assert!(large > small);
        assert!(measure_line(&font, 12.0, "abcd") > small);
        assert_eq!(measure_line(&font, 12.0, ""), 0.0);
    }

    #[test]
    fn rejects_garbage_font_bytes() {
        let mut book = FontBook::new().unwrap();
        assert!(book.register("Broken", vec![1, 2, 3]).is_err());
    }

    #[test]
    fn glyph_coverage_lands_on_pixmap() {
        let book = FontBook::new().unwrap();
        let font = book.resolve(DEFAULT_FAMILY);
        let mut cov = Coverage::new(60, 40);
        cov.add_line(&font, 24.0, "H", 4.0, 30.0);
        assert!(cov.data.iter().any(|&c| c > 0.5));
        let grown = cov.dilated(3.0);
        let count = |c: &Coverage| c.data.iter().filter(|&&v| v > 0.0).count();
        assert!(count(&grown) > count(&cov));

        let mut pixmap = Pixmap::new(60, 40).unwrap();
        cov.paint(&mut pixmap, Color32::WHITE);
        assert!(pixmap.pixels().iter().any(|p| p.alpha() > 200));
    }
}
