use std::sync::Arc;

use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use super::Drawable;
use crate::effects::{self, Effects, TouchedEffects};
use crate::error::{EditorError, Result};
use crate::geometry::scale_for_rotation;
use crate::id_generator::generate_id;
use crate::image_source::ImageSource;
use crate::surface::{Surface, pixmap_from_rgba, rgba_from_pixmap};

/// The photo under everything else.
///
/// Keeps its source untouched and renders a processed copy: the source
/// rotated by `angle` (scaled so no empty corners show) with the effects
/// applied. The processed copy is rebuilt by [`BgImage::redraw`].
#[derive(Debug, Clone)]
pub struct BgImage {
    id: usize,
    source: ImageSource,
    width: u32,
    height: u32,
    angle: f32,
    effects: Effects,
    touched: TouchedEffects,
    processed: Arc<Pixmap>,
}

impl BgImage {
    pub fn new(
        source: ImageSource,
        width: u32,
        height: u32,
        effects: Effects,
        touched: TouchedEffects,
    ) -> Result<Self> {
        let processed = Arc::new(
            Pixmap::new(width, height).ok_or(EditorError::InvalidDimensions { width, height })?,
        );
        let mut image = Self {
            id: generate_id(),
            source,
            width,
            height,
            angle: 0.0,
            effects,
            touched,
            processed,
        };
        image.redraw()?;
        Ok(image)
    }

    /// Wraps already-final pixels (a flattened canvas) without any effects.
    pub fn from_pixels(pixels: Pixmap) -> Result<Self> {
        let (width, height) = (pixels.width(), pixels.height());
        Self::new(
            ImageSource::from_pixmap(pixels),
            width,
            height,
            Effects::default(),
            TouchedEffects::new(),
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn set_effects(&mut self, effects: Effects, touched: TouchedEffects) -> Result<()> {
        self.effects = effects;
        self.touched = touched;
        self.redraw()
    }

    /// Sets an absolute rotation in degrees and rebuilds the processed copy.
    pub fn rotate(&mut self, angle: f32) -> Result<()> {
        self.angle = angle % 360.0;
        self.redraw()
    }

    pub fn redraw(&mut self) -> Result<()> {
        let src = self.source.pixmap();
        let unchanged = self.angle == 0.0 && (src.width(), src.height()) == (self.width, self.height);
        let mut target = if unchanged {
            src.clone()
        } else {
            let (w, h) = (self.width as f32, self.height as f32);
            let scale = scale_for_rotation(self.angle, egui::vec2(w, h));
            let mut transform = Transform::from_translate(w / 2.0, h / 2.0)
                .pre_rotate(self.angle)
                .pre_scale(scale, scale)
                .pre_translate(-w / 2.0, -h / 2.0);
            if !self.source.is_raw() {
                transform = transform.pre_scale(w / src.width() as f32, h / src.height() as f32);
            }
            let mut target = Pixmap::new(self.width, self.height).ok_or(
                EditorError::InvalidDimensions {
                    width: self.width,
                    height: self.height,
                },
            )?;
            let paint = PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            };
            target.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
            target
        };

        if !self.touched.is_empty() {
            let mut pixels = rgba_from_pixmap(&target);
            effects::apply_effects(&self.effects, &self.touched, &mut pixels);
            target = pixmap_from_rgba(&pixels)?;
        }

        self.processed = Arc::new(target);
        Ok(())
    }

    /// A new background image turned a quarter counter-clockwise, with
    /// swapped dimensions.
    pub fn rotate90(&self) -> Result<BgImage> {
        let rotated = image::imageops::rotate270(&rgba_from_pixmap(&self.processed));
        BgImage::from_pixels(pixmap_from_rgba(&rotated)?)
    }

    /// A new background image mirrored horizontally.
    pub fn flip(&self) -> Result<BgImage> {
        let flipped = image::imageops::flip_horizontal(&rgba_from_pixmap(&self.processed));
        BgImage::from_pixels(pixmap_from_rgba(&flipped)?)
    }

    /// The processed pixels.
    pub fn image_data(&self) -> &Pixmap {
        &self.processed
    }
}

impl Drawable for BgImage {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "background"
    }

    fn draw(&self, surface: &mut Surface) {
        surface.draw_pixmap(&self.processed, Transform::identity(), FilterQuality::Nearest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKey;
    use image::{Rgba, RgbaImage};

    fn photo(w: u32, h: u32) -> ImageSource {
        ImageSource::from_image(&RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 7) as u8, (y * 5) as u8, 120, 255])
        }))
        .unwrap()
    }

    #[test]
    fn untouched_image_is_copied_verbatim() {
        let bg = BgImage::new(photo(40, 30), 40, 30, Effects::default(), TouchedEffects::new()).unwrap();
        assert_eq!(bg.image_data().data(), photo(40, 30).pixmap().data());
    }

    #[test]
    fn decoded_source_is_scaled_into_the_box() {
        let bg = BgImage::new(photo(80, 60), 40, 30, Effects::default(), TouchedEffects::new()).unwrap();
        assert_eq!((bg.image_data().width(), bg.image_data().height()), (40, 30));
        assert!(bg.image_data().pixels().iter().all(|p| p.alpha() > 0));
    }

    #[test]
    fn rotate90_swaps_dimensions() {
        let bg = BgImage::new(photo(40, 30), 40, 30, Effects::default(), TouchedEffects::new()).unwrap();
        let turned = bg.rotate90().unwrap();
        assert_eq!((turned.width(), turned.height()), (30, 40));
        let back = turned.rotate90().unwrap().rotate90().unwrap().rotate90().unwrap();
        assert_eq!(back.image_data().data(), bg.image_data().data());
    }

    #[test]
    fn flip_mirrors_rows() {
        let bg = BgImage::new(photo(40, 30), 40, 30, Effects::default(), TouchedEffects::new()).unwrap();
        let flipped = bg.flip().unwrap();
        assert_eq!(
            flipped.image_data().pixel(0, 3),
            bg.image_data().pixel(39, 3)
        );
    }

    #[test]
    fn effects_change_processed_pixels_only() {
        let mut bg = BgImage::new(photo(10, 10), 10, 10, Effects::default(), TouchedEffects::new()).unwrap();
        let before = bg.image_data().clone();
        let mut effects = Effects::default();
        effects.set(EffectKey::Brightness, 40.0);
        bg.set_effects(effects, TouchedEffects::from([EffectKey::Brightness])).unwrap();
        assert_ne!(bg.image_data().data(), before.data());
        bg.set_effects(Effects::default(), TouchedEffects::new()).unwrap();
        assert_eq!(bg.image_data().data(), before.data());
    }

    #[test]
    fn free_rotation_covers_the_whole_box() {
        let mut bg = BgImage::new(photo(40, 30), 40, 30, Effects::default(), TouchedEffects::new()).unwrap();
        bg.rotate(30.0).unwrap();
        assert_eq!(bg.angle(), 30.0);
        let p = bg.image_data();
        assert!(p.pixel(1, 1).is_some_and(|c| c.alpha() > 0));
        assert!(p.pixel(38, 28).is_some_and(|c| c.alpha() > 0));
    }
}
