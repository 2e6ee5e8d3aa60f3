//! Bitmap sources fed into the editor: the initial photo and stickers.

use std::future::Future;
use std::sync::Arc;

use egui::{Vec2, vec2};
use image::RgbaImage;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::error::{EditorError, Result};
use crate::surface::pixmap_from_rgba;

/// Default edge length of square sticker buffers.
pub const STICKER_TARGET_SIZE: u32 = 300;

/// Immutable pixels shared between a drawable and its clones.
#[derive(Clone)]
pub enum ImageSource {
    /// A decoded image; drawn scaled into whatever box it is given.
    Decoded(Arc<Pixmap>),
    /// Raw pixel data; drawn at its native size.
    Raw(Arc<Pixmap>),
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (kind, p) = match self {
            ImageSource::Decoded(p) => ("Decoded", p),
            ImageSource::Raw(p) => ("Raw", p),
        };
        write!(f, "{kind}({}x{})", p.width(), p.height())
    }
}

impl ImageSource {
    /// Decodes PNG/JPEG/... bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        log::debug!("Decoded {}x{} image", image.width(), image.height());
        Self::from_image(&image)
    }

    pub fn from_image(image: &RgbaImage) -> Result<Self> {
        Ok(ImageSource::Decoded(Arc::new(pixmap_from_rgba(image)?)))
    }

    /// Straight-alpha RGBA bytes, row-major.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(EditorError::PixelBufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        let image = RgbaImage::from_raw(width, height, data)
            .ok_or(EditorError::InvalidDimensions { width, height })?;
        Ok(ImageSource::Raw(Arc::new(pixmap_from_rgba(&image)?)))
    }

    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        ImageSource::Raw(Arc::new(pixmap))
    }

    /// Waits for a pending load (a file read, a network fetch) and decodes it.
    pub async fn load<F>(pending: F) -> Result<Self>
    where
        F: Future<Output = Result<Vec<u8>>>,
    {
        let bytes = pending.await?;
        Self::decode(&bytes)
    }

    pub fn pixmap(&self) -> &Pixmap {
        match self {
            ImageSource::Decoded(p) | ImageSource::Raw(p) => p,
        }
    }

    pub fn size(&self) -> Vec2 {
        let p = self.pixmap();
        vec2(p.width() as f32, p.height() as f32)
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, ImageSource::Raw(_))
    }

    /// Letterboxes the source into a `target` x `target` transparent square.
    pub fn scaled_to_square(&self, target: u32) -> Result<Self> {
        let src = self.pixmap();
        let mut out = Pixmap::new(target, target).ok_or(EditorError::InvalidDimensions {
            width: target,
            height: target,
        })?;
        let t = target as f32;
        let scale = (t / src.width() as f32).min(t / src.height() as f32);
        let offset = (Vec2::splat(t) - self.size() * scale) / 2.0;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_translate(offset.x, offset.y).pre_scale(scale, scale);
        out.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
        Ok(ImageSource::Raw(Arc::new(out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_buffer_length_is_checked() {
        let err = ImageSource::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, EditorError::PixelBufferSize { expected: 16, actual: 15, .. }));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(ImageSource::decode(b"not an image"), Err(EditorError::Image(_))));
    }

    #[test]
    fn load_awaits_the_pending_bytes() {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(RgbaImage::new(3, 2))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let source = futures::executor::block_on(ImageSource::load(async { Ok(png) })).unwrap();
        assert_eq!(source.size(), vec2(3.0, 2.0));
        assert!(!source.is_raw());
    }

    #[test]
    fn wide_sticker_is_centered_vertically() {
        let mut data = Vec::new();
        for _ in 0..(40 * 20) {
            data.extend_from_slice(&[255, 0, 0, 255]);
        }
        let source = ImageSource::from_raw(40, 20, data).unwrap();
        let square = source.scaled_to_square(100).unwrap();
        let p = square.pixmap();
        assert_eq!((p.width(), p.height()), (100, 100));
        assert_eq!(p.pixel(50, 5).map(|c| c.alpha()), Some(0));
        assert_eq!(p.pixel(50, 50).map(|c| c.alpha()), Some(255));
    }
}
