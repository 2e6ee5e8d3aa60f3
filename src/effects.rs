//! Per-pixel photo adjustments.
//!
//! Effects are applied to a straight-alpha RGBA buffer in the fixed order of
//! [`EffectKey::ALL`]. Only keys present in the touched set participate, so a
//! buffer processed with an empty set is left untouched.

use std::collections::BTreeSet;

use image::RgbaImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

const BRIGHTNESS_FACTOR: f32 = 2.55;
const CONTRAST_FACTOR: f32 = 1.0 / 255.0;
const SATURATION_FACTOR: f32 = 1.0 / 100.0;
const FADE_FACTOR: f32 = 1.0 / 100.0;
const HIGHLIGHTS_SHADOWS_FACTOR: f32 = 2.55;
const VIGNETTE_FACTOR: f32 = 1.0 / 100.0;
const GRAIN_FACTOR: f32 = 2.55;
const SHARPEN_FACTOR: f32 = 1.0 / 100.0;
const ENHANCE_FACTOR: f32 = 0.01;

/// Effect identifiers, declared in processing order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EffectKey {
    Brightness,
    Contrast,
    Saturation,
    Warmth,
    Fade,
    Highlights,
    Shadows,
    Vignette,
    Grain,
    Sharpen,
    Enhance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderKind {
    /// -100..=100
    Bidirectional,
    /// 0..=100
    Positive,
}

impl EffectKey {
    pub const ALL: [EffectKey; 11] = [
        EffectKey::Brightness,
        EffectKey::Contrast,
        EffectKey::Saturation,
        EffectKey::Warmth,
        EffectKey::Fade,
        EffectKey::Highlights,
        EffectKey::Shadows,
        EffectKey::Vignette,
        EffectKey::Grain,
        EffectKey::Sharpen,
        EffectKey::Enhance,
    ];

    pub fn title(self) -> &'static str {
        match self {
            EffectKey::Brightness => "Brightness",
            EffectKey::Contrast => "Contrast",
            EffectKey::Saturation => "Saturation",
            EffectKey::Warmth => "Warmth",
            EffectKey::Fade => "Fade",
            EffectKey::Highlights => "Highlights",
            EffectKey::Shadows => "Shadows",
            EffectKey::Vignette => "Vignette",
            EffectKey::Grain => "Grain",
            EffectKey::Sharpen => "Sharpen",
            EffectKey::Enhance => "Enhance",
        }
    }

    pub fn slider(self) -> SliderKind {
        match self {
            EffectKey::Brightness
            | EffectKey::Contrast
            | EffectKey::Saturation
            | EffectKey::Warmth
            | EffectKey::Highlights
            | EffectKey::Shadows => SliderKind::Bidirectional,
            EffectKey::Fade
            | EffectKey::Vignette
            | EffectKey::Grain
            | EffectKey::Sharpen
            | EffectKey::Enhance => SliderKind::Positive,
        }
    }

    pub fn range(self) -> std::ops::RangeInclusive<f32> {
        match self.slider() {
            SliderKind::Bidirectional => -100.0..=100.0,
            SliderKind::Positive => 0.0..=100.0,
        }
    }
}

/// The keys a user has moved away from their default at least once.
pub type TouchedEffects = BTreeSet<EffectKey>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Effects {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub warmth: f32,
    pub fade: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub vignette: f32,
    pub grain: f32,
    pub sharpen: f32,
    pub enhance: f32,
}

impl Effects {
    pub fn get(&self, key: EffectKey) -> f32 {
        match key {
            EffectKey::Brightness => self.brightness,
            EffectKey::Contrast => self.contrast,
            EffectKey::Saturation => self.saturation,
            EffectKey::Warmth => self.warmth,
            EffectKey::Fade => self.fade,
            EffectKey::Highlights => self.highlights,
            EffectKey::Shadows => self.shadows,
            EffectKey::Vignette => self.vignette,
            EffectKey::Grain => self.grain,
            EffectKey::Sharpen => self.sharpen,
            EffectKey::Enhance => self.enhance,
        }
    }

    /// Stores `value` clamped into the key's slider range.
    pub fn set(&mut self, key: EffectKey, value: f32) {
        let range = key.range();
        let value = value.clamp(*range.start(), *range.end());
        let slot = match key {
            EffectKey::Brightness => &mut self.brightness,
            EffectKey::Contrast => &mut self.contrast,
            EffectKey::Saturation => &mut self.saturation,
            EffectKey::Warmth => &mut self.warmth,
            EffectKey::Fade => &mut self.fade,
            EffectKey::Highlights => &mut self.highlights,
            EffectKey::Shadows => &mut self.shadows,
            EffectKey::Vignette => &mut self.vignette,
            EffectKey::Grain => &mut self.grain,
            EffectKey::Sharpen => &mut self.sharpen,
            EffectKey::Enhance => &mut self.enhance,
        };
        *slot = value;
    }

    pub fn is_neutral(&self) -> bool {
        EffectKey::ALL.iter().all(|&k| self.get(k) == 0.0)
    }
}

/// Applies `effects` in place using the thread-local RNG for grain.
pub fn apply_effects(effects: &Effects, touched: &TouchedEffects, image: &mut RgbaImage) {
    apply_effects_with_rng(effects, touched, image, &mut rand::thread_rng());
}

pub fn apply_effects_with_rng<R: Rng + ?Sized>(
    effects: &Effects,
    touched: &TouchedEffects,
    image: &mut RgbaImage,
    rng: &mut R,
) {
    if touched.is_empty() {
        return;
    }

    let brightness = effects.brightness * BRIGHTNESS_FACTOR;
    let contrast = effects.contrast * CONTRAST_FACTOR + 1.0;
    let saturation = effects.saturation * SATURATION_FACTOR + 1.0;
    let warmth = effects.warmth;
    let fade = 1.0 - effects.fade * FADE_FACTOR;
    let highlights = effects.highlights * HIGHLIGHTS_SHADOWS_FACTOR;
    let shadows = effects.shadows * HIGHLIGHTS_SHADOWS_FACTOR;
    let vignette = effects.vignette * VIGNETTE_FACTOR;
    let grain = effects.grain * GRAIN_FACTOR;
    let sharpen = effects.sharpen * SHARPEN_FACTOR;
    let enhance = 1.0 + effects.enhance * ENHANCE_FACTOR;

    let center_x = image.width() as f32 / 2.0;
    let center_y = image.height() as f32 / 2.0;
    let max_dist = (center_x * center_x + center_y * center_y).sqrt();

    let keys: Vec<EffectKey> = touched.iter().copied().collect();

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let [r0, g0, b0, _] = pixel.0;
        let mut c = [f32::from(r0), f32::from(g0), f32::from(b0)];
        let avg = (c[0] + c[1] + c[2]) / 3.0;

        for &key in &keys {
            match key {
                EffectKey::Brightness => c.iter_mut().for_each(|v| *v += brightness),
                EffectKey::Contrast => {
                    c.iter_mut().for_each(|v| *v = (*v - 128.0) * contrast + 128.0)
                }
                EffectKey::Saturation => {
                    c.iter_mut().for_each(|v| *v = avg + (*v - avg) * saturation)
                }
                EffectKey::Warmth => {
                    c[0] += warmth;
                    c[2] -= warmth;
                }
                EffectKey::Fade => c.iter_mut().for_each(|v| *v *= fade),
                EffectKey::Highlights => c
                    .iter_mut()
                    .filter(|v| **v > 128.0)
                    .for_each(|v| *v += highlights),
                EffectKey::Shadows => c
                    .iter_mut()
                    .filter(|v| **v < 128.0)
                    .for_each(|v| *v += shadows),
                EffectKey::Vignette => {
                    let dx = x as f32 - center_x;
                    let dy = y as f32 - center_y;
                    let dist = (dx * dx + dy * dy).sqrt();
                    let factor = 1.0 - (dist / max_dist) * vignette;
                    c.iter_mut().for_each(|v| *v *= factor);
                }
                EffectKey::Grain => {
                    let noise = (rng.r#gen::<f32>() - 0.5) * grain;
                    c.iter_mut().for_each(|v| *v += noise);
                }
                EffectKey::Sharpen => c.iter_mut().for_each(|v| *v += (*v - avg) * sharpen),
                EffectKey::Enhance => c.iter_mut().for_each(|v| {
                    *v = (*v - 128.0) * enhance + 128.0;
                    *v = avg + (*v - avg) * enhance;
                }),
            }
        }

        for (dst, v) in pixel.0.iter_mut().zip(c) {
            *dst = v.round_ties_even().clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(8, 6, |x, y| Rgba([(x * 30) as u8, (y * 40) as u8, 90, 200]))
    }

    fn only(key: EffectKey, value: f32) -> (Effects, TouchedEffects) {
        let mut effects = Effects::default();
        effects.set(key, value);
        (effects, TouchedEffects::from([key]))
    }

    #[test]
    fn empty_touched_set_is_a_no_op() {
        let mut effects = Effects::default();
        effects.brightness = 80.0;
        let mut img = gradient();
        apply_effects(&effects, &TouchedEffects::new(), &mut img);
        assert_eq!(img, gradient());
    }

    #[test]
    fn brightness_adds_and_clamps() {
        let (effects, touched) = only(EffectKey::Brightness, 50.0);
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([10, 200, 250, 255]));
        apply_effects(&effects, &touched, &mut img);
        // 50 * 2.55 = 127.5
        assert_eq!(img.get_pixel(0, 0).0, [138, 255, 255, 255]);
    }

    #[test]
    fn alpha_is_never_modified() {
        let (effects, touched) = only(EffectKey::Contrast, 70.0);
        let mut img = gradient();
        apply_effects(&effects, &touched, &mut img);
        assert!(img.pixels().all(|p| p.0[3] == 200));
    }

    #[test]
    fn warmth_shifts_red_and_blue() {
        let (effects, touched) = only(EffectKey::Warmth, 20.0);
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 255]));
        apply_effects(&effects, &touched, &mut img);
        assert_eq!(img.get_pixel(0, 0).0, [120, 100, 80, 255]);
    }

    #[test]
    fn set_clamps_to_slider_range() {
        let mut effects = Effects::default();
        effects.set(EffectKey::Fade, -40.0);
        effects.set(EffectKey::Brightness, 400.0);
        assert_eq!(effects.fade, 0.0);
        assert_eq!(effects.brightness, 100.0);
    }

    #[test]
    fn vignette_darkens_corners_more_than_center() {
        let (effects, touched) = only(EffectKey::Vignette, 100.0);
        let mut img = RgbaImage::from_pixel(21, 21, Rgba([200, 200, 200, 255]));
        apply_effects(&effects, &touched, &mut img);
        assert!(img.get_pixel(0, 0).0[0] < img.get_pixel(10, 10).0[0]);
    }

    #[test]
    fn grain_is_reproducible_with_a_seeded_rng() {
        let (effects, touched) = only(EffectKey::Grain, 60.0);
        let mut a = gradient();
        let mut b = gradient();
        apply_effects_with_rng(&effects, &touched, &mut a, &mut StdRng::seed_from_u64(7));
        apply_effects_with_rng(&effects, &touched, &mut b, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn processing_order_follows_declaration() {
        let touched: TouchedEffects = [EffectKey::Enhance, EffectKey::Brightness].into();
        let order: Vec<_> = touched.iter().copied().collect();
        assert_eq!(order, vec![EffectKey::Brightness, EffectKey::Enhance]);
    }
}
