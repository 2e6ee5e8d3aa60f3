//! Crop tab: the crop overlay, committing a crop and the debounced
//! rotate/flip actions.

use egui::Rect;

use super::Session;
use crate::drawable::{AspectRatio, BgImage, CropArea, DrawableType};
use crate::error::{EditorError, Result};
use crate::event::SessionEvent;
use crate::state::{CropAction, Mode};

impl Session {
    /// Entering the crop tab. Live strokes are flattened into a new
    /// background image first so cropping works on a single bitmap.
    pub(super) fn enter_crop(&mut self) -> Result<()> {
        self.crop_aspect_ratio = AspectRatio::Free;
        self.events.emit(SessionEvent::AspectRatioChanged(AspectRatio::Free));

        if self.drawables.iter().any(DrawableType::is_stroke) {
            self.flush_draw();
            let flattened = BgImage::from_pixels(self.surface.pixmap().clone())?;
            log::debug!("Session {}: flattened strokes before cropping", self.id);
            self.drawables.push(flattened.into());
            // Applied effects are baked into the flattened pixels
            self.reset_effects();
        }

        self.update_mode(Mode::Cropping { crop: None });
        self.ensure_crop_area();
        Ok(())
    }

    /// Adds a crop overlay when cropping without one and applies the current
    /// aspect ratio to it.
    fn ensure_crop_area(&mut self) {
        let Mode::Cropping { crop } = self.mode else {
            return;
        };
        let index = match crop {
            Some(index) => index,
            None => {
                self.drawables.push(CropArea::new(self.surface.size()).into());
                let index = self.drawables.len() - 1;
                self.update_mode(Mode::Cropping { crop: Some(index) });
                self.events.emit(SessionEvent::CropVisibilityChanged(true));
                index
            }
        };
        let ratio = self.crop_aspect_ratio;
        if let Some(crop_area) = self.drawables.get_mut(index).and_then(DrawableType::as_crop_area_mut) {
            crop_area.accept_aspect_ratio(ratio);
        }
        self.request_draw();
    }

    fn crop_area(&self) -> Option<&CropArea> {
        let index = self.mode.crop_index()?;
        self.drawables.get(index)?.as_crop_area()
    }

    /// Current crop rectangle, when a crop overlay is shown.
    pub fn crop_rect(&self) -> Option<Rect> {
        self.crop_area().map(CropArea::rect)
    }

    pub fn crop_aspect_ratio(&self) -> AspectRatio {
        self.crop_aspect_ratio
    }

    /// Ignored outside the crop tab. Recreates the overlay if a crop was just
    /// committed or undone.
    pub fn set_crop_aspect_ratio(&mut self, ratio: AspectRatio) {
        if !self.mode.is_cropping() {
            return;
        }
        self.crop_aspect_ratio = ratio;
        self.events.emit(SessionEvent::AspectRatioChanged(ratio));
        self.ensure_crop_area();
    }

    pub fn is_apply_crop_visible(&self) -> bool {
        self.crop_area().is_some()
    }

    fn drop_crop_area(&mut self) {
        self.drawables.retain(|d| !d.is_crop_area());
        if self.mode.is_cropping() {
            self.update_mode(Mode::Cropping { crop: None });
        }
    }

    /// Replaces everything with the pixels under the crop rectangle and
    /// shrinks the canvas to it. A no-op without a crop overlay.
    pub fn apply_crop(&mut self) -> Result<()> {
        let Some(rect) = self.crop_rect() else {
            return Ok(());
        };
        let (x, y, width, height) = pixel_bounds(rect, self.surface.width(), self.surface.height())?;

        self.drop_crop_area();
        self.draw();
        let cropped = self
            .surface
            .read_region(x, y, width, height)
            .ok_or(EditorError::InvalidDimensions { width, height })?;
        self.save_state();

        // Sized by what was read, so the canvas always matches its background
        let (width, height) = (cropped.width(), cropped.height());
        self.reset_effects();
        self.drawables = vec![BgImage::from_pixels(cropped)?.into()];
        self.surface.resize(width, height)?;
        self.draw();

        log::info!("Session {}: cropped to {width}x{height} at ({x}, {y})", self.id);
        self.events.emit(SessionEvent::CropVisibilityChanged(false));
        self.events.emit(SessionEvent::CropApplied { width, height });
        Ok(())
    }

    /// Queues a crop action. Rapid calls coalesce into the last one, which
    /// runs on the first tick after the debounce window.
    pub fn apply_crop_action(&mut self, action: CropAction) {
        let now = self.clock.now_ms();
        self.crop_actions.call(action, now);
    }

    pub fn rotate90(&mut self) {
        self.apply_crop_action(CropAction::Rotate90);
    }

    pub fn flip(&mut self) {
        self.apply_crop_action(CropAction::Flip);
    }

    /// Free rotation in degrees, from the angle picker.
    pub fn set_free_angle(&mut self, angle: f32) {
        self.free_angle = angle;
        self.apply_crop_action(CropAction::Rotate(angle));
    }

    pub fn free_angle(&self) -> f32 {
        self.free_angle
    }

    /// Runs a queued crop action now. Returns whether one was pending.
    pub fn flush_pending_crop_action(&mut self) -> Result<bool> {
        match self.crop_actions.flush() {
            Some(action) => {
                self.run_crop_action(action)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(super) fn run_crop_action(&mut self, action: CropAction) -> Result<()> {
        if !self.mode.is_cropping() {
            return Ok(());
        }
        self.drop_crop_area();
        self.draw();
        self.save_state();

        match action {
            CropAction::Rotate90 | CropAction::Flip => {
                self.reset_effects();
                let flattened = BgImage::from_pixels(self.surface.pixmap().clone())?;
                let transformed = match action {
                    CropAction::Rotate90 => flattened.rotate90()?,
                    _ => flattened.flip()?,
                };
                self.surface.resize(transformed.width(), transformed.height())?;
                self.drawables = vec![transformed.into()];
                self.free_angle = 0.0;
                self.events.emit(SessionEvent::RotationReset);
                self.draw();
            }
            CropAction::Rotate(angle) => {
                match self.last_bg_image_mut() {
                    Some(background) => background.rotate(angle)?,
                    None => log::warn!("Session {}: nothing to rotate", self.id),
                }
                self.request_draw();
            }
        }
        log::info!("Session {}: crop action {action:?}", self.id);

        self.ensure_crop_area();
        Ok(())
    }
}

/// Whole-pixel region under `rect`, taken from its rounded edges and clipped
/// to a `canvas_w`×`canvas_h` canvas.
fn pixel_bounds(rect: Rect, canvas_w: u32, canvas_h: u32) -> Result<(i32, i32, u32, u32)> {
    let x0 = rect.min.x.round().clamp(0.0, canvas_w as f32);
    let y0 = rect.min.y.round().clamp(0.0, canvas_h as f32);
    let x1 = rect.max.x.round().clamp(x0, canvas_w as f32);
    let y1 = rect.max.y.round().clamp(y0, canvas_h as f32);
    let (width, height) = ((x1 - x0) as u32, (y1 - y0) as u32);
    if width == 0 || height == 0 {
        return Err(EditorError::InvalidDimensions { width, height });
    }
    Ok((x0 as i32, y0 as i32, width, height))
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2};

    use super::*;
    use crate::drawable::Drawable;
    use crate::effects::{EffectKey, Effects};
    use crate::input::InputEvent;
    use crate::session::tests::session;
    use crate::state::EditorTab;

    #[test]
    fn square_crop_of_a_landscape_canvas() {
        let mut s = session(400, 300);
        s.switch_tab(EditorTab::Crop).unwrap();
        assert!(s.is_apply_crop_visible());
        s.set_crop_aspect_ratio(AspectRatio::Ratio(1.0));
        assert_eq!(s.crop_rect(), Some(Rect::from_min_size(pos2(50.0, 0.0), vec2(300.0, 300.0))));

        s.apply_crop().unwrap();
        assert_eq!(s.canvas_size(), (300, 300));
        assert_eq!(s.drawables().len(), 1);
        assert_eq!(s.drawables()[0].kind(), "background");
        assert!(!s.is_apply_crop_visible());
        // Column 50 of the photo is now column 0
        assert_eq!(s.canvas_image().get_pixel(0, 10).0, [50, 10, 90, 255]);
    }

    #[test]
    fn apply_crop_without_overlay_is_a_no_op() {
        let mut s = session(40, 30);
        s.apply_crop().unwrap();
        assert_eq!(s.canvas_size(), (40, 30));
        assert!(!s.can_undo());
    }

    #[test]
    fn aspect_ratio_outside_crop_is_ignored() {
        let mut s = session(40, 30);
        s.set_crop_aspect_ratio(AspectRatio::Ratio(1.0));
        assert_eq!(s.crop_aspect_ratio(), AspectRatio::Free);
    }

    #[test]
    fn crop_actions_are_debounced() {
        let mut s = session(40, 30);
        s.switch_tab(EditorTab::Crop).unwrap();
        s.rotate90();
        s.rotate90();
        assert!(!s.tick_at(10.0).unwrap());
        assert_eq!(s.canvas_size(), (40, 30));
        s.tick_at(100.0).unwrap();
        // Only the last of the two calls ran
        assert_eq!(s.canvas_size(), (30, 40));
        assert_eq!(s.undo_len(), 1);
        assert!(s.is_apply_crop_visible());
    }

    #[test]
    fn flip_keeps_size_and_mirrors() {
        let mut s = session(40, 30);
        s.switch_tab(EditorTab::Crop).unwrap();
        s.flip();
        assert!(s.flush_pending_crop_action().unwrap());
        assert_eq!(s.canvas_size(), (40, 30));
        assert_eq!(s.drawables().iter().filter(|d| d.as_bg_image().is_some()).count(), 1);
        s.drop_crop_area();
        s.draw();
        assert_eq!(s.canvas_image().get_pixel(39, 5).0, [0, 5, 90, 255]);
    }

    #[test]
    fn free_rotation_keeps_the_canvas_size() {
        let mut s = session(40, 30);
        s.switch_tab(EditorTab::Crop).unwrap();
        s.set_free_angle(15.0);
        s.flush_pending_crop_action().unwrap();
        assert_eq!(s.canvas_size(), (40, 30));
        let angle = s.drawables().iter().find_map(|d| d.as_bg_image()).map(BgImage::angle);
        assert_eq!(angle, Some(15.0));
        assert_eq!(s.free_angle(), 15.0);
    }

    #[test]
    fn leaving_crop_discards_the_overlay() {
        let mut s = session(40, 30);
        s.switch_tab(EditorTab::Crop).unwrap();
        assert_eq!(s.drawables().len(), 2);
        s.switch_tab(EditorTab::Enhance).unwrap();
        assert_eq!(s.drawables().len(), 1);
        assert_eq!(s.mode(), Mode::Idle);
        s.rotate90();
        s.tick_at(1_000.0).unwrap();
        assert_eq!(s.canvas_size(), (40, 30));
    }

    #[test]
    fn pixel_bounds_use_rounded_edges() {
        let rect = Rect::from_min_max(pos2(0.5, 0.5), pos2(400.0, 300.0));
        assert_eq!(pixel_bounds(rect, 400, 300).unwrap(), (1, 1, 399, 299));

        let rect = Rect::from_min_max(pos2(10.4, 20.6), pos2(250.6, 180.4));
        assert_eq!(pixel_bounds(rect, 400, 300).unwrap(), (10, 21, 241, 159));

        let sliver = Rect::from_min_max(pos2(399.6, 0.0), pos2(400.2, 300.0));
        assert!(matches!(
            pixel_bounds(sliver, 400, 300),
            Err(EditorError::InvalidDimensions { width: 0, .. })
        ));
    }

    #[test]
    fn fractional_crop_fills_the_new_canvas() {
        let mut s = session(400, 300);
        s.switch_tab(EditorTab::Crop).unwrap();
        s.handle_input(InputEvent::PointerDown(pos2(0.0, 0.0))).unwrap();
        s.handle_input(InputEvent::PointerMove(pos2(0.5, 0.5))).unwrap();
        s.handle_input(InputEvent::PointerUp).unwrap();
        s.apply_crop().unwrap();

        assert_eq!(s.canvas_size(), (399, 299));
        let background = s.drawables()[0].as_bg_image().unwrap();
        assert_eq!((background.width(), background.height()), (399, 299));
        assert!(s.canvas_image().pixels().all(|p| p.0[3] == 255));
        assert_eq!(s.canvas_image().get_pixel(398, 10).0, [143, 11, 90, 255]);
    }

    #[test]
    fn effects_are_not_reapplied_after_flattening() {
        let mut s = session(100, 100);
        s.set_ui_effect_value(EffectKey::Brightness, 20.0);
        s.apply_effects().unwrap();
        s.tick_at(0.0).unwrap();

        s.switch_tab(EditorTab::Draw).unwrap();
        s.handle_input(InputEvent::PointerDown(pos2(10.0, 10.0))).unwrap();
        s.handle_input(InputEvent::PointerMove(pos2(20.0, 10.0))).unwrap();
        s.handle_input(InputEvent::PointerUp).unwrap();

        s.switch_tab(EditorTab::Crop).unwrap();
        assert!(s.touched_effects().is_empty());
        assert_eq!(s.effects_ui(), &Effects::default());
        s.switch_tab(EditorTab::Enhance).unwrap();
        s.tick_at(0.0).unwrap();
        let before = s.canvas_image().get_pixel(80, 80).0;

        s.apply_effects().unwrap();
        s.tick_at(0.0).unwrap();
        assert_eq!(s.canvas_image().get_pixel(80, 80).0, before);
    }

    #[test]
    fn undo_during_crop_clears_the_overlay() {
        let mut s = session(40, 30);
        s.switch_tab(EditorTab::Crop).unwrap();
        s.apply_crop().unwrap();
        s.set_crop_aspect_ratio(AspectRatio::Free);
        assert!(s.is_apply_crop_visible());
        s.undo();
        assert!(!s.is_apply_crop_visible());
        assert_eq!(s.drawables().iter().filter(|d| d.kind() == "crop_area").count(), 0);
    }
}
