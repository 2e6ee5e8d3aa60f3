mod common;

use common::{drag, session, state_of};
use egui::pos2;
use photo_editor::{AspectRatio, EditorTab, EffectKey, ImageSource, history::DEFAULT_HISTORY_LIMIT};

#[test]
fn undo_and_redo_walk_the_same_states() {
    let mut s = session(120, 80);
    let before = state_of(&s);

    s.switch_tab(EditorTab::Draw).unwrap();
    drag(&mut s, &[pos2(10.0, 10.0), pos2(60.0, 40.0), pos2(100.0, 20.0)]);
    s.switch_tab(EditorTab::Enhance).unwrap();
    s.set_ui_effect_value(EffectKey::Contrast, 30.0);
    s.apply_effects().unwrap();
    s.switch_tab(EditorTab::Sticker).unwrap();
    let sticker = ImageSource::from_image(&image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 0, 0, 255]))).unwrap();
    s.add_sticker(sticker, 30).unwrap();
    s.tick_at(0.0).unwrap();
    let after = state_of(&s);
    assert_eq!(s.undo_len(), 3);

    for _ in 0..3 {
        s.undo();
    }
    assert_eq!(state_of(&s), before);
    assert!(!s.can_undo());

    for _ in 0..3 {
        s.redo();
    }
    assert_eq!(state_of(&s), after);
    assert!(!s.can_redo());
}

#[test]
fn undoing_a_crop_restores_the_canvas_size() {
    let mut s = session(400, 300);
    let before = state_of(&s);
    s.switch_tab(EditorTab::Crop).unwrap();
    s.set_crop_aspect_ratio(AspectRatio::Ratio(1.0));
    s.apply_crop().unwrap();
    let after = state_of(&s);
    assert_eq!(after.1, (300, 300));

    s.undo();
    assert_eq!(state_of(&s), before);
    s.redo();
    assert_eq!(state_of(&s), after);
}

#[test]
fn history_keeps_only_the_newest_entries() {
    let mut s = session(60, 60);
    s.switch_tab(EditorTab::Draw).unwrap();
    for i in 0..20 {
        let y = 5.0 + 2.0 * i as f32;
        drag(&mut s, &[pos2(5.0, y), pos2(50.0, y)]);
        assert!(s.undo_len() <= DEFAULT_HISTORY_LIMIT);
    }
    assert_eq!(s.undo_len(), DEFAULT_HISTORY_LIMIT);

    while s.can_undo() {
        s.undo();
    }
    // The five oldest strokes can no longer be undone
    assert_eq!(s.drawables().len(), 1 + 5);
}

#[test]
fn a_new_edit_clears_redo() {
    let mut s = session(60, 60);
    s.switch_tab(EditorTab::Draw).unwrap();
    drag(&mut s, &[pos2(5.0, 5.0), pos2(50.0, 50.0)]);
    drag(&mut s, &[pos2(5.0, 50.0), pos2(50.0, 5.0)]);
    s.undo();
    assert!(s.can_redo());

    drag(&mut s, &[pos2(30.0, 5.0), pos2(30.0, 50.0)]);
    assert!(!s.can_redo());
    assert_eq!(s.redo_len(), 0);
}

#[test]
fn brightness_then_undo_restores_the_pixels() {
    let mut s = session(64, 48);
    let before = s.canvas_pixels().data().to_vec();

    s.set_ui_effect_value(EffectKey::Brightness, 50.0);
    s.apply_effects().unwrap();
    s.tick_at(0.0).unwrap();
    assert_ne!(s.canvas_pixels().data(), &before[..]);

    s.undo();
    assert_eq!(s.canvas_pixels().data(), &before[..]);
    assert_eq!(s.effects_applied().get(EffectKey::Brightness), 0.0);
}
