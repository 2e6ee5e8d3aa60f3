mod common;

use common::{drag, session};
use egui::{Pos2, Rect, pos2, vec2};
use photo_editor::drawable::MIN_CROP_SIZE;
use photo_editor::{AspectRatio, Drawable, EditorTab, Session};

fn assert_inside_canvas(s: &Session) {
    let rect = s.crop_rect().unwrap();
    let (w, h) = s.canvas_size();
    let eps = 1e-3;
    assert!(rect.min.x >= -eps && rect.min.y >= -eps, "{rect:?}");
    assert!(rect.max.x <= w as f32 + eps && rect.max.y <= h as f32 + eps, "{rect:?}");
    assert!(rect.width() >= MIN_CROP_SIZE - eps && rect.height() >= MIN_CROP_SIZE - eps, "{rect:?}");
}

#[test]
fn square_crop_is_centered_and_commits_to_one_drawable() {
    let mut s = session(400, 300);
    s.switch_tab(EditorTab::Crop).unwrap();
    s.set_crop_aspect_ratio(AspectRatio::Ratio(1.0));
    assert_eq!(s.crop_rect(), Some(Rect::from_min_size(pos2(50.0, 0.0), vec2(300.0, 300.0))));

    s.apply_crop().unwrap();
    assert_eq!(s.canvas_size(), (300, 300));
    assert_eq!(s.drawables().len(), 1);
    assert!(s.drawables()[0].as_bg_image().is_some());
}

#[test]
fn crop_area_never_leaves_the_canvas() {
    let mut s = session(200, 150);
    s.switch_tab(EditorTab::Crop).unwrap();

    // Corners dragged far outside and far inward
    let resizes: [&[Pos2]; 3] = [
        &[pos2(200.0, 150.0), pos2(500.0, 400.0)],
        &[pos2(0.0, 0.0), pos2(150.0, 100.0)],
        &[pos2(200.0, 150.0), pos2(-300.0, -300.0)],
    ];
    for points in resizes {
        drag(&mut s, points);
        assert_inside_canvas(&s);
    }

    // Moving the whole area against every edge
    for target in [pos2(-500.0, 75.0), pos2(-500.0, 900.0), pos2(900.0, -900.0)] {
        let center = s.crop_rect().unwrap().center();
        drag(&mut s, &[center, target]);
        assert_inside_canvas(&s);
    }
    let rect = s.crop_rect().unwrap();
    assert_eq!((rect.max.x, rect.min.y), (200.0, 0.0));
}

#[test]
fn locked_ratio_survives_resizing() {
    let mut s = session(400, 300);
    s.switch_tab(EditorTab::Crop).unwrap();
    let ratio = 16.0 / 9.0;
    s.set_crop_aspect_ratio(AspectRatio::Ratio(ratio));

    let targets = [pos2(300.0, 120.0), pos2(390.0, 290.0), pos2(20.0, 20.0), pos2(1000.0, 1000.0)];
    for target in targets {
        let corner = s.crop_rect().unwrap().max;
        drag(&mut s, &[corner, target]);
        let rect = s.crop_rect().unwrap();
        assert!((rect.width() / rect.height() - ratio).abs() < 1e-3, "{rect:?}");
        assert_inside_canvas(&s);
    }
}

#[test]
fn four_quarter_turns_restore_the_size() {
    let mut s = session(120, 80);
    s.switch_tab(EditorTab::Crop).unwrap();
    for turn in 1..=4 {
        s.rotate90();
        assert!(s.flush_pending_crop_action().unwrap());
        let expected = if turn % 2 == 1 { (80, 120) } else { (120, 80) };
        assert_eq!(s.canvas_size(), expected);
    }
    assert!(s.is_apply_crop_visible());
}

#[test]
fn strokes_are_flattened_when_entering_crop() {
    let mut s = session(100, 100);
    s.switch_tab(EditorTab::Draw).unwrap();
    drag(&mut s, &[pos2(10.0, 10.0), pos2(90.0, 90.0)]);
    s.switch_tab(EditorTab::Crop).unwrap();

    let kinds: Vec<_> = s.drawables().iter().map(|d| d.kind()).collect();
    assert_eq!(kinds, ["background", "pen", "background", "crop_area"]);
}

#[test]
fn fractional_pointer_crop_has_no_transparent_edge() {
    let mut s = session(400, 300);
    s.switch_tab(EditorTab::Crop).unwrap();
    drag(&mut s, &[pos2(400.0, 300.0), pos2(250.4, 180.6)]);
    let center = s.crop_rect().unwrap().center();
    drag(&mut s, &[center, center + vec2(0.3, 0.7)]);
    s.apply_crop().unwrap();

    let background = s.drawables()[0].as_bg_image().unwrap();
    assert_eq!(s.canvas_size(), (background.width(), background.height()));
    assert_eq!(s.canvas_size(), (251, 180));
    assert!(s.canvas_image().pixels().all(|p| p.0[3] == 255));
}
