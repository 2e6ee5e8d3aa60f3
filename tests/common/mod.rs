#![allow(dead_code)]

use egui::Pos2;
use image::{Rgba, RgbaImage};
use photo_editor::{EditorConfig, ImageSource, InputEvent, ManualClock, Session};

/// A photo whose pixels encode their own coordinates.
pub fn photo(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255]))
}

/// A painted session on a manual clock at t=0.
pub fn session(width: u32, height: u32) -> Session {
    let source = ImageSource::from_image(&photo(width, height)).unwrap();
    let mut session = Session::new(source, EditorConfig::default()).unwrap();
    session.set_clock(Box::new(ManualClock::new(0.0)));
    session.tick_at(0.0).unwrap();
    session
}

pub fn drag(session: &mut Session, points: &[Pos2]) {
    session.handle_input(InputEvent::PointerDown(points[0])).unwrap();
    for &p in &points[1..] {
        session.handle_input(InputEvent::PointerMove(p)).unwrap();
    }
    session.handle_input(InputEvent::PointerUp).unwrap();
}

/// Drawable count, canvas size and raw pixels.
pub fn state_of(session: &Session) -> (usize, (u32, u32), Vec<u8>) {
    (
        session.drawables().len(),
        session.canvas_size(),
        session.canvas_pixels().data().to_vec(),
    )
}
