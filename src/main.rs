#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true)
            .with_title("Photo editor"),
        ..Default::default()
    };
    eframe::run_native(
        "photo_editor",
        native_options,
        Box::new(|cc| Ok(Box::new(photo_editor::PhotoEditorApp::new(cc)))),
    )
}

// The web build embeds the library from its host page.
#[cfg(target_arch = "wasm32")]
fn main() {}
