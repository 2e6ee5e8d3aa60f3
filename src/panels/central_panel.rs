use egui::{Color32, Event, Key, Pos2, Rect, pos2};

use crate::PhotoEditorApp;
use crate::input::{InputEvent, KeyPress};

/// Named keys forwarded to the canvas as-is. Printable keys arrive as text.
const CANVAS_KEYS: [Key; 5] = [Key::Backspace, Key::Delete, Key::Enter, Key::Escape, Key::Tab];

pub fn central_panel(app: &mut PhotoEditorApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        app.set_container(ui.available_size());

        let Some((texture, size)) = app.canvas_texture(ctx) else {
            let hint = if app.is_loading() {
                "Loading…"
            } else {
                "Drop a photo here"
            };
            ui.centered_and_justified(|ui| ui.label(hint));
            return;
        };

        let canvas_rect = Rect::from_center_size(ui.available_rect_before_wrap().center(), size);
        let response = ui.allocate_rect(canvas_rect, egui::Sense::click_and_drag());
        ui.painter().image(
            texture,
            canvas_rect,
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            Color32::WHITE,
        );

        for event in canvas_events(ui, canvas_rect) {
            app.handle_input(event);
        }

        if response.hovered() {
            if let Some(session) = app.session() {
                ctx.set_cursor_icon(session.cursor());
            }
        }
    });
}

/// Translates this frame's raw input into canvas-space events.
fn canvas_events(ui: &egui::Ui, canvas_rect: Rect) -> Vec<InputEvent> {
    let to_canvas = |pos: Pos2| (pos - canvas_rect.min).to_pos2();
    let mut events = Vec::new();
    ui.input(|i| {
        for event in &i.events {
            match event {
                Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if !pressed {
                        events.push(InputEvent::PointerUp);
                    } else if canvas_rect.contains(*pos) {
                        events.push(InputEvent::PointerDown(to_canvas(*pos)));
                    }
                }
                Event::PointerMoved(pos) => {
                    if canvas_rect.contains(*pos) {
                        events.push(InputEvent::PointerMove(to_canvas(*pos)));
                    } else {
                        events.push(InputEvent::PointerLeave);
                    }
                }
                Event::PointerGone => events.push(InputEvent::PointerLeave),
                Event::Text(text) => {
                    events.extend(text.chars().map(|c| InputEvent::Key(KeyPress::char(c))));
                }
                Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } if modifiers.command || CANVAS_KEYS.contains(key) => {
                    events.push(InputEvent::Key(KeyPress::named(*key).with_modifiers(*modifiers)));
                }
                _ => {}
            }
        }
    });
    events
}
