//! Pointer and keyboard routing by mode.

use egui::{CursorIcon, Key, Pos2};

use super::Session;
use crate::drawable::{Drawable, DrawableType, KeyOutcome};
use crate::error::Result;
use crate::input::{InputEvent, KeyCode, KeyPress, PointerSample};
use crate::state::{EditorTab, Mode};
use crate::tools::{self, PixelSources};

impl Session {
    pub fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::PointerDown(pos) => self.on_mouse_down(pos)?,
            InputEvent::PointerMove(pos) => self.on_mouse_move(pos),
            InputEvent::PointerUp | InputEvent::PointerLeave => self.on_mouse_up(),
            InputEvent::Key(key) => self.on_key_down(&key),
        }
        Ok(())
    }

    /// Topmost text box or sticker under `pos`.
    fn resizable_at(&self, pos: Pos2) -> Option<usize> {
        self.drawables
            .iter()
            .rposition(|d| d.as_resizable().is_some() && d.contains_point(pos))
    }

    fn on_mouse_down(&mut self, pos: Pos2) -> Result<()> {
        match self.mode {
            Mode::Drawing { .. } => {
                self.save_state();
                let sources = PixelSources {
                    canvas: self.surface.pixmap(),
                    background: self.last_bg_image().map(|bg| bg.image_data()),
                };
                let mut line = tools::instantiate(self.tool, self.drawing_options(), sources)?;
                let sample = PointerSample::new(pos, self.clock.now_ms());
                line.on_mouse_down(pos);
                line.on_mouse_move(sample);
                self.drawables.push(line);
                self.update_mode(Mode::Drawing {
                    current: Some(self.drawables.len() - 1),
                });
                self.request_draw();
            }
            Mode::Idle if self.tab.has_resizables() => match self.resizable_at(pos) {
                Some(index) => {
                    self.save_state();
                    self.select(index);
                    self.drawables[index].on_mouse_down(pos);
                    self.update_mode(Mode::Dragging { target: index });
                    self.request_draw();
                }
                None if self.tab == EditorTab::Text => self.add_text(pos),
                None => {}
            },
            Mode::Cropping { crop: Some(index) } => {
                if let Some(crop) = self.drawables.get_mut(index) {
                    crop.on_mouse_down(pos);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_mouse_move(&mut self, pos: Pos2) {
        let sample = PointerSample::new(pos, self.clock.now_ms());

        if self.tab.has_resizables() {
            let hovered = self.resizable_at(pos).and_then(|i| self.drawables[i].cursor_at(pos));
            let cursor = match hovered {
                Some(cursor) => cursor,
                None if self.tab == EditorTab::Text => CursorIcon::Crosshair,
                None => CursorIcon::Default,
            };
            self.set_cursor(cursor);
        }

        match self.mode {
            Mode::Drawing { current: Some(index) } => {
                if let Some(line) = self.drawables.get_mut(index) {
                    line.on_mouse_move(sample);
                    self.request_draw();
                }
            }
            Mode::Dragging { target } => {
                if let Some(object) = self.drawables.get_mut(target) {
                    object.on_mouse_move(sample);
                    self.select(target);
                    self.request_draw();
                }
            }
            Mode::Cropping { crop: Some(index) } => {
                if let Some(crop) = self.drawables.get_mut(index) {
                    crop.on_mouse_move(sample);
                    let cursor = crop.cursor_at(pos);
                    if let Some(cursor) = cursor {
                        self.set_cursor(cursor);
                    }
                    self.request_draw();
                }
            }
            _ => {}
        }
    }

    fn on_mouse_up(&mut self) {
        match self.mode {
            Mode::Drawing { current: Some(index) } => {
                if let Some(line) = self.drawables.get_mut(index) {
                    line.on_mouse_up();
                }
                self.update_mode(Mode::Drawing { current: None });
                self.request_draw();
            }
            Mode::Dragging { target } => {
                if let Some(object) = self.drawables.get_mut(target) {
                    object.on_mouse_up();
                }
                self.update_mode(Mode::Idle);
            }
            Mode::Cropping { crop: Some(index) } => {
                if let Some(crop) = self.drawables.get_mut(index) {
                    crop.on_mouse_up();
                }
            }
            _ => {}
        }
    }

    fn on_key_down(&mut self, key: &KeyPress) {
        let is_z = key.is(Key::Z) || matches!(key.key, KeyCode::Char('z' | 'Z'));
        if key.command() && is_z {
            if key.modifiers.shift {
                self.redo();
            } else {
                self.undo();
            }
            return;
        }

        if !self.tab.has_resizables() {
            return;
        }
        let Some(selected) = self.drawables.iter_mut().find(|d| d.is_selected()) else {
            return;
        };
        let id = selected.id();
        let outcome = selected
            .as_resizable_mut()
            .map_or(KeyOutcome::Ignored, |resizable| resizable.on_key_press(key));
        match outcome {
            KeyOutcome::Remove => self.remove_draggable(id),
            KeyOutcome::Handled => self.request_draw(),
            KeyOutcome::Ignored => {}
        }
    }

    /// The stroke being drawn, if any.
    pub fn current_stroke(&self) -> Option<&DrawableType> {
        match self.mode {
            Mode::Drawing { current: Some(index) } => self.drawables.get(index),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use egui::{Modifiers, pos2};

    use super::*;
    use crate::drawable::TextStyle;
    use crate::session::tests::session;
    use crate::state::Tool;

    fn drag(s: &mut crate::session::Session, points: &[Pos2]) {
        s.handle_input(InputEvent::PointerDown(points[0])).unwrap();
        for &p in &points[1..] {
            s.handle_input(InputEvent::PointerMove(p)).unwrap();
        }
        s.handle_input(InputEvent::PointerUp).unwrap();
    }

    #[test]
    fn a_stroke_is_one_undo_step() {
        let mut s = session(100, 100);
        s.switch_tab(EditorTab::Draw).unwrap();
        drag(&mut s, &[pos2(10.0, 10.0), pos2(50.0, 50.0), pos2(90.0, 10.0)]);
        assert_eq!(s.drawables().len(), 2);
        assert_eq!(s.undo_len(), 1);
        s.undo();
        assert_eq!(s.drawables().len(), 1);
    }

    #[test]
    fn eraser_paints_back_the_photo() {
        let mut s = session(50, 50);
        s.switch_tab(EditorTab::Draw).unwrap();
        s.set_tool(Tool::Eraser);
        drag(&mut s, &[pos2(5.0, 5.0), pos2(20.0, 20.0)]);
        assert_eq!(s.drawables().last().map(|d| d.kind()), Some("eraser"));
    }

    #[test]
    fn clicking_empty_text_tab_creates_a_selected_box() {
        let mut s = session(200, 100);
        s.switch_tab(EditorTab::Text).unwrap();
        s.set_text_style(TextStyle::Plain);
        s.handle_input(InputEvent::PointerDown(pos2(20.0, 20.0))).unwrap();
        s.handle_input(InputEvent::PointerUp).unwrap();
        assert_eq!(s.drawables().len(), 2);
        let text = s.drawables()[1].as_text().unwrap();
        assert_eq!(text.style(), TextStyle::Plain);
        assert_eq!(s.selected_id(), Some(text.id()));

        for c in "Hi".chars() {
            s.handle_input(InputEvent::Key(KeyPress::char(c))).unwrap();
        }
        assert_eq!(s.drawables()[1].as_text().unwrap().lines(), vec!["Hi"]);
    }

    #[test]
    fn command_backspace_removes_the_text() {
        let mut s = session(200, 100);
        s.switch_tab(EditorTab::Text).unwrap();
        s.handle_input(InputEvent::PointerDown(pos2(20.0, 20.0))).unwrap();
        s.handle_input(InputEvent::PointerUp).unwrap();
        let key = KeyPress::named(Key::Backspace).with_modifiers(Modifiers::COMMAND);
        s.handle_input(InputEvent::Key(key)).unwrap();
        assert_eq!(s.drawables().len(), 1);
    }

    #[test]
    fn keyboard_undo_and_redo() {
        let mut s = session(60, 60);
        s.switch_tab(EditorTab::Draw).unwrap();
        drag(&mut s, &[pos2(10.0, 10.0), pos2(40.0, 40.0)]);
        let undo = KeyPress::char('z').with_modifiers(Modifiers::COMMAND);
        s.handle_input(InputEvent::Key(undo)).unwrap();
        assert_eq!(s.drawables().len(), 1);
        let redo = KeyPress::char('z').with_modifiers(Modifiers::COMMAND | Modifiers::SHIFT);
        s.handle_input(InputEvent::Key(redo)).unwrap();
        assert_eq!(s.drawables().len(), 2);
    }

    #[test]
    fn hovering_text_tab_shows_crosshair() {
        let mut s = session(60, 60);
        s.switch_tab(EditorTab::Text).unwrap();
        s.handle_input(InputEvent::PointerMove(pos2(30.0, 30.0))).unwrap();
        assert_eq!(s.cursor(), CursorIcon::Crosshair);
    }

    #[test]
    fn leaving_the_canvas_ends_a_stroke() {
        let mut s = session(60, 60);
        s.switch_tab(EditorTab::Draw).unwrap();
        s.handle_input(InputEvent::PointerDown(pos2(10.0, 10.0))).unwrap();
        assert!(s.current_stroke().is_some());
        s.handle_input(InputEvent::PointerLeave).unwrap();
        assert!(s.current_stroke().is_none());
        s.handle_input(InputEvent::PointerMove(pos2(30.0, 30.0))).unwrap();
        assert_eq!(s.drawables().len(), 2);
    }
}
