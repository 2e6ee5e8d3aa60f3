use ab_glyph::FontArc;
use egui::{Color32, CursorIcon, Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};
use tiny_skia::{FilterQuality, Pixmap, Transform};

use super::common::rotation_about;
use super::transform_box::TransformBox;
use super::{Drawable, KeyOutcome, Resizable};
use crate::fonts::{self, Coverage, FontBook};
use crate::geometry::clamp;
use crate::id_generator::generate_id;
use crate::input::{KeyCode, KeyPress, PointerSample};
use crate::surface::{self, Surface};

const OUTER_PADDING: f32 = 10.0;
const BORDER_RADIUS: f32 = 10.0;
const OUTLINE_WIDTH: f32 = 6.0;
const CARET: &str = "|";
const MIN_BOX_SIZE: f32 = 10.0;
pub const MIN_FONT_SIZE: f32 = 10.0;
pub const MAX_FONT_SIZE: f32 = 120.0;

const DARK_FILL: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    fn factor(self) -> f32 {
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Center => 0.5,
            TextAlign::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    Plain,
    Outline,
    #[default]
    Background,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextOptions {
    pub font_size: f32,
    pub font_family: String,
    pub color: Color32,
    pub align: TextAlign,
    pub style: TextStyle,
}

#[derive(Debug, Clone, PartialEq)]
struct Line {
    text: String,
    /// Measured text plus inner padding on both sides.
    width: f32,
}

/// Editable multi-line caption.
#[derive(Clone)]
pub struct TextBox {
    id: usize,
    bbox: TransformBox,
    lines: Vec<Line>,
    current_line: usize,
    font_size: f32,
    font_family: String,
    font: FontArc,
    caret_font: FontArc,
    color: Color32,
    align: TextAlign,
    style: TextStyle,
    inner_padding: f32,
    line_height: f32,
}

impl std::fmt::Debug for TextBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBox")
            .field("id", &self.id)
            .field("rect", &self.bbox.rect)
            .field("lines", &self.lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>())
            .field("font_size", &self.font_size)
            .field("font_family", &self.font_family)
            .field("style", &self.style)
            .finish()
    }
}

impl TextBox {
    pub fn new(at: Pos2, initial_text: &str, options: TextOptions, fonts: &FontBook) -> Self {
        let mut text = Self {
            id: generate_id(),
            bbox: TransformBox::new(Rect::from_min_size(at, Vec2::ZERO), OUTER_PADDING),
            lines: vec![Line {
                text: initial_text.to_owned(),
                width: 0.0,
            }],
            current_line: 0,
            font_size: options.font_size,
            font: fonts.resolve(&options.font_family),
            caret_font: fonts.resolve(fonts::CARET_FAMILY),
            font_family: options.font_family,
            color: options.color,
            align: options.align,
            style: options.style,
            inner_padding: 0.0,
            line_height: 0.0,
        };
        text.update_paddings();
        text.calculate_dimensions();
        text
    }

    pub fn lines(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    pub fn rect(&self) -> Rect {
        self.bbox.rect
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn align(&self) -> TextAlign {
        self.align
    }

    pub fn style(&self) -> TextStyle {
        self.style
    }

    pub fn angle(&self) -> f32 {
        self.bbox.angle
    }

    fn update_paddings(&mut self) {
        self.inner_padding = (8.0 * self.font_size / 24.0).round();
        self.line_height = self.font_size + self.inner_padding;
    }

    fn calculate_dimensions(&mut self) {
        let mut max_width: f32 = 0.0;
        for line in &mut self.lines {
            line.width = fonts::measure_line(&self.font, self.font_size, &line.text) + self.inner_padding * 2.0;
            max_width = max_width.max(line.width);
        }
        let caret_width = fonts::measure_line(&self.caret_font, self.font_size, CARET);
        max_width = max_width.max(caret_width + self.inner_padding * 2.0);
        let height = self.line_height * self.lines.len() as f32 + self.inner_padding;
        self.bbox.rect = Rect::from_min_size(self.bbox.rect.min, vec2(max_width, height));
    }

    pub fn update_font_size(&mut self, size: f32) {
        self.font_size = clamp(MIN_FONT_SIZE, MAX_FONT_SIZE, size);
        self.update_paddings();
        self.calculate_dimensions();
    }

    pub fn update_font_family(&mut self, family: &str, fonts: &FontBook) {
        self.font_family = family.to_owned();
        self.font = fonts.resolve(family);
        self.calculate_dimensions();
    }

    pub fn update_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn update_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    pub fn update_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    fn fill_color(&self) -> Color32 {
        match self.style {
            TextStyle::Plain => self.color,
            TextStyle::Outline | TextStyle::Background if self.color == Color32::WHITE => DARK_FILL,
            TextStyle::Outline | TextStyle::Background => Color32::WHITE,
        }
    }

    /// Renders the content into a layer whose origin is `rect.min - margin`.
    fn render_layer(&self, margin: f32) -> Option<Pixmap> {
        let size = self.bbox.rect.size() + Vec2::splat(margin * 2.0);
        let (w, h) = (size.x.ceil() as u32, size.y.ceil() as u32);
        let mut layer = Pixmap::new(w, h)?;
        let max_width = self.bbox.rect.width();
        let fill = self.fill_color();

        for (index, line) in self.lines.iter().enumerate() {
            let rect_x = margin + (max_width - line.width) * self.align.factor();
            let top = margin + index as f32 * self.line_height;
            let text_x = rect_x + self.inner_padding;
            let baseline = top + self.font_size;

            if self.style == TextStyle::Background {
                let pill = Rect::from_min_size(pos2(rect_x, top), vec2(line.width, self.line_height));
                if let Some(path) = surface::rounded_rect_path(pill, BORDER_RADIUS) {
                    layer.fill_path(
                        &path,
                        &surface::solid_paint(self.color),
                        tiny_skia::FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }

            let mut glyphs = Coverage::new(w, h);
            glyphs.add_line(&self.font, self.font_size, &line.text, text_x, baseline);
            if self.style == TextStyle::Outline {
                glyphs.dilated(OUTLINE_WIDTH / 2.0).paint(&mut layer, self.color);
            }
            glyphs.paint(&mut layer, fill);

            if self.bbox.selected && index == self.current_line {
                let caret_x = text_x + fonts::measure_line(&self.font, self.font_size, &line.text);
                let mut caret = Coverage::new(w, h);
                caret.add_line(&self.caret_font, self.font_size, CARET, caret_x, baseline);
                caret.dilated(1.0).paint(&mut layer, Color32::WHITE);
                caret.paint(&mut layer, DARK_FILL);
            }
        }
        Some(layer)
    }
}

impl Drawable for TextBox {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        "text"
    }

    fn draw(&self, surface: &mut Surface) {
        let margin = OUTLINE_WIDTH;
        if let Some(layer) = self.render_layer(margin) {
            let origin = self.bbox.rect.min - Vec2::splat(margin);
            let transform = rotation_about(self.bbox.center(), self.bbox.angle).pre_translate(origin.x, origin.y);
            surface.draw_pixmap(&layer, transform, FilterQuality::Bilinear);
        }
        if self.bbox.selected {
            self.bbox.draw_selection(surface);
        }
    }

    fn on_mouse_down(&mut self, pos: Pos2) {
        self.bbox.on_mouse_down(pos);
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        let aspect = self.bbox.rect.width() / self.bbox.rect.height();
        if let Some(scale) = self.bbox.on_mouse_move(sample.pos, aspect, MIN_BOX_SIZE) {
            self.font_size = clamp(MIN_FONT_SIZE, MAX_FONT_SIZE, self.font_size * scale);
            self.update_paddings();
            self.calculate_dimensions();
        }
    }

    fn on_mouse_up(&mut self) {
        self.bbox.on_mouse_up();
    }

    fn contains_point(&self, pos: Pos2) -> bool {
        self.bbox.contains_point(pos)
    }

    fn cursor_at(&self, pos: Pos2) -> Option<CursorIcon> {
        Some(self.bbox.cursor_at(pos, CursorIcon::Move))
    }
}

impl Resizable for TextBox {
    fn is_selected(&self) -> bool {
        self.bbox.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.bbox.selected = selected;
    }

    fn on_key_press(&mut self, key: &KeyPress) -> KeyOutcome {
        let outcome = match &key.key {
            KeyCode::Named(egui::Key::Escape) => {
                self.bbox.selected = false;
                KeyOutcome::Handled
            }
            KeyCode::Named(egui::Key::Enter) => {
                if self.lines[self.current_line].text.is_empty() {
                    return KeyOutcome::Ignored;
                }
                self.lines.insert(
                    self.current_line + 1,
                    Line {
                        text: String::new(),
                        width: 0.0,
                    },
                );
                self.current_line += 1;
                KeyOutcome::Handled
            }
            KeyCode::Named(egui::Key::Backspace) => {
                if key.command() {
                    return KeyOutcome::Remove;
                }
                let line = &mut self.lines[self.current_line].text;
                if line.pop().is_some() {
                    KeyOutcome::Handled
                } else if self.current_line > 0 {
                    self.lines.remove(self.current_line);
                    self.current_line -= 1;
                    KeyOutcome::Handled
                } else {
                    return KeyOutcome::Remove;
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                self.lines[self.current_line].text.push(*c);
                KeyOutcome::Handled
            }
            _ => KeyOutcome::Ignored,
        };
        self.calculate_dimensions();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Key;

    fn text_box(initial: &str) -> TextBox {
        let fonts = FontBook::new().unwrap();
        let options = TextOptions {
            font_size: 24.0,
            font_family: fonts::DEFAULT_FAMILY.to_owned(),
            color: Color32::WHITE,
            align: TextAlign::Left,
            style: TextStyle::Background,
        };
        TextBox::new(pos2(20.0, 20.0), initial, options, &fonts)
    }

    fn type_str(text: &mut TextBox, s: &str) {
        for c in s.chars() {
            text.on_key_press(&KeyPress::char(c));
        }
    }

    #[test]
    fn paddings_follow_font_size() {
        let text = text_box("");
        assert_eq!(text.inner_padding, 8.0);
        assert_eq!(text.line_height, 32.0);
        assert_eq!(text.rect().height(), 40.0);
    }

    #[test]
    fn typing_grows_the_box() {
        let mut text = text_box("");
        let before = text.rect().width();
        type_str(&mut text, "Hello");
        assert_eq!(text.lines(), vec!["Hello"]);
        assert!(text.rect().width() > before);
    }

    #[test]
    fn enter_on_empty_line_is_ignored() {
        let mut text = text_box("");
        assert_eq!(text.on_key_press(&KeyPress::named(Key::Enter)), KeyOutcome::Ignored);
        type_str(&mut text, "a");
        text.on_key_press(&KeyPress::named(Key::Enter));
        text.on_key_press(&KeyPress::named(Key::Enter));
        assert_eq!(text.lines(), vec!["a", ""]);
        assert_eq!(text.current_line(), 1);
    }

    #[test]
    fn backspace_merges_then_removes() {
        let mut text = text_box("");
        type_str(&mut text, "ab");
        text.on_key_press(&KeyPress::named(Key::Enter));
        let backspace = KeyPress::named(Key::Backspace);
        assert_eq!(text.on_key_press(&backspace), KeyOutcome::Handled);
        assert_eq!(text.lines(), vec!["ab"]);
        text.on_key_press(&backspace);
        text.on_key_press(&backspace);
        assert_eq!(text.lines(), vec![""]);
        assert_eq!(text.on_key_press(&backspace), KeyOutcome::Remove);
    }

    #[test]
    fn command_backspace_removes_immediately() {
        let mut text = text_box("keep");
        let key = KeyPress::named(Key::Backspace).with_modifiers(egui::Modifiers::COMMAND);
        assert_eq!(text.on_key_press(&key), KeyOutcome::Remove);
    }

    #[test]
    fn escape_deselects() {
        let mut text = text_box("x");
        text.set_selected(true);
        text.on_key_press(&KeyPress::named(Key::Escape));
        assert!(!text.is_selected());
    }

    #[test]
    fn fill_color_contrasts_with_white() {
        let mut text = text_box("x");
        assert_eq!(text.fill_color(), DARK_FILL);
        text.update_color(Color32::RED);
        assert_eq!(text.fill_color(), Color32::WHITE);
        text.update_style(TextStyle::Plain);
        assert_eq!(text.fill_color(), Color32::RED);
    }

    #[test]
    fn corner_resize_scales_font() {
        let mut text = text_box("Hello");
        text.set_selected(true);
        let corner = text.rect().right_bottom() + Vec2::splat(OUTER_PADDING);
        text.on_mouse_down(corner);
        text.on_mouse_move(PointerSample::new(corner + vec2(60.0, 20.0), 0.0));
        text.on_mouse_up();
        assert!(text.font_size() > 24.0 && text.font_size() <= MAX_FONT_SIZE);
    }

    #[test]
    fn draws_something() {
        let mut text = text_box("Hi");
        text.set_selected(true);
        let mut surface = Surface::new(200, 120).unwrap();
        text.draw(&mut surface);
        assert!(surface.to_rgba_image().pixels().any(|p| p.0[3] > 0));
    }
}
