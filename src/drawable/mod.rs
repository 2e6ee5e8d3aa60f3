//! Everything that can be painted on the editing surface.

mod arrow;
mod bg_image;
mod brush;
mod common;
mod crop_area;
mod eraser;
mod neon;
mod rectangle;
mod simple_pen;
mod smoothed_pen;
mod sticker;
mod text;
mod transform_box;

use egui::{Color32, CursorIcon, Pos2};

use crate::input::{KeyPress, PointerSample};
use crate::surface::Surface;

pub use arrow::Arrow;
pub use bg_image::BgImage;
pub use brush::Brush;
pub use common::{Corner, HANDLE_RADIUS};
pub use crop_area::{AspectRatio, CropArea, MIN_CROP_SIZE, calculate_crop};
pub use eraser::{Eraser, EraserMode};
pub use neon::Neon;
pub use rectangle::Rectangle;
pub use simple_pen::SimplePen;
pub use smoothed_pen::{PenMode, PointWithWidth, SmoothedPen};
pub use sticker::Sticker;
pub use text::{MAX_FONT_SIZE, MIN_FONT_SIZE, TextAlign, TextBox, TextOptions, TextStyle};
pub use transform_box::{Handle, ROTATION_HANDLE_OFFSET, TransformBox};

/// Color and size a stroke tool is created with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawingOptions {
    pub color: Color32,
    pub size: f32,
}

/// Common capabilities of all drawables.
///
/// `draw` must only read the drawable's own state. Pointer handlers default to
/// doing nothing so passive content (the background image) ignores input.
pub trait Drawable {
    /// Unique id, shared with clones.
    fn id(&self) -> usize;

    fn kind(&self) -> &'static str;

    fn draw(&self, surface: &mut Surface);

    fn on_mouse_down(&mut self, _pos: Pos2) {}

    fn on_mouse_move(&mut self, _sample: PointerSample) {}

    fn on_mouse_up(&mut self) {}

    fn contains_point(&self, _pos: Pos2) -> bool {
        false
    }

    /// Cursor to show while hovering `pos`, for drawables that care.
    fn cursor_at(&self, _pos: Pos2) -> Option<CursorIcon> {
        None
    }
}

/// What a resizable did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Handled,
    /// The drawable asks to be taken off the canvas.
    Remove,
}

/// Text boxes and stickers: selectable, draggable, resizable, rotatable.
pub trait Resizable: Drawable {
    fn is_selected(&self) -> bool;

    fn set_selected(&mut self, selected: bool);

    fn on_key_press(&mut self, key: &KeyPress) -> KeyOutcome;
}

#[derive(Debug, Clone)]
pub enum DrawableType {
    SmoothedPen(SmoothedPen),
    SimplePen(SimplePen),
    Brush(Brush),
    Neon(Neon),
    Arrow(Arrow),
    Rectangle(Rectangle),
    Eraser(Eraser),
    Text(TextBox),
    Sticker(Sticker),
    BgImage(BgImage),
    CropArea(CropArea),
}

impl DrawableType {
    pub fn as_drawable(&self) -> &dyn Drawable {
        match self {
            DrawableType::SmoothedPen(d) => d,
            DrawableType::SimplePen(d) => d,
            DrawableType::Brush(d) => d,
            DrawableType::Neon(d) => d,
            DrawableType::Arrow(d) => d,
            DrawableType::Rectangle(d) => d,
            DrawableType::Eraser(d) => d,
            DrawableType::Text(d) => d,
            DrawableType::Sticker(d) => d,
            DrawableType::BgImage(d) => d,
            DrawableType::CropArea(d) => d,
        }
    }

    pub fn as_drawable_mut(&mut self) -> &mut dyn Drawable {
        match self {
            DrawableType::SmoothedPen(d) => d,
            DrawableType::SimplePen(d) => d,
            DrawableType::Brush(d) => d,
            DrawableType::Neon(d) => d,
            DrawableType::Arrow(d) => d,
            DrawableType::Rectangle(d) => d,
            DrawableType::Eraser(d) => d,
            DrawableType::Text(d) => d,
            DrawableType::Sticker(d) => d,
            DrawableType::BgImage(d) => d,
            DrawableType::CropArea(d) => d,
        }
    }

    /// Strokes are flattened into the photo before cropping.
    pub fn is_stroke(&self) -> bool {
        matches!(
            self,
            DrawableType::SmoothedPen(_)
                | DrawableType::SimplePen(_)
                | DrawableType::Brush(_)
                | DrawableType::Neon(_)
                | DrawableType::Arrow(_)
                | DrawableType::Rectangle(_)
                | DrawableType::Eraser(_)
        )
    }

    pub fn is_crop_area(&self) -> bool {
        matches!(self, DrawableType::CropArea(_))
    }

    pub fn as_bg_image(&self) -> Option<&BgImage> {
        match self {
            DrawableType::BgImage(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_bg_image_mut(&mut self) -> Option<&mut BgImage> {
        match self {
            DrawableType::BgImage(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_crop_area(&self) -> Option<&CropArea> {
        match self {
            DrawableType::CropArea(crop) => Some(crop),
            _ => None,
        }
    }

    pub fn as_crop_area_mut(&mut self) -> Option<&mut CropArea> {
        match self {
            DrawableType::CropArea(crop) => Some(crop),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextBox> {
        match self {
            DrawableType::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextBox> {
        match self {
            DrawableType::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_resizable(&self) -> Option<&dyn Resizable> {
        match self {
            DrawableType::Text(text) => Some(text),
            DrawableType::Sticker(sticker) => Some(sticker),
            _ => None,
        }
    }

    pub fn as_resizable_mut(&mut self) -> Option<&mut dyn Resizable> {
        match self {
            DrawableType::Text(text) => Some(text),
            DrawableType::Sticker(sticker) => Some(sticker),
            _ => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.as_resizable().is_some_and(|r| r.is_selected())
    }
}

impl Drawable for DrawableType {
    fn id(&self) -> usize {
        self.as_drawable().id()
    }

    fn kind(&self) -> &'static str {
        self.as_drawable().kind()
    }

    fn draw(&self, surface: &mut Surface) {
        self.as_drawable().draw(surface)
    }

    fn on_mouse_down(&mut self, pos: Pos2) {
        self.as_drawable_mut().on_mouse_down(pos)
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        self.as_drawable_mut().on_mouse_move(sample)
    }

    fn on_mouse_up(&mut self) {
        self.as_drawable_mut().on_mouse_up()
    }

    fn contains_point(&self, pos: Pos2) -> bool {
        self.as_drawable().contains_point(pos)
    }

    fn cursor_at(&self, pos: Pos2) -> Option<CursorIcon> {
        self.as_drawable().cursor_at(pos)
    }
}

impl From<BgImage> for DrawableType {
    fn from(image: BgImage) -> Self {
        DrawableType::BgImage(image)
    }
}

impl From<TextBox> for DrawableType {
    fn from(text: TextBox) -> Self {
        DrawableType::Text(text)
    }
}

impl From<Sticker> for DrawableType {
    fn from(sticker: Sticker) -> Self {
        DrawableType::Sticker(sticker)
    }
}

impl From<CropArea> for DrawableType {
    fn from(crop: CropArea) -> Self {
        DrawableType::CropArea(crop)
    }
}
