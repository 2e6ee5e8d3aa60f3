#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod color;
pub mod config;
pub mod drawable;
pub mod effects;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod fonts;
pub mod geometry;
pub mod history;
pub mod id_generator;
pub mod image_source;
pub mod input;
pub mod panels;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod surface;
pub mod tools;
pub mod util;

pub use app::PhotoEditorApp;
pub use config::EditorConfig;
pub use drawable::{AspectRatio, Drawable, DrawableType};
pub use effects::{EffectKey, Effects};
pub use error::{EditorError, Result};
pub use event::{EventBus, EventHandler, SessionEvent};
pub use history::{History, Snapshot};
pub use image_source::ImageSource;
pub use input::{InputEvent, KeyPress};
pub use scheduler::{Clock, ManualClock, SystemClock};
pub use session::{Diagnostics, ExportedImage, Session, TextSettings};
pub use state::{CropAction, EditorTab, Mode, Tool};
