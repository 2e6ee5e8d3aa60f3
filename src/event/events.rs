use egui::{Color32, CursorIcon};

use crate::drawable::AspectRatio;
use crate::state::{EditorTab, Tool};

/// Observable changes of an editing session, delivered synchronously.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    TabChanged {
        old: EditorTab,
        new: EditorTab,
    },
    ToolChanged {
        old: Tool,
        new: Tool,
    },
    /// The color of `tool` changed. Blur and eraser report the tool whose
    /// color they borrow.
    ColorChanged {
        tool: Tool,
        color: Color32,
    },
    DrawSizeChanged(f32),
    HistoryChanged {
        can_undo: bool,
        can_redo: bool,
    },
    CursorChanged(CursorIcon),
    CropVisibilityChanged(bool),
    AspectRatioChanged(AspectRatio),
    /// Free rotation was baked in by rotate90 or flip; the angle picker
    /// should return to zero.
    RotationReset,
    EffectsApplied,
    CropApplied {
        width: u32,
        height: u32,
    },
    DrawableRemoved {
        id: usize,
    },
}
