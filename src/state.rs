use serde::{Deserialize, Serialize};

/// Editor tabs. Switching tabs drives the session's mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTab {
    #[default]
    Enhance,
    Crop,
    Text,
    Draw,
    Sticker,
}

impl EditorTab {
    pub const ALL: [EditorTab; 5] = [
        EditorTab::Enhance,
        EditorTab::Crop,
        EditorTab::Text,
        EditorTab::Draw,
        EditorTab::Sticker,
    ];

    pub fn title(self) -> &'static str {
        match self {
            EditorTab::Enhance => "Enhance",
            EditorTab::Crop => "Crop",
            EditorTab::Text => "Text",
            EditorTab::Draw => "Draw",
            EditorTab::Sticker => "Sticker",
        }
    }

    /// Tabs whose content is text boxes or stickers.
    pub fn has_resizables(self) -> bool {
        matches!(self, EditorTab::Text | EditorTab::Sticker)
    }
}

/// Draw-tab tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Arrow,
    Brush,
    Neon,
    Blur,
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 6] = [Tool::Pen, Tool::Arrow, Tool::Brush, Tool::Neon, Tool::Blur, Tool::Eraser];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Pen => "Pen",
            Tool::Arrow => "Arrow",
            Tool::Brush => "Brush",
            Tool::Neon => "Neon",
            Tool::Blur => "Blur",
            Tool::Eraser => "Eraser",
        }
    }

    /// Tools that paint with a color of their own.
    pub fn is_drawing_tool(self) -> bool {
        matches!(self, Tool::Pen | Tool::Arrow | Tool::Brush | Tool::Neon)
    }
}

/// Interaction state gating pointer dispatch. Indices point into the
/// session's drawable list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Drawing {
        current: Option<usize>,
    },
    Dragging {
        target: usize,
    },
    Cropping {
        crop: Option<usize>,
    },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Drawing { .. } => "drawing",
            Mode::Dragging { .. } => "dragging",
            Mode::Cropping { .. } => "cropping",
        }
    }

    pub fn is_cropping(&self) -> bool {
        matches!(self, Mode::Cropping { .. })
    }

    pub fn crop_index(&self) -> Option<usize> {
        match self {
            Mode::Cropping { crop } => *crop,
            _ => None,
        }
    }
}

/// Debounced geometric operations of the crop tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropAction {
    Rotate90,
    Flip,
    /// Absolute free rotation in degrees.
    Rotate(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_color_tools_are_drawing_tools() {
        let drawing: Vec<Tool> = Tool::ALL.into_iter().filter(|t| t.is_drawing_tool()).collect();
        assert_eq!(drawing, vec![Tool::Pen, Tool::Arrow, Tool::Brush, Tool::Neon]);
    }

    #[test]
    fn tabs_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&EditorTab::Sticker).unwrap(), "\"sticker\"");
        assert_eq!(serde_json::from_str::<Tool>("\"neon\"").unwrap(), Tool::Neon);
    }

    #[test]
    fn crop_index_only_in_cropping() {
        assert_eq!(Mode::Cropping { crop: Some(3) }.crop_index(), Some(3));
        assert_eq!(Mode::Drawing { current: Some(3) }.crop_index(), None);
    }
}
