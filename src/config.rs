use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::color::hex_to_color32;
use crate::drawable::{TextAlign, TextStyle};
use crate::error::Result;
use crate::fonts;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::scheduler::DEFAULT_DEBOUNCE_MS;
use crate::state::Tool;

/// Startup defaults of an editing session. Colors are `#RRGGBB` strings so
/// the config stays readable when stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old config
pub struct EditorConfig {
    pub draw_size: f32,
    pub pen_color: String,
    pub arrow_color: String,
    pub brush_color: String,
    pub neon_color: String,
    pub text_color: String,
    pub text_font: String,
    pub text_align: TextAlign,
    pub text_style: TextStyle,
    pub text_size: f32,
    pub undo_limit: usize,
    pub crop_debounce_ms: f64,
    pub export_file_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            draw_size: 15.0,
            pen_color: "#33C759".to_owned(),
            arrow_color: "#FFD60A".to_owned(),
            brush_color: "#FF8901".to_owned(),
            neon_color: "#62E5E0".to_owned(),
            text_color: "#FFFFFF".to_owned(),
            text_font: fonts::DEFAULT_FAMILY.to_owned(),
            text_align: TextAlign::Left,
            text_style: TextStyle::Background,
            text_size: 24.0,
            undo_limit: DEFAULT_HISTORY_LIMIT,
            crop_debounce_ms: DEFAULT_DEBOUNCE_MS,
            export_file_name: "canvas_image.png".to_owned(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Default color of a drawing tool. Blur and eraser have none.
    pub fn tool_color(&self, tool: Tool) -> Result<Option<Color32>> {
        let hex = match tool {
            Tool::Pen => &self.pen_color,
            Tool::Arrow => &self.arrow_color,
            Tool::Brush => &self.brush_color,
            Tool::Neon => &self.neon_color,
            Tool::Blur | Tool::Eraser => return Ok(None),
        };
        hex_to_color32(hex).map(Some)
    }

    pub fn text_color(&self) -> Result<Color32> {
        hex_to_color32(&self.text_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditorError;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = EditorConfig::from_json_str(r#"{ "draw_size": 30.0 }"#).unwrap();
        assert_eq!(config.draw_size, 30.0);
        assert_eq!(config.undo_limit, 15);
        assert_eq!(config.export_file_name, "canvas_image.png");
    }

    #[test]
    fn default_tool_colors() {
        let config = EditorConfig::default();
        assert_eq!(config.tool_color(Tool::Pen).unwrap(), Some(Color32::from_rgb(0x33, 0xC7, 0x59)));
        assert_eq!(config.tool_color(Tool::Blur).unwrap(), None);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(EditorConfig::from_json_str("{"), Err(EditorError::Config(_))));
    }

    #[test]
    fn round_trips_through_json() {
        let mut config = EditorConfig::default();
        config.text_style = TextStyle::Outline;
        let json = config.to_json_string().unwrap();
        assert_eq!(EditorConfig::from_json_str(&json).unwrap(), config);
    }
}
