//! Turning the selected draw-tab tool into a fresh drawable.

use tiny_skia::Pixmap;

use crate::drawable::{Brush, DrawableType, DrawingOptions, Eraser, EraserMode, Neon, PenMode, SmoothedPen};
use crate::error::Result;
use crate::state::Tool;

/// Pixels the blur and eraser tools may capture.
#[derive(Debug, Clone, Copy)]
pub struct PixelSources<'a> {
    /// Everything currently on the canvas.
    pub canvas: &'a Pixmap,
    /// Processed pixels of the topmost background image, if there is one.
    pub background: Option<&'a Pixmap>,
}

/// Builds the drawable for `tool`.
///
/// Blur captures the whole canvas while the eraser only restores the last
/// background image. Without a background image the eraser degrades to a
/// plain pen line.
pub fn instantiate(tool: Tool, options: DrawingOptions, sources: PixelSources<'_>) -> Result<DrawableType> {
    let drawable = match tool {
        Tool::Pen => DrawableType::SmoothedPen(SmoothedPen::new(options, PenMode::Line)),
        Tool::Arrow => DrawableType::SmoothedPen(SmoothedPen::new(options, PenMode::Arrow)),
        Tool::Brush => DrawableType::Brush(Brush::new(options)),
        Tool::Neon => DrawableType::Neon(Neon::new(options)),
        Tool::Blur => DrawableType::Eraser(Eraser::new(EraserMode::Blur, options.size, sources.canvas.clone())?),
        Tool::Eraser => match sources.background {
            Some(background) => {
                DrawableType::Eraser(Eraser::new(EraserMode::Eraser, options.size, background.clone())?)
            }
            None => {
                log::warn!("No background image to erase to, falling back to the pen");
                DrawableType::SmoothedPen(SmoothedPen::new(options, PenMode::Line))
            }
        },
    };
    log::debug!("Created {} for {tool:?}", drawable.as_drawable().kind());
    Ok(drawable)
}
