//! Finalizing a session into a single PNG file.

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

use crate::error::Result;
use super::Session;

/// An encoded, flattened canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportedImage {
    pub fn encode_png(file_name: impl Into<String>, image: &RgbaImage) -> Result<Self> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(Self {
            file_name: file_name.into(),
            bytes,
        })
    }

    /// Writes the file into `dir` under its own name.
    pub fn save_in(&self, dir: impl AsRef<Path>) -> Result<std::path::PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

impl Session {
    /// Drops the crop overlay and any selection, repaints, and encodes the
    /// canvas as PNG.
    pub fn to_png(&mut self) -> Result<ExportedImage> {
        self.drawables.retain(|d| !d.is_crop_area());
        if self.mode.is_cropping() {
            self.update_mode(crate::state::Mode::Cropping { crop: None });
        }
        self.deselect_all();
        self.draw();

        let exported = ExportedImage::encode_png(self.config.export_file_name.clone(), &self.canvas_image())?;
        log::info!(
            "Session {}: exported {} ({} bytes)",
            self.id,
            exported.file_name,
            exported.bytes.len()
        );
        Ok(exported)
    }
}
