//! Dropped files and the background photo loader.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::FutureExt;
use futures::channel::oneshot;
use parking_lot::Mutex;

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::session::Session;

/// Bytes of a dropped image file.
#[derive(Debug, Clone)]
pub struct DroppedImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Decides by MIME type, falling back to the file extension.
pub fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let Some(ext) = file.path.as_ref().and_then(|path| path.extension()) else {
        return false;
    };
    let ext = ext.to_string_lossy().to_lowercase();
    matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp")
}

/// Takes this frame's dropped image files.
pub fn take_dropped_images(ctx: &egui::Context) -> Vec<egui::DroppedFile> {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    dropped
        .into_iter()
        .filter(|file| {
            let keep = is_image_file(file);
            if !keep {
                log::warn!("Dropped file is not a supported type: {}", display_name(file));
            }
            keep
        })
        .collect()
}

/// Reads the bytes of a dropped file, from memory on the web or from disk
/// natively.
pub fn read_dropped(file: &egui::DroppedFile) -> Result<DroppedImage> {
    let name = display_name(file);
    if let Some(bytes) = &file.bytes {
        return Ok(DroppedImage {
            name,
            bytes: bytes.to_vec(),
        });
    }
    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = &file.path {
        let bytes = std::fs::read(path)?;
        return Ok(DroppedImage { name, bytes });
    }
    Err(EditorError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("dropped file has no accessible data: {name}"),
    )))
}

type PendingSession = Pin<Box<dyn Future<Output = Result<Session>> + Send>>;

/// One photo load at a time. Reading and decoding happens off the UI thread;
/// starting a new load cancels the previous one.
#[derive(Default)]
pub struct PhotoLoader {
    sender: Option<Arc<Mutex<Option<oneshot::Sender<Result<Vec<u8>>>>>>>,
    pending: Option<PendingSession>,
}

impl std::fmt::Debug for PhotoLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoLoader")
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

impl PhotoLoader {
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts loading `file`, fitted into `container` once decoded.
    pub fn start(&mut self, ctx: &egui::Context, file: egui::DroppedFile, container: egui::Vec2, config: EditorConfig) {
        self.cancel();

        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Some(tx)));
        self.sender = Some(slot.clone());

        let bytes = rx.map(|received| received.unwrap_or(Err(EditorError::LoadCancelled)));
        self.pending = Some(Box::pin(Session::open(bytes, Some(container), config)));

        let ctx = ctx.clone();
        let deliver = move || {
            let read = read_dropped(&file).map(|image| image.bytes);
            match slot.lock().take() {
                Some(tx) => {
                    // The receiver is gone only if the app shut down meanwhile
                    let _ = tx.send(read);
                    ctx.request_repaint();
                }
                None => log::debug!("Discarding superseded load of {}", display_name(&file)),
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(deliver);
        #[cfg(target_arch = "wasm32")]
        deliver();
    }

    /// Drops the in-flight load, if any.
    pub fn cancel(&mut self) {
        if let Some(slot) = self.sender.take() {
            slot.lock().take();
        }
        self.pending = None;
    }

    /// Polls the load without blocking. `Some` once it has finished.
    pub fn poll(&mut self) -> Option<Result<Session>> {
        let result = self.pending.as_mut()?.now_or_never()?;
        self.pending = None;
        self.sender = None;
        Some(result)
    }
}
