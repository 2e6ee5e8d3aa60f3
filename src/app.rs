use egui::{ColorImage, TextureHandle, TextureId, TextureOptions, Vec2};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::file_handler::{self, PhotoLoader};
use crate::image_source::{ImageSource, STICKER_TARGET_SIZE};
use crate::input::InputEvent;
use crate::panels;
use crate::session::Session;
use crate::state::EditorTab;

/// The uploaded canvas and the session revision it shows.
struct CanvasTexture {
    handle: TextureHandle,
    session: Uuid,
    revision: u64,
}

/// We derive Deserialize/Serialize so the editor defaults survive restarts.
#[derive(serde::Deserialize, serde::Serialize, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PhotoEditorApp {
    config: EditorConfig,
    #[serde(skip)]
    session: Option<Session>,
    #[serde(skip)]
    loader: PhotoLoader,
    #[serde(skip)]
    canvas: Option<CanvasTexture>,
    #[serde(skip)]
    container: Vec2,
    #[serde(skip)]
    status: Option<String>,
}

impl PhotoEditorApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        if let Some(storage) = cc.storage {
            return eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default();
        }
        Self::default()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub(crate) fn set_container(&mut self, container: Vec2) {
        self.container = container;
    }

    /// Logs and surfaces a failed operation.
    pub(crate) fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("{err}");
                self.status = Some(err.to_string());
                None
            }
        }
    }

    pub(crate) fn handle_input(&mut self, event: InputEvent) {
        if let Some(session) = &mut self.session {
            let result = session.handle_input(event);
            self.report(result);
        }
    }

    fn poll_loader(&mut self) {
        match self.loader.poll() {
            Some(Ok(session)) => {
                log::info!("Opened photo in session {}", session.id());
                self.session = Some(session);
                self.canvas = None;
                self.status = None;
            }
            Some(Err(EditorError::LoadCancelled)) => log::debug!("Photo load cancelled"),
            Some(Err(err)) => {
                self.report::<()>(Err(err));
            }
            None => {}
        }
    }

    /// In the sticker tab dropped images become stickers; anywhere else
    /// they replace the photo.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        for file in file_handler::take_dropped_images(ctx) {
            match &mut self.session {
                Some(session) if session.tab() == EditorTab::Sticker => {
                    let result = file_handler::read_dropped(&file)
                        .and_then(|image| ImageSource::decode(&image.bytes))
                        .and_then(|source| session.add_sticker(source, STICKER_TARGET_SIZE));
                    self.report(result);
                }
                _ => self
                    .loader
                    .start(ctx, file, self.container, self.config.clone()),
            }
        }
    }

    /// Encodes the canvas and writes it next to the working directory.
    pub(crate) fn export(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        let result = session.to_png();
        let Some(exported) = self.report(result) else {
            return;
        };
        #[cfg(not(target_arch = "wasm32"))]
        {
            let saved = exported.save_in(".");
            if let Some(path) = self.report(saved) {
                self.status = Some(format!("Saved {}", path.display()));
            }
        }
        #[cfg(target_arch = "wasm32")]
        {
            self.status = Some(format!("Exported {} ({} bytes)", exported.file_name, exported.bytes.len()));
        }
    }

    /// Uploads the canvas when its pixels changed since the last frame.
    pub(crate) fn canvas_texture(&mut self, ctx: &egui::Context) -> Option<(TextureId, Vec2)> {
        let session = self.session.as_ref()?;
        let (width, height) = session.canvas_size();
        let stale = self
            .canvas
            .as_ref()
            .is_none_or(|canvas| canvas.session != session.id() || canvas.revision != session.revision());
        if stale {
            let image = session.canvas_image();
            let pixels = ColorImage::from_rgba_unmultiplied([width as usize, height as usize], image.as_raw());
            match &mut self.canvas {
                Some(canvas) => {
                    canvas.handle.set(pixels, TextureOptions::LINEAR);
                    canvas.session = session.id();
                    canvas.revision = session.revision();
                }
                None => {
                    self.canvas = Some(CanvasTexture {
                        handle: ctx.load_texture("canvas", pixels, TextureOptions::LINEAR),
                        session: session.id(),
                        revision: session.revision(),
                    });
                }
            }
        }
        let canvas = self.canvas.as_ref()?;
        Some((canvas.handle.id(), egui::vec2(width as f32, height as f32)))
    }
}

impl eframe::App for PhotoEditorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_loader();
        self.handle_dropped_files(ctx);

        if let Some(session) = &mut self.session {
            let ticked = session.tick();
            self.report(ticked);
        }

        panels::tools_panel(self, ctx);
        panels::central_panel(self, ctx);

        let busy = self.loader.is_loading() || self.session.as_ref().is_some_and(Session::has_pending_work);
        if busy {
            ctx.request_repaint();
        }
    }
}
