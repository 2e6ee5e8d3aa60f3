//! The editing session: owns the drawables, the surface, the mode state
//! machine and history, and is the only thing the UI talks to.

mod crop;
mod export;
mod pointer;

pub use export::ExportedImage;

use std::collections::HashMap;
use std::future::Future;

use egui::{Color32, CursorIcon, Pos2, Rect, Vec2, pos2, vec2};
use rand::Rng;
use serde::Serialize;
use tiny_skia::Pixmap;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::drawable::{
    AspectRatio, BgImage, Drawable, DrawableType, DrawingOptions, Resizable, Sticker, TextAlign, TextBox,
    TextOptions, TextStyle,
};
use crate::effects::{EffectKey, Effects, TouchedEffects};
use crate::error::Result;
use crate::event::{EventBus, EventHandler, SessionEvent};
use crate::fonts::FontBook;
use crate::geometry::container_canvas_size;
use crate::history::{History, Snapshot};
use crate::image_source::ImageSource;
use crate::scheduler::{Clock, Debouncer, RedrawScheduler, SystemClock};
use crate::state::{CropAction, EditorTab, Mode, Tool};
use crate::surface::Surface;

/// Gap kept between a new sticker and the top-left canvas edges.
const STICKER_MARGIN: f32 = 6.0;

/// Text styling applied to new text boxes and to the selected one.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSettings {
    pub color: Color32,
    pub font: String,
    pub align: TextAlign,
    pub style: TextStyle,
    pub size: f32,
}

/// Read-only view of a session for debugging.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub session_id: Uuid,
    pub tab: EditorTab,
    pub tool: Tool,
    pub mode: &'static str,
    /// `(id, kind)` in paint order.
    pub drawables: Vec<(usize, &'static str)>,
    pub canvas: (u32, u32),
    pub undo_len: usize,
    pub redo_len: usize,
    pub touched_effects: Vec<EffectKey>,
    pub pending_redraw: bool,
    pub pending_crop_action: bool,
}

pub struct Session {
    id: Uuid,
    config: EditorConfig,
    fonts: FontBook,
    surface: Surface,
    drawables: Vec<DrawableType>,
    mode: Mode,
    tab: EditorTab,
    tool: Tool,
    last_drawing_tool: Option<Tool>,
    draw_size: f32,
    colors: HashMap<Tool, Color32>,
    text: TextSettings,
    crop_aspect_ratio: AspectRatio,
    free_angle: f32,
    effects_ui: Effects,
    effects_applied: Effects,
    touched_effects: TouchedEffects,
    history: History,
    redraw: RedrawScheduler,
    crop_actions: Debouncer<CropAction>,
    clock: Box<dyn Clock>,
    cursor: CursorIcon,
    revision: u64,
    events: EventBus,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("tab", &self.tab)
            .field("mode", &self.mode)
            .field("drawables", &self.drawables.len())
            .field("surface", &self.surface)
            .finish()
    }
}

fn snapshot_of(drawables: &[DrawableType], surface: &Surface, effects: &Effects) -> Snapshot {
    Snapshot {
        drawables: drawables.iter().filter(|d| !d.is_crop_area()).cloned().collect(),
        pixels: surface.pixmap().clone(),
        effects: effects.clone(),
    }
}

impl Session {
    /// A session whose canvas matches the source's own size.
    pub fn new(source: ImageSource, config: EditorConfig) -> Result<Self> {
        let size = source.size();
        Self::build(source, size, size, config)
    }

    /// A session fitted into a host container, the way the editor places the
    /// photo on screen.
    pub fn with_container(source: ImageSource, container: Vec2, config: EditorConfig) -> Result<Self> {
        let canvas = container_canvas_size(container, source.size()).round();
        Self::build(source, canvas, canvas, config)
    }

    /// Awaits a pending image load, then opens a session for it.
    pub async fn open<F>(pending: F, container: Option<Vec2>, config: EditorConfig) -> Result<Self>
    where
        F: Future<Output = Result<Vec<u8>>>,
    {
        let source = ImageSource::load(pending).await?;
        match container {
            Some(container) => Self::with_container(source, container, config),
            None => Self::new(source, config),
        }
    }

    fn build(source: ImageSource, canvas: Vec2, image: Vec2, config: EditorConfig) -> Result<Self> {
        let (width, height) = (canvas.x.max(1.0) as u32, canvas.y.max(1.0) as u32);
        let surface = Surface::new(width, height)?;
        let background = BgImage::new(
            source,
            image.x.max(1.0) as u32,
            image.y.max(1.0) as u32,
            Effects::default(),
            TouchedEffects::new(),
        )?;

        let mut colors = HashMap::new();
        for tool in Tool::ALL {
            if let Some(color) = config.tool_color(tool)? {
                colors.insert(tool, color);
            }
        }
        let text = TextSettings {
            color: config.text_color()?,
            font: config.text_font.clone(),
            align: config.text_align,
            style: config.text_style,
            size: config.text_size,
        };

        let id = Uuid::new_v4();
        log::info!("Session {id}: opened {width}x{height} canvas");

        let mut session = Self {
            id,
            fonts: FontBook::new()?,
            surface,
            drawables: vec![background.into()],
            mode: Mode::Idle,
            tab: EditorTab::Enhance,
            tool: Tool::Pen,
            last_drawing_tool: None,
            draw_size: config.draw_size,
            colors,
            text,
            crop_aspect_ratio: AspectRatio::Free,
            free_angle: 0.0,
            effects_ui: Effects::default(),
            effects_applied: Effects::default(),
            touched_effects: TouchedEffects::new(),
            history: History::new(config.undo_limit),
            redraw: RedrawScheduler::default(),
            crop_actions: Debouncer::new(config.crop_debounce_ms),
            clock: Box::new(SystemClock),
            cursor: CursorIcon::Default,
            revision: 0,
            events: EventBus::new(),
            config,
        };
        session.request_draw();
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    /// Replaces the time source used for pointer samples and debouncing.
    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Makes real font bytes available to text boxes.
    pub fn register_font(&mut self, family: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        self.fonts.register(family, bytes)
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    // --- Tabs and tools ---

    pub fn tab(&self) -> EditorTab {
        self.tab
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn switch_tab(&mut self, tab: EditorTab) -> Result<()> {
        let previous = self.tab;
        if tab == previous {
            return Ok(());
        }

        if previous == EditorTab::Crop {
            self.drawables.retain(|d| !d.is_crop_area());
            self.request_draw();
        }
        if previous.has_resizables() {
            self.set_cursor(CursorIcon::Default);
            self.deselect_all();
            self.request_draw();
        }

        self.tab = tab;
        log::debug!("Session {}: tab {previous:?} -> {tab:?}", self.id);
        self.events.emit(SessionEvent::TabChanged { old: previous, new: tab });

        match tab {
            EditorTab::Crop => self.enter_crop()?,
            EditorTab::Draw => self.update_mode(Mode::Drawing { current: None }),
            _ => self.update_mode(Mode::Idle),
        }
        Ok(())
    }

    fn update_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::debug!("Session {}: mode {} -> {}", self.id, self.mode.name(), mode.name());
        }
        self.mode = mode;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        let previous = self.tool;
        if previous.is_drawing_tool() {
            self.last_drawing_tool = Some(previous);
        }
        self.tool = tool;
        self.events.emit(SessionEvent::ToolChanged { old: previous, new: tool });
    }

    /// The tool whose color the current tool paints with. Blur and eraser
    /// borrow the last drawing tool's color, or the pen's.
    fn color_tool(&self) -> Tool {
        if self.tool.is_drawing_tool() {
            return self.tool;
        }
        self.last_drawing_tool.unwrap_or(Tool::Pen)
    }

    pub fn current_draw_color(&self) -> Color32 {
        let tool = self.color_tool();
        self.colors.get(&tool).copied().unwrap_or(Color32::WHITE)
    }

    pub fn tool_color(&self, tool: Tool) -> Option<Color32> {
        self.colors.get(&tool).copied()
    }

    pub fn set_draw_color(&mut self, color: Color32) {
        let tool = self.color_tool();
        self.colors.insert(tool, color);
        self.events.emit(SessionEvent::ColorChanged { tool, color });
    }

    pub fn draw_size(&self) -> f32 {
        self.draw_size
    }

    pub fn set_draw_size(&mut self, size: f32) {
        self.draw_size = size.max(1.0);
        self.events.emit(SessionEvent::DrawSizeChanged(self.draw_size));
    }

    fn drawing_options(&self) -> DrawingOptions {
        DrawingOptions {
            color: self.current_draw_color(),
            size: self.draw_size,
        }
    }

    // --- History ---

    /// Records the current state. Call before every mutation.
    pub fn save_state(&mut self) {
        self.flush_draw();
        let snapshot = snapshot_of(&self.drawables, &self.surface, &self.effects_applied);
        self.history.push(snapshot);
        self.sync_history();
    }

    pub fn undo(&mut self) {
        self.flush_draw();
        let (drawables, surface, effects) = (&self.drawables, &self.surface, &self.effects_applied);
        if let Some(snapshot) = self.history.undo(|| snapshot_of(drawables, surface, effects)) {
            log::debug!("Session {}: undo", self.id);
            self.restore(snapshot);
        }
        self.sync_history();
    }

    pub fn redo(&mut self) {
        self.flush_draw();
        let (drawables, surface, effects) = (&self.drawables, &self.surface, &self.effects_applied);
        if let Some(snapshot) = self.history.redo(|| snapshot_of(drawables, surface, effects)) {
            log::debug!("Session {}: redo", self.id);
            self.restore(snapshot);
        }
        self.sync_history();
    }

    /// Puts a snapshot back in place. The pixels come back verbatim; no
    /// repaint is requested.
    fn restore(&mut self, snapshot: Snapshot) {
        self.drawables = snapshot.drawables;
        self.effects_applied = snapshot.effects.clone();
        self.effects_ui = snapshot.effects;
        self.surface.restore(snapshot.pixels);
        self.revision += 1;

        // Indices held by the mode no longer point at anything
        match self.mode {
            Mode::Cropping { crop: Some(_) } => {
                self.update_mode(Mode::Cropping { crop: None });
                self.events.emit(SessionEvent::CropVisibilityChanged(false));
            }
            Mode::Drawing { current: Some(_) } => self.update_mode(Mode::Drawing { current: None }),
            Mode::Dragging { .. } => self.update_mode(Mode::Idle),
            _ => {}
        }
    }

    fn sync_history(&self) {
        self.events.emit(SessionEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.history.redo_len()
    }

    // --- Effects ---

    pub fn effects_ui(&self) -> &Effects {
        &self.effects_ui
    }

    pub fn effects_applied(&self) -> &Effects {
        &self.effects_applied
    }

    pub fn touched_effects(&self) -> &TouchedEffects {
        &self.touched_effects
    }

    /// Moves a slider. Nothing is rendered until [`Session::apply_effects`].
    pub fn set_ui_effect_value(&mut self, key: EffectKey, value: f32) {
        self.effects_ui.set(key, value);
        self.touched_effects.insert(key);
    }

    pub fn apply_effects(&mut self) -> Result<()> {
        self.save_state();
        self.effects_applied = self.effects_ui.clone();
        let (effects, touched) = (self.effects_applied.clone(), self.touched_effects.clone());
        if let Some(background) = self.last_bg_image_mut() {
            background.set_effects(effects, touched)?;
        }
        log::info!(
            "Session {}: applied effects {:?}",
            self.id,
            self.touched_effects.iter().collect::<Vec<_>>()
        );
        self.request_draw();
        self.events.emit(SessionEvent::EffectsApplied);
        Ok(())
    }

    fn reset_effects(&mut self) {
        self.touched_effects.clear();
        self.effects_applied = Effects::default();
        self.effects_ui = Effects::default();
    }

    fn last_bg_image(&self) -> Option<&BgImage> {
        self.drawables.iter().rev().find_map(DrawableType::as_bg_image)
    }

    fn last_bg_image_mut(&mut self) -> Option<&mut BgImage> {
        self.drawables.iter_mut().rev().find_map(DrawableType::as_bg_image_mut)
    }

    // --- Text ---

    pub fn text_settings(&self) -> &TextSettings {
        &self.text
    }

    fn with_selected_text(&mut self, update: impl FnOnce(&mut TextBox, &FontBook)) {
        let fonts = &self.fonts;
        let selected = self
            .drawables
            .iter_mut()
            .filter_map(DrawableType::as_text_mut)
            .find(|text| text.is_selected());
        if let Some(text) = selected {
            update(text, fonts);
            self.request_draw();
        }
    }

    pub fn set_text_color(&mut self, color: Color32) {
        self.text.color = color;
        self.with_selected_text(|text, _| text.update_color(color));
    }

    pub fn set_text_font(&mut self, family: &str) {
        self.text.font = family.to_owned();
        self.with_selected_text(|text, fonts| text.update_font_family(family, fonts));
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.text.align = align;
        self.with_selected_text(|text, _| text.update_align(align));
    }

    pub fn set_text_style(&mut self, style: TextStyle) {
        self.text.style = style;
        self.with_selected_text(|text, _| text.update_style(style));
    }

    pub fn set_text_size(&mut self, size: f32) {
        self.text.size = size;
        self.with_selected_text(|text, _| text.update_font_size(size));
    }

    fn add_text(&mut self, at: Pos2) {
        self.save_state();
        let options = TextOptions {
            font_size: self.text.size,
            font_family: self.text.font.clone(),
            color: self.text.color,
            align: self.text.align,
            style: self.text.style,
        };
        let mut text = TextBox::new(at, "", options, &self.fonts);
        self.deselect_all();
        text.set_selected(true);
        log::debug!("Session {}: new text box {}", self.id, text.id());
        self.drawables.push(text.into());
        self.request_draw();
    }

    // --- Stickers and removal ---

    /// Places a sticker of `size` x `size` at a random spot and selects it.
    /// Returns its id.
    pub fn add_sticker(&mut self, source: ImageSource, size: u32) -> Result<usize> {
        self.save_state();
        let source = source.scaled_to_square(size)?;
        let side = size as f32;
        let mut rng = rand::thread_rng();
        let mut random_in = |max: f32| {
            if max > STICKER_MARGIN {
                rng.gen_range(STICKER_MARGIN..=max)
            } else {
                STICKER_MARGIN
            }
        };
        let min = pos2(random_in(self.surface.size().x - side), random_in(self.surface.size().y - side));
        let mut sticker = Sticker::new(source, Rect::from_min_size(min, vec2(side, side)));
        self.deselect_all();
        sticker.set_selected(true);
        let id = sticker.id();
        log::debug!("Session {}: new sticker {id}", self.id);
        self.drawables.push(sticker.into());
        self.request_draw();
        Ok(id)
    }

    /// Drops the text box or sticker with `id`.
    pub fn remove_draggable(&mut self, id: usize) {
        let before = self.drawables.len();
        self.drawables.retain(|d| d.as_resizable().is_none() || d.id() != id);
        if self.drawables.len() == before {
            return;
        }
        if let Mode::Dragging { .. } = self.mode {
            self.update_mode(Mode::Idle);
        }
        self.events.emit(SessionEvent::DrawableRemoved { id });
        self.request_draw();
    }

    fn deselect_all(&mut self) {
        for drawable in &mut self.drawables {
            if let Some(resizable) = drawable.as_resizable_mut() {
                resizable.set_selected(false);
            }
        }
    }

    /// Selects the resizable at `index`, deselecting all others.
    fn select(&mut self, index: usize) {
        self.deselect_all();
        if let Some(resizable) = self.drawables.get_mut(index).and_then(DrawableType::as_resizable_mut) {
            resizable.set_selected(true);
        }
    }

    pub fn selected_id(&self) -> Option<usize> {
        self.drawables.iter().find(|d| d.is_selected()).map(Drawable::id)
    }

    // --- Rendering ---

    /// Repaints now in the crop tab, otherwise on the next tick.
    pub fn request_draw(&mut self) {
        if self.tab == EditorTab::Crop {
            self.redraw.cancel();
            self.draw();
        } else {
            self.redraw.request();
        }
    }

    fn flush_draw(&mut self) {
        if self.redraw.take() {
            self.draw();
        }
    }

    /// Clears the surface and paints every drawable in list order.
    pub fn draw(&mut self) {
        self.revision += 1;
        self.surface.clear();
        for drawable in &self.drawables {
            drawable.draw(&mut self.surface);
        }
    }

    /// Frame callback. Runs a due crop action and the pending repaint;
    /// returns whether anything was painted.
    pub fn tick(&mut self) -> Result<bool> {
        let now = self.clock.now_ms();
        self.tick_at(now)
    }

    pub fn tick_at(&mut self, now_ms: f64) -> Result<bool> {
        let mut painted = false;
        if let Some(action) = self.crop_actions.poll(now_ms) {
            self.run_crop_action(action)?;
            painted = true;
        }
        if self.redraw.take() {
            self.draw();
            painted = true;
        }
        Ok(painted)
    }

    pub fn has_pending_draw(&self) -> bool {
        self.redraw.is_pending()
    }

    /// A repaint or a debounced crop action is still waiting for a tick.
    pub fn has_pending_work(&self) -> bool {
        self.redraw.is_pending() || self.crop_actions.is_pending()
    }

    fn set_cursor(&mut self, cursor: CursorIcon) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.events.emit(SessionEvent::CursorChanged(cursor));
        }
    }

    pub fn cursor(&self) -> CursorIcon {
        self.cursor
    }

    // --- Queries ---

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    /// Bumped whenever the canvas pixels change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn canvas_pixels(&self) -> &Pixmap {
        self.surface.pixmap()
    }

    pub fn canvas_image(&self) -> image::RgbaImage {
        self.surface.to_rgba_image()
    }

    pub fn drawables(&self) -> &[DrawableType] {
        &self.drawables
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            session_id: self.id,
            tab: self.tab,
            tool: self.tool,
            mode: self.mode.name(),
            drawables: self.drawables.iter().map(|d| (d.id(), d.kind())).collect(),
            canvas: self.canvas_size(),
            undo_len: self.history.undo_len(),
            redo_len: self.history.redo_len(),
            touched_effects: self.touched_effects.iter().copied().collect(),
            pending_redraw: self.redraw.is_pending(),
            pending_crop_action: self.crop_actions.is_pending(),
        }
    }
}
