use egui::Ui;

use crate::PhotoEditorApp;
use crate::drawable::{AspectRatio, TextAlign, TextStyle};
use crate::effects::EffectKey;
use crate::error::Result;
use crate::session::Session;
use crate::state::{EditorTab, Tool};

const DRAW_SIZE_RANGE: std::ops::RangeInclusive<f32> = 1.0..=30.0;
const TEXT_SIZE_RANGE: std::ops::RangeInclusive<f32> = 10.0..=48.0;

const CROP_RATIOS: [(&str, AspectRatio); 13] = [
    ("Free", AspectRatio::Free),
    ("Original", AspectRatio::Original),
    ("Square", AspectRatio::Ratio(1.0)),
    ("3:2", AspectRatio::Ratio(3.0 / 2.0)),
    ("2:3", AspectRatio::Ratio(2.0 / 3.0)),
    ("4:3", AspectRatio::Ratio(4.0 / 3.0)),
    ("3:4", AspectRatio::Ratio(3.0 / 4.0)),
    ("5:4", AspectRatio::Ratio(5.0 / 4.0)),
    ("4:5", AspectRatio::Ratio(4.0 / 5.0)),
    ("7:5", AspectRatio::Ratio(7.0 / 5.0)),
    ("5:7", AspectRatio::Ratio(5.0 / 7.0)),
    ("16:9", AspectRatio::Ratio(16.0 / 9.0)),
    ("9:16", AspectRatio::Ratio(9.0 / 16.0)),
];

pub fn tools_panel(app: &mut PhotoEditorApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Edit");

            let Some(session) = app.session_mut() else {
                ui.label("Drop a photo onto the window to start editing.");
                return;
            };

            let result = editor_controls(ui, session);
            app.report(result);

            ui.separator();
            if ui.button("Save").clicked() {
                app.export();
            }
            if let Some(status) = app.status() {
                ui.label(status);
            }
        });
}

fn editor_controls(ui: &mut Ui, session: &mut Session) -> Result<()> {
    ui.horizontal_wrapped(|ui| {
        let current = session.tab();
        for tab in EditorTab::ALL {
            if ui.selectable_label(current == tab, tab.title()).clicked() && current != tab {
                log::info!("Tab selected from UI: {}", tab.title());
                session.switch_tab(tab)?;
            }
        }
        Ok::<_, crate::error::EditorError>(())
    })
    .inner?;

    ui.horizontal(|ui| {
        if ui.add_enabled(session.can_undo(), egui::Button::new("Undo")).clicked() {
            session.undo();
        }
        if ui.add_enabled(session.can_redo(), egui::Button::new("Redo")).clicked() {
            session.redo();
        }
    });
    ui.separator();

    match session.tab() {
        EditorTab::Enhance => enhance_controls(ui, session)?,
        EditorTab::Crop => crop_controls(ui, session)?,
        EditorTab::Text => text_controls(ui, session),
        EditorTab::Draw => draw_controls(ui, session),
        EditorTab::Sticker => {
            ui.label("Drop an image onto the canvas to add it as a sticker.");
        }
    }
    Ok(())
}

fn enhance_controls(ui: &mut Ui, session: &mut Session) -> Result<()> {
    for key in EffectKey::ALL {
        let mut value = session.effects_ui().get(key);
        if ui.add(egui::Slider::new(&mut value, key.range()).text(key.title())).changed() {
            session.set_ui_effect_value(key, value);
        }
    }
    let dirty = session.effects_ui() != session.effects_applied();
    if ui.add_enabled(dirty, egui::Button::new("Apply")).clicked() {
        session.apply_effects()?;
    }
    Ok(())
}

fn crop_controls(ui: &mut Ui, session: &mut Session) -> Result<()> {
    ui.label("Aspect ratio");
    egui::Grid::new("crop_ratios").num_columns(2).show(ui, |ui| {
        for (i, (title, ratio)) in CROP_RATIOS.iter().enumerate() {
            if ui.selectable_label(session.crop_aspect_ratio() == *ratio, *title).clicked() {
                session.set_crop_aspect_ratio(*ratio);
            }
            // Free, Original and Square take a row each, the rest pair up
            if i < 3 || i % 2 == 0 {
                ui.end_row();
            }
        }
    });

    ui.horizontal(|ui| {
        if ui.button("Rotate 90°").clicked() {
            session.rotate90();
        }
        if ui.button("Flip").clicked() {
            session.flip();
        }
    });
    let mut angle = session.free_angle();
    if ui.add(egui::Slider::new(&mut angle, -180.0..=180.0).suffix("°")).changed() {
        session.set_free_angle(angle);
    }

    if ui
        .add_enabled(session.is_apply_crop_visible(), egui::Button::new("Apply crop"))
        .clicked()
    {
        session.apply_crop()?;
    }
    Ok(())
}

fn text_controls(ui: &mut Ui, session: &mut Session) {
    let settings = session.text_settings().clone();

    let mut color = settings.color;
    if ui.color_edit_button_srgba(&mut color).changed() {
        session.set_text_color(color);
    }

    let families: Vec<(&str, &str)> = session.fonts().families().collect();
    egui::ComboBox::from_label("Font")
        .selected_text(
            families
                .iter()
                .find(|(_, family)| *family == settings.font)
                .map_or(settings.font.as_str(), |(title, _)| *title),
        )
        .show_ui(ui, |ui| {
            for (title, family) in &families {
                if ui.selectable_label(settings.font == *family, *title).clicked() {
                    session.set_text_font(family);
                }
            }
        });

    ui.horizontal(|ui| {
        for (title, align) in [("Left", TextAlign::Left), ("Center", TextAlign::Center), ("Right", TextAlign::Right)] {
            if ui.selectable_label(settings.align == align, title).clicked() {
                session.set_text_align(align);
            }
        }
    });
    ui.horizontal(|ui| {
        for (title, style) in [
            ("Plain", TextStyle::Plain),
            ("Outline", TextStyle::Outline),
            ("Background", TextStyle::Background),
        ] {
            if ui.selectable_label(settings.style == style, title).clicked() {
                session.set_text_style(style);
            }
        }
    });

    let mut size = settings.size;
    if ui.add(egui::Slider::new(&mut size, TEXT_SIZE_RANGE).text("Size")).changed() {
        session.set_text_size(size);
    }
}

fn draw_controls(ui: &mut Ui, session: &mut Session) {
    for tool in Tool::ALL {
        if ui.selectable_label(session.tool() == tool, tool.name()).clicked() {
            log::info!("Tool selected from UI: {}", tool.name());
            session.set_tool(tool);
        }
    }
    ui.separator();

    let mut color = session.current_draw_color();
    if ui.color_edit_button_srgba(&mut color).changed() {
        session.set_draw_color(color);
    }
    let mut size = session.draw_size();
    if ui.add(egui::Slider::new(&mut size, DRAW_SIZE_RANGE).text("Size")).changed() {
        session.set_draw_size(size);
    }
}
