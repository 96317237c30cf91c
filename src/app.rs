use std::path::{Path, PathBuf};

use eframe::egui;
use image::DynamicImage;

use crate::config::TrimmerConfig;
use crate::error::{Severity, TrimError};
use crate::export::ResizePolicy;
use crate::session::Session;

const MAX_EDGE: u32 = 65_535;

/// Something the user asked for during a frame.
///
/// Panels only collect actions; [`TrimmerApp::dispatch`] runs them once the
/// frame's layout is done.
#[derive(Debug)]
enum Action {
    Open,
    OpenPath(PathBuf),
    BeginDrag(egui::Pos2),
    UpdateDrag(egui::Pos2),
    EndDrag(egui::Pos2),
    Crop,
    ClearSelection,
    Select(usize),
    DeleteSelected,
    DeleteAll,
    PromptDimensions,
    PromptScale,
    SaveAll,
    Exit,
}

/// An open resize prompt and the values typed into it so far.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Prompt {
    Dimensions { width: u32, height: u32 },
    Scale { factor: f64 },
}

impl Prompt {
    fn title(&self) -> &'static str {
        match self {
            Prompt::Dimensions { .. } => "Resize to width and height",
            Prompt::Scale { .. } => "Resize by scale factor",
        }
    }

    fn to_policy(self) -> Result<ResizePolicy, TrimError> {
        match self {
            Prompt::Dimensions { width, height } => ResizePolicy::dimensions(width, height),
            Prompt::Scale { factor } => ResizePolicy::scale(factor),
        }
    }
}

fn to_color_image(image: &DynamicImage) -> egui::ColorImage {
    let size = [image.width() as _, image.height() as _];
    let image_buffer = image.to_rgba8();
    let pixels = image_buffer.as_flat_samples();
    egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice())
}

fn full_uv() -> egui::Rect {
    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0))
}

fn menu_item(ui: &mut egui::Ui, label: &str, action: Action, actions: &mut Vec<Action>) {
    if ui.button(label).clicked() {
        actions.push(action);
        ui.close_menu();
    }
}

pub struct TrimmerApp {
    config: TrimmerConfig,
    session: Session,
    canvas_texture: Option<egui::TextureHandle>,
    /// Preview texture and the name of the record it shows.
    preview_texture: Option<(String, egui::TextureHandle)>,
    selected: Option<usize>,
    /// Space available to the image, refreshed every frame.
    viewport: egui::Vec2,
    prompt: Option<Prompt>,
}

impl TrimmerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: TrimmerConfig) -> Self {
        let [w, h] = config.window_size;
        Self {
            session: Session::new(&config),
            canvas_texture: None,
            preview_texture: None,
            selected: None,
            viewport: egui::vec2(w - config.history_panel_width, h),
            prompt: None,
            config,
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, action: Action) {
        let result = match action {
            Action::Open => self.open(ctx),
            Action::OpenPath(path) => self.load(ctx, &path),
            Action::BeginDrag(pos) => {
                self.session.begin_drag(pos);
                Ok(())
            }
            Action::UpdateDrag(pos) => {
                self.session.update_drag(pos);
                Ok(())
            }
            Action::EndDrag(pos) => self.session.end_drag(pos).map(|_| ()),
            Action::Crop => self.crop(),
            Action::ClearSelection => {
                self.session.clear_pending();
                Ok(())
            }
            Action::Select(index) => {
                self.selected = Some(index);
                Ok(())
            }
            Action::DeleteSelected => self.delete_selected(),
            Action::DeleteAll => {
                self.delete_all();
                Ok(())
            }
            Action::PromptDimensions => {
                let (width, height) = match self.session.policy() {
                    Some(ResizePolicy::Dimensions { width, height }) => (width, height),
                    _ => self.config.default_dimensions,
                };
                self.prompt = Some(Prompt::Dimensions { width, height });
                Ok(())
            }
            Action::PromptScale => {
                let factor = match self.session.policy() {
                    Some(ResizePolicy::Scale(factor)) => factor,
                    _ => self.config.default_scale,
                };
                self.prompt = Some(Prompt::Scale { factor });
                Ok(())
            }
            Action::SaveAll => self.save_all(),
            Action::Exit => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                Ok(())
            }
        };

        if let Err(err) = result {
            self.report(&err);
        }
    }

    fn open(&mut self, ctx: &egui::Context) -> Result<(), TrimError> {
        match rfd::FileDialog::new()
            .set_title("Open image")
            .add_filter("Image files", self.config.open_extensions)
            .add_filter("All files", &["*"])
            .pick_file()
        {
            Some(path) => self.load(ctx, &path),
            None => Ok(()),
        }
    }

    fn load(&mut self, ctx: &egui::Context, path: &Path) -> Result<(), TrimError> {
        self.session.load(path, self.viewport)?;
        self.selected = None;
        self.preview_texture = None;
        self.refresh_canvas_texture(ctx);
        Ok(())
    }

    fn crop(&mut self) -> Result<(), TrimError> {
        let added = self.session.commit_pending()?;
        self.inform("Cropped", &format!("Added {added} crop(s) to the history"));
        Ok(())
    }

    fn delete_selected(&mut self) -> Result<(), TrimError> {
        let index = self.selected.ok_or(TrimError::NoEntrySelected)?;
        self.session.delete_one(index)?;
        self.selected = None;
        Ok(())
    }

    fn delete_all(&mut self) {
        if self.session.history().is_empty() {
            log::debug!("history already empty");
            return;
        }
        if self.confirm("Delete all", "Delete every crop in the history?") {
            self.session.delete_all();
            self.selected = None;
        }
    }

    fn save_all(&mut self) -> Result<(), TrimError> {
        self.session.export_plan()?;
        let Some(directory) = rfd::FileDialog::new()
            .set_title("Choose where to save the crops")
            .pick_folder()
        else {
            return Ok(());
        };
        let summary = self.session.export_all(&directory)?;
        self.inform(
            "Saved",
            &format!(
                "Saved {} image(s) to {}",
                summary.written.len(),
                summary.directory.display()
            ),
        );
        Ok(())
    }

    fn report(&self, err: &TrimError) {
        let (level, title) = match err.severity() {
            Severity::Warning => {
                log::warn!("{err}");
                (rfd::MessageLevel::Warning, "Warning")
            }
            Severity::Error => {
                log::error!("{err}");
                (rfd::MessageLevel::Error, "Error")
            }
        };
        rfd::MessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(err.to_string())
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn inform(&self, title: &str, text: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title(title)
            .set_description(text)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn confirm(&self, title: &str, text: &str) -> bool {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title(title)
            .set_description(text)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show()
            == rfd::MessageDialogResult::Yes
    }

    fn refresh_canvas_texture(&mut self, ctx: &egui::Context) {
        self.canvas_texture = self.session.image().map(|image| {
            ctx.load_texture(
                "canvas",
                to_color_image(image.fitted()),
                egui::TextureOptions::LINEAR,
            )
        });
    }

    fn sync_preview(&mut self, ctx: &egui::Context) {
        let Some(record) = self.session.select_for_preview(self.selected) else {
            self.preview_texture = None;
            return;
        };
        let shown = self.preview_texture.as_ref().map(|(name, _)| name.as_str());
        if shown != Some(record.name()) {
            let texture = ctx.load_texture(
                "preview",
                to_color_image(record.preview()),
                egui::TextureOptions::LINEAR,
            );
            self.preview_texture = Some((record.name().to_owned(), texture));
        }
    }

    fn toolbar(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                menu_item(ui, "Open image…", Action::Open, actions);
                menu_item(ui, "Crop selection", Action::Crop, actions);
                menu_item(ui, "Clear selection", Action::ClearSelection, actions);
                menu_item(ui, "Save all crops…", Action::SaveAll, actions);
                ui.separator();
                menu_item(ui, "Exit", Action::Exit, actions);
            });
            ui.menu_button("Settings", |ui| {
                menu_item(ui, "Resize to width and height…", Action::PromptDimensions, actions);
                menu_item(ui, "Resize by scale factor…", Action::PromptScale, actions);
            });
        });

        ui.horizontal(|ui| {
            let buttons = [
                ("Open image", Action::Open),
                ("Crop selection", Action::Crop),
                ("Clear selection", Action::ClearSelection),
                ("Save all crops", Action::SaveAll),
                ("Exit", Action::Exit),
            ];
            for (label, action) in buttons {
                if ui.button(label).clicked() {
                    actions.push(action);
                }
            }

            ui.separator();
            match self.session.policy() {
                Some(policy) => ui.label(format!("Resize: {policy}")),
                None => ui.weak("Resize: not set"),
            };
            ui.separator();
            ui.label(format!("{} pending", self.session.pending().len()));
        });
    }

    fn history_panel(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.heading("Crop history");

        let box_side = self.config.preview_box as f32;
        let list_height = (ui.available_height() - box_side - 80.0).max(80.0);
        egui::ScrollArea::vertical()
            .max_height(list_height)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, record) in self.session.history().records().iter().enumerate() {
                    let selected = self.selected == Some(index);
                    let source = record.source();
                    let label = ui
                        .selectable_label(selected, record.name())
                        .on_hover_text(format!(
                            "{}x{} from {source}",
                            source.width(),
                            source.height()
                        ));
                    if label.clicked() {
                        actions.push(Action::Select(index));
                    }
                }
            });

        ui.separator();
        ui.label("Selected crop");
        let (rect, _) =
            ui.allocate_exact_size(egui::vec2(box_side, box_side), egui::Sense::hover());
        ui.painter()
            .rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);
        if let Some((_, texture)) = &self.preview_texture {
            let image_rect = egui::Rect::from_center_size(rect.center(), texture.size_vec2());
            ui.painter()
                .image(texture.id(), image_rect, full_uv(), egui::Color32::WHITE);
        }

        ui.horizontal(|ui| {
            if ui.button("Delete selected").clicked() {
                actions.push(Action::DeleteSelected);
            }
            if ui.button("Delete all").clicked() {
                actions.push(Action::DeleteAll);
            }
        });
    }

    fn canvas(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let padding = self.config.canvas_padding;
        let available = ui.available_size();
        self.viewport = (available - egui::vec2(padding, padding) * 2.0).max(egui::vec2(1.0, 1.0));
        if self.session.fit_to(self.viewport) {
            self.refresh_canvas_texture(ui.ctx());
        }

        let (response, painter) = ui.allocate_painter(available, egui::Sense::drag());

        let display_size = self
            .session
            .image()
            .map_or(egui::Vec2::ZERO, |image| image.fit().displayed_vec2());
        // Manual centering
        let offset = ((available - display_size) / 2.0).max(egui::vec2(padding, padding));
        let image_rect = egui::Rect::from_min_size(response.rect.min + offset, display_size);
        let origin = image_rect.min.to_vec2();
        let local = move |pos: egui::Pos2| pos - origin;

        if let Some(texture) = &self.canvas_texture {
            painter.image(texture.id(), image_rect, full_uv(), egui::Color32::WHITE);
        } else {
            painter.text(
                response.rect.center(),
                egui::Align2::CENTER_CENTER,
                "Open an image or drop one here",
                egui::FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
        }

        // Handle Input
        if response.drag_started() {
            let press = ui
                .input(|i| i.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(pos) = press {
                actions.push(Action::BeginDrag(local(pos)));
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                actions.push(Action::UpdateDrag(local(pos)));
            }
        }
        if response.drag_stopped() {
            let end = response
                .interact_pointer_pos()
                .map(local)
                .or_else(|| self.session.active_drag().map(|drag| drag.current));
            if let Some(pos) = end {
                actions.push(Action::EndDrag(pos));
            }
        }

        // Draw selections
        if let Some(image) = self.session.image() {
            for &region in self.session.pending() {
                let rect = image.fit().to_display(region).translate(origin);
                painter.rect_stroke(rect, 0.0, self.config.pending_stroke);
            }
        }
        if let Some(drag) = self.session.active_drag() {
            painter.rect_stroke(drag.rect().translate(origin), 0.0, self.config.drag_stroke);
        }
    }

    fn prompt_window(&mut self, ctx: &egui::Context) {
        let Some(mut prompt) = self.prompt else {
            return;
        };

        let mut answer = None;
        egui::Window::new(prompt.title())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                match &mut prompt {
                    Prompt::Dimensions { width, height } => {
                        ui.label("Size of every saved image, in pixels");
                        ui.horizontal(|ui| {
                            ui.label("Width:");
                            ui.add(egui::DragValue::new(width).range(1..=MAX_EDGE));
                            ui.label("Height:");
                            ui.add(egui::DragValue::new(height).range(1..=MAX_EDGE));
                        });
                    }
                    Prompt::Scale { factor } => {
                        ui.label("Scale of every saved image (0.5 = 50%, 2 = 200%)");
                        ui.add(
                            egui::DragValue::new(factor)
                                .speed(0.01)
                                .range(0.01..=100.0),
                        );
                    }
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        answer = Some(false);
                    }
                });
            });

        match answer {
            None => self.prompt = Some(prompt),
            Some(false) => self.prompt = None,
            Some(true) => {
                self.prompt = None;
                match prompt.to_policy() {
                    Ok(policy) => self.session.set_policy(policy),
                    Err(err) => self.report(&err),
                }
            }
        }
    }
}

impl eframe::App for TrimmerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();

        // Handle dropped files
        let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|file| file.path.clone()));
        if let Some(path) = dropped {
            actions.push(Action::OpenPath(path));
        }

        let enabled = self.prompt.is_none();
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| self.toolbar(ui, &mut actions));
        });
        egui::SidePanel::right("history")
            .exact_width(self.config.history_panel_width)
            .resizable(false)
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| self.history_panel(ui, &mut actions));
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(enabled, |ui| self.canvas(ui, &mut actions));
        });
        self.prompt_window(ctx);

        for action in actions {
            self.dispatch(ctx, action);
        }
        self.sync_preview(ctx);
    }
}
