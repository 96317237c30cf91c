use eframe::egui;
use image::imageops::FilterType;

/// Runtime settings for the trimmer window and its image pipeline.
///
/// Built once at startup; nothing here is persisted between runs.
#[derive(Debug, Clone)]
pub struct TrimmerConfig {
    /// Initial inner size of the main window.
    pub window_size: [f32; 2],
    pub history_panel_width: f32,
    /// Side of the square box crop previews are fit into.
    pub preview_box: u32,
    /// Blank margin kept around the displayed image.
    pub canvas_padding: f32,
    /// Filter for the canvas image and history previews.
    pub display_filter: FilterType,
    /// Filter for resampling crops on export.
    pub export_filter: FilterType,
    /// Largest `width * height` a single exported image may have.
    pub max_export_pixels: u64,
    /// Crop names are `"{name_prefix} N"`.
    pub name_prefix: String,
    pub open_extensions: &'static [&'static str],
    pub pending_stroke: egui::Stroke,
    pub drag_stroke: egui::Stroke,
    /// Values the resize prompts start from when no policy is set yet.
    pub default_dimensions: (u32, u32),
    pub default_scale: f64,
}

impl Default for TrimmerConfig {
    fn default() -> Self {
        Self {
            window_size: [1300.0, 850.0],
            history_panel_width: 300.0,
            preview_box: 250,
            canvas_padding: 10.0,
            display_filter: FilterType::Lanczos3,
            export_filter: FilterType::Lanczos3,
            max_export_pixels: 100_000_000,
            name_prefix: String::from("Trim"),
            open_extensions: &["png", "jpg", "jpeg", "gif", "bmp"],
            pending_stroke: egui::Stroke::new(2.0, egui::Color32::RED),
            drag_stroke: egui::Stroke::new(1.0, egui::Color32::YELLOW),
            default_dimensions: (800, 600),
            default_scale: 1.0,
        }
    }
}
