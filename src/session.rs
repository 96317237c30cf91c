//! All state of one trimming session and the handlers the UI calls.
//!
//! The UI owns exactly one [`Session`]. Each handler takes the current state,
//! updates it, and returns a `Result` the UI turns into a dialog.

use std::path::Path;

use eframe::egui;
use image::DynamicImage;
use image::imageops::FilterType;

use crate::config::TrimmerConfig;
use crate::display::LoadedImage;
use crate::error::TrimError;
use crate::export::{self, ExportSummary, ResizePolicy};
use crate::geometry::Region;
use crate::history::{CropHistory, CropRecord};
use crate::selection::{Drag, SelectionTracker};

pub struct Session {
    image: Option<LoadedImage>,
    selection: SelectionTracker,
    history: CropHistory,
    policy: Option<ResizePolicy>,
    name_prefix: String,
    preview_box: u32,
    display_filter: FilterType,
    export_filter: FilterType,
    max_export_pixels: u64,
}

impl Session {
    pub fn new(config: &TrimmerConfig) -> Self {
        Self {
            image: None,
            selection: SelectionTracker::default(),
            history: CropHistory::new(config.name_prefix.clone()),
            policy: None,
            name_prefix: config.name_prefix.clone(),
            preview_box: config.preview_box,
            display_filter: config.display_filter,
            export_filter: config.export_filter,
            max_export_pixels: config.max_export_pixels,
        }
    }

    /// Opens `path` fitted to `viewport`. On failure the session is untouched.
    pub fn load(&mut self, path: &Path, viewport: egui::Vec2) -> Result<(), TrimError> {
        let original = image::open(path).map_err(|source| TrimError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_image(path, original, viewport);
        Ok(())
    }

    /// Replaces the loaded image, dropping pending regions and the history.
    pub fn load_image(&mut self, path: &Path, original: DynamicImage, viewport: egui::Vec2) {
        let image =
            LoadedImage::from_image(path.to_path_buf(), original, viewport, self.display_filter);
        log::info!(
            "loaded {} ({}x{})",
            image.path().display(),
            image.original().width(),
            image.original().height()
        );
        self.image = Some(image);
        self.selection.clear();
        self.history = CropHistory::new(self.name_prefix.clone());
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    /// Refits the loaded image to `viewport`; `true` if the fitted buffer changed.
    pub fn fit_to(&mut self, viewport: egui::Vec2) -> bool {
        self.image
            .as_mut()
            .is_some_and(|image| image.refit(viewport))
    }

    pub fn begin_drag(&mut self, pos: egui::Pos2) {
        self.selection.begin(pos);
    }

    pub fn update_drag(&mut self, pos: egui::Pos2) {
        self.selection.update(pos);
    }

    /// Finishes a drag at `pos` (display coordinates) and records the region.
    pub fn end_drag(&mut self, pos: egui::Pos2) -> Result<Option<Region>, TrimError> {
        let Some(image) = &self.image else {
            self.selection.cancel_drag();
            return Err(TrimError::NoImage);
        };
        let region = self.selection.end(pos, image.fit());
        if let Some(region) = region {
            log::debug!("selected {region}");
        }
        Ok(region)
    }

    pub fn active_drag(&self) -> Option<Drag> {
        self.selection.active_drag()
    }

    pub fn pending(&self) -> &[Region] {
        self.selection.pending()
    }

    pub fn clear_pending(&mut self) {
        self.selection.clear();
    }

    /// Crops every pending region into the history. Returns how many were added.
    pub fn commit_pending(&mut self) -> Result<usize, TrimError> {
        if self.selection.pending().is_empty() {
            return Err(TrimError::EmptySelection);
        }
        let Some(image) = &self.image else {
            return Err(TrimError::NoImage);
        };

        let regions = self.selection.take_pending();
        for &region in &regions {
            let record = CropRecord::cut(
                self.history.next_name(),
                image.original(),
                region,
                self.preview_box,
                self.display_filter,
            );
            log::debug!("{} <- {region}", record.name());
            self.history.push(record);
        }
        log::info!(
            "added {} crops, history holds {}",
            regions.len(),
            self.history.len()
        );
        Ok(regions.len())
    }

    pub fn history(&self) -> &CropHistory {
        &self.history
    }

    pub fn delete_one(&mut self, index: usize) -> Result<CropRecord, TrimError> {
        let record = self.history.delete_one(index)?;
        log::info!("deleted {}", record.name());
        Ok(record)
    }

    pub fn delete_all(&mut self) -> usize {
        let count = self.history.delete_all();
        log::info!("deleted all {count} crops");
        count
    }

    /// The record to preview, or `None` to clear the preview pane.
    pub fn select_for_preview(&self, index: Option<usize>) -> Option<&CropRecord> {
        index.and_then(|index| self.history.get(index))
    }

    pub fn policy(&self) -> Option<ResizePolicy> {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ResizePolicy) {
        log::info!("resize policy set to {policy}");
        self.policy = Some(policy);
    }

    /// Checks that an export can run and returns the policy it would use.
    pub fn export_plan(&self) -> Result<ResizePolicy, TrimError> {
        if self.history.is_empty() {
            return Err(TrimError::EmptyHistory);
        }
        self.policy.ok_or(TrimError::MissingPolicy)
    }

    pub fn export_all(&self, directory: &Path) -> Result<ExportSummary, TrimError> {
        let policy = self.export_plan()?;
        let summary = export::export_all(
            self.history.records(),
            policy,
            directory,
            self.export_filter,
            self.max_export_pixels,
        )?;
        log::info!(
            "saved {} crops to {}",
            summary.written.len(),
            summary.directory.display()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_image(w: u32, h: u32) -> Session {
        let config = TrimmerConfig {
            display_filter: FilterType::Triangle,
            ..Default::default()
        };
        let mut session = Session::new(&config);
        session.load_image(
            Path::new("photo.png"),
            DynamicImage::new_rgba8(w, h),
            egui::vec2(400.0, 300.0),
        );
        session
    }

    fn drag(session: &mut Session, from: (f32, f32), to: (f32, f32)) -> Option<Region> {
        session.begin_drag(egui::pos2(from.0, from.1));
        session.update_drag(egui::pos2(to.0, to.1));
        session.end_drag(egui::pos2(to.0, to.1)).unwrap()
    }

    #[test]
    fn drag_commit_and_export_scenario() {
        let mut session = session_with_image(800, 600);
        assert_eq!(session.image().unwrap().fit().ratio(), (2.0, 2.0));

        drag(&mut session, (10.0, 10.0), (110.0, 60.0));
        assert_eq!(session.commit_pending().unwrap(), 1);
        assert!(session.pending().is_empty());

        let record = session.history().get(0).unwrap();
        assert_eq!(record.name(), "Trim 1");
        assert_eq!(record.source(), Region::from_corners((20, 20), (220, 120)));

        session.set_policy(ResizePolicy::scale(0.5).unwrap());
        let dir = tempfile::tempdir().unwrap();
        let summary = session.export_all(dir.path()).unwrap();
        assert_eq!(summary.written, [dir.path().join("Trim_1.png")]);
        assert_eq!(
            image::image_dimensions(dir.path().join("Trim_1.png")).unwrap(),
            (100, 50)
        );
    }

    #[test]
    fn commit_crops_every_pending_region() {
        let mut session = session_with_image(800, 600);
        drag(&mut session, (0.0, 0.0), (50.0, 50.0));
        drag(&mut session, (100.0, 100.0), (150.0, 120.0));
        assert_eq!(session.pending().len(), 2);

        assert_eq!(session.commit_pending().unwrap(), 2);
        let history = session.history();
        assert_eq!(history.get(1).unwrap().name(), "Trim 2");
        assert_eq!(history.get(1).unwrap().image().width(), 100);
        assert_eq!(history.get(1).unwrap().image().height(), 40);
    }

    #[test]
    fn commit_without_selection_warns() {
        let mut session = session_with_image(800, 600);
        assert!(matches!(
            session.commit_pending(),
            Err(TrimError::EmptySelection)
        ));
    }

    #[test]
    fn release_without_image_warns() {
        let mut session = Session::new(&TrimmerConfig::default());
        session.begin_drag(egui::pos2(1.0, 1.0));
        assert!(matches!(
            session.end_drag(egui::pos2(20.0, 20.0)),
            Err(TrimError::NoImage)
        ));
        assert!(session.active_drag().is_none());
        assert!(session.pending().is_empty());
    }

    #[test]
    fn loading_resets_history_and_selection() {
        let mut session = session_with_image(800, 600);
        drag(&mut session, (0.0, 0.0), (50.0, 50.0));
        session.commit_pending().unwrap();
        drag(&mut session, (10.0, 10.0), (60.0, 60.0));
        session.set_policy(ResizePolicy::scale(2.0).unwrap());

        session.load_image(
            Path::new("other.png"),
            DynamicImage::new_rgba8(100, 100),
            egui::vec2(400.0, 300.0),
        );

        assert!(session.history().is_empty());
        assert!(session.pending().is_empty());
        assert_eq!(session.history().next_name(), "Trim 1");
        assert_eq!(session.policy(), Some(ResizePolicy::Scale(2.0)));
    }

    #[test]
    fn failed_load_keeps_current_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_with_image(800, 600);
        drag(&mut session, (0.0, 0.0), (50.0, 50.0));
        session.commit_pending().unwrap();

        let result = session.load(&dir.path().join("absent.png"), egui::vec2(400.0, 300.0));

        assert!(matches!(result, Err(TrimError::Load { .. })));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.image().unwrap().path(), Path::new("photo.png"));
    }

    #[test]
    fn undecodable_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let mut session = Session::new(&TrimmerConfig::default());
        let result = session.load(&path, egui::vec2(400.0, 300.0));

        assert!(matches!(result, Err(TrimError::Load { .. })));
        assert!(session.image().is_none());
    }

    #[test]
    fn clearing_drops_every_pending_region() {
        let mut session = session_with_image(800, 600);
        drag(&mut session, (0.0, 0.0), (50.0, 50.0));
        drag(&mut session, (100.0, 100.0), (150.0, 120.0));
        assert_eq!(session.pending().len(), 2);

        session.clear_pending();

        assert!(session.pending().is_empty());
        assert!(matches!(
            session.commit_pending(),
            Err(TrimError::EmptySelection)
        ));
        assert!(session.history().is_empty());
    }

    #[test]
    fn oversized_export_is_an_error() {
        let config = TrimmerConfig {
            display_filter: FilterType::Triangle,
            max_export_pixels: 10_000,
            ..Default::default()
        };
        let mut session = Session::new(&config);
        session.load_image(
            Path::new("photo.png"),
            DynamicImage::new_rgba8(800, 600),
            egui::vec2(400.0, 300.0),
        );
        drag(&mut session, (0.0, 0.0), (50.0, 50.0));
        session.commit_pending().unwrap();
        session.set_policy(ResizePolicy::scale(2.0).unwrap());

        let dir = tempfile::tempdir().unwrap();
        let result = session.export_all(dir.path());

        assert!(matches!(
            result,
            Err(TrimError::OutputTooLarge {
                width: 200,
                height: 200,
                ..
            })
        ));
        assert!(!dir.path().join("Trim_1.png").exists());
    }

    #[test]
    fn load_from_disk_fits_to_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        DynamicImage::new_rgb8(1600, 400).save(&path).unwrap();

        let mut session = Session::new(&TrimmerConfig::default());
        session.load(&path, egui::vec2(400.0, 300.0)).unwrap();

        let image = session.image().unwrap();
        assert_eq!(image.fit().displayed_size(), [400, 100]);
        assert_eq!(image.fitted().width(), 400);
    }

    #[test]
    fn refit_keeps_pending_regions_in_original_space() {
        let mut session = session_with_image(800, 600);
        drag(&mut session, (10.0, 10.0), (110.0, 60.0));
        assert!(session.fit_to(egui::vec2(200.0, 150.0)));
        assert_eq!(session.image().unwrap().fit().ratio(), (4.0, 4.0));
        assert_eq!(
            session.pending(),
            [Region::from_corners((20, 20), (220, 120))]
        );
    }

    #[test]
    fn preview_selection() {
        let mut session = session_with_image(800, 600);
        drag(&mut session, (0.0, 0.0), (50.0, 50.0));
        session.commit_pending().unwrap();

        assert_eq!(session.select_for_preview(Some(0)).unwrap().name(), "Trim 1");
        assert!(session.select_for_preview(Some(3)).is_none());
        assert!(session.select_for_preview(None).is_none());
    }

    #[test]
    fn deletions_keep_numbering() {
        let mut session = session_with_image(800, 600);
        for _ in 0..3 {
            drag(&mut session, (0.0, 0.0), (20.0, 20.0));
        }
        session.commit_pending().unwrap();

        assert_eq!(session.delete_one(0).unwrap().name(), "Trim 1");
        assert!(matches!(
            session.delete_one(5),
            Err(TrimError::EntryOutOfRange { .. })
        ));
        assert_eq!(session.delete_all(), 2);

        drag(&mut session, (0.0, 0.0), (20.0, 20.0));
        session.commit_pending().unwrap();
        assert_eq!(session.history().get(0).unwrap().name(), "Trim 4");
    }

    #[test]
    fn export_checks_history_before_policy() {
        let mut session = session_with_image(800, 600);
        assert!(matches!(session.export_plan(), Err(TrimError::EmptyHistory)));

        drag(&mut session, (0.0, 0.0), (20.0, 20.0));
        session.commit_pending().unwrap();
        assert!(matches!(session.export_plan(), Err(TrimError::MissingPolicy)));

        session.set_policy(ResizePolicy::dimensions(10, 10).unwrap());
        session.set_policy(ResizePolicy::scale(0.25).unwrap());
        assert_eq!(session.export_plan().unwrap(), ResizePolicy::Scale(0.25));
    }
}
