use std::path::{Path, PathBuf};

use eframe::egui;
use image::DynamicImage;
use image::imageops::FilterType;

use crate::geometry::DisplayFit;

/// Shrinks `image` to fit a `max_w` x `max_h` box, keeping its aspect ratio.
/// Images already inside the box are returned unchanged.
pub fn fit_within(image: &DynamicImage, max_w: u32, max_h: u32, filter: FilterType) -> DynamicImage {
    let fit = DisplayFit::new(
        [image.width(), image.height()],
        egui::vec2(max_w as f32, max_h as f32),
    );
    resize_to_fit(image, &fit, filter)
}

fn resize_to_fit(image: &DynamicImage, fit: &DisplayFit, filter: FilterType) -> DynamicImage {
    let [w, h] = fit.displayed_size();
    if [w, h] == [image.width(), image.height()] {
        image.clone()
    } else {
        image.resize_exact(w, h, filter)
    }
}

/// The image being trimmed, at full resolution and fitted to the canvas.
pub struct LoadedImage {
    path: PathBuf,
    original: DynamicImage,
    fitted: DynamicImage,
    fit: DisplayFit,
    filter: FilterType,
}

impl LoadedImage {
    pub fn from_image(
        path: PathBuf,
        original: DynamicImage,
        viewport: egui::Vec2,
        filter: FilterType,
    ) -> Self {
        let fit = DisplayFit::new([original.width(), original.height()], viewport);
        let fitted = resize_to_fit(&original, &fit, filter);
        Self {
            path,
            original,
            fitted,
            fit,
            filter,
        }
    }

    /// Refits to a new viewport. Returns `true` when the fitted buffer changed.
    pub fn refit(&mut self, viewport: egui::Vec2) -> bool {
        let fit = DisplayFit::new([self.original.width(), self.original.height()], viewport);
        if fit == self.fit {
            return false;
        }
        log::debug!(
            "refit {} to {:?}",
            self.path.display(),
            fit.displayed_size()
        );
        self.fitted = resize_to_fit(&self.original, &fit, self.filter);
        self.fit = fit;
        true
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original(&self) -> &DynamicImage {
        &self.original
    }

    pub fn fitted(&self) -> &DynamicImage {
        &self.fitted
    }

    pub fn fit(&self) -> &DisplayFit {
        &self.fit
    }
}
