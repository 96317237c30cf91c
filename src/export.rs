//! Batch export of the crop history.
//!
//! Every record is resampled under one [`ResizePolicy`] and written as a PNG
//! named after the record. The batch stops at the first failure; files that
//! were already written stay where they are.

use std::fmt;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use image::imageops::FilterType;

use crate::error::TrimError;
use crate::history::CropRecord;

/// Size rule applied to every crop on export.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResizePolicy {
    /// Stretch to exactly this size, ignoring the crop's aspect ratio.
    Dimensions { width: u32, height: u32 },
    /// Multiply both sides, rounding down.
    Scale(f64),
}

impl ResizePolicy {
    pub fn dimensions(width: u32, height: u32) -> Result<Self, TrimError> {
        if width == 0 || height == 0 {
            return Err(TrimError::InvalidPolicy(format!(
                "width and height must be positive, got {width}x{height}"
            )));
        }
        Ok(Self::Dimensions { width, height })
    }

    pub fn scale(factor: f64) -> Result<Self, TrimError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(TrimError::InvalidPolicy(format!(
                "scale factor must be positive, got {factor}"
            )));
        }
        Ok(Self::Scale(factor))
    }

    /// Output size for a `width` x `height` crop. Wider than `u32` so large
    /// factors cannot wrap into a plausible size.
    pub fn target_size(&self, width: u32, height: u32) -> (u64, u64) {
        match *self {
            ResizePolicy::Dimensions { width, height } => (u64::from(width), u64::from(height)),
            ResizePolicy::Scale(factor) => (
                (f64::from(width) * factor).floor() as u64,
                (f64::from(height) * factor).floor() as u64,
            ),
        }
    }
}

impl fmt::Display for ResizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizePolicy::Dimensions { width, height } => write!(f, "{width} × {height} px"),
            ResizePolicy::Scale(factor) => write!(f, "× {factor}"),
        }
    }
}

/// `"Trim 3"` becomes `"Trim_3.png"`.
pub fn output_file_name(name: &str) -> String {
    format!("{}.png", name.replace(' ', "_"))
}

#[derive(Debug)]
pub struct ExportSummary {
    pub directory: PathBuf,
    pub written: Vec<PathBuf>,
}

/// Output side lengths `resize_exact` can be asked for, or the error that
/// stops the batch. `max_pixels` bounds `width * height`.
fn checked_size(
    name: &str,
    (width, height): (u64, u64),
    max_pixels: u64,
) -> Result<(u32, u32), TrimError> {
    if width == 0 || height == 0 {
        return Err(TrimError::EmptyOutput {
            name: name.to_owned(),
            width,
            height,
        });
    }
    let too_large = || TrimError::OutputTooLarge {
        name: name.to_owned(),
        width,
        height,
    };
    if width.saturating_mul(height) > max_pixels {
        return Err(too_large());
    }
    let width = u32::try_from(width).map_err(|_| too_large())?;
    let height = u32::try_from(height).map_err(|_| too_large())?;
    Ok((width, height))
}

pub fn export_all(
    records: &[CropRecord],
    policy: ResizePolicy,
    directory: &Path,
    filter: FilterType,
    max_pixels: u64,
) -> Result<ExportSummary, TrimError> {
    let mut written = Vec::with_capacity(records.len());

    for record in records {
        let source = record.image();
        let target = policy.target_size(source.width(), source.height());
        let (width, height) = checked_size(record.name(), target, max_pixels)?;

        let resized = if (width, height) == (source.width(), source.height()) {
            source.clone()
        } else {
            source.resize_exact(width, height, filter)
        };

        let path = directory.join(output_file_name(record.name()));
        resized
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| TrimError::Save {
                path: path.clone(),
                source,
            })?;
        log::debug!("wrote {} ({width}x{height})", path.display());
        written.push(path);
    }

    Ok(ExportSummary {
        directory: directory.to_path_buf(),
        written,
    })
}
