use image::DynamicImage;
use image::imageops::FilterType;

use crate::display::fit_within;
use crate::error::TrimError;
use crate::geometry::Region;

/// One region cut out of the loaded image.
pub struct CropRecord {
    name: String,
    image: DynamicImage,
    preview: DynamicImage,
    source: Region,
}

impl CropRecord {
    /// Crops `region` out of `original` and builds a preview no larger than
    /// `preview_box` on either side.
    pub fn cut(
        name: String,
        original: &DynamicImage,
        region: Region,
        preview_box: u32,
        filter: FilterType,
    ) -> Self {
        let region = region.clamped(original.width(), original.height());
        let image = original.crop_imm(region.x1, region.y1, region.width(), region.height());
        let preview = fit_within(&image, preview_box, preview_box, filter);
        Self {
            name,
            image,
            preview,
            source: region,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn preview(&self) -> &DynamicImage {
        &self.preview
    }

    pub fn source(&self) -> Region {
        self.source
    }
}

/// Crops taken from the current image, oldest first.
///
/// Names count every crop created since the history was made, so deleting
/// an entry never frees its number.
pub struct CropHistory {
    records: Vec<CropRecord>,
    created: usize,
    prefix: String,
}

impl CropHistory {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            created: 0,
            prefix: prefix.into(),
        }
    }

    /// The name the next crop will receive.
    pub fn next_name(&self) -> String {
        format!("{} {}", self.prefix, self.created + 1)
    }

    pub fn push(&mut self, record: CropRecord) {
        self.created += 1;
        self.records.push(record);
    }

    pub fn delete_one(&mut self, index: usize) -> Result<CropRecord, TrimError> {
        if index >= self.records.len() {
            return Err(TrimError::EntryOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Removes every record and returns how many there were.
    pub fn delete_all(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        count
    }

    pub fn get(&self, index: usize) -> Option<&CropRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[CropRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(history: &CropHistory, region: Region) -> CropRecord {
        let original = DynamicImage::new_rgba8(800, 600);
        CropRecord::cut(
            history.next_name(),
            &original,
            region,
            250,
            FilterType::Triangle,
        )
    }

    fn filled(count: usize) -> CropHistory {
        let mut history = CropHistory::new("Trim");
        for i in 0..count as u32 {
            let rec = record(&history, Region::from_corners((i, i), (i + 10, i + 10)));
            history.push(rec);
        }
        history
    }

    fn names(history: &CropHistory) -> Vec<&str> {
        history.records().iter().map(CropRecord::name).collect()
    }

    #[test]
    fn cut_keeps_full_resolution_and_bounds_preview() {
        let history = CropHistory::new("Trim");
        let rec = record(&history, Region::from_corners((0, 0), (600, 300)));
        assert_eq!((rec.image().width(), rec.image().height()), (600, 300));
        assert_eq!((rec.preview().width(), rec.preview().height()), (250, 125));
        assert_eq!(rec.source(), Region::from_corners((0, 0), (600, 300)));
    }

    #[test]
    fn cut_does_not_enlarge_small_preview() {
        let history = CropHistory::new("Trim");
        let rec = record(&history, Region::from_corners((5, 5), (45, 25)));
        assert_eq!((rec.preview().width(), rec.preview().height()), (40, 20));
    }

    #[test]
    fn cut_clamps_to_image() {
        let history = CropHistory::new("Trim");
        let rec = record(&history, Region::from_corners((700, 500), (900, 700)));
        assert_eq!((rec.image().width(), rec.image().height()), (100, 100));
    }

    #[test]
    fn names_are_sequential() {
        let history = filled(3);
        assert_eq!(names(&history), ["Trim 1", "Trim 2", "Trim 3"]);
    }

    #[test]
    fn names_are_not_reused_after_deletion() {
        let mut history = filled(3);
        history.delete_one(2).unwrap();
        history.delete_one(0).unwrap();
        assert_eq!(history.next_name(), "Trim 4");

        history.delete_all();
        assert_eq!(history.next_name(), "Trim 4");
    }

    #[test]
    fn delete_one_keeps_order_of_the_rest() {
        let mut history = filled(4);
        let removed = history.delete_one(1).unwrap();
        assert_eq!(removed.name(), "Trim 2");
        assert_eq!(names(&history), ["Trim 1", "Trim 3", "Trim 4"]);
    }

    #[test]
    fn delete_one_out_of_range() {
        let mut history = filled(2);
        let result = history.delete_one(2);
        assert!(matches!(
            result,
            Err(TrimError::EntryOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn delete_all_reports_count() {
        let mut history = filled(3);
        assert_eq!(history.delete_all(), 3);
        assert!(history.is_empty());
        assert!(history.get(0).is_none());
    }
}
