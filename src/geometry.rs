use std::fmt;

use eframe::egui;

/// Rectangle in original-image pixel space with `x1 <= x2` and `y1 <= y2`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Region {
    /// Builds a region from two opposite corners given in any order.
    pub fn from_corners(a: (u32, u32), b: (u32, u32)) -> Self {
        Self {
            x1: a.0.min(b.0),
            y1: a.1.min(b.1),
            x2: a.0.max(b.0),
            y2: a.1.max(b.1),
        }
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Cuts the region down to an image of `width` x `height`.
    pub fn clamped(&self, width: u32, height: u32) -> Self {
        Self {
            x1: self.x1.min(width),
            y1: self.y1.min(height),
            x2: self.x2.min(width),
            y2: self.y2.min(height),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// How an image of `original` size is shown inside a viewport.
///
/// The fit keeps the aspect ratio and only ever shrinks, so a small image is
/// shown 1:1. Display coordinates are relative to the displayed image's top
/// left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayFit {
    original: [u32; 2],
    displayed: [u32; 2],
}

impl DisplayFit {
    pub fn new(original: [u32; 2], viewport: egui::Vec2) -> Self {
        let [w, h] = [original[0].max(1), original[1].max(1)];
        let view_w = f64::from(viewport.x.max(1.0));
        let view_h = f64::from(viewport.y.max(1.0));

        let scale = (view_w / f64::from(w)).min(view_h / f64::from(h)).min(1.0);
        let fit_side = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, side);

        Self {
            original: [w, h],
            displayed: [fit_side(w), fit_side(h)],
        }
    }

    pub fn displayed_size(&self) -> [u32; 2] {
        self.displayed
    }

    pub fn displayed_vec2(&self) -> egui::Vec2 {
        egui::vec2(self.displayed[0] as f32, self.displayed[1] as f32)
    }

    /// Original pixels per displayed pixel, per axis.
    pub fn ratio(&self) -> (f64, f64) {
        (
            f64::from(self.original[0]) / f64::from(self.displayed[0]),
            f64::from(self.original[1]) / f64::from(self.displayed[1]),
        )
    }

    /// Maps a display point to original pixel space, rounding down.
    /// Points outside the displayed image are pulled onto its border.
    pub fn to_original(&self, pos: egui::Pos2) -> (u32, u32) {
        let (ratio_x, ratio_y) = self.ratio();
        let x = f64::from(pos.x.clamp(0.0, self.displayed[0] as f32)) * ratio_x;
        let y = f64::from(pos.y.clamp(0.0, self.displayed[1] as f32)) * ratio_y;
        (
            (x.floor() as u32).min(self.original[0]),
            (y.floor() as u32).min(self.original[1]),
        )
    }

    /// Maps the rectangle spanned by a drag onto original pixel space.
    pub fn map_drag(&self, start: egui::Pos2, end: egui::Pos2) -> Region {
        Region::from_corners(self.to_original(start), self.to_original(end))
    }

    /// Where a region appears on the displayed image.
    pub fn to_display(&self, region: Region) -> egui::Rect {
        let (ratio_x, ratio_y) = self.ratio();
        let scale = |v: u32, ratio: f64| (f64::from(v) / ratio) as f32;
        egui::Rect::from_min_max(
            egui::pos2(scale(region.x1, ratio_x), scale(region.y1, ratio_y)),
            egui::pos2(scale(region.x2, ratio_x), scale(region.y2, ratio_y)),
        )
    }
}
