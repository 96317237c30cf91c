use eframe::egui;

use crate::geometry::{DisplayFit, Region};

/// A press-move-release in progress, in display coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drag {
    pub start: egui::Pos2,
    pub current: egui::Pos2,
}

impl Drag {
    pub fn rect(&self) -> egui::Rect {
        egui::Rect::from_two_pos(self.start, self.current)
    }
}

/// Regions drawn since the last crop, plus the drag currently being drawn.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    drag: Option<Drag>,
    pending: Vec<Region>,
}

impl SelectionTracker {
    pub fn begin(&mut self, pos: egui::Pos2) {
        self.drag = Some(Drag {
            start: pos,
            current: pos,
        });
    }

    pub fn update(&mut self, pos: egui::Pos2) {
        if let Some(drag) = &mut self.drag {
            drag.current = pos;
        }
    }

    /// Finishes the drag and records it through `fit`.
    ///
    /// Returns `None` without recording anything when no drag was started or
    /// the drag covers no original pixels (a plain click).
    pub fn end(&mut self, pos: egui::Pos2, fit: &DisplayFit) -> Option<Region> {
        let drag = self.drag.take()?;
        let region = fit.map_drag(drag.start, pos);
        if region.is_empty() {
            log::debug!("ignoring empty selection at {region}");
            return None;
        }
        self.pending.push(region);
        Some(region)
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    pub fn active_drag(&self) -> Option<Drag> {
        self.drag
    }

    pub fn pending(&self) -> &[Region] {
        &self.pending
    }

    pub fn take_pending(&mut self) -> Vec<Region> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.drag = None;
        self.pending.clear();
    }
}
