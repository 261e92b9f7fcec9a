// THEORY:
// A `Blob` is one maximal 4-connected region of identically labelled cells,
// summarized by its inclusive bounding box in cell coordinates. It is a "dumb"
// data container: it knows its label, its extent and how many cells it covers,
// and how to project itself into pixel space. It has no memory of other
// frames.

use crate::core_modules::color_classifier::EntityKind;
use serde::{Deserialize, Serialize};

/// A simple struct to represent a cell coordinate on the label grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

/// A connected region of same-labelled cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    /// The label shared by every cell in the region.
    pub label: EntityKind,
    /// Inclusive bounding box, in cell indices.
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
    /// Number of cells in the region (not the area of the box).
    pub size_in_cells: usize,
}

impl Blob {
    /// A single-cell blob, grown with [`Blob::include`].
    pub fn seed(label: EntityKind, at: Point) -> Self {
        Self {
            label,
            min_row: at.row,
            min_col: at.col,
            max_row: at.row,
            max_col: at.col,
            size_in_cells: 1,
        }
    }

    /// Extends the box to cover `at` and counts it.
    pub fn include(&mut self, at: Point) {
        self.min_row = self.min_row.min(at.row);
        self.min_col = self.min_col.min(at.col);
        self.max_row = self.max_row.max(at.row);
        self.max_col = self.max_col.max(at.col);
        self.size_in_cells += 1;
    }

    pub fn height_in_cells(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn width_in_cells(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// Pixel-space box `(x, y, width, height)` for square cells of `cell_size` pixels.
    pub fn pixel_bounds(&self, cell_size: u32) -> (u32, u32, u32, u32) {
        let cell = cell_size as usize;
        (
            (self.min_col * cell) as u32,
            (self.min_row * cell) as u32,
            (self.width_in_cells() * cell) as u32,
            (self.height_in_cells() * cell) as u32,
        )
    }
}
