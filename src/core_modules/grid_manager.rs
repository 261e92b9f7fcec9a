// THEORY:
// The `GridScanner` turns a decoded frame into a `LabelGrid`: one label (or
// none) per square cell. It is the orchestration step of the spatial layer. It
// does no color math itself. It walks the cells in row-major order, asks each
// `Cell` for its mean color and hands that to the `ColorClassifier`.
//
// Key architectural principles:
// 1.  **Arena Layout**: The grid is a flat `Vec` with a row stride rather than
//     nested vectors. Row-major indexing keeps neighbor lookups in the blob
//     detector cheap and cache friendly.
// 2.  **Full Coverage**: `rows = ceil(height / cell_size)` and
//     `cols = ceil(width / cell_size)`, so the right and bottom strips of a frame
//     that is not cell aligned still get (clipped) cells.
// 3.  **Statelessness**: A scan owns nothing beyond its output. Two frames can be
//     scanned concurrently with the same classifier.
//
// The cost is one visit per pixel regardless of cell size; cell size only
// controls how many labels come out.

use crate::core_modules::chunk::chunk::Cell;
use crate::core_modules::color_classifier::{ColorClassifier, EntityKind};
use crate::core_modules::pixel::pixel::Frame;
use crate::error::{Result, VisionError};
use tracing::debug;

/// A label per cell, stored row-major. `None` means no palette color matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<EntityKind>>,
}

impl LabelGrid {
    /// A grid with every cell unlabelled.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Builds a grid from explicit rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Option<EntityKind>>>) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        debug_assert!(rows.iter().all(|r| r.len() == cols));
        Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<EntityKind> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, label: Option<EntityKind>) {
        let index = self.index(row, col);
        self.cells[index] = label;
    }

    pub fn cells(&self) -> &[Option<EntityKind>] {
        &self.cells
    }

    /// The grid as nested rows, for display and assertions.
    pub fn to_rows(&self) -> Vec<Vec<Option<EntityKind>>> {
        if self.cols == 0 {
            return vec![Vec::new(); self.rows];
        }
        self.cells.chunks(self.cols).map(<[_]>::to_vec).collect()
    }

    pub fn labelled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Partitions frames into square cells and labels each one.
#[derive(Debug, Clone)]
pub struct GridScanner {
    cell_size: u32,
}

impl GridScanner {
    pub fn new(cell_size: u32) -> Result<Self> {
        if cell_size == 0 {
            return Err(VisionError::InvalidCellSize(cell_size));
        }
        Ok(Self { cell_size })
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Grid dimensions `(rows, cols)` for a frame of the given size.
    pub fn dimensions(&self, width: u32, height: u32) -> (usize, usize) {
        (
            height.div_ceil(self.cell_size) as usize,
            width.div_ceil(self.cell_size) as usize,
        )
    }

    /// Labels every cell of `frame`.
    pub fn scan(&self, frame: &Frame<'_>, classifier: &ColorClassifier) -> LabelGrid {
        let (rows, cols) = self.dimensions(frame.width(), frame.height());
        let mut grid = LabelGrid::new(rows, cols);

        for row in 0..rows {
            for col in 0..cols {
                let cell = Cell::at(frame, row as u32, col as u32, self.cell_size);
                let label = classifier.classify(&cell.average_color(frame));
                grid.set(row, col, label);
            }
        }

        debug!(
            rows,
            cols,
            labelled = grid.labelled_count(),
            "scanned frame {}x{}",
            frame.width(),
            frame.height()
        );
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_classifier::{MatchPolicy, Palette, PaletteEntry};
    use crate::core_modules::pixel::pixel::{OwnedFrame, Pixel};

    fn classifier() -> ColorClassifier {
        let palette = Palette::new(vec![
            PaletteEntry::new(237, 28, 36, EntityKind::Team1),
            PaletteEntry::new(255, 242, 0, EntityKind::Team2),
            PaletteEntry::new(164, 76, 163, EntityKind::Ball),
        ]);
        ColorClassifier::new(palette, MatchPolicy::default()).unwrap()
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        assert!(matches!(
            GridScanner::new(0),
            Err(VisionError::InvalidCellSize(0))
        ));
    }

    #[test]
    fn split_frame_yields_two_columns() {
        let mut frame = OwnedFrame::filled(20, 20, Pixel::opaque(237, 28, 36));
        frame.fill_rect(10, 0, 10, 20, Pixel::opaque(255, 242, 0));

        let grid = GridScanner::new(10).unwrap().scan(&frame.view(), &classifier());

        let t1 = Some(EntityKind::Team1);
        let t2 = Some(EntityKind::Team2);
        assert_eq!(grid.to_rows(), vec![vec![t1, t2], vec![t1, t2]]);
    }

    #[test]
    fn unaligned_frame_rounds_grid_up() {
        let frame = OwnedFrame::filled(25, 11, Pixel::opaque(30, 140, 40));
        let grid = GridScanner::new(10).unwrap().scan(&frame.view(), &classifier());
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
        assert_eq!(grid.labelled_count(), 0);
    }

    #[test]
    fn clipped_edge_cell_is_still_classified() {
        // The ball occupies exactly the 5x5 clipped corner cell.
        let mut frame = OwnedFrame::filled(25, 25, Pixel::opaque(30, 140, 40));
        frame.fill_rect(20, 20, 5, 5, Pixel::opaque(164, 76, 163));
        let grid = GridScanner::new(10).unwrap().scan(&frame.view(), &classifier());
        assert_eq!(grid.get(2, 2), Some(EntityKind::Ball));
        assert_eq!(grid.labelled_count(), 1);
    }

    #[test]
    fn get_outside_grid_is_none() {
        let grid = LabelGrid::new(2, 2);
        assert_eq!(grid.get(5, 0), None);
    }
}
