// THEORY:
// The `BlobDetector` is the engine of the spatial grouping layer. It is a plain
// connected-component labelling pass over the `LabelGrid`.
//
// Algorithm:
// 1.  **Row-Major Seeding**: Cells are visited in row-major order. Every
//     unvisited cell carrying a label seeds a new region. Scan order fixes the
//     output order, so the same grid always yields the same blob list.
// 2.  **Region Growing**: From the seed, a depth-first walk follows the 4 direct
//     neighbors (no diagonals) through cells with the *same* label. Adjacent
//     regions with different labels never merge.
// 3.  **Explicit Work List**: The walk uses a `Vec` as a stack instead of
//     recursion, so a region covering the whole frame cannot exhaust the call
//     stack. A flat `visited` array with the grid's row stride marks every cell
//     exactly once.
// 4.  **Data Aggregation**: The bounding box and cell count accumulate while the
//     region grows, so no second pass over the region is needed.
// 5.  **Stateless Utility**: `find_blobs` takes one grid and returns one list.

use crate::core_modules::grid_manager::LabelGrid;
use crate::core_modules::smart_blob::{Blob, Point};

pub mod blob_detector {
    use super::*; // Make structs from parent module available.

    const NEIGHBORS: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

    /// Groups every labelled cell of `grid` into exactly one blob.
    pub fn find_blobs(grid: &LabelGrid) -> Vec<Blob> {
        let mut visited = vec![false; grid.len()];
        let mut stack: Vec<Point> = Vec::new();
        let mut blobs: Vec<Blob> = Vec::new();

        for row in 0..grid.rows() {
            for col in 0..grid.cols() {
                let index = grid.index(row, col);
                if visited[index] {
                    continue;
                }
                let Some(label) = grid.cells()[index] else {
                    continue;
                };

                let seed = Point { row, col };
                visited[index] = true;
                stack.push(seed);
                let mut blob = Blob::seed(label, seed);

                while let Some(current) = stack.pop() {
                    for (dr, dc) in NEIGHBORS {
                        let Some(next) = neighbor(grid, current, dr, dc) else {
                            continue;
                        };
                        let next_index = grid.index(next.row, next.col);
                        if !visited[next_index] && grid.cells()[next_index] == Some(label) {
                            visited[next_index] = true;
                            blob.include(next);
                            stack.push(next);
                        }
                    }
                }

                blobs.push(blob);
            }
        }

        blobs
    }

    fn neighbor(grid: &LabelGrid, at: Point, dr: isize, dc: isize) -> Option<Point> {
        let row = at.row.checked_add_signed(dr)?;
        let col = at.col.checked_add_signed(dc)?;
        (row < grid.rows() && col < grid.cols()).then_some(Point { row, col })
    }
}

#[cfg(test)]
mod tests {
    use super::blob_detector::find_blobs;
    use super::*;
    use crate::core_modules::color_classifier::EntityKind;

    const A: Option<EntityKind> = Some(EntityKind::Team1);
    const B: Option<EntityKind> = Some(EntityKind::Team2);
    const O: Option<EntityKind> = Some(EntityKind::Ball);
    const N: Option<EntityKind> = None;

    /// Every labelled cell sits in exactly one blob, and each blob box is tight.
    fn assert_partition(grid: &LabelGrid, blobs: &[Blob]) {
        let total: usize = blobs.iter().map(|b| b.size_in_cells).sum();
        assert_eq!(total, grid.labelled_count());

        for blob in blobs {
            let mut touches = (false, false, false, false);
            for row in blob.min_row..=blob.max_row {
                for col in blob.min_col..=blob.max_col {
                    if grid.get(row, col) == Some(blob.label) {
                        touches.0 |= row == blob.min_row;
                        touches.1 |= row == blob.max_row;
                        touches.2 |= col == blob.min_col;
                        touches.3 |= col == blob.max_col;
                    }
                }
            }
            assert_eq!(touches, (true, true, true, true), "loose box {blob:?}");
        }
    }

    #[test]
    fn empty_grid_has_no_blobs() {
        let grid = LabelGrid::from_rows(vec![vec![N, N], vec![N, N]]);
        assert!(find_blobs(&grid).is_empty());
    }

    #[test]
    fn adjacent_labels_stay_separate() {
        let grid = LabelGrid::from_rows(vec![vec![A, B], vec![A, B]]);
        let blobs = find_blobs(&grid);
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].label, EntityKind::Team1);
        assert_eq!((blobs[0].height_in_cells(), blobs[0].width_in_cells()), (2, 1));
        assert_eq!(blobs[1].label, EntityKind::Team2);
        assert_eq!((blobs[1].min_col, blobs[1].max_col), (1, 1));
        assert_partition(&grid, &blobs);
    }

    #[test]
    fn diagonal_cells_are_not_connected() {
        let grid = LabelGrid::from_rows(vec![vec![A, N], vec![N, A]]);
        let blobs = find_blobs(&grid);
        assert_eq!(blobs.len(), 2);
        assert!(blobs.iter().all(|b| b.size_in_cells == 1));
    }

    #[test]
    fn u_shape_is_one_blob_with_tight_box() {
        let grid = LabelGrid::from_rows(vec![
            vec![A, N, A],
            vec![A, N, A],
            vec![A, A, A],
            vec![N, N, O],
        ]);
        let blobs = find_blobs(&grid);
        assert_eq!(blobs.len(), 2);
        let u = &blobs[0];
        assert_eq!((u.min_row, u.min_col, u.max_row, u.max_col), (0, 0, 2, 2));
        assert_eq!(u.size_in_cells, 7);
        assert_eq!(blobs[1].label, EntityKind::Ball);
        assert_partition(&grid, &blobs);
    }

    #[test]
    fn large_region_does_not_recurse() {
        let grid = LabelGrid::from_rows(vec![vec![A; 600]; 600]);
        let blobs = find_blobs(&grid);
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].size_in_cells, 360_000);
    }

    #[test]
    fn output_order_is_row_major_and_repeatable() {
        let grid = LabelGrid::from_rows(vec![
            vec![N, B, N, O],
            vec![A, N, N, N],
            vec![N, N, A, A],
        ]);
        let first = find_blobs(&grid);
        let second = find_blobs(&grid);
        assert_eq!(first, second);
        let labels: Vec<_> = first.iter().map(|b| b.label).collect();
        assert_eq!(
            labels,
            vec![EntityKind::Team2, EntityKind::Ball, EntityKind::Team1, EntityKind::Team1]
        );
        assert_partition(&grid, &first);
    }
}
