// THEORY:
// A `Cell` is one square sampling unit of the grid. It is the bridge between
// raw pixels and labels: everything below it is bytes, everything above it is
// semantics.
//
// Key architectural principles:
// 1.  **Spatial Pooling**: Averaging a 10x10 block turns a hundred noisy pixels
//     into one color sample, which is what the classifier sees. Single-pixel
//     noise and anti-aliased edges are diluted instead of producing labels.
// 2.  **Edge Clipping**: Cells on the last row or column may hang past the
//     frame. The summing loop is bounded by the frame's real width and height,
//     so a clipped cell averages only the pixels it actually covers. It never
//     reads out of bounds and never fails.
// 3.  **Zero Copy**: A cell is just coordinates. The average is computed by
//     reading row spans straight out of the borrowed frame buffer.

pub mod chunk {
    use crate::core_modules::pixel::pixel::{CHANNELS, ColorSample, Frame};

    /// One grid cell, in pixel coordinates. The far edges are exclusive and
    /// already clipped to the frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Cell {
        pub row: u32,
        pub col: u32,
        pub x_start: u32,
        pub y_start: u32,
        pub x_end: u32,
        pub y_end: u32,
    }

    impl Cell {
        /// The cell at (`row`, `col`) of a grid with square cells of `cell_size` pixels.
        pub fn at(frame: &Frame<'_>, row: u32, col: u32, cell_size: u32) -> Self {
            let x_start = col.saturating_mul(cell_size).min(frame.width());
            let y_start = row.saturating_mul(cell_size).min(frame.height());
            Self {
                row,
                col,
                x_start,
                y_start,
                x_end: x_start.saturating_add(cell_size).min(frame.width()),
                y_end: y_start.saturating_add(cell_size).min(frame.height()),
            }
        }

        /// An arbitrary `width` x `height` rectangle at (`x`, `y`), clipped to the frame.
        pub fn spanning(frame: &Frame<'_>, x: u32, y: u32, width: u32, height: u32) -> Self {
            let x_start = x.min(frame.width());
            let y_start = y.min(frame.height());
            Self {
                row: 0,
                col: 0,
                x_start,
                y_start,
                x_end: x_start.saturating_add(width).min(frame.width()),
                y_end: y_start.saturating_add(height).min(frame.height()),
            }
        }

        pub fn pixel_count(&self) -> u64 {
            (self.x_end - self.x_start) as u64 * (self.y_end - self.y_start) as u64
        }

        /// The arithmetic mean of R, G and B over the cell's pixels. Alpha is ignored.
        pub fn average_color(&self, frame: &Frame<'_>) -> ColorSample {
            let num_pixels = self.pixel_count();
            if num_pixels == 0 {
                return ColorSample::default();
            }

            let mut sum_r = 0u64;
            let mut sum_g = 0u64;
            let mut sum_b = 0u64;

            for y in self.y_start..self.y_end {
                for pixel in frame.row_span(y, self.x_start, self.x_end).chunks_exact(CHANNELS) {
                    sum_r += pixel[0] as u64;
                    sum_g += pixel[1] as u64;
                    sum_b += pixel[2] as u64;
                }
            }

            let count = num_pixels as f64;
            ColorSample::new(sum_r as f64 / count, sum_g as f64 / count, sum_b as f64 / count)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::chunk::Cell;
    use crate::core_modules::pixel::pixel::{ColorSample, OwnedFrame, Pixel};

    #[test]
    fn average_of_uniform_cell_is_that_color() {
        let frame = OwnedFrame::filled(10, 10, Pixel::new(237, 28, 36, 0));
        let view = frame.view();
        let cell = Cell::at(&view, 0, 0, 10);
        assert_eq!(cell.average_color(&view), ColorSample::new(237.0, 28.0, 36.0));
    }

    #[test]
    fn average_mixes_halves() {
        let mut frame = OwnedFrame::filled(4, 4, Pixel::opaque(0, 0, 0));
        frame.fill_rect(0, 0, 2, 4, Pixel::opaque(200, 100, 50));
        let view = frame.view();
        let cell = Cell::at(&view, 0, 0, 4);
        assert_eq!(cell.average_color(&view), ColorSample::new(100.0, 50.0, 25.0));
    }

    #[test]
    fn edge_cell_is_clipped_to_frame() {
        // 25x25 frame with 10px cells: the last cell is 5x5.
        let mut frame = OwnedFrame::filled(25, 25, Pixel::opaque(0, 0, 0));
        frame.fill_rect(20, 20, 5, 5, Pixel::opaque(90, 90, 90));
        let view = frame.view();
        let cell = Cell::at(&view, 2, 2, 10);
        assert_eq!((cell.x_end, cell.y_end), (25, 25));
        assert_eq!(cell.pixel_count(), 25);
        assert_eq!(cell.average_color(&view), ColorSample::new(90.0, 90.0, 90.0));
    }
}
