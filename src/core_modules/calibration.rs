// THEORY:
// Calibration is the optional step that produces the palette. A reference
// image is cropped to one team's shirt, the other team's shirt, or the ball,
// and its mean color becomes the palette entry for that label. Channels are
// rounded to the nearest integer, matching how the palette is stored.
//
// It reuses the same cell averaging as the grid scan, so a palette color means
// exactly what the scanner will compute for a uniform cell of that color.

use crate::core_modules::chunk::chunk::Cell;
use crate::core_modules::color_classifier::{EntityKind, Palette, PaletteEntry};
use crate::core_modules::pixel::pixel::{ColorSample, Frame};
use crate::core_modules::utils::image_helper::image_helper::load_frame;
use crate::error::{Result, VisionError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A pixel rectangle to average over. It is clipped to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Mean color of the whole frame.
pub fn average_color(frame: &Frame<'_>) -> Result<ColorSample> {
    average_region(
        frame,
        Region {
            x: 0,
            y: 0,
            width: frame.width(),
            height: frame.height(),
        },
    )
}

/// Mean color of `region`, clipped to the frame.
pub fn average_region(frame: &Frame<'_>, region: Region) -> Result<ColorSample> {
    let cell = Cell::spanning(frame, region.x, region.y, region.width, region.height);
    if cell.pixel_count() == 0 {
        return Err(VisionError::EmptyRegion);
    }
    Ok(cell.average_color(frame))
}

/// A palette entry for `label` whose color is the rounded mean of `frame`.
pub fn calibrate_entry(frame: &Frame<'_>, label: EntityKind) -> Result<PaletteEntry> {
    let (r, g, b) = average_color(frame)?.rounded();
    Ok(PaletteEntry::new(r, g, b, label))
}

/// Builds a palette from reference images, keeping the order given.
pub fn calibrate_palette<P: AsRef<Path>>(references: &[(EntityKind, P)]) -> Result<Palette> {
    let mut palette = Palette::default();
    for (label, path) in references {
        let frame = load_frame(path)?;
        let entry = calibrate_entry(&frame.view(), *label)?;
        info!(
            label = %label,
            r = entry.r,
            g = entry.g,
            b = entry.b,
            "calibrated from {}",
            path.as_ref().display()
        );
        palette.push(entry);
    }
    Ok(palette)
}
