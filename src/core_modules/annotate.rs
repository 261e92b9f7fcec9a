// Overlay rendering for inspecting an analysis by eye. Everything outside an
// entity's box is dimmed, and each entity is outlined in its palette color.
// The player in possession gets a thicker outline.

use crate::core_modules::color_classifier::{EntityKind, Palette};
use crate::core_modules::entity::{Entity, FrameAnalysis};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

const DIM_FACTOR: f32 = 0.4;
const OUTLINE: u32 = 1;
const POSSESSION_OUTLINE: u32 = 3;

fn outline_color(kind: EntityKind, palette: &Palette) -> Rgba<u8> {
    match palette.color_of(kind) {
        Some(entry) => Rgba([entry.r, entry.g, entry.b, 255]),
        None => Rgba([255, 255, 255, 255]),
    }
}

fn inside(entity: &Entity, x: u32, y: u32) -> bool {
    x >= entity.x && x < entity.x + entity.width && y >= entity.y && y < entity.y + entity.height
}

/// Multiplies every pixel outside all entity boxes by `DIM_FACTOR`.
fn apply_dimming(image: &mut RgbaImage, analysis: &FrameAnalysis) {
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if analysis.entities().any(|e| inside(e, x, y)) {
            continue;
        }
        for channel in pixel.0.iter_mut().take(3) {
            *channel = (*channel as f32 * DIM_FACTOR) as u8;
        }
    }
}

/// Draws a `thickness`-pixel outline just inside the entity's box, clipped to the image.
fn draw_outline(image: &mut RgbaImage, entity: &Entity, color: Rgba<u8>, thickness: u32) {
    for inset in 0..thickness {
        let width = entity.width.saturating_sub(2 * inset);
        let height = entity.height.saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        let (Ok(x), Ok(y)) = (i32::try_from(entity.x + inset), i32::try_from(entity.y + inset)) else {
            break;
        };
        draw_hollow_rect_mut(image, Rect::at(x, y).of_size(width, height), color);
    }
}

/// Dims the background of `image` and outlines every entity of `analysis`.
pub fn draw_analysis(image: &mut RgbaImage, analysis: &FrameAnalysis, palette: &Palette) {
    apply_dimming(image, analysis);

    for (index, entity) in analysis.team1.iter().enumerate() {
        let thickness = if analysis.player_in_possession == Some(index) {
            POSSESSION_OUTLINE
        } else {
            OUTLINE
        };
        draw_outline(image, entity, outline_color(entity.kind, palette), thickness);
    }
    for entity in analysis.team2.iter().chain(analysis.ball.iter()) {
        draw_outline(image, entity, outline_color(entity.kind, palette), OUTLINE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color_classifier::PaletteEntry;

    #[test]
    fn outlines_entity_and_dims_background() {
        let mut image = RgbaImage::from_pixel(20, 20, Rgba([100, 100, 100, 255]));
        let palette = Palette::new(vec![PaletteEntry::new(237, 28, 36, EntityKind::Team1)]);
        let analysis = FrameAnalysis {
            team1: vec![Entity::new(EntityKind::Team1, 5, 5, 10, 10)],
            ..FrameAnalysis::default()
        };

        draw_analysis(&mut image, &analysis, &palette);

        assert_eq!(image.get_pixel(0, 0), &Rgba([40, 40, 40, 255]));
        assert_eq!(image.get_pixel(5, 5), &Rgba([237, 28, 36, 255]));
        assert_eq!(image.get_pixel(14, 14), &Rgba([237, 28, 36, 255]));
        // Interior is untouched.
        assert_eq!(image.get_pixel(10, 10), &Rgba([100, 100, 100, 255]));
    }

    #[test]
    fn box_past_the_edge_is_clipped() {
        let mut image = RgbaImage::new(10, 10);
        let palette = Palette::default();
        let analysis = FrameAnalysis {
            ball: Some(Entity::new(EntityKind::Ball, 5, 5, 10, 10)),
            ..FrameAnalysis::default()
        };
        draw_analysis(&mut image, &analysis, &palette);
        assert_eq!(image.get_pixel(5, 9), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn possessor_outline_is_thicker() {
        let grey = Rgba([100, 100, 100, 255]);
        let mut image = RgbaImage::from_pixel(30, 30, grey);
        let palette = Palette::new(vec![PaletteEntry::new(237, 28, 36, EntityKind::Team1)]);
        let analysis = FrameAnalysis {
            team1: vec![Entity::new(EntityKind::Team1, 5, 5, 20, 20)],
            player_in_possession: Some(0),
            ..FrameAnalysis::default()
        };

        draw_analysis(&mut image, &analysis, &palette);

        let red = Rgba([237, 28, 36, 255]);
        assert_eq!(image.get_pixel(7, 7), &red);
        assert_eq!(image.get_pixel(22, 15), &red);
        assert_eq!(image.get_pixel(8, 8), &grey);
        assert_eq!(image.get_pixel(21, 15), &grey);
    }
}
