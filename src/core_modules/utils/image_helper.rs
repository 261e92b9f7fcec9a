// Decoding and encoding sit at the edge of the engine. The core only ever sees
// an RGBA buffer with a known width and height; these helpers produce one from
// a file and write one back out.

pub mod image_helper {
    use crate::core_modules::pixel::pixel::OwnedFrame;
    use crate::error::Result;
    use image::{ImageEncoder, RgbaImage};
    use std::path::Path;

    /// Decodes any format `image` understands into an RGBA frame.
    pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<OwnedFrame> {
        let rgba = load_rgba(path)?;
        let (width, height) = rgba.dimensions();
        OwnedFrame::new(width, height, rgba.into_raw())
    }

    pub fn load_rgba<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
        Ok(image::open(path)?.to_rgba8())
    }

    /// Writes an RGBA buffer as PNG.
    pub fn save_rgba<P: AsRef<Path>>(path: P, width: u32, height: u32, buffer: &[u8]) -> Result<()> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);
        encoder.write_image(buffer, width, height, image::ExtendedColorType::Rgba8)?;
        Ok(())
    }

    pub fn save_frame<P: AsRef<Path>>(path: P, frame: &OwnedFrame) -> Result<()> {
        save_rgba(path, frame.width(), frame.height(), frame.pixels())
    }

    pub fn to_image(frame: OwnedFrame) -> RgbaImage {
        let (width, height) = (frame.width(), frame.height());
        // The buffer length always matches the dimensions, so `from_raw` cannot fail.
        RgbaImage::from_raw(width, height, frame.into_raw())
            .unwrap_or_else(|| RgbaImage::new(width, height))
    }
}

#[cfg(test)]
mod tests {

    use super::image_helper::*;
    use crate::core_modules::pixel::pixel::{OwnedFrame, Pixel};

    #[test]
    fn saved_frame_loads_back_identically() {
        let mut frame = OwnedFrame::filled(40, 30, Pixel::opaque(30, 140, 40));
        frame.fill_rect(10, 10, 10, 10, Pixel::opaque(237, 28, 36));
        let dir = tempfile::tempdir().expect("Error Creating Temp Dir.");
        let path = dir.path().join("roundtrip.png");

        save_frame(&path, &frame).expect("Error Saving File.");
        let loaded = load_frame(&path).expect("Error Loading File.");

        assert_eq!(loaded, frame);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("Error Creating Temp Dir.");
        assert!(load_frame(dir.path().join("does_not_exist.png")).is_err());
    }

    #[test]
    fn owned_frame_converts_to_image() {
        let mut frame = OwnedFrame::filled(3, 2, Pixel::opaque(1, 2, 3));
        frame.fill_rect(2, 1, 1, 1, Pixel::opaque(9, 8, 7));
        let image = to_image(frame);
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [9, 8, 7, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }
}
