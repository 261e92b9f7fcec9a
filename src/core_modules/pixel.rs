// THEORY:
// The `Pixel` module holds the raw data types every later stage reads from. A
// `Frame` is a borrowed, immutable view over a caller-owned RGBA buffer; the
// engine never copies or mutates it. `OwnedFrame` exists for the places that
// must move a frame across a task boundary (the parallel pipeline, the CLI).
//
// `Pixel` is a "dumb" container for one RGBA value. `ColorSample` is the
// floating-point mean of a cell's RGB channels: it lives for exactly one
// classification and is never stored.

pub mod pixel {
    use crate::error::{Result, VisionError};
    use serde::{Deserialize, Serialize};

    pub type Byte = u8;
    pub type Bytes = Vec<Byte>;
    pub type Channel = Byte;

    pub const CHANNELS: usize = 4;

    /// A "dumb" data container representing a single RGBA pixel.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Pixel {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
        /// The alpha (transparency) channel value (0-255). Ignored by classification.
        pub alpha: Channel,
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel {
                red,
                green,
                blue,
                alpha,
            }
        }

        pub const fn opaque(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel::new(red, green, blue, 255)
        }
    }

    impl From<[Byte; CHANNELS]> for Pixel {
        fn from(bytes: [Byte; CHANNELS]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
        }
    }

    impl From<Pixel> for Bytes {
        fn from(pixel: Pixel) -> Self {
            vec![pixel.red, pixel.green, pixel.blue, pixel.alpha]
        }
    }

    /// Mean RGB of a region, each channel in [0, 255].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
    pub struct ColorSample {
        pub r: f64,
        pub g: f64,
        pub b: f64,
    }

    impl ColorSample {
        pub fn new(r: f64, g: f64, b: f64) -> Self {
            Self { r, g, b }
        }

        /// Euclidean distance in RGB space.
        pub fn distance(&self, other: &ColorSample) -> f64 {
            ((self.r - other.r).powi(2) + (self.g - other.g).powi(2) + (self.b - other.b).powi(2))
                .sqrt()
        }

        /// Per-channel rounding to the nearest integer, clamped to a byte.
        pub fn rounded(&self) -> (u8, u8, u8) {
            let round = |v: f64| v.round().clamp(0.0, 255.0) as u8;
            (round(self.r), round(self.g), round(self.b))
        }
    }

    /// A read-only view of a decoded RGBA frame in row-major order.
    #[derive(Debug, Clone, Copy)]
    pub struct Frame<'a> {
        width: u32,
        height: u32,
        pixels: &'a [u8],
    }

    impl<'a> Frame<'a> {
        /// Wraps `pixels`, which must hold exactly `width * height * 4` bytes.
        pub fn new(width: u32, height: u32, pixels: &'a [u8]) -> Result<Self> {
            let expected = width as usize * height as usize * CHANNELS;
            if pixels.len() != expected {
                return Err(VisionError::FrameSizeMismatch {
                    expected,
                    actual: pixels.len(),
                });
            }
            Ok(Self {
                width,
                height,
                pixels,
            })
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn as_bytes(&self) -> &'a [u8] {
            self.pixels
        }

        /// The pixel at (`x`, `y`), or `None` outside the frame.
        pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
            if x >= self.width || y >= self.height {
                return None;
            }
            let start = (y as usize * self.width as usize + x as usize) * CHANNELS;
            let bytes: [Byte; CHANNELS] = self.pixels.get(start..start + CHANNELS)?.try_into().ok()?;
            Some(Pixel::from(bytes))
        }

        /// The RGBA bytes of row `y`, clipped to `[x_start, x_end)`.
        pub(crate) fn row_span(&self, y: u32, x_start: u32, x_end: u32) -> &'a [u8] {
            let row = y as usize * self.width as usize;
            let start = (row + x_start as usize) * CHANNELS;
            let end = (row + x_end as usize) * CHANNELS;
            &self.pixels[start..end]
        }
    }

    /// An owned frame buffer, for handing frames between tasks. The buffer
    /// length always matches the dimensions.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct OwnedFrame {
        width: u32,
        height: u32,
        pixels: Bytes,
    }

    impl OwnedFrame {
        pub fn new(width: u32, height: u32, pixels: Bytes) -> Result<Self> {
            Frame::new(width, height, &pixels)?;
            Ok(Self {
                width,
                height,
                pixels,
            })
        }

        /// A frame of one solid color.
        pub fn filled(width: u32, height: u32, pixel: Pixel) -> Self {
            let bytes: Bytes = pixel.into();
            let pixels = bytes.repeat(width as usize * height as usize);
            Self {
                width,
                height,
                pixels,
            }
        }

        /// Paints the rectangle `[x, x+w) x [y, y+h)`, clipped to the frame.
        pub fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, pixel: Pixel) {
            let x_end = x.saturating_add(w).min(self.width);
            let y_end = y.saturating_add(h).min(self.height);
            for py in y.min(self.height)..y_end {
                for px in x.min(self.width)..x_end {
                    let start = (py as usize * self.width as usize + px as usize) * CHANNELS;
                    self.pixels[start..start + CHANNELS]
                        .copy_from_slice(&[pixel.red, pixel.green, pixel.blue, pixel.alpha]);
                }
            }
        }

        pub fn width(&self) -> u32 {
            self.width
        }

        pub fn height(&self) -> u32 {
            self.height
        }

        pub fn pixels(&self) -> &[u8] {
            &self.pixels
        }

        pub fn into_raw(self) -> Bytes {
            self.pixels
        }

        pub fn view(&self) -> Frame<'_> {
            Frame {
                width: self.width,
                height: self.height,
                pixels: &self.pixels,
            }
        }
    }
}
