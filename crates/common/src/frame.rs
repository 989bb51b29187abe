use image::DynamicImage;

/// Pixel layout of a raw video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel for this layout.
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// A borrowed view of a raw color frame supplied by the camera layer.
///
/// The pipeline never owns frame data; it reads the pixels, produces a
/// normalized buffer, and returns. Dimensions are not validated here --
/// preprocessing rejects malformed frames explicitly.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: &'a [u8],
}

/// Owned frame storage, for callers that need to hand frames across task
/// boundaries or build them from decoded images.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Build an owned RGB frame from a decoded image.
    pub fn from_image(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self {
            width,
            height,
            format: PixelFormat::Rgb,
            pixels: rgb.into_raw(),
        }
    }

    pub fn as_frame(&self) -> Frame<'_> {
        Frame {
            width: self.width,
            height: self.height,
            format: self.format,
            pixels: &self.pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts() {
        assert_eq!(PixelFormat::Rgb.channels(), 3);
        assert_eq!(PixelFormat::Rgba.channels(), 4);
    }

    #[test]
    fn frame_buffer_round_trip() {
        let pixels = vec![0u8; 4 * 2 * 3];
        let buffer = FrameBuffer::new(4, 2, PixelFormat::Rgb, pixels);
        let frame = buffer.as_frame();
        assert_eq!(frame.width, 4);
        assert_eq!(frame.height, 2);
        assert_eq!(frame.pixels.len(), 24);
    }
}
