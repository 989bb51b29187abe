//! Frame normalization: aspect-preserving crop-and-scale, luminance
//! grayscale, contrast boost, and quantization to the engine's declared
//! input dtype.

use crate::engine::{InputDtype, InputSpec};
use crate::error::PreprocessError;
use common::Frame;

/// Gain of the contrast curve applied after grayscale conversion.
const CONTRAST_GAIN: f32 = 1.5;
/// Exponent of the power-curve contrast transform.
const CONTRAST_CURVE: f32 = 1.5;

/// Payload of a normalized buffer, quantized per the engine's declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferData {
    F32(Vec<f32>),
    U8(Vec<u8>),
}

/// A single-channel image matching an engine's `[1,1,H,W]` input contract.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBuffer {
    pub width: u32,
    pub height: u32,
    pub data: BufferData,
}

impl NormalizedBuffer {
    pub fn len(&self) -> usize {
        match &self.data {
            BufferData::F32(v) => v.len(),
            BufferData::U8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> InputDtype {
        match self.data {
            BufferData::F32(_) => InputDtype::Float32,
            BufferData::U8(_) => InputDtype::Uint8,
        }
    }
}

/// Convert a raw color frame into the engine's input representation.
///
/// Pure function of its inputs. The source is center-cropped to the target
/// aspect ratio and scaled (never stretched), each sampled pixel converted
/// to grayscale with ITU-R 601 luminance weights, then run through a
/// monotonic contrast boost before quantization.
pub fn normalize(frame: &Frame<'_>, spec: &InputSpec) -> Result<NormalizedBuffer, PreprocessError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(PreprocessError::EmptyFrame {
            width: frame.width,
            height: frame.height,
        });
    }

    let channels = frame.format.channels();
    let expected = frame.width as usize * frame.height as usize * channels;
    if frame.pixels.len() < expected {
        return Err(PreprocessError::TruncatedPixels {
            expected,
            actual: frame.pixels.len(),
        });
    }

    let (crop_w, crop_h, off_x, off_y) = crop_region(frame.width, frame.height, spec);

    let src_w = frame.width as usize;
    let target_w = spec.width as usize;
    let target_h = spec.height as usize;
    let mut values = Vec::with_capacity(target_w * target_h);

    for y in 0..target_h {
        let sy = off_y + y * crop_h / target_h;
        for x in 0..target_w {
            let sx = off_x + x * crop_w / target_w;
            let idx = (sy * src_w + sx) * channels;
            let r = frame.pixels[idx] as f32;
            let g = frame.pixels[idx + 1] as f32;
            let b = frame.pixels[idx + 2] as f32;

            let gray = (0.299 * r + 0.587 * g + 0.114 * b) / 255.0;
            let boosted = ((gray - 0.5) * CONTRAST_GAIN + 0.5)
                .clamp(0.0, 1.0)
                .powf(CONTRAST_CURVE);
            values.push(boosted);
        }
    }

    let data = match spec.dtype {
        InputDtype::Float32 => BufferData::F32(values),
        InputDtype::Uint8 => {
            BufferData::U8(values.iter().map(|v| (v * 255.0).round() as u8).collect())
        }
    };

    Ok(NormalizedBuffer {
        width: spec.width,
        height: spec.height,
        data,
    })
}

/// Largest source region with the target aspect ratio, centered on the
/// excess dimension. Returns `(width, height, x_offset, y_offset)` in
/// source pixels.
fn crop_region(width: u32, height: u32, spec: &InputSpec) -> (usize, usize, usize, usize) {
    let src_aspect = width as f32 / height as f32;
    let target_aspect = spec.width as f32 / spec.height as f32;

    if src_aspect > target_aspect {
        let crop_w = ((height as f32 * target_aspect).round() as u32)
            .clamp(1, width);
        (
            crop_w as usize,
            height as usize,
            ((width - crop_w) / 2) as usize,
            0,
        )
    } else {
        let crop_h = ((width as f32 / target_aspect).round() as u32)
            .clamp(1, height);
        (
            width as usize,
            crop_h as usize,
            0,
            ((height - crop_h) / 2) as usize,
        )
    }
}
