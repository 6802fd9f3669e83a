use candle_core::{Device, Tensor};
use image::{DynamicImage, imageops::FilterType};

use crate::error::OcrError;

/// Channel statistics shared by both eval transforms.
const NORM_MEAN: [f32; 3] = [0.48145466, 0.4578275, 0.40821073];
const NORM_STD: [f32; 3] = [0.26862954, 0.26130258, 0.27577711];

/// Global-feature view resolution.
pub const DEFAULT_CONTEXT_SIZE: u32 = 224;
/// Fine-text view resolution; this is the tensor generation consumes.
pub const DEFAULT_DETAIL_SIZE: u32 = 1024;

/// The two fixed-shape views extracted from one canonical image. Only
/// `detail` travels into the generation request; `context` is produced for
/// parity with the dual-encoder design and dropped before dispatch.
#[derive(Debug, Clone)]
pub struct ImageTensorPair {
    pub context: Tensor,
    pub detail: Tensor,
}

/// Stateless dual-resolution preprocessor. Both transforms are pure functions
/// of pixel data: bicubic resize to a fixed square, scale to `[0, 1]`, then
/// per-channel normalisation.
#[derive(Debug, Clone)]
pub struct DualPreprocessor {
    context_size: u32,
    detail_size: u32,
}

impl Default for DualPreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_SIZE, DEFAULT_DETAIL_SIZE)
    }
}

impl DualPreprocessor {
    pub fn new(context_size: u32, detail_size: u32) -> Self {
        Self {
            context_size,
            detail_size,
        }
    }

    pub fn preprocess(&self, image: &DynamicImage) -> Result<ImageTensorPair, OcrError> {
        Ok(ImageTensorPair {
            context: eval_transform(image, self.context_size)?,
            detail: eval_transform(image, self.detail_size)?,
        })
    }
}

fn eval_transform(image: &DynamicImage, size: u32) -> Result<Tensor, OcrError> {
    let rgb = image.to_rgb8();
    let resized = image::imageops::resize(&rgb, size, size, FilterType::CatmullRom);
    let side = size as usize;
    let mut data = Vec::with_capacity(3 * side * side);
    for channel in 0..3usize {
        for y in 0..size {
            for x in 0..size {
                let value = resized.get_pixel(x, y)[channel] as f32 / 255.0;
                data.push((value - NORM_MEAN[channel]) / NORM_STD[channel]);
            }
        }
    }
    Ok(Tensor::from_vec(data, (3, side, side), &Device::Cpu)?)
}
