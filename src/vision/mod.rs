/*
 * @Author       : 老董
 * @Description  : 本模块提供计算机视觉相关的数据变换：解码、放大、随机裁剪、随机翻转等。
 *                 在本模块中，不严谨地说：
 *                 1. 所谓的image/图像是指单个样本为`[C, H, W]`的张量，体数据则为`[C, X, Y, Z]`；
 *                 2. “灰度”（图）等同于英文中luma、luminance、grey、gray的概念。
 */

mod bytes;
mod crop;
mod flip;
mod heatmap;
mod minimum;
mod sampler;
mod samplewise;
mod window;

#[cfg(test)]
mod tests;

pub use bytes::{ColorMode, ImagesFromBytes, to_channel_first};
pub use crop::RandomFixedSizeCrop;
pub use flip::{RandomSpatialFlip, flip_example};
pub use heatmap::{Heatmap, calculate_heatmap};
pub use minimum::{MinimumImageDimensions, ResampleFilter};
pub use sampler::{CropSampler, check_window, max_offsets};
pub use samplewise::SamplewiseCrop;
pub use window::{extract_window, extract_windows};

use crate::data::{AxisLabels, AxisRole, DataError, SourcewiseTransform, Value};
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;
use std::path::Path;

/// 可以放进`SourcewiseTransformer`的全部图像变换，便于按配置组装变换链
#[enum_dispatch(SourcewiseTransform)]
#[derive(Debug, Clone)]
pub enum ImageTransform {
    ImagesFromBytes(ImagesFromBytes),
    MinimumImageDimensions(MinimumImageDimensions),
    RandomFixedSizeCrop(RandomFixedSizeCrop),
    RandomSpatialFlip(RandomSpatialFlip),
}

pub struct Vision;

impl Vision {
    /// 将本地的图像加载到Tensor中，布局与解码器一致：单通道为`[H, W]`，多通道为`[H, W, C]`
    pub fn load_image<P: AsRef<Path>>(path: P) -> Result<Tensor, DataError> {
        let image = image::open(path)?;
        Ok(Tensor::from_dynamic_image(image))
    }

    /// 解码内存中的图像并转为`[C, H, W]`布局
    /// * `color_mode` - 为`None`时保留图像本身的颜色模式
    pub fn decode_image(bytes: &[u8], color_mode: Option<ColorMode>) -> Result<Tensor, DataError> {
        ImagesFromBytes::new(color_mode).decode(bytes)
    }
}
