//! 从编码后的字节（PNG、JPEG等）解码图像，并整理为通道优先的布局

use crate::data::{AxisLabels, AxisRole, DataError, SourcewiseTransform, Value};
use crate::tensor::Tensor;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 解码后要转换到的颜色模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// 灰度
    L,
    /// 灰度 + 透明度
    #[serde(rename = "LA")]
    La,
    #[serde(rename = "RGB")]
    Rgb,
    #[serde(rename = "RGBA")]
    Rgba,
}

impl ColorMode {
    fn convert(self, image: DynamicImage) -> DynamicImage {
        match self {
            ColorMode::L => DynamicImage::ImageLuma8(image.to_luma8()),
            ColorMode::La => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
            ColorMode::Rgb => DynamicImage::ImageRgb8(image.to_rgb8()),
            ColorMode::Rgba => DynamicImage::ImageRgba8(image.to_rgba8()),
        }
    }
}

impl FromStr for ColorMode {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(ColorMode::L),
            "LA" => Ok(ColorMode::La),
            "RGB" => Ok(ColorMode::Rgb),
            "RGBA" => Ok(ColorMode::Rgba),
            other => Err(DataError::Config(format!(
                "未知的颜色模式`{}`，可选：L、LA、RGB、RGBA",
                other
            ))),
        }
    }
}

/// 把`[H, W, C]`转为`[C, H, W]`；单通道的`[H, W]`则补上长度为1的通道轴
pub fn to_channel_first(image: Tensor) -> Result<Tensor, DataError> {
    match image.dimension() {
        3 => Ok(image.permute(&[2, 0, 1])),
        2 => Ok(image.unsqueeze(0)),
        rank => Err(DataError::UnsupportedRank(rank)),
    }
}

/// 把字节解码为`[C, H, W]`布局的图像张量。
///
/// 单个样本要求为`Value::Bytes`，批次要求为`Value::BytesList`；
/// 由于各图像尺寸可能不同，批次的输出总是张量列表。
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagesFromBytes {
    color_mode: Option<ColorMode>,
}

impl ImagesFromBytes {
    /// * `color_mode` - 为`None`时保留图像本身的颜色模式
    pub fn new(color_mode: Option<ColorMode>) -> Self {
        Self { color_mode }
    }

    pub fn color_mode(&self) -> Option<ColorMode> {
        self.color_mode
    }

    /// 解码单个图像
    pub fn decode(&self, bytes: &[u8]) -> Result<Tensor, DataError> {
        let mut image = image::load_from_memory(bytes)?;
        if let Some(color_mode) = self.color_mode {
            image = color_mode.convert(image);
        }
        to_channel_first(Tensor::from_dynamic_image(image))
    }
}

impl SourcewiseTransform for ImagesFromBytes {
    fn transform_source_example(
        &mut self,
        example: Value,
        _source_name: &str,
        _labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError> {
        match example {
            Value::Bytes(bytes) => Ok(Value::Tensor(self.decode(&bytes)?)),
            other => Err(DataError::DecodeType(other.kind())),
        }
    }

    fn transform_source_batch(
        &mut self,
        batch: Value,
        source_name: &str,
        _labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError> {
        match batch {
            Value::BytesList(list) => {
                log::debug!("数据源`{}`解码{}张图像", source_name, list.len());
                Ok(Value::TensorList(
                    list.iter()
                        .map(|bytes| self.decode(bytes))
                        .collect::<Result<Vec<_>, _>>()?,
                ))
            }
            other => Err(DataError::DecodeType(other.kind())),
        }
    }

    fn output_example_labels(&self) -> Option<AxisLabels> {
        Some(vec![AxisRole::Channel, AxisRole::Height, AxisRole::Width])
    }
}
