/*
 * @Author       : 老董
 * @Description  : 把尺寸不足的图像放大到最小尺寸，尺寸足够的图像原样通过
 */

use crate::data::axis_labels::with_batch_axis;
use crate::data::{AxisLabels, AxisRole, BatchTransform, DataError, LabelCheck, SourcewiseTransform, Value};
use crate::tensor::Tensor;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::{Array2, ArrayD, ArrayView2, Axis, Ix2, IxDyn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 放大图像时使用的重采样滤波器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos,
}

impl From<ResampleFilter> for FilterType {
    fn from(filter: ResampleFilter) -> Self {
        match filter {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::Bicubic => FilterType::CatmullRom,
            ResampleFilter::Lanczos => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResampleFilter::Nearest),
            "bilinear" => Ok(ResampleFilter::Bilinear),
            "bicubic" => Ok(ResampleFilter::Bicubic),
            "lanczos" => Ok(ResampleFilter::Lanczos),
            _ => Err(DataError::Config(format!(
                "未知的重采样滤波器`{}`，可选：nearest、bilinear、bicubic、lanczos",
                s
            ))),
        }
    }
}

/// 最小图像尺寸。
/// 接受`[H, W]`或`[C, H, W]`的样本、样本列表以及稠密批次，输出的表示方式与输入一致。
/// 若高或宽小于最小值，则两个轴按同一倍数`max(1, min_w / w, min_h / h)`放大并向上取整，
/// 因此宽高比基本保持不变；不会缩小任何图像。
#[derive(Debug, Clone)]
pub struct MinimumImageDimensions {
    min_height: usize,
    min_width: usize,
    filter: ResampleFilter,
    label_check: LabelCheck,
}

impl MinimumImageDimensions {
    /// * `minimum_shape` - `(height, width)`
    pub fn new(minimum_shape: [usize; 2], filter: ResampleFilter) -> Self {
        Self {
            min_height: minimum_shape[0],
            min_width: minimum_shape[1],
            filter,
            label_check: LabelCheck::new(),
        }
    }

    /// 以滤波器名创建，名字不合法时返回配置错误
    pub fn with_filter_name(minimum_shape: [usize; 2], filter: &str) -> Result<Self, DataError> {
        Ok(Self::new(minimum_shape, filter.parse()?))
    }

    pub fn minimum_shape(&self) -> [usize; 2] {
        [self.min_height, self.min_width]
    }

    pub fn filter(&self) -> ResampleFilter {
        self.filter
    }

    /// 放大后的`(height, width)`；无需放大时返回`None`
    fn target_size(&self, height: usize, width: usize) -> Option<(usize, usize)> {
        if height == 0 || width == 0 || (height >= self.min_height && width >= self.min_width) {
            return None;
        }
        let multiplier = 1f64
            .max(self.min_width as f64 / width as f64)
            .max(self.min_height as f64 / height as f64);
        Some((
            (height as f64 * multiplier).ceil() as usize,
            (width as f64 * multiplier).ceil() as usize,
        ))
    }
}

/// 用`image`库缩放单个通道。
/// `image`库在浮点像素上会把结果截断到`[0, 1]`，因此先按该通道的最小/最大值归一化，缩放后再还原。
fn resize_channel(
    channel: ArrayView2<'_, f32>,
    height: usize,
    width: usize,
    filter: FilterType,
) -> Result<Array2<f32>, DataError> {
    let (low, high) = channel
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if high <= low {
        return Ok(Array2::from_elem((height, width), low));
    }
    let range = high - low;

    let (old_height, old_width) = channel.dim();
    let normalized = channel.iter().map(|&v| (v - low) / range).collect::<Vec<_>>();
    let buffer = ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(
        old_width as u32,
        old_height as u32,
        normalized,
    )
    .ok_or_else(|| DataError::ShapeMismatch {
        expected: vec![old_height, old_width],
        got: vec![channel.len()],
    })?;
    let resized = imageops::resize(&buffer, width as u32, height as u32, filter);
    let restored = resized
        .into_raw()
        .into_iter()
        .map(|v| v * range + low)
        .collect::<Vec<_>>();
    Ok(Array2::from_shape_vec((height, width), restored)?)
}

impl BatchTransform for MinimumImageDimensions {
    fn example_rank(&self) -> Option<usize> {
        None
    }

    fn transform_example(&mut self, example: Tensor) -> Result<Tensor, DataError> {
        let rank = example.dimension();
        if !(2..=3).contains(&rank) {
            return Err(DataError::UnsupportedRank(rank));
        }
        let (height, width) = (example.shape()[rank - 2], example.shape()[rank - 1]);
        let Some((new_height, new_width)) = self.target_size(height, width) else {
            return Ok(example);
        };
        let filter = FilterType::from(self.filter);

        let view = example.view();
        if rank == 2 {
            let channel = view.into_dimensionality::<Ix2>()?;
            let resized = resize_channel(channel, new_height, new_width, filter)?;
            return Ok(Tensor::from_array(resized.into_dyn()));
        }
        let channels = example.shape()[0];
        let mut out = ArrayD::<f32>::zeros(IxDyn(&[channels, new_height, new_width]));
        for (channel, mut target) in view.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
            let channel = channel.into_dimensionality::<Ix2>()?;
            target.assign(&resize_channel(channel, new_height, new_width, filter)?);
        }
        Ok(Tensor::from_array(out))
    }

    /// 稠密批次中的图像尺寸相同，放大后依旧相同，因此可以重新堆叠为稠密批次
    fn transform_dense(&mut self, batch: Tensor) -> Result<Tensor, DataError> {
        if !(3..=4).contains(&batch.dimension()) {
            return Err(DataError::UnsupportedContainer(format!(
                "最小尺寸变换需要3阶或4阶的稠密批次，实际形状为{:?}",
                batch.shape()
            )));
        }
        let examples = batch
            .unstack()
            .into_iter()
            .map(|example| self.transform_example(example))
            .collect::<Result<Vec<_>, _>>()?;
        if examples.is_empty() {
            return Ok(batch);
        }
        Ok(Tensor::stack(&examples)?)
    }
}

impl SourcewiseTransform for MinimumImageDimensions {
    fn transform_source_example(
        &mut self,
        example: Value,
        source_name: &str,
        labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError> {
        self.label_check
            .verify(&image_labels(), labels, source_name)?;
        self.apply_example(example)
    }

    fn transform_source_batch(
        &mut self,
        batch: Value,
        source_name: &str,
        labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError> {
        self.label_check
            .verify(&with_batch_axis(&image_labels()), labels, source_name)?;
        self.apply_batch(batch)
    }
}

fn image_labels() -> AxisLabels {
    vec![AxisRole::Channel, AxisRole::Height, AxisRole::Width]
}
