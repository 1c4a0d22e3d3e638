//! 固定尺寸的随机裁剪，支持平面图像`[C, H, W]`与体数据`[C, X, Y, Z]`

use super::sampler::{CropSampler, check_window};
use super::window::{extract_window, extract_windows};
use crate::data::axis_labels::with_batch_axis;
use crate::data::{AxisLabels, AxisRole, BatchTransform, DataError, LabelCheck, SourcewiseTransform, Value};
use crate::tensor::Tensor;
use rand::rngs::StdRng;

/// 把图像随机裁剪为固定尺寸的窗口。
///
/// 接受以下三种输入，且输出与输入的表示方式一致：
/// - 单个样本：`[C, H, W]`（体数据为`[C, X, Y, Z]`）
/// - 样本列表：各样本的空间尺寸可以不同，逐个样本独立采样
/// - 稠密批次：`[N, C, H, W]`（体数据为`[N, C, X, Y, Z]`），一次性为每个样本独立采样
///
/// # 示例
/// ```ignore
/// let crop = RandomFixedSizeCrop::new(&[5, 4])?.seed(42);
/// let stream = SourcewiseTransformer::new(stream, crop).which_sources(["images"])?;
/// ```
#[derive(Debug, Clone)]
pub struct RandomFixedSizeCrop {
    window_shape: Vec<usize>,
    sampler: CropSampler,
    label_check: LabelCheck,
}

impl RandomFixedSizeCrop {
    /// * `window_shape` - 平面图像为`(height, width)`，体数据为`(x, y, z)`
    pub fn new(window_shape: &[usize]) -> Result<Self, DataError> {
        if !(2..=3).contains(&window_shape.len()) {
            return Err(DataError::Config(format!(
                "裁剪窗口只能有2个（平面）或3个（体数据）空间轴，实际为{:?}",
                window_shape
            )));
        }
        check_window(window_shape)?;
        Ok(Self {
            window_shape: window_shape.to_vec(),
            sampler: CropSampler::default(),
            label_check: LabelCheck::new(),
        })
    }

    /// 设置随机种子
    pub fn seed(mut self, seed: u64) -> Self {
        self.sampler = CropSampler::from_seed(seed);
        self
    }

    /// 直接指定随机数生成器，它将由本变换独占
    pub fn rng(mut self, rng: StdRng) -> Self {
        self.sampler = CropSampler::new(rng);
        self
    }

    pub fn window_shape(&self) -> &[usize] {
        &self.window_shape
    }

    /// 单个样本应有的轴标签
    pub fn example_labels(&self) -> AxisLabels {
        match self.window_shape.len() {
            2 => vec![AxisRole::Channel, AxisRole::Height, AxisRole::Width],
            _ => vec![AxisRole::Channel, AxisRole::X, AxisRole::Y, AxisRole::Z],
        }
    }
}

impl BatchTransform for RandomFixedSizeCrop {
    fn example_rank(&self) -> Option<usize> {
        Some(self.window_shape.len() + 1)
    }

    fn transform_example(&mut self, example: Tensor) -> Result<Tensor, DataError> {
        let offsets = self
            .sampler
            .sample_example(&example.shape()[1..], &self.window_shape)?;
        extract_window(&example, &offsets, &self.window_shape)
    }

    fn transform_dense(&mut self, batch: Tensor) -> Result<Tensor, DataError> {
        let offsets =
            self.sampler
                .sample_batch(batch.shape()[0], &batch.shape()[2..], &self.window_shape)?;
        log::debug!(
            "稠密批次{:?}裁剪为窗口{:?}",
            batch.shape(),
            self.window_shape
        );
        extract_windows(&batch, &offsets, &self.window_shape)
    }
}

impl SourcewiseTransform for RandomFixedSizeCrop {
    fn transform_source_example(
        &mut self,
        example: Value,
        source_name: &str,
        labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError> {
        let expected = self.example_labels();
        self.label_check.verify(&expected, labels, source_name)?;
        self.apply_example(example)
    }

    fn transform_source_batch(
        &mut self,
        batch: Value,
        source_name: &str,
        labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError> {
        let expected = with_batch_axis(&self.example_labels());
        self.label_check.verify(&expected, labels, source_name)?;
        self.apply_batch(batch)
    }
}
