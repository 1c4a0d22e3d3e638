//! 随机空间翻转：逐样本独立地决定是否水平/竖直镜像

use crate::data::axis_labels::with_batch_axis;
use crate::data::config::DEFAULT_SEED;
use crate::data::{
    AxisLabels, AxisRole, Batch, BatchTransform, DataError, LabelCheck, SourcewiseTransform, Value,
};
use crate::tensor::Tensor;
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 随机空间翻转。
/// 水平翻转反转最后一个空间轴，竖直翻转反转倒数第二个空间轴；两者都启用时先水平后竖直。
/// 每个样本各自以0.5的概率决定是否翻转（两个方向分别决定），而不是整个批次共用一次抛硬币。
/// 形状与容器类型（稠密/列表）保持不变。
#[derive(Debug, Clone)]
pub struct RandomSpatialFlip {
    flip_h: bool,
    flip_v: bool,
    rng: StdRng,
    label_check: LabelCheck,
}

impl RandomSpatialFlip {
    pub fn new(flip_h: bool, flip_v: bool) -> Self {
        Self {
            flip_h,
            flip_v,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            label_check: LabelCheck::new(),
        }
    }

    /// 设置随机种子
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 直接指定随机数生成器，它将由本变换独占
    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// 为`count`个样本抽取翻转与否：先抽全部水平方向，再抽全部竖直方向；未启用的方向不消耗随机数
    pub fn draw_flips(&mut self, count: usize) -> (Vec<bool>, Vec<bool>) {
        let to_flip_h = self.draw(self.flip_h, count);
        let to_flip_v = self.draw(self.flip_v, count);
        (to_flip_h, to_flip_v)
    }

    fn draw(&mut self, enabled: bool, count: usize) -> Vec<bool> {
        if enabled {
            (0..count).map(|_| self.rng.gen_bool(0.5)).collect()
        } else {
            vec![false; count]
        }
    }
}

/// 按给定结果翻转单个样本（至少2阶）
pub fn flip_example(example: &Tensor, flip_h: bool, flip_v: bool) -> Tensor {
    let rank = example.dimension();
    let mut flipped = example.clone();
    if flip_h {
        flipped = flipped.flip(rank - 1);
    }
    if flip_v {
        flipped = flipped.flip(rank - 2);
    }
    flipped
}

impl BatchTransform for RandomSpatialFlip {
    fn example_rank(&self) -> Option<usize> {
        None
    }

    fn transform_example(&mut self, example: Tensor) -> Result<Tensor, DataError> {
        if example.dimension() < 2 {
            return Err(DataError::UnsupportedContainer(format!(
                "翻转需要至少2个空间轴，实际样本形状为{:?}",
                example.shape()
            )));
        }
        let (to_flip_h, to_flip_v) = self.draw_flips(1);
        Ok(flip_example(&example, to_flip_h[0], to_flip_v[0]))
    }

    fn transform_dense(&mut self, batch: Tensor) -> Result<Tensor, DataError> {
        if batch.dimension() < 3 {
            return Err(DataError::UnsupportedContainer(format!(
                "翻转稠密批次需要至少3阶，实际形状为{:?}",
                batch.shape()
            )));
        }
        let (to_flip_h, to_flip_v) = self.draw_flips(batch.shape()[0]);
        let rank = batch.dimension() - 1;
        let mut out = batch.clone();
        {
            let source = batch.view();
            let mut target = out.view_mut();
            for (n, (&h, &v)) in to_flip_h.iter().zip(&to_flip_v).enumerate() {
                if !h && !v {
                    continue;
                }
                // 只改变视图的步长，真正的复制发生在assign中
                let mut example = source.index_axis(Axis(0), n);
                if h {
                    example.invert_axis(Axis(rank - 1));
                }
                if v {
                    example.invert_axis(Axis(rank - 2));
                }
                target.index_axis_mut(Axis(0), n).assign(&example);
            }
        }
        Ok(out)
    }

    fn transform_batch(&mut self, batch: Batch) -> Result<Batch, DataError> {
        match batch {
            Batch::Dense(tensor) => Ok(Batch::Dense(self.transform_dense(tensor)?)),
            Batch::Ragged(list) => {
                if let Some(bad) = list.iter().find(|t| t.dimension() < 2) {
                    return Err(DataError::UnsupportedContainer(format!(
                        "翻转需要至少2个空间轴，实际样本形状为{:?}",
                        bad.shape()
                    )));
                }
                // 与稠密批次一致：整批一次抽取，而不是逐样本交替抽取
                let (to_flip_h, to_flip_v) = self.draw_flips(list.len());
                Ok(Batch::Ragged(
                    list.iter()
                        .zip(to_flip_h.iter().zip(&to_flip_v))
                        .map(|(example, (&h, &v))| flip_example(example, h, v))
                        .collect(),
                ))
            }
        }
    }
}

impl SourcewiseTransform for RandomSpatialFlip {
    fn transform_source_example(
        &mut self,
        example: Value,
        source_name: &str,
        labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError> {
        self.label_check
            .verify(&expected_labels(labels, false), labels, source_name)?;
        self.apply_example(example)
    }

    fn transform_source_batch(
        &mut self,
        batch: Value,
        source_name: &str,
        labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError> {
        self.label_check
            .verify(&expected_labels(labels, true), labels, source_name)?;
        self.apply_batch(batch)
    }
}

/// 平面图像与体数据都可以翻转：声明了3个空间轴时按体数据检查，否则按平面图像检查
fn expected_labels(labels: Option<&[AxisRole]>, batched: bool) -> AxisLabels {
    let leading = usize::from(batched) + 1;
    let spatial_axes = labels.map_or(2, |l| l.len().saturating_sub(leading));
    let example = if spatial_axes == 3 {
        vec![AxisRole::Channel, AxisRole::X, AxisRole::Y, AxisRole::Z]
    } else {
        vec![AxisRole::Channel, AxisRole::Height, AxisRole::Width]
    };
    if batched {
        with_batch_axis(&example)
    } else {
        example
    }
}
