//! 裁剪窗口采样器：为单个样本或整个批次随机生成合法的窗口偏移量

use crate::data::DataError;
use crate::data::config::DEFAULT_SEED;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 裁剪窗口采样器。
/// 随机数生成器由采样器独占，每次采样都会推进它；给定种子与调用顺序，结果完全确定。
#[derive(Debug, Clone)]
pub struct CropSampler {
    rng: StdRng,
}

impl Default for CropSampler {
    fn default() -> Self {
        Self::from_seed(DEFAULT_SEED)
    }
}

impl CropSampler {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// 为空间尺寸为`extent`的单个样本采样窗口偏移量，每个空间轴一个。
    /// 某轴上窗口与原图等大时偏移量固定为0，不消耗随机数；
    /// 否则在`[0, extent - window]`闭区间内均匀采样。
    pub fn sample_example(
        &mut self,
        extent: &[usize],
        window: &[usize],
    ) -> Result<Vec<usize>, DataError> {
        let max_offsets = max_offsets(extent, window)?;
        Ok(max_offsets
            .into_iter()
            .map(|max_offset| self.draw(max_offset))
            .collect())
    }

    /// 为所有样本共享空间尺寸`extent`的稠密批次采样偏移量。
    /// 返回值按空间轴组织：`offsets[axis][n]`是第`n`个样本在第`axis`个空间轴上的偏移量。
    /// 每个样本各自独立采样，而非整个批次共用一个偏移量。
    pub fn sample_batch(
        &mut self,
        batch_size: usize,
        extent: &[usize],
        window: &[usize],
    ) -> Result<Vec<Vec<usize>>, DataError> {
        let max_offsets = max_offsets(extent, window)?;
        Ok(max_offsets
            .into_iter()
            .map(|max_offset| (0..batch_size).map(|_| self.draw(max_offset)).collect())
            .collect())
    }

    fn draw(&mut self, max_offset: usize) -> usize {
        if max_offset == 0 {
            0
        } else {
            self.rng.gen_range(0..=max_offset)
        }
    }
}

/// 窗口在每个空间轴上都必须至少为1
pub fn check_window(window: &[usize]) -> Result<(), DataError> {
    if window.contains(&0) {
        return Err(DataError::Config(format!(
            "裁剪窗口的每个轴都必须大于0，实际为{:?}",
            window
        )));
    }
    Ok(())
}

/// 各空间轴上允许的最大偏移量；窗口比原图大时报错
pub fn max_offsets(extent: &[usize], window: &[usize]) -> Result<Vec<usize>, DataError> {
    if extent.len() != window.len() {
        return Err(DataError::UnsupportedContainer(format!(
            "窗口{:?}有{}个空间轴，但数据的空间尺寸为{:?}",
            window,
            window.len(),
            extent
        )));
    }
    if extent.iter().zip(window).any(|(&e, &w)| e < w) {
        return Err(DataError::WindowTooLarge {
            extent: extent.to_vec(),
            window: window.to_vec(),
        });
    }
    Ok(extent.iter().zip(window).map(|(&e, &w)| e - w).collect())
}
