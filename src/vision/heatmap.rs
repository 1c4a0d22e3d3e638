/*
 * @Author       : 老董
 * @Description  : 热力图：由参考体数据导出窗口中心的采样分布，
 *                 使数值大的区域更可能成为裁剪窗口的中心
 */

use super::sampler::{check_window, max_offsets};
use crate::data::DataError;
use crate::tensor::Tensor;
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Slice};
use rand::Rng;

/// 窗口中心的离散概率分布。
///
/// 对窗口`W`与参考体数据`[C, S0, S1, S2]`：
/// - 密度`d[p] = Σ_c max(ref[c, p], 0)`
/// - 合法中心`V = { p : W_i/2 <= p_i <= S_i - W_i + W_i/2 }`（整数除法），即以`p`为中心时窗口恰好放得下
/// - `Z = Σ_{p∈V} d[p]`，热力图在`V`上为`d / Z`，其余位置为0
///
/// 若`Z == 0`，则在`V`上均匀分布。热力图只依赖参考数据，算出后不再改变。
#[derive(Debug, Clone)]
pub struct Heatmap {
    probabilities: Tensor,
    window: Vec<usize>,
    /// `V`在各轴上的起点
    lower: Vec<usize>,
    /// `V`在各轴上的长度，即`S_i - W_i + 1`
    counts: Vec<usize>,
    /// `V`内按行优先顺序的累积权重
    cumulative: Vec<f64>,
    normalizer: f32,
}

impl Heatmap {
    /// 由参考体数据的视图计算热力图
    pub fn from_view(reference: ArrayViewD<'_, f32>, window: &[usize]) -> Result<Self, DataError> {
        if reference.ndim() != 4 || window.len() != 3 {
            return Err(DataError::UnsupportedContainer(format!(
                "热力图需要形状为[C, X, Y, Z]的参考体数据及3个轴的窗口，实际参考形状为{:?}，窗口为{:?}",
                reference.shape(),
                window
            )));
        }
        check_window(window)?;
        let extent = reference.shape()[1..].to_vec();
        let counts = max_offsets(&extent, window)?
            .into_iter()
            .map(|max_offset| max_offset + 1)
            .collect::<Vec<_>>();
        let lower = window.iter().map(|w| w / 2).collect::<Vec<_>>();
        let valid_region = |axis: usize| Slice::from(lower[axis]..lower[axis] + counts[axis]);

        let density = reference.map_axis(Axis(0), |channels| {
            channels.iter().map(|&v| f64::from(v.max(0.0))).sum::<f64>()
        });
        let valid = density.slice_each_axis(|axis| valid_region(axis.axis.index()));
        let total = valid.sum();
        if !total.is_finite() {
            return Err(DataError::InvalidWeight(format!(
                "参考体数据在合法中心内的权重和为{}，无法据此采样",
                total
            )));
        }

        let uniform = total <= 0.0;
        let count = counts.iter().product::<usize>() as f64;
        let mut probabilities = ArrayD::<f32>::zeros(IxDyn(&extent));
        probabilities
            .slice_each_axis_mut(|axis| valid_region(axis.axis.index()))
            .zip_mut_with(&valid, |p, &d| {
                let probability = if uniform { 1.0 / count } else { d / total };
                *p = probability as f32;
            });

        let mut running = 0.0;
        let cumulative = valid
            .iter()
            .map(|&d| {
                running += if uniform { 1.0 } else { d };
                running
            })
            .collect();

        Ok(Self {
            probabilities: Tensor::from_array(probabilities),
            window: window.to_vec(),
            lower,
            counts,
            cumulative,
            normalizer: total as f32,
        })
    }

    /// 与参考数据空间尺寸相同的概率场，`V`之外为0
    pub fn probabilities(&self) -> &Tensor {
        &self.probabilities
    }

    /// 归一化系数`Z`；参考数据在`V`内全无正值时为0
    pub fn normalizer(&self) -> f32 {
        self.normalizer
    }

    pub fn window(&self) -> &[usize] {
        &self.window
    }

    /// 把热力图当作合法中心上的类别分布，抽取一个中心，返回对应窗口的起点偏移量（`中心 - W/2`）。
    /// 权重为0的中心永远不会被抽中。
    pub fn sample_offset<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let last = self.cumulative.len() - 1;
        let u = rng.gen_range(0.0..self.cumulative[last]);
        // 第一个累积值严格大于u的位置
        let mut rest = self.cumulative.partition_point(|&c| c <= u).min(last);

        let mut center = vec![0; self.counts.len()];
        for axis in (0..self.counts.len()).rev() {
            center[axis] = self.lower[axis] + rest % self.counts[axis];
            rest /= self.counts[axis];
        }
        center
            .iter()
            .zip(&self.window)
            .map(|(&c, &w)| c - w / 2)
            .collect()
    }
}

/// 为单个体数据样本`[C, X, Y, Z]`计算热力图
pub fn calculate_heatmap(reference: &Tensor, window: &[usize]) -> Result<Heatmap, DataError> {
    Heatmap::from_view(reference.view(), window)
}
