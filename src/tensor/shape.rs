use super::Tensor;
use ndarray::{Axis, ShapeError};
use std::collections::HashSet;

impl Tensor {
    /// 交换张量的两个（以上）维度，并将其返回（不影响原张量）
    pub fn permute(&self, axes: &[usize]) -> Self {
        assert!(axes.len() >= 2, "交换张量时，输入的维度数至少需要2个");
        // 检查axes中的所有元素必须是唯一且在[0, <张量维数>)范围内
        let unique_axes = axes.iter().copied().collect::<HashSet<_>>();
        assert!(
            unique_axes.len() == axes.len() && unique_axes.iter().all(|&a| a < self.dimension()),
            "需要交换的维度必须是唯一且在[0, <张量维数>)范围内"
        );

        let permuted = self.data.view().permuted_axes(axes);
        Self {
            data: permuted.as_standard_layout().into_owned(),
        }
    }

    /// 在`axis`处插入一个长度为1的新维度（不影响原张量）
    pub fn unsqueeze(&self, axis: usize) -> Self {
        assert!(axis <= self.dimension(), "维度超出范围。");
        Self {
            data: self.data.clone().insert_axis(Axis(axis)),
        }
    }

    /// 沿`axis`反转元素顺序（即镜像翻转），返回新张量
    pub fn flip(&self, axis: usize) -> Self {
        assert!(axis < self.dimension(), "维度超出范围。");
        let mut view = self.data.view();
        view.invert_axis(Axis(axis));
        Self {
            data: view.as_standard_layout().into_owned(),
        }
    }

    /// 将形状完全一致的多个张量沿新的首个维度堆叠起来，即把样本列表合成稠密批次。
    pub fn stack(tensors: &[Tensor]) -> Result<Self, ShapeError> {
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        Ok(Self {
            data: ndarray::stack(Axis(0), &views)?,
        })
    }

    /// `stack`的逆操作：沿首个维度拆分为若干样本
    pub fn unstack(&self) -> Vec<Tensor> {
        self.data
            .axis_iter(Axis(0))
            .map(|view| Tensor {
                data: view.to_owned(),
            })
            .collect()
    }

    /// 取出首个维度上第`index`个子张量（即稠密批次中的第`index`个样本）
    pub fn select_first(&self, index: usize) -> Self {
        Self {
            data: self.data.index_axis(Axis(0), index).to_owned(),
        }
    }

    /// 按给定的多个索引沿首个维度取子张量，结果仍保留首个维度
    pub fn select_many(&self, indices: &[usize]) -> Self {
        Self {
            data: self.data.select(Axis(0), indices),
        }
    }
}
