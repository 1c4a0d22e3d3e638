/*
 * @Author       : 老董
 * @Description  : 张量：本库中所有图像、体数据及其批次的统一载体。
 *                 单个样本通常为`[C, H, W]`（平面）或`[C, X, Y, Z]`（体数据），
 *                 稠密批次则在最前面多出一个批次维度。
 */

use ndarray::{Array, ArrayD, IxDyn};
use std::ops::{Index, IndexMut};

mod image;
mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是任意阶的`f32`稠密数组。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量。
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则会panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        assert_eq!(
            data.len(),
            shape.iter().product::<usize>(),
            "数据长度{}与形状{:?}不符",
            data.len(),
            shape
        );
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec())
            .unwrap_or_else(|e| panic!("无法按形状{shape:?}构建张量：{e}"));
        Tensor { data }
    }

    /// 创建一个全零张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    /// 创建一个按行优先顺序依次填入`0, 1, 2, ...`的张量，常用于检验裁剪、翻转的结果
    pub fn new_arange(shape: &[usize]) -> Tensor {
        let len = shape.iter().product::<usize>();
        let data = (0..len).map(|x| x as f32).collect::<Vec<_>>();
        Tensor::new(&data, shape)
    }

    /// 由`ndarray`的动态维数组直接构建张量（不复制数据）
    pub fn from_array(data: ArrayD<f32>) -> Tensor {
        Tensor { data }
    }
}

impl From<ArrayD<f32>> for Tensor {
    fn from(data: ArrayD<f32>) -> Self {
        Tensor::from_array(data)
    }
}

impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; N]) -> &f32 {
        &self.data[&index[..]]
    }
}

impl<const N: usize> IndexMut<[usize; N]> for Tensor {
    fn index_mut(&mut self, index: [usize; N]) -> &mut f32 {
        &mut self.data[&index[..]]
    }
}
