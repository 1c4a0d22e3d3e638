//! 窗口提取：按每个空间轴上的偏移量从张量中截取固定大小的子张量

use crate::data::DataError;
use crate::tensor::Tensor;
use ndarray::{ArrayD, Axis, IxDyn, Slice};

/// 从稠密批次中为每个样本各自截取一个窗口。
/// * `batch` - 形状为`[N, C, ...空间轴]`的稠密批次
/// * `offsets` - 每个空间轴一组偏移量，每组长度为`N`
/// * `window` - 窗口在各空间轴上的尺寸
///
/// 返回形状为`[N, C, ...window]`的张量，其中
/// `out[n] = batch[n, :, offsets[0][n]..offsets[0][n]+window[0], ...]`。
/// 只分配一块输出缓冲区，各样本的窗口直接写入其中。
pub fn extract_windows(
    batch: &Tensor,
    offsets: &[Vec<usize>],
    window: &[usize],
) -> Result<Tensor, DataError> {
    let shape = batch.shape();
    if shape.len() != window.len() + 2 || offsets.len() != window.len() {
        return Err(DataError::UnsupportedContainer(format!(
            "窗口{:?}需要形状为[N, C, ...{}个空间轴]的批次及{}组偏移量，实际批次形状为{:?}，偏移量{}组",
            window,
            window.len(),
            window.len(),
            shape,
            offsets.len()
        )));
    }
    let batch_size = shape[0];
    let extent = &shape[2..];
    for (axis, axis_offsets) in offsets.iter().enumerate() {
        if axis_offsets.len() != batch_size {
            return Err(DataError::ShapeMismatch {
                expected: vec![batch_size],
                got: vec![axis_offsets.len()],
            });
        }
        for &offset in axis_offsets {
            check_bounds(axis, offset, window[axis], extent[axis])?;
        }
    }

    let mut out_shape = vec![batch_size, shape[1]];
    out_shape.extend_from_slice(window);
    let mut out = ArrayD::<f32>::zeros(IxDyn(&out_shape));

    let source = batch.view();
    for (n, mut target) in out.axis_iter_mut(Axis(0)).enumerate() {
        let example = source.index_axis(Axis(0), n);
        let windowed = example.slice_each_axis(|axis| match axis.axis.index() {
            0 => Slice::from(..),
            a => {
                let offset = offsets[a - 1][n];
                Slice::from(offset..offset + window[a - 1])
            }
        });
        target.assign(&windowed);
    }

    Ok(Tensor::from_array(out))
}

/// 从单个样本`[C, ...空间轴]`中截取一个窗口
pub fn extract_window(
    example: &Tensor,
    offsets: &[usize],
    window: &[usize],
) -> Result<Tensor, DataError> {
    let shape = example.shape();
    if shape.len() != window.len() + 1 || offsets.len() != window.len() {
        return Err(DataError::UnsupportedContainer(format!(
            "窗口{:?}需要形状为[C, ...{}个空间轴]的样本及{}个偏移量，实际样本形状为{:?}，偏移量{}个",
            window,
            window.len(),
            window.len(),
            shape,
            offsets.len()
        )));
    }
    for (axis, (&offset, &size)) in offsets.iter().zip(window).enumerate() {
        check_bounds(axis, offset, size, shape[axis + 1])?;
    }

    let view = example.view();
    let windowed = view.slice_each_axis(|axis| match axis.axis.index() {
        0 => Slice::from(..),
        a => Slice::from(offsets[a - 1]..offsets[a - 1] + window[a - 1]),
    });
    Ok(Tensor::from_array(windowed.to_owned()))
}

fn check_bounds(axis: usize, offset: usize, window: usize, extent: usize) -> Result<(), DataError> {
    if offset + window > extent {
        return Err(DataError::InvalidWindow {
            axis,
            offset,
            window,
            extent,
        });
    }
    Ok(())
}
