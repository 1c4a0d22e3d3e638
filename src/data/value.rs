//! 数据流中流动的值：单个样本、稠密批次、不规则（ragged）批次以及未解码的字节

use super::DataError;
use crate::tensor::Tensor;
use indexmap::IndexMap;
use ndarray::{ArrayViewD, Axis};
use std::path::PathBuf;

/// 某个数据源在一次拉取中给出的值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 单个样本，或首个维度为批次的稠密批次
    Tensor(Tensor),
    /// 由形状可能各异的样本组成的批次
    TensorList(Vec<Tensor>),
    /// 单个编码后的图像
    Bytes(Vec<u8>),
    /// 一批编码后的图像
    BytesList(Vec<Vec<u8>>),
    Path(PathBuf),
    PathList(Vec<PathBuf>),
}

impl Value {
    /// 值的种类名，用于错误信息
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Tensor(_) => "张量",
            Value::TensorList(_) => "张量列表",
            Value::Bytes(_) => "字节",
            Value::BytesList(_) => "字节列表",
            Value::Path(_) => "路径",
            Value::PathList(_) => "路径列表",
        }
    }

    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Value::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    pub fn as_tensor_list(&self) -> Option<&[Tensor]> {
        match self {
            Value::TensorList(list) => Some(list),
            _ => None,
        }
    }

    pub fn into_tensor(self) -> Option<Tensor> {
        match self {
            Value::Tensor(tensor) => Some(tensor),
            _ => None,
        }
    }

    pub fn into_tensor_list(self) -> Option<Vec<Tensor>> {
        match self {
            Value::TensorList(list) => Some(list),
            _ => None,
        }
    }
}

/// 一次拉取的结果：数据源名 -> 值，保持上游数据源的顺序
pub type Record = IndexMap<String, Value>;

/// 批次的两种表示。变换前后表示方式不变：稠密进稠密出，列表进列表出。
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    /// 首个维度为批次的`R+1`阶张量
    Dense(Tensor),
    /// `R`阶张量的列表，各样本空间尺寸可以不同
    Ragged(Vec<Tensor>),
}

impl Batch {
    /// 根据值的运行时类型与阶数判断批次的表示方式。
    /// * `example_rank` - 单个样本应有的阶数；为`None`时只要求稠密批次至少有2阶
    pub fn from_value(value: Value, example_rank: Option<usize>) -> Result<Self, DataError> {
        match value {
            Value::Tensor(tensor) => {
                let rank_ok = match example_rank {
                    Some(rank) => tensor.dimension() == rank + 1,
                    None => tensor.dimension() >= 2,
                };
                if rank_ok {
                    Ok(Batch::Dense(tensor))
                } else {
                    Err(DataError::UnsupportedContainer(format!(
                        "期望{}阶张量构成的列表，或{}阶张量，实际得到{}阶张量",
                        rank_text(example_rank, 0),
                        rank_text(example_rank, 1),
                        tensor.dimension()
                    )))
                }
            }
            Value::TensorList(list) => {
                let rank_ok = |t: &Tensor| match example_rank {
                    Some(rank) => t.dimension() == rank,
                    None => t.dimension() >= 1,
                };
                match list.iter().find(|t| !rank_ok(t)) {
                    None => Ok(Batch::Ragged(list)),
                    Some(bad) => Err(DataError::UnsupportedContainer(format!(
                        "期望{}阶张量构成的列表，或{}阶张量，但列表中有{}阶张量",
                        rank_text(example_rank, 0),
                        rank_text(example_rank, 1),
                        bad.dimension()
                    ))),
                }
            }
            other => Err(DataError::UnsupportedContainer(format!(
                "期望张量或张量列表，实际得到{}",
                other.kind()
            ))),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Batch::Dense(tensor) => Value::Tensor(tensor),
            Batch::Ragged(list) => Value::TensorList(list),
        }
    }

    /// 批次中的样本数
    pub fn len(&self) -> usize {
        match self {
            Batch::Dense(tensor) => tensor.shape()[0],
            Batch::Ragged(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 第`index`个样本（稠密批次会复制出该样本）
    pub fn example(&self, index: usize) -> Tensor {
        match self {
            Batch::Dense(tensor) => tensor.select_first(index),
            Batch::Ragged(list) => list[index].clone(),
        }
    }

    /// 第`index`个样本的只读视图（不复制）
    pub fn example_view(&self, index: usize) -> ArrayViewD<'_, f32> {
        match self {
            Batch::Dense(tensor) => tensor.view().index_axis_move(Axis(0), index),
            Batch::Ragged(list) => list[index].view(),
        }
    }

    /// 第`index`个样本的空间尺寸（去掉通道轴后的形状）
    pub fn spatial_shape(&self, index: usize) -> Vec<usize> {
        match self {
            Batch::Dense(tensor) => tensor.shape()[2..].to_vec(),
            Batch::Ragged(list) => list[index].shape()[1..].to_vec(),
        }
    }
}

fn rank_text(example_rank: Option<usize>, extra: usize) -> String {
    match example_rank {
        Some(rank) => (rank + extra).to_string(),
        None => "任意".to_string(),
    }
}

/// 同时支持单样本与批次的张量变换。
/// 实现者只需给出“单样本”和“稠密批次（向量化）”两种实现，
/// 不规则批次默认逐个样本复用单样本变换。
pub trait BatchTransform {
    /// 单个样本应有的阶数；`None`表示不限
    fn example_rank(&self) -> Option<usize>;

    fn transform_example(&mut self, example: Tensor) -> Result<Tensor, DataError>;

    fn transform_dense(&mut self, batch: Tensor) -> Result<Tensor, DataError>;

    fn transform_batch(&mut self, batch: Batch) -> Result<Batch, DataError> {
        match batch {
            Batch::Dense(tensor) => Ok(Batch::Dense(self.transform_dense(tensor)?)),
            Batch::Ragged(list) => Ok(Batch::Ragged(
                list.into_iter()
                    .map(|example| self.transform_example(example))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        }
    }

    /// 检查单样本的阶数后再变换
    fn apply_example(&mut self, value: Value) -> Result<Value, DataError> {
        let example = match value {
            Value::Tensor(tensor) => tensor,
            other => {
                return Err(DataError::UnsupportedContainer(format!(
                    "期望单个样本张量，实际得到{}",
                    other.kind()
                )));
            }
        };
        if let Some(rank) = self.example_rank() {
            if example.dimension() != rank {
                return Err(DataError::UnsupportedContainer(format!(
                    "期望{}阶的样本张量，实际得到{}阶",
                    rank,
                    example.dimension()
                )));
            }
        }
        Ok(Value::Tensor(self.transform_example(example)?))
    }

    /// 判别批次表示后再变换，并保持原有表示
    fn apply_batch(&mut self, value: Value) -> Result<Value, DataError> {
        let batch = Batch::from_value(value, self.example_rank())?;
        Ok(self.transform_batch(batch)?.into_value())
    }
}
