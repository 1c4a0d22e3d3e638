//! 轴标签：描述数据源每个轴的语义角色（批次、通道、高、宽……）

use super::DataError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// 轴的语义角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisRole {
    Batch,
    Channel,
    Height,
    Width,
    X,
    Y,
    Z,
    Bytes,
}

impl Display for AxisRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisRole::Batch => "batch",
            AxisRole::Channel => "channel",
            AxisRole::Height => "height",
            AxisRole::Width => "width",
            AxisRole::X => "x",
            AxisRole::Y => "y",
            AxisRole::Z => "z",
            AxisRole::Bytes => "bytes",
        };
        write!(f, "{}", name)
    }
}

/// 某个数据源各轴的角色，按轴顺序排列
pub type AxisLabels = Vec<AxisRole>;

/// 数据源名 -> 轴标签；没有条目表示该数据源未声明轴标签
pub type AxisLabelMap = IndexMap<String, AxisLabels>;

/// 在样本标签前补上批次轴
pub fn with_batch_axis(example_labels: &[AxisRole]) -> AxisLabels {
    let mut labels = Vec::with_capacity(example_labels.len() + 1);
    labels.push(AxisRole::Batch);
    labels.extend_from_slice(example_labels);
    labels
}

/// 由上游标签推导变换之后的标签，是一个纯函数：
/// 被指定的数据源换成`example_labels`（批次模式下前置`batch`轴），
/// 其余数据源沿用上游标签（上游未声明的依旧不声明）。
pub fn derive_axis_labels(
    upstream: &AxisLabelMap,
    sources: &[String],
    which_sources: &[String],
    produces_examples: bool,
    example_labels: &[AxisRole],
) -> AxisLabelMap {
    let mut labels = AxisLabelMap::new();
    for source in sources {
        if which_sources.contains(source) {
            let new_labels = if produces_examples {
                example_labels.to_vec()
            } else {
                with_batch_axis(example_labels)
            };
            labels.insert(source.clone(), new_labels);
        } else if let Some(old_labels) = upstream.get(source) {
            labels.insert(source.clone(), old_labels.clone());
        }
    }
    labels
}

/// 轴标签检查器。
/// 标签不一致是致命错误；若上游根本没有声明标签，则只警告一次并放行。
#[derive(Debug, Default, Clone)]
pub struct LabelCheck {
    warned: bool,
}

impl LabelCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verify(
        &mut self,
        expected: &[AxisRole],
        actual: Option<&[AxisRole]>,
        source_name: &str,
    ) -> Result<(), DataError> {
        match actual {
            None => {
                if !self.warned {
                    log::warn!(
                        "数据源`{}`未声明轴标签，无法确认其是否符合{:?}，将不做检查",
                        source_name,
                        expected
                    );
                    self.warned = true;
                }
                Ok(())
            }
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => Err(DataError::LabelMismatch {
                source_name: source_name.to_string(),
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            }),
        }
    }
}
