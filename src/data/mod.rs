/*
 * @Author       : 老董
 * @Description  : 数据加载模块：数据集、数据流以及按数据源分发的变换
 *
 * 数据以“记录”（`Record`，数据源名 -> 值）的形式在数据流之间逐次拉取。
 * 每个变换本身也是一个数据流，包装其上游，因此可以层层叠加：
 *
 * ```ignore
 * let dataset = IndexableDataset::new(columns)?;
 * let stream = DatasetStream::batches(dataset, 16).shuffle(true);
 * let stream = SourcewiseTransformer::new(stream, RandomFixedSizeCrop::new(&[32, 32])?);
 * let mut stream = SourcewiseTransformer::new(stream, RandomSpatialFlip::new(true, false));
 * for record in stream.epoch_iter() {
 *     let record = record?;
 * }
 * ```
 */

pub mod axis_labels;
pub mod config;
pub mod datasets;
mod error;
mod stream;
mod transformer;
mod value;

#[cfg(test)]
mod tests;

pub use axis_labels::{AxisLabelMap, AxisLabels, AxisRole, LabelCheck, derive_axis_labels};
pub use config::{DEFAULT_SEED, PipelineConfig, StreamConfig, TransformConfig};
pub use error::DataError;
pub use stream::{DataStream, Dataset, DatasetStream, EpochIterator, IndexableDataset};
pub use transformer::{SourcewiseTransform, SourcewiseTransformer};
pub use value::{Batch, BatchTransform, Record, Value};
