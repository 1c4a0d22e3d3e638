/*
 * @Author       : 老董
 * @Description  : 按数据源（source-wise）分发的变换包装器：
 *                 只处理被指定的数据源，其余数据源原样透传
 */

use super::axis_labels::derive_axis_labels;
use super::stream::{DataStream, EpochIterator};
use super::{AxisLabelMap, AxisRole, AxisLabels, DataError, Record, Value};
use enum_dispatch::enum_dispatch;

/// 单个数据源上的变换。
/// `labels`是上游为该数据源声明的轴标签（未声明时为`None`），由实现者自行校验。
#[enum_dispatch]
pub trait SourcewiseTransform {
    fn transform_source_example(
        &mut self,
        example: Value,
        source_name: &str,
        labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError>;

    fn transform_source_batch(
        &mut self,
        batch: Value,
        source_name: &str,
        labels: Option<&[AxisRole]>,
    ) -> Result<Value, DataError>;

    /// 变换后被处理的数据源在单样本下的轴标签；`None`表示沿用上游标签
    fn output_example_labels(&self) -> Option<AxisLabels> {
        None
    }
}

/// 把`SourcewiseTransform`套在上游数据流上，本身也是一个数据流
pub struct SourcewiseTransformer<S, T> {
    data_stream: S,
    transform: T,
    which_sources: Vec<String>,
    axis_labels: AxisLabelMap,
}

impl<S: DataStream, T: SourcewiseTransform> SourcewiseTransformer<S, T> {
    /// 默认对上游的所有数据源做变换
    pub fn new(data_stream: S, transform: T) -> Self {
        let which_sources = data_stream.sources().to_vec();
        let axis_labels = Self::make_axis_labels(&data_stream, &transform, &which_sources);
        Self {
            data_stream,
            transform,
            which_sources,
            axis_labels,
        }
    }

    /// 只对指定的数据源做变换
    pub fn which_sources<I, N>(mut self, names: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect::<Vec<String>>();
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.data_stream.sources().contains(name))
        {
            return Err(DataError::UnknownSource(unknown.clone()));
        }
        self.axis_labels = Self::make_axis_labels(&self.data_stream, &self.transform, &names);
        self.which_sources = names;
        Ok(self)
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut T {
        &mut self.transform
    }

    pub fn designated_sources(&self) -> &[String] {
        &self.which_sources
    }

    fn make_axis_labels(data_stream: &S, transform: &T, which_sources: &[String]) -> AxisLabelMap {
        match transform.output_example_labels() {
            Some(example_labels) => derive_axis_labels(
                data_stream.axis_labels(),
                data_stream.sources(),
                which_sources,
                data_stream.produces_examples(),
                &example_labels,
            ),
            None => data_stream.axis_labels().clone(),
        }
    }
}

impl<S: DataStream, T: SourcewiseTransform> DataStream for SourcewiseTransformer<S, T> {
    fn sources(&self) -> &[String] {
        self.data_stream.sources()
    }

    fn axis_labels(&self) -> &AxisLabelMap {
        &self.axis_labels
    }

    fn produces_examples(&self) -> bool {
        self.data_stream.produces_examples()
    }

    fn epoch_iter(&mut self) -> EpochIterator<'_> {
        let produces_examples = self.data_stream.produces_examples();
        let upstream_labels = self.data_stream.axis_labels().clone();
        let Self {
            data_stream,
            transform,
            which_sources,
            ..
        } = self;
        let which_sources = &*which_sources;

        Box::new(data_stream.epoch_iter().map(move |record| {
            record?
                .into_iter()
                .map(|(name, value)| {
                    if !which_sources.contains(&name) {
                        return Ok((name, value));
                    }
                    let labels = upstream_labels.get(&name).map(Vec::as_slice);
                    let value = if produces_examples {
                        transform.transform_source_example(value, &name, labels)?
                    } else {
                        transform.transform_source_batch(value, &name, labels)?
                    };
                    Ok((name, value))
                })
                .collect::<Result<Record, DataError>>()
        }))
    }
}
