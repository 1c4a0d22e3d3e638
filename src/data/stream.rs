/*
 * @Author       : 老董
 * @Description  : 数据集与数据流：按需（拉取式）地给出单个样本或批次
 *
 * 提供统一的数据迭代 API，支持：
 * - 逐样本或自动分批 (batch_size)
 * - 随机打乱 (shuffle)，随机数生成器由数据流自己持有，跨epoch不重置
 * - 丢弃不完整批次 (drop_last)
 */

use super::config::DEFAULT_SEED;
use super::{AxisLabelMap, AxisLabels, DataError, Record, Value};
use indexmap::IndexMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// 一个epoch内逐次拉取的结果
pub type EpochIterator<'a> = Box<dyn Iterator<Item = Result<Record, DataError>> + 'a>;

/// 可按索引取数据的数据集
pub trait Dataset {
    /// 数据源名，顺序即每条记录中数据源的顺序
    fn sources(&self) -> &[String];

    fn axis_labels(&self) -> &AxisLabelMap;

    fn num_examples(&self) -> usize;

    /// 取出单个样本
    fn get_example(&mut self, index: usize) -> Result<Record, DataError>;

    /// 取出一个批次
    fn get_batch(&mut self, indices: &[usize]) -> Result<Record, DataError>;
}

/// 数据流：上游给下游的统一接口，各变换本身也是数据流，因此可以层层包装
pub trait DataStream {
    fn sources(&self) -> &[String];

    fn axis_labels(&self) -> &AxisLabelMap;

    /// `true`则每次拉取得到单个样本，否则得到批次
    fn produces_examples(&self) -> bool;

    /// 开始新的一个epoch
    fn epoch_iter(&mut self) -> EpochIterator<'_>;
}

impl<S: DataStream + ?Sized> DataStream for Box<S> {
    fn sources(&self) -> &[String] {
        (**self).sources()
    }

    fn axis_labels(&self) -> &AxisLabelMap {
        (**self).axis_labels()
    }

    fn produces_examples(&self) -> bool {
        (**self).produces_examples()
    }

    fn epoch_iter(&mut self) -> EpochIterator<'_> {
        (**self).epoch_iter()
    }
}

/// IndexableDataset - 全部数据都在内存中的数据集
///
/// 每个数据源是一列：
/// - `Value::Tensor`：首个维度为样本数的稠密张量，按批次取出时仍为稠密批次
/// - `Value::TensorList`/`BytesList`/`PathList`：逐样本存放，按批次取出时为列表
///
/// # 示例
/// ```ignore
/// let mut columns = Record::new();
/// columns.insert("images".to_string(), Value::Tensor(images));
/// let dataset = IndexableDataset::new(columns)?
///     .with_axis_labels("images", vec![AxisRole::Batch, AxisRole::Channel, AxisRole::Height, AxisRole::Width]);
/// ```
#[derive(Debug, Clone)]
pub struct IndexableDataset {
    sources: Vec<String>,
    columns: Record,
    axis_labels: AxisLabelMap,
    len: usize,
}

impl IndexableDataset {
    /// 创建新的 IndexableDataset，各列的样本数必须一致
    pub fn new(columns: Record) -> Result<Self, DataError> {
        let mut len = None;
        for (name, column) in &columns {
            let column_len = match column {
                Value::Tensor(tensor) if tensor.dimension() > 0 => tensor.shape()[0],
                Value::TensorList(list) => list.len(),
                Value::BytesList(list) => list.len(),
                Value::PathList(list) => list.len(),
                other => {
                    return Err(DataError::UnsupportedContainer(format!(
                        "数据源`{}`无法按样本索引：{}",
                        name,
                        other.kind()
                    )));
                }
            };
            match len {
                None => len = Some(column_len),
                Some(expected) if expected != column_len => {
                    return Err(DataError::ShapeMismatch {
                        expected: vec![expected],
                        got: vec![column_len],
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            sources: columns.keys().cloned().collect(),
            columns,
            axis_labels: AxisLabelMap::new(),
            len: len.unwrap_or(0),
        })
    }

    /// 为某个数据源声明轴标签（以批次形式描述，即首个角色为`batch`）
    pub fn with_axis_labels(mut self, source: &str, labels: AxisLabels) -> Self {
        self.axis_labels.insert(source.to_string(), labels);
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn check_index(&self, index: usize) -> Result<(), DataError> {
        if index >= self.len {
            return Err(DataError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(())
    }
}

impl Dataset for IndexableDataset {
    fn sources(&self) -> &[String] {
        &self.sources
    }

    fn axis_labels(&self) -> &AxisLabelMap {
        &self.axis_labels
    }

    fn num_examples(&self) -> usize {
        self.len
    }

    fn get_example(&mut self, index: usize) -> Result<Record, DataError> {
        self.check_index(index)?;
        let mut record = Record::new();
        for (name, column) in &self.columns {
            let value = match column {
                Value::Tensor(tensor) => Value::Tensor(tensor.select_first(index)),
                Value::TensorList(list) => Value::Tensor(list[index].clone()),
                Value::BytesList(list) => Value::Bytes(list[index].clone()),
                Value::PathList(list) => Value::Path(list[index].clone()),
                // 构造时已排除
                Value::Bytes(_) | Value::Path(_) => unreachable!(),
            };
            record.insert(name.clone(), value);
        }
        Ok(record)
    }

    fn get_batch(&mut self, indices: &[usize]) -> Result<Record, DataError> {
        for &index in indices {
            self.check_index(index)?;
        }
        let mut record = Record::new();
        for (name, column) in &self.columns {
            let value = match column {
                Value::Tensor(tensor) => Value::Tensor(tensor.select_many(indices)),
                Value::TensorList(list) => {
                    Value::TensorList(indices.iter().map(|&i| list[i].clone()).collect())
                }
                Value::BytesList(list) => {
                    Value::BytesList(indices.iter().map(|&i| list[i].clone()).collect())
                }
                Value::PathList(list) => {
                    Value::PathList(indices.iter().map(|&i| list[i].clone()).collect())
                }
                Value::Bytes(_) | Value::Path(_) => unreachable!(),
            };
            record.insert(name.clone(), value);
        }
        Ok(record)
    }
}

/// DatasetStream - 把数据集包装成数据流
///
/// # 示例
/// ```ignore
/// let mut stream = DatasetStream::batches(dataset, 2)
///     .shuffle(true)
///     .seed(42);
///
/// for record in stream.epoch_iter() {
///     let record = record?;
/// }
/// ```
pub struct DatasetStream<D> {
    dataset: D,
    batch_size: Option<usize>,
    shuffle: bool,
    drop_last: bool,
    rng: StdRng,
    axis_labels: AxisLabelMap,
}

impl<D: Dataset> DatasetStream<D> {
    /// 逐样本给出数据，数据集中以批次描述的轴标签会去掉首个`batch`角色
    pub fn examples(dataset: D) -> Self {
        let axis_labels = dataset
            .axis_labels()
            .iter()
            .map(|(name, labels)| {
                let labels = match labels.split_first() {
                    Some((super::AxisRole::Batch, rest)) => rest.to_vec(),
                    _ => labels.clone(),
                };
                (name.clone(), labels)
            })
            .collect::<IndexMap<_, _>>();
        Self {
            dataset,
            batch_size: None,
            shuffle: false,
            drop_last: false,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            axis_labels,
        }
    }

    /// 按`batch_size`分批给出数据
    ///
    /// # Panics
    /// 如果`batch_size`为0
    pub fn batches(dataset: D, batch_size: usize) -> Self {
        assert!(batch_size > 0, "DatasetStream: batch_size 必须大于 0");
        let axis_labels = dataset.axis_labels().clone();
        Self {
            dataset,
            batch_size: Some(batch_size),
            shuffle: false,
            drop_last: false,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            axis_labels,
        }
    }

    /// 设置是否在每个epoch开始时打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// 直接指定随机数生成器
    pub fn rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    /// 每个epoch的拉取次数
    pub fn num_requests(&self) -> usize {
        let n = self.dataset.num_examples();
        match self.batch_size {
            None => n,
            Some(batch_size) if self.drop_last => n / batch_size,
            Some(batch_size) => n.div_ceil(batch_size),
        }
    }

    fn epoch_order(&mut self) -> Vec<usize> {
        let mut indices = (0..self.dataset.num_examples()).collect::<Vec<_>>();
        if self.shuffle {
            indices.shuffle(&mut self.rng);
        }
        indices
    }
}

impl<D: Dataset> DataStream for DatasetStream<D> {
    fn sources(&self) -> &[String] {
        self.dataset.sources()
    }

    fn axis_labels(&self) -> &AxisLabelMap {
        &self.axis_labels
    }

    fn produces_examples(&self) -> bool {
        self.batch_size.is_none()
    }

    fn epoch_iter(&mut self) -> EpochIterator<'_> {
        let order = self.epoch_order();
        let dataset = &mut self.dataset;
        match self.batch_size {
            None => Box::new(order.into_iter().map(move |i| dataset.get_example(i))),
            Some(batch_size) => {
                let drop_last = self.drop_last;
                let requests = order
                    .chunks(batch_size)
                    .filter(|chunk| !drop_last || chunk.len() == batch_size)
                    .map(|chunk| chunk.to_vec())
                    .collect::<Vec<_>>();
                Box::new(
                    requests
                        .into_iter()
                        .map(move |request| dataset.get_batch(&request)),
                )
            }
        }
    }
}
