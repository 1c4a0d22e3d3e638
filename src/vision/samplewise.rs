/*
 * @Author       : 老董
 * @Description  : 逐样本（sample-wise）的体数据裁剪：
 *                 同一样本中多个配准的数据源共用同一个窗口偏移量，
 *                 偏移量可由权重数据源的热力图引导
 */

use super::heatmap::Heatmap;
use super::sampler::{CropSampler, check_window};
use super::window::{extract_window, extract_windows};
use crate::data::axis_labels::with_batch_axis;
use crate::data::{AxisLabelMap, AxisRole, Batch, DataError, DataStream, EpochIterator, LabelCheck, Record, Value};
use crate::tensor::Tensor;
use ndarray::Axis;
use rand::rngs::StdRng;

/// 体数据单样本的轴标签
const EXAMPLE_LABELS: [AxisRole; 4] = [AxisRole::Channel, AxisRole::X, AxisRole::Y, AxisRole::Z];

/// 对体数据`[C, X, Y, Z]`（批次为`[N, C, X, Y, Z]`或样本列表）做逐样本裁剪。
///
/// 与`RandomFixedSizeCrop`不同，这里同一样本中所有被指定的数据源（以及权重数据源）
/// 必须空间尺寸一致，并且被裁剪在同一位置，从而保持它们之间的空间对应关系。
/// 不同样本之间的偏移量仍各自独立。
///
/// 指定了权重数据源时，由该样本的权重数据计算热力图并按其抽取窗口中心；
/// 被裁剪的权重数据以`weight / Z`的形式输出。未指定时退化为均匀采样。
///
/// # 示例
/// ```ignore
/// let stream = SamplewiseCrop::new(stream, [2, 2, 2])?
///     .which_sources(["volume1", "volume2", "weight"])?
///     .weight_source("weight")?
///     .seed(42);
/// ```
pub struct SamplewiseCrop<S> {
    data_stream: S,
    window_shape: [usize; 3],
    which_sources: Vec<String>,
    weight_source: Option<String>,
    sampler: CropSampler,
    label_check: LabelCheck,
}

impl<S: DataStream> SamplewiseCrop<S> {
    /// 默认裁剪上游的所有数据源，不使用权重；窗口某个轴为0时返回配置错误
    pub fn new(data_stream: S, window_shape: [usize; 3]) -> Result<Self, DataError> {
        check_window(&window_shape)?;
        let which_sources = data_stream.sources().to_vec();
        Ok(Self {
            data_stream,
            window_shape,
            which_sources,
            weight_source: None,
            sampler: CropSampler::default(),
            label_check: LabelCheck::new(),
        })
    }

    /// 只裁剪指定的数据源
    pub fn which_sources<I, N>(mut self, names: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let names = names.into_iter().map(Into::into).collect::<Vec<String>>();
        for name in &names {
            self.check_source(name)?;
        }
        self.which_sources = names;
        Ok(self)
    }

    /// 指定用于计算热力图的权重数据源
    pub fn weight_source(mut self, name: impl Into<String>) -> Result<Self, DataError> {
        let name = name.into();
        self.check_source(&name)?;
        self.weight_source = Some(name);
        Ok(self)
    }

    /// 设置随机种子
    pub fn seed(mut self, seed: u64) -> Self {
        self.sampler = CropSampler::from_seed(seed);
        self
    }

    /// 直接指定随机数生成器，它将由本变换独占
    pub fn rng(mut self, rng: StdRng) -> Self {
        self.sampler = CropSampler::new(rng);
        self
    }

    pub fn window_shape(&self) -> &[usize; 3] {
        &self.window_shape
    }

    pub fn designated_sources(&self) -> &[String] {
        &self.which_sources
    }

    /// 按本变换的窗口为单个样本`[C, X, Y, Z]`计算热力图
    pub fn calculate_heatmap(&self, reference: &Tensor) -> Result<Heatmap, DataError> {
        Heatmap::from_view(reference.view(), &self.window_shape)
    }

    fn check_source(&self, name: &str) -> Result<(), DataError> {
        if self.data_stream.sources().iter().any(|s| s == name) {
            Ok(())
        } else {
            Err(DataError::UnknownSource(name.to_string()))
        }
    }
}

/// 一次拉取中参与裁剪的全部状态，与上游数据流的借用分开，便于在迭代器闭包中使用
struct CropState<'a> {
    window_shape: &'a [usize; 3],
    which_sources: &'a [String],
    weight_source: Option<&'a str>,
    sampler: &'a mut CropSampler,
    label_check: &'a mut LabelCheck,
}

impl CropState<'_> {
    fn crop_record(
        &mut self,
        mut record: Record,
        labels: &AxisLabelMap,
        produces_examples: bool,
    ) -> Result<Record, DataError> {
        let expected = if produces_examples {
            EXAMPLE_LABELS.to_vec()
        } else {
            with_batch_axis(&EXAMPLE_LABELS)
        };
        let involved = self
            .which_sources
            .iter()
            .map(String::as_str)
            .chain(self.weight_source)
            .collect::<Vec<_>>();
        for &name in &involved {
            self.label_check
                .verify(&expected, labels.get(name).map(Vec::as_slice), name)?;
        }
        if self.which_sources.is_empty() {
            return Ok(record);
        }

        // 取出被指定的数据源，裁剪后再放回原位，保持数据源顺序
        let mut batches = Vec::with_capacity(self.which_sources.len());
        for name in self.which_sources {
            let slot = record
                .get_mut(name)
                .ok_or_else(|| DataError::UnknownSource(name.clone()))?;
            let value = std::mem::replace(slot, Value::TensorList(Vec::new()));
            batches.push(to_batch(value, produces_examples)?);
        }
        let weight_batch = match self.weight_source {
            None => None,
            Some(weight) => match self.which_sources.iter().position(|s| s == weight) {
                Some(index) => Some(WeightBatch::Designated(index)),
                None => {
                    let value = record
                        .get(weight)
                        .cloned()
                        .ok_or_else(|| DataError::UnknownSource(weight.to_string()))?;
                    Some(WeightBatch::PassThrough(to_batch(value, produces_examples)?))
                }
            },
        };

        let (offsets, normalizers) = {
            let weight = weight_batch.as_ref().map(|w| match w {
                WeightBatch::Designated(index) => &batches[*index],
                WeightBatch::PassThrough(batch) => batch,
            });
            self.sample_offsets(&batches, weight)?
        };
        log::debug!(
            "逐样本裁剪{}个样本的数据源{:?}，窗口{:?}",
            offsets.len(),
            self.which_sources,
            self.window_shape
        );

        for (name, batch) in self.which_sources.iter().zip(batches) {
            let mut cropped = crop_batch(batch, &offsets, self.window_shape)?;
            if self.weight_source == Some(name.as_str()) {
                normalize_weight(&mut cropped, &normalizers);
            }
            if let Some(slot) = record.get_mut(name) {
                *slot = from_batch(cropped, produces_examples)?;
            }
        }
        Ok(record)
    }

    /// 为批次中每个样本抽取一个偏移量（`[n][axis]`），并给出各样本权重的归一化系数
    fn sample_offsets(
        &mut self,
        batches: &[Batch],
        weight: Option<&Batch>,
    ) -> Result<(Vec<Vec<usize>>, Vec<f32>), DataError> {
        let len = batches[0].len();
        for batch in batches.iter().chain(weight) {
            if batch.len() != len {
                return Err(DataError::ShapeMismatch {
                    expected: vec![len],
                    got: vec![batch.len()],
                });
            }
        }

        let mut offsets = Vec::with_capacity(len);
        let mut normalizers = Vec::with_capacity(len);
        for n in 0..len {
            let extent = batches[0].spatial_shape(n);
            for batch in batches.iter().chain(weight) {
                let other = batch.spatial_shape(n);
                if other != extent {
                    return Err(DataError::ShapeMismatch {
                        expected: extent,
                        got: other,
                    });
                }
            }
            match weight {
                Some(weight) => {
                    let heatmap = Heatmap::from_view(weight.example_view(n), self.window_shape)?;
                    offsets.push(heatmap.sample_offset(self.sampler.rng_mut()));
                    normalizers.push(heatmap.normalizer());
                }
                None => offsets.push(self.sampler.sample_example(&extent, self.window_shape)?),
            }
        }
        Ok((offsets, normalizers))
    }
}

enum WeightBatch {
    /// 权重数据源本身也要裁剪，位于`batches`中的下标
    Designated(usize),
    /// 权重数据源只用于计算热力图，原样透传
    PassThrough(Batch),
}

/// 单样本模式下把样本包装成只含一个元素的列表，与批次模式共用同一套逻辑
fn to_batch(value: Value, produces_examples: bool) -> Result<Batch, DataError> {
    if !produces_examples {
        return Batch::from_value(value, Some(EXAMPLE_LABELS.len()));
    }
    match value {
        Value::Tensor(example) if example.dimension() == EXAMPLE_LABELS.len() => {
            Ok(Batch::Ragged(vec![example]))
        }
        Value::Tensor(example) => Err(DataError::UnsupportedContainer(format!(
            "期望形状为[C, X, Y, Z]的样本，实际形状为{:?}",
            example.shape()
        ))),
        other => Err(DataError::UnsupportedContainer(format!(
            "期望单个样本张量，实际得到{}",
            other.kind()
        ))),
    }
}

fn from_batch(batch: Batch, produces_examples: bool) -> Result<Value, DataError> {
    if !produces_examples {
        return Ok(batch.into_value());
    }
    match batch {
        Batch::Ragged(mut list) if list.len() == 1 => Ok(Value::Tensor(list.remove(0))),
        other => Err(DataError::UnsupportedContainer(format!(
            "单样本模式下应恰好得到1个样本，实际得到{}个",
            other.len()
        ))),
    }
}

/// 所有样本共用偏移量表`offsets[n][axis]`
fn crop_batch(batch: Batch, offsets: &[Vec<usize>], window: &[usize]) -> Result<Batch, DataError> {
    match batch {
        Batch::Dense(tensor) => {
            let per_axis = (0..window.len())
                .map(|axis| offsets.iter().map(|offset| offset[axis]).collect())
                .collect::<Vec<Vec<usize>>>();
            Ok(Batch::Dense(extract_windows(&tensor, &per_axis, window)?))
        }
        Batch::Ragged(list) => Ok(Batch::Ragged(
            list.iter()
                .zip(offsets)
                .map(|(example, offset)| extract_window(example, offset, window))
                .collect::<Result<Vec<_>, _>>()?,
        )),
    }
}

/// 权重数据除以各自热力图的归一化系数；系数为0时原样保留
fn normalize_weight(batch: &mut Batch, normalizers: &[f32]) {
    let scale = |mut example: ndarray::ArrayViewMutD<'_, f32>, z: f32| {
        if z > 0.0 {
            example.mapv_inplace(|v| v / z);
        }
    };
    match batch {
        Batch::Dense(tensor) => {
            for (example, &z) in tensor.view_mut().axis_iter_mut(Axis(0)).zip(normalizers) {
                scale(example, z);
            }
        }
        Batch::Ragged(list) => {
            for (example, &z) in list.iter_mut().zip(normalizers) {
                scale(example.view_mut(), z);
            }
        }
    }
}

impl<S: DataStream> DataStream for SamplewiseCrop<S> {
    fn sources(&self) -> &[String] {
        self.data_stream.sources()
    }

    /// 裁剪只改变空间尺寸，不改变轴的角色，因此沿用上游标签
    fn axis_labels(&self) -> &AxisLabelMap {
        self.data_stream.axis_labels()
    }

    fn produces_examples(&self) -> bool {
        self.data_stream.produces_examples()
    }

    fn epoch_iter(&mut self) -> EpochIterator<'_> {
        let produces_examples = self.data_stream.produces_examples();
        let labels = self.data_stream.axis_labels().clone();
        let Self {
            data_stream,
            window_shape,
            which_sources,
            weight_source,
            sampler,
            label_check,
        } = self;
        let mut state = CropState {
            window_shape,
            which_sources,
            weight_source: weight_source.as_deref(),
            sampler,
            label_check,
        };

        Box::new(
            data_stream
                .epoch_iter()
                .map(move |record| state.crop_record(record?, &labels, produces_examples)),
        )
    }
}
