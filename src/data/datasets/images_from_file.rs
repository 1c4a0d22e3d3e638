/*
 * @Author       : 老董
 * @Description  : 由磁盘上的图像文件构成的数据集
 */

use crate::data::{AxisLabelMap, DataError, Dataset, Record, Value};
use crate::tensor::Tensor;
use crate::vision::Vision;
use std::path::PathBuf;

/// 图像文件数据集。
///
/// 数据源有两个：
/// - `images`：解码后的图像，布局与解码器一致（单通道`[H, W]`，多通道`[H, W, C]`），各图像尺寸可以不同
/// - `file_paths`：图像的文件路径，便于追溯来源或由下游推断标签
///
/// # 示例
/// ```ignore
/// let dataset = ImagesFromFile::new("/path/to/images/*.png", true, None, None)?;
/// let stream = DatasetStream::batches(dataset, 8).shuffle(true);
/// ```
#[derive(Debug, Clone)]
pub struct ImagesFromFile {
    pattern: String,
    file_paths: Vec<PathBuf>,
    /// 预先载入内存的图像；为`None`时按需从磁盘读取
    images: Option<Vec<Tensor>>,
    sources: Vec<String>,
    axis_labels: AxisLabelMap,
}

impl ImagesFromFile {
    /// * `pattern` - 通配符模式，如`/this/path/*.jpeg`
    /// * `load_in_memory` - `true`则在构造时载入全部图像；数据集很大而只用其中一部分时宜设为`false`
    /// * `start`、`stop` - 只取按路径排序后的`[start, stop)`这一段，越界时自动截断
    pub fn new(
        pattern: &str,
        load_in_memory: bool,
        start: Option<usize>,
        stop: Option<usize>,
    ) -> Result<Self, DataError> {
        let mut all_files = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
        all_files.sort();

        let stop = stop.unwrap_or(all_files.len()).min(all_files.len());
        let start = start.unwrap_or(0).min(stop);
        let file_paths = all_files[start..stop].to_vec();
        log::info!("通配符`{}`匹配到{}个图像文件", pattern, file_paths.len());

        let images = if load_in_memory {
            Some(
                file_paths
                    .iter()
                    .map(Vision::load_image)
                    .collect::<Result<Vec<_>, _>>()?,
            )
        } else {
            None
        };

        Ok(Self {
            pattern: pattern.to_string(),
            file_paths,
            images,
            sources: vec!["images".to_string(), "file_paths".to_string()],
            axis_labels: AxisLabelMap::new(),
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn file_paths(&self) -> &[PathBuf] {
        &self.file_paths
    }

    pub fn is_loaded_in_memory(&self) -> bool {
        self.images.is_some()
    }

    fn check_index(&self, index: usize) -> Result<(), DataError> {
        if index >= self.file_paths.len() {
            return Err(DataError::IndexOutOfBounds {
                index,
                len: self.file_paths.len(),
            });
        }
        Ok(())
    }

    fn image(&self, index: usize) -> Result<Tensor, DataError> {
        match &self.images {
            Some(images) => Ok(images[index].clone()),
            None => Vision::load_image(&self.file_paths[index]),
        }
    }
}

impl Dataset for ImagesFromFile {
    fn sources(&self) -> &[String] {
        &self.sources
    }

    fn axis_labels(&self) -> &AxisLabelMap {
        &self.axis_labels
    }

    fn num_examples(&self) -> usize {
        self.file_paths.len()
    }

    fn get_example(&mut self, index: usize) -> Result<Record, DataError> {
        self.check_index(index)?;
        let mut record = Record::new();
        record.insert("images".to_string(), Value::Tensor(self.image(index)?));
        record.insert(
            "file_paths".to_string(),
            Value::Path(self.file_paths[index].clone()),
        );
        Ok(record)
    }

    fn get_batch(&mut self, indices: &[usize]) -> Result<Record, DataError> {
        for &index in indices {
            self.check_index(index)?;
        }
        let images = indices
            .iter()
            .map(|&index| self.image(index))
            .collect::<Result<Vec<_>, _>>()?;
        let paths = indices
            .iter()
            .map(|&index| self.file_paths[index].clone())
            .collect();

        let mut record = Record::new();
        record.insert("images".to_string(), Value::TensorList(images));
        record.insert("file_paths".to_string(), Value::PathList(paths));
        Ok(record)
    }
}
