use crate::data::{AxisRole, IndexableDataset, Record, Value};
use crate::tensor::Tensor;


/// 两个数据源的小数据集：
/// - `images`：`[5, 3, 7, 5]`的稠密图像批次，标注了轴标签
/// - `targets`：`[5, 1]`，未标注轴标签
pub(super) fn image_dataset() -> IndexableDataset {
    let mut columns = Record::new();
    columns.insert(
        "images".to_string(),
        Value::Tensor(Tensor::new_arange(&[5, 3, 7, 5])),
    );
    columns.insert(
        "targets".to_string(),
        Value::Tensor(Tensor::new(&[0.0, 1.0, 2.0, 3.0, 4.0], &[5, 1])),
    );
    IndexableDataset::new(columns)
        .unwrap()
        .with_axis_labels("images", image_batch_labels())
}

pub(super) fn image_batch_labels() -> Vec<AxisRole> {
    vec![
        AxisRole::Batch,
        AxisRole::Channel,
        AxisRole::Height,
        AxisRole::Width,
    ]
}
