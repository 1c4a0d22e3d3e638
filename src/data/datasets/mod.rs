//! 具体的数据集实现

mod images_from_file;

pub use images_from_file::ImagesFromFile;
