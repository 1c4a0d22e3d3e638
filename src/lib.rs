//! # Stream Vision
//!
//! `stream_vision`用纯rust实现机器学习数据管道中与图像相关的部分：
//! 从磁盘或字节流读取图像、整理布局、放大与裁剪，并在逐样本或逐批次拉取数据时
//! 施加随机翻转、随机裁剪等数据增强，最终为训练循环提供形状固定的张量。
//!
//! - [`tensor`]：`f32`稠密张量
//! - [`data`]：数据集、数据流与按数据源分发的变换
//! - [`vision`]：解码、放大、裁剪（含热力图引导的体数据裁剪）与翻转
//!

pub mod data;
pub mod tensor;
pub mod utils;
pub mod vision;
