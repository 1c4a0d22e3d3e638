//! 数据流与图像变换的错误类型定义

use super::AxisRole;
use thiserror::Error;

/// 数据加载、变换相关错误。
/// 所有错误都在出错的那次拉取（pull）中同步抛出，本库不做任何重试或跳过。
#[derive(Debug, Error)]
pub enum DataError {
    /// 数据源声明的轴标签与变换所要求的不一致
    #[error("数据源`{source_name}`的轴标签不匹配: 期望 {expected:?}, 实际 {actual:?}")]
    LabelMismatch {
        source_name: String,
        expected: Vec<AxisRole>,
        actual: Vec<AxisRole>,
    },

    /// 裁剪窗口在某个空间轴上大于原图
    #[error("无法从空间尺寸 {extent:?} 中取出 {window:?} 的窗口")]
    WindowTooLarge {
        extent: Vec<usize>,
        window: Vec<usize>,
    },

    /// 给定的偏移量使窗口越过了原图边界
    #[error("窗口越界: 第{axis}个空间轴上偏移 {offset} + 窗口 {window} > 尺寸 {extent}")]
    InvalidWindow {
        axis: usize,
        offset: usize,
        window: usize,
        extent: usize,
    },

    /// 既不是可识别的稠密张量，也不是可识别的张量列表
    #[error("无法解读的批次格式: {0}")]
    UnsupportedContainer(String),

    /// 解码前的原始数据不是字节
    #[error("期望字节数据，实际得到{0}")]
    DecodeType(&'static str),

    /// 图像既不是2个轴也不是3个轴
    #[error("图像张量应该仅有2或3个维度，实际为{0}个")]
    UnsupportedRank(usize),

    /// 热力图的参考数据含有无穷大等无法归一化的值
    #[error("权重数据无效: {0}")]
    InvalidWeight(String),

    /// 配置错误（如未知的重采样滤波器、窗口维数不对）
    #[error("配置错误: {0}")]
    Config(String),

    /// 指定的数据源在上游中不存在
    #[error("未知数据源: {0}")]
    UnknownSource(String),

    /// 同一样本中需共同裁剪的数据源形状不一致
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 张量堆叠等形状运算失败
    #[error("张量形状错误: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// 图像编解码错误
    #[error("图像编解码错误: {0}")]
    Image(#[from] image::ImageError),

    /// IO 错误
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 通配符模式本身不合法
    #[error("通配符模式错误: {0}")]
    Pattern(#[from] glob::PatternError),

    /// 遍历通配符匹配结果时出错
    #[error("通配符遍历错误: {0}")]
    Glob(#[from] glob::GlobError),

    /// JSON 配置解析错误
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
}
