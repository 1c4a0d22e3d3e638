/*
 * @Author       : 老董
 * @Description  : 配置：默认随机种子，以及以JSON描述的图像变换链
 */

use super::{DataError, DataStream, SourcewiseTransformer};
use crate::vision::{
    ColorMode, ImageTransform, ImagesFromBytes, MinimumImageDimensions, RandomFixedSizeCrop,
    RandomSpatialFlip, ResampleFilter, SamplewiseCrop,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 未显式指定随机数生成器或种子时使用的默认种子
pub const DEFAULT_SEED: u64 = 1;

/// 数据流的公共配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// 变换未单独指定种子时使用的种子
    pub default_seed: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            default_seed: DEFAULT_SEED,
        }
    }
}

impl StreamConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// 变换链中的一环。`which_sources`缺省时作用于上游的所有数据源。
///
/// ```json
/// { "type": "random_fixed_size_crop", "window_shape": [5, 4], "which_sources": ["images"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformConfig {
    ImagesFromBytes {
        #[serde(default)]
        color_mode: Option<ColorMode>,
        #[serde(default)]
        which_sources: Option<Vec<String>>,
    },
    MinimumImageDimensions {
        /// `(height, width)`
        minimum_shape: [usize; 2],
        #[serde(default)]
        resample: ResampleFilter,
        #[serde(default)]
        which_sources: Option<Vec<String>>,
    },
    RandomFixedSizeCrop {
        window_shape: Vec<usize>,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        which_sources: Option<Vec<String>>,
    },
    RandomSpatialFlip {
        #[serde(default)]
        flip_h: bool,
        #[serde(default)]
        flip_v: bool,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        which_sources: Option<Vec<String>>,
    },
    SamplewiseCrop {
        window_shape: [usize; 3],
        #[serde(default)]
        weight_source: Option<String>,
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default)]
        which_sources: Option<Vec<String>>,
    },
}

impl TransformConfig {
    /// 在上游数据流之上套一层本变换
    pub fn build<'a>(
        &self,
        upstream: Box<dyn DataStream + 'a>,
        default_seed: u64,
    ) -> Result<Box<dyn DataStream + 'a>, DataError> {
        let (transform, which_sources): (ImageTransform, _) = match self {
            TransformConfig::ImagesFromBytes {
                color_mode,
                which_sources,
            } => (ImagesFromBytes::new(*color_mode).into(), which_sources),
            TransformConfig::MinimumImageDimensions {
                minimum_shape,
                resample,
                which_sources,
            } => (
                MinimumImageDimensions::new(*minimum_shape, *resample).into(),
                which_sources,
            ),
            TransformConfig::RandomFixedSizeCrop {
                window_shape,
                seed,
                which_sources,
            } => (
                RandomFixedSizeCrop::new(window_shape)?
                    .seed(seed.unwrap_or(default_seed))
                    .into(),
                which_sources,
            ),
            TransformConfig::RandomSpatialFlip {
                flip_h,
                flip_v,
                seed,
                which_sources,
            } => (
                RandomSpatialFlip::new(*flip_h, *flip_v)
                    .seed(seed.unwrap_or(default_seed))
                    .into(),
                which_sources,
            ),
            TransformConfig::SamplewiseCrop {
                window_shape,
                weight_source,
                seed,
                which_sources,
            } => {
                let mut crop = SamplewiseCrop::new(upstream, *window_shape)?
                    .seed(seed.unwrap_or(default_seed));
                if let Some(names) = which_sources {
                    crop = crop.which_sources(names.iter().cloned())?;
                }
                if let Some(name) = weight_source {
                    crop = crop.weight_source(name.clone())?;
                }
                return Ok(Box::new(crop));
            }
        };

        let mut transformer = SourcewiseTransformer::new(upstream, transform);
        if let Some(names) = which_sources {
            transformer = transformer.which_sources(names.iter().cloned())?;
        }
        Ok(Box::new(transformer))
    }
}

/// 完整的变换链配置
///
/// ```json
/// {
///   "stream": { "default_seed": 7 },
///   "transforms": [
///     { "type": "images_from_bytes", "color_mode": "RGB" },
///     { "type": "random_spatial_flip", "flip_h": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub transforms: Vec<TransformConfig>,
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// 按顺序把各变换套在`upstream`之上，返回最外层的数据流
    pub fn build<'a>(
        &self,
        upstream: Box<dyn DataStream + 'a>,
    ) -> Result<Box<dyn DataStream + 'a>, DataError> {
        self.transforms
            .iter()
            .try_fold(upstream, |stream, transform| {
                transform.build(stream, self.stream.default_seed)
            })
    }
}
