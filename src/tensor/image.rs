use super::Tensor;
use image::{DynamicImage, GenericImageView};

impl Tensor {
    /// 将`image`库解码得到的图像转为张量，布局与解码器一致：
    /// 单通道图像为`[H, W]`，多通道图像为`[H, W, C]`。
    /// 8位、16位整数像素按原值转为浮点数，32位浮点像素原样保留。
    pub fn from_dynamic_image(image: DynamicImage) -> Tensor {
        let (width, height) = image.dimensions();
        let (height, width) = (height as usize, width as usize);

        let (channels, data): (usize, Vec<f32>) = match image {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => (
                image.color().channel_count() as usize,
                image.as_bytes().iter().map(|&v| f32::from(v)).collect(),
            ),
            DynamicImage::ImageRgb32F(buf) => (3, buf.into_raw()),
            DynamicImage::ImageRgba32F(buf) => (4, buf.into_raw()),
            DynamicImage::ImageLuma16(buf) => (1, buf.into_raw().into_iter().map(f32::from).collect()),
            DynamicImage::ImageLumaA16(buf) => {
                (2, buf.into_raw().into_iter().map(f32::from).collect())
            }
            DynamicImage::ImageRgb16(buf) => (3, buf.into_raw().into_iter().map(f32::from).collect()),
            other => (
                4,
                other.to_rgba16().into_raw().into_iter().map(f32::from).collect(),
            ),
        };

        if channels == 1 {
            Tensor::new(&data, &[height, width])
        } else {
            Tensor::new(&data, &[height, width, channels])
        }
    }
}
