use crate::tensor::Tensor;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

#[test]
fn test_from_luma_image() {
    let mut image = GrayImage::new(3, 2);
    image.put_pixel(2, 1, Luma([200]));
    let tensor = Tensor::from_dynamic_image(DynamicImage::ImageLuma8(image));
    // 单通道图像保留解码器的`[H, W]`布局
    assert_eq!(tensor.shape(), &[2, 3]);
    assert_eq!(tensor[[1, 2]], 200.0);
}

#[test]
fn test_from_rgb_image() {
    let mut image = RgbImage::new(4, 2);
    image.put_pixel(3, 0, Rgb([10, 20, 30]));
    let tensor = Tensor::from_dynamic_image(DynamicImage::ImageRgb8(image));
    assert_eq!(tensor.shape(), &[2, 4, 3]);
    assert_eq!(tensor[[0, 3, 0]], 10.0);
    assert_eq!(tensor[[0, 3, 1]], 20.0);
    assert_eq!(tensor[[0, 3, 2]], 30.0);
}
