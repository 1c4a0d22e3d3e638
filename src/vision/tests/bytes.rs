use super::png_bytes;
use crate::assert_err;
use crate::data::{AxisRole, DataError, SourcewiseTransform, Value};
use crate::tensor::Tensor;
use crate::vision::{ColorMode, ImagesFromBytes, Vision, to_channel_first};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};

/// 宽3高2的灰度图，像素值为`x + 10 * y`
fn gray_png() -> Vec<u8> {
    let image = GrayImage::from_fn(3, 2, |x, y| Luma([(x + 10 * y) as u8]));
    png_bytes(DynamicImage::ImageLuma8(image))
}

/// 宽2高2的彩色图，像素值为`(x, y, 100)`
fn rgb_png() -> Vec<u8> {
    let image = RgbImage::from_fn(2, 2, |x, y| Rgb([x as u8, y as u8, 100]));
    png_bytes(DynamicImage::ImageRgb8(image))
}

#[test]
fn test_decode_gray_image() {
    let decoder = ImagesFromBytes::new(None);
    let image = decoder.decode(&gray_png()).unwrap();
    assert_eq!(image.shape(), &[1, 2, 3]);
    assert_eq!(image.to_vec(), vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
}

#[test]
fn test_decode_rgb_image_channel_first() {
    let image = Vision::decode_image(&rgb_png(), None).unwrap();
    assert_eq!(image.shape(), &[3, 2, 2]);
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(image[[0, y, x]], x as f32);
            assert_eq!(image[[1, y, x]], y as f32);
            assert_eq!(image[[2, y, x]], 100.0);
        }
    }
}

#[test]
fn test_color_mode_conversion() {
    let gray = ImagesFromBytes::new(Some(ColorMode::L))
        .decode(&rgb_png())
        .unwrap();
    assert_eq!(gray.shape(), &[1, 2, 2]);

    let rgba = ImagesFromBytes::new(Some(ColorMode::Rgba))
        .decode(&gray_png())
        .unwrap();
    assert_eq!(rgba.shape(), &[4, 2, 3]);
    // 灰度扩展到RGB时三个通道相同，alpha为不透明
    assert_eq!(rgba[[0, 1, 2]], 12.0);
    assert_eq!(rgba[[2, 1, 2]], 12.0);
    assert_eq!(rgba[[3, 1, 2]], 255.0);

    let la = ImagesFromBytes::new(Some(ColorMode::La))
        .decode(&gray_png())
        .unwrap();
    assert_eq!(la.shape(), &[2, 2, 3]);
}

#[test]
fn test_sourcewise_decode() {
    let mut decoder = ImagesFromBytes::new(None);
    let example = decoder
        .transform_source_example(Value::Bytes(gray_png()), "images", None)
        .unwrap();
    assert_eq!(example.as_tensor().unwrap().shape(), &[1, 2, 3]);

    let batch = decoder
        .transform_source_batch(Value::BytesList(vec![gray_png(), rgb_png()]), "images", None)
        .unwrap()
        .into_tensor_list()
        .unwrap();
    assert_eq!(batch[0].shape(), &[1, 2, 3]);
    assert_eq!(batch[1].shape(), &[3, 2, 2]);

    assert_eq!(
        decoder.output_example_labels(),
        Some(vec![AxisRole::Channel, AxisRole::Height, AxisRole::Width])
    );
}

#[test]
fn test_decode_requires_bytes() {
    let mut decoder = ImagesFromBytes::new(None);
    assert_err!(
        decoder.transform_source_example(Value::Tensor(Tensor::zeros(&[1, 2, 2])), "images", None),
        DataError::DecodeType(_)
    );
    assert_err!(
        decoder.transform_source_batch(Value::Bytes(gray_png()), "images", None),
        DataError::DecodeType(_)
    );
    assert_err!(
        decoder.decode(&[0, 1, 2, 3]),
        DataError::Image(_)
    );
}

#[test]
fn test_to_channel_first() {
    let hwc = Tensor::new_arange(&[2, 3, 4]);
    let chw = to_channel_first(hwc.clone()).unwrap();
    assert_eq!(chw.shape(), &[4, 2, 3]);
    assert_eq!(chw[[1, 0, 2]], hwc[[0, 2, 1]]);

    assert_eq!(to_channel_first(Tensor::zeros(&[2, 3])).unwrap().shape(), &[1, 2, 3]);
    assert_err!(
        to_channel_first(Tensor::zeros(&[1, 2, 3, 4])),
        DataError::UnsupportedRank(rank) if *rank == 4
    );
}

#[test]
fn test_color_mode_names() {
    assert_eq!("RGB".parse::<ColorMode>().unwrap(), ColorMode::Rgb);
    assert_eq!("LA".parse::<ColorMode>().unwrap(), ColorMode::La);
    assert_err!("CMYK".parse::<ColorMode>(), DataError::Config(msg) if msg.contains("CMYK"));
    assert_eq!(
        serde_json::from_str::<ColorMode>("\"RGBA\"").unwrap(),
        ColorMode::Rgba
    );
    assert_eq!(serde_json::to_string(&ColorMode::L).unwrap(), "\"L\"");
}
