use image::{DynamicImage, ImageOutputFormat};
use std::io::Cursor;

mod bytes;
mod heatmap;
mod sampler;

/// 把图像编码为PNG字节
pub(super) fn png_bytes(image: DynamicImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageOutputFormat::Png).unwrap();
    cursor.into_inner()
}
