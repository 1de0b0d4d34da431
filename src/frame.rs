//! 帧与帧序列
//!
//! 帧是按行存储的灰度浮点数组。

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

use crate::error::{PivError, Result};

/// 一帧灰度图像
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Frame {
    /// 从按行存储的像素创建帧
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != width * height {
            return Err(PivError::ShapeMismatch {
                expected: (width, height),
                actual: (data.len(), 1),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// 由像素函数生成帧
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// 8 位灰度图，保留原始像素值
    pub fn from_luma8(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let data = image.as_raw().iter().map(|&v| v as f32).collect();
        Self {
            width: width as usize,
            height: height as usize,
            data,
        }
    }

    /// 16 位灰度图，保留原始像素值
    pub fn from_luma16(image: &ImageBuffer<Luma<u16>, Vec<u16>>) -> Self {
        let (width, height) = image.dimensions();
        let data = image.as_raw().iter().map(|&v| v as f32).collect();
        Self {
            width: width as usize,
            height: height as usize,
            data,
        }
    }

    /// 任意图像，按位深换算到同一标度
    ///
    /// 8 位和 16 位图像（灰度或彩色）保留原始整数强度，彩色先转为亮度；
    /// 浮点图像保持 [0, 1] 的取值。同一序列应使用相同位深的图像，
    /// 否则各帧的峰值高度不可比。
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::from_luma8(gray),
            DynamicImage::ImageLuma16(gray) => Self::from_luma16(gray),
            DynamicImage::ImageLumaA8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
                Self::from_luma8(&image.to_luma8())
            }
            DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_) => Self::from_luma16(&image.to_luma16()),
            other => {
                let gray = other.to_luma32f();
                let (width, height) = gray.dimensions();
                Self {
                    width: width as usize,
                    height: height as usize,
                    data: gray.into_raw(),
                }
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[f32] {
        &self.data
    }

    /// 第 `y` 行
    pub fn row(&self, y: usize) -> &[f32] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }
}

/// 帧序列，序号从 1 开始
pub trait FrameSequence {
    /// 帧数
    fn len(&self) -> usize;

    /// 第 `index` 帧（从 1 开始），越界返回 `None`
    fn frame(&self, index: usize) -> Option<&Frame>;

    /// 所有帧共同的宽高
    fn dimensions(&self) -> (usize, usize);

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 尺寸一致的内存帧序列
#[derive(Debug, Clone)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    /// 检查所有帧尺寸一致
    pub fn new(frames: Vec<Frame>) -> Result<Self> {
        if let Some(first) = frames.first() {
            let expected = first.dimensions();
            if let Some(bad) = frames.iter().find(|f| f.dimensions() != expected) {
                return Err(PivError::ShapeMismatch {
                    expected,
                    actual: bad.dimensions(),
                });
            }
        }
        Ok(Self { frames })
    }

    /// 从图像列表创建
    pub fn from_images(images: &[DynamicImage]) -> Result<Self> {
        Self::new(images.iter().map(Frame::from_dynamic).collect())
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}

impl FrameSequence for FrameStack {
    fn len(&self) -> usize {
        self.frames.len()
    }

    fn frame(&self, index: usize) -> Option<&Frame> {
        index.checked_sub(1).and_then(|i| self.frames.get(i))
    }

    fn dimensions(&self) -> (usize, usize) {
        self.frames.first().map(Frame::dimensions).unwrap_or((0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma8_keeps_raw_values() {
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([(x + 10 * y) as u8]));
        let frame = Frame::from_luma8(&gray);
        assert_eq!(frame.dimensions(), (3, 2));
        assert_eq!(frame.get(2, 1), 12.0);
        assert_eq!(frame.row(1), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn stack_is_one_based() {
        let a = Frame::from_fn(4, 4, |_, _| 1.0);
        let b = Frame::from_fn(4, 4, |_, _| 2.0);
        let stack = FrameStack::new(vec![a, b]).unwrap();
        assert_eq!(stack.len(), 2);
        assert!(stack.frame(0).is_none());
        assert_eq!(stack.frame(1).unwrap().get(0, 0), 1.0);
        assert_eq!(stack.frame(2).unwrap().get(0, 0), 2.0);
        assert!(stack.frame(3).is_none());
    }

    #[test]
    fn stack_rejects_mixed_sizes() {
        let a = Frame::from_fn(4, 4, |_, _| 0.0);
        let b = Frame::from_fn(4, 5, |_, _| 0.0);
        assert!(matches!(
            FrameStack::new(vec![a, b]),
            Err(PivError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn dynamic_images_convert_by_depth() {
        let deep = ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(2, 2, |x, _| Luma([1000 * x as u16]));
        let frames = FrameStack::from_images(&[
            DynamicImage::ImageLuma16(deep.clone()),
            DynamicImage::ImageLuma16(deep),
        ])
        .unwrap();
        assert_eq!(frames.frame(1).unwrap().get(1, 0), 1000.0);

        let float = image::Rgb32FImage::from_pixel(2, 2, image::Rgb([1.0, 1.0, 1.0]));
        let frame = Frame::from_dynamic(&DynamicImage::ImageRgb32F(float));
        assert!((frame.get(0, 0) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn color_and_gray_8bit_share_a_scale() {
        let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 200, 200]));
        let gray = GrayImage::from_pixel(2, 2, Luma([200]));
        let from_rgb = Frame::from_dynamic(&DynamicImage::ImageRgb8(rgb));
        let from_gray = Frame::from_dynamic(&DynamicImage::ImageLuma8(gray));
        assert_eq!(from_rgb.get(1, 1), 200.0);
        assert_eq!(from_rgb, from_gray);

        let rgb16 = ImageBuffer::<image::Rgb<u16>, Vec<u16>>::from_pixel(2, 2, image::Rgb([4000; 3]));
        let frame = Frame::from_dynamic(&DynamicImage::ImageRgb16(rgb16));
        assert_eq!(frame.get(0, 1), 4000.0);
    }

    #[test]
    fn new_checks_buffer_length() {
        assert!(Frame::new(2, 2, vec![0.0; 3]).is_err());
        assert!(Frame::new(2, 2, vec![0.0; 4]).is_ok());
    }
}
