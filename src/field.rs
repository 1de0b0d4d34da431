//! 速度场组装
//!
//! 对每个网格点（窗口左上角，步长 1 像素）截取前后窗口、求互相关、定位峰值，
//! 结果写到窗口中心 `(x + size/2, y + size/2)`。未计算的位置保持 0。

use image::GrayImage;
use log::debug;
use rayon::prelude::*;

use crate::error::{PivError, Result};
use crate::fft::{CrossCorrelator, FftTransform, SpectralTransform};
use crate::frame::Frame;
use crate::pairing::FramePair;
use crate::peak::{locate_peak, DisplacementVector};
use crate::window::sample_block;

/// 感兴趣区域，按网格点中心判断是否参与计算
pub trait Roi: Sync {
    fn contains(&self, x: usize, y: usize) -> bool;
}

impl<F> Roi for F
where
    F: Fn(usize, usize) -> bool + Sync,
{
    fn contains(&self, x: usize, y: usize) -> bool {
        self(x, y)
    }
}

/// 矩形区域 `[x, x + width) × [y, y + height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectRoi {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl RectRoi {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Roi for RectRoi {
    fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// 任意形状区域，掩膜中非零像素为区域内
#[derive(Debug, Clone)]
pub struct MaskRoi {
    mask: GrayImage,
}

impl MaskRoi {
    pub fn new(mask: GrayImage) -> Self {
        Self { mask }
    }
}

impl Roi for MaskRoi {
    fn contains(&self, x: usize, y: usize) -> bool {
        let (width, height) = self.mask.dimensions();
        if x >= width as usize || y >= height as usize {
            return false;
        }
        self.mask.get_pixel(x as u32, y as u32)[0] != 0
    }
}

/// 一对帧的速度场：U、V 和峰值高度三张与原图同尺寸的数组
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    pair: FramePair,
    width: usize,
    height: usize,
    window_size: usize,
    u: Vec<f32>,
    v: Vec<f32>,
    peak_height: Vec<f32>,
}

impl VectorField {
    fn zeros(pair: FramePair, width: usize, height: usize, window_size: usize) -> Self {
        let len = width * height;
        Self {
            pair,
            width,
            height,
            window_size,
            u: vec![0.0; len],
            v: vec![0.0; len],
            peak_height: vec![0.0; len],
        }
    }

    pub fn pair(&self) -> FramePair {
        self.pair
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn u(&self) -> &[f32] {
        &self.u
    }

    pub fn v(&self) -> &[f32] {
        &self.v
    }

    pub fn peak_height(&self) -> &[f32] {
        &self.peak_height
    }

    pub fn get(&self, x: usize, y: usize) -> DisplacementVector {
        let i = y * self.width + x;
        DisplacementVector {
            u: self.u[i],
            v: self.v[i],
            peak_height: self.peak_height[i],
        }
    }

    /// 网格点中心可能出现的范围 `(x_range, y_range)`，ROI 之外的点仍为 0
    pub fn grid_centers(&self) -> (std::ops::RangeInclusive<usize>, std::ops::RangeInclusive<usize>) {
        let half = self.window_size / 2;
        (
            half..=self.width - self.window_size + half,
            half..=self.height - self.window_size + half,
        )
    }

    fn set(&mut self, x: usize, y: usize, d: DisplacementVector) {
        let i = y * self.width + x;
        self.u[i] = d.u;
        self.v[i] = d.v;
        self.peak_height[i] = d.peak_height;
    }

    /// 掩膜用：峰值高度只读，U/V 可写
    pub(crate) fn masking_view(&mut self) -> (&mut [f32], &mut [f32], &[f32]) {
        (&mut self.u, &mut self.v, &self.peak_height)
    }
}

/// 逐网格点计算并组装速度场
pub struct FieldAssembler<T: SpectralTransform = FftTransform> {
    correlator: CrossCorrelator<T>,
    interpolate: bool,
}

impl FieldAssembler<FftTransform> {
    pub fn new(window_size: usize, interpolate: bool) -> Result<Self> {
        Ok(Self::with_correlator(CrossCorrelator::new(window_size)?, interpolate))
    }
}

impl<T: SpectralTransform> FieldAssembler<T> {
    pub fn with_correlator(correlator: CrossCorrelator<T>, interpolate: bool) -> Self {
        Self {
            correlator,
            interpolate,
        }
    }

    pub fn window_size(&self) -> usize {
        self.correlator.size()
    }

    /// 计算单个网格点（窗口左上角为 `(x, y)`）
    pub fn displacement_at(
        &self,
        back: &Frame,
        front: &Frame,
        x: usize,
        y: usize,
    ) -> Result<DisplacementVector> {
        let size = self.window_size();
        let back_block = sample_block(back, x, y, size)?;
        let front_block = sample_block(front, x, y, size)?;
        let map = self.correlator.correlate(&back_block, &front_block)?;
        Ok(locate_peak(&map, self.interpolate).into())
    }

    /// 组装一对帧的完整速度场
    ///
    /// 各网格点互不依赖，并行计算的结果与顺序计算一致。
    pub fn assemble(
        &self,
        pair: FramePair,
        back: &Frame,
        front: &Frame,
        roi: Option<&dyn Roi>,
    ) -> Result<VectorField> {
        let size = self.window_size();
        let (width, height) = back.dimensions();
        if front.dimensions() != (width, height) {
            return Err(PivError::ShapeMismatch {
                expected: (width, height),
                actual: front.dimensions(),
            });
        }
        if width < size || height < size {
            return Err(PivError::invalid(format!(
                "窗口 {size}x{size} 大于图像 {width}x{height}"
            )));
        }

        let half = size / 2;
        let coords: Vec<(usize, usize)> = (0..=(height - size))
            .flat_map(|y| (0..=(width - size)).map(move |x| (x, y)))
            .filter(|&(x, y)| roi.map_or(true, |r| r.contains(x + half, y + half)))
            .collect();

        let vectors: Vec<DisplacementVector> = coords
            .par_iter()
            .map(|&(x, y)| self.displacement_at(back, front, x, y))
            .collect::<Result<_>>()?;

        let mut field = VectorField::zeros(pair, width, height, size);
        for (&(x, y), d) in coords.iter().zip(vectors) {
            field.set(x + half, y + half, d);
        }
        debug!(
            "帧对 {} -> {}: 计算了 {} 个网格点，窗口 {size}x{size}",
            pair.back,
            pair.front,
            coords.len()
        );
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(x: i64, y: i64) -> f32 {
        let mut z = (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z % 256) as f32
    }

    /// 随机纹理，内容整体平移 `(dx, dy)`
    fn texture(width: usize, height: usize, dx: i64, dy: i64) -> Frame {
        Frame::from_fn(width, height, |x, y| noise(x as i64 - dx, y as i64 - dy))
    }

    #[test]
    fn uniform_shift_is_recovered_inside_evaluated_region() {
        let back = texture(40, 36, 0, 0);
        let front = texture(40, 36, 2, -1);
        let assembler = FieldAssembler::new(16, false).unwrap();
        let field = assembler
            .assemble(FramePair::new(1, 2), &back, &front, None)
            .unwrap();

        let (xs, ys) = field.grid_centers();
        assert_eq!((*xs.start(), *xs.end()), (8, 32));
        assert_eq!((*ys.start(), *ys.end()), (8, 28));
        for y in ys.clone() {
            for x in xs.clone() {
                let d = field.get(x, y);
                assert_eq!((d.u, d.v), (2.0, -1.0), "at ({x}, {y})");
                assert!(d.peak_height > 0.0);
            }
        }
        // 边界外保持 0
        assert_eq!(field.get(0, 0), DisplacementVector::default());
        assert_eq!(field.get(39, 35), DisplacementVector::default());
    }

    #[test]
    fn roi_excludes_grid_points() {
        let back = texture(24, 24, 0, 0);
        let front = texture(24, 24, 1, 1);
        let roi = RectRoi::new(8, 8, 4, 24);
        let field = FieldAssembler::new(8, false).unwrap()
            .assemble(FramePair::new(1, 2), &back, &front, Some(&roi))
            .unwrap();

        let (xs, ys) = field.grid_centers();
        for y in ys {
            for x in xs.clone() {
                let d = field.get(x, y);
                if roi.contains(x, y) {
                    assert!(d.peak_height > 0.0, "at ({x}, {y})");
                } else {
                    assert_eq!(d, DisplacementVector::default(), "at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn closure_roi_is_accepted() {
        let back = texture(16, 16, 0, 0);
        let front = texture(16, 16, 0, 0);
        let only_center = |x: usize, y: usize| x == 8 && y == 8;
        let field = FieldAssembler::new(8, false).unwrap()
            .assemble(FramePair::new(1, 2), &back, &front, Some(&only_center))
            .unwrap();
        let touched = field.peak_height().iter().filter(|&&p| p != 0.0).count();
        assert_eq!(touched, 1);
    }

    #[test]
    fn mask_roi_reads_nonzero_pixels() {
        let mask = GrayImage::from_fn(4, 4, |x, _| image::Luma([if x < 2 { 255 } else { 0 }]));
        let roi = MaskRoi::new(mask);
        assert!(roi.contains(1, 3));
        assert!(!roi.contains(2, 0));
        assert!(!roi.contains(10, 10));
    }

    #[test]
    fn frames_of_different_size_are_rejected() {
        let back = texture(16, 16, 0, 0);
        let front = texture(16, 17, 0, 0);
        let result = FieldAssembler::new(8, false).unwrap().assemble(FramePair::new(1, 2), &back, &front, None);
        assert!(matches!(result, Err(PivError::ShapeMismatch { .. })));
    }
}
