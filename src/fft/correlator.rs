use crate::error::{PivError, Result};
use crate::window::Block;

use super::transform::{FftTransform, SpectralTransform};

/// 零位移居中的互相关矩阵，中心 `(size/2, size/2)` 对应零位移
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMap {
    size: usize,
    data: Vec<f32>,
}

impl CorrelationMap {
    /// 由已居中的数据构建
    pub fn from_centered(size: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != size * size {
            return Err(PivError::ShapeMismatch {
                expected: (size, size),
                actual: (data.len(), 1),
            });
        }
        Ok(Self { size, data })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.size + x]
    }
}

/// 循环移位半个窗口，把下标 0 处的零位移移到中心（象限交换）
pub fn swap_quadrants(data: &[f32], size: usize) -> Vec<f32> {
    let half = size / 2;
    let mut out = vec![0.0f32; data.len()];
    for y in 0..size {
        let ty = (y + half) % size;
        for x in 0..size {
            let tx = (x + half) % size;
            out[ty * size + tx] = data[y * size + x];
        }
    }
    out
}

/// 窗口互相关计算器
pub struct CrossCorrelator<T: SpectralTransform = FftTransform> {
    transform: T,
}

impl CrossCorrelator<FftTransform> {
    /// 使用 FFT 后端
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self::with_transform(FftTransform::new(size)?))
    }
}

impl<T: SpectralTransform> CrossCorrelator<T> {
    pub fn with_transform(transform: T) -> Self {
        Self { transform }
    }

    pub fn size(&self) -> usize {
        self.transform.size()
    }

    /// 计算后窗口与前窗口的互相关矩阵并居中
    pub fn correlate(&self, back: &Block, front: &Block) -> Result<CorrelationMap> {
        let size = self.transform.size();
        for block in [back, front] {
            if block.size() != size {
                return Err(PivError::ShapeMismatch {
                    expected: (size, size),
                    actual: (block.size(), block.size()),
                });
            }
        }

        let raw = self.transform.cross_correlate(back.data(), front.data());
        Ok(CorrelationMap {
            size,
            data: swap_quadrants(&raw, size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::transform::DirectTransform;
    use super::*;

    fn pattern(size: usize, dx: isize, dy: isize) -> Block {
        let n = size as isize;
        let mut data = Vec::with_capacity(size * size);
        for y in 0..n {
            for x in 0..n {
                let sx = (x - dx).rem_euclid(n);
                let sy = (y - dy).rem_euclid(n);
                let v = ((sx * 7 + sy * 13) % 11) as f32 + if sx == 3 && sy == 5 { 20.0 } else { 0.0 };
                data.push(v);
            }
        }
        let mean = data.iter().sum::<f32>() / data.len() as f32;
        Block::from_raw(size, data.into_iter().map(|v| v - mean).collect()).unwrap()
    }

    fn argmax(map: &CorrelationMap) -> (usize, usize) {
        let mut best = (0, f32::NEG_INFINITY);
        for (i, &v) in map.data().iter().enumerate() {
            if v > best.1 {
                best = (i, v);
            }
        }
        (best.0 % map.size(), best.0 / map.size())
    }

    #[test]
    fn identical_blocks_peak_at_center() {
        let block = pattern(16, 0, 0);
        let map = CrossCorrelator::new(16).unwrap().correlate(&block, &block).unwrap();
        assert_eq!(argmax(&map), (8, 8));
    }

    #[test]
    fn circular_shift_moves_peak_by_shift() {
        let back = pattern(16, 0, 0);
        let front = pattern(16, 3, -2);
        let map = CrossCorrelator::new(16).unwrap().correlate(&back, &front).unwrap();
        assert_eq!(argmax(&map), (8 + 3, 8 - 2));
    }

    #[test]
    fn fft_backend_matches_direct_sum() {
        let back = pattern(8, 0, 0);
        let front = pattern(8, 1, 2);
        let fft = CrossCorrelator::new(8).unwrap().correlate(&back, &front).unwrap();
        let direct = CrossCorrelator::with_transform(DirectTransform::new(8))
            .correlate(&back, &front)
            .unwrap();
        for (a, b) in fft.data().iter().zip(direct.data()) {
            assert!((a - b).abs() < 1e-2, "fft={a} direct={b}");
        }
    }

    #[test]
    fn swap_quadrants_centers_origin() {
        let mut raw = vec![0.0f32; 16];
        raw[0] = 1.0;
        let swapped = swap_quadrants(&raw, 4);
        assert_eq!(swapped[2 * 4 + 2], 1.0);
        assert_eq!(swapped.iter().filter(|&&v| v != 0.0).count(), 1);
    }

    #[test]
    fn zero_sized_correlator_is_rejected() {
        assert!(matches!(
            CrossCorrelator::new(0),
            Err(PivError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn mismatched_blocks_are_rejected() {
        let small = pattern(8, 0, 0);
        let large = pattern(16, 0, 0);
        let correlator = CrossCorrelator::new(16).unwrap();
        assert!(matches!(
            correlator.correlate(&small, &large),
            Err(PivError::ShapeMismatch { .. })
        ));
    }
}
