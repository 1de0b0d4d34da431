use std::sync::Arc;

use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{PivError, Result};

/// 频域互相关后端
///
/// 输入两个 `size × size` 的按行存储窗口，输出未居中的循环互相关
/// `r(k) = Σ front(n + k) · back(n)`，零位移位于下标 0。
pub trait SpectralTransform: Send + Sync {
    /// 支持的窗口边长
    fn size(&self) -> usize;

    fn cross_correlate(&self, back: &[f32], front: &[f32]) -> Vec<f32>;
}

/// 基于 rustfft 的二维 FFT 后端（行列分解）
pub struct FftTransform {
    size: usize,
    forward_fft: Arc<dyn Fft<f32>>,
    inverse_fft: Arc<dyn Fft<f32>>,
}

impl FftTransform {
    /// 窗口边长必须是大于 1 的 2 的幂
    pub fn new(size: usize) -> Result<Self> {
        if size < 2 || !size.is_power_of_two() {
            return Err(PivError::invalid(format!("FFT 窗口边长 {size} 不是 2 的幂")));
        }
        let mut planner = FftPlanner::<f32>::new();
        let forward_fft = planner.plan_fft_forward(size);
        let inverse_fft = planner.plan_fft_inverse(size);
        Ok(Self {
            size,
            forward_fft,
            inverse_fft,
        })
    }

    fn to_complex(values: &[f32]) -> Vec<Complex<f32>> {
        values.iter().map(|&v| Complex::new(v, 0.0)).collect()
    }

    /// 行变换、转置、再行变换、转置回去
    fn process_2d(&self, data: &mut [Complex<f32>], fft: &dyn Fft<f32>) {
        let n = self.size;
        for row in data.chunks_exact_mut(n) {
            fft.process(row);
        }
        transpose_inplace(data, n);
        for row in data.chunks_exact_mut(n) {
            fft.process(row);
        }
        transpose_inplace(data, n);
    }
}

impl SpectralTransform for FftTransform {
    fn size(&self) -> usize {
        self.size
    }

    fn cross_correlate(&self, back: &[f32], front: &[f32]) -> Vec<f32> {
        let mut back_freq = Self::to_complex(back);
        let mut front_freq = Self::to_complex(front);
        self.process_2d(&mut back_freq, self.forward_fft.as_ref());
        self.process_2d(&mut front_freq, self.forward_fft.as_ref());

        // 频域共轭相乘
        let mut product: Vec<Complex<f32>> = front_freq
            .iter()
            .zip(back_freq.iter())
            .map(|(&f, &b)| f * b.conj())
            .collect();

        self.process_2d(&mut product, self.inverse_fft.as_ref());

        let norm = 1.0 / (self.size * self.size) as f32;
        product.iter().map(|c| c.re * norm).collect()
    }
}

/// 空间域直接求循环互相关，用于核对频域结果
pub struct DirectTransform {
    size: usize,
}

impl DirectTransform {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl SpectralTransform for DirectTransform {
    fn size(&self) -> usize {
        self.size
    }

    fn cross_correlate(&self, back: &[f32], front: &[f32]) -> Vec<f32> {
        let n = self.size;
        let mut out = vec![0.0f32; n * n];
        for ky in 0..n {
            for kx in 0..n {
                let mut sum = 0.0f32;
                for y in 0..n {
                    let fy = (y + ky) % n;
                    for x in 0..n {
                        let fx = (x + kx) % n;
                        sum += front[fy * n + fx] * back[y * n + x];
                    }
                }
                out[ky * n + kx] = sum;
            }
        }
        out
    }
}

fn transpose_inplace(data: &mut [Complex<f32>], n: usize) {
    for y in 0..n {
        for x in (y + 1)..n {
            data.swap(y * n + x, x * n + y);
        }
    }
}
