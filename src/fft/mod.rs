//! 频域互相关
//!
//! 两个零均值窗口分别做二维 FFT，前窗口频谱乘以后窗口频谱的共轭，
//! 逆变换后做象限交换，使零位移落在矩阵中心。

pub mod correlator;
pub mod transform;

pub use correlator::{swap_quadrants, CorrelationMap, CrossCorrelator};
pub use transform::{DirectTransform, FftTransform, SpectralTransform};
