//! PIV Analysis in Rust
//!
//! 粒子图像测速（PIV）：对图像序列中的帧对逐网格点做窗口互相关，
//! 由相关峰位置估计局部位移，得到稠密的二维速度场。
//! 参考：Raffel, Willert & Kompenhans, "Particle Image Velocimetry: A Practical Guide"。
//!
//! ## 使用方法
//!
//! ```rust,no_run
//! use piv_analysis_rs::{
//!     AnalyserConfig, CancellationToken, Frame, FrameStack, PairingSpec, PivAnalyser, WindowSize,
//! };
//!
//! let back = Frame::from_fn(128, 128, |x, y| ((x * 7 + y * 13) % 17) as f32);
//! let front = Frame::from_fn(128, 128, |x, y| ((x * 7 + y * 13 + 3) % 17) as f32);
//! let frames = FrameStack::new(vec![back, front]).unwrap();
//!
//! let config = AnalyserConfig::new(WindowSize::W32).with_interpolation(true);
//! let analyser = PivAnalyser::new(config).unwrap();
//! let output = analyser
//!     .run_pairing(&frames, &PairingSpec::consecutive(2), None, &CancellationToken::new())
//!     .unwrap();
//! println!("{} 对帧", output.len());
//! ```
//!
//! ## 模块概览
//! - `pairing`：帧对构建
//! - `window`：查询窗口采样
//! - `fft`：频域互相关
//! - `peak`：整像素与亚像素峰值定位
//! - `field`：速度场组装与 ROI
//! - `masking`：按峰值高度掩膜
//! - `color`：矢量颜色编码、解码与色轮图例
//! - `analyser`：完整分析流程

pub mod analyser;
pub mod cancel;
pub mod color;
pub mod config;
pub mod error;
pub mod fft;
pub mod field;
pub mod frame;
pub mod masking;
pub mod pairing;
pub mod peak;
pub mod result;
pub mod window;

// 导出常用接口
pub use analyser::PivAnalyser;
pub use cancel::CancellationToken;
pub use color::{
    color_wheel, decode, decode_reading, encode, pack_rgb, probe_color_wheel, render_color_field,
    unpack_rgb, VelocityReading, COLOR_WHEEL_SIZE,
};
pub use config::{load_config, AnalyserConfig, RuntimeConfig, WindowSize};
pub use error::{PivError, Result};
pub use fft::{CorrelationMap, CrossCorrelator, FftTransform, SpectralTransform};
pub use field::{FieldAssembler, MaskRoi, RectRoi, Roi, VectorField};
pub use frame::{Frame, FrameSequence, FrameStack};
pub use masking::apply_mask;
pub use pairing::{FramePair, PairingSpec};
pub use peak::{locate_peak, DisplacementVector, PeakLocation};
pub use result::{PairResult, PivOutput};
pub use window::{sample_block, Block};
