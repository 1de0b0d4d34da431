//! 分析参数
//!
//! 参数在一次运行开始前确定，运行期间只读。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PivError, Result};
use crate::pairing::PairingSpec;

/// 查询窗口尺寸
///
/// FFT 要求窗口为 2 的幂的正方形
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum WindowSize {
    W4,
    W8,
    W16,
    #[default]
    W32,
    W64,
    W128,
}

impl WindowSize {
    pub const ALL: [WindowSize; 6] = [
        WindowSize::W4,
        WindowSize::W8,
        WindowSize::W16,
        WindowSize::W32,
        WindowSize::W64,
        WindowSize::W128,
    ];

    /// 窗口边长（像素）
    pub fn as_usize(self) -> usize {
        match self {
            WindowSize::W4 => 4,
            WindowSize::W8 => 8,
            WindowSize::W16 => 16,
            WindowSize::W32 => 32,
            WindowSize::W64 => 64,
            WindowSize::W128 => 128,
        }
    }
}

impl TryFrom<usize> for WindowSize {
    type Error = PivError;

    fn try_from(size: usize) -> Result<Self> {
        WindowSize::ALL
            .into_iter()
            .find(|ws| ws.as_usize() == size)
            .ok_or_else(|| {
                PivError::invalid(format!(
                    "窗口尺寸 {size} 不受支持，只允许 4, 8, 16, 32, 64, 128"
                ))
            })
    }
}

impl From<WindowSize> for usize {
    fn from(ws: WindowSize) -> usize {
        ws.as_usize()
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.as_usize();
        write!(f, "{n}x{n}")
    }
}

/// 单次分析的参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// 查询窗口尺寸
    pub window_size: WindowSize,
    /// 是否做亚像素插值
    pub interpolate: bool,
    /// 是否按峰值高度做掩膜
    pub masking: bool,
    /// 掩膜比例，取值 [0, 1]
    pub mask_fraction: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            window_size: WindowSize::default(),
            interpolate: false,
            masking: false,
            mask_fraction: 0.5,
        }
    }
}

impl AnalyserConfig {
    pub fn new(window_size: WindowSize) -> Self {
        Self {
            window_size,
            ..Default::default()
        }
    }

    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn with_masking(mut self, mask_fraction: f32) -> Self {
        self.masking = true;
        self.mask_fraction = mask_fraction;
        self
    }

    /// 检查参数合法性
    pub fn validate(&self) -> Result<()> {
        if !self.mask_fraction.is_finite() || !(0.0..=1.0).contains(&self.mask_fraction) {
            return Err(PivError::invalid(format!(
                "掩膜比例 {} 不在 [0, 1] 范围内",
                self.mask_fraction
            )));
        }
        Ok(())
    }

    /// 颜色编码使用的最大位移，取窗口边长的四分之一
    pub fn max_displacement(&self) -> f32 {
        self.window_size.as_usize() as f32 / 4.0
    }
}

/// 从配置文件读取的完整运行参数
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub analyser: AnalyserConfig,
    /// 按规则生成帧对
    #[serde(default)]
    pub pairing: Option<PairingSpec>,
    /// 显式帧对列表，优先于 `pairing`
    #[serde(default)]
    pub pairs: Option<Vec<(usize, usize)>>,
}

/// 读取 JSON 配置文件
pub fn load_config(path: &Path) -> Result<RuntimeConfig> {
    let contents = fs::read_to_string(path)?;
    let config: RuntimeConfig = serde_json::from_str(&contents)?;
    config.analyser.validate()?;
    Ok(config)
}
