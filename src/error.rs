//! PIV 分析的错误类型

use thiserror::Error;

/// 库内统一的结果类型
pub type Result<T> = std::result::Result<T, PivError>;

/// PIV 分析错误
///
/// 亚像素退化（Hessian 行列式为零、峰值贴边）和取消都不是错误，
/// 它们在计算内部被就地处理。
#[derive(Debug, Error)]
pub enum PivError {
    /// 参数非法：配对数量不为正、窗口尺寸不在允许集合内、掩膜比例越界等
    #[error("参数非法: {0}")]
    InvalidConfiguration(String),

    /// 图像序列少于两帧
    #[error("PIV 分析至少需要两帧图像，当前只有 {available} 帧")]
    InsufficientFrames { available: usize },

    /// 帧对引用了序列中不存在的帧（帧序号从 1 开始）
    ///
    /// 属于配置错误，但单独列出以便携带序号；
    /// 按类别判断时使用 [`PivError::is_configuration_error`]。
    #[error("帧序号 {index} 超出范围 [1, {available}]")]
    FrameOutOfRange { index: usize, available: usize },

    /// 前后两个窗口或两帧尺寸不一致
    #[error("尺寸不匹配: 期望 {}x{}, 实际 {}x{}", expected.0, expected.1, actual.0, actual.1)]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("图像错误: {0}")]
    Image(#[from] image::ImageError),

    #[error("配置解析失败: {0}")]
    Json(#[from] serde_json::Error),
}

impl PivError {
    /// 是否为配置类错误（参数非法或帧序号越界），这类错误在计算开始前报告
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PivError::InvalidConfiguration(_) | PivError::FrameOutOfRange { .. }
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        PivError::InvalidConfiguration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_frames_count_as_configuration_errors() {
        assert!(PivError::invalid("step 必须 >= 1").is_configuration_error());
        assert!(PivError::FrameOutOfRange { index: 5, available: 3 }.is_configuration_error());
        assert!(!PivError::InsufficientFrames { available: 1 }.is_configuration_error());
        assert!(!PivError::ShapeMismatch {
            expected: (8, 8),
            actual: (4, 4)
        }
        .is_configuration_error());
    }
}
