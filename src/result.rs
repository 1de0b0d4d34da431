use std::time::Duration;

use image::RgbImage;

use crate::field::VectorField;
use crate::pairing::FramePair;

/// 一对帧的分析结果
#[derive(Debug, Clone)]
pub struct PairResult {
    /// U、V、峰值高度
    pub field: VectorField,
    /// 方向和大小的颜色编码图
    pub color: RgbImage,
}

impl PairResult {
    pub fn pair(&self) -> FramePair {
        self.field.pair()
    }
}

/// 一次分析的全部输出，按帧对顺序排列
///
/// 中途取消时只包含已完成的帧对，这仍然是合法结果。
#[derive(Debug, Clone)]
pub struct PivOutput {
    pub results: Vec<PairResult>,
    /// 是否被取消
    pub cancelled: bool,
    /// 总耗时
    pub elapsed: Duration,
}

impl PivOutput {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &VectorField> {
        self.results.iter().map(|r| &r.field)
    }

    pub fn colors(&self) -> impl Iterator<Item = &RgbImage> {
        self.results.iter().map(|r| &r.color)
    }
}
