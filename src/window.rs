//! 查询窗口采样

use crate::error::{PivError, Result};
use crate::frame::Frame;

/// `size × size` 的零均值窗口，按行存储
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    size: usize,
    data: Vec<f32>,
}

impl Block {
    /// 直接由数据构建，不做去均值
    pub fn from_raw(size: usize, data: Vec<f32>) -> Result<Self> {
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

    pub fn mean(&self) -> f32 {
        calculate_mean(&self.data)
    }
}

fn calculate_mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// 从帧的 `(x, y)` 处（窗口左上角）截取 `size × size` 窗口并减去均值
///
/// 要求 `0 <= x <= width - size` 且 `0 <= y <= height - size`。
pub fn sample_block(frame: &Frame, x: usize, y: usize, size: usize) -> Result<Block> {
    let (width, height) = frame.dimensions();
    if size == 0 || x + size > width || y + size > height {
        return Err(PivError::invalid(format!(
            "窗口 ({x}, {y}) {size}x{size} 超出图像 {width}x{height}"
        )));
    }

    let mut data = Vec::with_capacity(size * size);
    for row in y..y + size {
        data.extend_from_slice(&frame.row(row)[x..x + size]);
    }

    let mean = calculate_mean(&data);
    for value in data.iter_mut() {
        *value -= mean;
    }

    Ok(Block { size, data })
}
