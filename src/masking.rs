//! 按相关峰高度掩膜
//!
//! 峰值高度低于 `fraction × 全图最大峰值` 的网格点，U/V 置 0；峰值高度本身保留。

use crate::field::VectorField;

/// 对原始数组做掩膜
pub fn mask_arrays(u: &mut [f32], v: &mut [f32], peak_height: &[f32], fraction: f32) {
    let max_peak = peak_height
        .iter()
        .copied()
        .fold(f32::NEG_INFINITY, f32::max);
    let threshold = fraction * max_peak;

    for ((u, v), &p) in u.iter_mut().zip(v.iter_mut()).zip(peak_height) {
        if p < threshold {
            *u = 0.0;
            *v = 0.0;
        }
    }
}

/// 对一对帧的速度场做掩膜，重复调用结果不变
pub fn apply_mask(mut field: VectorField, fraction: f32) -> VectorField {
    let (u, v, peak_height) = field.masking_view();
    mask_arrays(u, v, peak_height, fraction);
    field
}
