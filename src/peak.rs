//! 相关峰定位
//!
//! 先找整像素最大值，再可选地用 3x3 邻域的梯度和 Hessian 做亚像素修正。

use crate::fft::CorrelationMap;

/// 亚像素修正的步长系数，修正后位置为 `整像素峰值 - 3 * H⁻¹·∇`
pub const SUBPIXEL_GAIN: f32 = 3.0;

/// 峰值定位结果，坐标相对窗口中心
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakLocation {
    /// 整像素峰值位置
    pub max_x: i32,
    pub max_y: i32,
    /// 亚像素位置；未插值或退化时等于整像素位置
    pub x: f32,
    pub y: f32,
    /// 整像素峰值处的原始相关值
    pub peak_height: f32,
    /// 是否实际做了亚像素修正
    pub refined: bool,
}

/// 单个网格点的位移
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplacementVector {
    pub u: f32,
    pub v: f32,
    pub peak_height: f32,
}

impl From<PeakLocation> for DisplacementVector {
    fn from(peak: PeakLocation) -> Self {
        Self {
            u: peak.x,
            v: peak.y,
            peak_height: peak.peak_height,
        }
    }
}

/// 按行扫描找最大值，相等时取先遇到的
fn find_max(values: &[f32]) -> (usize, f32) {
    let mut peak_height = f32::NEG_INFINITY;
    let mut loc = 0;
    for (i, &val) in values.iter().enumerate() {
        if val > peak_height {
            peak_height = val;
            loc = i;
        }
    }
    (loc, peak_height)
}

/// 在相关矩阵中定位峰值
pub fn locate_peak(map: &CorrelationMap, interpolate: bool) -> PeakLocation {
    locate_peak_with_gain(map, interpolate, SUBPIXEL_GAIN)
}

/// 同 [`locate_peak`]，可指定亚像素步长系数
pub fn locate_peak_with_gain(map: &CorrelationMap, interpolate: bool, gain: f32) -> PeakLocation {
    let size = map.size();
    let (loc, peak_height) = find_max(map.data());
    let (px, py) = (loc % size, loc / size);

    let max_x = px as i32 - (size / 2) as i32;
    let max_y = py as i32 - (size / 2) as i32;

    let mut peak = PeakLocation {
        max_x,
        max_y,
        x: max_x as f32,
        y: max_y as f32,
        peak_height,
        refined: false,
    };

    if interpolate {
        if let Some((ox, oy)) = hessian_offset(map, px, py) {
            peak.x = max_x as f32 - gain * ox;
            peak.y = max_y as f32 - gain * oy;
            peak.refined = true;
        }
    }

    peak
}

/// 计算 `H⁻¹·∇`
///
/// 峰值在边上（邻域越界）或行列式为零时返回 `None`，调用方沿用整像素位置。
fn hessian_offset(map: &CorrelationMap, px: usize, py: usize) -> Option<(f32, f32)> {
    let size = map.size();
    if px == 0 || py == 0 || px + 1 >= size || py + 1 >= size {
        return None;
    }

    let e = |dx: usize, dy: usize| map.get(px + dx - 1, py + dy - 1);
    let (e00, e10, e20) = (e(0, 0), e(1, 0), e(2, 0));
    let (e01, e11, e21) = (e(0, 1), e(1, 1), e(2, 1));
    let (e02, e12, e22) = (e(0, 2), e(1, 2), e(2, 2));

    // 中心差分梯度
    let dx = (e21 - e01) / 2.0;
    let dy = (e12 - e10) / 2.0;

    // Hessian
    let e11_2 = 2.0 * e11;
    let dxx = e01 - e11_2 + e21;
    let dyy = e10 - e11_2 + e12;
    let dxy = (e22 - e02 - e20 + e00) / 4.0;

    let det = dxx * dyy - dxy * dxy;
    if det == 0.0 || !det.is_finite() {
        return None;
    }

    let ox = dyy / det * dx - dxy / det * dy;
    let oy = -dxy / det * dx + dxx / det * dy;
    if !ox.is_finite() || !oy.is_finite() {
        return None;
    }

    Some((ox, oy))
}
