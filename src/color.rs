//! 速度矢量的颜色编码
//!
//! 色相表示方向，亮度表示大小。三个通道是相位相差 120° 的分段线性斜坡，
//! 任意方向上至少有一个通道达到满幅，因此可以从颜色近似反解出方向和大小。

use std::f64::consts::PI;

use image::{Rgb, RgbImage};

use crate::field::VectorField;

/// 色轮图例的默认边长
pub const COLOR_WHEEL_SIZE: u32 = 128;

/// 由颜色反解出的速度读数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityReading {
    /// 大小（像素/帧）
    pub magnitude: f64,
    /// 方向（度），取值 (-180, 180]
    pub angle_degrees: f64,
}

fn ramp(o: f64, a: f64) -> f64 {
    if o < 3.0 {
        (2.0 - o).clamp(0.0, 1.0) * a
    } else {
        (o - 4.0).clamp(0.0, 1.0) * a
    }
}

fn advance(o: f64) -> f64 {
    let o = o + 2.0;
    if o >= 6.0 {
        o - 6.0
    } else {
        o
    }
}

fn to_channel(value: f64) -> u8 {
    (value * 255.0) as u8
}

/// 把矢量 `(u, v)` 编码为颜色，`max_distance` 对应满亮度
///
/// 零矢量编码为黑色；超过 `max_distance` 的矢量亮度截断为满幅。
pub fn encode(u: f32, v: f32, max_distance: f32) -> Rgb<u8> {
    let xs = u as f64 / max_distance as f64;
    let ys = v as f64 / max_distance as f64;
    let norm = (xs * xs + ys * ys).sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Rgb([0, 0, 0]);
    }
    let a = norm.min(1.0);

    let mut o = ((xs / norm).atan2(ys / norm) + PI) / PI * 3.0;
    let r = ramp(o, a);
    o = advance(o);
    let g = ramp(o, a);
    o = advance(o);
    let b = ramp(o, a);

    Rgb([to_channel(r), to_channel(g), to_channel(b)])
}

/// 从颜色反解方向（弧度）和大小
///
/// 先根据哪个通道为零、哪个通道最大判断所在的 60° 扇区，再按扇区反解斜坡。
/// 返回的角度满足 `angle ≈ atan2(-v, u)`，取值 (-π, π]。纯黑色返回大小 0、角度 0。
/// 角度 0 指向 +u 方向（图像右方），不是图像上方；图像上方 (-v) 为 +90°。
pub fn decode(rgb: Rgb<u8>, max_velocity: f32) -> (f64, f64) {
    let [r, g, b] = rgb.0.map(f64::from);
    if r == 0.0 && g == 0.0 && b == 0.0 {
        return (0.0, 0.0);
    }
    let max_velocity = max_velocity as f64;
    let third = 2.0 * PI / 3.0;

    let (alpha, magnitude) = if b == 0.0 {
        if r > g {
            (PI / 3.0 * g / r, r / 255.0 * max_velocity)
        } else {
            (third * (1.0 - 0.5 * r / g), g / 255.0 * max_velocity)
        }
    } else if r == 0.0 {
        if g > b {
            (third * (1.0 + 0.5 * b / g), g / 255.0 * max_velocity)
        } else {
            (third * (2.0 - 0.5 * g / b), b / 255.0 * max_velocity)
        }
    } else if b > r {
        (third * (2.0 + 0.5 * r / b), b / 255.0 * max_velocity)
    } else {
        (third * (3.0 - 0.5 * b / r), r / 255.0 * max_velocity)
    };

    let mut angle = -(alpha - PI / 2.0);
    if angle <= -PI {
        angle += 2.0 * PI;
    }
    (angle, magnitude)
}

/// 供界面探针使用的读数
pub fn decode_reading(rgb: Rgb<u8>, max_velocity: f32) -> VelocityReading {
    let (angle, magnitude) = decode(rgb, max_velocity);
    VelocityReading {
        magnitude,
        angle_degrees: angle.to_degrees(),
    }
}

/// 打包为 24 位整数 `0xRRGGBB`
pub fn pack_rgb(rgb: Rgb<u8>) -> u32 {
    let [r, g, b] = rgb.0;
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub fn unpack_rgb(packed: u32) -> Rgb<u8> {
    Rgb([
        ((packed >> 16) & 0xff) as u8,
        ((packed >> 8) & 0xff) as u8,
        (packed & 0xff) as u8,
    ])
}

/// 把速度场渲染为彩色图，网格范围外为黑色
pub fn render_color_field(field: &VectorField, max_distance: f32) -> RgbImage {
    let mut image = RgbImage::new(field.width() as u32, field.height() as u32);
    let (xs, ys) = field.grid_centers();
    for y in ys {
        for x in xs.clone() {
            let d = field.get(x, y);
            image.put_pixel(x as u32, y as u32, encode(d.u, d.v, max_distance));
        }
    }
    image
}

/// 色轮图例：每个像素按其相对中心的偏移编码，半径之外为黑色
pub fn color_wheel(size: u32) -> RgbImage {
    let radius = (size / 2) as f32;
    let center = (size / 2) as i64;
    RgbImage::from_fn(size, size, |x, y| {
        let dx = (x as i64 - center) as f32;
        let dy = (y as i64 - center) as f32;
        if (dx * dx + dy * dy).sqrt() > radius {
            Rgb([0, 0, 0])
        } else {
            encode(dx, dy, radius)
        }
    })
}

/// 色轮上 `(x, y)` 处对应的速度：到中心的距离按半径归一化后乘以 `max_displacement`
pub fn probe_color_wheel(x: u32, y: u32, size: u32, max_displacement: f32) -> VelocityReading {
    let center = (size / 2) as f64;
    let dx = x as f64 - center;
    let dy = y as f64 - center;
    let radius = center.max(1.0);
    VelocityReading {
        magnitude: (dx * dx + dy * dy).sqrt() / radius * max_displacement as f64,
        angle_degrees: -dy.atan2(dx).to_degrees(),
    }
}
