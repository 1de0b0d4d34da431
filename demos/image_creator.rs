use image::{GrayImage, Luma};
use rand::Rng;
use serde::Serialize;
use std::fs::{create_dir_all, File};
use std::path::Path;

const FRAME_SIZE: u32 = 256;
const FRAME_COUNT: usize = 5;
const PARTICLE_SIGMA: f32 = 0.8;
// 每多少像素一个粒子
const AREA_PER_PARTICLE: f32 = 12.0;

#[derive(Serialize)]
struct SequenceInfo {
    width: u32,
    height: u32,
    frames: Vec<String>,
    /// 相邻帧之间的旋涡流最大位移（像素）
    max_shift: f32,
}

struct Particle {
    x: f32,
    y: f32,
    intensity: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = Path::new("images");
    create_dir_all(out_dir)?;

    let mut rng = rand::thread_rng();
    let margin = 16.0;
    let size = FRAME_SIZE as f32;
    let count = (size * size / AREA_PER_PARTICLE) as usize;
    let mut particles: Vec<Particle> = (0..count)
        .map(|_| Particle {
            x: rng.gen_range(-margin..size + margin),
            y: rng.gen_range(-margin..size + margin),
            intensity: rng.gen_range(120.0..255.0),
        })
        .collect();

    let max_shift = 4.0;
    let mut names = Vec::with_capacity(FRAME_COUNT);

    for k in 1..=FRAME_COUNT {
        let frame = render(&particles, FRAME_SIZE, PARTICLE_SIGMA);
        let name = format!("frame_{k:03}.png");
        frame.save(out_dir.join(&name))?;
        println!("已生成 {name}");
        names.push(name);

        // 绕图像中心的刚体旋转，边缘处位移为 max_shift
        let center = size / 2.0;
        for p in &mut particles {
            let (rx, ry) = ((p.x - center) / center, (p.y - center) / center);
            p.x += -ry * max_shift;
            p.y += rx * max_shift;
        }
    }

    let info = SequenceInfo {
        width: FRAME_SIZE,
        height: FRAME_SIZE,
        frames: names,
        max_shift,
    };
    let info_path = out_dir.join("sequence.json");
    serde_json::to_writer_pretty(File::create(&info_path)?, &info)?;
    println!("序列信息已写入 {}", info_path.display());

    Ok(())
}

/// 把粒子渲染成 8 位灰度图
fn render(particles: &[Particle], size: u32, sigma: f32) -> GrayImage {
    let mut buffer = vec![0.0f32; (size * size) as usize];
    let reach = (3.0 * sigma).ceil() as i64 + 1;
    let two_sigma2 = 2.0 * sigma * sigma;
    let last = size as i64 - 1;

    for p in particles {
        let (ix, iy) = (p.x.round() as i64, p.y.round() as i64);
        for y in (iy - reach).max(0)..=(iy + reach).min(last) {
            for x in (ix - reach).max(0)..=(ix + reach).min(last) {
                let r2 = (x as f32 - p.x).powi(2) + (y as f32 - p.y).powi(2);
                buffer[(y * size as i64 + x) as usize] += p.intensity * (-r2 / two_sigma2).exp();
            }
        }
    }

    GrayImage::from_fn(size, size, |x, y| {
        Luma([buffer[(y * size + x) as usize].min(255.0) as u8])
    })
}
