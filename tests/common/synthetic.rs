use piv_analysis_rs::{Frame, FrameStack};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 一个高斯粒子
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub intensity: f32,
}

/// 在略大于图像的范围内随机撒粒子，密度为每 `area_per_particle` 像素一个
pub fn random_particles(width: usize, height: usize, area_per_particle: f32, seed: u64) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let margin = 8.0;
    let count = ((width * height) as f32 / area_per_particle) as usize;
    (0..count)
        .map(|_| Particle {
            x: rng.gen_range(-margin..width as f32 + margin),
            y: rng.gen_range(-margin..height as f32 + margin),
            intensity: rng.gen_range(100.0..200.0),
        })
        .collect()
}

/// 渲染平移 `(dx, dy)` 后的粒子图像
pub fn render_particles(
    particles: &[Particle],
    width: usize,
    height: usize,
    sigma: f32,
    dx: f32,
    dy: f32,
) -> Frame {
    let mut data = vec![0.0f32; width * height];
    let reach = (3.0 * sigma).ceil() as i64 + 1;
    let two_sigma2 = 2.0 * sigma * sigma;

    for p in particles {
        let cx = p.x + dx;
        let cy = p.y + dy;
        let (ix, iy) = (cx.round() as i64, cy.round() as i64);
        for y in (iy - reach).max(0)..=(iy + reach).min(height as i64 - 1) {
            for x in (ix - reach).max(0)..=(ix + reach).min(width as i64 - 1) {
                let r2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
                data[y as usize * width + x as usize] += p.intensity * (-r2 / two_sigma2).exp();
            }
        }
    }

    Frame::new(width, height, data).expect("buffer matches dimensions")
}

/// 粒子图像序列，第 k 帧相对第 1 帧平移 `k * (dx, dy)`
pub fn particle_sequence(
    count: usize,
    size: usize,
    sigma: f32,
    area_per_particle: f32,
    dx: f32,
    dy: f32,
    seed: u64,
) -> FrameStack {
    let particles = random_particles(size, size, area_per_particle, seed);
    let frames = (0..count)
        .map(|k| render_particles(&particles, size, size, sigma, k as f32 * dx, k as f32 * dy))
        .collect();
    FrameStack::new(frames).expect("frames share dimensions")
}

/// 左半边有粒子、右半边为常数的图像对
pub fn half_textured_pair(size: usize, dx: f32, dy: f32, seed: u64) -> FrameStack {
    let particles: Vec<Particle> = random_particles(size, size, 10.0, seed)
        .into_iter()
        .filter(|p| p.x < (size / 2) as f32 - 6.0)
        .collect();
    let back = render_particles(&particles, size, size, 0.7, 0.0, 0.0);
    let front = render_particles(&particles, size, size, 0.7, dx, dy);
    FrameStack::new(vec![back, front]).expect("frames share dimensions")
}
