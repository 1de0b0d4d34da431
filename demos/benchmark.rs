use piv_analysis_rs::fft::DirectTransform;
use piv_analysis_rs::{
    AnalyserConfig, CancellationToken, CrossCorrelator, FieldAssembler, Frame, FramePair,
    PivAnalyser, WindowSize,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

const FRAME_SIZE: usize = 256;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== PIV 性能基准测试 ===");

    let (back, front) = particle_pair(FRAME_SIZE, 3.0, -2.0, 42);
    let frames = piv_analysis_rs::FrameStack::new(vec![back.clone(), front.clone()])?;
    let pairs = [FramePair::new(1, 2)];
    let cancel = CancellationToken::new();

    println!("测试配置:");
    println!("  图像: {FRAME_SIZE}x{FRAME_SIZE}");
    println!("  位移: (3, -2)");

    // 不同窗口大小
    println!("\n=== 不同窗口大小 ===");
    let test_rounds = 5;
    for window in [WindowSize::W16, WindowSize::W32, WindowSize::W64] {
        let analyser = PivAnalyser::new(AnalyserConfig::new(window).with_interpolation(true))?;
        // 预热
        let _ = analyser.run(&frames, &pairs, None, &cancel)?;

        let mut total_ms = 0.0;
        for _ in 0..test_rounds {
            let output = analyser.run(&frames, &pairs, None, &cancel)?;
            total_ms += output.elapsed.as_secs_f64() * 1000.0;
        }
        let avg = total_ms / test_rounds as f64;
        let side = FRAME_SIZE - window.as_usize() + 1;
        println!(
            "窗口 {window}: 平均 {avg:.2}ms, {} 个网格点, {:.2} 网格点/ms",
            side * side,
            (side * side) as f64 / avg
        );
    }

    // FFT 与直接求和
    println!("\n=== FFT 与直接求和对比 (窗口 16) ===");
    let size = 16;
    let fft = FieldAssembler::new(size, false)?;
    let direct = FieldAssembler::with_correlator(
        CrossCorrelator::with_transform(DirectTransform::new(size)),
        false,
    );

    let start = Instant::now();
    let fft_field = fft.assemble(pairs[0], &back, &front, None)?;
    let fft_time = start.elapsed();

    let start = Instant::now();
    let direct_field = direct.assemble(pairs[0], &back, &front, None)?;
    let direct_time = start.elapsed();

    let same = fft_field
        .u()
        .iter()
        .zip(direct_field.u())
        .chain(fft_field.v().iter().zip(direct_field.v()))
        .filter(|(a, b)| a == b)
        .count();
    println!("FFT: {:.2}ms", fft_time.as_secs_f64() * 1000.0);
    println!("直接求和: {:.2}ms", direct_time.as_secs_f64() * 1000.0);
    println!(
        "一致分量: {}/{}",
        same,
        fft_field.u().len() + fft_field.v().len()
    );
    println!(
        "FFT 加速 {:.2}x",
        direct_time.as_secs_f64() / fft_time.as_secs_f64()
    );

    println!("\n=== 基准测试完成 ===");
    Ok(())
}

/// 生成平移 `(dx, dy)` 的随机粒子图像对
fn particle_pair(size: usize, dx: f32, dy: f32, seed: u64) -> (Frame, Frame) {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = size * size / 10;
    let particles: Vec<(f32, f32, f32)> = (0..count)
        .map(|_| {
            (
                rng.gen_range(-8.0..size as f32 + 8.0),
                rng.gen_range(-8.0..size as f32 + 8.0),
                rng.gen_range(100.0..200.0),
            )
        })
        .collect();

    let render = |sx: f32, sy: f32| {
        let mut data = vec![0.0f32; size * size];
        for &(px, py, intensity) in &particles {
            let (cx, cy) = (px + sx, py + sy);
            let (ix, iy) = (cx.round() as i64, cy.round() as i64);
            for y in (iy - 3).max(0)..=(iy + 3).min(size as i64 - 1) {
                for x in (ix - 3).max(0)..=(ix + 3).min(size as i64 - 1) {
                    let r2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
                    data[y as usize * size + x as usize] += intensity * (-r2 / 1.0).exp();
                }
            }
        }
        data
    };

    let back = Frame::from_fn(size, size, {
        let data = render(0.0, 0.0);
        move |x, y| data[y * size + x]
    });
    let front = Frame::from_fn(size, size, {
        let data = render(dx, dy);
        move |x, y| data[y * size + x]
    });
    (back, front)
}
