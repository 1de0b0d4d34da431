use std::path::Path;

use image::open;
use log::info;
use piv_analysis_rs::{
    color_wheel, load_config, probe_color_wheel, CancellationToken, FrameStack, PivAnalyser,
    RuntimeConfig, COLOR_WHEEL_SIZE,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== PIV 分析示例 (先运行 image_creator 生成 images/frame_*.png) ===");

    // 可选的配置文件
    let config_path = Path::new("piv.json");
    let runtime = if config_path.exists() {
        println!("读取配置 {}", config_path.display());
        load_config(config_path)?
    } else {
        RuntimeConfig::default()
    };

    // 加载图像序列
    let mut images = Vec::new();
    for k in 1.. {
        let path = format!("images/frame_{k:03}.png");
        if !Path::new(&path).exists() {
            break;
        }
        images.push(open(&path)?);
    }
    let frames = FrameStack::from_images(&images)?;
    println!("加载了 {} 帧", images.len());

    let analyser = PivAnalyser::new(runtime.analyser.clone())?;
    let cancel = CancellationToken::new();
    let output = analyser.run_config(&frames, &runtime, None, &cancel)?;
    println!(
        "分析完成: {} 对帧，耗时 {:.2}ms",
        output.len(),
        output.elapsed.as_secs_f64() * 1000.0
    );

    let max = analyser.config().max_displacement();
    for result in &output.results {
        let pair = result.pair();
        let field = &result.field;
        let (xs, ys) = field.grid_centers();
        let (cx, cy) = ((xs.start() + xs.end()) / 2, (ys.start() + ys.end()) / 2);
        let d = field.get(cx, cy);
        println!(
            "帧对 {} -> {}: 中心 ({cx}, {cy}) 位移 ({:.2}, {:.2}), 峰值 {:.1}",
            pair.back, pair.front, d.u, d.v, d.peak_height
        );

        let path = format!("images/velocity_{:03}_{:03}.png", pair.back, pair.front);
        result.color.save(&path)?;
        info!("颜色编码图已保存到 {path}");
    }

    // 色轮图例
    let wheel = color_wheel(COLOR_WHEEL_SIZE);
    wheel.save("images/color_wheel.png")?;
    let probe = probe_color_wheel(COLOR_WHEEL_SIZE, COLOR_WHEEL_SIZE / 2, COLOR_WHEEL_SIZE, max);
    println!(
        "色轮最右侧: 大小 {:.2} 像素, 方向 {:.1}°",
        probe.magnitude, probe.angle_degrees
    );

    Ok(())
}
