/*!
 * PIV 分析器
 *
 * 按帧对依次计算速度场：逐网格点截取窗口、FFT 互相关、定位峰值，
 * 可选地按峰值高度掩膜，最后生成颜色编码图。
 */

use std::time::Instant;

use log::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::color::render_color_field;
use crate::config::{AnalyserConfig, RuntimeConfig};
use crate::error::{PivError, Result};
use crate::field::{FieldAssembler, Roi};
use crate::frame::{Frame, FrameSequence};
use crate::masking::apply_mask;
use crate::pairing::{FramePair, PairingSpec};
use crate::result::{PairResult, PivOutput};

/// PIV 分析器
///
/// 参数在创建时确定，之后只读；同一个分析器可以被多个线程同时使用。
pub struct PivAnalyser {
    config: AnalyserConfig,
    assembler: FieldAssembler,
}

impl PivAnalyser {
    /// 检查参数并创建分析器
    pub fn new(config: AnalyserConfig) -> Result<Self> {
        config.validate()?;
        let assembler = FieldAssembler::new(config.window_size.as_usize(), config.interpolate)?;
        Ok(Self { config, assembler })
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// 分析单对帧
    pub fn analyse_pair(
        &self,
        pair: FramePair,
        back: &Frame,
        front: &Frame,
        roi: Option<&dyn Roi>,
    ) -> Result<PairResult> {
        let mut field = self.assembler.assemble(pair, back, front, roi)?;
        if self.config.masking {
            field = apply_mask(field, self.config.mask_fraction);
        }
        let color = render_color_field(&field, self.config.max_displacement());
        Ok(PairResult { field, color })
    }

    /// 按规则生成帧对并分析
    pub fn run_pairing<S: FrameSequence + ?Sized>(
        &self,
        frames: &S,
        pairing: &PairingSpec,
        roi: Option<&dyn Roi>,
        cancel: &CancellationToken,
    ) -> Result<PivOutput> {
        check_frame_count(frames)?;
        let pairs = pairing.build_pairs()?;
        self.run(frames, &pairs, roi, cancel)
    }

    /// 按配置文件中的帧对设置分析：显式列表优先，其次是规则，都没有时相邻帧两两配对
    pub fn run_config<S: FrameSequence + ?Sized>(
        &self,
        frames: &S,
        runtime: &RuntimeConfig,
        roi: Option<&dyn Roi>,
        cancel: &CancellationToken,
    ) -> Result<PivOutput> {
        check_frame_count(frames)?;
        let pairs = match (&runtime.pairs, &runtime.pairing) {
            (Some(list), _) => FramePair::from_list(list, frames.len())?,
            (None, Some(spec)) => spec.build_pairs()?,
            (None, None) => PairingSpec::consecutive(frames.len()).build_pairs()?,
        };
        self.run(frames, &pairs, roi, cancel)
    }

    /// 分析给定的帧对序列
    pub fn run<S: FrameSequence + ?Sized>(
        &self,
        frames: &S,
        pairs: &[FramePair],
        roi: Option<&dyn Roi>,
        cancel: &CancellationToken,
    ) -> Result<PivOutput> {
        self.run_with_progress(frames, pairs, roi, cancel, |_, _| {})
    }

    /// 同 [`PivAnalyser::run`]，每完成一对帧回调 `progress(已完成数, 总数)`
    pub fn run_with_progress<S, P>(
        &self,
        frames: &S,
        pairs: &[FramePair],
        roi: Option<&dyn Roi>,
        cancel: &CancellationToken,
        mut progress: P,
    ) -> Result<PivOutput>
    where
        S: FrameSequence + ?Sized,
        P: FnMut(usize, usize),
    {
        self.check_inputs(frames, pairs)?;

        let start = Instant::now();
        let total = pairs.len();
        info!(
            "PIV 分析开始: {} 对帧, 窗口 {}, 插值: {}, 掩膜: {}",
            total, self.config.window_size, self.config.interpolate, self.config.masking
        );

        let mut results = Vec::with_capacity(total);
        let mut cancelled = false;

        for (i, &pair) in pairs.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("PIV 分析已取消，完成 {}/{} 对帧", i, total);
                cancelled = true;
                break;
            }

            let (back, front) = match (frames.frame(pair.back), frames.frame(pair.front)) {
                (Some(back), Some(front)) => (back, front),
                _ => {
                    return Err(PivError::FrameOutOfRange {
                        index: pair.back.max(pair.front),
                        available: frames.len(),
                    })
                }
            };

            let pair_start = Instant::now();
            let result = self.analyse_pair(pair, back, front, roi)?;
            debug!(
                "帧对 {}/{} ({} -> {}) 完成，耗时 {:.2}ms",
                i + 1,
                total,
                pair.back,
                pair.front,
                pair_start.elapsed().as_secs_f64() * 1000.0
            );

            results.push(result);
            progress(i + 1, total);
        }

        let elapsed = start.elapsed();
        info!(
            "PIV 分析结束: {} 对帧，耗时 {:.2}ms",
            results.len(),
            elapsed.as_secs_f64() * 1000.0
        );

        Ok(PivOutput {
            results,
            cancelled,
            elapsed,
        })
    }

    /// 计算开始前的检查
    fn check_inputs<S: FrameSequence + ?Sized>(&self, frames: &S, pairs: &[FramePair]) -> Result<()> {
        check_frame_count(frames)?;
        let available = frames.len();
        if pairs.is_empty() {
            return Err(PivError::invalid("没有需要分析的帧对"));
        }
        for pair in pairs {
            pair.check_range(available)?;
        }

        let size = self.config.window_size.as_usize();
        let (width, height) = frames.dimensions();
        if width < size || height < size {
            return Err(PivError::invalid(format!(
                "窗口 {} 大于图像 {}x{}",
                self.config.window_size, width, height
            )));
        }
        Ok(())
    }
}

/// 帧数检查先于配对，少于两帧时不再报告配对相关的错误
fn check_frame_count<S: FrameSequence + ?Sized>(frames: &S) -> Result<()> {
    let available = frames.len();
    if available < 2 {
        return Err(PivError::InsufficientFrames { available });
    }
    Ok(())
}
