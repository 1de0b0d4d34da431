//! 帧对构建
//!
//! 后帧序号从 `first` 开始按 `step` 递增，每个后帧与其后 `jump` 帧的前帧配对。
//! 帧序号从 1 开始。

use serde::{Deserialize, Serialize};

use crate::error::{PivError, Result};

/// 帧对生成规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingSpec {
    pub first: usize,
    pub last: usize,
    pub step: usize,
    pub jump: usize,
}

/// 一对 (后帧, 前帧) 序号，`front = back + jump`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramePair {
    pub back: usize,
    pub front: usize,
}

impl FramePair {
    pub fn new(back: usize, front: usize) -> Self {
        Self { back, front }
    }

    /// 由显式帧对列表构建，逐一检查序号是否落在 `[1, available]` 内
    pub fn from_list(pairs: &[(usize, usize)], available: usize) -> Result<Vec<FramePair>> {
        if pairs.is_empty() {
            return Err(PivError::invalid("帧对列表为空"));
        }
        pairs
            .iter()
            .map(|&(back, front)| {
                let pair = FramePair::new(back, front);
                pair.check_range(available)?;
                Ok(pair)
            })
            .collect()
    }

    pub(crate) fn check_range(&self, available: usize) -> Result<()> {
        for index in [self.back, self.front] {
            if index == 0 || index > available {
                return Err(PivError::FrameOutOfRange { index, available });
            }
        }
        Ok(())
    }
}

impl From<(usize, usize)> for FramePair {
    fn from((back, front): (usize, usize)) -> Self {
        FramePair::new(back, front)
    }
}

impl PairingSpec {
    pub fn new(first: usize, last: usize, step: usize, jump: usize) -> Self {
        Self {
            first,
            last,
            step,
            jump,
        }
    }

    /// 相邻帧两两配对：`{1, n, 1, 1}`
    pub fn consecutive(frame_count: usize) -> Self {
        Self::new(1, frame_count, 1, 1)
    }

    /// 帧对数量 `ceil((last - (first + jump - 1)) / step)`，可能为负
    pub fn pair_count(&self) -> i64 {
        let numerator = self.last as i64 - (self.first as i64 + self.jump as i64 - 1);
        let step = self.step.max(1) as i64;
        if numerator > 0 {
            (numerator + step - 1) / step
        } else {
            numerator / step
        }
    }

    /// 生成有序帧对序列
    ///
    /// 数量不为正或前帧超出 `last` 时报错，不做截断。
    pub fn build_pairs(&self) -> Result<Vec<FramePair>> {
        if self.first == 0 {
            return Err(PivError::invalid("帧序号从 1 开始，first 不能为 0"));
        }
        if self.step == 0 {
            return Err(PivError::invalid("step 必须 >= 1"));
        }
        if self.jump == 0 {
            return Err(PivError::invalid("jump 必须 >= 1"));
        }

        let count = self.pair_count();
        if count <= 0 {
            return Err(PivError::invalid(format!(
                "帧对数量为 {count}: first={}, last={}, step={}, jump={}",
                self.first, self.last, self.step, self.jump
            )));
        }

        let pairs: Vec<FramePair> = (0..count as usize)
            .map(|index| {
                let back = self.first + index * self.step;
                FramePair::new(back, back + self.jump)
            })
            .collect();

        if let Some(bad) = pairs.iter().find(|p| p.front > self.last) {
            return Err(PivError::invalid(format!(
                "前帧序号 {} 超过 last={}",
                bad.front, self.last
            )));
        }

        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_tuples(pairs: &[FramePair]) -> Vec<(usize, usize)> {
        pairs.iter().map(|p| (p.back, p.front)).collect()
    }

    #[test]
    fn consecutive_pairs() {
        let pairs = PairingSpec::new(1, 5, 1, 1).build_pairs().unwrap();
        assert_eq!(as_tuples(&pairs), vec![(1, 2), (2, 3), (3, 4), (4, 5)]);
        assert_eq!(PairingSpec::consecutive(5), PairingSpec::new(1, 5, 1, 1));
    }

    #[test]
    fn stepped_pairs() {
        let pairs = PairingSpec::new(1, 5, 2, 1).build_pairs().unwrap();
        assert_eq!(as_tuples(&pairs), vec![(1, 2), (3, 4)]);
    }

    #[test]
    fn count_rounds_up() {
        let pairs = PairingSpec::new(1, 6, 2, 1).build_pairs().unwrap();
        assert_eq!(as_tuples(&pairs), vec![(1, 2), (3, 4), (5, 6)]);

        let pairs = PairingSpec::new(2, 9, 3, 2).build_pairs().unwrap();
        assert_eq!(as_tuples(&pairs), vec![(2, 4), (5, 7)]);
    }

    #[test]
    fn jump_larger_than_one() {
        let pairs = PairingSpec::new(1, 5, 1, 2).build_pairs().unwrap();
        assert_eq!(as_tuples(&pairs), vec![(1, 3), (2, 4), (3, 5)]);
    }

    #[test]
    fn non_positive_count_is_reported() {
        assert!(matches!(
            PairingSpec::new(3, 3, 1, 1).build_pairs(),
            Err(PivError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            PairingSpec::new(4, 2, 1, 1).build_pairs(),
            Err(PivError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_step_or_jump_is_rejected() {
        assert!(PairingSpec::new(1, 5, 0, 1).build_pairs().is_err());
        assert!(PairingSpec::new(1, 5, 1, 0).build_pairs().is_err());
        assert!(PairingSpec::new(0, 5, 1, 1).build_pairs().is_err());
    }

    #[test]
    fn explicit_list_is_range_checked() {
        let pairs = FramePair::from_list(&[(1, 2), (2, 4)], 4).unwrap();
        assert_eq!(as_tuples(&pairs), vec![(1, 2), (2, 4)]);

        assert!(matches!(
            FramePair::from_list(&[(1, 5)], 4),
            Err(PivError::FrameOutOfRange { index: 5, available: 4 })
        ));
        assert!(matches!(
            FramePair::from_list(&[(0, 1)], 4),
            Err(PivError::FrameOutOfRange { index: 0, .. })
        ));
        assert!(FramePair::from_list(&[], 4).is_err());
    }
}
