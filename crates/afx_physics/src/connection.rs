// crates/afx_physics/src/connection.rs

//! 交界面记录
//!
//! 两个块之间（也可以是同一块的两个表面之间）的定向二维贴片对。
//! 记录两侧的 (rank, 全局块号, 本地块号, 表面号, d1/d2 范围, 常数
//! 面索引)、一个 1..8 的朝向 tag 以及每侧四个边缘旗标。
//!
//! # 朝向语义
//!
//! 朝向把第一侧贴片的 (d1, d2) 坐标映射到第二侧：
//!
//! | tag | 含义 |
//! |-----|------|
//! | 1 | 恒等 |
//! | 2 | 交换 (d1, d2) |
//! | 3 | 反转 d1 |
//! | 4 | 反转 d2 |
//! | 5 | 交换 + 反转 d1 |
//! | 6 | 交换 + 反转 d2 |
//! | 7 | 反转 d1 与 d2 |
//! | 8 | 交换 + 反转 d1 与 d2 |
//!
//! 反转与交换针对第二侧坐标系：tag 5 表示先交换再反转第二侧的 d1。
//! 映射表由按 tag 的生成式 match 给出，不走分支拼接。
//!
//! # 边缘旗标
//!
//! `border[side][e]` 表示该侧贴片第 e 条边（d1-低、d1-高、d2-低、
//! d2-高）与同一表面上的另一个交界面贴片相邻；交换时跳过对应的
//! 角条带，由拥有那条带的连接负责填充（T 形交汇规则）。

use afx_core::Direction;
use afx_foundation::{AfxError, AfxResult};
use serde::{Deserialize, Serialize};

/// 交界面记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConnection {
    /// 两侧 worker rank
    pub rank: [usize; 2],
    /// 两侧全局块号
    pub block: [usize; 2],
    /// 两侧 worker 本地块号
    pub local_block: [usize; 2],
    /// 两侧表面号 1..6
    pub boundary: [usize; 2],
    /// 两侧 d1 起（物理单元索引）
    pub d1_start: [usize; 2],
    /// 两侧 d1 止（半开）
    pub d1_end: [usize; 2],
    /// 两侧 d2 起
    pub d2_start: [usize; 2],
    /// 两侧 d2 止（半开）
    pub d2_end: [usize; 2],
    /// 两侧常数方向面索引
    pub const_surf: [usize; 2],
    /// 朝向 tag 1..8
    pub orientation: u8,
    /// 每侧四条边的相邻旗标 (d1-低, d1-高, d2-低, d2-高)
    pub border: [[bool; 4]; 2],
}

impl BlockConnection {
    /// 贴片所在方向
    #[inline]
    pub fn direction(&self, side: usize) -> Direction {
        match self.boundary[side] {
            1 | 2 => Direction::I,
            3 | 4 => Direction::J,
            _ => Direction::K,
        }
    }

    /// 该侧是否低侧表面
    #[inline]
    pub fn is_lower(&self, side: usize) -> bool {
        matches!(self.boundary[side], 1 | 3 | 5)
    }

    /// 该侧贴片的 d1 / d2 单元数
    #[inline]
    pub fn extents(&self, side: usize) -> (usize, usize) {
        (
            self.d1_end[side] - self.d1_start[side],
            self.d2_end[side] - self.d2_start[side],
        )
    }

    /// 朝向是否交换 (d1, d2)
    #[inline]
    pub fn swaps(&self) -> bool {
        matches!(self.orientation, 2 | 5 | 6 | 8)
    }

    /// 记录合法性校验
    ///
    /// 表面号与朝向非法是 halo 协议错误；两侧重映射后的单元总数
    /// 不一致是交界面不匹配错误。
    pub fn validate(&self) -> AfxResult<()> {
        for side in 0..2 {
            if !(1..=6).contains(&self.boundary[side]) {
                return Err(AfxError::halo(format!(
                    "交界面记录表面号 {} 不在 1..6 内",
                    self.boundary[side]
                )));
            }
        }
        if !(1..=8).contains(&self.orientation) {
            return Err(AfxError::halo(format!(
                "交界面朝向 {} 不在 1..8 内",
                self.orientation
            )));
        }
        let (a1, a2) = self.extents(0);
        let (b1, b2) = self.extents(1);
        let (m1, m2) = if self.swaps() { (b2, b1) } else { (b1, b2) };
        if a1 != m1 || a2 != m2 {
            return Err(AfxError::BoundaryMismatch {
                block_first: self.block[0],
                block_second: self.block[1],
                cells_first: a1 * a2,
                cells_second: b1 * b2,
            });
        }
        Ok(())
    }

    /// 第一侧扩展坐标 → 第二侧扩展坐标
    ///
    /// `m1` / `m2` 为第二侧（含幽灵延拓的）d1 / d2 范围长度。
    #[inline]
    pub fn to_second(&self, a1: usize, a2: usize, m1: usize, m2: usize) -> (usize, usize) {
        match self.orientation {
            1 => (a1, a2),
            2 => (a2, a1),
            3 => (m1 - 1 - a1, a2),
            4 => (a1, m2 - 1 - a2),
            5 => (m1 - 1 - a2, a1),
            6 => (a2, m2 - 1 - a1),
            7 => (m1 - 1 - a1, m2 - 1 - a2),
            _ => (m1 - 1 - a2, m2 - 1 - a1),
        }
    }

    /// 第二侧扩展坐标 → 第一侧扩展坐标（[`Self::to_second`] 的逆）
    ///
    /// `n1` / `n2` 为第一侧（含幽灵延拓的）d1 / d2 范围长度。
    #[inline]
    pub fn to_first(&self, b1: usize, b2: usize, n1: usize, n2: usize) -> (usize, usize) {
        match self.orientation {
            1 => (b1, b2),
            2 => (b2, b1),
            3 => (n1 - 1 - b1, b2),
            4 => (b1, n2 - 1 - b2),
            5 => (b2, n2 - 1 - b1),
            6 => (n1 - 1 - b2, b1),
            7 => (n1 - 1 - b1, n2 - 1 - b2),
            _ => (n1 - 1 - b2, n2 - 1 - b1),
        }
    }

    /// 目标侧 (d1, d2) 轴上，源坐标是否反向推进
    ///
    /// 反向的轴需要交换低/高面并翻转面积向量符号。
    #[inline]
    pub fn tangential_reversed(&self, dest_side: usize) -> [bool; 2] {
        let o = self.orientation;
        if dest_side == 0 {
            [matches!(o, 3 | 6 | 7 | 8), matches!(o, 4 | 5 | 7 | 8)]
        } else {
            [matches!(o, 3 | 5 | 7 | 8), matches!(o, 4 | 6 | 7 | 8)]
        }
    }

    /// 法向是否反向（两侧同为低或同为高表面时外法向相对）
    #[inline]
    pub fn normal_reversed(&self) -> bool {
        self.is_lower(0) == self.is_lower(1)
    }

    /// 另一侧序号
    #[inline]
    pub fn other(side: usize) -> usize {
        1 - side
    }

    /// 记录某侧一条边需要未来调整（T 形交汇检测结果）
    #[inline]
    pub fn update_border(&mut self, side: usize, edge: usize) {
        self.border[side][edge] = true;
    }
}

/// 以给定朝向构造一对贴片的便捷函数（分解器与测试用）
#[allow(clippy::too_many_arguments)]
pub fn connection_between(
    block: [usize; 2],
    boundary: [usize; 2],
    d1_range: [(usize, usize); 2],
    d2_range: [(usize, usize); 2],
    const_surf: [usize; 2],
    orientation: u8,
) -> BlockConnection {
    BlockConnection {
        rank: [0, 0],
        block,
        local_block: block,
        boundary,
        d1_start: [d1_range[0].0, d1_range[1].0],
        d1_end: [d1_range[0].1, d1_range[1].1],
        d2_start: [d2_range[0].0, d2_range[1].0],
        d2_end: [d2_range[0].1, d2_range[1].1],
        const_surf,
        orientation,
        border: [[false; 4]; 2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(orientation: u8) -> BlockConnection {
        connection_between(
            [0, 1],
            [2, 1],
            [(0, 4), (0, 4)],
            [(0, 4), (0, 4)],
            [4, 0],
            orientation,
        )
    }

    #[test]
    fn test_remap_is_invertible() {
        let (n1, n2) = (6, 6);
        for o in 1..=8u8 {
            let c = conn(o);
            for a1 in 0..n1 {
                for a2 in 0..n2 {
                    let (b1, b2) = c.to_second(a1, a2, n1, n2);
                    assert_eq!(
                        c.to_first(b1, b2, n1, n2),
                        (a1, a2),
                        "朝向 {} 在 ({}, {})",
                        o,
                        a1,
                        a2
                    );
                }
            }
        }
    }

    #[test]
    fn test_remap_is_bijective() {
        use std::collections::HashSet;
        let (n1, n2) = (5, 7);
        for o in [1, 3, 4, 7] {
            // 非交换朝向允许矩形贴片
            let c = conn(o);
            let mut seen = HashSet::new();
            for a1 in 0..n1 {
                for a2 in 0..n2 {
                    seen.insert(c.to_second(a1, a2, n1, n2));
                }
            }
            assert_eq!(seen.len(), n1 * n2, "朝向 {}", o);
        }
    }

    #[test]
    fn test_identity_and_swap() {
        let c = conn(1);
        assert_eq!(c.to_second(1, 2, 4, 4), (1, 2));
        assert!(!c.swaps());
        let c = conn(2);
        assert_eq!(c.to_second(1, 2, 4, 4), (2, 1));
        assert!(c.swaps());
    }

    #[test]
    fn test_validate_rejects_bad_surface() {
        let mut c = conn(1);
        c.boundary[0] = 7;
        assert!(c.validate().is_err());
        let mut c = conn(1);
        c.orientation = 9;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_cell_count_mismatch() {
        let mut c = conn(1);
        c.d1_end[1] = 3;
        let err = c.validate().unwrap_err();
        assert!(matches!(err, AfxError::BoundaryMismatch { .. }));
    }

    #[test]
    fn test_normal_reversed() {
        // i-高对 j-低：一高一低，法向连续
        assert!(!conn(1).normal_reversed());
        let mut c = conn(1);
        c.boundary = [2, 2];
        assert!(c.normal_reversed());
    }
}
