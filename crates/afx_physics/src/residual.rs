// crates/afx_physics/src/residual.rs

//! 残差记录
//!
//! - [`ResidualL2`]: 各方程残差平方和，worker 间求和后开方
//! - [`ResidLinf`]: L∞ 幅值加定位元组 (块, i, j, k, 方程)，归并时
//!   用保留定位的成对取大

use crate::state::{EqArray, NUM_EQNS};

// ============================================================
// L2
// ============================================================

/// L2 残差累加器
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResidualL2(pub [f64; NUM_EQNS]);

impl ResidualL2 {
    /// 全零
    pub const ZERO: Self = Self([0.0; NUM_EQNS]);

    /// 累加一个单元残差的平方
    #[inline]
    pub fn accumulate(&mut self, r: &EqArray) {
        let sq = r.squared();
        for (o, v) in self.0.iter_mut().zip(sq.0.iter()) {
            *o += v;
        }
    }

    /// 逐分量相加（worker 间归并）
    #[inline]
    pub fn merge(&mut self, other: &Self) {
        for (o, v) in self.0.iter_mut().zip(other.0.iter()) {
            *o += v;
        }
    }

    /// 全方程平方和
    #[inline]
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// 开方后的 L2 范数（全方程合计）
    #[inline]
    pub fn norm(&self) -> f64 {
        self.total().sqrt()
    }
}

// ============================================================
// L∞ 与定位
// ============================================================

/// L∞ 残差记录：幅值 + 违例点定位
///
/// 定位元组为 (父块号, i, j, k, 方程号)，方程号从 1 起计。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidLinf {
    /// L∞ 幅值
    pub linf: f64,
    /// 父块号
    pub block: i32,
    /// 物理 i 索引
    pub i: i32,
    /// 物理 j 索引
    pub j: i32,
    /// 物理 k 索引
    pub k: i32,
    /// 方程号（1 起计）
    pub eq: i32,
}

impl ResidLinf {
    /// 零记录
    pub const ZERO: Self = Self {
        linf: 0.0,
        block: 0,
        i: 0,
        j: 0,
        k: 0,
        eq: 0,
    };

    /// 用一个单元残差挑战当前最大值，若更大则记录定位
    #[inline]
    pub fn challenge(&mut self, r: &EqArray, block: usize, i: usize, j: usize, k: usize) {
        let (mag, eq) = r.abs_max();
        if mag > self.linf {
            self.linf = mag;
            self.block = block as i32;
            self.i = i as i32;
            self.j = j as i32;
            self.k = k as i32;
            self.eq = eq as i32 + 1;
        }
    }

    /// 保留定位的成对取大（归并算子）
    #[inline]
    pub fn max(self, other: Self) -> Self {
        if other.linf >= self.linf {
            other
        } else {
            self
        }
    }
}

impl Default for ResidLinf {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_accumulate_and_merge() {
        let mut a = ResidualL2::ZERO;
        let mut r = EqArray::ZERO;
        r[0] = 3.0;
        r[4] = 4.0;
        a.accumulate(&r);
        assert!((a.total() - 25.0).abs() < 1e-14);

        let mut b = ResidualL2::ZERO;
        b.accumulate(&r);
        a.merge(&b);
        assert!((a.norm() - 50.0_f64.sqrt()).abs() < 1e-14);
    }

    #[test]
    fn test_linf_challenge_records_locator() {
        let mut linf = ResidLinf::ZERO;
        let mut r = EqArray::ZERO;
        r[2] = -2.0;
        linf.challenge(&r, 3, 1, 2, 3);
        assert_eq!(linf.linf, 2.0);
        assert_eq!(linf.block, 3);
        assert_eq!(linf.eq, 3);

        // 较小的残差不覆盖
        let mut small = EqArray::ZERO;
        small[0] = 1.0;
        linf.challenge(&small, 9, 9, 9, 9);
        assert_eq!(linf.block, 3);
    }

    #[test]
    fn test_max_preserves_winner_locator() {
        let a = ResidLinf {
            linf: 1.0,
            block: 0,
            i: 1,
            j: 1,
            k: 1,
            eq: 1,
        };
        let b = ResidLinf {
            linf: 2.0,
            block: 7,
            i: 2,
            j: 3,
            k: 4,
            eq: 5,
        };
        let m = a.max(b);
        assert_eq!(m.block, 7);
        assert_eq!(m.linf, 2.0);
        assert_eq!(b.max(a).block, 7);
    }
}
