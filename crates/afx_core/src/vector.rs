// crates/afx_core/src/vector.rs

//! 面积向量表示
//!
//! 面积以 `单位方向 + 模长` 形式存放，避免通量计算中反复归一化。
//! 物理面的单位向量约定指向索引增大方向。

use glam::DVec3;

/// 单位向量 + 模长
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitVec3Mag {
    /// 单位方向
    pub unit: DVec3,
    /// 模长
    pub mag: f64,
}

impl UnitVec3Mag {
    /// 零面积（幽灵面哨兵）
    pub const ZERO: Self = Self {
        unit: DVec3::ZERO,
        mag: 0.0,
    };

    /// 由完整向量构造，归一化方向并记录模长
    #[inline]
    pub fn from_vector(v: DVec3) -> Self {
        let mag = v.length();
        if mag > 0.0 {
            Self { unit: v / mag, mag }
        } else {
            Self::ZERO
        }
    }

    /// 还原完整向量
    #[inline]
    pub fn vector(&self) -> DVec3 {
        self.unit * self.mag
    }

    /// 方向取反（模长不变）
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            unit: -self.unit,
            mag: self.mag,
        }
    }
}

impl Default for UnitVec3Mag {
    fn default() -> Self {
        Self::ZERO
    }
}
