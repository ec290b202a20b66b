// crates/afx_physics/src/block/slices.rs

//! 块切片
//!
//! 交界面交换的搬运单元：从块上裁出矩形子范围的独立拷贝。
//! [`GeomSlice`] 带全部几何量，[`StateSlice`] 只带状态。
//! 面数组沿所在方向比单元范围多一个条目。

use std::ops::Range;

use afx_core::{Array3, UnitVec3Mag};
use glam::DVec3;

use super::Block;
use crate::state::EqArray;

/// 几何切片
#[derive(Debug, Clone)]
pub struct GeomSlice {
    /// 父块全局号
    pub parent_block: usize,
    /// 单元中心
    pub center: Array3<DVec3>,
    /// 单元体积
    pub vol: Array3<f64>,
    /// 面积向量，按 i/j/k
    pub f_area: [Array3<UnitVec3Mag>; 3],
    /// 面中心，按 i/j/k
    pub f_center: [Array3<DVec3>; 3],
}

impl GeomSlice {
    /// 切片的单元形状
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.vol.dims()
    }
}

/// 状态切片
#[derive(Debug, Clone)]
pub struct StateSlice {
    /// 父块全局号
    pub parent_block: usize,
    /// 守恒状态
    pub state: Array3<EqArray>,
}

impl StateSlice {
    /// 切片的单元形状
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.state.dims()
    }
}

impl Block {
    /// 裁取几何切片（填充坐标，半开区间）
    ///
    /// 面数组在所在方向多取一个条目。
    pub fn geom_slice(&self, ri: Range<usize>, rj: Range<usize>, rk: Range<usize>) -> GeomSlice {
        let plus_one = |r: &Range<usize>| -> Range<usize> { r.start..r.end + 1 };
        GeomSlice {
            parent_block: self.global_pos,
            center: self.center.slice(ri.clone(), rj.clone(), rk.clone()),
            vol: self.vol.slice(ri.clone(), rj.clone(), rk.clone()),
            f_area: [
                self.f_area[0].slice(plus_one(&ri), rj.clone(), rk.clone()),
                self.f_area[1].slice(ri.clone(), plus_one(&rj), rk.clone()),
                self.f_area[2].slice(ri.clone(), rj.clone(), plus_one(&rk)),
            ],
            f_center: [
                self.f_center[0].slice(plus_one(&ri), rj.clone(), rk.clone()),
                self.f_center[1].slice(ri.clone(), plus_one(&rj), rk.clone()),
                self.f_center[2].slice(ri, rj, plus_one(&rk)),
            ],
        }
    }

    /// 裁取状态切片（填充坐标，半开区间）
    pub fn state_slice(&self, ri: Range<usize>, rj: Range<usize>, rk: Range<usize>) -> StateSlice {
        StateSlice {
            parent_block: self.global_pos,
            state: self.state.slice(ri, rj, rk),
        }
    }
}
