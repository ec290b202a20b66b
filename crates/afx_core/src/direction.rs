// crates/afx_core/src/direction.rs

//! 结构网格索引方向

use std::fmt;

use afx_foundation::{AfxError, AfxResult};
use serde::{Deserialize, Serialize};

/// 结构网格的三个索引方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// i 方向
    I,
    /// j 方向
    J,
    /// k 方向
    K,
}

impl Direction {
    /// 全部方向，按 i, j, k 顺序
    pub const ALL: [Direction; 3] = [Direction::I, Direction::J, Direction::K];

    /// 轴序号：i=0, j=1, k=2
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Direction::I => 0,
            Direction::J => 1,
            Direction::K => 2,
        }
    }

    /// 由轴序号构造
    #[inline]
    pub fn from_axis(axis: usize) -> AfxResult<Self> {
        match axis {
            0 => Ok(Direction::I),
            1 => Ok(Direction::J),
            2 => Ok(Direction::K),
            _ => Err(AfxError::halo(format!("方向序号 {} 不在 {{i,j,k}} 内", axis))),
        }
    }

    /// 单位位移 (di, dj, dk)
    #[inline]
    pub fn unit(self) -> (usize, usize, usize) {
        match self {
            Direction::I => (1, 0, 0),
            Direction::J => (0, 1, 0),
            Direction::K => (0, 0, 1),
        }
    }

    /// 另外两个方向，按循环顺序
    ///
    /// I → (J, K)，J → (K, I)，K → (I, J)。交界面贴片的 (d1, d2)
    /// 切向坐标遵循此约定。
    #[inline]
    pub fn tangential(self) -> (Direction, Direction) {
        match self {
            Direction::I => (Direction::J, Direction::K),
            Direction::J => (Direction::K, Direction::I),
            Direction::K => (Direction::I, Direction::J),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::I => write!(f, "i"),
            Direction::J => write!(f, "j"),
            Direction::K => write!(f, "k"),
        }
    }
}
