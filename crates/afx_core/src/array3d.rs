// crates/afx_core/src/array3d.rs

//! 稠密三维数组
//!
//! 结构网格求解器的核心容器。所有单元量、面量都存放在 [`Array3`]
//! 中，块之间的批量数据搬运只通过 [`Array3::slice`] 与
//! [`Array3::insert`] 完成。
//!
//! # 核心操作
//!
//! - `slice`: 拷贝一个矩形子范围，返回独立所有权的新数组
//! - `insert`: 将形状一致的源数组逐元素写入目标范围
//! - `grow`: 沿指定方向扩展一层，复制末端面
//!
//! 所有范围均为上界开区间。`insert` 的源形状与目标范围不一致时
//! 返回 [`AfxError::ShapeMismatch`]。
//!
//! # 所有权
//!
//! `slice` 必须返回独立拷贝而非视图：halo 协议下同一数组可能同时
//! 作为交换的源与目标，视图会造成读写交叠。

use std::ops::{Index, IndexMut, Range};

use afx_foundation::{AfxError, AfxResult};

use crate::direction::Direction;

/// 稠密 i,j,k 三维数组
///
/// 存储按 i 最快、k 最慢的行优先布局。
#[derive(Debug, Clone, PartialEq)]
pub struct Array3<T> {
    ni: usize,
    nj: usize,
    nk: usize,
    data: Vec<T>,
}

impl<T: Clone> Array3<T> {
    /// 创建数组并以 `init` 填充
    pub fn new(ni: usize, nj: usize, nk: usize, init: T) -> Self {
        Self {
            ni,
            nj,
            nk,
            data: vec![init; ni * nj * nk],
        }
    }

    /// 清空并重新分配到新形状
    pub fn clear_resize(&mut self, ni: usize, nj: usize, nk: usize, init: T) {
        self.ni = ni;
        self.nj = nj;
        self.nk = nk;
        self.data.clear();
        self.data.resize(ni * nj * nk, init);
    }

    /// 以 `value` 覆盖全部元素
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// i 方向长度
    #[inline]
    pub fn ni(&self) -> usize {
        self.ni
    }

    /// j 方向长度
    #[inline]
    pub fn nj(&self) -> usize {
        self.nj
    }

    /// k 方向长度
    #[inline]
    pub fn nk(&self) -> usize {
        self.nk
    }

    /// 形状 (ni, nj, nk)
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        [self.ni, self.nj, self.nk]
    }

    /// 元素总数
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 指定方向的长度
    #[inline]
    pub fn len_dir(&self, dir: Direction) -> usize {
        match dir {
            Direction::I => self.ni,
            Direction::J => self.nj,
            Direction::K => self.nk,
        }
    }

    #[inline]
    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.ni && j < self.nj && k < self.nk);
        i + self.ni * (j + self.nj * k)
    }

    /// 底层线性存储（按 i 最快布局），供编解码器批量读写
    #[inline]
    pub fn raw(&self) -> &[T] {
        &self.data
    }

    /// 底层线性存储的可变引用
    #[inline]
    pub fn raw_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// 拷贝矩形子范围，返回独立所有权的新数组
    ///
    /// 范围上界开。越界属于索引契约违例，直接 panic。
    pub fn slice(&self, ri: Range<usize>, rj: Range<usize>, rk: Range<usize>) -> Array3<T> {
        assert!(
            ri.end <= self.ni && rj.end <= self.nj && rk.end <= self.nk,
            "slice 范围 ({:?},{:?},{:?}) 超出形状 {:?}",
            ri,
            rj,
            rk,
            self.dims()
        );
        let (si, sj, sk) = (ri.len(), rj.len(), rk.len());
        let mut out = Vec::with_capacity(si * sj * sk);
        for k in rk.clone() {
            for j in rj.clone() {
                for i in ri.clone() {
                    out.push(self.data[self.offset(i, j, k)].clone());
                }
            }
        }
        Array3 {
            ni: si,
            nj: sj,
            nk: sk,
            data: out,
        }
    }

    /// 将源数组逐元素写入目标范围
    ///
    /// 源形状必须与目标范围完全一致，否则返回
    /// [`AfxError::ShapeMismatch`]。
    pub fn insert(
        &mut self,
        ri: Range<usize>,
        rj: Range<usize>,
        rk: Range<usize>,
        src: &Array3<T>,
    ) -> AfxResult<()> {
        AfxError::check_shape("insert", [ri.len(), rj.len(), rk.len()], src.dims())?;
        if ri.end > self.ni || rj.end > self.nj || rk.end > self.nk {
            return Err(AfxError::ShapeMismatch {
                name: "insert-range",
                expected: self.dims(),
                actual: [ri.end, rj.end, rk.end],
            });
        }
        for (kk, k) in rk.clone().enumerate() {
            for (jj, j) in rj.clone().enumerate() {
                for (ii, i) in ri.clone().enumerate() {
                    let o = self.offset(i, j, k);
                    self.data[o] = src[(ii, jj, kk)].clone();
                }
            }
        }
        Ok(())
    }

    /// 沿 `dir` 方向扩展一层，复制末端面
    ///
    /// 用于把单元切片的范围延拓到面数组（面数组在所在方向多一个
    /// 条目）。
    pub fn grow(&self, dir: Direction) -> Array3<T> {
        let [mut ni, mut nj, mut nk] = self.dims();
        match dir {
            Direction::I => ni += 1,
            Direction::J => nj += 1,
            Direction::K => nk += 1,
        }
        let mut out = Array3::new(ni, nj, nk, self.data[0].clone());
        for k in 0..nk {
            let sk = k.min(self.nk - 1);
            for j in 0..nj {
                let sj = j.min(self.nj - 1);
                for i in 0..ni {
                    let si = i.min(self.ni - 1);
                    let o = out.offset(i, j, k);
                    out.data[o] = self.data[self.offset(si, sj, sk)].clone();
                }
            }
        }
        out
    }
}

impl<T> Index<(usize, usize, usize)> for Array3<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j, k): (usize, usize, usize)) -> &T {
        debug_assert!(i < self.ni && j < self.nj && k < self.nk);
        &self.data[i + self.ni * (j + self.nj * k)]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Array3<T> {
    #[inline]
    fn index_mut(&mut self, (i, j, k): (usize, usize, usize)) -> &mut T {
        debug_assert!(i < self.ni && j < self.nj && k < self.nk);
        &mut self.data[i + self.ni * (j + self.nj * k)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(ni: usize, nj: usize, nk: usize) -> Array3<f64> {
        let mut a = Array3::new(ni, nj, nk, 0.0);
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    a[(i, j, k)] = (i + 10 * j + 100 * k) as f64;
                }
            }
        }
        a
    }

    #[test]
    fn test_index_roundtrip() {
        let a = numbered(3, 4, 5);
        assert_eq!(a[(2, 3, 4)], 432.0);
        assert_eq!(a.size(), 60);
    }

    #[test]
    fn test_slice_is_owned_copy() {
        let a = numbered(4, 4, 4);
        let s = a.slice(1..3, 1..3, 1..3);
        assert_eq!(s.dims(), [2, 2, 2]);
        assert_eq!(s[(0, 0, 0)], a[(1, 1, 1)]);
        assert_eq!(s[(1, 1, 1)], a[(2, 2, 2)]);
    }

    #[test]
    fn test_insert_roundtrip() {
        let a = numbered(4, 4, 4);
        let s = a.slice(1..3, 0..4, 2..4);
        let mut b = Array3::new(4, 4, 4, -1.0);
        b.insert(1..3, 0..4, 2..4, &s).unwrap();
        assert_eq!(b[(1, 0, 2)], a[(1, 0, 2)]);
        assert_eq!(b[(2, 3, 3)], a[(2, 3, 3)]);
        assert_eq!(b[(0, 0, 0)], -1.0);
    }

    #[test]
    fn test_insert_shape_mismatch() {
        let s = Array3::new(2, 2, 2, 1.0);
        let mut b = Array3::new(4, 4, 4, 0.0);
        let err = b.insert(0..3, 0..2, 0..2, &s).unwrap_err();
        assert!(matches!(
            err,
            afx_foundation::AfxError::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_grow_duplicates_terminal_face() {
        let a = numbered(2, 2, 2);
        let g = a.grow(Direction::I);
        assert_eq!(g.dims(), [3, 2, 2]);
        assert_eq!(g[(2, 1, 1)], a[(1, 1, 1)]);
        assert_eq!(g[(0, 0, 0)], a[(0, 0, 0)]);
    }

    #[test]
    fn test_clear_resize() {
        let mut a = numbered(2, 2, 2);
        a.clear_resize(3, 3, 3, 7.0);
        assert_eq!(a.dims(), [3, 3, 3]);
        assert_eq!(a[(2, 2, 2)], 7.0);
    }
}
