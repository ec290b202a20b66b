// crates/afx_physics/src/block/swap.rs

//! 交界面切片交换（阶段 2）
//!
//! 每侧裁出覆盖贴片全范围（两个切向各向外延拓 Gh，以同时覆盖棱
//! 幽灵）、沿表面法向从第一内部单元起 Gh 层深的切片；对端把它按
//! 朝向 tag 重映射后写入自己的幽灵区。
//!
//! # 面数组的处理
//!
//! 轴反向时交换该轴的低/高面并翻转面积向量符号；两侧表面同为低
//! 或同为高（外法向相对）时法向面同样反向。面中心是坐标，只换位
//! 不变号。
//!
//! # T 形交汇
//!
//! 幽灵体积初始为零。几何交换读到零体积的切片元素时跳过写入，并
//! 记录该元素落在的贴片边缘；这些边缘调整位 OR 回连接记录，后续
//! 状态交换读 border 旗标跳过对应条带（按 Gh 调整）。

use std::ops::Range;

use afx_core::Array3;
use afx_foundation::tolerance::UNFILLED_VOL;
use afx_foundation::{AfxError, AfxResult};

use super::slices::{GeomSlice, StateSlice};
use super::Block;
use crate::connection::BlockConnection;
use crate::state::EqArray;

impl BlockConnection {
    /// 该侧送出切片的填充坐标范围
    pub fn slice_ranges(
        &self,
        side: usize,
        dims: [usize; 3],
        gh: usize,
    ) -> (Range<usize>, Range<usize>, Range<usize>) {
        let dir = self.direction(side);
        let (t1, t2) = dir.tangential();
        let n3 = dims[dir.axis()];

        let mut r: [Range<usize>; 3] = [0..0, 0..0, 0..0];
        r[dir.axis()] = if self.is_lower(side) {
            gh..2 * gh
        } else {
            n3..n3 + gh
        };
        r[t1.axis()] = self.d1_start[side]..self.d1_end[side] + 2 * gh;
        r[t2.axis()] = self.d2_start[side]..self.d2_end[side] + 2 * gh;
        let [ri, rj, rk] = r;
        (ri, rj, rk)
    }
}

/// 目标侧每个幽灵单元与源切片单元的对应关系
///
/// 回调参数：目标填充坐标、源切片本地坐标、该元素所在的边缘条带
/// 旗标 (d1-低, d1-高, d2-低, d2-高)、(l3, a1, a2) 贴片坐标。
fn for_each_cell_pair<F>(
    conn: &BlockConnection,
    side: usize,
    dest_dims: [usize; 3],
    gh: usize,
    mut f: F,
) where
    F: FnMut((usize, usize, usize), (usize, usize, usize), [bool; 4]),
{
    let other = BlockConnection::other(side);
    let dd = conn.direction(side);
    let (dt1, dt2) = dd.tangential();
    let sd = conn.direction(other);
    let (st1, st2) = sd.tangential();

    let (e1, e2) = conn.extents(side);
    let (n1, n2) = (e1 + 2 * gh, e2 + 2 * gh);
    let (f1, f2) = conn.extents(other);
    let (m1, m2) = (f1 + 2 * gh, f2 + 2 * gh);

    let n3 = dest_dims[dd.axis()];
    let dest_lower = conn.is_lower(side);
    let src_lower = conn.is_lower(other);

    for l3 in 0..gh {
        for a2 in 0..n2 {
            for a1 in 0..n1 {
                let strips = [a1 < gh, a1 >= n1 - gh, a2 < gh, a2 >= n2 - gh];

                let mut dest = [0usize; 3];
                dest[dd.axis()] = if dest_lower {
                    gh - 1 - l3
                } else {
                    n3 + gh + l3
                };
                dest[dt1.axis()] = conn.d1_start[side] + a1;
                dest[dt2.axis()] = conn.d2_start[side] + a2;

                let (b1, b2) = if side == 0 {
                    conn.to_second(a1, a2, m1, m2)
                } else {
                    conn.to_first(a1, a2, m1, m2)
                };

                let mut src = [0usize; 3];
                src[sd.axis()] = if src_lower { l3 } else { gh - 1 - l3 };
                src[st1.axis()] = b1;
                src[st2.axis()] = b2;

                f(
                    (dest[0], dest[1], dest[2]),
                    (src[0], src[1], src[2]),
                    strips,
                );
            }
        }
    }
}

/// 校验来切片的形状
fn check_slice_shape(
    conn: &BlockConnection,
    side: usize,
    gh: usize,
    actual: [usize; 3],
    name: &'static str,
) -> AfxResult<()> {
    conn.validate()?;
    let other = BlockConnection::other(side);
    let sd = conn.direction(other);
    let (st1, st2) = sd.tangential();
    let (f1, f2) = conn.extents(other);
    let mut expected = [0usize; 3];
    expected[sd.axis()] = gh;
    expected[st1.axis()] = f1 + 2 * gh;
    expected[st2.axis()] = f2 + 2 * gh;
    AfxError::check_shape(name, expected, actual)
}

/// 把一个守恒量切片写入目标数组的幽灵区
///
/// `honor_borders` 为真时跳过连接记录里标记的边缘条带。
pub fn put_cell_slice(
    dest: &mut Array3<EqArray>,
    dest_phys_dims: [usize; 3],
    gh: usize,
    slice: &Array3<EqArray>,
    conn: &BlockConnection,
    side: usize,
    honor_borders: bool,
) -> AfxResult<()> {
    check_slice_shape(conn, side, gh, slice.dims(), "state-swap")?;
    for_each_cell_pair(conn, side, dest_phys_dims, gh, |d, s, strips| {
        if honor_borders {
            for e in 0..4 {
                if conn.border[side][e] && strips[e] {
                    return;
                }
            }
        }
        dest[d] = slice[s];
    });
    Ok(())
}

impl Block {
    /// 裁取本侧送出的状态切片
    pub fn carve_state_slice(&self, conn: &BlockConnection, side: usize) -> StateSlice {
        let (ri, rj, rk) = conn.slice_ranges(side, self.dims(), self.num_ghosts());
        self.state_slice(ri, rj, rk)
    }

    /// 裁取本侧送出的几何切片
    pub fn carve_geom_slice(&self, conn: &BlockConnection, side: usize) -> GeomSlice {
        let (ri, rj, rk) = conn.slice_ranges(side, self.dims(), self.num_ghosts());
        self.geom_slice(ri, rj, rk)
    }

    /// 写入对端状态切片
    pub fn put_state_slice(
        &mut self,
        slice: &StateSlice,
        conn: &BlockConnection,
        side: usize,
    ) -> AfxResult<()> {
        let dims = self.dims();
        let gh = self.num_ghosts();
        put_cell_slice(&mut self.state, dims, gh, &slice.state, conn, side, true)
    }

    /// 写入对端几何切片，返回四条贴片边缘的调整位
    ///
    /// 切片元素体积为零说明对端该处尚未填充（T 形交汇），跳过写入
    /// 并记录所在边缘。
    pub fn put_geom_slice(
        &mut self,
        slice: &GeomSlice,
        conn: &BlockConnection,
        side: usize,
    ) -> AfxResult<[bool; 4]> {
        check_slice_shape(conn, side, self.num_ghosts(), slice.vol.dims(), "geom-swap")?;

        let other = BlockConnection::other(side);
        let dd = conn.direction(side);
        let (dt1, dt2) = dd.tangential();
        let sd = conn.direction(other);
        let (st1, st2) = sd.tangential();
        let tang_rev = conn.tangential_reversed(side);
        let norm_rev = conn.normal_reversed();

        // 目标轴 → (源轴, 是否反向)
        let mut axis_map = [(0usize, false); 3];
        axis_map[dd.axis()] = (sd.axis(), norm_rev);
        if conn.swaps() {
            axis_map[dt1.axis()] = (st2.axis(), tang_rev[0]);
            axis_map[dt2.axis()] = (st1.axis(), tang_rev[1]);
        } else {
            axis_map[dt1.axis()] = (st1.axis(), tang_rev[0]);
            axis_map[dt2.axis()] = (st2.axis(), tang_rev[1]);
        }

        let mut adjust = [false; 4];
        let dims = self.dims();
        let gh = self.num_ghosts();

        // 借用规避：先收集写入计划再执行
        let mut writes: Vec<((usize, usize, usize), (usize, usize, usize))> = Vec::new();
        for_each_cell_pair(conn, side, dims, gh, |d, s, strips| {
            if slice.vol[s] <= UNFILLED_VOL {
                for e in 0..4 {
                    if strips[e] {
                        adjust[e] = true;
                    }
                }
                return;
            }
            writes.push((d, s));
        });

        for (d, s) in writes {
            self.vol[d] = slice.vol[s];
            self.center[d] = slice.center[s];

            for x in 0..3 {
                let (y, rev) = axis_map[x];
                let mut d_hi = [d.0, d.1, d.2];
                d_hi[x] += 1;
                let d_hi = (d_hi[0], d_hi[1], d_hi[2]);
                let mut s_hi = [s.0, s.1, s.2];
                s_hi[y] += 1;
                let s_hi = (s_hi[0], s_hi[1], s_hi[2]);

                if rev {
                    self.f_area[x][d] = slice.f_area[y][s_hi].flipped();
                    self.f_area[x][d_hi] = slice.f_area[y][s].flipped();
                    self.f_center[x][d] = slice.f_center[y][s_hi];
                    self.f_center[x][d_hi] = slice.f_center[y][s];
                } else {
                    self.f_area[x][d] = slice.f_area[y][s];
                    self.f_area[x][d_hi] = slice.f_area[y][s_hi];
                    self.f_center[x][d] = slice.f_center[y][s];
                    self.f_center[x][d_hi] = slice.f_center[y][s_hi];
                }
            }
        }
        Ok(adjust)
    }
}

/// 进程内几何交换：双向裁切、双向写入，边缘调整位 OR 回连接记录
pub fn swap_geom_slices(
    conn: &mut BlockConnection,
    blk1: &mut Block,
    blk2: &mut Block,
) -> AfxResult<()> {
    let s1 = blk1.carve_geom_slice(conn, 0);
    let s2 = blk2.carve_geom_slice(conn, 1);
    let adj1 = blk1.put_geom_slice(&s2, conn, 0)?;
    let adj2 = blk2.put_geom_slice(&s1, conn, 1)?;
    for e in 0..4 {
        if adj1[e] {
            conn.update_border(0, e);
        }
        if adj2[e] {
            conn.update_border(1, e);
        }
    }
    Ok(())
}

/// 进程内状态交换
pub fn swap_state_slices(
    conn: &BlockConnection,
    blk1: &mut Block,
    blk2: &mut Block,
) -> AfxResult<()> {
    let s1 = blk1.carve_state_slice(conn, 0);
    let s2 = blk2.carve_state_slice(conn, 1);
    blk1.put_state_slice(&s2, conn, 0)?;
    blk2.put_state_slice(&s1, conn, 1)?;
    Ok(())
}

/// 进程内 ΔU 交换（隐式扫掠之间）
pub fn swap_update_slices(
    conn: &BlockConnection,
    du1: &mut Array3<EqArray>,
    dims1: [usize; 3],
    du2: &mut Array3<EqArray>,
    dims2: [usize; 3],
    gh: usize,
) -> AfxResult<()> {
    let (ri, rj, rk) = conn.slice_ranges(0, dims1, gh);
    let s1 = du1.slice(ri, rj, rk);
    let (ri, rj, rk) = conn.slice_ranges(1, dims2, gh);
    let s2 = du2.slice(ri, rj, rk);
    put_cell_slice(du1, dims1, gh, &s2, conn, 0, true)?;
    put_cell_slice(du2, dims2, gh, &s1, conn, 1, true)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BcKind, BlockBoundary};
    use crate::connection::connection_between;
    use glam::DVec3;

    /// 两个 4³ 块沿 i 方向相邻（块 0 的 i-高对块 1 的 i-低）
    fn adjacent_pair() -> (Block, Block, BlockConnection) {
        let n = 4;
        let mut kinds0 = [BcKind::SlipWall; 6];
        kinds0[1] = BcKind::Interblock;
        let mut blk0 = Block::cartesian(
            n,
            n,
            n,
            2,
            DVec3::ZERO,
            DVec3::ONE,
            BlockBoundary::for_box(n, n, n, kinds0),
        );
        blk0.global_pos = 0;

        let mut kinds1 = [BcKind::SlipWall; 6];
        kinds1[0] = BcKind::Interblock;
        let mut blk1 = Block::cartesian(
            n,
            n,
            n,
            2,
            DVec3::new(n as f64, 0.0, 0.0),
            DVec3::ONE,
            BlockBoundary::for_box(n, n, n, kinds1),
        );
        blk1.global_pos = 1;

        let conn = connection_between(
            [0, 1],
            [2, 1],
            [(0, n), (0, n)],
            [(0, n), (0, n)],
            [n, 0],
            1,
        );
        (blk0, blk1, conn)
    }

    #[test]
    fn test_geom_swap_roundtrip_identity() {
        let (mut b0, mut b1, mut conn) = adjacent_pair();
        b0.assign_ghost_cells_geom();
        b1.assign_ghost_cells_geom();
        swap_geom_slices(&mut conn, &mut b0, &mut b1).unwrap();

        let g = b0.num_ghosts();
        // 块 0 的 i-高幽灵等于块 1 的内部（仿佛网格连续）
        for k in g..4 + g {
            for j in g..4 + g {
                for l in 0..2usize {
                    let d = (4 + g + l, j, k);
                    let s = (g + l, j, k);
                    assert_eq!(b0.vol[d], b1.vol[s]);
                    assert!((b0.center[d] - b1.center[s]).length() < 1e-12);
                    // 面积单位向量长度为 1，方向一致
                    let fa = b0.f_area[0][(4 + g + l, j, k)];
                    assert!((fa.unit.length() - 1.0).abs() < 1e-12);
                    assert!((fa.unit - DVec3::X).length() < 1e-12);
                }
            }
        }
        // 反方向同样成立
        for k in g..4 + g {
            for j in g..4 + g {
                for l in 0..2usize {
                    let d = (g - 1 - l, j, k);
                    let s = (4 + g - 1 - l, j, k);
                    assert_eq!(b1.vol[d], b0.vol[s]);
                    assert!((b1.center[d] - b0.center[s]).length() < 1e-12);
                }
            }
        }
        // 无 T 形交汇：边缘位全空
        assert_eq!(conn.border, [[false; 4]; 2]);
    }

    #[test]
    fn test_state_swap_matches_partner_interior() {
        let (mut b0, mut b1, conn) = adjacent_pair();
        let g = b0.num_ghosts();
        // 染色：每单元独一无二的状态
        for k in 0..b0.state.nk() {
            for j in 0..b0.state.nj() {
                for i in 0..b0.state.ni() {
                    b0.state[(i, j, k)][0] = (i + 10 * j + 100 * k) as f64;
                    b1.state[(i, j, k)][0] = -((i + 10 * j + 100 * k) as f64);
                }
            }
        }
        let mut b0c = b0.clone();
        let mut b1c = b1.clone();
        swap_state_slices(&conn, &mut b0c, &mut b1c).unwrap();

        for k in g..4 + g {
            for j in g..4 + g {
                for l in 0..2usize {
                    assert_eq!(
                        b0c.state[(4 + g + l, j, k)][0],
                        b1.state[(g + l, j, k)][0]
                    );
                    assert_eq!(
                        b1c.state[(g - 1 - l, j, k)][0],
                        b0.state[(4 + g - 1 - l, j, k)][0]
                    );
                }
            }
        }
    }

    #[test]
    fn test_state_swap_rejects_mismatched_extents() {
        let (mut b0, mut b1, mut conn) = adjacent_pair();
        conn.d1_end[1] = 3;
        let err = swap_state_slices(&conn, &mut b0, &mut b1).unwrap_err();
        assert!(matches!(err, AfxError::BoundaryMismatch { .. }));
    }

    #[test]
    fn test_border_flag_skips_edge_strip() {
        let (mut b0, mut b1, mut conn) = adjacent_pair();
        let g = b0.num_ghosts();
        conn.border[0] = [false, false, true, false]; // d2-低条带跳过
        for k in 0..b1.state.nk() {
            for j in 0..b1.state.nj() {
                for i in 0..b1.state.ni() {
                    b1.state[(i, j, k)][0] = 7.0;
                }
            }
        }
        b0.state.fill(EqArray::ZERO);
        swap_state_slices(&conn, &mut b0, &mut b1).unwrap();
        // i-边界的 d1 = j, d2 = k：k 低条带（k < gh）未被写入
        assert_eq!(b0.state[(4 + g, g, g - 1)][0], 0.0);
        assert_eq!(b0.state[(4 + g, g, g)][0], 7.0);
    }
}
