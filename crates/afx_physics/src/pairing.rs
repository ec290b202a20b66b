// crates/afx_physics/src/pairing.rs

//! 交界面配对
//!
//! 由块列表上的 `interblock` 贴片建立连接记录：贴片 tag 存放对端
//! 全局块号，两两互指即认为配对。朝向不猜测——对 1..8 逐一验证
//! 贴片边界面中心的重映射是否逐点重合，全部吻合才接受。

use afx_foundation::{AfxError, AfxResult};
use glam::DVec3;

use crate::block::Block;
use crate::boundary::BoundarySurface;
use crate::connection::{connection_between, BlockConnection};

/// 贴片坐标 (a1, a2) 处的边界面中心
fn patch_face_center(blk: &Block, s: &BoundarySurface, a1: usize, a2: usize) -> DVec3 {
    let gh = blk.num_ghosts();
    let dir = s.direction();
    let (t1, t2) = dir.tangential();
    let (d1s, _) = s.d1_range();
    let (d2s, _) = s.d2_range();
    let mut idx = [0usize; 3];
    idx[dir.axis()] = s.const_index() + gh;
    idx[t1.axis()] = d1s + a1 + gh;
    idx[t2.axis()] = d2s + a2 + gh;
    blk.f_center[dir.axis()][(idx[0], idx[1], idx[2])]
}

/// 对一对贴片确定朝向 tag
///
/// 对每个候选朝向检查全部面中心的重映射重合；无一吻合则两侧
/// 几何不相容。
pub fn find_orientation(
    blk0: &Block,
    s0: &BoundarySurface,
    blk1: &Block,
    s1: &BoundarySurface,
) -> AfxResult<u8> {
    const TOL: f64 = 1e-9;
    let (d1a, d1e) = s0.d1_range();
    let (d2a, d2e) = s0.d2_range();
    let (n1, n2) = (d1e - d1a, d2e - d2a);
    let (e1s, e1e) = s1.d1_range();
    let (e2s, e2e) = s1.d2_range();
    let (m1, m2) = (e1e - e1s, e2e - e2s);

    'orient: for o in 1..=8u8 {
        let probe = connection_between(
            [blk0.global_pos, blk1.global_pos],
            [s0.surface, s1.surface],
            [(0, n1), (0, m1)],
            [(0, n2), (0, m2)],
            [s0.const_index(), s1.const_index()],
            o,
        );
        // 交换朝向要求两侧范围转置后一致
        let ok_extent = if probe.swaps() {
            n1 == m2 && n2 == m1
        } else {
            n1 == m1 && n2 == m2
        };
        if !ok_extent {
            continue;
        }
        for a2 in 0..n2 {
            for a1 in 0..n1 {
                let (b1, b2) = probe.to_second(a1, a2, m1, m2);
                let p0 = patch_face_center(blk0, s0, a1, a2);
                let p1 = patch_face_center(blk1, s1, b1, b2);
                if (p0 - p1).length() > TOL {
                    continue 'orient;
                }
            }
        }
        return Ok(o);
    }
    Err(AfxError::BoundaryMismatch {
        block_first: blk0.global_pos,
        block_second: blk1.global_pos,
        cells_first: n1 * n2,
        cells_second: m1 * m2,
    })
}

/// 贴片四条边 (d1-低, d1-高, d2-低, d2-高) 是否与同一表面上的另一
/// 个交界面贴片相邻
///
/// 相邻边的角条带归拥有方连接填充，交换时跳过。
pub fn derive_borders(blk: &Block, s: &BoundarySurface) -> [bool; 4] {
    let (d1s, d1e) = s.d1_range();
    let (d2s, d2e) = s.d2_range();
    let overlap = |a: (usize, usize), b: (usize, usize)| a.0 < b.1 && b.0 < a.1;

    let mut out = [false; 4];
    for t in blk.bc.surfaces() {
        if !t.kind.is_interblock() || t.surface != s.surface || t == s {
            continue;
        }
        let (t1s, t1e) = t.d1_range();
        let (t2s, t2e) = t.d2_range();
        if overlap((d2s, d2e), (t2s, t2e)) {
            if t1e == d1s {
                out[0] = true;
            }
            if t1s == d1e {
                out[1] = true;
            }
        }
        if overlap((d1s, d1e), (t1s, t1e)) {
            if t2e == d2s {
                out[2] = true;
            }
            if t2s == d2e {
                out[3] = true;
            }
        }
    }
    out
}

/// 由块列表建立全部交界面连接
pub fn pair_interblocks(blocks: &[Block]) -> AfxResult<Vec<BlockConnection>> {
    let mut conns = Vec::new();
    for (gi, blk) in blocks.iter().enumerate() {
        for s in blk.bc.surfaces() {
            if !s.kind.is_interblock() {
                continue;
            }
            let partner = s.tag as usize;
            // 每对只登记一次：低全局号侧为第一侧（同块自配对不支持，
            // 由几何校验报错）
            if partner < gi {
                continue;
            }
            let pblk = blocks.get(partner).ok_or_else(|| {
                AfxError::halo(format!("交界面贴片指向不存在的块 {}", partner))
            })?;
            let ps = pblk
                .bc
                .surfaces()
                .iter()
                .find(|t| t.kind.is_interblock() && t.tag as usize == gi)
                .ok_or_else(|| {
                    AfxError::halo(format!("块 {} 没有指回块 {} 的交界面贴片", partner, gi))
                })?;

            let orientation = find_orientation(blk, s, pblk, ps)?;
            let borders = [derive_borders(blk, s), derive_borders(pblk, ps)];
            let mut conn = connection_between(
                [gi, partner],
                [s.surface, ps.surface],
                [(s.d1_range().0, s.d1_range().1), (ps.d1_range().0, ps.d1_range().1)],
                [(s.d2_range().0, s.d2_range().1), (ps.d2_range().0, ps.d2_range().1)],
                [s.const_index(), ps.const_index()],
                orientation,
            );
            conn.validate()?;
            conn.rank = [blk.rank, pblk.rank];
            conn.local_block = [blk.local_pos, pblk.local_pos];
            conn.border = borders;
            log::debug!(
                "交界面: 块 {} 表面 {} ↔ 块 {} 表面 {}, 朝向 {}",
                gi,
                s.surface,
                partner,
                ps.surface,
                orientation
            );
            conns.push(conn);
        }
    }
    Ok(conns)
}
