// crates/afx_comm/src/exchange.rs

//! 逐迭代交换编排
//!
//! 幽灵填充三阶段：物理边界 → 交界面交换 → 棱处理。阶段 2 必须
//! 在任何 worker 进入阶段 3 之前全局完成（棱幽灵可能依赖阶段 2
//! 填入的邻块数据），以栅栏保证。
//!
//! 每条连接：两端都在本 worker 时进程内交换；恰有一端在本 worker
//! 时裁切本侧切片，与对端 worker 做同步 sendrecv 后写入收到的
//! 切片；两端都不在本 worker 时跳过。消息 tag 取连接在列表中的
//! 序号，两侧一致。

use afx_config::SolverInput;
use afx_core::Array3;
use afx_foundation::AfxResult;
use afx_physics::block::{
    swap_state_slices, swap_update_slices, Block,
};
use afx_physics::connection::BlockConnection;
use afx_physics::eos::IdealGas;
use afx_physics::state::{EqArray, Primitive};

use crate::codec;
use crate::layer::MessageLayer;

/// 连接消息 tag 的基移（与几何、解收集 tag 区分）
const TAG_SWAP_BASE: u32 = 1000;
/// ΔU 交换 tag 的基移
const TAG_UPDATE_BASE: u32 = 2000;

/// 幽灵状态填充（阶段 1–3 + 黏性覆盖）
pub fn get_boundary_conditions(
    blocks: &mut [Block],
    connections: &[BlockConnection],
    comm: &dyn MessageLayer,
    input: &SolverInput,
    eos: &IdealGas,
    freestream: &Primitive,
) -> AfxResult<()> {
    // 阶段 1：物理边界（viscousWall 以 slipWall 代填）
    for blk in blocks.iter_mut() {
        blk.assign_inviscid_ghost_cells(eos, freestream);
    }

    // 阶段 2：交界面交换
    swap_states(blocks, connections, comm)?;
    comm.barrier()?;

    // 阶段 3：棱处理
    for blk in blocks.iter_mut() {
        blk.assign_ghost_cells_edge(eos, freestream, false);
    }

    // 黏性覆盖与黏性棱阶段
    if input.equation_set.is_viscous() {
        for blk in blocks.iter_mut() {
            blk.assign_viscous_ghost_cells(eos, freestream);
        }
        for blk in blocks.iter_mut() {
            blk.assign_ghost_cells_edge(eos, freestream, true);
        }
    }
    Ok(())
}

/// 状态切片交换（阶段 2 本体）
fn swap_states(
    blocks: &mut [Block],
    connections: &[BlockConnection],
    comm: &dyn MessageLayer,
) -> AfxResult<()> {
    let rank = comm.rank();
    for (n, conn) in connections.iter().enumerate() {
        let tag = TAG_SWAP_BASE + n as u32;
        if conn.rank[0] == rank && conn.rank[1] == rank {
            let (a, b) = (conn.local_block[0], conn.local_block[1]);
            if a == b {
                // 同块自连接：顺序裁切后写回
                let blk = &mut blocks[a];
                let s0 = blk.carve_state_slice(conn, 0);
                let s1 = blk.carve_state_slice(conn, 1);
                blk.put_state_slice(&s1, conn, 0)?;
                blk.put_state_slice(&s0, conn, 1)?;
            } else {
                let (lo, hi) = (a.min(b), a.max(b));
                let (head, tail) = blocks.split_at_mut(hi);
                let (blk_a, blk_b) = if a < b {
                    (&mut head[lo], &mut tail[0])
                } else {
                    (&mut tail[0], &mut head[lo])
                };
                swap_state_slices(conn, blk_a, blk_b)?;
            }
        } else if conn.rank[0] == rank || conn.rank[1] == rank {
            let side = if conn.rank[0] == rank { 0 } else { 1 };
            let peer = conn.rank[BlockConnection::other(side)];
            let blk = &mut blocks[conn.local_block[side]];
            let mine = blk.carve_state_slice(conn, side);
            let recv = comm.send_recv(peer, tag, codec::pack_state_slice(&mine))?;
            let theirs = codec::unpack_state_slice(&recv)?;
            blk.put_state_slice(&theirs, conn, side)?;
        }
        // 两端都不在本 worker：跳过
    }
    Ok(())
}

/// 隐式扫掠之间的 ΔU halo 交换
///
/// ΔU 数组与块同形（带幽灵）；交换逻辑与状态切片一致，走同一
/// 朝向重映射与边缘旗标。
pub fn swap_implicit_updates(
    dus: &mut [Array3<EqArray>],
    blocks: &[Block],
    connections: &[BlockConnection],
    comm: &dyn MessageLayer,
) -> AfxResult<()> {
    let rank = comm.rank();
    for (n, conn) in connections.iter().enumerate() {
        let tag = TAG_UPDATE_BASE + n as u32;
        if conn.rank[0] == rank && conn.rank[1] == rank {
            let (a, b) = (conn.local_block[0], conn.local_block[1]);
            let gh = blocks[a].num_ghosts();
            if a == b {
                let dims = blocks[a].dims();
                let (ri, rj, rk) = conn.slice_ranges(0, dims, gh);
                let s0 = dus[a].slice(ri, rj, rk);
                let (ri, rj, rk) = conn.slice_ranges(1, dims, gh);
                let s1 = dus[a].slice(ri, rj, rk);
                afx_physics::block::put_cell_slice(&mut dus[a], dims, gh, &s1, conn, 0, true)?;
                afx_physics::block::put_cell_slice(&mut dus[a], dims, gh, &s0, conn, 1, true)?;
            } else {
                let (lo, hi) = (a.min(b), a.max(b));
                let (head, tail) = dus.split_at_mut(hi);
                let (du_a, du_b) = if a < b {
                    (&mut head[lo], &mut tail[0])
                } else {
                    (&mut tail[0], &mut head[lo])
                };
                let (dims_a, dims_b) = (blocks[a].dims(), blocks[b].dims());
                swap_update_slices(conn, du_a, dims_a, du_b, dims_b, gh)?;
            }
        } else if conn.rank[0] == rank || conn.rank[1] == rank {
            let side = if conn.rank[0] == rank { 0 } else { 1 };
            let peer = conn.rank[BlockConnection::other(side)];
            let lb = conn.local_block[side];
            let gh = blocks[lb].num_ghosts();
            let dims = blocks[lb].dims();
            let (ri, rj, rk) = conn.slice_ranges(side, dims, gh);
            let mine = dus[lb].slice(ri, rj, rk);
            let recv = comm.send_recv(peer, tag, codec::pack_update_slice(&mine))?;
            let theirs = codec::unpack_update_slice(&recv)?;
            afx_physics::block::put_cell_slice(&mut dus[lb], dims, gh, &theirs, conn, side, true)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::SoloComm;
    use afx_physics::boundary::{BcKind, BlockBoundary};
    use afx_physics::pairing::pair_interblocks;
    use glam::DVec3;

    #[test]
    fn test_local_swap_via_exchange() {
        // 两块都在 rank 0：交换后幽灵等于对端内部
        let input = SolverInput::default();
        let eos = IdealGas::new(input.gamma);
        let fs = Primitive {
            rho: 1.0,
            vel: DVec3::ZERO,
            p: 1.0 / input.gamma,
            k: 0.0,
            omega: 0.0,
        };
        let n = 4;
        let mut big = Block::cartesian(
            2 * n,
            n,
            n,
            2,
            DVec3::ZERO,
            DVec3::ONE,
            BlockBoundary::for_box(2 * n, n, n, [BcKind::SlipWall; 6]),
        );
        big.init_state(&fs, &eos);
        let mut altered = Vec::new();
        let mut upper = big.split(afx_core::Direction::I, n, 1, &mut altered);
        upper.global_pos = 1;
        upper.local_pos = 1;
        let mut blocks = vec![big, upper];
        // 染色两块内部
        for (bn, blk) in blocks.iter_mut().enumerate() {
            for k in 0..blk.state.nk() {
                for j in 0..blk.state.nj() {
                    for i in 0..blk.state.ni() {
                        blk.state[(i, j, k)][5] = (1000 * bn + i + 10 * j + 100 * k) as f64;
                    }
                }
            }
        }
        let conns = pair_interblocks(&blocks).unwrap();
        let comm = SoloComm::new();
        swap_states(&mut blocks, &conns, &comm).unwrap();

        let gh = 2;
        // 块 0 的 i-高幽灵 == 块 1 内部首两层
        for l in 0..2 {
            assert_eq!(
                blocks[0].state[(n + gh + l, gh, gh)][5],
                blocks[1].state[(gh + l, gh, gh)][5]
            );
        }
    }
}
