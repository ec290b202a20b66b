// crates/afx_comm/src/decompose.rs

//! 分解驱动
//!
//! 手动分解假定每个 worker 恰好持有一个块；块→worker 指派在分解
//! 输入中给定，再平衡属外部协作者。协调者散发几何、广播连接，
//! 迭代结束后按全局位置收集解。

use afx_foundation::{AfxError, AfxResult};
use afx_physics::block::Block;
use afx_physics::connection::BlockConnection;

use crate::codec;
use crate::layer::MessageLayer;

/// 几何散发使用的消息 tag
const TAG_GEOMETRY: u32 = 2;

/// 手动分解
///
/// 为每个块指派 rank 与全局位置，更新连接记录的 rank 与本地块号，
/// 返回每个 worker 的块数表。块数与 worker 数不等是致命配置错误。
pub fn manual_decomposition(
    blocks: &mut [Block],
    connections: &mut [BlockConnection],
    num_workers: usize,
) -> AfxResult<Vec<usize>> {
    if blocks.len() != num_workers {
        return Err(AfxError::config(format!(
            "手动分解要求 worker 数等于块数: {} 块, {} worker",
            blocks.len(),
            num_workers
        )));
    }

    let total_cells: usize = blocks.iter().map(|b| b.num_cells()).sum();
    let ideal_load = total_cells as f64 / num_workers as f64;
    let mut max_load = 0usize;

    for (n, blk) in blocks.iter_mut().enumerate() {
        blk.rank = n;
        blk.global_pos = n;
        blk.local_pos = 0;
        max_load = max_load.max(blk.num_cells());
    }

    log::info!("使用手动网格分解");
    log::info!(
        "最重 worker 与平均负载之比: {:.4}",
        max_load as f64 / ideal_load
    );

    for conn in connections.iter_mut() {
        for side in 0..2 {
            conn.rank[side] = blocks[conn.block[side]].rank;
            conn.local_block[side] = blocks[conn.block[side]].local_pos;
        }
    }

    Ok(vec![1; num_workers])
}

/// 广播连接列表（协调者侧带上几何交换得到的边缘旗标）
pub fn broadcast_connections(
    comm: &dyn MessageLayer,
    connections: &mut Vec<BlockConnection>,
    root: usize,
) -> AfxResult<()> {
    let payload = if comm.rank() == root {
        Some(codec::pack_connections(connections))
    } else {
        None
    };
    let buf = comm.broadcast(root, payload)?;
    if comm.rank() != root {
        *connections = codec::unpack_connections(&buf)?;
    }
    Ok(())
}

/// 把块散发到指派的 worker
///
/// 协调者打包发送非本地块；每个 worker 返回其本地块表（含协调者
/// 自留的块），本地位置按接收次序指派。
pub fn send_blocks(
    blocks: &[Block],
    comm: &dyn MessageLayer,
    root: usize,
    num_local: usize,
) -> AfxResult<Vec<Block>> {
    let mut local = Vec::with_capacity(num_local);

    if comm.rank() == root {
        for blk in blocks {
            if blk.rank == root {
                let mut mine = blk.clone();
                mine.local_pos = local.len();
                local.push(mine);
            } else {
                comm.send(blk.rank, TAG_GEOMETRY, codec::pack_block(blk))?;
            }
        }
    } else {
        for _ in 0..num_local {
            let buf = comm.recv(root, TAG_GEOMETRY)?;
            let mut blk = codec::unpack_block(&buf)?;
            blk.rank = comm.rank();
            blk.local_pos = local.len();
            local.push(blk);
        }
    }
    Ok(local)
}

/// 把解收集回协调者
///
/// worker 以块的全局位置作消息 tag 打包 state/residual/dt/
/// avgWaveSpeed；协调者按全局位置次序接收写回。
pub fn get_blocks(
    blocks: &mut [Block],
    local: &[Block],
    comm: &dyn MessageLayer,
    root: usize,
) -> AfxResult<()> {
    if comm.rank() == root {
        let mut loc_n = 0;
        for blk in blocks.iter_mut() {
            if blk.rank == root {
                let src = &local[loc_n];
                blk.state = src.state.clone();
                blk.residual = src.residual.clone();
                blk.dt = src.dt.clone();
                blk.avg_wave_speed = src.avg_wave_speed.clone();
                loc_n += 1;
            } else {
                let buf = comm.recv(blk.rank, blk.global_pos as u32)?;
                codec::unpack_solution_into(blk, &buf)?;
            }
        }
    } else {
        for blk in local {
            comm.send(root, blk.global_pos as u32, codec::pack_solution(blk))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use afx_physics::boundary::{BcKind, BlockBoundary};
    use glam::DVec3;

    fn blocks3() -> Vec<Block> {
        (0..3)
            .map(|n| {
                Block::cartesian(
                    2,
                    2,
                    2,
                    2,
                    DVec3::new(2.0 * n as f64, 0.0, 0.0),
                    DVec3::ONE,
                    BlockBoundary::for_box(2, 2, 2, [BcKind::SlipWall; 6]),
                )
            })
            .collect()
    }

    #[test]
    fn test_manual_rejects_wrong_worker_count() {
        let mut blocks = blocks3();
        let err = manual_decomposition(&mut blocks, &mut [], 2).unwrap_err();
        assert!(matches!(err, AfxError::ConfigMismatch(_)));
    }

    #[test]
    fn test_manual_assigns_one_block_per_worker() {
        let mut blocks = blocks3();
        let load = manual_decomposition(&mut blocks, &mut [], 3).unwrap();
        assert_eq!(load, vec![1, 1, 1]);
        for (n, blk) in blocks.iter().enumerate() {
            assert_eq!(blk.rank, n);
            assert_eq!(blk.global_pos, n);
        }
    }
}
