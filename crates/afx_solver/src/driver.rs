// crates/afx_solver/src/driver.rs

//! 迭代驱动
//!
//! 数据流（每次迭代）：幽灵填充 → 无黏+黏性通量与谱半径 → 源项 →
//! 局部时间步 → 显式更新或隐式扫掠 → 残差范数跨 worker 归约。
//!
//! 双时间步：每个物理时间步先把时间层 n 滚动到 n-1、当前解记入
//! 时间层 n，再做 `nonlinear_iterations` 次伪时间子迭代。

use std::sync::Arc;

use afx_comm::{
    broadcast_connections, get_blocks, get_boundary_conditions, manual_decomposition,
    reduce_residuals, send_blocks, swap_implicit_updates, MessageLayer,
};
use afx_comm::codec::{ByteReader, ByteWriter};
use afx_config::{SolverInput, TimeIntegration};
use afx_foundation::AfxResult;
use afx_physics::block::{swap_geom_slices, Block, RK4_ALPHA};
use afx_physics::connection::BlockConnection;
use afx_physics::eos::{IdealGas, Sutherland};
use afx_physics::hyperplane::hyperplane_order;
use afx_physics::pairing::pair_interblocks;
use afx_physics::residual::{ResidLinf, ResidualL2};
use afx_physics::state::Primitive;
use afx_physics::turbulence::{create_turbulence, NoTurbulence, TurbulenceModel};
use glam::DVec3;

/// 一次求解的结果
#[derive(Debug)]
pub struct SolveOutcome {
    /// 最后一次迭代的 L2 残差（全局归约后）
    pub l2: ResidualL2,
    /// 最后一次迭代的 L∞ 残差与定位（全局归约后）
    pub linf: ResidLinf,
    /// 协调者得到收集后的全部块，其余 worker 为 None
    pub blocks: Option<Vec<Block>>,
}

/// 来流原始状态
pub fn freestream_state(input: &SolverInput, turb: &dyn TurbulenceModel) -> Primitive {
    let dir = DVec3::from(input.flow_direction);
    let dir = if dir.length() > 0.0 {
        dir.normalize()
    } else {
        DVec3::X
    };
    let (k, omega) = turb.freestream();
    Primitive {
        rho: 1.0,
        vel: dir * input.mach,
        p: 1.0 / input.gamma,
        k,
        omega,
    }
}

/// SPMD 求解入口
///
/// 协调者（`root`）提供带物理几何与初始状态的块列表；其余 worker
/// 传空列表。返回时协调者的 `blocks` 携带收集后的解。
pub fn run_simulation(
    input: &SolverInput,
    mut blocks: Vec<Block>,
    comm: &dyn MessageLayer,
    root: usize,
) -> AfxResult<SolveOutcome> {
    input.validate()?;
    let eos = IdealGas::new(input.gamma);
    let suth = Sutherland::new(input.mach, input.reynolds);
    let turb: Arc<dyn TurbulenceModel> = if input.equation_set.is_turbulent() {
        create_turbulence(&input.turbulence_model)?
    } else {
        Arc::new(NoTurbulence)
    };
    let freestream = freestream_state(input, turb.as_ref());

    let is_root = comm.rank() == root;
    let mut connections: Vec<BlockConnection> = Vec::new();
    let mut load_bal = Vec::new();

    if is_root {
        // 幽灵几何：物理边界合成 → 交界面交换 → 棱
        for blk in blocks.iter_mut() {
            blk.assign_ghost_cells_geom();
        }
        connections = pair_interblocks(&blocks)?;
        root_geom_swaps(&mut blocks, &mut connections)?;
        for blk in blocks.iter_mut() {
            blk.assign_ghost_cells_geom_edge();
        }

        load_bal = manual_decomposition(&mut blocks, &mut connections, comm.size())?;
    }

    // 黏性壁面中心广播（壁面距离赋值用）
    let wall_centers = if input.equation_set.is_viscous() {
        broadcast_wall_centers(&blocks, comm, root, is_root)?
    } else {
        Vec::new()
    };

    broadcast_connections(comm, &mut connections, root)?;
    let num_local = comm.scatter_usize(root, if is_root { Some(&load_bal) } else { None })?;
    let mut local = send_blocks(&blocks, comm, root, num_local)?;

    if input.equation_set.is_viscous() {
        for blk in local.iter_mut() {
            blk.assign_wall_distance(&wall_centers);
        }
    }

    let orders: Vec<Vec<(usize, usize, usize)>> = local
        .iter()
        .map(|b| {
            let [ni, nj, nk] = b.dims();
            hyperplane_order(ni, nj, nk)
        })
        .collect();

    let nonlinear = if input.is_dual_time() {
        input.nonlinear_iterations
    } else {
        1
    };

    let mut last_l2 = ResidualL2::ZERO;
    let mut last_linf = ResidLinf::ZERO;

    for iter in 0..input.iterations {
        // 时间层滚动：n → n-1，当前解 → n
        for blk in local.iter_mut() {
            blk.assign_sol_to_time_nm1();
            blk.assign_sol_to_time_n();
        }

        for mm in 0..nonlinear {
            get_boundary_conditions(&mut local, &connections, comm, input, &eos, &freestream)?;

            let mut l2 = ResidualL2::ZERO;
            let mut linf = ResidLinf::ZERO;

            match input.time_integration {
                TimeIntegration::ExplicitEuler => {
                    for blk in local.iter_mut() {
                        blk.calc_residual(input, &eos, &suth, turb.as_ref());
                        blk.calc_block_time_step(input, input.sound_speed_ref);
                        blk.update_block(input, None, 0, &mut l2, &mut linf);
                    }
                }
                TimeIntegration::Rk4 => {
                    for stage in 0..RK4_ALPHA.len() {
                        if stage > 0 {
                            get_boundary_conditions(
                                &mut local,
                                &connections,
                                comm,
                                input,
                                &eos,
                                &freestream,
                            )?;
                        }
                        for blk in local.iter_mut() {
                            blk.calc_residual(input, &eos, &suth, turb.as_ref());
                            if stage < RK4_ALPHA.len() - 1 {
                                blk.calc_block_time_step(input, input.sound_speed_ref);
                            }
                            if stage == 0 {
                                blk.save_rk_snapshot();
                            }
                            blk.update_block(input, None, stage, &mut l2, &mut linf);
                        }
                    }
                }
                TimeIntegration::ImplicitEuler | TimeIntegration::Bdf2 => {
                    for blk in local.iter_mut() {
                        blk.calc_residual(input, &eos, &suth, turb.as_ref());
                        blk.calc_block_time_step(input, input.sound_speed_ref);
                    }
                    let diagonals: Vec<_> = local
                        .iter()
                        .map(|b| b.assemble_diagonal(input))
                        .collect();
                    let mut dus: Vec<_> =
                        local.iter().map(|b| b.initialize_matrix_update()).collect();

                    let mut matrix_error = 0.0;
                    for _sweep in 0..input.matrix_sweeps {
                        swap_implicit_updates(&mut dus, &local, &connections, comm)?;
                        if input.matrix_solver.is_sgs() {
                            for (b, blk) in local.iter().enumerate() {
                                blk.lusgs_forward(
                                    &orders[b],
                                    &mut dus[b],
                                    &diagonals[b],
                                    input,
                                    &eos,
                                    &suth,
                                    turb.as_ref(),
                                );
                            }
                            swap_implicit_updates(&mut dus, &local, &connections, comm)?;
                            for (b, blk) in local.iter().enumerate() {
                                matrix_error += blk.lusgs_backward(
                                    &orders[b],
                                    &mut dus[b],
                                    &diagonals[b],
                                    input,
                                    &eos,
                                    &suth,
                                    turb.as_ref(),
                                );
                            }
                        } else {
                            for (b, blk) in local.iter().enumerate() {
                                matrix_error += blk.dplur(
                                    &mut dus[b],
                                    &diagonals[b],
                                    input,
                                    &eos,
                                    &suth,
                                    turb.as_ref(),
                                );
                            }
                        }
                    }
                    log::trace!("隐式矩阵误差 {:.3e}", matrix_error);

                    for (b, blk) in local.iter_mut().enumerate() {
                        blk.update_block(input, Some(&dus[b]), 0, &mut l2, &mut linf);
                    }
                }
            }

            reduce_residuals(comm, root, &mut l2, &mut linf)?;
            if is_root {
                log::info!(
                    "迭代 {:>5} 子迭代 {:>2}  L2 {:.6e}  L∞ {:.6e} @ (块 {}, {}, {}, {}, 方程 {})",
                    iter,
                    mm,
                    l2.norm(),
                    linf.linf,
                    linf.block,
                    linf.i,
                    linf.j,
                    linf.k,
                    linf.eq
                );
            }
            last_l2 = l2;
            last_linf = linf;
        }
    }

    get_blocks(&mut blocks, &local, comm, root)?;

    Ok(SolveOutcome {
        l2: last_l2,
        linf: last_linf,
        blocks: if is_root { Some(blocks) } else { None },
    })
}

/// 协调者侧的几何交界面交换
///
/// 任意顺序两两交换；T 形交汇由零体积哨兵检测，边缘调整位 OR 回
/// 连接记录。
fn root_geom_swaps(
    blocks: &mut [Block],
    connections: &mut [BlockConnection],
) -> AfxResult<()> {
    for conn in connections.iter_mut() {
        let (a, b) = (conn.block[0], conn.block[1]);
        if a == b {
            // 同块自连接
            let blk = &mut blocks[a];
            let s0 = blk.carve_geom_slice(conn, 0);
            let s1 = blk.carve_geom_slice(conn, 1);
            let adj0 = blk.put_geom_slice(&s1, conn, 0)?;
            let adj1 = blk.put_geom_slice(&s0, conn, 1)?;
            for e in 0..4 {
                if adj0[e] {
                    conn.update_border(0, e);
                }
                if adj1[e] {
                    conn.update_border(1, e);
                }
            }
        } else {
            let (lo, hi) = (a.min(b), a.max(b));
            let (head, tail) = blocks.split_at_mut(hi);
            let (blk_a, blk_b) = if a < b {
                (&mut head[lo], &mut tail[0])
            } else {
                (&mut tail[0], &mut head[lo])
            };
            swap_geom_slices(conn, blk_a, blk_b)?;
        }
    }
    Ok(())
}

/// 收集并广播全体 viscousWall 面中心
fn broadcast_wall_centers(
    blocks: &[Block],
    comm: &dyn MessageLayer,
    root: usize,
    is_root: bool,
) -> AfxResult<Vec<DVec3>> {
    let payload = if is_root {
        let centers: Vec<DVec3> = blocks
            .iter()
            .flat_map(|b| b.viscous_face_centers())
            .collect();
        let mut w = ByteWriter::new();
        w.put_i32(centers.len() as i32);
        for c in &centers {
            w.put_vec3(*c);
        }
        Some(w.finish())
    } else {
        None
    };
    let buf = comm.broadcast(root, payload)?;
    let mut r = ByteReader::new(&buf);
    let n = r.get_i32()? as usize;
    let mut centers = Vec::with_capacity(n);
    for _ in 0..n {
        centers.push(r.get_vec3()?);
    }
    r.expect_end()?;
    Ok(centers)
}
