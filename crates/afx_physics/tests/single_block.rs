// crates/afx_physics/tests/single_block.rs

//! 单块不变量
//!
//! - 幽灵几何一致性：中心经边界面反射
//! - 单单元均匀状态、恒定面通量 ⇒ 无黏残差为零
//! - 黏性壁幽灵：切向速度反号、压力保持

use afx_config::SolverInput;
use afx_physics::block::Block;
use afx_physics::boundary::{BcKind, BlockBoundary};
use afx_physics::eos::IdealGas;
use afx_physics::state::Primitive;
use glam::DVec3;

fn freestream(gamma: f64) -> Primitive {
    Primitive {
        rho: 1.0,
        vel: DVec3::ZERO,
        p: 1.0 / gamma,
        k: 0.0,
        omega: 0.0,
    }
}

#[test]
fn ghost_geometry_reflection_invariant() {
    // 每个非交界面贴片、贴片上每个索引：
    // center[ghost] − fc[bnd] == fc[bnd] − center[interior]
    let mut blk = Block::cartesian(
        4,
        3,
        5,
        2,
        DVec3::new(-1.0, 0.5, 2.0),
        DVec3::new(0.5, 1.0, 0.25),
        BlockBoundary::for_box(4, 3, 5, [BcKind::SlipWall; 6]),
    );
    blk.assign_ghost_cells_geom();
    let g = blk.num_ghosts();
    let [ni, nj, nk] = blk.dims();

    // i-低表面
    for k in g..nk + g {
        for j in g..nj + g {
            let fc = blk.f_center[0][(g, j, k)];
            let lhs = blk.center[(g - 1, j, k)] - fc;
            let rhs = fc - blk.center[(g, j, k)];
            assert!((lhs - rhs).length() < 1e-12);
        }
    }
    // j-高表面
    for k in g..nk + g {
        for i in g..ni + g {
            let fc = blk.f_center[1][(i, nj + g, k)];
            let lhs = blk.center[(i, nj + g, k)] - fc;
            let rhs = fc - blk.center[(i, nj + g - 1, k)];
            assert!((lhs - rhs).length() < 1e-12);
        }
    }
}

#[test]
fn single_cell_uniform_residual_is_zero() {
    let input = SolverInput::default();
    let eos = IdealGas::new(input.gamma);
    let fs = freestream(input.gamma);
    let mut blk = Block::cartesian(
        1,
        1,
        1,
        2,
        DVec3::ZERO,
        DVec3::ONE,
        BlockBoundary::for_box(1, 1, 1, [BcKind::SlipWall; 6]),
    );
    blk.init_state(&fs, &eos);
    blk.assign_ghost_cells_geom();
    blk.assign_ghost_cells_geom_edge();
    blk.assign_inviscid_ghost_cells(&eos, &fs);
    blk.assign_ghost_cells_edge(&eos, &fs, false);

    blk.reset_residuals();
    for dir in afx_core::Direction::ALL {
        blk.calc_inviscid_flux_dir(dir, &input, &eos);
    }
    let r = blk.residual[(0, 0, 0)];
    for n in 0..7 {
        assert!(r[n].abs() < 1e-13, "分量 {} = {}", n, r[n]);
    }
}

#[test]
fn viscous_wall_ghost_reverses_tangential_velocity() {
    // 3×3×3，一个 j-面为黏性壁；内部给切向速度，黏性覆盖后
    // 壁面幽灵切向速度反号、压力保持
    let input = SolverInput::default();
    let eos = IdealGas::new(input.gamma);
    let fs = freestream(input.gamma);
    let mut kinds = [BcKind::SlipWall; 6];
    kinds[2] = BcKind::ViscousWall; // j-低
    let mut blk = Block::cartesian(
        3,
        3,
        3,
        2,
        DVec3::ZERO,
        DVec3::ONE,
        BlockBoundary::for_box(3, 3, 3, kinds),
    );
    let moving = Primitive {
        vel: DVec3::new(0.3, 0.0, 0.1),
        ..fs
    };
    blk.init_state(&moving, &eos);
    blk.assign_ghost_cells_geom();
    blk.assign_ghost_cells_geom_edge();

    // 阶段 1（黏性壁按滑移壁代填）：切向保持
    blk.assign_inviscid_ghost_cells(&eos, &fs);
    let g = blk.num_ghosts();
    let ghost = blk.primitive(g + 1, g - 1, g + 1, &eos);
    assert!((ghost.vel.x - 0.3).abs() < 1e-13);

    // 黏性覆盖：无滑移，切向反号、压力保持
    blk.assign_viscous_ghost_cells(&eos, &fs);
    let interior = blk.primitive(g + 1, g, g + 1, &eos);
    let ghost = blk.primitive(g + 1, g - 1, g + 1, &eos);
    assert!((ghost.vel.x + interior.vel.x).abs() < 1e-13);
    assert!((ghost.vel.z + interior.vel.z).abs() < 1e-13);
    assert!((ghost.p - interior.p).abs() < 1e-12);
    assert!((ghost.rho - interior.rho).abs() < 1e-13);
}

#[test]
fn slip_wall_second_layer_reflected() {
    // slipWall 第二幽灵层来自第二内部单元的壁面反射：
    // 壁法向速度反号
    let input = SolverInput::default();
    let eos = IdealGas::new(input.gamma);
    let fs = freestream(input.gamma);
    let mut blk = Block::cartesian(
        3,
        3,
        3,
        2,
        DVec3::ZERO,
        DVec3::ONE,
        BlockBoundary::for_box(3, 3, 3, [BcKind::SlipWall; 6]),
    );
    let moving = Primitive {
        vel: DVec3::new(0.1, 0.4, 0.0),
        ..fs
    };
    blk.init_state(&moving, &eos);
    blk.assign_ghost_cells_geom();
    blk.assign_inviscid_ghost_cells(&eos, &fs);

    let g = blk.num_ghosts();
    // j-低壁：第二层幽灵 (g-2) 对应第二内部单元 (g+1)
    let int2 = blk.primitive(g + 1, g + 1, g + 1, &eos);
    let ghost2 = blk.primitive(g + 1, g - 2, g + 1, &eos);
    assert!((ghost2.vel.y + int2.vel.y).abs() < 1e-13);
    assert!((ghost2.vel.x - int2.vel.x).abs() < 1e-13);
}
