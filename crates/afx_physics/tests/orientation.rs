// crates/afx_physics/tests/orientation.rs

//! 交界面朝向完备性
//!
//! 对 1..8 每个朝向构造一对几何连续的块：块 0 为标准直角立方体，
//! 块 1 的单元中心、面中心与面积向量按该朝向的仿射映射生成，使
//! 两块拼起来恰好是连续网格。
//!
//! 交换几何与状态后检验：
//! - 幽灵体积为正，面积单位向量模长为 1
//! - 幽灵单元中心等于对端内部单元的真实物理位置（网格连续）
//! - 状态按位置染色后，幽灵状态与自身幽灵中心的染色值一致，
//!   证明状态重映射与几何重映射一致

use afx_core::UnitVec3Mag;
use afx_physics::block::{swap_geom_slices, swap_state_slices, Block};
use afx_physics::boundary::{BcKind, BlockBoundary};
use afx_physics::connection::{connection_between, BlockConnection};
use afx_physics::state::EqArray;
use glam::DVec3;

const N: usize = 4;
const GH: usize = 2;

/// 位置染色函数
fn color(p: DVec3) -> f64 {
    1.0 + p.x + 100.0 * p.y + 10000.0 * p.z
}

/// 朝向的第二侧 → 第一侧仿射映射（f64，面/单元通用）
fn to_first_f(o: u8, b1: f64, b2: f64, n: f64) -> (f64, f64) {
    match o {
        1 => (b1, b2),
        2 => (b2, b1),
        3 => (n - b1, b2),
        4 => (b1, n - b2),
        5 => (b2, n - b1),
        6 => (n - b2, b1),
        7 => (n - b1, n - b2),
        _ => (n - b2, n - b1),
    }
}

/// 块 0：占据 [0,N]³ 的标准立方体，i-高面为交界面
fn block_zero() -> Block {
    let mut kinds = [BcKind::SlipWall; 6];
    kinds[1] = BcKind::Interblock;
    let mut blk = Block::cartesian(
        N,
        N,
        N,
        GH,
        DVec3::ZERO,
        DVec3::ONE,
        BlockBoundary::for_box(N, N, N, kinds),
    );
    blk.global_pos = 0;
    blk
}

/// 块 1：占据 [N,2N]×[0,N]² ，i-低面为交界面，切向坐标按朝向映射
///
/// 自身单元 (i', j', k') 的物理位置为
/// `(N + i' + ½, a1(j',k') + ½, a2(j',k') + ½)`，其中
/// `(a1, a2) = to_first(j', k')`（单元用 n = N−1 的镜像）。
fn block_one(o: u8) -> Block {
    let mut kinds = [BcKind::SlipWall; 6];
    kinds[0] = BcKind::Interblock;
    let mut blk = Block::new(N, N, N, GH, BlockBoundary::for_box(N, N, N, kinds));
    blk.global_pos = 1;
    let g = GH as f64;

    // 单元量
    for k in GH..N + GH {
        for j in GH..N + GH {
            for i in GH..N + GH {
                let (a1, a2) =
                    to_first_f(o, j as f64 - g, k as f64 - g, (N - 1) as f64);
                blk.vol[(i, j, k)] = 1.0;
                blk.center[(i, j, k)] =
                    DVec3::new(N as f64 + (i as f64 - g) + 0.5, a1 + 0.5, a2 + 0.5);
            }
        }
    }

    // 面量：各方向在物理范围生成
    // i'-面：x = N + i'，切向取单元映射
    for k in GH..N + GH {
        for j in GH..N + GH {
            for i in GH..N + GH + 1 {
                let (a1, a2) =
                    to_first_f(o, j as f64 - g, k as f64 - g, (N - 1) as f64);
                blk.f_area[0][(i, j, k)] = UnitVec3Mag {
                    unit: DVec3::X,
                    mag: 1.0,
                };
                blk.f_center[0][(i, j, k)] =
                    DVec3::new(N as f64 + (i as f64 - g), a1 + 0.5, a2 + 0.5);
            }
        }
    }
    // j'-面：面网格上 j' 映射（n = N 的镜像），方向为 ±(d(a)/d(j'))
    for k in GH..N + GH {
        for j in GH..N + GH + 1 {
            for i in GH..N + GH {
                // j' 取面坐标，k' 取单元坐标（+0.5 先加、经 N 镜像）
                let (f1, f2) =
                    to_first_f(o, j as f64 - g, k as f64 - g + 0.5, N as f64);
                let (da1, da2) = axis_delta_j(o);
                let unit = DVec3::new(0.0, da1, da2);
                blk.f_area[1][(i, j, k)] = UnitVec3Mag { unit, mag: 1.0 };
                blk.f_center[1][(i, j, k)] = DVec3::new(
                    N as f64 + (i as f64 - g) + 0.5,
                    f1,
                    f2,
                );
            }
        }
    }
    // k'-面
    for k in GH..N + GH + 1 {
        for j in GH..N + GH {
            for i in GH..N + GH {
                let (f1, f2) =
                    to_first_f(o, j as f64 - g + 0.5, k as f64 - g, N as f64);
                let (da1, da2) = axis_delta_k(o);
                let unit = DVec3::new(0.0, da1, da2);
                blk.f_area[2][(i, j, k)] = UnitVec3Mag { unit, mag: 1.0 };
                blk.f_center[2][(i, j, k)] = DVec3::new(
                    N as f64 + (i as f64 - g) + 0.5,
                    f1,
                    f2,
                );
            }
        }
    }
    blk
}

/// j' 轴在块 0 坐标系 (y, z) 中的推进方向
fn axis_delta_j(o: u8) -> (f64, f64) {
    // to_first 中 b1 (= j') 贡献到 a1 或 a2，符号由反转决定
    match o {
        1 => (1.0, 0.0),
        2 => (0.0, 1.0),
        3 => (-1.0, 0.0),
        4 => (1.0, 0.0),
        5 => (0.0, -1.0),
        6 => (0.0, 1.0),
        7 => (-1.0, 0.0),
        _ => (0.0, -1.0),
    }
}

/// k' 轴在块 0 坐标系 (y, z) 中的推进方向
fn axis_delta_k(o: u8) -> (f64, f64) {
    match o {
        1 => (0.0, 1.0),
        2 => (1.0, 0.0),
        3 => (0.0, 1.0),
        4 => (0.0, -1.0),
        5 => (1.0, 0.0),
        6 => (-1.0, 0.0),
        7 => (0.0, -1.0),
        _ => (-1.0, 0.0),
    }
}

fn make_pair(o: u8) -> (Block, Block, BlockConnection) {
    let b0 = block_zero();
    let b1 = block_one(o);
    let conn = connection_between(
        [0, 1],
        [2, 1],
        [(0, N), (0, N)],
        [(0, N), (0, N)],
        [N, 0],
        o,
    );
    (b0, b1, conn)
}

/// 按自身中心位置给两块的全部（含幽灵）状态染色
fn color_states(blk: &mut Block) {
    for k in 0..blk.state.nk() {
        for j in 0..blk.state.nj() {
            for i in 0..blk.state.ni() {
                let mut s = EqArray::ZERO;
                s[0] = color(blk.center[(i, j, k)]);
                blk.state[(i, j, k)] = s;
            }
        }
    }
}

#[test]
fn orientation_completeness_geometry_roundtrip() {
    for o in 1..=8u8 {
        let (mut b0, mut b1, mut conn) = make_pair(o);
        conn.validate().unwrap();
        b0.assign_ghost_cells_geom();
        b1.assign_ghost_cells_geom();
        swap_geom_slices(&mut conn, &mut b0, &mut b1).unwrap();

        // 无 T 形交汇
        assert_eq!(conn.border, [[false; 4]; 2], "朝向 {}", o);

        // 块 0 的 i-高幽灵：体积为正、面积方向单位长、中心连续
        for l in 0..GH {
            for k in GH..N + GH {
                for j in GH..N + GH {
                    let d = (N + GH + l, j, k);
                    assert!(b0.vol[d] > 0.0, "朝向 {} 幽灵体积", o);
                    let expect = DVec3::new(
                        N as f64 + l as f64 + 0.5,
                        (j - GH) as f64 + 0.5,
                        (k - GH) as f64 + 0.5,
                    );
                    assert!(
                        (b0.center[d] - expect).length() < 1e-12,
                        "朝向 {} 幽灵中心 {:?} != {:?}",
                        o,
                        b0.center[d],
                        expect
                    );
                    for f in 0..3 {
                        let ua = b0.f_area[f][d];
                        assert!(
                            (ua.unit.length() - 1.0).abs() < 1e-12,
                            "朝向 {} 面积单位向量",
                            o
                        );
                    }
                }
            }
        }

        // 块 1 的 i-低幽灵中心连续（等于块 0 对应内部位置）
        for l in 0..GH {
            for k in GH..N + GH {
                for j in GH..N + GH {
                    let d = (GH - 1 - l, j, k);
                    assert!(b1.vol[d] > 0.0);
                    let expect_x = N as f64 - l as f64 - 0.5;
                    assert!(
                        (b1.center[d].x - expect_x).abs() < 1e-12,
                        "朝向 {} 对侧幽灵 x",
                        o
                    );
                }
            }
        }
    }
}

#[test]
fn orientation_completeness_state_swap() {
    for o in 1..=8u8 {
        let (mut b0, mut b1, mut conn) = make_pair(o);
        b0.assign_ghost_cells_geom();
        b1.assign_ghost_cells_geom();
        swap_geom_slices(&mut conn, &mut b0, &mut b1).unwrap();

        color_states(&mut b0);
        color_states(&mut b1);
        // 污染双方的交界面幽灵区：正确值只能来自交换
        for l in 0..GH {
            for k in 0..b0.state.nk() {
                for j in 0..b0.state.nj() {
                    b0.state[(N + GH + l, j, k)] = EqArray([-1.0; 7]);
                    b1.state[(GH - 1 - l, j, k)] = EqArray([-1.0; 7]);
                }
            }
        }
        swap_state_slices(&conn, &mut b0, &mut b1).unwrap();

        // 幽灵状态的染色值与幽灵中心一致 ⇒ 状态重映射与几何一致
        for l in 0..GH {
            for k in GH..N + GH {
                for j in GH..N + GH {
                    let d = (N + GH + l, j, k);
                    let expect = color(b0.center[d]);
                    assert!(
                        (b0.state[d][0] - expect).abs() < 1e-9,
                        "朝向 {} 块0 幽灵状态 {} != {}",
                        o,
                        b0.state[d][0],
                        expect
                    );

                    let d1 = (GH - 1 - l, j, k);
                    let expect1 = color(b1.center[d1]);
                    assert!(
                        (b1.state[d1][0] - expect1).abs() < 1e-9,
                        "朝向 {} 块1 幽灵状态",
                        o
                    );
                }
            }
        }
    }
}
