// crates/afx_physics/src/block/ghost_state.rs

//! 幽灵状态填充（物理边界部分）
//!
//! 三阶段协议的第 1、3 阶段在本模块：
//!
//! 1. 无黏阶段：每个非交界面贴片按标签调用逐单元幽灵生成器；
//!    `viscousWall` 暂按 `slipWall` 处理。第一层幽灵由第一内部单元
//!    生成；第二层用第二内部单元，`slipWall` 例外地把第二内部单元
//!    经壁面反射。
//! 3. 棱阶段：12 条棱逐一检查两侧贴片标签——同为壁面或同为非壁面
//!    时取平均；恰有一侧是壁面时沿该壁法向调用壁面生成器，以对侧
//!    棱方向的面幽灵作为内部源。
//!
//! `viscousWall` 真正生效的覆盖阶段与黏性棱阶段也在此：无滑移幽灵
//! 速度整体反号，压力保持。
//!
//! 交界面贴片（第 2 阶段）见 swap 模块。

use glam::DVec3;

use super::Block;
use crate::boundary::BcKind;
use crate::eos::IdealGas;
use crate::state::Primitive;

/// 逐单元幽灵生成器
///
/// `layer` 为 1 或 2；`int1` / `int2` 为第一、二内部单元；
/// `outward` 为边界外法向单位向量。
pub fn ghost_state(
    kind: BcKind,
    layer: usize,
    int1: &Primitive,
    int2: &Primitive,
    outward: DVec3,
    freestream: &Primitive,
) -> Primitive {
    let src = if layer == 1 { int1 } else { int2 };
    match kind {
        BcKind::SlipWall => {
            // 两层都经壁面反射：法向速度反号
            let vn = src.vel.dot(outward);
            Primitive {
                vel: src.vel - 2.0 * vn * outward,
                ..*src
            }
        }
        BcKind::ViscousWall => {
            // 无滑移：速度整体反号，压力与密度保持
            Primitive {
                vel: -src.vel,
                ..*src
            }
        }
        BcKind::SubsonicInflow => Primitive {
            rho: freestream.rho,
            vel: freestream.vel,
            p: src.p,
            k: freestream.k,
            omega: freestream.omega,
        },
        BcKind::SubsonicOutflow => Primitive {
            p: freestream.p,
            ..*src
        },
        BcKind::SupersonicInflow => *freestream,
        BcKind::SupersonicOutflow => *src,
        BcKind::Interblock => *src,
    }
}

impl Block {
    /// 阶段 1：全部非交界面贴片的无黏幽灵填充
    ///
    /// `viscousWall` 以 `slipWall` 代填，待黏性覆盖阶段修正。
    pub fn assign_inviscid_ghost_cells(&mut self, eos: &IdealGas, freestream: &Primitive) {
        self.apply_surface_ghosts(eos, freestream, false);
    }

    /// 黏性覆盖阶段：对 `viscousWall` 贴片以无滑移生成器重填
    pub fn assign_viscous_ghost_cells(&mut self, eos: &IdealGas, freestream: &Primitive) {
        self.apply_surface_ghosts(eos, freestream, true);
    }

    fn apply_surface_ghosts(&mut self, eos: &IdealGas, freestream: &Primitive, viscous: bool) {
        let gh = self.num_ghosts();
        let surfs: Vec<_> = self
            .bc
            .surfaces()
            .iter()
            .filter(|s| {
                if viscous {
                    s.kind == BcKind::ViscousWall
                } else {
                    !s.kind.is_interblock()
                }
            })
            .cloned()
            .collect();

        for s in surfs {
            // 无黏阶段把黏性壁当滑移壁
            let kind = if !viscous && s.kind == BcKind::ViscousWall {
                BcKind::SlipWall
            } else {
                s.kind
            };
            let dir = s.direction();
            let d = dir.axis();
            let (t1, t2) = dir.tangential();
            let n = self.len_dir(dir);
            let (i1, i2, g1, g2, fb) = if s.is_lower() {
                (gh, if n >= 2 { gh + 1 } else { gh }, gh - 1, gh - 2, gh)
            } else {
                (
                    n + gh - 1,
                    if n >= 2 { n + gh - 2 } else { n + gh - 1 },
                    n + gh,
                    n + gh + 1,
                    n + gh,
                )
            };
            let sign = if s.is_lower() { -1.0 } else { 1.0 };
            let (d1s, d1e) = s.d1_range();
            let (d2s, d2e) = s.d2_range();

            for a2 in d2s..d2e {
                for a1 in d1s..d1e {
                    let mut idx = [0usize; 3];
                    idx[t1.axis()] = a1 + gh;
                    idx[t2.axis()] = a2 + gh;
                    let at = |c: usize| -> (usize, usize, usize) {
                        let mut v = idx;
                        v[d] = c;
                        (v[0], v[1], v[2])
                    };

                    let outward = self.f_area[d][at(fb)].unit * sign;
                    let int1 = Primitive::from_conserved(&self.state[at(i1)], eos);
                    let int2 = Primitive::from_conserved(&self.state[at(i2)], eos);

                    let ghost1 = ghost_state(kind, 1, &int1, &int2, outward, freestream);
                    let ghost2 = ghost_state(kind, 2, &int1, &int2, outward, freestream);
                    self.state[at(g1)] = ghost1.to_conserved(eos);
                    self.state[at(g2)] = ghost2.to_conserved(eos);
                }
            }
        }
    }

    /// 阶段 3：棱幽灵状态
    ///
    /// `viscous_pass = false` 时壁面判据为 {slipWall, viscousWall}；
    /// `true` 时只认 `viscousWall`（黏性棱阶段重做角逻辑）。
    pub fn assign_ghost_cells_edge(
        &mut self,
        eos: &IdealGas,
        freestream: &Primitive,
        viscous_pass: bool,
    ) {
        let eos = *eos;
        let fs = *freestream;
        self.for_each_edge(|blk, da, lower_a, db, lower_b, dc| {
            blk.edge_pass_one(da, lower_a, db, lower_b, dc, &eos, &fs, viscous_pass);
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn edge_pass_one(
        &mut self,
        da: afx_core::Direction,
        lower_a: bool,
        db: afx_core::Direction,
        lower_b: bool,
        dc: afx_core::Direction,
        eos: &IdealGas,
        freestream: &Primitive,
        viscous_pass: bool,
    ) {
        let gh = self.num_ghosts();
        let (na, nb) = (self.len_dir(da), self.len_dir(db));
        let (aa, ab, ac) = (da.axis(), db.axis(), dc.axis());

        let (i1a, i2a, g1a, g2a, fba) = layer_idx(lower_a, na, gh);
        let (i1b, i2b, g1b, g2b, fbb) = layer_idx(lower_b, nb, gh);

        // 两侧贴片的表面号
        let surf_a = surface_id(da, lower_a);
        let surf_b = surface_id(db, lower_b);

        for c in gh..self.len_dir(dc) + gh {
            let c_phys = c - gh;
            // 交界面棱由延拓的切片交换负责
            if self.edge_touches_interblock(da, lower_a, db, lower_b, dc, c_phys) {
                continue;
            }

            // 查询两侧边界标签：物理坐标，常数方向取边界面索引
            let mut qa = [0usize; 3];
            qa[aa] = if lower_a { 0 } else { na };
            qa[ab] = i1b - gh;
            qa[ac] = c_phys;
            let kind_a = self.bc.kind_at(qa[0], qa[1], qa[2], surf_a);

            let mut qb = [0usize; 3];
            qb[ab] = if lower_b { 0 } else { nb };
            qb[aa] = i1a - gh;
            qb[ac] = c_phys;
            let kind_b = self.bc.kind_at(qb[0], qb[1], qb[2], surf_b);

            let wall_a = is_wall_for_pass(kind_a, viscous_pass);
            let wall_b = is_wall_for_pass(kind_b, viscous_pass);

            let mk = |a: usize, b: usize| -> (usize, usize, usize) {
                let mut v = [0usize; 3];
                v[aa] = a;
                v[ab] = b;
                v[ac] = c;
                (v[0], v[1], v[2])
            };

            if wall_a != wall_b {
                // 恰有一侧是壁面：沿壁法向用壁面生成器，内部源取对侧
                // 棱方向的面幽灵
                let (kind, along_a) = if wall_a {
                    (effective_wall_kind(kind_a, viscous_pass), true)
                } else {
                    (effective_wall_kind(kind_b, viscous_pass), false)
                };
                if along_a {
                    let mut fidx = [0usize; 3];
                    fidx[aa] = fba;
                    fidx[ab] = g1b;
                    fidx[ac] = c;
                    let sign = if lower_a { -1.0 } else { 1.0 };
                    for gb in [g1b, g2b] {
                        let mut f = fidx;
                        f[ab] = gb;
                        let outward = self.f_area[aa][(f[0], f[1], f[2])].unit * sign;
                        let int1 = Primitive::from_conserved(&self.state[mk(i1a, gb)], eos);
                        let int2 = Primitive::from_conserved(&self.state[mk(i2a, gb)], eos);
                        self.state[mk(g1a, gb)] =
                            ghost_state(kind, 1, &int1, &int2, outward, freestream)
                                .to_conserved(eos);
                        self.state[mk(g2a, gb)] =
                            ghost_state(kind, 2, &int1, &int2, outward, freestream)
                                .to_conserved(eos);
                    }
                } else {
                    let mut fidx = [0usize; 3];
                    fidx[ab] = fbb;
                    fidx[aa] = g1a;
                    fidx[ac] = c;
                    let sign = if lower_b { -1.0 } else { 1.0 };
                    for ga in [g1a, g2a] {
                        let mut f = fidx;
                        f[aa] = ga;
                        let outward = self.f_area[ab][(f[0], f[1], f[2])].unit * sign;
                        let int1 = Primitive::from_conserved(&self.state[mk(ga, i1b)], eos);
                        let int2 = Primitive::from_conserved(&self.state[mk(ga, i2b)], eos);
                        self.state[mk(ga, g1b)] =
                            ghost_state(kind, 1, &int1, &int2, outward, freestream)
                                .to_conserved(eos);
                        self.state[mk(ga, g2b)] =
                            ghost_state(kind, 2, &int1, &int2, outward, freestream)
                                .to_conserved(eos);
                    }
                }
            } else {
                // 同类两侧：取平均规则
                let avg = |x: crate::state::EqArray, y: crate::state::EqArray| (x + y) * 0.5;
                self.state[mk(g1a, g1b)] =
                    avg(self.state[mk(i1a, g1b)], self.state[mk(g1a, i1b)]);
                self.state[mk(g1a, g2b)] = self.state[mk(i1a, g2b)];
                self.state[mk(g2a, g1b)] = self.state[mk(g2a, i1b)];
                self.state[mk(g2a, g2b)] =
                    avg(self.state[mk(g1a, g2b)], self.state[mk(g2a, g1b)]);
            }
        }
    }
}

impl Block {
    /// 棱的任一侧贴片是否为交界面（按棱上的运行位置查询）
    pub(crate) fn edge_touches_interblock(
        &self,
        da: afx_core::Direction,
        lower_a: bool,
        db: afx_core::Direction,
        lower_b: bool,
        dc: afx_core::Direction,
        c_phys: usize,
    ) -> bool {
        let gh = self.num_ghosts();
        let (na, nb) = (self.len_dir(da), self.len_dir(db));
        let (aa, ab, ac) = (da.axis(), db.axis(), dc.axis());
        let (i1a, _, _, _, _) = layer_idx(lower_a, na, gh);
        let (i1b, _, _, _, _) = layer_idx(lower_b, nb, gh);

        let mut qa = [0usize; 3];
        qa[aa] = if lower_a { 0 } else { na };
        qa[ab] = i1b - gh;
        qa[ac] = c_phys;
        let kind_a = self.bc.kind_at(qa[0], qa[1], qa[2], surface_id(da, lower_a));

        let mut qb = [0usize; 3];
        qb[ab] = if lower_b { 0 } else { nb };
        qb[aa] = i1a - gh;
        qb[ac] = c_phys;
        let kind_b = self.bc.kind_at(qb[0], qb[1], qb[2], surface_id(db, lower_b));

        matches!(kind_a, Some(BcKind::Interblock)) || matches!(kind_b, Some(BcKind::Interblock))
    }
}

#[inline]
fn layer_idx(lower: bool, n: usize, gh: usize) -> (usize, usize, usize, usize, usize) {
    if lower {
        (gh, if n >= 2 { gh + 1 } else { gh }, gh - 1, gh - 2, gh)
    } else {
        (
            n + gh - 1,
            if n >= 2 { n + gh - 2 } else { n + gh - 1 },
            n + gh,
            n + gh + 1,
            n + gh,
        )
    }
}

#[inline]
fn surface_id(dir: afx_core::Direction, lower: bool) -> usize {
    use afx_core::Direction::*;
    match (dir, lower) {
        (I, true) => 1,
        (I, false) => 2,
        (J, true) => 3,
        (J, false) => 4,
        (K, true) => 5,
        (K, false) => 6,
    }
}

#[inline]
fn is_wall_for_pass(kind: Option<BcKind>, viscous_pass: bool) -> bool {
    match kind {
        Some(k) => {
            if viscous_pass {
                k == BcKind::ViscousWall
            } else {
                k.is_wall()
            }
        }
        None => false,
    }
}

#[inline]
fn effective_wall_kind(_kind: Option<BcKind>, viscous_pass: bool) -> BcKind {
    // 无黏棱阶段一律用滑移壁生成器（黏性壁此时仍由滑移壁代填）
    if viscous_pass {
        BcKind::ViscousWall
    } else {
        BcKind::SlipWall
    }
}
