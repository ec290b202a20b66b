// crates/afx_physics/src/block/flux.rs

//! 通量装配、源项与时间步
//!
//! 每个方向对全部物理面：
//!
//! 1. 由单元状态取左右面状态（一阶取邻单元值；二阶 κ-MUSCL）
//! 2. Roe 通量乘面积加入两侧残差：左侧 `+F·|A|`，右侧 `−F·|A|`
//!    （物理区外一侧不累加）
//! 3. 面的高侧单元累加无黏谱半径 `(|v·n̄|+a)·Ā`
//!
//! 黏性通量在以面为中心的替代控制体上求梯度，以与无黏相反的符号
//! 装配；高侧单元累加黏性谱半径 `max(4/3ρ, γ/ρ)·(μ+μt)/Pr·Ā²/V`。
//!
//! 单元谱半径和存入 `avg_wave_speed`，同时服务局部时间步与隐式
//! 对角。

use afx_config::{Order, SolverInput};
use afx_core::Direction;
use glam::DVec3;

use super::Block;
use crate::eos::{IdealGas, Sutherland};
use crate::schemes::{muscl_face, roe_flux, scalar_grad_gg, vector_grad_gg, viscous_flux};
use crate::state::Primitive;
use crate::turbulence::TurbulenceModel;

/// 黏性谱半径在时间步分母中的权重
pub const VISC_RAD_COEFF: f64 = 4.0;

impl Block {
    /// 单方向的无黏通量装配
    pub fn calc_inviscid_flux_dir(&mut self, dir: Direction, input: &SolverInput, eos: &IdealGas) {
        let gh = self.num_ghosts();
        let d = dir.axis();
        let (di, dj, dk) = dir.unit();
        let n_d = self.len_dir(dir);
        let (t1, t2) = dir.tangential();
        let (n1, n2) = (self.len_dir(t1), self.len_dir(t2));

        for a2 in 0..n2 {
            for a1 in 0..n1 {
                for fp in 0..=n_d {
                    // 面的填充坐标
                    let mut fidx = [0usize; 3];
                    fidx[d] = fp + gh;
                    fidx[t1.axis()] = a1 + gh;
                    fidx[t2.axis()] = a2 + gh;
                    let (fi, fj, fk) = (fidx[0], fidx[1], fidx[2]);

                    let lo = (fi - di, fj - dj, fk - dk);
                    let hi = (fi, fj, fk);
                    let area = self.f_area[d][(fi, fj, fk)];

                    let (left, right) = match input.order {
                        Order::First => (
                            self.primitive(lo.0, lo.1, lo.2, eos),
                            self.primitive(hi.0, hi.1, hi.2, eos),
                        ),
                        Order::Second => self.muscl_states(dir, lo, hi, input, eos),
                    };

                    let flux = roe_flux(&left, &right, area.unit, eos) * area.mag;

                    if self.is_physical(lo.0, lo.1, lo.2) {
                        let r = (lo.0 - gh, lo.1 - gh, lo.2 - gh);
                        self.residual[r] += flux;
                    }
                    if self.is_physical(hi.0, hi.1, hi.2) {
                        let r = (hi.0 - gh, hi.1 - gh, hi.2 - gh);
                        self.residual[r] -= flux;

                        // 高侧单元的无黏谱半径
                        let up_face = (fi + di, fj + dj, fk + dk);
                        let a_hi = self.f_area[d][up_face];
                        let n_avg = 0.5 * (area.unit + a_hi.unit);
                        let mag_avg = 0.5 * (area.mag + a_hi.mag);
                        let prim = self.primitive(hi.0, hi.1, hi.2, eos);
                        let lam =
                            (prim.vel.dot(n_avg).abs() + prim.sound_speed(eos)) * mag_avg;
                        self.avg_wave_speed[r] += lam;
                    }
                }
            }
        }
    }

    /// 二阶 κ-MUSCL 左右面状态
    fn muscl_states(
        &self,
        dir: Direction,
        lo: (usize, usize, usize),
        hi: (usize, usize, usize),
        input: &SolverInput,
        eos: &IdealGas,
    ) -> (Primitive, Primitive) {
        let (di, dj, dk) = dir.unit();
        let lo2 = (lo.0 - di, lo.1 - dj, lo.2 - dk);
        let hi2 = (hi.0 + di, hi.1 + dj, hi.2 + dk);

        let p_lo2 = self.primitive(lo2.0, lo2.1, lo2.2, eos).to_array();
        let p_lo = self.primitive(lo.0, lo.1, lo.2, eos).to_array();
        let p_hi = self.primitive(hi.0, hi.1, hi.2, eos).to_array();
        let p_hi2 = self.primitive(hi2.0, hi2.1, hi2.2, eos).to_array();

        let w_lo2 = self.cell_width(dir, lo2.0, lo2.1, lo2.2);
        let w_lo = self.cell_width(dir, lo.0, lo.1, lo.2);
        let w_hi = self.cell_width(dir, hi.0, hi.1, hi.2);
        let w_hi2 = self.cell_width(dir, hi2.0, hi2.1, hi2.2);

        let left = muscl_face(
            &p_lo,
            &p_lo2,
            &p_hi,
            input.kappa,
            input.limiter,
            w_lo,
            w_lo2,
            w_hi,
        );
        let right = muscl_face(
            &p_hi,
            &p_hi2,
            &p_lo,
            input.kappa,
            input.limiter,
            w_hi,
            w_hi2,
            w_lo,
        );
        (Primitive::from_array(left), Primitive::from_array(right))
    }

    /// 单方向的黏性通量装配
    pub fn calc_viscous_flux_dir(
        &mut self,
        dir: Direction,
        input: &SolverInput,
        eos: &IdealGas,
        suth: &Sutherland,
        turb: &dyn TurbulenceModel,
    ) {
        let gh = self.num_ghosts();
        let d = dir.axis();
        let (di, dj, dk) = dir.unit();
        let n_d = self.len_dir(dir);
        let (t1, t2) = dir.tangential();
        let (n1, n2) = (self.len_dir(t1), self.len_dir(t2));

        for a2 in 0..n2 {
            for a1 in 0..n1 {
                for fp in 0..=n_d {
                    let mut fidx = [0usize; 3];
                    fidx[d] = fp + gh;
                    fidx[t1.axis()] = a1 + gh;
                    fidx[t2.axis()] = a2 + gh;
                    let f = (fidx[0], fidx[1], fidx[2]);

                    let lo = (f.0 - di, f.1 - dj, f.2 - dk);
                    let hi = f;
                    let area = self.f_area[d][f];

                    let p_lo = self.primitive(lo.0, lo.1, lo.2, eos);
                    let p_hi = self.primitive(hi.0, hi.1, hi.2, eos);

                    // 距离加权中心平均
                    let fc = self.f_center[d][f];
                    let dl = (self.center[lo] - fc).length();
                    let dh = (self.center[hi] - fc).length();
                    let wl = dh / (dl + dh);
                    let wh = dl / (dl + dh);
                    let face = Primitive {
                        rho: wl * p_lo.rho + wh * p_hi.rho,
                        vel: p_lo.vel * wl + p_hi.vel * wh,
                        p: wl * p_lo.p + wh * p_hi.p,
                        k: wl * p_lo.k + wh * p_hi.k,
                        omega: wl * p_lo.omega + wh * p_hi.omega,
                    };

                    let (vel_grad, t_grad, k_grad, w_grad, _alt_vol) =
                        self.face_gradients(dir, lo, hi, eos);

                    let wall = if self.is_physical(hi.0, hi.1, hi.2) {
                        self.wall_dist[(hi.0 - gh, hi.1 - gh, hi.2 - gh)]
                    } else if self.is_physical(lo.0, lo.1, lo.2) {
                        self.wall_dist[(lo.0 - gh, lo.1 - gh, lo.2 - gh)]
                    } else {
                        1.0e10
                    };
                    let mu = suth.effective_viscosity(face.temperature(eos));
                    let mu_t = turb.eddy_viscosity(&face, mu, wall);

                    let flux = viscous_flux(
                        &face,
                        &vel_grad,
                        t_grad,
                        k_grad,
                        w_grad,
                        mu,
                        mu_t,
                        area.unit,
                        eos,
                        input.prandtl,
                        input.prandtl_turb,
                        turb.sigma_k(),
                        turb.sigma_w(),
                    ) * area.mag;

                    // 黏性项与无黏装配反号
                    if self.is_physical(lo.0, lo.1, lo.2) {
                        let r = (lo.0 - gh, lo.1 - gh, lo.2 - gh);
                        self.residual[r] -= flux;
                    }
                    if self.is_physical(hi.0, hi.1, hi.2) {
                        let r = (hi.0 - gh, hi.1 - gh, hi.2 - gh);
                        self.residual[r] += flux;

                        // 高侧单元的黏性谱半径
                        let up_face = (f.0 + di, f.1 + dj, f.2 + dk);
                        let a_hi = self.f_area[d][up_face];
                        let mag_avg = 0.5 * (area.mag + a_hi.mag);
                        let vol = self.vol[hi];
                        let prim = p_hi;
                        let coeff = (4.0 / (3.0 * prim.rho)).max(eos.gamma() / prim.rho);
                        let lam = coeff * (mu + mu_t) / input.prandtl * mag_avg * mag_avg / vol;
                        self.avg_wave_speed[r] += VISC_RAD_COEFF * lam;
                    }
                }
            }
        }
    }

    /// 面中心替代控制体上的 Green-Gauss 梯度
    ///
    /// 控制体由相邻两单元的面与体积平均而来：所在方向的"面"取两个
    /// 单元中心值，切向面取两单元各自切向面值的平均（10 单元模板）。
    fn face_gradients(
        &self,
        dir: Direction,
        lo: (usize, usize, usize),
        hi: (usize, usize, usize),
        eos: &IdealGas,
    ) -> (glam::DMat3, DVec3, DVec3, DVec3, f64) {
        let d = dir.axis();
        let (t1, t2) = dir.tangential();

        let vol = 0.5 * (self.vol[lo] + self.vol[hi]);

        // 采样：单元中心值与切向半面平均
        let prim_at = |c: (usize, usize, usize)| self.primitive(c.0, c.1, c.2, eos);
        let p_lo = prim_at(lo);
        let p_hi = prim_at(hi);

        // 所在方向的两个面：值取单元中心
        let (di, dj, dk) = dir.unit();
        let a_d_lo = 0.5
            * (self.f_area[d][hi].vector()
                + self.f_area[d][(hi.0 - di, hi.1 - dj, hi.2 - dk)].vector());
        let a_d_hi = 0.5
            * (self.f_area[d][hi].vector()
                + self.f_area[d][(hi.0 + di, hi.1 + dj, hi.2 + dk)].vector());

        // 切向面：面积与值都取两单元平均
        let tang = |t: Direction| -> (DVec3, DVec3, Primitive, Primitive) {
            let ta = t.axis();
            let (ui, uj, uk) = t.unit();
            let lo_nb = (lo.0 - ui, lo.1 - uj, lo.2 - uk);
            let hi_nb = (lo.0 + ui, lo.1 + uj, lo.2 + uk);
            let lo_nb2 = (hi.0 - ui, hi.1 - uj, hi.2 - uk);
            let hi_nb2 = (hi.0 + ui, hi.1 + uj, hi.2 + uk);

            let a_lo = 0.5
                * (self.f_area[ta][lo].vector() + self.f_area[ta][hi].vector());
            let mut hi_face_l = lo;
            hi_face_l.0 += ui;
            hi_face_l.1 += uj;
            hi_face_l.2 += uk;
            let mut hi_face_r = hi;
            hi_face_r.0 += ui;
            hi_face_r.1 += uj;
            hi_face_r.2 += uk;
            let a_hi = 0.5
                * (self.f_area[ta][hi_face_l].vector()
                    + self.f_area[ta][hi_face_r].vector());

            let avg4 = |a: Primitive, b: Primitive, c: Primitive, dd: Primitive| Primitive {
                rho: 0.25 * (a.rho + b.rho + c.rho + dd.rho),
                vel: 0.25 * (a.vel + b.vel + c.vel + dd.vel),
                p: 0.25 * (a.p + b.p + c.p + dd.p),
                k: 0.25 * (a.k + b.k + c.k + dd.k),
                omega: 0.25 * (a.omega + b.omega + c.omega + dd.omega),
            };
            let v_lo = avg4(p_lo, prim_at(lo_nb), p_hi, prim_at(lo_nb2));
            let v_hi = avg4(p_lo, prim_at(hi_nb), p_hi, prim_at(hi_nb2));
            (a_lo, a_hi, v_lo, v_hi)
        };

        let (a1_lo, a1_hi, v1_lo, v1_hi) = tang(t1);
        let (a2_lo, a2_hi, v2_lo, v2_hi) = tang(t2);

        // 把六个面值按 i/j/k 低高排列
        let mut vals = [(DVec3::ZERO, p_lo); 6];
        vals[2 * d] = (a_d_lo, p_lo);
        vals[2 * d + 1] = (a_d_hi, p_hi);
        vals[2 * t1.axis()] = (a1_lo, v1_lo);
        vals[2 * t1.axis() + 1] = (a1_hi, v1_hi);
        vals[2 * t2.axis()] = (a2_lo, v2_lo);
        vals[2 * t2.axis() + 1] = (a2_hi, v2_hi);

        let [il, iu, jl, ju, kl, ku] = vals.map(|(_, p)| p);
        let [ail, aiu, ajl, aju, akl, aku] = vals.map(|(a, _)| a);

        let vel_grad = vector_grad_gg(
            il.vel, iu.vel, jl.vel, ju.vel, kl.vel, ku.vel, ail, aiu, ajl, aju, akl, aku, vol,
        );
        let tg = |p: &Primitive| p.temperature(eos);
        let t_grad = scalar_grad_gg(
            tg(&il),
            tg(&iu),
            tg(&jl),
            tg(&ju),
            tg(&kl),
            tg(&ku),
            ail,
            aiu,
            ajl,
            aju,
            akl,
            aku,
            vol,
        );
        let k_grad = scalar_grad_gg(
            il.k, iu.k, jl.k, ju.k, kl.k, ku.k, ail, aiu, ajl, aju, akl, aku, vol,
        );
        let w_grad = scalar_grad_gg(
            il.omega, iu.omega, jl.omega, ju.omega, kl.omega, ku.omega, ail, aiu, ajl, aju, akl,
            aku, vol,
        );

        (vel_grad, t_grad, k_grad, w_grad, vol)
    }

    /// 湍流源项：残差按 −S·V 累加
    pub fn calc_turb_sources(
        &mut self,
        eos: &IdealGas,
        suth: &Sutherland,
        turb: &dyn TurbulenceModel,
    ) {
        if turb.is_none() {
            return;
        }
        let gh = self.num_ghosts();
        let [ni, nj, nk] = self.dims();
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let c = (i + gh, j + gh, k + gh);
                    let prim = self.primitive(c.0, c.1, c.2, eos);
                    let (vel_grad, _t, k_grad, w_grad, _v) =
                        self.cell_gradients(c, eos);
                    let mu = suth.effective_viscosity(prim.temperature(eos));
                    let s = turb.source(
                        &prim,
                        &vel_grad,
                        k_grad,
                        w_grad,
                        self.wall_dist[(i, j, k)],
                        mu,
                    );
                    let vol = self.vol[c];
                    self.residual[(i, j, k)] -= s * vol;
                }
            }
        }
    }

    /// 单元自身控制体上的 Green-Gauss 梯度（源项用）
    fn cell_gradients(
        &self,
        c: (usize, usize, usize),
        eos: &IdealGas,
    ) -> (glam::DMat3, DVec3, DVec3, DVec3, f64) {
        let vol = self.vol[c];
        let prim_at = |p: (usize, usize, usize)| self.primitive(p.0, p.1, p.2, eos);
        let center = prim_at(c);

        let mut faces = [(DVec3::ZERO, center); 6];
        for dir in Direction::ALL {
            let d = dir.axis();
            let (ui, uj, uk) = dir.unit();
            let lo_nb = (c.0 - ui, c.1 - uj, c.2 - uk);
            let hi_nb = (c.0 + ui, c.1 + uj, c.2 + uk);
            let avg = |a: Primitive, b: Primitive| Primitive {
                rho: 0.5 * (a.rho + b.rho),
                vel: 0.5 * (a.vel + b.vel),
                p: 0.5 * (a.p + b.p),
                k: 0.5 * (a.k + b.k),
                omega: 0.5 * (a.omega + b.omega),
            };
            let hi_face = (c.0 + ui, c.1 + uj, c.2 + uk);
            faces[2 * d] = (self.f_area[d][c].vector(), avg(center, prim_at(lo_nb)));
            faces[2 * d + 1] = (
                self.f_area[d][hi_face].vector(),
                avg(center, prim_at(hi_nb)),
            );
        }

        let [il, iu, jl, ju, kl, ku] = faces.map(|(_, p)| p);
        let [ail, aiu, ajl, aju, akl, aku] = faces.map(|(a, _)| a);

        let vel_grad = vector_grad_gg(
            il.vel, iu.vel, jl.vel, ju.vel, kl.vel, ku.vel, ail, aiu, ajl, aju, akl, aku, vol,
        );
        let tg = |p: &Primitive| p.temperature(eos);
        let t_grad = scalar_grad_gg(
            tg(&il),
            tg(&iu),
            tg(&jl),
            tg(&ju),
            tg(&kl),
            tg(&ku),
            ail,
            aiu,
            ajl,
            aju,
            akl,
            aku,
            vol,
        );
        let k_grad = scalar_grad_gg(
            il.k, iu.k, jl.k, ju.k, kl.k, ku.k, ail, aiu, ajl, aju, akl, aku, vol,
        );
        let w_grad = scalar_grad_gg(
            il.omega, iu.omega, jl.omega, ju.omega, kl.omega, ku.omega, ail, aiu, ajl, aju, akl,
            aku, vol,
        );
        (vel_grad, t_grad, k_grad, w_grad, vol)
    }

    /// 完整残差装配：无黏 + 黏性 + 湍流源项
    pub fn calc_residual(
        &mut self,
        input: &SolverInput,
        eos: &IdealGas,
        suth: &Sutherland,
        turb: &dyn TurbulenceModel,
    ) {
        self.reset_residuals();
        for dir in Direction::ALL {
            self.calc_inviscid_flux_dir(dir, input, eos);
        }
        if input.equation_set.is_viscous() {
            for dir in Direction::ALL {
                self.calc_viscous_flux_dir(dir, input, eos, suth, turb);
            }
        }
        if input.equation_set.is_turbulent() {
            self.calc_turb_sources(eos, suth, turb);
        }
    }

    /// 局部时间步
    ///
    /// 用户固定 Δt 时按 `a_ref/L_ref` 无量纲化后均匀写入；否则
    /// `dt = CFL·V / λ_sum`（`avg_wave_speed` 已含黏性加权和）。
    pub fn calc_block_time_step(&mut self, input: &SolverInput, a_ref: f64) {
        let gh = self.num_ghosts();
        let [ni, nj, nk] = self.dims();
        if let Some(fixed) = input.fixed_dt {
            let nd = fixed * a_ref / input.length_ref;
            self.dt.fill(nd);
            return;
        }
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let vol = self.vol[(i + gh, j + gh, k + gh)];
                    self.dt[(i, j, k)] = input.cfl * vol / self.avg_wave_speed[(i, j, k)];
                }
            }
        }
    }
}
