// crates/afx_physics/src/block/implicit.rs

//! 隐式求解：LU-SGS 与 DPLUR
//!
//! Beam-Warming 双参数 (θ, ζ) 时间算子线性化后，通量雅可比取近似
//!
//! ```text
//! A·S ≈ ½ (A_c·S + σ·K·I)
//! ```
//!
//! `K` 为谱半径，`σ ∈ (0,1]` 为松弛因子；`A_c` 以矩阵自由形式作用：
//! 由候选 ΔU 直接计算对流通量变化。不存雅可比。
//!
//! 线性系统沿超平面 i+j+k = const 做对称 Gauss-Seidel 扫掠：正向
//! 扫掠访问单元时三个低侧邻居已更新，反向对称。块间不按超平面
//! 同步，跨块邻居读上一轮扫掠经幽灵交换送达的 ΔU。
//!
//! DPLUR 变体以对角化点松弛替代扫掠：同一对角，邻居贡献全部取
//! 上一轮的 ΔU。

use afx_config::SolverInput;
use afx_core::{Array3, Direction};

use super::Block;
use crate::eos::{IdealGas, Sutherland};
use crate::state::{EqArray, Primitive};
use crate::turbulence::TurbulenceModel;

impl Block {
    /// 分配带幽灵的 ΔU 数组（零初始化）
    pub fn initialize_matrix_update(&self) -> Array3<EqArray> {
        let [ni, nj, nk] = self.dims();
        let gh = self.num_ghosts();
        Array3::new(ni + 2 * gh, nj + 2 * gh, nk + 2 * gh, EqArray::ZERO)
    }

    /// 装配隐式对角
    ///
    /// `A_ii = (λ_sum + V·(1+ζ)/(Δt·θ) + τ)·σ`，双时间步时
    /// `τ = λ_sum / CFL_dual`，否则为零。
    pub fn assemble_diagonal(&self, input: &SolverInput) -> Array3<f64> {
        let [ni, nj, nk] = self.dims();
        let gh = self.num_ghosts();
        let theta = input.theta();
        let zeta = input.zeta();
        let sigma = input.matrix_relaxation;

        let mut diag = Array3::new(ni, nj, nk, 0.0);
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let lam = self.avg_wave_speed[(i, j, k)];
                    let vol = self.vol[(i + gh, j + gh, k + gh)];
                    let dt = self.dt[(i, j, k)];
                    let tau = if input.is_dual_time() {
                        lam / input.cfl_dual
                    } else {
                        0.0
                    };
                    diag[(i, j, k)] =
                        (lam + vol * (1.0 + zeta) / (dt * theta) + tau) * sigma;
                }
            }
        }
        diag
    }

    /// 邻居单元在给定方向上的谱半径（候选状态）
    #[allow(clippy::too_many_arguments)]
    fn dir_spec_rad(
        &self,
        c: (usize, usize, usize),
        dir: Direction,
        prim: &Primitive,
        input: &SolverInput,
        eos: &IdealGas,
        suth: &Sutherland,
        turb: &dyn TurbulenceModel,
    ) -> f64 {
        let d = dir.axis();
        let (di, dj, dk) = dir.unit();
        let a_lo = self.f_area[d][c];
        let a_hi = self.f_area[d][(c.0 + di, c.1 + dj, c.2 + dk)];
        let n_avg = 0.5 * (a_lo.unit + a_hi.unit);
        let mag_avg = 0.5 * (a_lo.mag + a_hi.mag);

        let mut lam = (prim.vel.dot(n_avg).abs() + prim.sound_speed(eos)) * mag_avg;
        if input.equation_set.is_viscous() {
            let vol = self.vol[c];
            if vol > 0.0 {
                let mu = suth.effective_viscosity(prim.temperature(eos));
                let mu_t = turb.eddy_viscosity(prim, mu, 1.0e10);
                let coeff = (4.0 / (3.0 * prim.rho)).max(eos.gamma() / prim.rho);
                lam += coeff * (mu + mu_t) / input.prandtl * mag_avg * mag_avg / vol
                    * turb.spectral_factor();
            }
        }
        lam
    }

    /// 一个邻居的非对角贡献 ½(|A|·ΔF ± σ·λ·ΔU)
    ///
    /// `plus` 为真取 `+`（低侧邻居），为假取 `−`（高侧邻居）。
    #[allow(clippy::too_many_arguments)]
    fn off_diagonal(
        &self,
        nb: (usize, usize, usize),
        dir: Direction,
        face: (usize, usize, usize),
        du_n: EqArray,
        plus: bool,
        input: &SolverInput,
        eos: &IdealGas,
        suth: &Sutherland,
        turb: &dyn TurbulenceModel,
    ) -> EqArray {
        let area = self.f_area[dir.axis()][face];
        let u_n = self.state[nb];
        let prim = Primitive::from_conserved(&u_n, eos);
        let prim_upd = Primitive::from_conserved(&(u_n + du_n), eos);

        let lam = self.dir_spec_rad(nb, dir, &prim_upd, input, eos, suth, turb);
        let df = prim_upd.convective_flux(area.unit, eos)
            - prim.convective_flux(area.unit, eos);

        let sig = input.matrix_relaxation;
        let sr = if plus { sig * lam } else { -sig * lam };
        (df * area.mag + du_n * sr) * 0.5
    }

    /// 时间算子右端项 `−R/θ − Δ_{n,n-1} − Δ_{m,n}`
    fn temporal_rhs(&self, c_int: (usize, usize, usize), input: &SolverInput) -> EqArray {
        let gh = self.num_ghosts();
        let theta = input.theta();
        let zeta = input.zeta();
        let c = (c_int.0 + gh, c_int.1 + gh, c_int.2 + gh);
        let vol = self.vol[c];
        let dt = self.dt[c_int];

        let mut rhs = -self.residual[c_int] * (1.0 / theta);
        if zeta > 0.0 {
            let d_n_nm1 = (self.sol_time_n[c_int] - self.sol_time_nm1[c_int])
                * (zeta * vol / (dt * theta));
            rhs -= d_n_nm1;
        }
        let d_m_n =
            (self.state[c] - self.sol_time_n[c_int]) * ((1.0 + zeta) * vol / (dt * theta));
        rhs -= d_m_n;
        rhs
    }

    /// LU-SGS 正向扫掠
    ///
    /// 按超平面序，对每个单元由三个低侧邻居的已更新 ΔU 组装 L 并
    /// 解出 `ΔU_c = (−R/θ − Δ_{n,n-1} − Δ_{m,n} + L) / A_ii`。
    #[allow(clippy::too_many_arguments)]
    pub fn lusgs_forward(
        &self,
        order: &[(usize, usize, usize)],
        du: &mut Array3<EqArray>,
        diag: &Array3<f64>,
        input: &SolverInput,
        eos: &IdealGas,
        suth: &Sutherland,
        turb: &dyn TurbulenceModel,
    ) {
        let gh = self.num_ghosts();
        for &(i, j, k) in order {
            let c = (i + gh, j + gh, k + gh);
            let mut l = EqArray::ZERO;
            for dir in Direction::ALL {
                let (di, dj, dk) = dir.unit();
                let nb = (c.0 - di, c.1 - dj, c.2 - dk);
                let du_n = du[nb];
                if du_n == EqArray::ZERO {
                    continue;
                }
                // 共享面为本单元的低侧面，法向由邻居指向本单元
                l += self.off_diagonal(nb, dir, c, du_n, true, input, eos, suth, turb);
            }
            let rhs = self.temporal_rhs((i, j, k), input) + l;
            du[c] = rhs * (1.0 / diag[(i, j, k)]);
        }
    }

    /// LU-SGS 反向扫掠
    ///
    /// 镜像地组装高侧邻居的 U 并修正 `ΔU_c ← ΔU_c − U/A_ii`。
    /// 返回修正量的 L2 平方和（矩阵误差）。
    #[allow(clippy::too_many_arguments)]
    pub fn lusgs_backward(
        &self,
        order: &[(usize, usize, usize)],
        du: &mut Array3<EqArray>,
        diag: &Array3<f64>,
        input: &SolverInput,
        eos: &IdealGas,
        suth: &Sutherland,
        turb: &dyn TurbulenceModel,
    ) -> f64 {
        let gh = self.num_ghosts();
        let mut error = 0.0;
        for &(i, j, k) in order.iter().rev() {
            let c = (i + gh, j + gh, k + gh);
            let mut u = EqArray::ZERO;
            for dir in Direction::ALL {
                let (di, dj, dk) = dir.unit();
                let nb = (c.0 + di, c.1 + dj, c.2 + dk);
                let du_n = du[nb];
                if du_n == EqArray::ZERO {
                    continue;
                }
                // 共享面为邻居的低侧面，法向由本单元指向邻居
                u += self.off_diagonal(nb, dir, nb, du_n, false, input, eos, suth, turb);
            }
            let corr = u * (1.0 / diag[(i, j, k)]);
            du[c] -= corr;
            error += corr.squared().0.iter().sum::<f64>();
        }
        error
    }

    /// DPLUR：对角化点松弛
    ///
    /// 邻居贡献全部取上一轮 ΔU；返回两轮 ΔU 之差的 L2 平方和。
    #[allow(clippy::too_many_arguments)]
    pub fn dplur(
        &self,
        du: &mut Array3<EqArray>,
        diag: &Array3<f64>,
        input: &SolverInput,
        eos: &IdealGas,
        suth: &Sutherland,
        turb: &dyn TurbulenceModel,
    ) -> f64 {
        let gh = self.num_ghosts();
        let [ni, nj, nk] = self.dims();
        let prev = du.clone();
        let mut error = 0.0;

        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let c = (i + gh, j + gh, k + gh);
                    let mut nbr = EqArray::ZERO;
                    for dir in Direction::ALL {
                        let (di, dj, dk) = dir.unit();
                        let lo = (c.0 - di, c.1 - dj, c.2 - dk);
                        let hi = (c.0 + di, c.1 + dj, c.2 + dk);
                        let du_lo = prev[lo];
                        if du_lo != EqArray::ZERO {
                            nbr += self.off_diagonal(
                                lo, dir, c, du_lo, true, input, eos, suth, turb,
                            );
                        }
                        let du_hi = prev[hi];
                        if du_hi != EqArray::ZERO {
                            nbr -= self.off_diagonal(
                                hi, dir, hi, du_hi, false, input, eos, suth, turb,
                            );
                        }
                    }
                    let rhs = self.temporal_rhs((i, j, k), input) + nbr;
                    let new = rhs * (1.0 / diag[(i, j, k)]);
                    error += (new - prev[c]).squared().0.iter().sum::<f64>();
                    du[c] = new;
                }
            }
        }
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BcKind, BlockBoundary};
    use crate::hyperplane::hyperplane_order;
    use crate::turbulence::NoTurbulence;
    use glam::DVec3;

    fn implicit_block() -> (Block, SolverInput, IdealGas, Sutherland) {
        let mut input = SolverInput::default();
        input.time_integration = afx_config::TimeIntegration::ImplicitEuler;
        let eos = IdealGas::new(input.gamma);
        let suth = Sutherland::new(0.0, 1.0e6);
        let fs = Primitive {
            rho: 1.0,
            vel: DVec3::ZERO,
            p: 1.0 / input.gamma,
            k: 0.0,
            omega: 0.0,
        };
        let mut blk = Block::cartesian(
            4,
            4,
            4,
            2,
            DVec3::ZERO,
            DVec3::ONE,
            BlockBoundary::for_box(4, 4, 4, [BcKind::SlipWall; 6]),
        );
        blk.init_state(&fs, &eos);
        blk.assign_ghost_cells_geom();
        blk.avg_wave_speed.fill(3.0);
        blk.dt.fill(0.1);
        (blk, input, eos, suth)
    }

    #[test]
    fn test_diagonal_value() {
        let (blk, input, _eos, _suth) = implicit_block();
        let diag = blk.assemble_diagonal(&input);
        // σ = 1, ζ = 0: A_ii = λ + V/Δt = 3 + 10
        assert!((diag[(0, 0, 0)] - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_lusgs_contracts_delta_u() {
        // 零残差、非零 ΔU 输入：5 轮对称扫掠内趋零（矩阵自由恒等检验）
        let (blk, input, eos, suth) = implicit_block();
        let order = hyperplane_order(4, 4, 4);
        let diag = blk.assemble_diagonal(&input);
        let mut du = blk.initialize_matrix_update();
        for k in 2..6 {
            for j in 2..6 {
                for i in 2..6 {
                    du[(i, j, k)] = EqArray([0.1, 0.05, -0.02, 0.0, 0.3, 0.0, 0.0]);
                }
            }
        }
        for _ in 0..5 {
            blk.lusgs_forward(&order, &mut du, &diag, &input, &eos, &suth, &NoTurbulence);
            blk.lusgs_backward(&order, &mut du, &diag, &input, &eos, &suth, &NoTurbulence);
        }
        let mut max = 0.0_f64;
        for k in 2..6 {
            for j in 2..6 {
                for i in 2..6 {
                    let (m, _) = du[(i, j, k)].abs_max();
                    max = max.max(m);
                }
            }
        }
        assert!(max < 1e-6, "ΔU 未收缩: {}", max);
    }

    #[test]
    fn test_dplur_matches_zero_fixed_point() {
        let (blk, input, eos, suth) = implicit_block();
        let diag = blk.assemble_diagonal(&input);
        let mut du = blk.initialize_matrix_update();
        // 零残差、零 ΔU：不动点保持
        let err = blk.dplur(&mut du, &diag, &input, &eos, &suth, &NoTurbulence);
        assert_eq!(err, 0.0);
        for k in 2..6 {
            assert_eq!(du[(k, k, k)], EqArray::ZERO);
        }
    }

    #[test]
    fn test_dplur_contracts_delta_u() {
        let (blk, input, eos, suth) = implicit_block();
        let diag = blk.assemble_diagonal(&input);
        let mut du = blk.initialize_matrix_update();
        for k in 2..6 {
            for j in 2..6 {
                for i in 2..6 {
                    du[(i, j, k)] = EqArray([0.1, 0.0, 0.0, 0.0, 0.2, 0.0, 0.0]);
                }
            }
        }
        let mut prev_err = f64::MAX;
        for _ in 0..8 {
            let err = blk.dplur(&mut du, &diag, &input, &eos, &suth, &NoTurbulence);
            assert!(err <= prev_err * 1.5);
            prev_err = err;
        }
        let (m, _) = du[(4, 4, 4)].abs_max();
        assert!(m < 1e-3);
    }
}
