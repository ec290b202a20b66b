// crates/afx_physics/src/block/update.rs

//! 时间推进更新
//!
//! - 显式 Euler: `U^{n+1} = U^n − (Δt/V)·R`
//! - 低存储 RK4（系数 ¼, ⅓, ½, 1）:
//!   `U^{(s)} = U^n − (α_s Δt^n / V)·R^{(s-1)}`，阶段 0–2 之间由驱动
//!   重新装配残差并重算 Δt，最后一阶段累计 L2/L∞
//! - 隐式: `U^{m+1} = U^m + ΔU`（ΔU 由 LU-SGS/DPLUR 解出）
//!
//! L2 逐单元累加 `R·R`；L∞ 逐分量与当前最大比较，刷新时记录
//! (父块, i, j, k, 方程号) 定位。

use afx_config::{SolverInput, TimeIntegration};
use afx_core::Array3;

use super::Block;
use crate::residual::{ResidLinf, ResidualL2};
use crate::state::EqArray;

/// 低存储 RK4 阶段系数
pub const RK4_ALPHA: [f64; 4] = [0.25, 1.0 / 3.0, 0.5, 1.0];

impl Block {
    /// RK4 阶段 0 前的快照：冻结 U^n 与 Δt^n
    pub fn save_rk_snapshot(&mut self) {
        self.assign_sol_to_time_n();
        let [ni, nj, nk] = self.dims();
        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    self.rk_dt[(i, j, k)] = self.dt[(i, j, k)];
                }
            }
        }
    }

    /// 按所选时间积分更新一个块
    ///
    /// `du` 仅隐式推进使用（带幽灵的 ΔU 数组）；`stage` 仅 RK4 使用。
    /// 显式 Euler、隐式与 RK4 的最后一阶段把残差计入 `l2` / `linf`。
    pub fn update_block(
        &mut self,
        input: &SolverInput,
        du: Option<&Array3<EqArray>>,
        stage: usize,
        l2: &mut ResidualL2,
        linf: &mut ResidLinf,
    ) {
        let gh = self.num_ghosts();
        let [ni, nj, nk] = self.dims();
        let accumulate = match input.time_integration {
            TimeIntegration::Rk4 => stage == RK4_ALPHA.len() - 1,
            _ => true,
        };

        for k in 0..nk {
            for j in 0..nj {
                for i in 0..ni {
                    let c = (i + gh, j + gh, k + gh);
                    let r = self.residual[(i, j, k)];
                    let vol = self.vol[c];

                    match input.time_integration {
                        TimeIntegration::ExplicitEuler => {
                            let dt = self.dt[(i, j, k)];
                            self.state[c] -= r * (dt / vol);
                        }
                        TimeIntegration::Rk4 => {
                            let dt = self.rk_dt[(i, j, k)];
                            let alpha = RK4_ALPHA[stage];
                            self.state[c] =
                                self.sol_time_n[(i, j, k)] - r * (alpha * dt / vol);
                        }
                        TimeIntegration::ImplicitEuler | TimeIntegration::Bdf2 => {
                            if let Some(du) = du {
                                self.state[c] += du[c];
                            }
                        }
                    }

                    if accumulate {
                        l2.accumulate(&r);
                        linf.challenge(&r, self.parent_block, i, j, k);
                    }
                }
            }
        }
    }
}
