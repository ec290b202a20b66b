// crates/afx_physics/src/schemes/roe.rs

//! Roe 近似黎曼求解器
//!
//! 由左右重构状态与面单位法向计算数值通量：
//!
//! ```text
//! F = ½ (F(U_L) + F(U_R)) − ½ Σ |λ_m| α_m K_m
//! ```
//!
//! 其中 λ_m 为 Roe 平均态的特征速度 (ṽn−ã, ṽn, ṽn+ã)，α_m 为波强，
//! K_m 为右特征向量。声波特征值带 Harten 熵修正。湍流标量按界面
//! 质量通量被动迎风输运。

use glam::DVec3;

use crate::eos::IdealGas;
use crate::state::{EqArray, Primitive};

/// Harten 熵修正系数（相对声速）
const ENTROPY_FIX: f64 = 0.1;

#[inline]
fn entropy_fix(lambda: f64, a: f64) -> f64 {
    let eps = ENTROPY_FIX * a;
    if lambda.abs() < eps {
        0.5 * (lambda * lambda / eps + eps)
    } else {
        lambda.abs()
    }
}

/// Roe 通量
///
/// `normal` 为面单位法向，约定指向索引增大方向；返回沿该法向的
/// 通量记录（未乘面积）。
pub fn roe_flux(left: &Primitive, right: &Primitive, normal: DVec3, eos: &IdealGas) -> EqArray {
    // Roe 平均
    let sl = left.rho.sqrt();
    let sr = right.rho.sqrt();
    let w = sl / (sl + sr);

    let rho_t = sl * sr;
    let vel_t = left.vel * w + right.vel * (1.0 - w);
    let h_l = eos.enthalpy(left.rho, left.p, left.vel);
    let h_r = eos.enthalpy(right.rho, right.p, right.vel);
    let h_t = h_l * w + h_r * (1.0 - w);
    let a2 = (eos.gamma() - 1.0) * (h_t - 0.5 * vel_t.length_squared());
    let a_t = a2.max(0.0).sqrt();

    let vn = vel_t.dot(normal);
    let vn_l = left.vel.dot(normal);
    let vn_r = right.vel.dot(normal);

    // 跳跃量与波强
    let d_rho = right.rho - left.rho;
    let d_p = right.p - left.p;
    let d_vn = vn_r - vn_l;
    let d_vel = right.vel - left.vel;

    let alpha1 = (d_p - rho_t * a_t * d_vn) / (2.0 * a2);
    let alpha2 = d_rho - d_p / a2;
    let alpha3 = (d_p + rho_t * a_t * d_vn) / (2.0 * a2);

    let l1 = entropy_fix(vn - a_t, a_t);
    let l2 = vn.abs();
    let l3 = entropy_fix(vn + a_t, a_t);

    // 特征向量贡献（平均流 5 个方程）
    let mut diss = [0.0_f64; 5];

    // 声波 ṽn − ã
    diss[0] += l1 * alpha1;
    diss[1] += l1 * alpha1 * (vel_t.x - a_t * normal.x);
    diss[2] += l1 * alpha1 * (vel_t.y - a_t * normal.y);
    diss[3] += l1 * alpha1 * (vel_t.z - a_t * normal.z);
    diss[4] += l1 * alpha1 * (h_t - a_t * vn);

    // 熵波与剪切波 ṽn
    diss[0] += l2 * alpha2;
    diss[1] += l2 * (alpha2 * vel_t.x + rho_t * (d_vel.x - d_vn * normal.x));
    diss[2] += l2 * (alpha2 * vel_t.y + rho_t * (d_vel.y - d_vn * normal.y));
    diss[3] += l2 * (alpha2 * vel_t.z + rho_t * (d_vel.z - d_vn * normal.z));
    diss[4] += l2
        * (alpha2 * 0.5 * vel_t.length_squared()
            + rho_t * (vel_t.dot(d_vel) - vn * d_vn));

    // 声波 ṽn + ã
    diss[0] += l3 * alpha3;
    diss[1] += l3 * alpha3 * (vel_t.x + a_t * normal.x);
    diss[2] += l3 * alpha3 * (vel_t.y + a_t * normal.y);
    diss[3] += l3 * alpha3 * (vel_t.z + a_t * normal.z);
    diss[4] += l3 * alpha3 * (h_t + a_t * vn);

    let f_l = left.convective_flux(normal, eos);
    let f_r = right.convective_flux(normal, eos);

    let mut flux = EqArray::ZERO;
    for n in 0..5 {
        flux[n] = 0.5 * (f_l[n] + f_r[n]) - 0.5 * diss[n];
    }

    // 湍流标量：按界面质量通量被动迎风
    let mass = flux[0];
    if mass >= 0.0 {
        flux[5] = mass * left.k;
        flux[6] = mass * left.omega;
    } else {
        flux[5] = mass * right.k;
        flux[6] = mass * right.omega;
    }

    flux
}
