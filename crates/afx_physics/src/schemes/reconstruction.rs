// crates/afx_physics/src/schemes/reconstruction.rs

//! κ-MUSCL 面值重构
//!
//! 二阶模式下，面状态由中心单元向面外推：
//!
//! ```text
//! U_f = U_c + (d_c/2) · (ψ/2) · [ (1−κψ) s⁻ + (1+κψ) s⁺ ]
//! ```
//!
//! 其中 s⁻、s⁺ 为迎风/顺风单侧斜率，按相邻三个面心之间的距离加权；
//! ψ = ψ(r) 为限制器，r = s⁺/s⁻。均匀网格、ψ=1 时退化为经典
//! κ 格式。一阶模式直接取相邻单元值，不经过本模块。
//!
//! 重构在原始变量分量上逐一进行。

use afx_config::LimiterKind;

use crate::state::NUM_EQNS;

/// 判定斜率为零的阈值
const SLOPE_EPS: f64 = 1e-30;

/// 限制器取值 ψ(r)
///
/// `r` 为顺风斜率与迎风斜率之比。
#[inline]
pub fn limiter_value(kind: LimiterKind, r: f64) -> f64 {
    match kind {
        LimiterKind::None => 1.0,
        LimiterKind::Minmod => r.min(1.0).max(0.0),
        LimiterKind::VanAlbada => {
            if r > 0.0 {
                (r * r + r) / (r * r + 1.0)
            } else {
                0.0
            }
        }
    }
}

/// κ-MUSCL 重构一个面状态
///
/// - `center`: 被外推的单元（迎风侧第一个单元）
/// - `upwind`: 其后方单元
/// - `downwind`: 面另一侧单元
/// - `w_cell` / `w_up` / `w_dn`: 三个单元沿重构方向的宽度
///   （相邻面心距离）
pub fn muscl_face(
    center: &[f64; NUM_EQNS],
    upwind: &[f64; NUM_EQNS],
    downwind: &[f64; NUM_EQNS],
    kappa: f64,
    kind: LimiterKind,
    w_cell: f64,
    w_up: f64,
    w_dn: f64,
) -> [f64; NUM_EQNS] {
    let mut face = *center;
    let du = 0.5 * (w_up + w_cell);
    let dd = 0.5 * (w_dn + w_cell);

    for n in 0..NUM_EQNS {
        let s_up = (center[n] - upwind[n]) / du;
        let s_dn = (downwind[n] - center[n]) / dd;

        let psi = if s_up.abs() < SLOPE_EPS {
            // 迎风斜率消失：局部退化到一阶
            if s_dn.abs() < SLOPE_EPS {
                1.0
            } else {
                0.0
            }
        } else {
            limiter_value(kind, s_dn / s_up)
        };

        face[n] = center[n]
            + 0.5 * w_cell * 0.5 * psi * ((1.0 - kappa * psi) * s_up + (1.0 + kappa * psi) * s_dn);
    }
    face
}
