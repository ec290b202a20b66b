// crates/afx_physics/src/schemes/viscous.rs

//! Green-Gauss 梯度与黏性通量
//!
//! 梯度在以面为中心的替代控制体上用 Green 定理计算：
//!
//! ```text
//! ∇φ ≈ (1/V) Σ_f φ_f A_f      （面积向量指向控制体外）
//! ```
//!
//! 替代控制体由相邻两单元的面与体积平均而来，等效三维 10 单元
//! 模板，避免奇偶解耦。约定低侧面取负号、高侧面取正号。

use glam::{DMat3, DVec3};

use crate::eos::IdealGas;
use crate::state::{EqArray, Primitive};

/// 向量场的 Green-Gauss 梯度
///
/// 返回张量 G，列 c 为 ∂vel/∂x_c，即 `G * n` 得到法向方向导数。
/// 六个面按 i-低/高、j-低/高、k-低/高给出面值与面积向量。
#[allow(clippy::too_many_arguments)]
pub fn vector_grad_gg(
    vil: DVec3,
    viu: DVec3,
    vjl: DVec3,
    vju: DVec3,
    vkl: DVec3,
    vku: DVec3,
    ail: DVec3,
    aiu: DVec3,
    ajl: DVec3,
    aju: DVec3,
    akl: DVec3,
    aku: DVec3,
    vol: f64,
) -> DMat3 {
    let inv_vol = 1.0 / vol;
    // 列 c: Σ v * A_c
    let col = |c: usize| -> DVec3 {
        (viu * aiu[c] - vil * ail[c] + vju * aju[c] - vjl * ajl[c] + vku * aku[c] - vkl * akl[c])
            * inv_vol
    };
    DMat3::from_cols(col(0), col(1), col(2))
}

/// 标量场的 Green-Gauss 梯度
#[allow(clippy::too_many_arguments)]
pub fn scalar_grad_gg(
    til: f64,
    tiu: f64,
    tjl: f64,
    tju: f64,
    tkl: f64,
    tku: f64,
    ail: DVec3,
    aiu: DVec3,
    ajl: DVec3,
    aju: DVec3,
    akl: DVec3,
    aku: DVec3,
    vol: f64,
) -> DVec3 {
    (aiu * tiu - ail * til + aju * tju - ajl * tjl + aku * tku - akl * tkl) / vol
}

/// 法向黏性应力 τ·n
///
/// 第二黏性系数按 Stokes 假设 λ = −2/3 (μ+μ_t)。
#[inline]
pub fn tau_normal(vel_grad: &DMat3, normal: DVec3, mu: f64, mu_t: f64) -> DVec3 {
    let mu_eff = mu + mu_t;
    let lambda = -2.0 / 3.0 * mu_eff;
    let trace = vel_grad.x_axis.x + vel_grad.y_axis.y + vel_grad.z_axis.z;
    normal * (lambda * trace) + (*vel_grad * normal + vel_grad.transpose() * normal) * mu_eff
}

/// 黏性通量记录（沿面法向，未乘面积）
///
/// 能量分量含应力做功与热传导；湍流标量分量为扩散通量，扩散系数
/// 由湍流能力集给出的 σ_k / σ_ω 加权。
#[allow(clippy::too_many_arguments)]
pub fn viscous_flux(
    face: &Primitive,
    vel_grad: &DMat3,
    t_grad: DVec3,
    k_grad: DVec3,
    w_grad: DVec3,
    mu: f64,
    mu_t: f64,
    normal: DVec3,
    eos: &IdealGas,
    prandtl: f64,
    prandtl_t: f64,
    sigma_k: f64,
    sigma_w: f64,
) -> EqArray {
    let tau = tau_normal(vel_grad, normal, mu, mu_t);
    let conduct = (mu / prandtl + mu_t / prandtl_t) / (eos.gamma() - 1.0);

    let mut flux = EqArray::ZERO;
    flux[1] = tau.x;
    flux[2] = tau.y;
    flux[3] = tau.z;
    flux[4] = tau.dot(face.vel) + conduct * t_grad.dot(normal);
    flux[5] = (mu + sigma_k * mu_t) * k_grad.dot(normal);
    flux[6] = (mu + sigma_w * mu_t) * w_grad.dot(normal);
    flux
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 单位立方体控制体的六个面积向量
    fn unit_cube_areas() -> [DVec3; 6] {
        [
            DVec3::X,
            DVec3::X,
            DVec3::Y,
            DVec3::Y,
            DVec3::Z,
            DVec3::Z,
        ]
    }

    #[test]
    fn test_scalar_grad_linear_field() {
        // φ = 2x + 3y − z，单位立方体面心处取值
        let [ail, aiu, ajl, aju, akl, aku] = unit_cube_areas();
        let g = scalar_grad_gg(
            0.0, 2.0, // x = 0, 1 面
            0.0, 3.0, // y 面
            0.0, -1.0, // z 面
            ail, aiu, ajl, aju, akl, aku, 1.0,
        );
        assert!((g - DVec3::new(2.0, 3.0, -1.0)).length() < 1e-14);
    }

    #[test]
    fn test_vector_grad_shear() {
        // u = (y, 0, 0): 仅 ∂u/∂y = 1
        let [ail, aiu, ajl, aju, akl, aku] = unit_cube_areas();
        let half = DVec3::new(0.5, 0.0, 0.0);
        let g = vector_grad_gg(
            half,
            half,
            DVec3::ZERO,
            DVec3::new(1.0, 0.0, 0.0),
            half,
            half,
            ail,
            aiu,
            ajl,
            aju,
            akl,
            aku,
            1.0,
        );
        // 列 1 (= ∂vel/∂y) 为 (1, 0, 0)
        assert!((g.y_axis - DVec3::X).length() < 1e-14);
        assert!(g.x_axis.length() < 1e-14);
        assert!(g.z_axis.length() < 1e-14);
    }

    #[test]
    fn test_tau_normal_pure_shear() {
        // ∂u/∂y = 1，法向 y：τ·n = μ (∂u/∂y) x̂
        let g = DMat3::from_cols(DVec3::ZERO, DVec3::X, DVec3::ZERO);
        let tau = tau_normal(&g, DVec3::Y, 2.0, 0.0);
        assert!((tau - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-14);
    }

    #[test]
    fn test_viscous_flux_zero_gradients() {
        let eos = IdealGas::new(1.4);
        let face = Primitive {
            rho: 1.0,
            vel: DVec3::new(0.5, 0.0, 0.0),
            p: 1.0 / 1.4,
            k: 0.0,
            omega: 0.0,
        };
        let f = viscous_flux(
            &face,
            &DMat3::ZERO,
            DVec3::ZERO,
            DVec3::ZERO,
            DVec3::ZERO,
            1.0,
            0.0,
            DVec3::X,
            &eos,
            0.72,
            0.9,
            0.5,
            0.5,
        );
        for n in 0..7 {
            assert_eq!(f[n], 0.0);
        }
    }
}
