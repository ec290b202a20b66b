// crates/afx_physics/src/eos.rs

//! 物性协作者：状态方程与黏性律
//!
//! 两者都是纯函数，接口在此枚举，便于被块核心统一调用。
//!
//! # 无量纲约定
//!
//! 以来流声速与参考长度无量纲化后：
//!
//! ```text
//! T = γ p / ρ,    a² = γ p / ρ,    来流 T∞ = 1, μ(1) = 1
//! ```

use glam::DVec3;

// ============================================================
// 理想气体
// ============================================================

/// 理想气体状态方程（无量纲形式）
#[derive(Debug, Clone, Copy)]
pub struct IdealGas {
    gamma: f64,
}

impl IdealGas {
    /// 创建状态方程
    #[inline]
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// 比热比 γ
    #[inline]
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// 无量纲温度 T = γ p / ρ
    #[inline]
    pub fn temperature(&self, rho: f64, p: f64) -> f64 {
        self.gamma * p / rho
    }

    /// 声速 a = √(γ p / ρ)
    #[inline]
    pub fn sound_speed(&self, rho: f64, p: f64) -> f64 {
        (self.gamma * p / rho).sqrt()
    }

    /// 单位体积总能 E = p/(γ-1) + ½ ρ |v|²
    #[inline]
    pub fn energy(&self, rho: f64, p: f64, vel: DVec3) -> f64 {
        p / (self.gamma - 1.0) + 0.5 * rho * vel.length_squared()
    }

    /// 由总能反解压力
    #[inline]
    pub fn pressure(&self, rho: f64, energy: f64, vel: DVec3) -> f64 {
        (self.gamma - 1.0) * (energy - 0.5 * rho * vel.length_squared())
    }

    /// 单位质量总焓 H = (E + p)/ρ
    #[inline]
    pub fn enthalpy(&self, rho: f64, p: f64, vel: DVec3) -> f64 {
        (self.energy(rho, p, vel) + p) / rho
    }
}

impl Default for IdealGas {
    fn default() -> Self {
        Self::new(1.4)
    }
}

// ============================================================
// Sutherland 黏性律
// ============================================================

/// Sutherland 黏性律（无量纲形式）
///
/// μ(T) = T^{3/2} (1+S)/(T+S)，以来流温度无量纲化后 μ(1) = 1。
#[derive(Debug, Clone, Copy)]
pub struct Sutherland {
    /// 无量纲 Sutherland 常数 S / T_ref
    s: f64,
    /// 黏性通量整体缩放 M∞/Re
    scale: f64,
}

impl Sutherland {
    /// 标准空气的 Sutherland 常数与参考温度之比 (110.4 K / 288.15 K)
    pub const S_AIR: f64 = 110.4 / 288.15;

    /// 创建黏性律
    ///
    /// `mach` 与 `reynolds` 给出黏性通量的无量纲缩放 M∞/Re。
    #[inline]
    pub fn new(mach: f64, reynolds: f64) -> Self {
        Self {
            s: Self::S_AIR,
            scale: if mach > 0.0 { mach / reynolds } else { 1.0 / reynolds },
        }
    }

    /// 层流黏性 μ(T)（未缩放）
    #[inline]
    pub fn viscosity(&self, t: f64) -> f64 {
        t.powf(1.5) * (1.0 + self.s) / (t + self.s)
    }

    /// 黏性通量缩放因子 M∞/Re
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// 已缩放的有效层流黏性
    #[inline]
    pub fn effective_viscosity(&self, t: f64) -> f64 {
        self.scale * self.viscosity(t)
    }
}
