// crates/afx_physics/src/state.rs

//! 状态模型
//!
//! 单元状态是固定元数的守恒量记录：密度、三个动量分量、总能以及
//! 两个湍流标量（湍动能 k、比耗散率 ω）。重构与边界条件在原始变量
//! 视图 (ρ, u, v, w, p, k, ω) 上进行，两个视图之间经状态方程纯函数
//! 互换。
//!
//! [`EqArray`] 同时充当守恒状态、残差与隐式修正量 ΔU 的代数载体，
//! 逐分量算术运算在其上定义。

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use glam::DVec3;

use crate::eos::IdealGas;

/// 方程数：ρ, ρu, ρv, ρw, E, ρk, ρω
pub const NUM_EQNS: usize = 7;

// ============================================================
// 守恒量记录
// ============================================================

/// 固定元数的方程数组
///
/// 守恒状态、残差与 ΔU 共用本类型；分量次序为
/// `[ρ, ρu, ρv, ρw, E, ρk, ρω]`。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqArray(pub [f64; NUM_EQNS]);

impl EqArray {
    /// 全零记录
    pub const ZERO: Self = Self([0.0; NUM_EQNS]);

    /// 密度
    #[inline]
    pub fn rho(&self) -> f64 {
        self.0[0]
    }

    /// 动量向量
    #[inline]
    pub fn momentum(&self) -> DVec3 {
        DVec3::new(self.0[1], self.0[2], self.0[3])
    }

    /// 总能
    #[inline]
    pub fn energy(&self) -> f64 {
        self.0[4]
    }

    /// ρk
    #[inline]
    pub fn rho_k(&self) -> f64 {
        self.0[5]
    }

    /// ρω
    #[inline]
    pub fn rho_omega(&self) -> f64 {
        self.0[6]
    }

    /// 逐分量平方（L2 累加用）
    #[inline]
    pub fn squared(&self) -> Self {
        let mut out = [0.0; NUM_EQNS];
        for (o, v) in out.iter_mut().zip(self.0.iter()) {
            *o = v * v;
        }
        Self(out)
    }

    /// 逐分量绝对值的最大分量及其序号
    #[inline]
    pub fn abs_max(&self) -> (f64, usize) {
        let mut best = (0.0_f64, 0);
        for (n, v) in self.0.iter().enumerate() {
            if v.abs() > best.0 {
                best = (v.abs(), n);
            }
        }
        best
    }

    /// 全分量是否有限
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Default for EqArray {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Index<usize> for EqArray {
    type Output = f64;

    #[inline]
    fn index(&self, n: usize) -> &f64 {
        &self.0[n]
    }
}

impl IndexMut<usize> for EqArray {
    #[inline]
    fn index_mut(&mut self, n: usize) -> &mut f64 {
        &mut self.0[n]
    }
}

impl Add for EqArray {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0.iter()) {
            *o += r;
        }
        Self(out)
    }
}

impl Sub for EqArray {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0.iter()) {
            *o -= r;
        }
        Self(out)
    }
}

impl AddAssign for EqArray {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        for (o, r) in self.0.iter_mut().zip(rhs.0.iter()) {
            *o += r;
        }
    }
}

impl SubAssign for EqArray {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        for (o, r) in self.0.iter_mut().zip(rhs.0.iter()) {
            *o -= r;
        }
    }
}

impl Mul<f64> for EqArray {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        let mut out = self.0;
        for o in out.iter_mut() {
            *o *= rhs;
        }
        Self(out)
    }
}

impl Neg for EqArray {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self * -1.0
    }
}

// ============================================================
// 原始变量视图
// ============================================================

/// 原始变量 (ρ, u, v, w, p, k, ω)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    /// 密度
    pub rho: f64,
    /// 速度
    pub vel: DVec3,
    /// 压力
    pub p: f64,
    /// 湍动能
    pub k: f64,
    /// 比耗散率
    pub omega: f64,
}

impl Primitive {
    /// 由分量数组构造，次序 [ρ, u, v, w, p, k, ω]
    #[inline]
    pub fn from_array(a: [f64; NUM_EQNS]) -> Self {
        Self {
            rho: a[0],
            vel: DVec3::new(a[1], a[2], a[3]),
            p: a[4],
            k: a[5],
            omega: a[6],
        }
    }

    /// 转为分量数组，次序 [ρ, u, v, w, p, k, ω]
    #[inline]
    pub fn to_array(&self) -> [f64; NUM_EQNS] {
        [
            self.rho, self.vel.x, self.vel.y, self.vel.z, self.p, self.k, self.omega,
        ]
    }

    /// 由守恒量转换（状态方程纯函数）
    #[inline]
    pub fn from_conserved(u: &EqArray, eos: &IdealGas) -> Self {
        let rho = u.rho();
        let vel = u.momentum() / rho;
        let p = eos.pressure(rho, u.energy(), vel);
        Self {
            rho,
            vel,
            p,
            k: u.rho_k() / rho,
            omega: u.rho_omega() / rho,
        }
    }

    /// 转为守恒量（状态方程纯函数）
    #[inline]
    pub fn to_conserved(&self, eos: &IdealGas) -> EqArray {
        EqArray([
            self.rho,
            self.rho * self.vel.x,
            self.rho * self.vel.y,
            self.rho * self.vel.z,
            eos.energy(self.rho, self.p, self.vel),
            self.rho * self.k,
            self.rho * self.omega,
        ])
    }

    /// 声速
    #[inline]
    pub fn sound_speed(&self, eos: &IdealGas) -> f64 {
        eos.sound_speed(self.rho, self.p)
    }

    /// 无量纲温度
    #[inline]
    pub fn temperature(&self, eos: &IdealGas) -> f64 {
        eos.temperature(self.rho, self.p)
    }

    /// 面法向的对流通量 F(U)·n̂
    ///
    /// 用于 Roe 通量的中心部分与隐式算子的矩阵自由通量差。
    #[inline]
    pub fn convective_flux(&self, normal: DVec3, eos: &IdealGas) -> EqArray {
        let vn = self.vel.dot(normal);
        let h = eos.enthalpy(self.rho, self.p, self.vel);
        EqArray([
            self.rho * vn,
            self.rho * vn * self.vel.x + self.p * normal.x,
            self.rho * vn * self.vel.y + self.p * normal.y,
            self.rho * vn * self.vel.z + self.p * normal.z,
            self.rho * vn * h,
            self.rho * vn * self.k,
            self.rho * vn * self.omega,
        ])
    }

    /// 状态是否物理（正密度正压力且有限）
    #[inline]
    pub fn is_physical(&self) -> bool {
        self.rho > 0.0
            && self.p > 0.0
            && self.rho.is_finite()
            && self.p.is_finite()
            && self.vel.is_finite()
    }
}
