// crates/afx_physics/src/turbulence.rs

//! 湍流能力集
//!
//! 闭合方程属于外部协作者；核心只消费此处枚举的能力：涡黏、扩散
//! 加权系数、源项、来流值与谱半径放大。模型经工厂按名称注入，
//! 未识别的名称是致命配置错误。

use std::sync::Arc;

use afx_foundation::{AfxError, AfxResult};
use glam::{DMat3, DVec3};

use crate::state::{EqArray, Primitive};

/// 湍流模型能力集
pub trait TurbulenceModel: Send + Sync {
    /// 模型名称
    fn name(&self) -> &'static str;

    /// 是否为空模型（无湍流方程贡献）
    fn is_none(&self) -> bool {
        false
    }

    /// 涡黏 μ_t
    fn eddy_viscosity(&self, prim: &Primitive, mu: f64, wall_dist: f64) -> f64;

    /// k 方程扩散加权 σ_k
    fn sigma_k(&self) -> f64 {
        0.5
    }

    /// ω 方程扩散加权 σ_ω
    fn sigma_w(&self) -> f64 {
        0.5
    }

    /// 单元源项 S（残差累加 −S·V）
    ///
    /// 仅湍流标量分量非零。
    fn source(
        &self,
        prim: &Primitive,
        vel_grad: &DMat3,
        k_grad: DVec3,
        w_grad: DVec3,
        wall_dist: f64,
        mu: f64,
    ) -> EqArray;

    /// 来流湍流标量 (k∞, ω∞)
    fn freestream(&self) -> (f64, f64) {
        (0.0, 0.0)
    }

    /// 谱半径的湍流放大因子（隐式对角用）
    fn spectral_factor(&self) -> f64 {
        1.0
    }
}

/// 空模型：层流或无黏计算
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTurbulence;

impl TurbulenceModel for NoTurbulence {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_none(&self) -> bool {
        true
    }

    fn eddy_viscosity(&self, _prim: &Primitive, _mu: f64, _wall_dist: f64) -> f64 {
        0.0
    }

    fn source(
        &self,
        _prim: &Primitive,
        _vel_grad: &DMat3,
        _k_grad: DVec3,
        _w_grad: DVec3,
        _wall_dist: f64,
        _mu: f64,
    ) -> EqArray {
        EqArray::ZERO
    }
}

/// 按名称创建湍流模型
pub fn create_turbulence(name: &str) -> AfxResult<Arc<dyn TurbulenceModel>> {
    match name {
        "none" => Ok(Arc::new(NoTurbulence)),
        other => Err(AfxError::config(format!(
            "湍流模型 '{}' 未识别, 可选: none",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory() {
        assert!(create_turbulence("none").unwrap().is_none());
        assert!(create_turbulence("sst2003").is_err());
    }

    #[test]
    fn test_no_model_contributes_nothing() {
        let model = NoTurbulence;
        let prim = Primitive {
            rho: 1.0,
            vel: DVec3::ZERO,
            p: 1.0,
            k: 0.1,
            omega: 10.0,
        };
        assert_eq!(model.eddy_viscosity(&prim, 1.0, 0.5), 0.0);
        let s = model.source(&prim, &DMat3::ZERO, DVec3::ZERO, DVec3::ZERO, 0.5, 1.0);
        assert_eq!(s, EqArray::ZERO);
    }
}
