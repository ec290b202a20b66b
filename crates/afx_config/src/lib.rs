// crates/afx_config/src/lib.rs

//! AeroFlux 配置层
//!
//! 提供求解器消费的已解析输入记录 [`SolverInput`]。输入卡解析属于
//! 外部协作者；本层只负责把解析结果落到强类型字段、做取值校验，
//! 并从 JSON 读入。
//!
//! # 识别的选项
//!
//! - 时间积分: `explicitEuler` / `rk4` / `implicitEuler` / `bdf2`
//! - 精度阶数: `first` / `second`
//! - 限制器: `none` / `minmod` / `vanAlbada`
//! - 矩阵求解器: `lusgs` / `blusgs` / `dplur` / `bdplur`
//! - 方程组: `euler` / `laminar` / `turbulent`
//!
//! 未识别的取值一律返回 [`AfxError::ConfigMismatch`] 并列出合法选项。

#![warn(clippy::all)]

pub mod input;

pub use input::{
    CaseConfig, EquationSet, LimiterKind, MatrixSolver, Order, SolverInput, TimeIntegration,
};
