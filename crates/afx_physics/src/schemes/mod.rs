// crates/afx_physics/src/schemes/mod.rs

//! 数值格式
//!
//! - [`roe`]: Roe 近似黎曼求解器（含熵修正）
//! - [`reconstruction`]: κ-MUSCL 面值重构与斜率限制器
//! - [`viscous`]: Green-Gauss 梯度与黏性通量

pub mod reconstruction;
pub mod roe;
pub mod viscous;

pub use reconstruction::{limiter_value, muscl_face};
pub use roe::roe_flux;
pub use viscous::{scalar_grad_gg, tau_normal, vector_grad_gg, viscous_flux};
