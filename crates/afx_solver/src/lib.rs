// crates/afx_solver/src/lib.rs

//! AeroFlux 求解驱动
//!
//! 把块核心与通信层接成完整的迭代回路：
//!
//! 1. 协调者侧：幽灵几何合成、几何交界面交换（含 T 形交汇检测）、
//!    棱几何、手动分解、连接广播、几何散发
//! 2. 每次迭代：幽灵填充 → 残差装配 → 时间步 → 显式更新或隐式
//!    扫掠 → L2/L∞ 全局归约
//! 3. 结束后解收集回协调者
//!
//! 全部 worker 以 SPMD 方式调用 [`run_simulation`]。

#![warn(clippy::all)]

pub mod case;
pub mod driver;

pub use case::build_case;
pub use driver::{run_simulation, SolveOutcome};
