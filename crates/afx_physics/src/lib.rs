// crates/afx_physics/src/lib.rs

//! AeroFlux 物理求解层
//!
//! 提供按块的可压缩 Navier-Stokes 数值核心：
//!
//! - 状态模型 (state): 守恒量记录与原始变量视图
//! - 物性 (eos): 理想气体状态方程与 Sutherland 黏性律
//! - 湍流能力集 (turbulence): 模型以 trait 注入，闭合方程属外部协作者
//! - 数值格式 (schemes): Roe 通量、κ-MUSCL 重构、Green-Gauss 黏性通量
//! - 块核心 (block): 几何、幽灵填充、通量装配、时间推进、LU-SGS/DPLUR、
//!   切分/合并
//! - 边界描述符 (boundary) 与交界面记录 (connection)
//! - 残差记录 (residual) 与超平面排序 (hyperplane)
//!
//! # 索引约定
//!
//! 全模块使用成对的 (物理, 填充) 索引：填充索引 = 物理索引 + Gh。
//! 循环同时推进两个变量，不把这层关系藏进视图。

#![warn(clippy::all)]

pub mod block;
pub mod boundary;
pub mod connection;
pub mod eos;
pub mod hyperplane;
pub mod pairing;
pub mod residual;
pub mod schemes;
pub mod state;
pub mod turbulence;

pub use block::Block;
pub use boundary::{BcKind, BlockBoundary, BoundarySurface};
pub use connection::BlockConnection;
pub use eos::{IdealGas, Sutherland};
pub use hyperplane::hyperplane_order;
pub use pairing::{find_orientation, pair_interblocks};
pub use residual::{ResidLinf, ResidualL2};
pub use state::{EqArray, Primitive, NUM_EQNS};
pub use turbulence::{create_turbulence, NoTurbulence, TurbulenceModel};
