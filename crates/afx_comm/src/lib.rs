// crates/afx_comm/src/lib.rs

//! AeroFlux 通信层
//!
//! 把 MPI 形态的消息契约落成 Rust trait 与两个基底实现：
//!
//! - [`MessageLayer`]: rank/size、点对点收发、sendrecv、广播、
//!   scatter、归约所需的收集原语
//! - [`SoloComm`]: 单 worker 进程内基底
//! - [`ThreadComm`]: 同进程多 rank 基底（每 rank 一个信箱，
//!   parking_lot 互斥 + 条件变量）
//!
//! 其上是 halo 字节编解码 ([`codec`])、分解驱动 ([`decompose`])、
//! 逐迭代交换编排 ([`exchange`]) 与残差归约 ([`reduce`])。
//!
//! 阻塞只发生在消息层：pack/unpack 为本地操作；send/recv 阻塞到
//! 对端调用完成；广播、scatter 与归约使全体 worker 同步。

#![warn(clippy::all)]

pub mod codec;
pub mod decompose;
pub mod exchange;
pub mod layer;
pub mod reduce;

pub use decompose::{broadcast_connections, get_blocks, manual_decomposition, send_blocks};
pub use exchange::{get_boundary_conditions, swap_implicit_updates};
pub use layer::{MessageLayer, SoloComm, ThreadComm};
pub use reduce::reduce_residuals;
