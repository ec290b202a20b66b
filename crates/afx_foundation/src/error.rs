// crates/afx_foundation/src/error.rs

//! 统一错误类型
//!
//! 求解器区分的错误类别与传播策略：
//!
//! - [`AfxError::ConfigMismatch`]: 配置与运行环境不一致（手动分解的
//!   worker 数与块数不等、未识别的时间积分/矩阵求解器、幽灵填充遇到
//!   未知边界标签）。致命，作业终止。
//! - [`AfxError::ShapeMismatch`]: `insert` 或切片交换的源形状与目标
//!   计算范围不等。在检测点致命。
//! - [`AfxError::BoundaryMismatch`]: 交界面两侧重映射后的总单元数
//!   不一致。在检测点致命。
//! - [`AfxError::HaloProtocol`]: 收到的缓冲区大小与描述符不符、交界
//!   面记录的方向不在 {i,j,k} 内。致命，作业终止。
//!
//! 瞬态条件（对端幽灵条带体积为零的 T 形交汇）不经过本类型传播，
//! 由交界面记录的边缘调整位就地吸收。

use thiserror::Error;

/// 统一结果类型别名
pub type AfxResult<T> = Result<T, AfxError>;

/// AeroFlux 基础错误
#[derive(Debug, Error)]
pub enum AfxError {
    /// 配置与运行环境不一致
    #[error("配置不匹配: {0}")]
    ConfigMismatch(String),

    /// 数组形状不匹配
    #[error("形状不匹配: {name} 期望 {expected:?}, 实际 {actual:?}")]
    ShapeMismatch {
        /// 操作名称（用于诊断）
        name: &'static str,
        /// 期望形状 (ni, nj, nk)
        expected: [usize; 3],
        /// 实际形状 (ni, nj, nk)
        actual: [usize; 3],
    },

    /// 交界面两侧单元数不一致
    #[error("交界面不匹配: 块 {block_first}/{block_second} 两侧单元数 {cells_first} != {cells_second}")]
    BoundaryMismatch {
        /// 第一侧全局块号
        block_first: usize,
        /// 第二侧全局块号
        block_second: usize,
        /// 第一侧重映射后的单元数
        cells_first: usize,
        /// 第二侧重映射后的单元数
        cells_second: usize,
    },

    /// halo 缓冲区协议违例
    #[error("halo 协议错误: {0}")]
    HaloProtocol(String),

    /// IO 操作失败
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AfxError {
    /// 创建配置不匹配错误
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigMismatch(message.into())
    }

    /// 创建 halo 协议错误
    #[inline]
    pub fn halo(message: impl Into<String>) -> Self {
        Self::HaloProtocol(message.into())
    }

    /// 校验形状相等，不等则返回 [`AfxError::ShapeMismatch`]
    #[inline]
    pub fn check_shape(
        name: &'static str,
        expected: [usize; 3],
        actual: [usize; 3],
    ) -> AfxResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::ShapeMismatch {
                name,
                expected,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_display() {
        let err = AfxError::config("时间积分 'rk9' 未识别");
        assert!(err.to_string().contains("rk9"));
    }

    #[test]
    fn test_check_shape_success() {
        assert!(AfxError::check_shape("insert", [4, 4, 4], [4, 4, 4]).is_ok());
    }

    #[test]
    fn test_check_shape_failure() {
        let result = AfxError::check_shape("insert", [4, 4, 4], [4, 4, 2]);
        assert!(matches!(
            result.unwrap_err(),
            AfxError::ShapeMismatch { name: "insert", .. }
        ));
    }

    #[test]
    fn test_boundary_mismatch_display() {
        let err = AfxError::BoundaryMismatch {
            block_first: 0,
            block_second: 1,
            cells_first: 16,
            cells_second: 12,
        };
        assert!(err.to_string().contains("16"));
        assert!(err.to_string().contains("12"));
    }
}
