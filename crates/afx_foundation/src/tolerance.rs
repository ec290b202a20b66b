// crates/afx_foundation/src/tolerance.rs

//! 数值容差常量
//!
//! 全项目共享的比较容差，避免各模块各自定义魔法数。

/// 几何一致性比较容差（机器精度量级）
pub const GEOM_EPS: f64 = 1e-12;

/// 守恒量比较容差（用于分区边界守恒性检验）
pub const CONSERVATION_EPS: f64 = 1e-12;

/// 判定幽灵体积未填充的哨兵阈值
///
/// 幽灵体积初始化为零；交换时读到低于该值的体积视为对端尚未填充。
pub const UNFILLED_VOL: f64 = 1e-300;

/// 避免除零的通用小量
pub const DIV_EPS: f64 = 1e-30;

/// 近似相等判断
#[inline]
pub fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq() {
        assert!(approx_eq(1.0, 1.0 + 1e-13, GEOM_EPS));
        assert!(!approx_eq(1.0, 1.1, GEOM_EPS));
    }
}
