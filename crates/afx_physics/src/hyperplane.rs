// crates/afx_physics/src/hyperplane.rs

//! 超平面排序
//!
//! 超平面是块内 i+j+k = 常数的单元集合。LU-SGS 沿超平面扫掠，
//! 保证正向扫掠访问单元 c 时其三个低侧邻居都已更新（它们位于
//! 更小的超平面上），从而无需存储通量雅可比。

/// 生成 (nI, nJ, nK) 块的超平面访问序
///
/// 返回物理单元索引三元组，按超平面序排列；每个单元恰好出现一次。
pub fn hyperplane_order(ni: usize, nj: usize, nk: usize) -> Vec<(usize, usize, usize)> {
    let num_planes = ni + nj + nk - 2;
    let mut order = Vec::with_capacity(ni * nj * nk);

    for p in 0..num_planes {
        for k in 0..nk {
            if k > p {
                break;
            }
            for j in 0..nj {
                if j + k > p {
                    break;
                }
                let i = p - j - k;
                if i < ni {
                    order.push((i, j, k));
                }
            }
        }
    }
    order
}
