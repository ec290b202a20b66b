// crates/afx_physics/src/block/mod.rs

//! 块核心
//!
//! [`Block`] 拥有一个结构化子网格的状态、几何、残差与时间步数据，
//! 并实现全部通量装配与时间推进操作。
//!
//! # 数组布局
//!
//! - `state`、`vol`、`center` 与六个面数组带 `gh` 层幽灵
//! - `residual`、`dt`、`avg_wave_speed`、`wall_dist` 只覆盖物理单元
//! - `d` 方向的面数组沿 `d` 多一个条目
//! - 物理面的面积单位向量指向索引增大方向
//!
//! 角幽灵（三个坐标都在物理范围外）不被读取；分配但不初始化有效值。

mod flux;
mod ghost_geom;
mod ghost_state;
mod implicit;
mod slices;
mod split_join;
mod swap;
mod update;

pub use flux::VISC_RAD_COEFF;
pub use ghost_state::ghost_state;
pub use slices::{GeomSlice, StateSlice};
pub use swap::{put_cell_slice, swap_geom_slices, swap_state_slices, swap_update_slices};
pub use update::RK4_ALPHA;

use afx_core::{Array3, Direction, UnitVec3Mag};
use glam::DVec3;

use crate::boundary::BlockBoundary;
use crate::eos::IdealGas;
use crate::state::{EqArray, Primitive};

/// 结构化网格块
#[derive(Debug, Clone)]
pub struct Block {
    /// 物理单元数 i
    ni: usize,
    /// 物理单元数 j
    nj: usize,
    /// 物理单元数 k
    nk: usize,
    /// 幽灵层数
    gh: usize,

    /// 父块全局号
    pub parent_block: usize,
    /// 在父块中的子范围 (iS, iE, jS, jE, kS, kE)
    pub parent_range: [usize; 6],
    /// 所属 worker rank
    pub rank: usize,
    /// 全局位置（解算域内的块序号）
    pub global_pos: usize,
    /// worker 本地位置
    pub local_pos: usize,

    /// 守恒状态（带幽灵）
    pub state: Array3<EqArray>,
    /// 时间层 n 的解（仅物理单元）
    pub sol_time_n: Array3<EqArray>,
    /// 时间层 n-1 的解（仅物理单元）
    pub sol_time_nm1: Array3<EqArray>,
    /// 残差（仅物理单元）
    pub residual: Array3<EqArray>,
    /// 局部时间步（仅物理单元）
    pub dt: Array3<f64>,
    /// RK4 阶段间冻结的时间步 Δtⁿ（仅物理单元）
    pub rk_dt: Array3<f64>,
    /// 单元谱半径和（仅物理单元）
    pub avg_wave_speed: Array3<f64>,
    /// 壁面距离（仅物理单元）
    pub wall_dist: Array3<f64>,

    /// 单元体积（带幽灵；幽灵初始为零哨兵）
    pub vol: Array3<f64>,
    /// 单元中心（带幽灵）
    pub center: Array3<DVec3>,
    /// 面积向量，按 i/j/k 面（带幽灵，所在方向多一条目）
    pub f_area: [Array3<UnitVec3Mag>; 3],
    /// 面中心，按 i/j/k 面
    pub f_center: [Array3<DVec3>; 3],

    /// 边界描述符
    pub bc: BlockBoundary,
}

impl Block {
    /// 按尺寸分配块；几何置零（体积零哨兵），状态置零
    pub fn new(ni: usize, nj: usize, nk: usize, gh: usize, bc: BlockBoundary) -> Self {
        let (pi, pj, pk) = (ni + 2 * gh, nj + 2 * gh, nk + 2 * gh);
        Self {
            ni,
            nj,
            nk,
            gh,
            parent_block: 0,
            parent_range: [0, ni, 0, nj, 0, nk],
            rank: 0,
            global_pos: 0,
            local_pos: 0,
            state: Array3::new(pi, pj, pk, EqArray::ZERO),
            sol_time_n: Array3::new(ni, nj, nk, EqArray::ZERO),
            sol_time_nm1: Array3::new(ni, nj, nk, EqArray::ZERO),
            residual: Array3::new(ni, nj, nk, EqArray::ZERO),
            dt: Array3::new(ni, nj, nk, 0.0),
            rk_dt: Array3::new(ni, nj, nk, 0.0),
            avg_wave_speed: Array3::new(ni, nj, nk, 0.0),
            wall_dist: Array3::new(ni, nj, nk, 1.0e10),
            vol: Array3::new(pi, pj, pk, 0.0),
            center: Array3::new(pi, pj, pk, DVec3::ZERO),
            f_area: [
                Array3::new(pi + 1, pj, pk, UnitVec3Mag::ZERO),
                Array3::new(pi, pj + 1, pk, UnitVec3Mag::ZERO),
                Array3::new(pi, pj, pk + 1, UnitVec3Mag::ZERO),
            ],
            f_center: [
                Array3::new(pi + 1, pj, pk, DVec3::ZERO),
                Array3::new(pi, pj + 1, pk, DVec3::ZERO),
                Array3::new(pi, pj, pk + 1, DVec3::ZERO),
            ],
            bc,
        }
    }

    /// 等距直角网格块（测试与演示算例）
    ///
    /// 物理区域几何精确生成；幽灵几何留给幽灵几何合成与交界面
    /// 交换填充。
    pub fn cartesian(
        ni: usize,
        nj: usize,
        nk: usize,
        gh: usize,
        origin: DVec3,
        spacing: DVec3,
        bc: BlockBoundary,
    ) -> Self {
        let mut blk = Self::new(ni, nj, nk, gh, bc);
        let g = gh as f64;
        let cell_vol = spacing.x * spacing.y * spacing.z;

        // 单元量
        for k in gh..nk + gh {
            for j in gh..nj + gh {
                for i in gh..ni + gh {
                    blk.vol[(i, j, k)] = cell_vol;
                    blk.center[(i, j, k)] = origin
                        + DVec3::new(
                            (i as f64 - g + 0.5) * spacing.x,
                            (j as f64 - g + 0.5) * spacing.y,
                            (k as f64 - g + 0.5) * spacing.z,
                        );
                }
            }
        }

        // 面量：三方向分开，所在方向多一个条目
        let mags = [
            spacing.y * spacing.z,
            spacing.x * spacing.z,
            spacing.x * spacing.y,
        ];
        let units = [DVec3::X, DVec3::Y, DVec3::Z];
        for dir in Direction::ALL {
            let d = dir.axis();
            let (ei, ej, ek) = match dir {
                Direction::I => (ni + gh + 1, nj + gh, nk + gh),
                Direction::J => (ni + gh, nj + gh + 1, nk + gh),
                Direction::K => (ni + gh, nj + gh, nk + gh + 1),
            };
            for k in gh..ek {
                for j in gh..ej {
                    for i in gh..ei {
                        blk.f_area[d][(i, j, k)] = UnitVec3Mag {
                            unit: units[d],
                            mag: mags[d],
                        };
                        // 面中心：所在方向取面坐标，其余取单元中心坐标
                        let fx = match dir {
                            Direction::I => (i as f64 - g) * spacing.x,
                            _ => (i as f64 - g + 0.5) * spacing.x,
                        };
                        let fy = match dir {
                            Direction::J => (j as f64 - g) * spacing.y,
                            _ => (j as f64 - g + 0.5) * spacing.y,
                        };
                        let fz = match dir {
                            Direction::K => (k as f64 - g) * spacing.z,
                            _ => (k as f64 - g + 0.5) * spacing.z,
                        };
                        blk.f_center[d][(i, j, k)] = origin + DVec3::new(fx, fy, fz);
                    }
                }
            }
        }
        blk
    }

    // =========================================================================
    // 尺寸与索引
    // =========================================================================

    /// 物理单元数 (nI, nJ, nK)
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        [self.ni, self.nj, self.nk]
    }

    /// 指定方向的物理单元数
    #[inline]
    pub fn len_dir(&self, dir: Direction) -> usize {
        match dir {
            Direction::I => self.ni,
            Direction::J => self.nj,
            Direction::K => self.nk,
        }
    }

    /// 幽灵层数
    #[inline]
    pub fn num_ghosts(&self) -> usize {
        self.gh
    }

    /// 物理单元总数
    #[inline]
    pub fn num_cells(&self) -> usize {
        self.ni * self.nj * self.nk
    }

    /// 物理索引 → 填充索引
    #[inline]
    pub fn pad(&self, p: usize) -> usize {
        p + self.gh
    }

    /// 填充坐标是否落在物理区域内
    #[inline]
    pub fn is_physical(&self, i: usize, j: usize, k: usize) -> bool {
        i >= self.gh
            && i < self.ni + self.gh
            && j >= self.gh
            && j < self.nj + self.gh
            && k >= self.gh
            && k < self.nk + self.gh
    }

    /// 单元沿 `dir` 的宽度（两侧面中心距离；填充坐标）
    #[inline]
    pub fn cell_width(&self, dir: Direction, i: usize, j: usize, k: usize) -> f64 {
        let d = dir.axis();
        let (di, dj, dk) = dir.unit();
        (self.f_center[d][(i + di, j + dj, k + dk)] - self.f_center[d][(i, j, k)]).length()
    }

    /// 单元原始变量视图（填充坐标）
    #[inline]
    pub fn primitive(&self, i: usize, j: usize, k: usize, eos: &IdealGas) -> Primitive {
        Primitive::from_conserved(&self.state[(i, j, k)], eos)
    }

    /// 用来流状态填满整个状态数组（含幽灵）
    pub fn init_state(&mut self, freestream: &Primitive, eos: &IdealGas) {
        let u = freestream.to_conserved(eos);
        self.state.fill(u);
        self.sol_time_n.fill(u);
        self.sol_time_nm1.fill(u);
    }

    // =========================================================================
    // 时间层簿记（双时间步）
    // =========================================================================

    /// 把当前解记入时间层 n
    pub fn assign_sol_to_time_n(&mut self) {
        for k in 0..self.nk {
            for j in 0..self.nj {
                for i in 0..self.ni {
                    self.sol_time_n[(i, j, k)] =
                        self.state[(self.pad(i), self.pad(j), self.pad(k))];
                }
            }
        }
    }

    /// 把时间层 n 记入时间层 n-1
    pub fn assign_sol_to_time_nm1(&mut self) {
        for k in 0..self.nk {
            for j in 0..self.nj {
                for i in 0..self.ni {
                    self.sol_time_nm1[(i, j, k)] = self.sol_time_n[(i, j, k)];
                }
            }
        }
    }

    /// 清零残差与谱半径累加器
    pub fn reset_residuals(&mut self) {
        self.residual.fill(EqArray::ZERO);
        self.avg_wave_speed.fill(0.0);
    }

    /// 按全局 viscousWall 面中心集合为每个物理单元赋壁面距离
    ///
    /// 线性最近点扫描，单元间并行；加速索引属外部协作者。
    pub fn assign_wall_distance(&mut self, wall_centers: &[DVec3]) {
        use rayon::prelude::*;

        if wall_centers.is_empty() {
            return;
        }
        let (ni, nj, gh) = (self.ni, self.nj, self.gh);
        let center = &self.center;
        self.wall_dist
            .raw_mut()
            .par_iter_mut()
            .enumerate()
            .for_each(|(n, d)| {
                let i = n % ni;
                let j = (n / ni) % nj;
                let k = n / (ni * nj);
                let c = center[(i + gh, j + gh, k + gh)];
                let mut best = f64::MAX;
                for w in wall_centers {
                    best = best.min((c - *w).length_squared());
                }
                *d = best.sqrt();
            });
    }

    /// 收集本块 viscousWall 贴片的面中心
    pub fn viscous_face_centers(&self) -> Vec<DVec3> {
        let mut centers = Vec::new();
        for s in self.bc.surfaces() {
            if s.kind != crate::boundary::BcKind::ViscousWall {
                continue;
            }
            let dir = s.direction();
            let d = dir.axis();
            let (t1, t2) = dir.tangential();
            let (d1s, d1e) = s.d1_range();
            let (d2s, d2e) = s.d2_range();
            for a2 in d2s..d2e {
                for a1 in d1s..d1e {
                    let mut idx = [0usize; 3];
                    idx[d] = s.const_index() + self.gh;
                    idx[t1.axis()] = a1 + self.gh;
                    idx[t2.axis()] = a2 + self.gh;
                    centers.push(self.f_center[d][(idx[0], idx[1], idx[2])]);
                }
            }
        }
        centers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BcKind;

    fn slip_box(n: usize) -> Block {
        Block::cartesian(
            n,
            n,
            n,
            2,
            DVec3::ZERO,
            DVec3::ONE,
            BlockBoundary::for_box(n, n, n, [BcKind::SlipWall; 6]),
        )
    }

    #[test]
    fn test_cartesian_geometry() {
        let blk = slip_box(2);
        let g = blk.num_ghosts();
        assert_eq!(blk.dims(), [2, 2, 2]);
        assert_eq!(blk.vol[(g, g, g)], 1.0);
        assert_eq!(blk.center[(g, g, g)], DVec3::splat(0.5));
        // i-高端面
        let fa = blk.f_area[0][(g + 2, g, g)];
        assert_eq!(fa.unit, DVec3::X);
        assert_eq!(fa.mag, 1.0);
        assert_eq!(blk.f_center[0][(g + 2, g, g)], DVec3::new(2.0, 0.5, 0.5));
        // 幽灵体积保持零哨兵
        assert_eq!(blk.vol[(0, g, g)], 0.0);
    }

    #[test]
    fn test_cell_width() {
        let blk = Block::cartesian(
            2,
            2,
            2,
            2,
            DVec3::ZERO,
            DVec3::new(0.5, 1.0, 2.0),
            BlockBoundary::for_box(2, 2, 2, [BcKind::SlipWall; 6]),
        );
        let g = blk.num_ghosts();
        assert!((blk.cell_width(Direction::I, g, g, g) - 0.5).abs() < 1e-14);
        assert!((blk.cell_width(Direction::K, g, g, g) - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_time_level_bookkeeping() {
        let mut blk = slip_box(2);
        let eos = IdealGas::default();
        let fs = Primitive {
            rho: 1.0,
            vel: DVec3::ZERO,
            p: 1.0 / 1.4,
            k: 0.0,
            omega: 0.0,
        };
        blk.init_state(&fs, &eos);
        let g = blk.num_ghosts();
        blk.state[(g, g, g)][0] = 2.0;
        blk.assign_sol_to_time_n();
        assert_eq!(blk.sol_time_n[(0, 0, 0)][0], 2.0);
        blk.assign_sol_to_time_nm1();
        assert_eq!(blk.sol_time_nm1[(0, 0, 0)][0], 2.0);
    }

    #[test]
    fn test_viscous_face_centers() {
        let mut kinds = [BcKind::SlipWall; 6];
        kinds[2] = BcKind::ViscousWall; // j-低
        let blk = Block::cartesian(
            3,
            3,
            3,
            2,
            DVec3::ZERO,
            DVec3::ONE,
            BlockBoundary::for_box(3, 3, 3, kinds),
        );
        let centers = blk.viscous_face_centers();
        assert_eq!(centers.len(), 9);
        assert!(centers.iter().all(|c| c.y == 0.0));
    }
}
