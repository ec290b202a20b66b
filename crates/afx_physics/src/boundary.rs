// crates/afx_physics/src/boundary.rs

//! 边界描述符
//!
//! 块把自己的边界暴露为有序的表面贴片序列。每个贴片携带边界标签、
//! 表面号 (1..6，依次 i-低/高, j-低/高, k-低/高)、表面上的索引范围
//! 与用于配对交界面贴片的整数 tag。
//!
//! # 范围约定
//!
//! 常数方向以面索引存放（min == max）；两个切向以半开区间存放
//! 物理单元索引。i-表面的 (d1, d2) 为 (j, k)，j-表面为 (k, i)，
//! k-表面为 (i, j)。

use afx_foundation::{AfxError, AfxResult};
use afx_core::Direction;
use serde::{Deserialize, Serialize};

// ============================================================
// 边界标签
// ============================================================

/// 边界条件标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BcKind {
    /// 滑移固壁
    SlipWall,
    /// 黏性固壁（无滑移）
    ViscousWall,
    /// 交界面（虚拟边界，行为等同网格内部）
    Interblock,
    /// 亚声速入流
    SubsonicInflow,
    /// 亚声速出流
    SubsonicOutflow,
    /// 超声速入流
    SupersonicInflow,
    /// 超声速出流
    SupersonicOutflow,
}

impl BcKind {
    /// 标签名（与输入卡、halo 编码一致）
    pub fn name(&self) -> &'static str {
        match self {
            Self::SlipWall => "slipWall",
            Self::ViscousWall => "viscousWall",
            Self::Interblock => "interblock",
            Self::SubsonicInflow => "subsonicInflow",
            Self::SubsonicOutflow => "subsonicOutflow",
            Self::SupersonicInflow => "supersonicInflow",
            Self::SupersonicOutflow => "supersonicOutflow",
        }
    }

    /// 由标签名解析；未识别的标签是致命配置错误
    pub fn from_name(name: &str) -> AfxResult<Self> {
        match name {
            "slipWall" => Ok(Self::SlipWall),
            "viscousWall" => Ok(Self::ViscousWall),
            "interblock" => Ok(Self::Interblock),
            "subsonicInflow" => Ok(Self::SubsonicInflow),
            "subsonicOutflow" => Ok(Self::SubsonicOutflow),
            "supersonicInflow" => Ok(Self::SupersonicInflow),
            "supersonicOutflow" => Ok(Self::SupersonicOutflow),
            other => Err(AfxError::config(format!("边界标签 '{}' 未识别", other))),
        }
    }

    /// 是否固壁（滑移或黏性）
    #[inline]
    pub fn is_wall(&self) -> bool {
        matches!(self, Self::SlipWall | Self::ViscousWall)
    }

    /// 是否交界面
    #[inline]
    pub fn is_interblock(&self) -> bool {
        matches!(self, Self::Interblock)
    }
}

// ============================================================
// 表面贴片
// ============================================================

/// 单个边界表面贴片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundarySurface {
    /// 边界标签
    pub kind: BcKind,
    /// 表面号 1..6
    pub surface: usize,
    /// i 范围（i-表面时 min == max 为面索引）
    pub i_min: usize,
    /// i 范围上界
    pub i_max: usize,
    /// j 范围
    pub j_min: usize,
    /// j 范围上界
    pub j_max: usize,
    /// k 范围
    pub k_min: usize,
    /// k 范围上界
    pub k_max: usize,
    /// 交界面配对 tag（此处约定存放对端全局块号）
    pub tag: i32,
}

impl BoundarySurface {
    /// 表面所在方向
    #[inline]
    pub fn direction(&self) -> Direction {
        match self.surface {
            1 | 2 => Direction::I,
            3 | 4 => Direction::J,
            _ => Direction::K,
        }
    }

    /// 是否低侧表面
    #[inline]
    pub fn is_lower(&self) -> bool {
        matches!(self.surface, 1 | 3 | 5)
    }

    /// 常数方向的面索引
    #[inline]
    pub fn const_index(&self) -> usize {
        match self.direction() {
            Direction::I => self.i_min,
            Direction::J => self.j_min,
            Direction::K => self.k_min,
        }
    }

    /// 指定方向的单元范围
    #[inline]
    pub fn range(&self, dir: Direction) -> (usize, usize) {
        match dir {
            Direction::I => (self.i_min, self.i_max),
            Direction::J => (self.j_min, self.j_max),
            Direction::K => (self.k_min, self.k_max),
        }
    }

    /// 切向 d1 的单元范围（按循环约定）
    #[inline]
    pub fn d1_range(&self) -> (usize, usize) {
        self.range(self.direction().tangential().0)
    }

    /// 切向 d2 的单元范围
    #[inline]
    pub fn d2_range(&self) -> (usize, usize) {
        self.range(self.direction().tangential().1)
    }

    /// 贴片覆盖的单元数
    #[inline]
    pub fn num_cells(&self) -> usize {
        let (d1s, d1e) = self.d1_range();
        let (d2s, d2e) = self.d2_range();
        (d1e - d1s) * (d2e - d2s)
    }

    /// 贴片是否覆盖给定表面上的单元 (i, j, k)
    ///
    /// 常数方向的坐标不参与比较（调用方已按表面号选面）。
    #[inline]
    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        match self.direction() {
            Direction::I => {
                j >= self.j_min && j < self.j_max && k >= self.k_min && k < self.k_max
            }
            Direction::J => {
                i >= self.i_min && i < self.i_max && k >= self.k_min && k < self.k_max
            }
            Direction::K => {
                i >= self.i_min && i < self.i_max && j >= self.j_min && j < self.j_max
            }
        }
    }
}

// ============================================================
// 块边界描述符
// ============================================================

/// 一个块的全部边界贴片，按 i、j、k 表面次序排列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockBoundary {
    surfs: Vec<BoundarySurface>,
}

impl BlockBoundary {
    /// 由贴片列表构造；按方向稳定排序
    pub fn new(mut surfs: Vec<BoundarySurface>) -> Self {
        surfs.sort_by_key(|s| s.direction().axis());
        Self { surfs }
    }

    /// 整块单一标签的便捷构造：六个外表面各一个贴片
    ///
    /// `kinds` 次序为 i-低/高, j-低/高, k-低/高。
    pub fn for_box(ni: usize, nj: usize, nk: usize, kinds: [BcKind; 6]) -> Self {
        let mk = |surface: usize, kind: BcKind| -> BoundarySurface {
            let (cmin, cmax) = match surface {
                1 => (0, 0),
                2 => (ni, ni),
                3 => (0, 0),
                4 => (nj, nj),
                5 => (0, 0),
                _ => (nk, nk),
            };
            match surface {
                1 | 2 => BoundarySurface {
                    kind,
                    surface,
                    i_min: cmin,
                    i_max: cmax,
                    j_min: 0,
                    j_max: nj,
                    k_min: 0,
                    k_max: nk,
                    tag: 0,
                },
                3 | 4 => BoundarySurface {
                    kind,
                    surface,
                    i_min: 0,
                    i_max: ni,
                    j_min: cmin,
                    j_max: cmax,
                    k_min: 0,
                    k_max: nk,
                    tag: 0,
                },
                _ => BoundarySurface {
                    kind,
                    surface,
                    i_min: 0,
                    i_max: ni,
                    j_min: 0,
                    j_max: nj,
                    k_min: cmin,
                    k_max: cmax,
                    tag: 0,
                },
            }
        };
        Self::new((0..6).map(|n| mk(n + 1, kinds[n])).collect())
    }

    /// 贴片总数
    #[inline]
    pub fn num_surfaces(&self) -> usize {
        self.surfs.len()
    }

    /// 各方向贴片数 (nI, nJ, nK)
    pub fn counts(&self) -> [usize; 3] {
        let mut c = [0usize; 3];
        for s in &self.surfs {
            c[s.direction().axis()] += 1;
        }
        c
    }

    /// 贴片列表
    #[inline]
    pub fn surfaces(&self) -> &[BoundarySurface] {
        &self.surfs
    }

    /// 可变贴片列表（交界面 tag 修正用）
    #[inline]
    pub fn surfaces_mut(&mut self) -> &mut [BoundarySurface] {
        &mut self.surfs
    }

    /// 给定表面上单元 (i, j, k) 处的边界标签
    ///
    /// 用于棱角逻辑；查不到贴片时返回 None。
    pub fn kind_at(&self, i: usize, j: usize, k: usize, surface: usize) -> Option<BcKind> {
        self.surfs
            .iter()
            .find(|s| s.surface == surface && s.contains(i, j, k))
            .map(|s| s.kind)
    }

    /// 沿 `dir = index` 平面把边界描述符一分为二
    ///
    /// 下半覆盖写入 `self`，返回上半的描述符。被切开的交界面贴片
    /// 追加进 `altered`，供协调者修正其对端。`lower_id` / `upper_id`
    /// 为切分后两半的全局块号，切面上生成互相配对的交界面贴片。
    pub fn split(
        &mut self,
        dir: Direction,
        index: usize,
        lower_id: usize,
        upper_id: usize,
        altered: &mut Vec<BoundarySurface>,
    ) -> BlockBoundary {
        let mut lower = Vec::new();
        let mut upper = Vec::new();

        for s in &self.surfs {
            if s.direction() == dir {
                // 常数方向与切分方向一致：按低/高归属
                let mut s2 = s.clone();
                if s.is_lower() {
                    lower.push(s2);
                } else {
                    let c = s.const_index() - index;
                    match dir {
                        Direction::I => {
                            s2.i_min = c;
                            s2.i_max = c;
                        }
                        Direction::J => {
                            s2.j_min = c;
                            s2.j_max = c;
                        }
                        Direction::K => {
                            s2.k_min = c;
                            s2.k_max = c;
                        }
                    }
                    upper.push(s2);
                }
            } else {
                // 切向贴片：按范围切开
                let (lo, hi) = s.range(dir);
                if hi <= index {
                    lower.push(s.clone());
                } else if lo >= index {
                    let mut s2 = s.clone();
                    shift_range(&mut s2, dir, index);
                    upper.push(s2);
                } else {
                    // 贴片被切开
                    if s.kind.is_interblock() {
                        altered.push(s.clone());
                    }
                    let mut s_lo = s.clone();
                    set_range_end(&mut s_lo, dir, index);
                    lower.push(s_lo);

                    let mut s_hi = s.clone();
                    set_range_start(&mut s_hi, dir, index);
                    shift_range(&mut s_hi, dir, index);
                    upper.push(s_hi);
                }
            }
        }

        // 切面生成互相配对的交界面贴片
        let (d1, d2) = dir.tangential();
        let (d1s, d1e) = self.full_range(d1);
        let (d2s, d2e) = self.full_range(d2);
        lower.push(make_interface(dir, false, index, d1, (d1s, d1e), d2, (d2s, d2e), upper_id));
        upper.push(make_interface(dir, true, 0, d1, (d1s, d1e), d2, (d2s, d2e), lower_id));

        self.surfs = lower;
        self.surfs.sort_by_key(|s| s.direction().axis());
        BlockBoundary::new(upper)
    }

    /// 合并：`split` 的逆操作
    ///
    /// `self` 为下半，`other` 为上半，`lower_cells` 是下半沿 `dir`
    /// 的单元数。切面上的配对交界面贴片被丢弃；上半贴片沿 `dir`
    /// 平移后并入。
    pub fn join(
        &mut self,
        other: &BlockBoundary,
        dir: Direction,
        lower_cells: usize,
        altered: &mut Vec<BoundarySurface>,
    ) {
        let is_seam = |s: &BoundarySurface, upper_half: bool| -> bool {
            s.kind.is_interblock()
                && s.direction() == dir
                && if upper_half {
                    s.is_lower() && s.const_index() == 0
                } else {
                    !s.is_lower()
                }
        };

        let mut merged: Vec<BoundarySurface> = self
            .surfs
            .iter()
            .filter(|s| !is_seam(s, false))
            .cloned()
            .collect();

        for s in other.surfaces() {
            if is_seam(s, true) {
                continue;
            }
            let mut s2 = s.clone();
            shift_range_up(&mut s2, dir, lower_cells);
            if s2.kind.is_interblock() {
                altered.push(s2.clone());
            }
            merged.push(s2);
        }

        // 切分时被切开的切向贴片重新黏合
        coalesce(&mut merged, dir);

        merged.sort_by_key(|s| s.direction().axis());
        self.surfs = merged;
    }

    /// 某方向上所有贴片覆盖的单元范围并
    fn full_range(&self, dir: Direction) -> (usize, usize) {
        let mut lo = usize::MAX;
        let mut hi = 0usize;
        for s in &self.surfs {
            if s.direction() != dir {
                let (a, b) = s.range(dir);
                lo = lo.min(a);
                hi = hi.max(b);
            }
        }
        if lo == usize::MAX {
            (0, 0)
        } else {
            (lo, hi)
        }
    }
}

/// 把沿 `dir` 范围首尾相接、其余字段一致的贴片对黏合为一个
fn coalesce(surfs: &mut Vec<BoundarySurface>, dir: Direction) {
    let mut n = 0;
    while n < surfs.len() {
        let mut merged_any = false;
        for m in n + 1..surfs.len() {
            let (a, b) = (&surfs[n], &surfs[m]);
            let same_rest = a.kind == b.kind
                && a.surface == b.surface
                && a.tag == b.tag
                && a.direction() != dir
                && Direction::ALL.iter().all(|&x| {
                    x == dir || a.range(x) == b.range(x)
                });
            if same_rest {
                let (alo, ahi) = a.range(dir);
                let (blo, bhi) = b.range(dir);
                if ahi == blo || bhi == alo {
                    let joined = (alo.min(blo), ahi.max(bhi));
                    set_range_start(&mut surfs[n], dir, joined.0);
                    set_range_end(&mut surfs[n], dir, joined.1);
                    surfs.remove(m);
                    merged_any = true;
                    break;
                }
            }
        }
        if !merged_any {
            n += 1;
        }
    }
}

fn set_range_end(s: &mut BoundarySurface, dir: Direction, end: usize) {
    match dir {
        Direction::I => s.i_max = end,
        Direction::J => s.j_max = end,
        Direction::K => s.k_max = end,
    }
}

fn set_range_start(s: &mut BoundarySurface, dir: Direction, start: usize) {
    match dir {
        Direction::I => s.i_min = start,
        Direction::J => s.j_min = start,
        Direction::K => s.k_min = start,
    }
}

fn shift_range(s: &mut BoundarySurface, dir: Direction, offset: usize) {
    match dir {
        Direction::I => {
            s.i_min -= offset;
            s.i_max -= offset;
        }
        Direction::J => {
            s.j_min -= offset;
            s.j_max -= offset;
        }
        Direction::K => {
            s.k_min -= offset;
            s.k_max -= offset;
        }
    }
}

fn shift_range_up(s: &mut BoundarySurface, dir: Direction, offset: usize) {
    match dir {
        Direction::I => {
            s.i_min += offset;
            s.i_max += offset;
        }
        Direction::J => {
            s.j_min += offset;
            s.j_max += offset;
        }
        Direction::K => {
            s.k_min += offset;
            s.k_max += offset;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn make_interface(
    dir: Direction,
    lower: bool,
    const_index: usize,
    d1: Direction,
    d1r: (usize, usize),
    d2: Direction,
    d2r: (usize, usize),
    partner: usize,
) -> BoundarySurface {
    let surface = match (dir, lower) {
        (Direction::I, true) => 1,
        (Direction::I, false) => 2,
        (Direction::J, true) => 3,
        (Direction::J, false) => 4,
        (Direction::K, true) => 5,
        (Direction::K, false) => 6,
    };
    let mut s = BoundarySurface {
        kind: BcKind::Interblock,
        surface: 0,
        i_min: 0,
        i_max: 0,
        j_min: 0,
        j_max: 0,
        k_min: 0,
        k_max: 0,
        tag: partner as i32,
    };
    s.surface = surface;
    match dir {
        Direction::I => {
            s.i_min = const_index;
            s.i_max = const_index;
        }
        Direction::J => {
            s.j_min = const_index;
            s.j_max = const_index;
        }
        Direction::K => {
            s.k_min = const_index;
            s.k_max = const_index;
        }
    }
    match d1 {
        Direction::I => {
            s.i_min = d1r.0;
            s.i_max = d1r.1;
        }
        Direction::J => {
            s.j_min = d1r.0;
            s.j_max = d1r.1;
        }
        Direction::K => {
            s.k_min = d1r.0;
            s.k_max = d1r.1;
        }
    }
    match d2 {
        Direction::I => {
            s.i_min = d2r.0;
            s.i_max = d2r.1;
        }
        Direction::J => {
            s.j_min = d2r.0;
            s.j_max = d2r.1;
        }
        Direction::K => {
            s.k_min = d2r.0;
            s.k_max = d2r.1;
        }
    }
    s
}
