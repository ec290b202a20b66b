// crates/afx_physics/src/block/split_join.rs

//! 块切分与合并
//!
//! `split` 在平面 `dir = idx` 处把块一分为二：下半覆盖写入自身，
//! 上半作为新块返回。全部带幽灵数组沿 `dir` 连同两侧幽灵层一起
//! 切片——下半的上侧幽灵恰好是上半的内部首层，切片后立即自洽。
//! 被切开的交界面贴片记入 `altered` 供协调者修正对端。
//!
//! `join` 为逆操作；缝合时不拷贝下半的上侧幽灵。

use afx_core::{Array3, Direction};

use super::Block;
use crate::boundary::BoundarySurface;

impl Block {
    /// 沿 `dir = idx`（物理单元索引）切分
    ///
    /// 返回上半新块，其全局位置取 `new_id`。
    pub fn split(
        &mut self,
        dir: Direction,
        idx: usize,
        new_id: usize,
        altered: &mut Vec<BoundarySurface>,
    ) -> Block {
        let gh = self.gh;
        let n_dir = self.len_dir(dir);
        assert!(idx > 0 && idx < n_dir, "切分平面 {} 越界", idx);

        // 上半的边界描述符（同时改写下半）
        let upper_bc = self
            .bc
            .split(dir, idx, self.global_pos, new_id, altered);

        // 上下半的物理尺寸
        let lower_dims = with_dir(self.dims(), dir, idx);
        let upper_dims = with_dir(self.dims(), dir, n_dir - idx);

        let mut upper = Block::new(
            upper_dims[0],
            upper_dims[1],
            upper_dims[2],
            gh,
            upper_bc,
        );
        upper.parent_block = self.parent_block;
        upper.rank = self.rank;
        upper.global_pos = new_id;
        upper.local_pos = self.local_pos;

        // 父块子范围
        upper.parent_range = self.parent_range;
        let d = dir.axis();
        upper.parent_range[2 * d] = self.parent_range[2 * d] + idx;
        self.parent_range[2 * d + 1] = self.parent_range[2 * d] + idx;

        // 带幽灵数组：下半取填充范围 [0, idx+2gh)，上半取 [idx, n+2gh)
        let cut_cell = |dims: [usize; 3], lo: bool| -> [std::ops::Range<usize>; 3] {
            let mut r = [0..dims[0], 0..dims[1], 0..dims[2]];
            r[d] = if lo { 0..idx + 2 * gh } else { idx..n_dir + 2 * gh };
            r
        };
        let cut_face = |dims: [usize; 3], lo: bool, own_axis: usize| -> [std::ops::Range<usize>; 3] {
            let mut r = [0..dims[0], 0..dims[1], 0..dims[2]];
            r[d] = if d == own_axis {
                if lo {
                    0..idx + 2 * gh + 1
                } else {
                    idx..n_dir + 2 * gh + 1
                }
            } else if lo {
                0..idx + 2 * gh
            } else {
                idx..n_dir + 2 * gh
            };
            r
        };

        macro_rules! split_padded {
            ($field:ident) => {{
                let [ri, rj, rk] = cut_cell(self.$field.dims(), false);
                upper.$field = self.$field.slice(ri, rj, rk);
                let [ri, rj, rk] = cut_cell(self.$field.dims(), true);
                self.$field = self.$field.slice(ri, rj, rk);
            }};
        }
        split_padded!(state);
        split_padded!(vol);
        split_padded!(center);

        for f in 0..3 {
            let [ri, rj, rk] = cut_face(self.f_area[f].dims(), false, f);
            upper.f_area[f] = self.f_area[f].slice(ri.clone(), rj.clone(), rk.clone());
            upper.f_center[f] = self.f_center[f].slice(ri, rj, rk);
            let [ri, rj, rk] = cut_face(self.f_area[f].dims(), true, f);
            self.f_area[f] = self.f_area[f].slice(ri.clone(), rj.clone(), rk.clone());
            self.f_center[f] = self.f_center[f].slice(ri, rj, rk);
        }

        // 仅物理单元的数组按物理范围切片
        let cut_int = |dims: [usize; 3], lo: bool| -> [std::ops::Range<usize>; 3] {
            let mut r = [0..dims[0], 0..dims[1], 0..dims[2]];
            r[d] = if lo { 0..idx } else { idx..n_dir };
            r
        };
        macro_rules! split_interior {
            ($field:ident) => {{
                let [ri, rj, rk] = cut_int(self.$field.dims(), false);
                upper.$field = self.$field.slice(ri, rj, rk);
                let [ri, rj, rk] = cut_int(self.$field.dims(), true);
                self.$field = self.$field.slice(ri, rj, rk);
            }};
        }
        split_interior!(sol_time_n);
        split_interior!(sol_time_nm1);
        split_interior!(residual);
        split_interior!(dt);
        split_interior!(rk_dt);
        split_interior!(avg_wave_speed);
        split_interior!(wall_dist);

        // 自身降为下半
        set_dims(self, lower_dims);
        upper
    }

    /// 合并：`other` 是沿 `dir` 的上半
    pub fn join(
        &mut self,
        other: &Block,
        dir: Direction,
        altered: &mut Vec<BoundarySurface>,
    ) {
        let gh = self.gh;
        let d = dir.axis();
        let n1 = self.len_dir(dir);
        let n2 = other.len_dir(dir);
        let joined = with_dir(self.dims(), dir, n1 + n2);

        let mut out = Block::new(joined[0], joined[1], joined[2], gh, self.bc.clone());
        out.bc
            .join(&other.bc, dir, n1, altered);
        out.parent_block = self.parent_block;
        out.parent_range = self.parent_range;
        out.parent_range[2 * d + 1] = other.parent_range[2 * d + 1];
        out.rank = self.rank;
        out.global_pos = self.global_pos;
        out.local_pos = self.local_pos;

        // 带幽灵数组：下半贡献填充 [0, n1+gh)，上半贡献 [gh, n2+2gh)
        macro_rules! join_padded {
            ($field:ident) => {{
                let ld = self.$field.dims();
                let ud = other.$field.dims();
                let mut r_lo = [0..ld[0], 0..ld[1], 0..ld[2]];
                r_lo[d] = 0..n1 + gh;
                let [ri, rj, rk] = r_lo;
                let lo_part = self.$field.slice(ri, rj, rk);
                let mut r_hi = [0..ud[0], 0..ud[1], 0..ud[2]];
                r_hi[d] = gh..n2 + 2 * gh;
                let [ri, rj, rk] = r_hi;
                let hi_part = other.$field.slice(ri, rj, rk);

                let od = out.$field.dims();
                let mut w_lo = [0..od[0], 0..od[1], 0..od[2]];
                w_lo[d] = 0..n1 + gh;
                let [ri, rj, rk] = w_lo;
                out.$field.insert(ri, rj, rk, &lo_part).expect("下半形状");
                let mut w_hi = [0..od[0], 0..od[1], 0..od[2]];
                w_hi[d] = n1 + gh..n1 + n2 + 2 * gh;
                let [ri, rj, rk] = w_hi;
                out.$field.insert(ri, rj, rk, &hi_part).expect("上半形状");
            }};
        }
        join_padded!(state);
        join_padded!(vol);
        join_padded!(center);

        // 面数组逐方向处理（自身方向多一条目）
        for f in 0..3 {
            let extra = if f == d { 1 } else { 0 };
            let ld = self.f_area[f].dims();
            let ud = other.f_area[f].dims();
            let mut r_lo = [0..ld[0], 0..ld[1], 0..ld[2]];
            r_lo[d] = 0..n1 + gh;
            let [ri, rj, rk] = r_lo.clone();
            let lo_a = self.f_area[f].slice(ri.clone(), rj.clone(), rk.clone());
            let lo_c = self.f_center[f].slice(ri, rj, rk);
            let mut r_hi = [0..ud[0], 0..ud[1], 0..ud[2]];
            r_hi[d] = gh..n2 + 2 * gh + extra;
            let [ri, rj, rk] = r_hi;
            let hi_a = other.f_area[f].slice(ri.clone(), rj.clone(), rk.clone());
            let hi_c = other.f_center[f].slice(ri, rj, rk);

            let od = out.f_area[f].dims();
            let mut w_lo = [0..od[0], 0..od[1], 0..od[2]];
            w_lo[d] = 0..n1 + gh;
            let [ri, rj, rk] = w_lo;
            out.f_area[f]
                .insert(ri.clone(), rj.clone(), rk.clone(), &lo_a)
                .expect("下半面形状");
            out.f_center[f].insert(ri, rj, rk, &lo_c).expect("下半面心");
            let mut w_hi = [0..od[0], 0..od[1], 0..od[2]];
            w_hi[d] = n1 + gh..n1 + n2 + 2 * gh + extra;
            let [ri, rj, rk] = w_hi;
            out.f_area[f]
                .insert(ri.clone(), rj.clone(), rk.clone(), &hi_a)
                .expect("上半面形状");
            out.f_center[f].insert(ri, rj, rk, &hi_c).expect("上半面心");
        }

        // 仅物理单元数组
        macro_rules! join_interior {
            ($field:ident) => {{
                let od = out.$field.dims();
                let mut w_lo = [0..od[0], 0..od[1], 0..od[2]];
                w_lo[d] = 0..n1;
                let [ri, rj, rk] = w_lo;
                out.$field.insert(ri, rj, rk, &self.$field).expect("下半");
                let mut w_hi = [0..od[0], 0..od[1], 0..od[2]];
                w_hi[d] = n1..n1 + n2;
                let [ri, rj, rk] = w_hi;
                out.$field.insert(ri, rj, rk, &other.$field).expect("上半");
            }};
        }
        join_interior!(sol_time_n);
        join_interior!(sol_time_nm1);
        join_interior!(residual);
        join_interior!(dt);
        join_interior!(rk_dt);
        join_interior!(avg_wave_speed);
        join_interior!(wall_dist);

        *self = out;
    }
}

fn with_dir(mut dims: [usize; 3], dir: Direction, v: usize) -> [usize; 3] {
    dims[dir.axis()] = v;
    dims
}

fn set_dims(blk: &mut Block, dims: [usize; 3]) {
    blk.set_phys_dims(dims);
}

impl Block {
    pub(crate) fn set_phys_dims(&mut self, dims: [usize; 3]) {
        self.ni = dims[0];
        self.nj = dims[1];
        self.nk = dims[2];
    }
}
