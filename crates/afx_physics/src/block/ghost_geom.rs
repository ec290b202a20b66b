// crates/afx_physics/src/block/ghost_geom.rs

//! 幽灵几何合成
//!
//! 块建好后为每个非交界面贴片合成幽灵几何，使所有算法能用同一套
//! 索引跨越物理与幽灵范围：
//!
//! - 体积：`vol[g1] = vol[i1]`；方向上至少两个单元时
//!   `vol[g2] = vol[i2]`，否则复制 `vol[i1]`
//! - 面积向量：按同样的层对应关系复制（所在方向的面数组多一条目）
//! - 单元中心：经边界面反射
//!   `center[g] = center[i] + (fc_bnd − fc_i)`，面中心按同一向量平移
//!
//! 交界面贴片的幽灵几何不在此合成，由交换送达。
//!
//! 棱幽灵（两个坐标出界）：12 条棱的四个幽灵对按取平均规则导出。

use afx_core::Direction;

use super::Block;

/// 一侧边界沿某方向的各层填充索引
#[derive(Debug, Clone, Copy)]
struct LayerIdx {
    /// 第一内部单元
    i1: usize,
    /// 第二内部单元（单元数不足 2 时等于 i1）
    i2: usize,
    /// 第一幽灵
    g1: usize,
    /// 第二幽灵
    g2: usize,
    /// 边界面索引
    fb: usize,
    /// 向内一个面
    f_in1: usize,
    /// 向内两个面（单元数不足 2 时等于 f_in1）
    f_in2: usize,
    /// g1 的外侧面
    fg1: usize,
    /// g2 的外侧面
    fg2: usize,
}

impl LayerIdx {
    fn new(lower: bool, n: usize, gh: usize) -> Self {
        if lower {
            Self {
                i1: gh,
                i2: if n >= 2 { gh + 1 } else { gh },
                g1: gh - 1,
                g2: gh - 2,
                fb: gh,
                f_in1: gh + 1,
                f_in2: if n >= 2 { gh + 2 } else { gh + 1 },
                fg1: gh - 1,
                fg2: gh - 2,
            }
        } else {
            Self {
                i1: n + gh - 1,
                i2: if n >= 2 { n + gh - 2 } else { n + gh - 1 },
                g1: n + gh,
                g2: n + gh + 1,
                fb: n + gh,
                f_in1: n + gh - 1,
                f_in2: if n >= 2 { n + gh - 2 } else { n + gh - 1 },
                fg1: n + gh + 1,
                fg2: n + gh + 2,
            }
        }
    }
}

impl Block {
    /// 为全部非交界面贴片合成幽灵几何
    pub fn assign_ghost_cells_geom(&mut self) {
        let gh = self.num_ghosts();
        let surfs: Vec<_> = self
            .bc
            .surfaces()
            .iter()
            .filter(|s| !s.kind.is_interblock())
            .cloned()
            .collect();

        for s in surfs {
            let dir = s.direction();
            let d = dir.axis();
            let (t1, t2) = dir.tangential();
            let layers = LayerIdx::new(s.is_lower(), self.len_dir(dir), gh);
            let (d1s, d1e) = s.d1_range();
            let (d2s, d2e) = s.d2_range();

            // a1/a2 各多取一位，覆盖切向面数组的收尾条目
            for a2 in d2s..=d2e {
                for a1 in d1s..=d1e {
                    let cell_ok = a1 < d1e && a2 < d2e;
                    let mut idx = [0usize; 3];
                    idx[t1.axis()] = a1 + gh;
                    idx[t2.axis()] = a2 + gh;

                    // 每层的平移向量（由所在方向面中心给出）
                    let at = |c: usize| -> (usize, usize, usize) {
                        let mut v = idx;
                        v[d] = c;
                        (v[0], v[1], v[2])
                    };

                    if cell_ok {
                        let v1 = self.f_center[d][at(layers.fb)]
                            - self.f_center[d][at(layers.f_in1)];
                        let v2 = self.f_center[d][at(layers.fb)]
                            - self.f_center[d][at(layers.f_in2)];

                        // 体积与中心
                        self.vol[at(layers.g1)] = self.vol[at(layers.i1)];
                        self.vol[at(layers.g2)] = self.vol[at(layers.i2)];
                        self.center[at(layers.g1)] = self.center[at(layers.i1)] + v1;
                        self.center[at(layers.g2)] = self.center[at(layers.i2)] + v2;

                        // 所在方向面：幽灵外侧面
                        self.f_area[d][at(layers.fg1)] = self.f_area[d][at(layers.f_in1)];
                        self.f_area[d][at(layers.fg2)] = self.f_area[d][at(layers.f_in2)];
                        self.f_center[d][at(layers.fg1)] =
                            self.f_center[d][at(layers.fb)] + v1;
                        self.f_center[d][at(layers.fg2)] =
                            self.f_center[d][at(layers.fb)] + v2;
                    }

                    // 切向面数组：t1 方向面在 a1 == d1e 时仍要写，t2 同理
                    for (t, run_is_a1) in [(t1, true), (t2, false)] {
                        let in_range = if run_is_a1 {
                            a2 < d2e
                        } else {
                            a1 < d1e
                        };
                        if !in_range {
                            continue;
                        }
                        let ta = t.axis();
                        let mut fidx = idx;
                        // 平移向量取该面所在切向位置的在方向面中心差
                        let clamp = |v: usize, max: usize| v.min(max);
                        let mut probe = idx;
                        probe[ta] = clamp(probe[ta], self.f_center[d].dims()[ta] - 1);
                        let mut pb = probe;
                        pb[d] = layers.fb;
                        let mut p1 = probe;
                        p1[d] = layers.f_in1;
                        let mut p2 = probe;
                        p2[d] = layers.f_in2;
                        let v1 = self.f_center[d][(pb[0], pb[1], pb[2])]
                            - self.f_center[d][(p1[0], p1[1], p1[2])];
                        let v2 = self.f_center[d][(pb[0], pb[1], pb[2])]
                            - self.f_center[d][(p2[0], p2[1], p2[2])];

                        fidx[d] = layers.g1;
                        let mut src = fidx;
                        src[d] = layers.i1;
                        self.f_area[ta][(fidx[0], fidx[1], fidx[2])] =
                            self.f_area[ta][(src[0], src[1], src[2])];
                        self.f_center[ta][(fidx[0], fidx[1], fidx[2])] =
                            self.f_center[ta][(src[0], src[1], src[2])] + v1;

                        fidx[d] = layers.g2;
                        let mut src = fidx;
                        src[d] = layers.i2;
                        self.f_area[ta][(fidx[0], fidx[1], fidx[2])] =
                            self.f_area[ta][(src[0], src[1], src[2])];
                        self.f_center[ta][(fidx[0], fidx[1], fidx[2])] =
                            self.f_center[ta][(src[0], src[1], src[2])] + v2;
                    }
                }
            }
        }
    }

    /// 棱幽灵几何：12 条棱的平均规则
    ///
    /// 对每条棱的四个幽灵对：
    ///
    /// ```text
    /// (g1,g1) = ½ (v(i1,g1) + v(g1,i1))
    /// (g1,g2) = v(i1,g2),  (g2,g1) = v(g2,i1)
    /// (g2,g2) = ½ ((g1,g2) + (g2,g1))
    /// ```
    ///
    /// 任一侧是交界面的棱跳过：延拓的切片交换已送达对端的精确
    /// 几何，取平均会破坏位一致不变量。
    pub fn assign_ghost_cells_geom_edge(&mut self) {
        self.for_each_edge(|blk, da, lower_a, db, lower_b, dc| {
            let gh = blk.num_ghosts();
            let la = LayerIdx::new(lower_a, blk.len_dir(da), gh);
            let lb = LayerIdx::new(lower_b, blk.len_dir(db), gh);
            let (aa, ab, ac) = (da.axis(), db.axis(), dc.axis());

            for c in gh..blk.len_dir(dc) + gh {
                if blk.edge_touches_interblock(da, lower_a, db, lower_b, dc, c - gh) {
                    continue;
                }
                // 写一个量的全部棱组合
                let combos = [
                    (la.g1, lb.g1),
                    (la.g1, lb.g2),
                    (la.g2, lb.g1),
                    (la.g2, lb.g2),
                ];
                let sources = [
                    // (g1,g1): 两侧平面平均
                    [(la.i1, lb.g1), (la.g1, lb.i1)],
                    [(la.i1, lb.g2), (la.i1, lb.g2)],
                    [(la.g2, lb.i1), (la.g2, lb.i1)],
                    // (g2,g2): 两个单侧值平均
                    [(la.i1, lb.g2), (la.g2, lb.i1)],
                ];

                let mk = |a: usize, b: usize, cc: usize| -> (usize, usize, usize) {
                    let mut v = [0usize; 3];
                    v[aa] = a;
                    v[ab] = b;
                    v[ac] = cc;
                    (v[0], v[1], v[2])
                };

                for (dst, src) in combos.iter().zip(sources.iter()) {
                    let d = mk(dst.0, dst.1, c);
                    let s0 = mk(src[0].0, src[0].1, c);
                    let s1 = mk(src[1].0, src[1].1, c);

                    blk.vol[d] = 0.5 * (blk.vol[s0] + blk.vol[s1]);
                    blk.center[d] = 0.5 * (blk.center[s0] + blk.center[s1]);

                    // 面数组：写该幽灵单元沿每个方向的低、高两个面
                    for f in 0..3 {
                        let mut off_hi = [0usize; 3];
                        off_hi[f] = 1;
                        for off in [[0usize; 3], off_hi] {
                            let dd = (d.0 + off[0], d.1 + off[1], d.2 + off[2]);
                            let ss0 = (s0.0 + off[0], s0.1 + off[1], s0.2 + off[2]);
                            let ss1 = (s1.0 + off[0], s1.1 + off[1], s1.2 + off[2]);
                            let a0 = blk.f_area[f][ss0];
                            let a1 = blk.f_area[f][ss1];
                            blk.f_area[f][dd] = afx_core::UnitVec3Mag::from_vector(
                                0.5 * (a0.vector() + a1.vector()),
                            );
                            blk.f_center[f][dd] =
                                0.5 * (blk.f_center[f][ss0] + blk.f_center[f][ss1]);
                        }
                    }
                }
            }
        });
    }

    /// 遍历 12 条棱：对每条棱回调 (方向a, 低/高, 方向b, 低/高, 走向c)
    pub(crate) fn for_each_edge<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Block, Direction, bool, Direction, bool, Direction),
    {
        let pairs = [
            (Direction::I, Direction::J, Direction::K),
            (Direction::J, Direction::K, Direction::I),
            (Direction::I, Direction::K, Direction::J),
        ];
        for (da, db, dc) in pairs {
            for lower_a in [true, false] {
                for lower_b in [true, false] {
                    f(self, da, lower_a, db, lower_b, dc);
                }
            }
        }
    }
}
