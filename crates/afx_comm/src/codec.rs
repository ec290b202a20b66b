// crates/afx_comm/src/codec.rs

//! halo 编解码
//!
//! 类型化记录到不透明字节缓冲的唯一生产/消费方。全部小端编码，
//! 读越界与尾部残留都是 [`AfxError::HaloProtocol`]。
//!
//! # 块缓冲布局（几何散发）
//!
//! - 15 × i32 块描述符: 单元数、方程数、nI、nJ、nK、幽灵层数、
//!   父块号、父块子范围 ×6、rank、全局位置
//! - 带幽灵数组依次: state、center、faceAreaI/J/K、faceCenterI/J/K、
//!   volume
//! - 3 × i32 表面计数 (nI, nJ, nK)
//! - 7 个长度 ΣnSurf 的 i32 向量: iMin、iMax、jMin、jMax、kMin、
//!   kMax、tag
//! - 长度 ΣnSurf 的 i32 标签名长度向量
//! - 连接的标签名字节
//!
//! # 解收集缓冲布局
//!
//! state、residual、dt、avgWaveSpeed，以全局位置作消息 tag。

use afx_core::{Array3, UnitVec3Mag};
use afx_foundation::{AfxError, AfxResult};
use afx_physics::block::{Block, StateSlice};
use afx_physics::boundary::{BcKind, BlockBoundary, BoundarySurface};
use afx_physics::connection::BlockConnection;
use afx_physics::residual::ResidLinf;
use afx_physics::state::{EqArray, NUM_EQNS};
use glam::DVec3;

// ============================================================
// 底层读写
// ============================================================

/// 小端字节写入器
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// 新建
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出缓冲
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub fn put_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    #[inline]
    pub fn put_vec3(&mut self, v: DVec3) {
        self.put_f64(v.x);
        self.put_f64(v.y);
        self.put_f64(v.z);
    }

    #[inline]
    pub fn put_unit_mag(&mut self, v: UnitVec3Mag) {
        self.put_vec3(v.unit);
        self.put_f64(v.mag);
    }

    #[inline]
    pub fn put_eq(&mut self, v: &EqArray) {
        for n in 0..NUM_EQNS {
            self.put_f64(v[n]);
        }
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }
}

/// 小端字节读取器
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// 新建
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> AfxResult<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(AfxError::halo(format!(
                "缓冲读越界: 需要 {} 字节, 剩余 {}",
                n,
                self.buf.len() - self.pos
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn get_i32(&mut self) -> AfxResult<i32> {
        Ok(i32::from_le_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn get_f64(&mut self) -> AfxResult<f64> {
        Ok(f64::from_le_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn get_u8(&mut self) -> AfxResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn get_vec3(&mut self) -> AfxResult<DVec3> {
        Ok(DVec3::new(self.get_f64()?, self.get_f64()?, self.get_f64()?))
    }

    pub fn get_unit_mag(&mut self) -> AfxResult<UnitVec3Mag> {
        Ok(UnitVec3Mag {
            unit: self.get_vec3()?,
            mag: self.get_f64()?,
        })
    }

    pub fn get_eq(&mut self) -> AfxResult<EqArray> {
        let mut out = EqArray::ZERO;
        for n in 0..NUM_EQNS {
            out[n] = self.get_f64()?;
        }
        Ok(out)
    }

    pub fn get_bytes(&mut self, n: usize) -> AfxResult<&'a [u8]> {
        self.take(n)
    }

    /// 校验缓冲恰好读尽
    pub fn expect_end(&self) -> AfxResult<()> {
        if self.pos != self.buf.len() {
            return Err(AfxError::halo(format!(
                "缓冲尾部残留 {} 字节",
                self.buf.len() - self.pos
            )));
        }
        Ok(())
    }
}

fn put_array_eq(w: &mut ByteWriter, a: &Array3<EqArray>) {
    for v in a.raw() {
        w.put_eq(v);
    }
}

fn get_array_eq(r: &mut ByteReader<'_>, a: &mut Array3<EqArray>) -> AfxResult<()> {
    for v in a.raw_mut() {
        *v = r.get_eq()?;
    }
    Ok(())
}

fn put_array_f64(w: &mut ByteWriter, a: &Array3<f64>) {
    for v in a.raw() {
        w.put_f64(*v);
    }
}

fn get_array_f64(r: &mut ByteReader<'_>, a: &mut Array3<f64>) -> AfxResult<()> {
    for v in a.raw_mut() {
        *v = r.get_f64()?;
    }
    Ok(())
}

fn put_array_vec3(w: &mut ByteWriter, a: &Array3<DVec3>) {
    for v in a.raw() {
        w.put_vec3(*v);
    }
}

fn get_array_vec3(r: &mut ByteReader<'_>, a: &mut Array3<DVec3>) -> AfxResult<()> {
    for v in a.raw_mut() {
        *v = r.get_vec3()?;
    }
    Ok(())
}

fn put_array_um(w: &mut ByteWriter, a: &Array3<UnitVec3Mag>) {
    for v in a.raw() {
        w.put_unit_mag(*v);
    }
}

fn get_array_um(r: &mut ByteReader<'_>, a: &mut Array3<UnitVec3Mag>) -> AfxResult<()> {
    for v in a.raw_mut() {
        *v = r.get_unit_mag()?;
    }
    Ok(())
}

// ============================================================
// 块几何缓冲
// ============================================================

/// 打包整块（几何 + 状态 + 边界描述符）
pub fn pack_block(blk: &Block) -> Vec<u8> {
    let mut w = ByteWriter::new();
    let [ni, nj, nk] = blk.dims();

    // 15 个 i32 描述符
    w.put_i32(blk.num_cells() as i32);
    w.put_i32(NUM_EQNS as i32);
    w.put_i32(ni as i32);
    w.put_i32(nj as i32);
    w.put_i32(nk as i32);
    w.put_i32(blk.num_ghosts() as i32);
    w.put_i32(blk.parent_block as i32);
    for v in blk.parent_range {
        w.put_i32(v as i32);
    }
    w.put_i32(blk.rank as i32);
    w.put_i32(blk.global_pos as i32);

    // 带幽灵数组
    put_array_eq(&mut w, &blk.state);
    put_array_vec3(&mut w, &blk.center);
    put_array_um(&mut w, &blk.f_area[0]);
    put_array_um(&mut w, &blk.f_area[1]);
    put_array_um(&mut w, &blk.f_area[2]);
    put_array_vec3(&mut w, &blk.f_center[0]);
    put_array_vec3(&mut w, &blk.f_center[1]);
    put_array_vec3(&mut w, &blk.f_center[2]);
    put_array_f64(&mut w, &blk.vol);

    // 边界描述符
    let counts = blk.bc.counts();
    for c in counts {
        w.put_i32(c as i32);
    }
    let surfs = blk.bc.surfaces();
    for s in surfs {
        w.put_i32(s.i_min as i32);
    }
    for s in surfs {
        w.put_i32(s.i_max as i32);
    }
    for s in surfs {
        w.put_i32(s.j_min as i32);
    }
    for s in surfs {
        w.put_i32(s.j_max as i32);
    }
    for s in surfs {
        w.put_i32(s.k_min as i32);
    }
    for s in surfs {
        w.put_i32(s.k_max as i32);
    }
    for s in surfs {
        w.put_i32(s.tag);
    }
    for s in surfs {
        w.put_i32(s.kind.name().len() as i32);
    }
    for s in surfs {
        w.put_bytes(s.kind.name().as_bytes());
    }
    w.finish()
}

/// 解包整块
pub fn unpack_block(buf: &[u8]) -> AfxResult<Block> {
    let mut r = ByteReader::new(buf);

    let _num_cells = r.get_i32()?;
    let num_vars = r.get_i32()?;
    if num_vars as usize != NUM_EQNS {
        return Err(AfxError::halo(format!(
            "块缓冲方程数 {} 与期望 {} 不符",
            num_vars, NUM_EQNS
        )));
    }
    let ni = r.get_i32()? as usize;
    let nj = r.get_i32()? as usize;
    let nk = r.get_i32()? as usize;
    let gh = r.get_i32()? as usize;
    let parent = r.get_i32()? as usize;
    let mut parent_range = [0usize; 6];
    for v in parent_range.iter_mut() {
        *v = r.get_i32()? as usize;
    }
    let rank = r.get_i32()? as usize;
    let global_pos = r.get_i32()? as usize;

    let mut blk = Block::new(ni, nj, nk, gh, BlockBoundary::default());
    blk.parent_block = parent;
    blk.parent_range = parent_range;
    blk.rank = rank;
    blk.global_pos = global_pos;

    get_array_eq(&mut r, &mut blk.state)?;
    get_array_vec3(&mut r, &mut blk.center)?;
    for f in 0..3 {
        let mut a = blk.f_area[f].clone();
        get_array_um(&mut r, &mut a)?;
        blk.f_area[f] = a;
    }
    for f in 0..3 {
        let mut a = blk.f_center[f].clone();
        get_array_vec3(&mut r, &mut a)?;
        blk.f_center[f] = a;
    }
    get_array_f64(&mut r, &mut blk.vol)?;

    // 边界描述符
    let mut counts = [0usize; 3];
    for c in counts.iter_mut() {
        *c = r.get_i32()? as usize;
    }
    let n_surf = counts.iter().sum::<usize>();
    let mut cols = vec![vec![0i32; n_surf]; 7];
    for col in cols.iter_mut() {
        for v in col.iter_mut() {
            *v = r.get_i32()?;
        }
    }
    let mut name_lens = vec![0usize; n_surf];
    for v in name_lens.iter_mut() {
        *v = r.get_i32()? as usize;
    }
    let mut surfs = Vec::with_capacity(n_surf);
    for n in 0..n_surf {
        let name = std::str::from_utf8(r.get_bytes(name_lens[n])?)
            .map_err(|_| AfxError::halo("标签名不是合法 UTF-8".to_string()))?;
        let kind = BcKind::from_name(name)?;
        let (i_min, i_max) = (cols[0][n] as usize, cols[1][n] as usize);
        let (j_min, j_max) = (cols[2][n] as usize, cols[3][n] as usize);
        let (k_min, k_max) = (cols[4][n] as usize, cols[5][n] as usize);
        // 表面号由常数方向与面索引恢复
        let surface = if n < counts[0] {
            if i_min == 0 {
                1
            } else {
                2
            }
        } else if n < counts[0] + counts[1] {
            if j_min == 0 {
                3
            } else {
                4
            }
        } else if k_min == 0 {
            5
        } else {
            6
        };
        surfs.push(BoundarySurface {
            kind,
            surface,
            i_min,
            i_max,
            j_min,
            j_max,
            k_min,
            k_max,
            tag: cols[6][n],
        });
    }
    blk.bc = BlockBoundary::new(surfs);
    r.expect_end()?;
    Ok(blk)
}

// ============================================================
// 解缓冲（收集）
// ============================================================

/// 打包解数据: state、residual、dt、avgWaveSpeed
pub fn pack_solution(blk: &Block) -> Vec<u8> {
    let mut w = ByteWriter::new();
    put_array_eq(&mut w, &blk.state);
    put_array_eq(&mut w, &blk.residual);
    put_array_f64(&mut w, &blk.dt);
    put_array_f64(&mut w, &blk.avg_wave_speed);
    w.finish()
}

/// 把解数据写回协调者侧的块
pub fn unpack_solution_into(blk: &mut Block, buf: &[u8]) -> AfxResult<()> {
    let mut r = ByteReader::new(buf);
    get_array_eq(&mut r, &mut blk.state)?;
    get_array_eq(&mut r, &mut blk.residual)?;
    get_array_f64(&mut r, &mut blk.dt)?;
    get_array_f64(&mut r, &mut blk.avg_wave_speed)?;
    r.expect_end()
}

// ============================================================
// 切片缓冲（交界面 halo）
// ============================================================

/// 打包状态切片
pub fn pack_state_slice(slice: &StateSlice) -> Vec<u8> {
    let mut w = ByteWriter::new();
    let [ni, nj, nk] = slice.dims();
    w.put_i32(slice.parent_block as i32);
    w.put_i32(ni as i32);
    w.put_i32(nj as i32);
    w.put_i32(nk as i32);
    put_array_eq(&mut w, &slice.state);
    w.finish()
}

/// 解包状态切片
pub fn unpack_state_slice(buf: &[u8]) -> AfxResult<StateSlice> {
    let mut r = ByteReader::new(buf);
    let parent_block = r.get_i32()? as usize;
    let ni = r.get_i32()? as usize;
    let nj = r.get_i32()? as usize;
    let nk = r.get_i32()? as usize;
    let mut state = Array3::new(ni, nj, nk, EqArray::ZERO);
    get_array_eq(&mut r, &mut state)?;
    r.expect_end()?;
    Ok(StateSlice {
        parent_block,
        state,
    })
}

/// 打包 ΔU 切片（与状态切片同构，不带父块号）
pub fn pack_update_slice(a: &Array3<EqArray>) -> Vec<u8> {
    let mut w = ByteWriter::new();
    let [ni, nj, nk] = a.dims();
    w.put_i32(ni as i32);
    w.put_i32(nj as i32);
    w.put_i32(nk as i32);
    put_array_eq(&mut w, a);
    w.finish()
}

/// 解包 ΔU 切片
pub fn unpack_update_slice(buf: &[u8]) -> AfxResult<Array3<EqArray>> {
    let mut r = ByteReader::new(buf);
    let ni = r.get_i32()? as usize;
    let nj = r.get_i32()? as usize;
    let nk = r.get_i32()? as usize;
    let mut a = Array3::new(ni, nj, nk, EqArray::ZERO);
    get_array_eq(&mut r, &mut a)?;
    r.expect_end()?;
    Ok(a)
}

// ============================================================
// 连接记录
// ============================================================

/// 打包连接列表：计数 + 每条 19 个 i32（10 组整数）+ 并行的
/// 边缘旗标字节
pub fn pack_connections(conns: &[BlockConnection]) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.put_i32(conns.len() as i32);
    for c in conns {
        for side in 0..2 {
            w.put_i32(c.rank[side] as i32);
        }
        for side in 0..2 {
            w.put_i32(c.block[side] as i32);
        }
        for side in 0..2 {
            w.put_i32(c.local_block[side] as i32);
        }
        for side in 0..2 {
            w.put_i32(c.boundary[side] as i32);
        }
        for side in 0..2 {
            w.put_i32(c.d1_start[side] as i32);
        }
        for side in 0..2 {
            w.put_i32(c.d1_end[side] as i32);
        }
        for side in 0..2 {
            w.put_i32(c.d2_start[side] as i32);
        }
        for side in 0..2 {
            w.put_i32(c.d2_end[side] as i32);
        }
        for side in 0..2 {
            w.put_i32(c.const_surf[side] as i32);
        }
        w.put_i32(c.orientation as i32);
    }
    // 边缘旗标并行数组（协调者几何交换的 T 形交汇检测结果）
    for c in conns {
        for side in 0..2 {
            for e in 0..4 {
                w.put_u8(c.border[side][e] as u8);
            }
        }
    }
    w.finish()
}

/// 解包连接列表
pub fn unpack_connections(buf: &[u8]) -> AfxResult<Vec<BlockConnection>> {
    let mut r = ByteReader::new(buf);
    let n = r.get_i32()? as usize;
    let mut conns = Vec::with_capacity(n);
    for _ in 0..n {
        let mut get2 = |r: &mut ByteReader<'_>| -> AfxResult<[usize; 2]> {
            Ok([r.get_i32()? as usize, r.get_i32()? as usize])
        };
        let rank = get2(&mut r)?;
        let block = get2(&mut r)?;
        let local_block = get2(&mut r)?;
        let boundary = get2(&mut r)?;
        let d1_start = get2(&mut r)?;
        let d1_end = get2(&mut r)?;
        let d2_start = get2(&mut r)?;
        let d2_end = get2(&mut r)?;
        let const_surf = get2(&mut r)?;
        let orientation = r.get_i32()? as u8;
        let conn = BlockConnection {
            rank,
            block,
            local_block,
            boundary,
            d1_start,
            d1_end,
            d2_start,
            d2_end,
            const_surf,
            orientation,
            border: [[false; 4]; 2],
        };
        conn.validate()?;
        conns.push(conn);
    }
    for c in conns.iter_mut() {
        for side in 0..2 {
            for e in 0..4 {
                c.border[side][e] = r.get_u8()? != 0;
            }
        }
    }
    r.expect_end()?;
    Ok(conns)
}

// ============================================================
// L∞ 残差记录
// ============================================================

/// 打包 L∞ 记录：1 个 f64 + 5 个 i32
pub fn pack_resid(res: &ResidLinf) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.put_f64(res.linf);
    w.put_i32(res.block);
    w.put_i32(res.i);
    w.put_i32(res.j);
    w.put_i32(res.k);
    w.put_i32(res.eq);
    w.finish()
}

/// 解包 L∞ 记录
pub fn unpack_resid(buf: &[u8]) -> AfxResult<ResidLinf> {
    let mut r = ByteReader::new(buf);
    let out = ResidLinf {
        linf: r.get_f64()?,
        block: r.get_i32()?,
        i: r.get_i32()?,
        j: r.get_i32()?,
        k: r.get_i32()?,
        eq: r.get_i32()?,
    };
    r.expect_end()?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use afx_physics::boundary::BcKind;
    use afx_physics::connection::connection_between;

    fn sample_block() -> Block {
        let mut kinds = [BcKind::SlipWall; 6];
        kinds[3] = BcKind::SubsonicOutflow;
        let mut blk = Block::cartesian(
            3,
            2,
            2,
            2,
            DVec3::new(0.5, 0.0, 0.0),
            DVec3::ONE,
            BlockBoundary::for_box(3, 2, 2, kinds),
        );
        blk.parent_block = 4;
        blk.parent_range = [1, 4, 0, 2, 0, 2];
        blk.rank = 3;
        blk.global_pos = 7;
        for (n, v) in blk.state.raw_mut().iter_mut().enumerate() {
            v[0] = n as f64;
        }
        blk
    }

    #[test]
    fn test_block_roundtrip() {
        let blk = sample_block();
        let buf = pack_block(&blk);
        let back = unpack_block(&buf).unwrap();
        assert_eq!(back.dims(), blk.dims());
        assert_eq!(back.global_pos, 7);
        assert_eq!(back.parent_block, 4);
        assert_eq!(back.parent_range, blk.parent_range);
        assert_eq!(back.state, blk.state);
        assert_eq!(back.vol, blk.vol);
        assert_eq!(back.center, blk.center);
        assert_eq!(back.f_area[1], blk.f_area[1]);
        assert_eq!(back.bc, blk.bc);
    }

    #[test]
    fn test_block_buffer_truncation_detected() {
        let blk = sample_block();
        let buf = pack_block(&blk);
        let err = unpack_block(&buf[..buf.len() - 3]).unwrap_err();
        assert!(matches!(err, AfxError::HaloProtocol(_)));
    }

    #[test]
    fn test_solution_roundtrip() {
        let mut blk = sample_block();
        blk.residual[(0, 0, 0)][4] = 3.5;
        blk.dt.fill(0.25);
        let buf = pack_solution(&blk);

        let mut dest = sample_block();
        dest.state.fill(EqArray::ZERO);
        unpack_solution_into(&mut dest, &buf).unwrap();
        assert_eq!(dest.state, blk.state);
        assert_eq!(dest.residual[(0, 0, 0)][4], 3.5);
        assert_eq!(dest.dt[(1, 1, 1)], 0.25);
    }

    #[test]
    fn test_connections_roundtrip() {
        let mut c = connection_between(
            [0, 1],
            [2, 1],
            [(0, 4), (0, 4)],
            [(1, 3), (1, 3)],
            [4, 0],
            7,
        );
        c.rank = [1, 2];
        c.border[0][2] = true;
        let buf = pack_connections(std::slice::from_ref(&c));
        let back = unpack_connections(&buf).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0], c);
    }

    #[test]
    fn test_resid_roundtrip() {
        let r = ResidLinf {
            linf: 0.125,
            block: 2,
            i: 3,
            j: 4,
            k: 5,
            eq: 6,
        };
        let back = unpack_resid(&pack_resid(&r)).unwrap();
        assert_eq!(back, r);
    }
}
