// crates/afx_comm/src/reduce.rs

//! 残差归约
//!
//! L2 按分量求和；L∞ 用保留定位的成对取大。协调者归并后把结果
//! 广播回去，全体 worker 看到一致的归约值。

use afx_foundation::AfxResult;
use afx_physics::residual::{ResidLinf, ResidualL2};

use crate::codec::{self, ByteReader, ByteWriter};
use crate::layer::MessageLayer;

/// 归约消息 tag
const TAG_REDUCE: u32 = 3000;

/// 全局归约 L2 与 L∞
pub fn reduce_residuals(
    comm: &dyn MessageLayer,
    root: usize,
    l2: &mut ResidualL2,
    linf: &mut ResidLinf,
) -> AfxResult<()> {
    let rank = comm.rank();

    if rank == root {
        for src in 0..comm.size() {
            if src == root {
                continue;
            }
            let buf = comm.recv(src, TAG_REDUCE)?;
            let (other_l2, other_linf) = decode(&buf)?;
            l2.merge(&other_l2);
            *linf = linf.max(other_linf);
        }
        comm.broadcast(root, Some(encode(l2, linf)))?;
    } else {
        comm.send(root, TAG_REDUCE, encode(l2, linf))?;
        let buf = comm.broadcast(root, None)?;
        let (red_l2, red_linf) = decode(&buf)?;
        *l2 = red_l2;
        *linf = red_linf;
    }
    Ok(())
}

fn encode(l2: &ResidualL2, linf: &ResidLinf) -> Vec<u8> {
    let mut w = ByteWriter::new();
    for v in l2.0 {
        w.put_f64(v);
    }
    w.put_bytes(&codec::pack_resid(linf));
    w.finish()
}

fn decode(buf: &[u8]) -> AfxResult<(ResidualL2, ResidLinf)> {
    let mut r = ByteReader::new(buf);
    let mut l2 = ResidualL2::ZERO;
    for v in l2.0.iter_mut() {
        *v = r.get_f64()?;
    }
    let rest = r.get_bytes(8 + 5 * 4)?;
    let linf = codec::unpack_resid(rest)?;
    r.expect_end()?;
    Ok((l2, linf))
}
