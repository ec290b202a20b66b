// crates/afx_solver/src/case.rs

//! 演示算例构造
//!
//! 由 [`CaseConfig`] 生成沿 i 方向等分的直角盒多块网格：先建整盒
//! 单块，再用块切分机制逐段切开——切面上自动生成互相配对的
//! interblock 贴片，交界面配对走与生产路径相同的几何校验。

use afx_config::{CaseConfig, SolverInput};
use afx_foundation::{AfxError, AfxResult};
use afx_physics::block::Block;
use afx_physics::boundary::{BcKind, BlockBoundary};
use afx_physics::eos::IdealGas;
use afx_physics::state::Primitive;
use glam::DVec3;

/// 构造算例块列表（全部位于协调者）
pub fn build_case(
    case: &CaseConfig,
    input: &SolverInput,
    freestream: &Primitive,
) -> AfxResult<Vec<Block>> {
    let [ni, nj, nk] = case.cells;
    if ni == 0 || nj == 0 || nk == 0 {
        return Err(AfxError::config("算例单元数不能为零".to_string()));
    }
    if case.splits == 0 || ni % case.splits != 0 {
        return Err(AfxError::config(format!(
            "i 方向单元数 {} 无法等分为 {} 块",
            ni, case.splits
        )));
    }

    let mut kinds = [BcKind::SlipWall; 6];
    for (n, name) in case.boundaries.iter().enumerate() {
        kinds[n] = BcKind::from_name(name)?;
        if kinds[n].is_interblock() {
            return Err(AfxError::config(
                "算例外表面不能是 interblock".to_string(),
            ));
        }
    }

    let eos = IdealGas::new(input.gamma);
    let spacing = DVec3::new(
        case.extent[0] / ni as f64,
        case.extent[1] / nj as f64,
        case.extent[2] / nk as f64,
    );
    let mut first = Block::cartesian(
        ni,
        nj,
        nk,
        input.ghost_layers,
        DVec3::ZERO,
        spacing,
        BlockBoundary::for_box(ni, nj, nk, kinds),
    );
    first.init_state(freestream, &eos);

    let chunk = ni / case.splits;
    let mut blocks = vec![first];
    let mut altered = Vec::new();
    for n in 1..case.splits {
        let last = blocks.len() - 1;
        let upper = blocks[last].split(afx_core::Direction::I, chunk, n, &mut altered);
        blocks.push(upper);
    }
    for (n, blk) in blocks.iter_mut().enumerate() {
        blk.global_pos = n;
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use afx_physics::pairing::pair_interblocks;

    #[test]
    fn test_build_case_splits() {
        let case = CaseConfig {
            cells: [8, 4, 4],
            extent: [2.0, 1.0, 1.0],
            splits: 2,
            boundaries: core::array::from_fn(|_| "slipWall".to_string()),
        };
        let input = SolverInput::default();
        let fs = Primitive {
            rho: 1.0,
            vel: DVec3::ZERO,
            p: 1.0 / input.gamma,
            k: 0.0,
            omega: 0.0,
        };
        let blocks = build_case(&case, &input, &fs).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].dims(), [4, 4, 4]);
        assert_eq!(blocks[1].dims(), [4, 4, 4]);
        let conns = pair_interblocks(&blocks).unwrap();
        assert_eq!(conns.len(), 1);
    }

    #[test]
    fn test_build_case_rejects_bad_split() {
        let case = CaseConfig {
            cells: [7, 4, 4],
            extent: [1.0, 1.0, 1.0],
            splits: 2,
            boundaries: core::array::from_fn(|_| "slipWall".to_string()),
        };
        let input = SolverInput::default();
        let fs = Primitive {
            rho: 1.0,
            vel: DVec3::ZERO,
            p: 1.0 / input.gamma,
            k: 0.0,
            omega: 0.0,
        };
        assert!(build_case(&case, &input, &fs).is_err());
    }
}
