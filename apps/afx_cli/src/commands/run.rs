// apps/afx_cli/src/commands/run.rs

//! run 子命令
//!
//! 读取 JSON 配置，在 N 个线程 worker 上以 SPMD 方式运行演示
//! 算例。块数由算例的 splits 给出，手动分解要求 worker 数与其
//! 相等。

use std::path::PathBuf;
use std::thread;

use anyhow::{anyhow, Context};
use clap::Args;

use afx_comm::{MessageLayer, ThreadComm};
use afx_config::SolverInput;
use afx_physics::turbulence::NoTurbulence;
use afx_solver::{build_case, driver::freestream_state, run_simulation};

/// run 参数
#[derive(Args)]
pub struct RunArgs {
    /// JSON 配置文件
    #[arg(short, long)]
    config: PathBuf,
}

/// 执行模拟
pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let input = SolverInput::from_json_file(&args.config)
        .with_context(|| format!("读取配置 {}", args.config.display()))?;
    let case = input
        .case
        .clone()
        .ok_or_else(|| anyhow!("配置缺少 case 段"))?;

    let freestream = freestream_state(&input, &NoTurbulence);
    let blocks = build_case(&case, &input, &freestream)?;
    let num_workers = blocks.len();

    tracing::info!(
        "算例 {}x{}x{}，{} 块，{} worker",
        case.cells[0],
        case.cells[1],
        case.cells[2],
        num_workers,
        num_workers
    );

    let comms = ThreadComm::create(num_workers);
    let mut outcome = None;

    thread::scope(|s| {
        let mut handles = Vec::new();
        for comm in comms {
            let input = input.clone();
            let blocks = if comm.rank() == 0 {
                blocks.clone()
            } else {
                Vec::new()
            };
            handles.push(s.spawn(move || run_simulation(&input, blocks, &comm, 0)));
        }
        for h in handles {
            let result = h.join().expect("worker 线程崩溃");
            match result {
                Ok(o) if o.blocks.is_some() => outcome = Some(o),
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("worker 失败: {}", e);
                }
            }
        }
    });

    let outcome = outcome.ok_or_else(|| anyhow!("求解未完成"))?;
    tracing::info!(
        "完成: L2 = {:.6e}, L∞ = {:.6e} @ 块 {} ({}, {}, {}) 方程 {}",
        outcome.l2.norm(),
        outcome.linf.linf,
        outcome.linf.block,
        outcome.linf.i,
        outcome.linf.j,
        outcome.linf.k,
        outcome.linf.eq
    );
    Ok(())
}
