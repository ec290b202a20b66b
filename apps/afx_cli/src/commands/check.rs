// apps/afx_cli/src/commands/check.rs

//! check 子命令

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use afx_config::SolverInput;

/// check 参数
#[derive(Args)]
pub struct CheckArgs {
    /// JSON 配置文件
    #[arg(short, long)]
    config: PathBuf,
}

/// 校验配置并打印摘要
pub fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let input = SolverInput::from_json_file(&args.config)
        .with_context(|| format!("读取配置 {}", args.config.display()))?;

    tracing::info!("配置合法");
    tracing::info!("时间积分: {}", input.time_integration);
    tracing::info!("CFL: {}, 迭代: {}", input.cfl, input.iterations);
    if let Some(case) = &input.case {
        tracing::info!(
            "算例: {}x{}x{} / {} 块",
            case.cells[0],
            case.cells[1],
            case.cells[2],
            case.splits
        );
    }
    Ok(())
}
