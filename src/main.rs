use anyhow::Result;
use clap::Parser;
use xid_fixer::cli::Cli;
use xid_fixer::utils::logging;
use xid_fixer::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    let batch = Cli::parse().into_batch().await?;

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run(&batch).await?;

    Ok(())
}
