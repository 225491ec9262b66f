//! adf-provider - Azure Data Factory Resource Provider
//!
//! JSON マニフェストから Azure Data Factory の子リソースを管理する

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;

use adf_provider::driver::{Args, ProviderWorkflow};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    // Create workflow with injected dependencies
    let workflow = ProviderWorkflow::from_args(&args)?;

    workflow.execute(args).await
}
