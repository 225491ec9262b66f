//! # Driver Layer (Presentation)
//!
//! CLIやその他の外部インターフェースを提供
//!
//! ## 特徴
//!
//! - Use Caseを呼び出してリソースのライフサイクルを実行
//! - 依存性注入（DI）を行い、全てを組み立てる
//! - ユーザーとのインターフェース
//!
//! ## 構成要素
//!
//! - **cli**: CLI引数のパース
//! - **registry**: リソース種別と実装の対応
//! - **workflow**: コマンドごとのオーケストレーション

pub mod cli;
pub mod registry;
pub mod workflow;

pub use cli::{Args, Command};
pub use workflow::ProviderWorkflow;
