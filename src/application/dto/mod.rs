//! # Data Transfer Objects
//!
//! リソースの平坦な設定表現（マニフェストの `config` と状態ファイルの属性）

pub mod credential;
pub mod dataset;
pub mod linked_service;
pub mod pipeline;
pub mod timeouts;
