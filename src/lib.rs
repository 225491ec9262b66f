//! # adf-provider
//!
//! Azure Data Factory の子リソース（Dataset, Linked Service, Credential, Pipeline）を
//! 平坦な設定から作成・更新・削除するプロバイダー
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: API モデル、リソースID、スキーマ、差分抑制（外部依存なし）
//! - **Application層**: 設定 DTO、種別ごとのマッピング、ライフサイクルのユースケース
//! - **Adapter層**: 外部システムとの統合（Azure Resource Manager, Azure AD, ファイルシステム）
//! - **Driver層**: CLI、リソースレジストリ、依存性注入

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
// カバレッジ計測時に外部サービス依存コードを除外するために使用
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
