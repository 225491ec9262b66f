//! # Domain Layer
//!
//! このモジュールは Data Factory リソースのモデルとルールを定義します。
//!
//! ## 特徴
//!
//! - HTTP や認証について何も知らない
//! - フレームワークに依存しない
//! - 純粋な変換・検証ロジック
//!
//! ## 構成要素
//!
//! - **entities**: API モデル（Dataset, LinkedService, Pipeline など）とリソースID
//! - **errors**: ドメインエラー
//! - **repositories**: Repository trait（インターフェース定義のみ）
//! - **schema**: 属性スキーマ、検証、差分計画
//! - **services**: Domain Service（差分抑制、圧縮の正規化、共通フィールドの変換）

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod schema;
pub mod services;
