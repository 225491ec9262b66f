//! # Domain Entities
//!
//! Data Factory の API モデルとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **Dataset / LinkedService / Credential / Pipeline**: `properties` の型付き表現
//! - **ResourceId**: ARM リソースIDのパースと生成
//! - **DynamicValue**: 式を受け付ける動的フィールド
//! - **ResourceData**: リソースインスタンスの設定と状態

pub mod common;
pub mod credential;
pub mod dataset;
pub mod dynamic_value;
pub mod linked_service;
pub mod pipeline;
pub mod resource_data;
pub mod resource_id;
