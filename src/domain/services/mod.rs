//! # Domain Services
//!
//! 特定のエンティティに属さないビジネスルール
//!
//! - **diff_suppress**: 接続文字列・JSON の差分抑制
//! - **compression**: 圧縮種別の正規化
//! - **activities**: アクティビティ JSON の変換
//! - **field_mapping**: 共通フィールドの expand / flatten

pub mod activities;
pub mod compression;
pub mod diff_suppress;
pub mod field_mapping;
