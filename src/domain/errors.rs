//! # Domain Errors
//!
//! Data Factory リソース操作のエラー分類

use std::time::Duration;
use thiserror::Error;

/// Data Factory リソース操作で発生するエラー
#[derive(Debug, Error)]
pub enum DataFactoryError {
    /// リソースIDのパースに失敗
    #[error("parsing {input:?} as a Data Factory resource ID: {reason}")]
    InvalidId { input: String, reason: String },

    /// スキーマまたはマッピングのバリデーション違反
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// 作成前の存在チェックで既存リソースが見つかった（インポートが必要）
    #[error(
        "A resource with the ID {id:?} already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for {resource_type:?} for more information"
    )]
    AlreadyExists { resource_type: String, id: String },

    /// Azure Resource Manager が返したエラーレスポンス
    #[error("Data Factory API returned status {status}: {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// 操作ごとのタイムアウト超過
    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    /// トークン取得の失敗
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// API が想定外の型のオブジェクトを返した
    #[error("expected a {expected} object, but the API returned type {actual:?}")]
    UnexpectedType { expected: String, actual: String },
}

impl DataFactoryError {
    /// APIエラーが 404 Not Found かどうか
    pub fn is_not_found(&self) -> bool {
        matches!(self, DataFactoryError::Api { status: 404, .. })
    }
}

/// anyhow エラーチェーンの中に 404 が含まれているか確認
///
/// コンテキストで包まれていても検出する。
pub fn response_was_not_found(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<DataFactoryError>()
            .is_some_and(DataFactoryError::is_not_found)
    })
}
