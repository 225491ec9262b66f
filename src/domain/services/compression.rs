//! # Compression Normalization
//!
//! 圧縮種別の正規化
//!
//! 稼働中の API はドキュメント上の定数と異なる大文字小文字で種別を返すため、
//! 比較は大文字小文字を区別しない。

/// Binary Dataset の `compression.type` として受け付ける値
pub const BINARY_COMPRESSION_TYPES: [&str; 6] =
    ["BZip2", "Deflate", "GZip", "Tar", "TarGZip", "ZipDeflate"];

/// `compression_codec` として受け付ける値
pub const COMPRESSION_CODECS: [&str; 9] = [
    "bzip2", "deflate", "gzip", "lz4", "snappy", "tar", "TarGZip", "ZipDeflate", "none",
];

/// 圧縮レベル
pub const COMPRESSION_LEVELS: [&str; 2] = ["Optimal", "Fastest"];

/// 小文字に正規化される単語1つのコーデック
const LOWERCASE_CODECS: [&str; 6] = ["bzip2", "deflate", "gzip", "lz4", "snappy", "tar"];

/// 圧縮種別の正規化サービス
pub struct CompressionNormalizer;

impl CompressionNormalizer {
    /// `compression_codec` を API に送る形に正規化する
    ///
    /// 単語1つのコーデックは小文字に揃え、それ以外（`TarGZip` など）はそのまま渡す。
    ///
    /// # Examples
    ///
    /// ```
    /// use adf_provider::domain::services::compression::CompressionNormalizer;
    ///
    /// assert_eq!(CompressionNormalizer::expand_codec("GZip"), "gzip");
    /// assert_eq!(CompressionNormalizer::expand_codec("TarGZip"), "TarGZip");
    /// ```
    pub fn expand_codec(input: &str) -> String {
        LOWERCASE_CODECS
            .iter()
            .find(|codec| codec.eq_ignore_ascii_case(input))
            .map(|codec| codec.to_string())
            .unwrap_or_else(|| input.to_string())
    }

    /// API が返した Binary の圧縮種別を正規の表記に戻す
    ///
    /// # Returns
    ///
    /// 既知の種別であれば正規の表記、それ以外は空文字列
    pub fn flatten_binary_type(input: &str) -> String {
        BINARY_COMPRESSION_TYPES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(input))
            .map(|known| known.to_string())
            .unwrap_or_default()
    }
}
