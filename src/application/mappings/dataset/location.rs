//! # Dataset Location Mapping
//!
//! 排他的な `*_location` ブロックと `DatasetLocation` の相互変換

use log::warn;

use crate::application::dto::dataset::{
    AzureBlobFsLocationConfig, AzureBlobStorageLocationConfig, HttpServerLocationConfig,
    LocationBlocks, SftpServerLocationConfig,
};
use crate::domain::entities::dataset::DatasetLocation;
use crate::domain::entities::dynamic_value::{flatten_optional_dynamic, DynamicValue};
use crate::domain::errors::DataFactoryError;
use crate::domain::schema::{Attribute, Schema, Validation};

pub const HTTP_SERVER_LOCATION: &str = "http_server_location";
pub const AZURE_BLOB_STORAGE_LOCATION: &str = "azure_blob_storage_location";
pub const AZURE_BLOB_FS_LOCATION: &str = "azure_blob_fs_location";
pub const SFTP_SERVER_LOCATION: &str = "sftp_server_location";

/// 空文字列は送信しない
fn expand_optional(value: Option<&str>, dynamic: bool) -> Option<DynamicValue> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| DynamicValue::expand(v, dynamic))
}

/// 設定されたブロックから格納場所を組み立てる
///
/// # Errors
///
/// どのブロックも設定されていない場合
pub fn expand_location(blocks: &LocationBlocks) -> Result<DatasetLocation, DataFactoryError> {
    if let Some(http) = &blocks.http_server_location {
        return Ok(DatasetLocation::HttpServer {
            relative_url: Some(DynamicValue::expand(&http.relative_url, false)),
            folder_path: expand_optional(Some(&http.path), http.dynamic_path_enabled),
            file_name: expand_optional(Some(&http.filename), http.dynamic_filename_enabled),
        });
    }

    if let Some(blob) = &blocks.azure_blob_storage_location {
        return Ok(DatasetLocation::AzureBlobStorage {
            container: expand_optional(Some(&blob.container), blob.dynamic_container_enabled),
            folder_path: expand_optional(blob.path.as_deref(), blob.dynamic_path_enabled),
            file_name: expand_optional(blob.filename.as_deref(), blob.dynamic_filename_enabled),
        });
    }

    if let Some(fs) = &blocks.azure_blob_fs_location {
        return Ok(DatasetLocation::AzureBlobFs {
            file_system: expand_optional(fs.file_system.as_deref(), fs.dynamic_file_system_enabled),
            folder_path: expand_optional(fs.path.as_deref(), fs.dynamic_path_enabled),
            file_name: expand_optional(fs.filename.as_deref(), fs.dynamic_filename_enabled),
        });
    }

    if let Some(sftp) = &blocks.sftp_server_location {
        return Ok(DatasetLocation::Sftp {
            folder_path: expand_optional(Some(&sftp.path), sftp.dynamic_path_enabled),
            file_name: expand_optional(Some(&sftp.filename), sftp.dynamic_filename_enabled),
        });
    }

    Err(DataFactoryError::Validation(vec![
        "a location block must be specified".to_string(),
    ]))
}

/// 格納場所をブロックに平坦化する
///
/// 式で返された値は `dynamic_*_enabled` を立てる。
/// 未対応の格納場所はログを出して空のブロックを返す。
pub fn flatten_location(location: &DatasetLocation) -> LocationBlocks {
    let mut blocks = LocationBlocks::default();

    match location {
        DatasetLocation::HttpServer {
            relative_url,
            folder_path,
            file_name,
        } => {
            let (relative_url, _) =
                flatten_optional_dynamic("relative_url", relative_url.as_ref()).unwrap_or_default();
            let (path, dynamic_path_enabled) =
                flatten_optional_dynamic("path", folder_path.as_ref()).unwrap_or_default();
            let (filename, dynamic_filename_enabled) =
                flatten_optional_dynamic("filename", file_name.as_ref()).unwrap_or_default();
            blocks.http_server_location = Some(HttpServerLocationConfig {
                relative_url,
                path,
                filename,
                dynamic_path_enabled,
                dynamic_filename_enabled,
            });
        }
        DatasetLocation::AzureBlobStorage {
            container,
            folder_path,
            file_name,
        } => {
            let (container, dynamic_container_enabled) =
                flatten_optional_dynamic("container", container.as_ref()).unwrap_or_default();
            let path = flatten_optional_dynamic("path", folder_path.as_ref());
            let filename = flatten_optional_dynamic("filename", file_name.as_ref());
            blocks.azure_blob_storage_location = Some(AzureBlobStorageLocationConfig {
                container,
                dynamic_path_enabled: path.as_ref().is_some_and(|(_, dynamic)| *dynamic),
                dynamic_filename_enabled: filename.as_ref().is_some_and(|(_, dynamic)| *dynamic),
                path: path.map(|(value, _)| value),
                filename: filename.map(|(value, _)| value),
                dynamic_container_enabled,
            });
        }
        DatasetLocation::AzureBlobFs {
            file_system,
            folder_path,
            file_name,
        } => {
            let file_system = flatten_optional_dynamic("file_system", file_system.as_ref());
            let path = flatten_optional_dynamic("path", folder_path.as_ref());
            let filename = flatten_optional_dynamic("filename", file_name.as_ref());
            blocks.azure_blob_fs_location = Some(AzureBlobFsLocationConfig {
                dynamic_file_system_enabled: file_system.as_ref().is_some_and(|(_, d)| *d),
                dynamic_path_enabled: path.as_ref().is_some_and(|(_, d)| *d),
                dynamic_filename_enabled: filename.as_ref().is_some_and(|(_, d)| *d),
                file_system: file_system.map(|(value, _)| value),
                path: path.map(|(value, _)| value),
                filename: filename.map(|(value, _)| value),
            });
        }
        DatasetLocation::Sftp {
            folder_path,
            file_name,
        } => {
            let (path, dynamic_path_enabled) =
                flatten_optional_dynamic("path", folder_path.as_ref()).unwrap_or_default();
            let (filename, dynamic_filename_enabled) =
                flatten_optional_dynamic("filename", file_name.as_ref()).unwrap_or_default();
            blocks.sftp_server_location = Some(SftpServerLocationConfig {
                path,
                filename,
                dynamic_path_enabled,
                dynamic_filename_enabled,
            });
        }
        DatasetLocation::Unsupported => {
            warn!("Skipping location since its type is not supported");
        }
    }

    blocks
}

fn dynamic_flag(name: &'static str) -> Attribute {
    Attribute::bool(name).optional().default_value(false)
}

/// 格納場所ブロックの属性
///
/// # Arguments
///
/// * `supported` - Dataset 種別が受け付けるブロック名（ちょうど1つが必須）
pub fn location_attributes(supported: &'static [&'static str]) -> Vec<Attribute> {
    let mut attributes = Vec::new();

    for name in supported {
        let schema = match *name {
            HTTP_SERVER_LOCATION => Schema::new(vec![
                Attribute::string("relative_url")
                    .required()
                    .validate(Validation::NotEmpty),
                Attribute::string("path").optional(),
                Attribute::string("filename")
                    .required()
                    .validate(Validation::NotEmpty),
                dynamic_flag("dynamic_path_enabled"),
                dynamic_flag("dynamic_filename_enabled"),
            ]),
            AZURE_BLOB_STORAGE_LOCATION => Schema::new(vec![
                Attribute::string("container")
                    .required()
                    .validate(Validation::NotEmpty),
                Attribute::string("path").optional(),
                Attribute::string("filename").optional(),
                dynamic_flag("dynamic_container_enabled"),
                dynamic_flag("dynamic_path_enabled"),
                dynamic_flag("dynamic_filename_enabled"),
            ]),
            AZURE_BLOB_FS_LOCATION => Schema::new(vec![
                Attribute::string("file_system").optional(),
                Attribute::string("path").optional(),
                Attribute::string("filename").optional(),
                dynamic_flag("dynamic_file_system_enabled"),
                dynamic_flag("dynamic_path_enabled"),
                dynamic_flag("dynamic_filename_enabled"),
            ]),
            SFTP_SERVER_LOCATION => Schema::new(vec![
                Attribute::string("path")
                    .required()
                    .validate(Validation::NotEmpty),
                Attribute::string("filename")
                    .required()
                    .validate(Validation::NotEmpty),
                dynamic_flag("dynamic_path_enabled"),
                dynamic_flag("dynamic_filename_enabled"),
            ]),
            _ => continue,
        };

        attributes.push(
            Attribute::block(*name, schema)
                .optional()
                .exactly_one_of(supported),
        );
    }

    attributes
}
