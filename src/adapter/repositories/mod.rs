//! Repository Implementations
//!
//! Domain層のRepositoryトレイトの実装

pub mod arm_resource_repository;
pub mod file_manifest_repository;
pub mod json_state_repository;
