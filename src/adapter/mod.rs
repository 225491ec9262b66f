//! Adapter Layer
//!
//! 外部システム（Azure Resource Manager, Azure AD, ファイルシステム）との統合

pub mod azure;
pub mod config;
pub mod repositories;
