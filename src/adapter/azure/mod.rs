//! Azure Resource Manager
//!
//! ARM REST API と Azure AD 認証

pub mod auth;
pub mod client;
pub mod models;

pub use auth::{credential_from_config, TokenCredential};
pub use client::{ArmClient, HttpArmClient, OfflineArmClient};
