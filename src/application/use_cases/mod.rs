//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **ResourceUseCase**: リソースの Create / Read / Update / Delete

pub mod resource_lifecycle;
