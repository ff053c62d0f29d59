pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod proxy;
pub mod types;
