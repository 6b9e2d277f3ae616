pub mod auth;
pub mod config;
pub mod daemon;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod response;
pub mod statement;
pub mod store;

pub type Result<T> = std::result::Result<T, error::GatewayError>;
