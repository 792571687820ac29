pub mod classify;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod interpret;
pub mod platform;
pub mod response;
pub mod result;
pub mod server;
pub mod tools;
