pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod pages;
pub mod transform;
pub mod view;

pub use context::AppContext;
pub use error::ClientError;
