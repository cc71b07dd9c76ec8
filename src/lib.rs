pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod ingest;
pub mod models;
pub mod overview;
pub mod report;

pub use error::{AppError, Result};
