pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod inventory;
pub mod orchestrator;
pub mod service;
pub mod verification;

#[cfg(test)]
mod test_server;

pub use crate::config::Config;
pub use error::{DownloadError, EspaError, ServiceError};
