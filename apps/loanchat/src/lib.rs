//! # loanchat
//!
//! Terminal client for the loan assistant service. The view-model lives in
//! `loanchat-core`; this crate adds the HTTP client, configuration, the
//! controller that drives a conversation, and the CLI.

pub mod cli;
pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod render;

pub use client::{ClientError, LoanApi, LoanApiClient};
pub use config::{ConfigError, Settings};
pub use controller::{ChatController, candidate_from_path, save_letter};
pub use error::AppError;
