//! Demonstration client for text generation on IBM watsonx.ai
//!
//! Loads credentials from the environment, exchanges the API key for an IAM
//! bearer token, and runs a fixed set of generation scenarios through a
//! managed client and a direct HTTP call.

pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
