pub mod config;
pub mod documents;
pub mod error;
pub mod llm;
pub mod server;
pub mod uploads;

pub use error::{Error, Result};
