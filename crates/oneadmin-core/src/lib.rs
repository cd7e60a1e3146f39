pub mod config;
pub mod error;
pub mod render;
pub mod types;

pub use error::{ConsoleError, Result};
