pub mod config;
pub mod error;
pub mod types;

pub use config::MarConfig;
pub use error::{MarError, Result};
pub use types::*;
