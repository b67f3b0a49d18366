pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::PingieConfig;
pub use error::{PingieError, Result};
pub use types::*;
