pub mod config;
pub mod error;
pub mod types;

pub use config::{AlmanacConfig, DefaultsConfig};
pub use error::{AlmanacError, Result};
pub use types::NamedSchedule;
