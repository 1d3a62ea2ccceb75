pub mod config;
pub mod error;
pub mod loader;
mod binder;
mod executor;

pub use config::{ChunkSize, LoadConfig};
pub use error::{ConfigError, LoadError, ParseErrorSet};
pub use executor::LoadState;
pub use loader::{BatchLoader, load, load_all};
