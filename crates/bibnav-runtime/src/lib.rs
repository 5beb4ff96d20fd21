pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod store;

pub use config::{ColorSpec, Config, DatabaseConfig, TuiConfig};
pub use error::{Error, Result};
pub use history::History;
pub use store::{ListArgs, RecordStore, StoreOptions};
