//! Table lifecycle: configuration, the state composer and logging setup.

pub mod config;
pub mod table;
pub mod tracing;

pub use config::{HttpSettings, PollingConfig, TableConfig};
pub use table::TableStateProvider;
pub use self::tracing::setup_tracing;
