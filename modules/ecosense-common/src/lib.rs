pub mod alert_store;
pub mod config;
pub mod types;

pub use alert_store::AlertStore;
pub use config::Config;
pub use types::*;
