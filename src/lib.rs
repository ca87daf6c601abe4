pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, ShopperConfig};
pub use core::graph::{AgentGraph, AgentRun};
pub use domain::model::{DealNotification, PurchaseIntent, SearchResult, ShopperState};
pub use utils::error::{Result, ShopperError};
