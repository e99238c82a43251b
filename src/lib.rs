pub mod alerts;
pub mod config;
pub mod events;
pub mod findings;
pub mod handler;
pub mod listener;
pub mod num;
pub mod registry;
pub mod scanner;
pub mod state;
pub mod tui;

pub use findings::Alert;
pub use handler::CollateralMonitor;
pub use registry::ContractRegistry;
