mod loader;
mod types;

pub use loader::{ConfigLayer, ConfigLoader};
pub use types::{AiConfig, DealscopeConfig};
