pub mod config;
pub mod types;

pub use config::{Config, ResolverMode};
pub use types::*;
