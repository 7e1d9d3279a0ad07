pub mod config;
pub mod error;
pub mod posting;
pub mod record;

pub use config::{Config, Section};
pub use error::*;
pub use posting::RawPosting;
pub use record::*;
