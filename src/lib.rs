pub mod config;
pub mod core;
pub mod domain;
pub mod proxy;
pub mod utils;

pub use crate::config::ProxyConfig;
pub use crate::core::{SxmClient, SxmStream};
pub use crate::domain::model::{Bitrate, Channel, PlaybackKey};
pub use crate::utils::error::{Result, SxmError};
