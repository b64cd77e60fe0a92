pub mod catalog;
pub mod client;
pub mod consts;
pub mod stream;

pub use crate::domain::model::{Bitrate, Channel, PlaybackKey};
pub use crate::utils::error::Result;
pub use self::client::SxmClient;
pub use self::stream::SxmStream;
