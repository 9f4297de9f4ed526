pub mod config;
pub mod error;
pub mod feed;
pub mod notifier;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use feed::{FeedRequest, PriceFeed};
pub use notifier::{LogNotifier, Notifier};
pub use types::*;
