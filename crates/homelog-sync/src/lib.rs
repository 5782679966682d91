#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for sync notifications.
pub const TRACING_TARGET: &str = "homelog_sync";

mod action;
mod channel;
mod hub;
mod revalidate;
mod subscription;

pub use action::SyncAction;
pub use channel::{ChannelParseError, SyncChannel};
pub use hub::{DEFAULT_CAPACITY, DataSync};
pub use revalidate::revalidate_on;
pub use subscription::{SyncEvent, SyncSubscription};
