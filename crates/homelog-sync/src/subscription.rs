use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::hub::Notification;
use crate::{SyncAction, SyncChannel, TRACING_TARGET};

/// A notification delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The backend announced `action` on the channel.
    Changed {
        channel: SyncChannel,
        action: SyncAction,
    },
    /// The subscriber fell behind and `missed` notifications were dropped.
    Lagged { channel: SyncChannel, missed: u64 },
}

impl SyncEvent {
    #[must_use]
    pub const fn channel(&self) -> SyncChannel {
        match self {
            Self::Changed { channel, .. } | Self::Lagged { channel, .. } => *channel,
        }
    }

    /// Returns the announced action, `None` for a lag notice.
    #[must_use]
    pub const fn action(&self) -> Option<&SyncAction> {
        match self {
            Self::Changed { action, .. } => Some(action),
            Self::Lagged { .. } => None,
        }
    }
}

/// Receives the notifications of one channel. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SyncSubscription {
    channel: SyncChannel,
    receiver: broadcast::Receiver<Notification>,
}

impl SyncSubscription {
    pub(crate) const fn new(channel: SyncChannel, receiver: broadcast::Receiver<Notification>) -> Self {
        Self { channel, receiver }
    }

    #[must_use]
    pub const fn channel(&self) -> SyncChannel {
        self.channel
    }

    /// Waits for the next event on this channel.
    ///
    /// Returns `None` once every [`DataSync`](crate::DataSync) handle is gone.
    pub async fn next(&mut self) -> Option<SyncEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(notification) if notification.channel == self.channel => {
                    return Some(SyncEvent::Changed {
                        channel: notification.channel,
                        action: notification.action,
                    });
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        channel = %self.channel,
                        missed,
                        "subscriber lagged, requesting revalidation"
                    );
                    return Some(SyncEvent::Lagged {
                        channel: self.channel,
                        missed,
                    });
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
