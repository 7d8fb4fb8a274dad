use std::sync::mpsc::Sender;

use crate::{Account, AccountId};

/// An event emitted towards one account after a committed transfer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub account: AccountId,
    pub description: String,
}

/// Receiver of post-transfer events
///
/// Notifiers are called while the engine holds its exclusive lock. They must
/// return quickly and must not panic. Failures are the notifier's own
/// business, there is nothing for the engine to roll back.
pub trait Notifier: Send + Sync {
    fn notify_about_transfer(&self, account: &Account, description: &str);
}

/// Writes every notification to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_about_transfer(&self, account: &Account, description: &str) {
        tracing::info!("Notification for Account ID: {} - {}", account.id(), description);
    }
}

/// Forwards every notification onto an unbounded channel
///
/// Sending never blocks. Once the receiving side is gone, events are dropped.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    sender: Sender<Notification>,
}

impl ChannelNotifier {
    pub fn new(sender: Sender<Notification>) -> Self {
        Self { sender }
    }
}

impl Notifier for ChannelNotifier {
    fn notify_about_transfer(&self, account: &Account, description: &str) {
        let notification = Notification {
            account: account.id().clone(),
            description: description.to_owned(),
        };
        if self.sender.send(notification).is_err() {
            tracing::warn!(account = %account.id(), "notification receiver disconnected, event dropped");
        }
    }
}
