pub use self::{
    account::{Account, AccountError, AccountId},
    engine::{EngineConfig, TransferEngine, TransferError},
    notifier::{ChannelNotifier, LogNotifier, Notification, Notifier},
    store::{AccountStore, InMemoryAccountStore, StoreError},
    transfer::Transfer,
};

mod account;
mod engine;
mod notifier;
mod store;
mod transfer;
