//! A lazily populated, change-notifying virtual list.
//!
//! For async data sources (paged APIs, whole-list fetches) and a tokio bridge that drives a
//! [`VirtualizingVector`] from them, see the `datalist-async` crate.
//!
//! This crate holds the synchronous core: a list of [`Slot`]s that can be sized before any
//! item is known, and a read-only vector on top of it that asks [`FetchHooks`] for data the
//! first time it is needed and tells observers when that data arrives.
//!
//! It is UI-agnostic. A UI layer is expected to:
//! - read `count()` / `get(i)` for what it wants to show
//! - subscribe to property and collection notifications and re-read on change
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod events;
mod list;
mod slot;
mod vector;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use events::{
    ChangedProperty, CollectionChange, CollectionChangedCallback, Notification, Observers,
    PendingNotifications, PropertyChangedCallback, SubscriptionId,
};
pub use list::{Slots, VirtualizingList};
pub use slot::Slot;
pub use vector::{FetchHooks, Iter, VirtualizingVector};
