//! Job-state synchronization engine for Z-Image generation jobs.
//!
//! Keeps a locally consistent, ordered view of asynchronously processed
//! generation jobs without refetching the full list on every change:
//! the bulk history fetch seeds the store once, a successful submission
//! inserts an optimistic record immediately, an adaptive poller
//! refreshes exactly the non-terminal jobs, and a derived busy signal
//! tells consumers whether anything is still in flight.

pub mod config;
pub mod events;
mod poller;
pub mod store;
pub mod tracker;
