//! Order events on the message bus.
//!
//! - [`OrderEventPublisher`] emits `OrderPaid` and falls back to the outbox
//!   when the bus is unavailable
//! - [`OutboxRelay`] redelivers outbox entries in the background
//! - [`ShipAssembledHandler`] closes the saga when a ship is built

mod consumer;
mod publisher;
mod relay;

pub use consumer::ShipAssembledHandler;
pub use publisher::{OrderEventPublisher, PublishOutcome};
pub use relay::{OutboxRelay, RelayStats};
