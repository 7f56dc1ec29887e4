//! Event Bus (spec §4.5): synchronous fan-out of `sindri_domain::model::Event`
//! to subscribers, in publish order.

pub mod bus;

pub use bus::{EventBus, SubscriptionHandle};
