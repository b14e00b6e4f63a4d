//! wares-client - Rendering-independent list client
//!
//! A gateway abstraction over the items API plus the paginated list
//! controller: accumulating fetches, generation-tagged stale-response
//! rejection, explicit cancellation, and the infinite-scroll trigger.
//! No UI assumptions; any frontend renders from [`controller::ListSnapshot`].

pub mod controller;
pub mod gateway;

pub use controller::{ListController, ListSnapshot};
pub use gateway::{GatewayError, HttpGateway, ItemsGateway};
