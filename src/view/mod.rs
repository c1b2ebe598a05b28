//! Gated views: authorize, fetch, transform locally, render, mutate.

pub mod composite;
pub mod controller;
pub mod state;
pub mod ticket;

#[cfg(test)]
pub(crate) mod testing;

pub use composite::{CompositeState, CompositeView, Loader};
pub use controller::{ViewController, ViewOptions};
pub use state::{Rendered, ViewState, ViewStatus};
pub use ticket::Tickets;
