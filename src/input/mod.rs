//! Inbound side of the view: graph and view events, widget commands and picking.

pub mod events;
pub mod picking;
pub mod widget;
