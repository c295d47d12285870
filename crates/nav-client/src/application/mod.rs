//! Application layer for the client.
//!
//! # What use cases does the client have?
//!
//! One per server capability: add a location, add a road, find the shortest
//! path, list locations, list roads, fetch one location, seed sample data,
//! persist to disk, and request shutdown.
//!
//! - **`operations`** – the [`RequestChannel`](operations::RequestChannel)
//!   trait that any request/response carrier implements, the
//!   [`NavigationOps`](operations::NavigationOps) extension trait with one
//!   typed method per capability, and the parameter builders behind them.
//!   Payload interpretation stays with the decoders in
//!   `nav_core::domain::payload`.

pub mod operations;
