//! Domain layer: typed views of operation payloads.
//!
//! The codec hands every response payload over as an opaque string because
//! its grammar depends on the operation.  The decoders in [`payload`] turn
//! those strings into typed values once the caller knows which operation
//! produced them.

pub mod payload;
