//! HTTP Surface
//!
//! Shared response envelope, error mapping and the router that wires the executor's
//! async endpoints and the text module's sync endpoints together.

pub mod envelope;
pub mod error;
pub mod router;

#[cfg(test)]
mod tests;
