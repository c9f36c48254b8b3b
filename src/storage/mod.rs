//! Result Storage Module
//!
//! Keeps the current record of every task, keyed by task id.
//!
//! ## Core Concepts
//! - **Source of truth**: status queries read only from here.
//! - **Atomic updates**: a record changes through `apply`, which runs one state-machine
//!   transition under the key's lock.
//! - **Backends**: `ResultStore` is the seam; `MemoryResultStore` keeps records for the
//!   lifetime of the process.

pub mod memory;
pub mod result_store;
