//! Manifest builders — pure record constructors for each resource kind.
//!
//! Builders never touch the injector. They map already-resolved inputs to
//! nested records the resolver treats as opaque.

pub mod network;
pub mod record;
pub mod storage;
pub mod workload;
