//! Telar — Rust-native Kubernetes manifest generation.
//!
//! Composable modules. Dependency-injected resources. Deterministic,
//! deduplicated document streams with BLAKE3 fingerprints.

pub mod builders;
pub mod cli;
pub mod core;
