//! Synthetic identity-card generator and benchmark utilities for runscan.
//!
//! This crate produces deterministic OCR-style card text with a known RUN
//! planted in it, for benchmarking and property-based testing of
//! `runscan-core`.

pub mod generator;

pub use generator::{GeneratorConfig, SizeTier, SyntheticCard, generate_card, generate_cards};
