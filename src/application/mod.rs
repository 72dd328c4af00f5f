//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `LedgerEngine`, the primary entry point for
//! posting sales and payments, plus the reporting aggregations that consume
//! the engine's sale log.

pub mod engine;
pub mod reporting;
