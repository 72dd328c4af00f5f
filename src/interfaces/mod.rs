//! Transport adapters. Only a CSV surface for now; the engine itself is
//! transport-agnostic.

pub mod csv;
