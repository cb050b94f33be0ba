//! Analysis pipeline over a normalized ledger.
//!
//! This module provides:
//! - The fused per-instrument pass (accumulator, toxicity, FIFO matching)
//! - Batch orchestration with per-instrument failure isolation
//! - Sequential and concurrent execution with identical results

pub mod batch;
pub mod instrument;

pub use batch::{BatchAnalyzer, BatchReport, BatchSummary, FailureSummary};
pub use instrument::{analyze_instrument, InstrumentReport};
