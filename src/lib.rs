//! Parallel winner lookup over large delimited draw pools.
//!
//! ## Scope
//! This crate scans a line-oriented pool file (`name;n1;...;nk` per record)
//! and reports every record whose trailing numbers match a target tuple:
//! all of them as a multiset (exact mode) or at least a threshold count of
//! them (partial mode), order-independent in both.
//!
//! ## Key invariants
//! - The pool is a read-only byte view (mmap or owned) shared by every
//!   worker for the whole run; nothing writes it.
//! - Match state (permutation index or presence table) is built once before
//!   workers start and is never mutated afterward.
//! - Regions partition the pool exactly on line boundaries: no record is
//!   split, no byte scanned twice by different workers.
//! - Every wide read is bounds-guarded through one central primitive;
//!   workers check their region floor before fixed-offset reads.
//! - Each line-break boundary is tested exactly once, so output carries no
//!   duplicate winners.
//!
//! ## Scan flow
//! `TargetTuple -> MatchPlan -> RegionPlanner -> RegionWorker (one thread
//! each) -> OutputSink`
//!
//! ## Notable entry points
//! - [`engine::scan`] with a [`MatchPlan`] and [`ScanConfig`]: one full pass.
//! - [`PoolView`]: mmap- or memory-backed pool bytes.
//! - [`OutputSink`] implementations: stdout for the CLI, `VecSink`/`NullSink`
//!   for tests and benches.
//!
//! ## Design trade-offs
//! Exact matching spends up to k! canonical keys at startup to make each
//! candidate test a single hash probe. Partial matching skips the index and
//! decodes k tokens per candidate against a direct-addressed table instead.

pub mod bytes;
pub mod engine;
pub mod index;
pub mod key;
pub mod output_sink;
pub mod presence;
pub mod region;
pub mod swar;
pub mod target;
#[cfg(test)]
pub mod test_utils;
pub mod worker;

pub use bytes::PoolView;
pub use engine::{scan, MatchPlan, ScanConfig, ScanReport};
pub use output_sink::{NullSink, OutputSink, StdoutSink, VecSink};
pub use region::{plan_regions, Region};
pub use target::{TargetError, TargetTuple};
