//! Scan orchestration.
//!
//! The engine stays thin: build the match plan once, partition the
//! pool into line-aligned regions, run one worker thread per region to
//! completion, join, flush the sink. All shared state (view, plan, sink) is
//! immutable for the scan's lifetime, so workers need no locks on the read
//! path and the scope guarantees nothing outlives the call.

use crate::bytes::PoolView;
use crate::index::PermutationIndex;
use crate::key::MIN_SUFFIX_LEN;
use crate::output_sink::OutputSink;
use crate::presence::PresenceTable;
use crate::region::{plan_regions, SINGLE_REGION_THRESHOLD};
use crate::target::{TargetError, TargetTuple};
use crate::worker::{RegionWorker, WorkerStats};

// ============================================================================
// Match plan
// ============================================================================

pub(crate) enum MatchMode {
    Exact(PermutationIndex),
    AtLeast { table: PresenceTable, threshold: u32 },
}

/// How candidate records are judged, built once before workers start and
/// shared read-only across them.
pub struct MatchPlan {
    tokens: usize,
    mode: MatchMode,
}

impl MatchPlan {
    /// All k numbers equal as a multiset: permutation index over canonical
    /// keys.
    pub fn exact(target: &TargetTuple) -> Result<Self, TargetError> {
        if target.suffix_len() < MIN_SUFFIX_LEN {
            return Err(TargetError::SuffixTooShort {
                len: target.suffix_len(),
            });
        }
        Ok(Self {
            tokens: target.len(),
            mode: MatchMode::Exact(PermutationIndex::build(target)),
        })
    }

    /// At least `threshold` of the record's numbers present in the target,
    /// any order.
    pub fn at_least(target: &TargetTuple, threshold: u32) -> Result<Self, TargetError> {
        if threshold == 0 || threshold as usize > target.len() {
            return Err(TargetError::BadThreshold {
                threshold,
                len: target.len(),
            });
        }
        Ok(Self {
            tokens: target.len(),
            mode: MatchMode::AtLeast {
                table: PresenceTable::build(target),
                threshold,
            },
        })
    }

    pub(crate) fn mode(&self) -> &MatchMode {
        &self.mode
    }

    /// Token count each candidate record is expected to carry.
    pub fn tokens(&self) -> usize {
        self.tokens
    }

    /// Scan skip distance: no record suffix is shorter than this.
    pub fn min_suffix_len(&self) -> usize {
        2 * self.tokens
    }
}

// ============================================================================
// Configuration and report
// ============================================================================

/// Scan tuning.
#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Worker threads (one region each) for large pools.
    /// Defaults to the CPU count.
    pub workers: usize,
    /// Pools at or below this many bytes scan on the calling thread.
    pub single_region_threshold: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            single_region_threshold: SINGLE_REGION_THRESHOLD,
        }
    }
}

/// Counters from one full pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScanReport {
    pub file_bytes: u64,
    pub regions: usize,
    pub boundaries_tested: u64,
    pub matches_emitted: u64,
}

// ============================================================================
// Entry point
// ============================================================================

/// Run one full pass over the pool.
///
/// Matching names are written to `sink` as whole lines in no particular
/// order; the sink is flushed before returning. A worker panic (the only
/// mid-scan fatal condition) propagates to the caller.
pub fn scan(
    view: &PoolView,
    plan: &MatchPlan,
    config: &ScanConfig,
    sink: &dyn OutputSink,
) -> ScanReport {
    let regions = plan_regions(view, config.workers, config.single_region_threshold);
    let mut report = ScanReport {
        file_bytes: view.len() as u64,
        regions: regions.len(),
        ..ScanReport::default()
    };

    let pool_end = view.len();
    let stats: Vec<WorkerStats> = if regions.len() <= 1 {
        // Single region: run on the calling thread, no spawn overhead.
        regions
            .into_iter()
            .map(|region| RegionWorker::new(view, region, plan, sink, region.end == pool_end).run())
            .collect()
    } else {
        std::thread::scope(|scope| {
            let handles: Vec<_> = regions
                .iter()
                .map(|&region| {
                    scope.spawn(move || {
                        RegionWorker::new(view, region, plan, sink, region.end == pool_end).run()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("region worker panicked"))
                .collect()
        })
    };

    for worker in &stats {
        report.boundaries_tested += worker.boundaries_tested;
        report.matches_emitted += worker.matches_emitted;
    }
    sink.flush();
    report
}
