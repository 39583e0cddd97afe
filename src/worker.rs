//! Backward region scanning.
//!
//! A worker walks its region from the end toward the start. Each step finds
//! the line break closest below the cursor (word-wise SWAR scan), tests the
//! bytes preceding that boundary against the match plan, and on a hit emits
//! the record's name. The loop then jumps the cursor down by the minimum
//! suffix length: any well-formed record occupies at least that many bytes
//! plus its terminator, so no boundary is skipped and none is visited twice.
//! Visiting each boundary exactly once is what keeps output duplicate-free.
//!
//! Bounds discipline: every fixed-offset key read and every token decode is
//! preceded by a floor check against the region start. A record short enough
//! to trip the check cannot hold the target's suffix, so skipping it is both
//! the memory guard and the correct answer.
//!
//! Matches are formatted into a per-worker batch and handed to the shared
//! sink as whole lines, so concurrent workers never interleave mid-line.

use crate::bytes::PoolView;
use crate::engine::{MatchMode, MatchPlan};
use crate::index::PermutationIndex;
use crate::key::CanonicalKey;
use crate::output_sink::OutputSink;
use crate::presence::PresenceTable;
use crate::region::Region;
use crate::swar;
use crate::target::{DELIMITER, LINE_BREAK};

/// Flush the per-worker batch to the sink once it grows past this.
const BATCH_FLUSH_BYTES: usize = 64 * 1024;

/// Per-region scan counters, aggregated into the run report.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkerStats {
    /// Line-break boundaries tested against the match plan.
    pub boundaries_tested: u64,
    /// Matching names emitted.
    pub matches_emitted: u64,
}

/// One region's scan loop. Borrows everything; owns only its batch buffer.
pub struct RegionWorker<'a> {
    view: &'a PoolView,
    region: Region,
    plan: &'a MatchPlan,
    sink: &'a dyn OutputSink,
    /// True when `region.end` is the pool's end, where a final record may
    /// lack its terminator.
    terminal: bool,
    batch: Vec<u8>,
    stats: WorkerStats,
}

impl<'a> RegionWorker<'a> {
    pub fn new(
        view: &'a PoolView,
        region: Region,
        plan: &'a MatchPlan,
        sink: &'a dyn OutputSink,
        terminal: bool,
    ) -> Self {
        Self {
            view,
            region,
            plan,
            sink,
            terminal,
            batch: Vec::with_capacity(4096),
            stats: WorkerStats::default(),
        }
    }

    /// Scan the region backward to completion.
    pub fn run(mut self) -> WorkerStats {
        let Region { start, end } = self.region;
        if self.terminal && end > start && self.view.byte(end - 1) != LINE_BREAK {
            // The pool's last record has no trailing terminator; test its
            // synthetic boundary at the pool end.
            self.test_boundary(end);
        }

        let min_suffix = self.plan.min_suffix_len();
        let bytes = self.view.as_slice();
        let mut cursor = end;
        while cursor > start {
            let Some(boundary) = swar::find_prev(bytes, start, cursor, LINE_BREAK) else {
                break;
            };
            self.test_boundary(boundary);
            // The record ending here spans at least the minimum suffix plus
            // its terminator, so the next break sits below this cursor.
            cursor = boundary.saturating_sub(min_suffix);
        }

        if !self.batch.is_empty() {
            self.sink.write_all(&self.batch);
        }
        self.stats
    }

    fn test_boundary(&mut self, boundary: usize) {
        self.stats.boundaries_tested += 1;
        match self.plan.mode() {
            MatchMode::Exact(index) => self.test_exact(boundary, index),
            MatchMode::AtLeast { table, threshold } => {
                self.test_partial(boundary, table, *threshold, self.plan.tokens());
            }
        }
    }

    fn test_exact(&mut self, boundary: usize, index: &PermutationIndex) {
        let key_len = index.key_len();
        if boundary < self.region.start + key_len {
            // Too few bytes above the floor to hold the target's suffix.
            return;
        }
        let key = CanonicalKey::read_at(self.view, boundary, key_len);
        if index.contains(&key) {
            self.emit(boundary - key_len);
        }
    }

    fn test_partial(
        &mut self,
        boundary: usize,
        table: &PresenceTable,
        threshold: u32,
        tokens: usize,
    ) {
        let floor = self.region.start;
        let mut pos = boundary;
        let mut score = 0u32;
        for _ in 0..tokens {
            if pos < floor + 2 {
                return;
            }
            let units = self.view.byte(pos - 1);
            let next = self.view.byte(pos - 2);
            let mut value = units.wrapping_sub(b'0');
            let mut step = 2;
            if next != DELIMITER {
                // Two-digit token: fold in the tens digit.
                value = value.wrapping_add(next.wrapping_sub(b'0').wrapping_mul(10));
                step = 3;
            }
            if pos < floor + step {
                return;
            }
            pos -= step;
            score += table.weight(value);
        }
        if score >= threshold {
            // `pos` landed on the suffix's leading delimiter.
            self.emit(pos);
        }
    }

    /// Append `name\n` for the record whose suffix starts at `name_end`.
    fn emit(&mut self, name_end: usize) {
        let bytes = self.view.as_slice();
        let name_start =
            swar::find_prev(bytes, 0, name_end, LINE_BREAK).map_or(0, |brk| brk + 1);
        self.batch.extend_from_slice(&bytes[name_start..name_end]);
        self.batch.push(LINE_BREAK);
        self.stats.matches_emitted += 1;
        if self.batch.len() >= BATCH_FLUSH_BYTES {
            self.sink.write_all(&self.batch);
            self.batch.clear();
        }
    }
}
