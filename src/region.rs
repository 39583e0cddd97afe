//! Region planning: line-aligned partition of the pool.
//!
//! Workers own disjoint byte ranges. Internal boundaries are snapped forward
//! to one past the next line break, so every record lies wholly inside one
//! region and no cross-region coordination is needed during the scan.
//!
//! ## Invariants
//!
//! - Regions partition `[0, pool_len)` exactly: no gap, no overlap.
//! - Every internal boundary sits immediately after a line-break byte.
//! - Small pools plan one region; thread startup would dominate the scan.

use crate::bytes::PoolView;
use crate::swar;
use crate::target::LINE_BREAK;

/// Pools at or below this size scan as a single region.
pub const SINGLE_REGION_THRESHOLD: usize = 1 << 20;

/// Half-open byte range of the pool assigned to one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split the pool into at most `workers` line-aligned regions.
///
/// Snapping can swallow whole candidate ranges when records are long; the
/// plan then holds fewer regions than requested. The final region always
/// ends at the pool's true end.
pub fn plan_regions(view: &PoolView, workers: usize, single_region_threshold: usize) -> Vec<Region> {
    let len = view.len();
    if len == 0 {
        return Vec::new();
    }
    let workers = workers.max(1);
    if workers == 1 || len <= single_region_threshold {
        return vec![Region { start: 0, end: len }];
    }

    let step = len / workers;
    let bytes = view.as_slice();
    let mut regions = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 1..workers {
        let candidate = i * step;
        if candidate <= start {
            continue;
        }
        // Snap forward to one past the next line break; if the rest of the
        // pool holds no further break, the last region absorbs it all.
        let Some(brk) = swar::find_next(bytes, candidate, LINE_BREAK) else {
            break;
        };
        let end = brk + 1;
        if end >= len {
            break;
        }
        regions.push(Region { start, end });
        start = end;
    }
    regions.push(Region { start, end: len });
    regions
}
