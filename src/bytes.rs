//! Read-only byte view over the pool file.
//!
//! Backed by an mmap in production and by owned bytes in tests and benches.
//! The view is opened once, shared by reference across every region worker,
//! and never written. Wide reads go through [`PoolView::word_at`] so every
//! 8-byte access is bounds-checked in one place; callers near a region floor
//! gate with [`PoolView::has_span`] first. A read that trips the check is a
//! planner or worker defect and panics rather than touching bytes outside
//! the mapping.

use std::sync::Arc;

use memmap2::Mmap;

/// Read-only view of the whole pool.
///
/// Clones are cheap: the backing bytes are reference-counted and immutable
/// for the lifetime of any view.
#[derive(Clone, Debug)]
pub struct PoolView {
    inner: ViewInner,
}

#[derive(Clone, Debug)]
enum ViewInner {
    Mapped(Arc<Mmap>),
    Owned(Arc<[u8]>),
}

impl PoolView {
    /// Wrap a memory-mapped pool file.
    #[must_use]
    pub fn from_mmap(map: Mmap) -> Self {
        Self {
            inner: ViewInner::Mapped(Arc::new(map)),
        }
    }

    /// Wrap owned bytes.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            inner: ViewInner::Owned(Arc::from(bytes)),
        }
    }

    /// The whole pool as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match &self.inner {
            ViewInner::Mapped(map) => map.as_ref(),
            ViewInner::Owned(bytes) => bytes.as_ref(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Single byte at `offset`.
    #[inline(always)]
    pub fn byte(&self, offset: usize) -> u8 {
        self.as_slice()[offset]
    }

    /// True when `[offset, offset + len)` lies inside the view.
    #[inline(always)]
    pub fn has_span(&self, offset: usize, len: usize) -> bool {
        offset
            .checked_add(len)
            .map_or(false, |end| end <= self.len())
    }

    /// Little-endian 8-byte word at `offset`.
    #[inline(always)]
    pub fn word_at(&self, offset: usize) -> u64 {
        let bytes = &self.as_slice()[offset..offset + 8];
        u64::from_le_bytes(bytes.try_into().unwrap())
    }

    /// Little-endian 2-byte half-word at `offset`.
    #[inline(always)]
    pub fn half_at(&self, offset: usize) -> u16 {
        let bytes = &self.as_slice()[offset..offset + 2];
        u16::from_le_bytes(bytes.try_into().unwrap())
    }
}

impl AsRef<[u8]> for PoolView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}
