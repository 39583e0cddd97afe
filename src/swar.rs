//! Word-at-a-time delimiter scanning (SWAR).
//!
//! The scan loops read 8 bytes per step and locate a target byte with the
//! classic has-zero bit trick: XOR against a broadcast pattern turns matching
//! lanes into zero bytes, then a subtract/mask pair raises bit 7 in exactly
//! the lowest zero lane and below no other. No per-byte branching.
//!
//! Lane extraction uses trailing zeros, so a window with several matches
//! binds to the lowest memory address. Well-formed pools never place two
//! line breaks inside one 8-byte window (a record is at least a minimum
//! suffix plus terminator long), so this is the only match in practice.
//!
//! Sub-word remainders at range edges fall back to `memchr`/`memrchr`.

use memchr::{memchr, memrchr};

/// No-match sentinel returned by [`match_lane`].
pub const NO_LANE: usize = 8;

const LOW_BITS: u64 = 0x0101_0101_0101_0101;
const HIGH_BITS: u64 = 0x8080_8080_8080_8080;

/// Broadcast a byte across all 8 lanes of a word.
#[inline(always)]
pub const fn lane_pattern(byte: u8) -> u64 {
    (byte as u64) * LOW_BITS
}

/// Index (0..=7) of the lowest lane of `word` equal to the byte broadcast in
/// `pattern`, or [`NO_LANE`] when no lane matches.
///
/// Lanes are numbered by byte offset of the little-endian load: lane 0 is the
/// lowest memory address of the window.
#[inline(always)]
pub const fn match_lane(word: u64, pattern: u64) -> usize {
    let diff = word ^ pattern;
    let zeroes = diff.wrapping_sub(LOW_BITS) & !diff & HIGH_BITS;
    (zeroes.trailing_zeros() >> 3) as usize
}

/// Little-endian word at `offset`. Slice indexing is the bounds check.
#[inline(always)]
pub fn read_word(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

/// Position of a `byte` in `bytes[floor..from)`, scanning backward 8 bytes at
/// a time from `from`.
///
/// Returns the match closest to `from` across windows; within a single
/// window the lowest-address match wins (see the module note on why the two
/// cannot disagree for well-formed pools).
pub fn find_prev(bytes: &[u8], floor: usize, from: usize, byte: u8) -> Option<usize> {
    debug_assert!(floor <= from && from <= bytes.len());
    let pattern = lane_pattern(byte);
    let mut pos = from;
    while pos - floor >= 8 {
        let lane = match_lane(read_word(bytes, pos - 8), pattern);
        if lane != NO_LANE {
            return Some(pos - 8 + lane);
        }
        pos -= 8;
    }
    memrchr(byte, &bytes[floor..pos]).map(|i| floor + i)
}

/// Position of the first `byte` in `bytes[from..)`, scanning forward 8 bytes
/// at a time.
pub fn find_next(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    debug_assert!(from <= bytes.len());
    let pattern = lane_pattern(byte);
    let mut pos = from;
    while bytes.len() - pos >= 8 {
        let lane = match_lane(read_word(bytes, pos), pattern);
        if lane != NO_LANE {
            return Some(pos + lane);
        }
        pos += 8;
    }
    memchr(byte, &bytes[pos..]).map(|i| pos + i)
}


#[cfg(all(test, feature = "proptests"))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const PROPTEST_CASES: u32 = 64;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(
            crate::test_utils::proptest_cases(PROPTEST_CASES)
        ))]

        // Backward scanning is exact when matches sit at least a word apart,
        // which the record format guarantees for line breaks.
        #[test]
        fn find_prev_agrees_with_scalar_for_spaced_breaks(
            lead in 0usize..16,
            gaps in proptest::collection::vec(8usize..24, 0..6),
        ) {
            let mut bytes = vec![b'x'; lead];
            for gap in gaps {
                bytes.push(b'\n');
                bytes.extend(std::iter::repeat(b'x').take(gap));
            }
            for from in 0..=bytes.len() {
                let expected = bytes[..from].iter().rposition(|&b| b == b'\n');
                prop_assert_eq!(find_prev(&bytes, 0, from, b'\n'), expected);
            }
        }

        #[test]
        fn find_next_agrees_with_scalar(
            bytes in proptest::collection::vec(any::<u8>(), 0..64),
            byte in any::<u8>(),
        ) {
            for from in 0..=bytes.len() {
                let expected = bytes[from..].iter().position(|&b| b == byte).map(|i| from + i);
                prop_assert_eq!(find_next(&bytes, from, byte), expected);
            }
        }
    }
}
