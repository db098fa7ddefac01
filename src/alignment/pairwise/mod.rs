//! Affine-gap global alignment: a square-space leaf solver (C2), a
//! linear-space column sweep (C3) feeding a Hirschberg-style divide and
//! conquer driver (C4), a diagonal-band variant of the same idea (C5), and
//! the shared alignment reconstruction (C6).

pub mod band;
pub mod column_sweep;
pub mod hirschberg;
pub mod reconstruct;
pub mod square;

use crate::alignment::{AffineCosts, AlignmentSink, Cost, SeqView};

/// Errors surfaced at the public entry points. There are no
/// recoverable errors in the core — every variant is a fatal, "the
/// operation cannot continue" condition.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AlignError {
    #[error(
        "diagonal band [{left}, {right}] cannot contain an admissible path for ulen={ulen}, vlen={vlen}"
    )]
    InvalidBand {
        left: i64,
        right: i64,
        ulen: usize,
        vlen: usize,
    },
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

/// Computes an optimal global alignment of `u` and `v` under an affine gap
/// cost, in O(min(ulen, vlen)) auxiliary space, recording the edit script
/// into `sink`. Returns the alignment's cost.
pub fn affine_align_linear(
    u: SeqView,
    v: SeqView,
    costs: AffineCosts,
    sink: &mut impl AlignmentSink,
) -> Result<Cost, AlignError> {
    hirschberg::affine_align_linear(u, v, costs, sink)
}

/// Computes an optimal global alignment constrained to the diagonal band
/// `[left, right]` (inclusive, measured as `j - i`), in linear space.
pub fn diagonalband_affine_align(
    u: SeqView,
    v: SeqView,
    left: i64,
    right: i64,
    costs: AffineCosts,
    sink: &mut impl AlignmentSink,
) -> Result<Cost, AlignError> {
    band::diagonalband_affine_align(u, v, left, right, costs, sink)
}

/// Cost-only variant of [`diagonalband_affine_align`]: no traceback is
/// performed, only the optimal cost within the band is returned.
pub fn diagonalband_affine_distance(
    u: SeqView,
    v: SeqView,
    left: i64,
    right: i64,
    costs: AffineCosts,
) -> Result<Cost, AlignError> {
    band::diagonalband_affine_distance(u, v, left, right, costs)
}
