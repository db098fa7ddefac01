//! Affine-gap global pairwise alignment in linear auxiliary space.
//!
//! Two entry families, both built on the same three-state DP:
//!
//! - [`affine_align_linear`] — unconstrained Hirschberg-style divide and
//!   conquer.
//! - [`diagonalband_affine_align`] / [`diagonalband_affine_distance`] — the
//!   same DP restricted to a diagonal band.
//!
//! Both drive their recursion down to a full square-space solver at small
//! sub-problems and share one reconstruction step that turns a crosspoint
//! table into a sequence of [`AlignmentOp`]s.

pub mod alignment;

pub use alignment::pairwise::{
    affine_align_linear, diagonalband_affine_align, diagonalband_affine_distance, AlignError,
};
pub use alignment::{
    add_sat, min3, score_alignment, set_edge, AffineCosts, AlignmentOp, AlignmentSink, Cost, Edge,
    SeqView, INF,
};
