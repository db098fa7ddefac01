//! C6: turns a crosspoint table into an edit script.
//!
//! Both drivers (the unconstrained Hirschberg sweep and the diagonal-band
//! sweep) produce the same kind of artifact: for each column of `v`, the
//! row of `u` at which the optimal path crosses that column. The
//! Hirschberg crosspoint table pins down the step between each pair of
//! adjacent columns uniquely, so `from_ctab` can classify it directly; the
//! band's crossings can be several columns apart, so `from_dtab` re-solves
//! the interior of each gap exactly instead of guessing at it.

use crate::alignment::pairwise::square;
use crate::alignment::{AffineCosts, AlignmentSink, Edge, SeqView};

/// Walks `ctab[0..=vlen]` (the Hirschberg crosspoint table) and
/// emits the edit script it encodes.
///
/// `ctab[0]` is the row reached before any symbol of `v` is consumed: every
/// row below it is a leading deletion. For each subsequent column, the row
/// advances by `delta = ctab[col] - ctab[col - 1]`; `delta == 0` means that
/// column's symbol was inserted, otherwise `delta - 1` deletions precede a
/// replace that consumes the column's symbol together with the row it
/// advances into.
pub fn from_ctab(ctab: &[usize], sink: &mut impl AlignmentSink) {
    for _ in 0..ctab[0] {
        sink.append_delete();
    }
    for col in 1..ctab.len() {
        let delta = ctab[col] - ctab[col - 1];
        if delta == 0 {
            sink.append_insert();
        } else {
            for _ in 0..delta - 1 {
                sink.append_delete();
            }
            sink.append_replace();
        }
    }
}

/// Walks the diagonal-band sweep's crosspoint chain (`lastcpoint`
/// back-pointers along the sweep's chosen diagonal) and emits the edit
/// script it encodes.
///
/// Unlike `Ctab`, consecutive crosspoints are not necessarily one column
/// apart, and the interior order of steps between two crosspoints (which
/// rows are deleted before vs. after the replace steps, and so on) is not
/// determined by the two endpoints alone — the same pair of `(col, row)`
/// corners is consistent with many step orderings of differing cost, only
/// one of which is optimal. Each interior segment is therefore re-solved
/// exactly: `chain` carries, alongside each `(col, row)` corner, the gap
/// state the optimal path is in at that corner, which becomes the
/// `from_edge`/`to_edge` boundary handed to the square-space leaf solver
/// for the segment's own sub-rectangle of `u`/`v`. `chain` holds entries in
/// strictly increasing column order, starting at `(0, 0, Edge::X)` (the
/// unconstrained start) and ending at `(vlen, ulen, edge)` — the band sweep
/// supplies the head and tail itself alongside the crosspoints it actually
/// recorded.
pub fn from_dtab(
    u: SeqView,
    v: SeqView,
    costs: &AffineCosts,
    chain: &[(usize, usize, Edge)],
    sink: &mut impl AlignmentSink,
) {
    debug_assert!(chain.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 <= w[1].1));
    for pair in chain.windows(2) {
        let (col_prev, row_prev, from_edge) = pair[0];
        let (col_cur, row_cur, to_edge) = pair[1];
        let u_sub = u.slice(row_prev, row_cur - row_prev);
        let v_sub = v.slice(col_prev, col_cur - col_prev);
        square::align(u_sub, v_sub, costs, from_edge, to_edge, sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentOp;

    #[test]
    fn from_ctab_all_replace() {
        let ctab = vec![0, 1, 2, 3, 4];
        let mut sink: Vec<AlignmentOp> = Vec::new();
        from_ctab(&ctab, &mut sink);
        assert_eq!(sink, vec![AlignmentOp::Replace; 4]);
    }

    #[test]
    fn from_ctab_leading_deletion() {
        // u = ACGT, v = GT: ctab[0] = 2 (A, C deleted before G is reached).
        let ctab = vec![2, 3, 4];
        let mut sink: Vec<AlignmentOp> = Vec::new();
        from_ctab(&ctab, &mut sink);
        assert_eq!(
            sink,
            vec![
                AlignmentOp::Delete,
                AlignmentOp::Delete,
                AlignmentOp::Replace,
                AlignmentOp::Replace,
            ]
        );
    }

    #[test]
    fn from_ctab_insertion_columns() {
        // delta == 0 at a column: that column's symbol was inserted.
        let ctab = vec![0, 0, 1];
        let mut sink: Vec<AlignmentOp> = Vec::new();
        from_ctab(&ctab, &mut sink);
        assert_eq!(sink, vec![AlignmentOp::Insert, AlignmentOp::Replace]);
    }

    #[test]
    fn from_dtab_resolves_each_segment_exactly() {
        // u = "ACG", v = "AG": first segment (0,0,X) -> (1,2,D) covers
        // v[0..1]="A" against u[0..2]="AC" (replace A/A, then delete C,
        // ending in the deletion state); second segment (1,2,D) -> (2,3,R)
        // covers v[1..2]="G" against u[2..3]="G" (a single replace).
        let u = b"ACG";
        let v = b"AG";
        let costs = AffineCosts::new(0, 3, 4, 1);
        let chain = vec![(0, 0, Edge::X), (1, 2, Edge::D), (2, 3, Edge::R)];
        let mut sink: Vec<AlignmentOp> = Vec::new();
        from_dtab(SeqView::whole(u), SeqView::whole(v), &costs, &chain, &mut sink);
        assert_eq!(
            sink,
            vec![AlignmentOp::Replace, AlignmentOp::Delete, AlignmentOp::Replace]
        );
    }
}
