//! C4: Hirschberg-style affine global alignment driver.
//!
//! Divides on the v-axis: runs the linear-space column sweep (C3) once to
//! find the row at which the optimal path crosses the middle column, then
//! recurses on the two quadrants meeting there. Produces `Ctab[0..=vlen]`,
//! the per-column crossing-row table that C6 turns into an edit script.

use crate::alignment::pairwise::column_sweep::{
    evaluate_all_atab_rtab_columns, min_additional_costs, Atabentry, Rtabentry, UNSET,
};
use crate::alignment::pairwise::{reconstruct, square, AlignError};
use crate::alignment::{add_sat, AffineCosts, AlignmentSink, Cost, Edge, SeqView};

/// Top-level entry point: computes the optimal global alignment of
/// `u` and `v` in linear space.
pub fn affine_align_linear(
    u: SeqView,
    v: SeqView,
    costs: AffineCosts,
    sink: &mut impl AlignmentSink,
) -> Result<Cost, AlignError> {
    let ulen = u.len();
    let vlen = v.len();

    if ulen == 0 {
        for _ in 0..vlen {
            sink.append_insert();
        }
        return Ok(if vlen == 0 {
            0
        } else {
            costs.gap_open + costs.gap_extend * vlen as Cost
        });
    }
    if vlen == 0 {
        for _ in 0..ulen {
            sink.append_delete();
        }
        return Ok(costs.gap_open + costs.gap_extend * ulen as Cost);
    }
    if ulen == 1 || vlen == 1 {
        return Ok(square::align(u, v, &costs, Edge::X, Edge::X, sink));
    }

    let (ctab, distance) = build_ctab(u, ulen, v, vlen, &costs)?;
    reconstruct::from_ctab(&ctab, sink);
    Ok(distance)
}

/// Builds the full `ctab[0..=vlen]` crosspoint table for a sub-problem with
/// both sides at least 2 long, plus the alignment's cost. Factored out of
/// [`affine_align_linear`] so property tests can inspect `ctab` directly
/// ("Ctab is non-decreasing" is one of the quantified invariants).
fn build_ctab(
    u: SeqView,
    ulen: usize,
    v: SeqView,
    vlen: usize,
    costs: &AffineCosts,
) -> Result<(Vec<usize>, Cost), AlignError> {
    let mut ctab = vec![UNSET; vlen + 1];
    ctab[vlen] = ulen;
    let mut atabcolumn = vec![Atabentry::unset(); ulen + 1];
    let mut rtabcolumn = vec![Rtabentry::unset(); ulen + 1];

    let distance = evaluate_affine_crosspoints(
        u,
        ulen,
        v,
        vlen,
        &mut atabcolumn,
        &mut rtabcolumn,
        &mut ctab,
        0,
        costs,
        Edge::X,
        Edge::X,
    )?;

    determine_ctab0(&mut ctab, u, v, costs);
    Ok((ctab, distance))
}

#[cfg(test)]
pub(crate) fn ctab_for_test(
    u: SeqView,
    v: SeqView,
    costs: &AffineCosts,
) -> Result<Vec<usize>, AlignError> {
    build_ctab(u, u.len(), v, v.len(), costs).map(|(ctab, _)| ctab)
}

/// `evaluateaffinecrosspoints`: recursively fills `ctab[1..vlen-1]` (the
/// caller is responsible for the fixed endpoints `ctab[0]`/`ctab[vlen]`)
/// and returns the cost of this sub-problem.
#[allow(clippy::too_many_arguments)]
fn evaluate_affine_crosspoints(
    u: SeqView,
    ulen: usize,
    v: SeqView,
    vlen: usize,
    atabcolumn: &mut [Atabentry],
    rtabcolumn: &mut [Rtabentry],
    ctab: &mut [usize],
    rowoffset: usize,
    costs: &AffineCosts,
    from_edge: Edge,
    to_edge: Edge,
) -> Result<Cost, AlignError> {
    if vlen < 2 {
        return Ok(0);
    }

    log::trace!(
        "crosspoints: ulen={ulen} vlen={vlen} rowoffset={rowoffset} from={from_edge} to={to_edge}"
    );

    let midcol = vlen / 2;
    let distance = evaluate_all_atab_rtab_columns(
        u,
        ulen,
        v,
        vlen,
        atabcolumn,
        rtabcolumn,
        costs,
        midcol,
        from_edge,
    );

    let bottomtype = min_additional_costs(&atabcolumn[ulen], to_edge, costs.gap_open);
    let (midrow, midtype) = match bottomtype {
        Edge::R => (rtabcolumn[ulen].r.row, rtabcolumn[ulen].r.edge),
        Edge::D => (rtabcolumn[ulen].d.row, rtabcolumn[ulen].d.edge),
        Edge::I => (rtabcolumn[ulen].i.row, rtabcolumn[ulen].i.edge),
        Edge::X => {
            return Err(AlignError::Internal(
                "min_additional_costs selected the unknown edge tag",
            ))
        }
    };

    ctab[midcol] = rowoffset + midrow;
    debug_assert!(midcol > 0);

    if midrow == 0 {
        for colindex in (1..midcol).rev() {
            ctab[colindex] = ctab[midcol];
        }
    } else {
        match midtype {
            Edge::R => {
                if midcol > 1 {
                    ctab[midcol - 1] = if ctab[midcol] == 0 { 0 } else { ctab[midcol] - 1 };
                }
                evaluate_affine_crosspoints(
                    u.slice(0, midrow - 1),
                    midrow - 1,
                    v.slice(0, midcol - 1),
                    midcol - 1,
                    atabcolumn,
                    rtabcolumn,
                    ctab,
                    rowoffset,
                    costs,
                    from_edge,
                    midtype,
                )?;
            }
            Edge::D => {
                evaluate_affine_crosspoints(
                    u.slice(0, midrow - 1),
                    midrow - 1,
                    v.slice(0, midcol),
                    midcol,
                    atabcolumn,
                    rtabcolumn,
                    ctab,
                    rowoffset,
                    costs,
                    from_edge,
                    midtype,
                )?;
            }
            Edge::I => {
                if midcol > 1 {
                    ctab[midcol - 1] = ctab[midcol];
                }
                evaluate_affine_crosspoints(
                    u.slice(0, midrow),
                    midrow,
                    v.slice(0, midcol - 1),
                    midcol - 1,
                    atabcolumn,
                    rtabcolumn,
                    ctab,
                    rowoffset,
                    costs,
                    from_edge,
                    midtype,
                )?;
            }
            Edge::X => {
                return Err(AlignError::Internal(
                    "R-node propagation produced the unknown edge tag",
                ))
            }
        }
    }

    evaluate_affine_crosspoints(
        u.slice(midrow, ulen - midrow),
        ulen - midrow,
        v.slice(midcol, vlen - midcol),
        vlen - midcol,
        atabcolumn,
        rtabcolumn,
        &mut ctab[midcol..],
        rowoffset + midrow,
        costs,
        midtype,
        to_edge,
    )?;

    Ok(distance)
}

/// `determineCtab0`: resolves the ambiguous crossing row at
/// column 0 by comparing a local mismatch against opening a second gap.
fn determine_ctab0(ctab: &mut [usize], u: SeqView, v: SeqView, costs: &AffineCosts) {
    if ctab[1] == 0 || ctab[1] == 1 {
        ctab[0] = 0;
        return;
    }

    // `gap_open > mismatch_cost - match_cost`, computed as `gap_open +
    // match_cost > mismatch_cost` so it stays correct (and overflow-safe)
    // when match_cost > mismatch_cost, which a naive saturating subtraction
    // would clamp to zero and silently flip.
    let prefer_mismatch_over_reopen = add_sat(costs.gap_open, costs.match_cost) > costs.mismatch_cost;
    let v0 = v.at(0);

    let scan_for_match = || -> Option<usize> { (0..ctab[1]).find(|&row| v0 == u.at(row)) };

    if ctab[2] - ctab[1] > 1 {
        ctab[0] = if !prefer_mismatch_over_reopen {
            scan_for_match().unwrap_or(0)
        } else {
            0
        };
        return;
    }

    if v0 == u.at(ctab[1] - 1) {
        ctab[0] = ctab[1] - 1;
        return;
    }
    if v0 == u.at(0) {
        ctab[0] = 0;
        return;
    }
    if prefer_mismatch_over_reopen {
        ctab[0] = ctab[1] - 1;
    } else {
        ctab[0] = scan_for_match().unwrap_or(ctab[1] - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentOp;

    fn costs() -> AffineCosts {
        AffineCosts::new(0, 3, 4, 1)
    }

    fn run(u: &[u8], v: &[u8]) -> (Cost, Vec<AlignmentOp>) {
        let mut sink = Vec::new();
        let cost =
            affine_align_linear(SeqView::whole(u), SeqView::whole(v), costs(), &mut sink).unwrap();
        (cost, sink)
    }

    #[test]
    fn scenario_1_identical() {
        let (cost, ops) = run(b"ACGT", b"ACGT");
        assert_eq!(cost, 0);
        assert_eq!(ops, vec![AlignmentOp::Replace; 4]);
    }

    #[test]
    fn scenario_2_single_deletion() {
        let (cost, _ops) = run(b"ACGT", b"AGT");
        assert_eq!(cost, 5);
    }

    #[test]
    fn scenario_3_trailing_insertions() {
        let (cost, _ops) = run(b"AC", b"ACGT");
        assert_eq!(cost, 6);
    }

    #[test]
    fn scenario_4_all_mismatches() {
        let (cost, ops) = run(b"AAAA", b"TTTT");
        assert_eq!(cost, 12);
        assert_eq!(ops, vec![AlignmentOp::Replace; 4]);
    }

    #[test]
    fn scenario_5_internal_deletion() {
        let (cost, _ops) = run(b"AGCT", b"ACT");
        assert_eq!(cost, 5);
    }

    #[test]
    fn scenario_6_long_gap() {
        let (cost, _ops) = run(b"A", b"TTTTTTA");
        assert_eq!(cost, 10);
    }

    #[test]
    fn empty_u_is_all_insertions() {
        let (cost, ops) = run(b"", b"ACGT");
        assert_eq!(cost, 4 + 4);
        assert_eq!(ops, vec![AlignmentOp::Insert; 4]);
    }

    #[test]
    fn empty_v_is_all_deletions() {
        let (cost, ops) = run(b"ACGT", b"");
        assert_eq!(cost, 4 + 4);
        assert_eq!(ops, vec![AlignmentOp::Delete; 4]);
    }

    #[test]
    fn cost_matches_independent_scoring() {
        let (cost, ops) = run(b"AGCT", b"ACT");
        let rescored =
            crate::alignment::score_alignment(SeqView::whole(b"AGCT"), SeqView::whole(b"ACT"), &costs(), &ops);
        assert_eq!(cost, rescored);
    }

    #[test]
    fn cost_matches_square_space() {
        let u = b"AGCTTAGCATGC";
        let v = b"AGCTAGCTTGC";
        let mut linear_sink = Vec::new();
        let linear_cost =
            affine_align_linear(SeqView::whole(u), SeqView::whole(v), costs(), &mut linear_sink)
                .unwrap();
        let mut square_sink = Vec::new();
        let square_cost = square::align(
            SeqView::whole(u),
            SeqView::whole(v),
            &costs(),
            Edge::X,
            Edge::X,
            &mut square_sink,
        );
        assert_eq!(linear_cost, square_cost);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn dna() -> impl Strategy<Value = Vec<u8>> {
            proptest::collection::vec(prop_oneof![Just(b'A'), Just(b'C'), Just(b'G'), Just(b'T')], 0..12)
        }

        proptest! {
            /// Ctab is non-decreasing, Ctab[0] >= 0 (trivially
            /// true for `usize`), Ctab[vlen] == ulen.
            #[test]
            fn ctab_is_monotone_with_fixed_endpoint(u in dna(), v in dna()) {
                prop_assume!(u.len() >= 2 && v.len() >= 2);
                let ctab = ctab_for_test(SeqView::whole(&u), SeqView::whole(&v), &costs()).unwrap();
                prop_assert_eq!(ctab[v.len()], u.len());
                for w in ctab.windows(2) {
                    prop_assert!(w[0] <= w[1]);
                }
            }

            /// The linear-space cost matches both the square-space aligner
            /// and the independent scoring function for random inputs.
            #[test]
            fn linear_cost_matches_square_space_and_rescoring(u in dna(), v in dna()) {
                let c = costs();
                let mut linear_sink = Vec::new();
                let linear_cost = affine_align_linear(
                    SeqView::whole(&u),
                    SeqView::whole(&v),
                    c,
                    &mut linear_sink,
                )
                .unwrap();

                let mut square_sink = Vec::new();
                let square_cost = square::align(
                    SeqView::whole(&u),
                    SeqView::whole(&v),
                    &c,
                    Edge::X,
                    Edge::X,
                    &mut square_sink,
                );
                prop_assert_eq!(linear_cost, square_cost);

                let rescored =
                    crate::alignment::score_alignment(SeqView::whole(&u), SeqView::whole(&v), &c, &linear_sink);
                prop_assert_eq!(linear_cost, rescored);
            }
        }
    }
}
