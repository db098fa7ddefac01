//! C3: linear-space column sweep with mid-column crossing recording.
//!
//! Maintains one column of the three-state affine DP table in place,
//! column by column, carrying only the scalars needed to recover the cell
//! directly above and the cell diagonally above-left before they are
//! overwritten (the same column-swap trick a plain Needleman-Wunsch cost-only
//! sweep uses, generalised to three states). For columns past `mid_col`, an
//! additional "R-node" triple is carried per row recording the row and
//! gap-state at which the optimal path into each state crossed `mid_col`.

use crate::alignment::{add_sat, min3, set_edge, AffineCosts, Cost, Edge, SeqView, INF};

/// Sentinel row index meaning "unset" in an [`Rnode`].
pub const UNSET: usize = usize::MAX;

/// One DP cell's three state costs and the incoming edge that produced
/// each of them.
#[derive(Debug, Clone, Copy)]
pub struct Atabentry {
    pub rvalue: Cost,
    pub dvalue: Cost,
    pub ivalue: Cost,
    pub redge: Edge,
    pub dedge: Edge,
    pub iedge: Edge,
}

impl Atabentry {
    pub fn unset() -> Self {
        Atabentry {
            rvalue: INF,
            dvalue: INF,
            ivalue: INF,
            redge: Edge::X,
            dedge: Edge::X,
            iedge: Edge::X,
        }
    }
}

/// The row (in u) and gap-state at which the optimal path into some state
/// crossed `mid_col`.
#[derive(Debug, Clone, Copy)]
pub struct Rnode {
    pub row: usize,
    pub edge: Edge,
}

impl Rnode {
    fn unset() -> Self {
        Rnode {
            row: UNSET,
            edge: Edge::X,
        }
    }
}

/// The three R-nodes tracked per row once the sweep has passed `mid_col`.
#[derive(Debug, Clone, Copy)]
pub struct Rtabentry {
    pub r: Rnode,
    pub d: Rnode,
    pub i: Rnode,
}

impl Rtabentry {
    pub fn unset() -> Self {
        Rtabentry {
            r: Rnode::unset(),
            d: Rnode::unset(),
            i: Rnode::unset(),
        }
    }
}

/// `set_Rtabentry`: propagates the R-node of the predecessor identified by
/// `edge` into `dst`.
fn set_rtabentry(dst: &mut Rnode, src: &Rtabentry, edge: Edge) {
    match edge {
        Edge::R => *dst = src.r,
        Edge::D => *dst = src.d,
        Edge::I => *dst = src.i,
        Edge::X => {}
    }
}

/// `min_additional_costs`: which state wins at a sub-problem's
/// bottom-right corner once `to_edge`'s reopen bias is applied. Inspects
/// `R`, then `D`, then `I` — the opposite tie-break order from
/// [`crate::alignment::set_edge`], by design.
pub fn min_additional_costs(entry: &Atabentry, to_edge: Edge, gap_open: Cost) -> Edge {
    min_additional_costs_cell(entry.rvalue, entry.dvalue, entry.ivalue, to_edge, gap_open)
}

/// Same as [`min_additional_costs`] but over a raw `(R, D, I)` cost
/// triple, for callers (such as the square-space solver) that don't keep
/// their cells in an [`Atabentry`].
pub fn min_additional_costs_cell(r: Cost, d: Cost, i: Cost, to_edge: Edge, gap_open: Cost) -> Edge {
    let (rdist, ddist, idist) = biased_triple(r, d, i, to_edge, gap_open);
    let minvalue = min3(rdist, ddist, idist);
    if rdist == minvalue {
        Edge::R
    } else if ddist == minvalue {
        Edge::D
    } else if idist == minvalue {
        Edge::I
    } else {
        Edge::X
    }
}

/// The bias added to each state's raw cost at the bottom-right corner,
/// matching the edge selected by [`min_additional_costs`].
pub fn additional_cost(entry: &Atabentry, to_edge: Edge, gap_open: Cost) -> Cost {
    additional_cost_cell(entry.rvalue, entry.dvalue, entry.ivalue, to_edge, gap_open)
}

/// Same as [`additional_cost`] but over a raw `(R, D, I)` cost triple.
pub fn additional_cost_cell(r: Cost, d: Cost, i: Cost, to_edge: Edge, gap_open: Cost) -> Cost {
    let (rdist, ddist, idist) = biased_triple(r, d, i, to_edge, gap_open);
    min3(rdist, ddist, idist)
}

fn biased_triple(r: Cost, d: Cost, i: Cost, to_edge: Edge, gap_open: Cost) -> (Cost, Cost, Cost) {
    match to_edge {
        Edge::D => (add_sat(r, gap_open), d, add_sat(i, gap_open)),
        Edge::I => (add_sat(r, gap_open), add_sat(d, gap_open), i),
        Edge::R | Edge::X => (r, d, i),
    }
}

/// Initialises column 0 of the sweep (the `from_edge` boundary) and
/// the first column of the DP table (`j == 0`, `i` from `0..=ulen`).
/// Also seeds `rtabcolumn` with the trivial identity crosspoint (row i,
/// edge = own state) for every row, since column 0 may itself be
/// `mid_col`.
pub fn first_atab_rtab_column(
    ulen: usize,
    atabcolumn: &mut [Atabentry],
    rtabcolumn: &mut [Rtabentry],
    gap_open: Cost,
    gap_extend: Cost,
    from_edge: Edge,
) {
    atabcolumn[0] = match from_edge {
        Edge::R => Atabentry {
            rvalue: 0,
            dvalue: INF,
            ivalue: INF,
            redge: Edge::X,
            dedge: Edge::X,
            iedge: Edge::X,
        },
        Edge::D => Atabentry {
            rvalue: INF,
            dvalue: 0,
            ivalue: INF,
            redge: Edge::X,
            dedge: Edge::X,
            iedge: Edge::X,
        },
        Edge::I => Atabentry {
            rvalue: INF,
            dvalue: INF,
            ivalue: 0,
            redge: Edge::X,
            dedge: Edge::X,
            iedge: Edge::X,
        },
        Edge::X => Atabentry {
            rvalue: 0,
            dvalue: gap_open,
            ivalue: gap_open,
            redge: Edge::X,
            dedge: Edge::X,
            iedge: Edge::X,
        },
    };
    rtabcolumn[0] = Rtabentry {
        r: Rnode { row: 0, edge: Edge::R },
        d: Rnode { row: 0, edge: Edge::D },
        i: Rnode { row: 0, edge: Edge::I },
    };

    for row in 1..=ulen {
        atabcolumn[row] = Atabentry {
            rvalue: INF,
            dvalue: add_sat(atabcolumn[row - 1].dvalue, gap_extend),
            ivalue: INF,
            redge: Edge::X,
            dedge: Edge::D,
            iedge: Edge::X,
        };
        rtabcolumn[row] = Rtabentry {
            r: Rnode { row, edge: Edge::R },
            d: Rnode { row, edge: Edge::D },
            i: Rnode { row, edge: Edge::I },
        };
    }
}

/// Advances the sweep by one column (one symbol `b` of `v`), in place.
/// `colindex` is the 1-based column being computed; once `colindex >
/// mid_col`, `rtabcolumn` is updated to propagate the R-node of whichever
/// predecessor state won each cell.
#[allow(clippy::too_many_arguments)]
pub fn next_atab_rtab_column(
    u: SeqView,
    ulen: usize,
    b: u8,
    atabcolumn: &mut [Atabentry],
    rtabcolumn: &mut [Rtabentry],
    costs: &AffineCosts,
    mid_col: usize,
    colindex: usize,
) {
    let mut anw = atabcolumn[0];
    let mut rnw = rtabcolumn[0];

    let rdist = add_sat(atabcolumn[0].rvalue, add_sat(costs.gap_extend, costs.gap_open));
    let ddist = add_sat(atabcolumn[0].dvalue, add_sat(costs.gap_extend, costs.gap_open));
    let idist = add_sat(atabcolumn[0].ivalue, costs.gap_extend);
    let minvalue = min3(rdist, ddist, idist);

    atabcolumn[0].ivalue = minvalue;
    atabcolumn[0].rvalue = INF;
    atabcolumn[0].dvalue = INF;
    atabcolumn[0].redge = Edge::X;
    atabcolumn[0].dedge = Edge::X;
    atabcolumn[0].iedge = Edge::I;

    let rtab = colindex > mid_col;
    if rtab {
        rnw = rtabcolumn[0];
        let i_node = rtabcolumn[0].i;
        rtabcolumn[0].r = i_node;
        rtabcolumn[0].d = i_node;
        rtabcolumn[0].i = i_node;
    }

    for rowindex in 1..=ulen {
        let awe = atabcolumn[rowindex];
        let rwe = rtabcolumn[rowindex];

        let rcost = if u.at(rowindex - 1) == b {
            costs.match_cost
        } else {
            costs.mismatch_cost
        };
        let rdist = add_sat(anw.rvalue, rcost);
        let ddist = add_sat(anw.dvalue, rcost);
        let idist = add_sat(anw.ivalue, rcost);
        atabcolumn[rowindex].rvalue = min3(rdist, ddist, idist);
        atabcolumn[rowindex].redge = set_edge(rdist, ddist, idist);

        let open_extend = add_sat(costs.gap_extend, costs.gap_open);
        let rdist = add_sat(atabcolumn[rowindex - 1].rvalue, open_extend);
        let ddist = add_sat(atabcolumn[rowindex - 1].dvalue, costs.gap_extend);
        let idist = add_sat(atabcolumn[rowindex - 1].ivalue, open_extend);
        atabcolumn[rowindex].dvalue = min3(rdist, ddist, idist);
        atabcolumn[rowindex].dedge = set_edge(rdist, ddist, idist);

        let rdist = add_sat(awe.rvalue, open_extend);
        let ddist = add_sat(awe.dvalue, open_extend);
        let idist = add_sat(awe.ivalue, costs.gap_extend);
        atabcolumn[rowindex].ivalue = min3(rdist, ddist, idist);
        atabcolumn[rowindex].iedge = set_edge(rdist, ddist, idist);

        if rtab {
            let redge = atabcolumn[rowindex].redge;
            let dedge = atabcolumn[rowindex].dedge;
            let iedge = atabcolumn[rowindex].iedge;
            let prev_row_rtab = rtabcolumn[rowindex - 1];
            set_rtabentry(&mut rtabcolumn[rowindex].r, &rnw, redge);
            set_rtabentry(&mut rtabcolumn[rowindex].d, &prev_row_rtab, dedge);
            set_rtabentry(&mut rtabcolumn[rowindex].i, &rwe, iedge);
        }

        anw = awe;
        rnw = rwe;
    }
}

/// Runs the column sweep over all of `v`, returning the DP cost at
/// `(ulen, vlen)` (unbiased by `to_edge`; callers apply the bias via
/// [`min_additional_costs`]/[`additional_cost`]).
#[allow(clippy::too_many_arguments)]
pub fn evaluate_all_atab_rtab_columns(
    u: SeqView,
    ulen: usize,
    v: SeqView,
    vlen: usize,
    atabcolumn: &mut [Atabentry],
    rtabcolumn: &mut [Rtabentry],
    costs: &AffineCosts,
    mid_col: usize,
    from_edge: Edge,
) -> Cost {
    first_atab_rtab_column(ulen, atabcolumn, rtabcolumn, costs.gap_open, costs.gap_extend, from_edge);
    for colindex in 1..=vlen {
        next_atab_rtab_column(
            u,
            ulen,
            v.at(colindex - 1),
            atabcolumn,
            rtabcolumn,
            costs,
            mid_col,
            colindex,
        );
    }
    min3(
        atabcolumn[ulen].rvalue,
        atabcolumn[ulen].dvalue,
        atabcolumn[ulen].ivalue,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AffineCosts;

    fn costs() -> AffineCosts {
        AffineCosts::new(0, 3, 4, 1)
    }

    #[test]
    fn identical_sequences_cost_zero_via_r_state() {
        let u = b"ACGT";
        let v = b"ACGT";
        let uview = SeqView::whole(u);
        let vview = SeqView::whole(v);
        let mut atab = vec![Atabentry::unset(); u.len() + 1];
        let mut rtab = vec![Rtabentry::unset(); u.len() + 1];
        let dist = evaluate_all_atab_rtab_columns(
            uview,
            u.len(),
            vview,
            v.len(),
            &mut atab,
            &mut rtab,
            &costs(),
            u.len(), // mid_col irrelevant to the raw cost
            Edge::X,
        );
        assert_eq!(dist, 0);
    }
}
