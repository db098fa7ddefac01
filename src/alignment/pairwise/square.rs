//! C2: square-space affine DP, the leaf solver used when one sequence has
//! length <= 1, and as the exact reference aligner cross-checked against
//! the linear-space drivers.
//!
//! Builds the three full `(ulen+1) x (vlen+1)` state matrices and their
//! incoming-edge matrices, then walks the traceback from the
//! `to_edge`-biased winning corner back to `(0, 0)`.

use crate::alignment::{add_sat, min3, set_edge, AffineCosts, AlignmentSink, Cost, Edge, SeqView, INF};

struct Cell {
    rvalue: Cost,
    dvalue: Cost,
    ivalue: Cost,
    redge: Edge,
    dedge: Edge,
    iedge: Edge,
}

/// Full square-space affine DP table and its traceback.
pub struct SquareAligner {
    ulen: usize,
    vlen: usize,
    // Row-major: cells[i * (vlen + 1) + j]
    cells: Vec<Cell>,
}

impl SquareAligner {
    fn at(&self, i: usize, j: usize) -> &Cell {
        &self.cells[i * (self.vlen + 1) + j]
    }

    /// Fills the three DP matrices for `u` against `v` given the entry
    /// edge `from_edge` at `(0, 0)`.
    pub fn compute(u: SeqView, v: SeqView, costs: &AffineCosts, from_edge: Edge) -> Self {
        let ulen = u.len();
        let vlen = v.len();
        let width = vlen + 1;
        let mut cells = Vec::with_capacity((ulen + 1) * width);
        for _ in 0..(ulen + 1) * width {
            cells.push(Cell {
                rvalue: INF,
                dvalue: INF,
                ivalue: INF,
                redge: Edge::X,
                dedge: Edge::X,
                iedge: Edge::X,
            });
        }
        let mut aligner = SquareAligner { ulen, vlen, cells };

        let (r0, d0, i0) = match from_edge {
            Edge::R => (0, INF, INF),
            Edge::D => (INF, 0, INF),
            Edge::I => (INF, INF, 0),
            Edge::X => (0, costs.gap_open, costs.gap_open),
        };
        aligner.set(0, 0, r0, d0, i0, Edge::X, Edge::X, Edge::X);

        for i in 1..=ulen {
            let (pr, pd, pi) = {
                let prev = aligner.at(i - 1, 0);
                (prev.rvalue, prev.dvalue, prev.ivalue)
            };
            let open_extend = add_sat(costs.gap_open, costs.gap_extend);
            let rdist = add_sat(pr, open_extend);
            let ddist = add_sat(pd, costs.gap_extend);
            let idist = add_sat(pi, open_extend);
            let dval = min3(rdist, ddist, idist);
            let dedge = set_edge(rdist, ddist, idist);
            aligner.set(i, 0, INF, dval, INF, Edge::X, dedge, Edge::X);
        }
        for j in 1..=vlen {
            let (pr, pd, pi) = {
                let prev = aligner.at(0, j - 1);
                (prev.rvalue, prev.dvalue, prev.ivalue)
            };
            let open_extend = add_sat(costs.gap_open, costs.gap_extend);
            let rdist = add_sat(pr, open_extend);
            let ddist = add_sat(pd, open_extend);
            let idist = add_sat(pi, costs.gap_extend);
            let ival = min3(rdist, ddist, idist);
            let iedge = set_edge(rdist, ddist, idist);
            aligner.set(0, j, INF, INF, ival, Edge::X, Edge::X, iedge);
        }

        for i in 1..=ulen {
            for j in 1..=vlen {
                let rcost = if u.at(i - 1) == v.at(j - 1) {
                    costs.match_cost
                } else {
                    costs.mismatch_cost
                };
                let (dr, dd, di) = {
                    let diag = aligner.at(i - 1, j - 1);
                    (diag.rvalue, diag.dvalue, diag.ivalue)
                };
                let rdist = add_sat(dr, rcost);
                let ddist = add_sat(dd, rcost);
                let idist = add_sat(di, rcost);
                let rval = min3(rdist, ddist, idist);
                let redge = set_edge(rdist, ddist, idist);

                let open_extend = add_sat(costs.gap_open, costs.gap_extend);
                let (ur, ud, ui) = {
                    let up = aligner.at(i - 1, j);
                    (up.rvalue, up.dvalue, up.ivalue)
                };
                let rdist = add_sat(ur, open_extend);
                let ddist = add_sat(ud, costs.gap_extend);
                let idist = add_sat(ui, open_extend);
                let dval = min3(rdist, ddist, idist);
                let dedge = set_edge(rdist, ddist, idist);

                let (lr, ld, li) = {
                    let left = aligner.at(i, j - 1);
                    (left.rvalue, left.dvalue, left.ivalue)
                };
                let rdist = add_sat(lr, open_extend);
                let ddist = add_sat(ld, open_extend);
                let idist = add_sat(li, costs.gap_extend);
                let ival = min3(rdist, ddist, idist);
                let iedge = set_edge(rdist, ddist, idist);

                aligner.set(i, j, rval, dval, ival, redge, dedge, iedge);
            }
        }
        aligner
    }

    fn set(
        &mut self,
        i: usize,
        j: usize,
        rvalue: Cost,
        dvalue: Cost,
        ivalue: Cost,
        redge: Edge,
        dedge: Edge,
        iedge: Edge,
    ) {
        let idx = i * (self.vlen + 1) + j;
        self.cells[idx] = Cell {
            rvalue,
            dvalue,
            ivalue,
            redge,
            dedge,
            iedge,
        };
    }

    /// The cost at `(ulen, vlen)` once `to_edge`'s reopen bias is applied.
    pub fn cost(&self, costs: &AffineCosts, to_edge: Edge) -> Cost {
        let entry = self.at(self.ulen, self.vlen);
        super::column_sweep::additional_cost_cell(
            entry.rvalue,
            entry.dvalue,
            entry.ivalue,
            to_edge,
            costs.gap_open,
        )
    }

    /// Walks the traceback from `(ulen, vlen)` back to `(0, 0)`, emitting
    /// edit steps into `sink` in forward order.
    pub fn traceback(&self, costs: &AffineCosts, to_edge: Edge, sink: &mut impl AlignmentSink) {
        let entry = self.at(self.ulen, self.vlen);
        let mut state = super::column_sweep::min_additional_costs_cell(
            entry.rvalue,
            entry.dvalue,
            entry.ivalue,
            to_edge,
            costs.gap_open,
        );
        let mut i = self.ulen;
        let mut j = self.vlen;
        let mut ops = Vec::new();
        while i > 0 || j > 0 {
            let cell = self.at(i, j);
            match state {
                Edge::R => {
                    ops.push(crate::alignment::AlignmentOp::Replace);
                    state = cell.redge;
                    i -= 1;
                    j -= 1;
                }
                Edge::D => {
                    ops.push(crate::alignment::AlignmentOp::Delete);
                    state = cell.dedge;
                    i -= 1;
                }
                Edge::I => {
                    ops.push(crate::alignment::AlignmentOp::Insert);
                    state = cell.iedge;
                    j -= 1;
                }
                Edge::X => unreachable!("traceback reached the unknown edge tag"),
            }
        }
        ops.reverse();
        for op in ops {
            match op {
                crate::alignment::AlignmentOp::Replace => sink.append_replace(),
                crate::alignment::AlignmentOp::Delete => sink.append_delete(),
                crate::alignment::AlignmentOp::Insert => sink.append_insert(),
            }
        }
    }
}

/// Runs the square-space aligner end to end: computes the cost and emits
/// the traceback into `sink`.
pub fn align(
    u: SeqView,
    v: SeqView,
    costs: &AffineCosts,
    from_edge: Edge,
    to_edge: Edge,
    sink: &mut impl AlignmentSink,
) -> Cost {
    let aligner = SquareAligner::compute(u, v, costs, from_edge);
    aligner.traceback(costs, to_edge, sink);
    aligner.cost(costs, to_edge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::AlignmentOp;

    fn costs() -> AffineCosts {
        AffineCosts::new(0, 3, 4, 1)
    }

    #[test]
    fn identical_sequences() {
        let u = b"ACGT";
        let v = b"ACGT";
        let mut sink: Vec<AlignmentOp> = Vec::new();
        let cost = align(
            SeqView::whole(u),
            SeqView::whole(v),
            &costs(),
            Edge::X,
            Edge::X,
            &mut sink,
        );
        assert_eq!(cost, 0);
        assert_eq!(sink, vec![AlignmentOp::Replace; 4]);
    }

    #[test]
    fn single_mismatch_block() {
        // ACGT vs AGT: A-replace, C-delete, G-replace, T-replace.
        let u = b"ACGT";
        let v = b"AGT";
        let mut sink: Vec<AlignmentOp> = Vec::new();
        let cost = align(
            SeqView::whole(u),
            SeqView::whole(v),
            &costs(),
            Edge::X,
            Edge::X,
            &mut sink,
        );
        assert_eq!(cost, 5);
    }
}
