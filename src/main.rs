use affine_hirschberg_align::{affine_align_linear, AffineCosts, AlignmentOp, SeqView};

/// Manual smoke test for the public API; not part of the tested contract.
fn main() {
    env_logger::init();

    let u = b"ATGATGATG";
    let v = b"ATGAATG";
    let costs = AffineCosts::new(0, 3, 4, 1);

    let mut ops: Vec<AlignmentOp> = Vec::new();
    let cost = affine_align_linear(SeqView::whole(u), SeqView::whole(v), costs, &mut ops)
        .expect("alignment cannot fail on well-formed input");

    println!("cost: {cost}");
    println!("ops:  {ops:?}");
}
