use super::*;
use crate::cfg::HullAlgorithm;
use crate::coefficient::Coefficient;
use crate::linear::{LinearExpression, Variable};
use crate::relation::{PolyConRelation, PolyGenRelation, ThreeValued};
use proptest::prelude::*;

const A: Variable = Variable(0);
const B: Variable = Variable(1);

fn cs_of(rows: Vec<Constraint>) -> ConstraintSystem {
    rows.into_iter().collect()
}

fn pt(coords: &[i64]) -> Generator {
    let expr = LinearExpression::from_coefficients(coords.iter().copied(), 0);
    Generator::point(expr, 1).expect("positive divisor")
}

fn gs_of(points: &[&[i64]]) -> GeneratorSystem {
    points.iter().map(|p| pt(p)).collect()
}

/// `[lo, hi]^2`, closed.
fn square(lo: i64, hi: i64) -> Polyhedron {
    let cs = cs_of(vec![
        Constraint::greater_or_equal(A, lo),
        Constraint::less_or_equal(A, hi),
        Constraint::greater_or_equal(B, lo),
        Constraint::less_or_equal(B, hi),
    ]);
    Polyhedron::from_constraints(Topology::Closed, &cs).expect("square")
}

fn closed_segment_at(b: i64, a_lo: i64, a_hi: i64) -> Polyhedron {
    let cs = cs_of(vec![
        Constraint::greater_or_equal(A, a_lo),
        Constraint::less_or_equal(A, a_hi),
        Constraint::equal(B, b),
    ]);
    Polyhedron::from_constraints(Topology::Closed, &cs).expect("segment")
}

fn nnc_interval(lo: i64, lo_strict: bool, hi: i64, hi_strict: bool) -> Polyhedron {
    let lower = if lo_strict {
        Constraint::greater_than(A, lo)
    } else {
        Constraint::greater_or_equal(A, lo)
    };
    let upper = if hi_strict {
        Constraint::less_than(A, hi)
    } else {
        Constraint::less_or_equal(A, hi)
    };
    Polyhedron::from_constraints(Topology::NotNecessarilyClosed, &cs_of(vec![lower, upper]))
        .expect("interval")
}

fn value(e: &Extremum) -> (Coefficient, Coefficient) {
    (e.numerator.clone(), e.denominator.clone())
}

fn frac(n: i64, d: i64) -> (Coefficient, Coefficient) {
    (Coefficient::from(n), Coefficient::from(d))
}

#[test]
fn degenerate_elements() {
    let mut u = Polyhedron::universe(Topology::Closed, 3).expect("universe");
    assert!(u.is_universe());
    assert!(!u.is_empty());
    assert!(!u.is_bounded());
    assert_eq!(u.affine_dimension(), 3);
    assert_eq!(u.generators().num_lines_or_equalities(), 3);

    let mut e = Polyhedron::empty(Topology::NotNecessarilyClosed, 2).expect("empty");
    assert!(e.is_empty());
    assert!(e.is_bounded());
    assert_eq!(e.affine_dimension(), 0);
    assert!(e.generators().has_no_rows());
    assert!(e.check_invariants());

    let mut z = Polyhedron::universe(Topology::Closed, 0).expect("zero-dim");
    assert!(z.is_universe() && !z.is_empty());
    assert!(z.status().test_zero_dim_univ());
}

#[test]
fn square_generators_are_its_vertices() {
    let mut sq = square(0, 2);
    let gs = sq.minimized_generators();
    assert_eq!(gs.num_rows(), 4);
    assert!(gs.iter().all(|g| g.is_point()));
    assert!(sq.is_bounded());
    assert_eq!(sq.affine_dimension(), 2);
    assert!(!sq.is_universe());
    assert!(sq.check_invariants());
}

#[test]
fn inconsistent_constraints_give_the_empty_set() {
    let cs = cs_of(vec![
        Constraint::greater_or_equal(A, 1),
        Constraint::less_or_equal(A, 0),
    ]);
    let mut p = Polyhedron::from_constraints(Topology::Closed, &cs).expect("poly");
    assert!(p.is_empty());
    assert!(!p.minimize());
    assert!(p.check_invariants());
}

#[test]
fn triangle_constraints_match_generators() {
    let gs = gs_of(&[&[0, 0], &[2, 0], &[0, 2]]);
    let mut tri = Polyhedron::from_generators(Topology::Closed, &gs).expect("triangle");
    let cs = tri.minimized_constraints().clone();
    assert_eq!(cs.visible().filter(|c| c.is_inequality()).count(), 3);
    let mut again = Polyhedron::from_constraints(Topology::Closed, &cs).expect("again");
    assert!(tri.equals(&mut again).expect("same shape"));
    assert!(tri.check_invariants() && again.check_invariants());
}

#[test]
fn redundant_generators_are_dropped() {
    let gs = gs_of(&[&[0, 0], &[2, 0], &[0, 2], &[2, 2], &[1, 1], &[1, 0]]);
    let mut sq = Polyhedron::from_generators(Topology::Closed, &gs).expect("square");
    assert_eq!(sq.minimized_generators().num_rows(), 4);
    assert!(sq.equals(&mut square(0, 2)).expect("same shape"));
}

#[test]
fn lines_and_rays_describe_unbounded_sets() {
    let mut gs = gs_of(&[&[0, 0]]);
    gs.insert(Generator::ray(LinearExpression::from(A)).expect("ray"));
    gs.insert(Generator::line(LinearExpression::from(B)).expect("line"));
    let mut half = Polyhedron::from_generators(Topology::Closed, &gs).expect("half-plane");
    assert!(!half.is_bounded());
    assert_eq!(half.affine_dimension(), 2);
    assert!(half.bounds_from_below(&LinearExpression::from(A)).expect("dim"));
    assert!(!half.bounds_from_above(&LinearExpression::from(A)).expect("dim"));
    assert!(!half.bounds_from_below(&LinearExpression::from(B)).expect("dim"));
    let cs = half.minimized_constraints();
    assert_eq!(cs.visible().count(), 1);
}

#[test]
fn maximize_and_minimize_over_the_square() {
    let mut sq = square(0, 2);
    let e = A + B + 1;
    let max = sq.maximize(&e).expect("dim").expect("bounded");
    assert_eq!(value(&max), frac(5, 1));
    assert!(max.included);
    assert_eq!(max.point.coefficient(A), Coefficient::from(2));
    let min = sq.minimize_expr(&e).expect("dim").expect("bounded");
    assert_eq!(value(&min), frac(1, 1));

    let half = 2i64 * A - B;
    let tri = gs_of(&[&[0, 0], &[3, 0], &[0, 3]]);
    let mut tri = Polyhedron::from_generators(Topology::Closed, &tri).expect("triangle");
    let scaled = LinearExpression::from_coefficients([1, 1], 0) * 2;
    assert_eq!(value(&tri.maximize(&scaled).expect("dim").expect("max")), frac(6, 1));
    assert_eq!(value(&tri.minimize_expr(&half).expect("dim").expect("min")), frac(-3, 1));
}

#[test]
fn rational_extremum_is_reduced() {
    let cs = cs_of(vec![
        Constraint::greater_or_equal(A, 0),
        Constraint::less_or_equal(2i64 * A, 3),
    ]);
    let mut p = Polyhedron::from_constraints(Topology::Closed, &cs).expect("interval");
    let max = p.maximize(&LinearExpression::from(A)).expect("dim").expect("max");
    assert_eq!(value(&max), frac(3, 2));
}

#[test]
fn unbounded_or_empty_has_no_extremum() {
    let cs = cs_of(vec![Constraint::greater_or_equal(A, 0)]);
    let mut p = Polyhedron::from_constraints(Topology::Closed, &cs).expect("half-line");
    assert!(p.maximize(&LinearExpression::from(A)).expect("dim").is_none());
    let min = p.minimize_expr(&LinearExpression::from(A)).expect("dim").expect("min");
    assert_eq!(value(&min), frac(0, 1));

    let mut e = Polyhedron::empty(Topology::Closed, 1).expect("empty");
    assert!(e.maximize(&LinearExpression::from(A)).expect("dim").is_none());
    assert!(e.bounds_from_above(&LinearExpression::from(A)).expect("dim"));
}

#[test]
fn nnc_supremum_is_not_attained() {
    let mut p = nnc_interval(0, false, 1, true);
    let max = p.maximize(&LinearExpression::from(A)).expect("dim").expect("max");
    assert_eq!(value(&max), frac(1, 1));
    assert!(!max.included);
    assert!(max.point.is_closure_point());
    let min = p.minimize_expr(&LinearExpression::from(A)).expect("dim").expect("min");
    assert_eq!(value(&min), frac(0, 1));
    assert!(min.included);
}

#[test]
fn nnc_emptiness_needs_the_epsilon_dimension() {
    let cs = cs_of(vec![
        Constraint::greater_than(A, 0),
        Constraint::less_or_equal(A, 0),
    ]);
    let mut p = Polyhedron::from_constraints(Topology::NotNecessarilyClosed, &cs).expect("poly");
    assert!(p.is_empty());

    let mut q = nnc_interval(0, true, 1, true);
    assert!(!q.is_empty());
    assert!(q.is_bounded());
    assert_eq!(q.affine_dimension(), 1);
}

#[test]
fn strong_minimization_drops_redundant_strict_inequalities() {
    let cs = cs_of(vec![
        Constraint::greater_than(A, 0),
        Constraint::less_than(A, 1),
        Constraint::greater_than(A, -1),
        Constraint::greater_or_equal(B, 0),
        Constraint::less_or_equal(B, 1),
    ]);
    let mut p = Polyhedron::from_constraints(Topology::NotNecessarilyClosed, &cs).expect("strip");
    assert!(p.strongly_minimize_constraints());
    let cs = p.constraints();
    assert_eq!(cs.visible().count(), 4);
    assert_eq!(cs.visible().filter(|c| c.is_strict_inequality()).count(), 2);
    assert!(p.check_invariants());

    assert!(p.strongly_minimize_generators());
    assert!(p.check_invariants());
    let mut same = Polyhedron::from_constraints(
        Topology::NotNecessarilyClosed,
        &cs_of(vec![
            Constraint::greater_than(A, 0),
            Constraint::less_than(A, 1),
            Constraint::greater_or_equal(B, 0),
            Constraint::less_or_equal(B, 1),
        ]),
    )
    .expect("strip");
    assert!(p.equals(&mut same).expect("same shape"));
}

#[test]
fn strong_minimization_of_closed_polyhedra_keeps_the_set() {
    let mut p = square(0, 2);
    assert!(p.strongly_minimize_generators());
    assert!(p.equals(&mut square(0, 2)).expect("same space"));
    assert_eq!(p.minimized_generators().num_rows(), 4);

    let mut q = square(0, 2);
    assert!(q.strongly_minimize_constraints());
    assert!(q.equals(&mut square(0, 2)).expect("same space"));
    assert!(q.check_invariants());
}

#[test]
fn topological_closure_relaxes_strict_inequalities() {
    let mut open = nnc_interval(0, true, 1, true);
    open.topological_closure_assign();
    let mut closed = nnc_interval(0, false, 1, false);
    assert!(open.equals(&mut closed).expect("same space"));

    // Pending constraints are folded in first.
    let mut p = nnc_interval(0, true, 2, false);
    p.minimize();
    p.add_constraint(&Constraint::less_than(A, 1)).expect("fits");
    p.topological_closure_assign();
    assert!(p.equals(&mut closed).expect("same space"));
    assert!(p.check_invariants());

    let mut sq = square(0, 1);
    sq.topological_closure_assign();
    assert!(sq.equals(&mut square(0, 1)).expect("same space"));
}

#[test]
fn closed_polyhedra_reject_strict_inequalities() {
    let mut sq = square(0, 2);
    let err = sq.add_constraint(&Constraint::greater_than(A, 1)).unwrap_err();
    assert!(matches!(err, PolyhedronError::TopologyIncompatible { .. }));
    sq.refine_with_constraint(&Constraint::greater_than(A, 1)).expect("refine");
    let min = sq.minimize_expr(&LinearExpression::from(A)).expect("dim").expect("min");
    assert_eq!(value(&min), frac(1, 1));
    assert!(min.included);

    // Trivial strict inequalities are accepted.
    sq.add_constraint(&Constraint::greater_than(LinearExpression::from(1), 0))
        .expect("tautology");
    assert!(!sq.is_empty());
}

#[test]
fn dimension_mismatches_are_reported() {
    let mut sq = square(0, 2);
    let err = sq
        .add_constraint(&Constraint::greater_or_equal(Variable(4), 0))
        .unwrap_err();
    assert!(matches!(
        err,
        PolyhedronError::DimensionIncompatible { this_dim: 2, other_dim: 5, .. }
    ));
    let mut u3 = Polyhedron::universe(Topology::Closed, 3).expect("universe");
    assert!(sq.contains(&mut u3).is_err());
    let mut nnc = Polyhedron::universe(Topology::NotNecessarilyClosed, 2).expect("universe");
    assert!(matches!(
        sq.poly_hull_assign(&mut nnc).unwrap_err(),
        PolyhedronError::TopologyIncompatible { .. }
    ));
    assert!(sq.maximize(&LinearExpression::from(Variable(2))).is_err());
}

#[test]
fn pending_constraints_are_folded_in() {
    let gs = gs_of(&[&[0, 0], &[2, 0], &[0, 2], &[2, 2]]);
    let mut sq = Polyhedron::from_generators(Topology::Closed, &gs).expect("square");
    assert!(sq.minimize());
    sq.add_constraint(&Constraint::less_or_equal(A + B, 2)).expect("add");
    assert!(sq.status().test_c_pending());
    assert!(sq.check_invariants());
    let max = sq.maximize(&LinearExpression::from(A + B)).expect("dim").expect("max");
    assert_eq!(value(&max), frac(2, 1));
    assert_eq!(sq.minimized_generators().num_rows(), 3);
    assert!(sq.check_invariants());
}

#[test]
fn pending_generators_are_folded_in() {
    let mut sq = square(0, 2);
    assert!(sq.minimize());
    sq.add_generator(&pt(&[5, 1])).expect("add");
    assert!(sq.status().test_g_pending());
    let max = sq.maximize(&LinearExpression::from(A)).expect("dim").expect("max");
    assert_eq!(value(&max), frac(5, 1));
    assert!(sq.minimize());
    assert!(!sq.status().has_something_pending());
    // (2, 0) and (2, 2) stay vertices next to (5, 1).
    assert_eq!(sq.minimized_generators().num_rows(), 5);
    assert!(sq.check_invariants());
}

#[test]
fn empty_polyhedron_accepts_only_points() {
    let mut e = Polyhedron::empty(Topology::Closed, 2).expect("empty");
    let ray = Generator::ray(LinearExpression::from(A)).expect("ray");
    assert!(matches!(
        e.add_generator(&ray).unwrap_err(),
        PolyhedronError::InvalidGenerator { .. }
    ));
    e.add_generator(&pt(&[1, 1])).expect("point");
    assert!(!e.is_empty());
    assert!(e.is_bounded());
    e.add_generator(&ray).expect("ray after point");
    assert!(!e.is_bounded());

    let mut gs = GeneratorSystem::with_topology(Topology::Closed, 2);
    gs.insert(ray);
    let mut e = Polyhedron::empty(Topology::Closed, 2).expect("empty");
    assert!(matches!(
        e.add_generators(&gs).unwrap_err(),
        PolyhedronError::InvalidGenerators { .. }
    ));
    assert!(Polyhedron::from_generators(Topology::Closed, &gs).is_err());
}

#[test]
fn closure_points_need_nnc() {
    let cp = Generator::closure_point(LinearExpression::from(A), 1).expect("cp");
    let mut sq = square(0, 2);
    assert!(matches!(
        sq.add_generator(&cp).unwrap_err(),
        PolyhedronError::TopologyIncompatible { .. }
    ));
    let mut p = nnc_interval(1, false, 2, false);
    p.add_generator(&cp).expect("cp");
    // [1, 2] joined with the closure point 1 is still [1, 2].
    assert!(p.equals(&mut nnc_interval(1, false, 2, false)).expect("same shape"));
}

#[test]
fn inclusion_and_equality() {
    let mut big = square(0, 4);
    let mut small = square(1, 2);
    assert!(big.contains(&mut small).expect("shape"));
    assert!(big.strictly_contains(&mut small).expect("shape"));
    assert!(!small.contains(&mut big).expect("shape"));
    assert!(small.is_included_in(&mut big).expect("shape"));
    assert!(!big.equals(&mut small).expect("shape"));

    let gs = gs_of(&[&[1, 1], &[2, 1], &[1, 2], &[2, 2]]);
    let mut small2 = Polyhedron::from_generators(Topology::Closed, &gs).expect("square");
    assert!(small.equals(&mut small2).expect("shape"));
    assert!(!small.strictly_contains(&mut small2).expect("shape"));

    let mut e = Polyhedron::empty(Topology::Closed, 2).expect("empty");
    assert!(small.contains(&mut e).expect("shape"));
    assert!(!e.contains(&mut small).expect("shape"));
}

#[test]
fn nnc_inclusion_respects_open_faces() {
    let mut open = nnc_interval(0, true, 1, true);
    let mut closed = nnc_interval(0, false, 1, false);
    assert!(closed.contains(&mut open).expect("shape"));
    assert!(!open.contains(&mut closed).expect("shape"));
    assert!(closed.strictly_contains(&mut open).expect("shape"));
}

#[test]
fn quick_equivalence_sees_obvious_differences() {
    let mut a = square(0, 2);
    let mut b = square(0, 2);
    let mut c = square(0, 3);
    assert!(a.minimize() && b.minimize() && c.minimize());
    assert_ne!(a.quick_equivalence_test(&mut c), ThreeValued::True);
    assert_ne!(a.quick_equivalence_test(&mut b), ThreeValued::False);
    let mut seg = closed_segment_at(0, 0, 2);
    assert!(seg.minimize());
    assert_eq!(a.quick_equivalence_test(&mut seg), ThreeValued::False);
}

#[test]
fn relations_with_constraints() {
    let mut sq = square(0, 2);
    let rel = sq
        .relation_with_constraint(&Constraint::less_or_equal(A, 5))
        .expect("dim");
    assert!(rel.implies(PolyConRelation::is_included()));
    assert!(!rel.implies(PolyConRelation::saturates()));

    let rel = sq
        .relation_with_constraint(&Constraint::greater_or_equal(A, 3))
        .expect("dim");
    assert!(rel.implies(PolyConRelation::is_disjoint()));

    let rel = sq
        .relation_with_constraint(&Constraint::greater_or_equal(A, 1))
        .expect("dim");
    assert!(rel.implies(PolyConRelation::strictly_intersects()));

    let mut seg = closed_segment_at(0, 0, 2);
    let rel = seg.relation_with_constraint(&Constraint::equal(B, 0)).expect("dim");
    assert!(rel.implies(PolyConRelation::saturates() | PolyConRelation::is_included()));

    let mut e = Polyhedron::empty(Topology::Closed, 2).expect("empty");
    let rel = e.relation_with_constraint(&Constraint::equal(B, 0)).expect("dim");
    assert!(rel.implies(PolyConRelation::is_disjoint() | PolyConRelation::is_included()));
}

#[test]
fn strict_constraint_touching_a_face_is_disjoint_from_it() {
    let mut seg = closed_segment_at(0, 0, 2);
    let mut nnc = Polyhedron::from_constraints(
        Topology::NotNecessarilyClosed,
        seg.constraints(),
    )
    .expect("nnc segment");
    let rel = nnc
        .relation_with_constraint(&Constraint::greater_than(B, 0))
        .expect("dim");
    assert!(rel.implies(PolyConRelation::is_disjoint()));
    let rel = nnc
        .relation_with_constraint(&Constraint::less_than(A, 2))
        .expect("dim");
    assert!(rel.implies(PolyConRelation::strictly_intersects()));
}

#[test]
fn relations_with_generators() {
    let mut sq = square(0, 2);
    assert_eq!(sq.relation_with_generator(&pt(&[1, 1])).expect("dim"), PolyGenRelation::Subsumes);
    assert_eq!(sq.relation_with_generator(&pt(&[3, 1])).expect("dim"), PolyGenRelation::Nothing);
    let ray = Generator::ray(LinearExpression::from(A)).expect("ray");
    assert_eq!(sq.relation_with_generator(&ray).expect("dim"), PolyGenRelation::Nothing);
    let mut half = Polyhedron::from_constraints(
        Topology::Closed,
        &cs_of(vec![Constraint::greater_or_equal(A, 0)]),
    )
    .expect("half-plane");
    assert_eq!(half.relation_with_generator(&ray).expect("dim"), PolyGenRelation::Subsumes);
}

#[test]
fn hull_of_adjacent_segments_is_exact() {
    for algo in [HullAlgorithm::Bhz09, HullAlgorithm::Bft00, HullAlgorithm::Auto] {
        let mut x = closed_segment_at(0, 0, 1);
        let mut y = closed_segment_at(0, 1, 2);
        assert!(x.poly_hull_assign_if_exact_with(&mut y, algo).expect("shape"), "{algo:?}");
        assert!(x.equals(&mut closed_segment_at(0, 0, 2)).expect("shape"));
        assert!(x.check_invariants());
    }
}

#[test]
fn hull_of_parallel_segments_is_not_exact() {
    for algo in [HullAlgorithm::Bhz09, HullAlgorithm::Bft00] {
        let mut x = closed_segment_at(0, 0, 1);
        let mut y = closed_segment_at(1, 0, 1);
        assert!(!x.poly_hull_assign_if_exact_with(&mut y, algo).expect("shape"), "{algo:?}");
        // Unchanged.
        assert!(x.equals(&mut closed_segment_at(0, 0, 1)).expect("shape"));
    }
}

#[test]
fn hull_of_line_and_transversal_segment_is_not_exact() {
    for algo in [HullAlgorithm::Bhz09, HullAlgorithm::Bft00] {
        let mut x = Polyhedron::universe(Topology::Closed, 2).expect("plane");
        x.add_constraint(&Constraint::equal(A, 0)).expect("line");
        let mut y = closed_segment_at(0, 0, 1);
        assert!(!x.poly_hull_assign_if_exact_with(&mut y, algo).expect("shape"), "{algo:?}");
        assert!(!x.is_bounded());
        assert_eq!(x.affine_dimension(), 1);
    }
}

#[test]
fn hull_with_a_contained_polyhedron_is_exact() {
    let mut big = square(0, 4);
    let mut small = square(1, 2);
    assert!(big.poly_hull_assign_if_exact(&mut small).expect("shape"));
    assert!(big.equals(&mut square(0, 4)).expect("shape"));

    let mut small = square(1, 2);
    assert!(small
        .bhz09_poly_hull_assign_if_exact(&mut square(0, 4))
        .expect("shape"));
    assert!(small.equals(&mut square(0, 4)).expect("shape"));
}

#[test]
fn hull_with_empty_is_exact() {
    let mut sq = square(0, 1);
    let mut e = Polyhedron::empty(Topology::Closed, 2).expect("empty");
    assert!(sq.poly_hull_assign_if_exact(&mut e).expect("shape"));
    assert!(sq.equals(&mut square(0, 1)).expect("shape"));
    assert!(e.poly_hull_assign_if_exact(&mut sq).expect("shape"));
    assert!(e.equals(&mut square(0, 1)).expect("shape"));
}

#[test]
fn nnc_hull_glues_half_open_intervals() {
    let mut x = nnc_interval(0, false, 1, true);
    let mut y = nnc_interval(1, false, 2, false);
    assert!(x.poly_hull_assign_if_exact(&mut y).expect("shape"));
    assert!(x.equals(&mut nnc_interval(0, false, 2, false)).expect("shape"));
    assert!(x.check_invariants());
}

#[test]
fn nnc_hull_of_open_intervals_missing_a_point_is_not_exact() {
    let mut x = nnc_interval(0, true, 1, true);
    let mut y = nnc_interval(1, true, 2, true);
    assert!(!x.poly_hull_assign_if_exact(&mut y).expect("shape"));
    assert!(x.equals(&mut nnc_interval(0, true, 1, true)).expect("shape"));
}

#[test]
fn bft00_rejects_nnc() {
    let mut x = nnc_interval(0, false, 1, false);
    let mut y = nnc_interval(1, false, 2, false);
    assert!(matches!(
        x.bft00_poly_hull_assign_if_exact(&mut y).unwrap_err(),
        PolyhedronError::TopologyIncompatible { .. }
    ));
}

#[test]
fn hull_and_intersection_are_lattice_operations() {
    let mut x = closed_segment_at(0, 0, 1);
    let mut y = closed_segment_at(1, 0, 1);
    x.poly_hull_assign(&mut y).expect("shape");
    assert!(x.equals(&mut square(0, 1)).expect("shape"));

    let mut a = square(0, 2);
    let mut b = square(1, 3);
    a.intersection_assign(&mut b).expect("shape");
    assert!(a.equals(&mut square(1, 2)).expect("shape"));

    let mut c = square(5, 6);
    a.intersection_assign(&mut c).expect("shape");
    assert!(a.is_empty());
}

#[test]
fn eager_lattice_operations_keep_both_sides_minimized() {
    let mut x = closed_segment_at(0, 0, 1);
    let mut y = closed_segment_at(1, 0, 1);
    assert!(x.poly_hull_assign_and_minimize(&mut y).expect("shape"));
    assert!(x.status().test_c_minimized() && x.status().test_g_minimized());
    assert!(!x.status().has_something_pending());
    assert_eq!(x.minimized_generators().num_rows(), 4);
    assert!(x.check_invariants());
    assert!(x.equals(&mut square(0, 1)).expect("shape"));

    let mut a = square(0, 2);
    let mut b = square(1, 3);
    assert!(a.intersection_assign_and_minimize(&mut b).expect("shape"));
    assert!(a.check_invariants());
    assert!(a.equals(&mut square(1, 2)).expect("shape"));
    assert!(!a.intersection_assign_and_minimize(&mut square(5, 6)).expect("shape"));
    assert!(a.is_empty());

    let mut e = Polyhedron::empty(Topology::Closed, 2).expect("empty");
    assert!(e.poly_hull_assign_and_minimize(&mut square(0, 1)).expect("shape"));
    assert!(e.equals(&mut square(0, 1)).expect("shape"));
}

#[test]
fn embedding_adds_free_dimensions() {
    let mut sq = square(0, 2);
    sq.add_space_dimensions_and_embed(1).expect("embed");
    assert_eq!(sq.space_dimension(), 3);
    assert!(!sq.is_bounded());
    assert!(sq.check_invariants());
    let far = pt(&[1, 1, 100]);
    assert_eq!(sq.relation_with_generator(&far).expect("dim"), PolyGenRelation::Subsumes);
    assert!(sq.bounds_from_above(&LinearExpression::from(A)).expect("dim"));
    assert!(!sq.bounds_from_above(&LinearExpression::from(Variable(2))).expect("dim"));
}

#[test]
fn projecting_adds_zero_dimensions() {
    let mut sq = square(0, 2);
    assert!(sq.minimize());
    sq.add_space_dimensions_and_project(2).expect("project");
    assert_eq!(sq.space_dimension(), 4);
    assert!(sq.is_bounded());
    assert_eq!(sq.affine_dimension(), 2);
    assert!(sq.check_invariants());
    assert_eq!(
        sq.relation_with_generator(&pt(&[1, 1, 0, 0])).expect("dim"),
        PolyGenRelation::Subsumes
    );
    assert_eq!(
        sq.relation_with_generator(&pt(&[1, 1, 0, 1])).expect("dim"),
        PolyGenRelation::Nothing
    );
}

#[test]
fn adding_dimensions_to_degenerate_polyhedra() {
    let mut z = Polyhedron::universe(Topology::NotNecessarilyClosed, 0).expect("zero-dim");
    z.add_space_dimensions_and_project(2).expect("project");
    assert_eq!(z.affine_dimension(), 0);
    assert!(z.is_bounded() && !z.is_empty());
    assert!(z.check_invariants());

    let mut z = Polyhedron::universe(Topology::Closed, 0).expect("zero-dim");
    z.add_space_dimensions_and_embed(2).expect("embed");
    assert!(z.is_universe());

    let mut e = Polyhedron::empty(Topology::Closed, 1).expect("empty");
    e.add_space_dimensions_and_embed(3).expect("embed");
    assert_eq!(e.space_dimension(), 4);
    assert!(e.is_empty());

    let mut sq = square(0, 1);
    assert!(matches!(
        sq.add_space_dimensions_and_embed(crate::cfg::MAX_SPACE_DIMENSION).unwrap_err(),
        PolyhedronError::SpaceDimensionOverflow { .. }
    ));
}

#[test]
fn removing_dimensions_projects_away_coordinates() {
    let tri = gs_of(&[&[0, 0], &[4, 0], &[0, 2]]);
    let mut p = Polyhedron::from_generators(Topology::Closed, &tri).expect("triangle");
    p.remove_higher_space_dimensions(1).expect("remove");
    assert_eq!(p.space_dimension(), 1);
    let max = p.maximize(&LinearExpression::from(A)).expect("dim").expect("max");
    assert_eq!(value(&max), frac(4, 1));
    assert!(p.check_invariants());

    let mut strip = Polyhedron::from_constraints(
        Topology::NotNecessarilyClosed,
        &cs_of(vec![Constraint::greater_than(A, 0), Constraint::less_than(A, 1)]),
    )
    .expect("strip");
    strip.add_space_dimensions_and_embed(1).expect("embed");
    strip.remove_higher_space_dimensions(1).expect("remove");
    assert!(strip.equals(&mut nnc_interval(0, true, 1, true)).expect("shape"));

    let mut sq = square(0, 1);
    assert!(matches!(
        sq.remove_higher_space_dimensions(3).unwrap_err(),
        PolyhedronError::DimensionIncompatible { .. }
    ));
    sq.remove_higher_space_dimensions(0).expect("remove");
    assert!(sq.status().test_zero_dim_univ());
}

#[test]
fn space_dimension_round_trip() {
    let mut sq = square(0, 3);
    sq.add_space_dimensions_and_embed(2).expect("embed");
    sq.remove_higher_space_dimensions(2).expect("remove");
    assert!(sq.equals(&mut square(0, 3)).expect("shape"));
}

fn arb_points() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((-5i64..=5, -5i64..=5), 1..7)
}

fn polytope(points: &[(i64, i64)]) -> Polyhedron {
    let gs: GeneratorSystem = points.iter().map(|&(x, y)| pt(&[x, y])).collect();
    Polyhedron::from_generators(Topology::Closed, &gs).expect("polytope")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn constraints_and_generators_describe_the_same_set(points in arb_points()) {
        let mut p = polytope(&points);
        prop_assert!(p.minimize());
        prop_assert!(p.check_invariants());
        let cs = p.minimized_constraints().clone();
        let mut q = Polyhedron::from_constraints(Topology::Closed, &cs).expect("dual");
        prop_assert!(p.equals(&mut q).expect("shape"));
        prop_assert!(q.check_invariants());
        for &(x, y) in &points {
            prop_assert_eq!(
                q.relation_with_generator(&pt(&[x, y])).expect("dim"),
                PolyGenRelation::Subsumes
            );
        }
    }

    #[test]
    fn minimization_is_idempotent(points in arb_points()) {
        let mut p = polytope(&points);
        prop_assert!(p.minimize());
        let gs = p.minimized_generators().clone();
        let (con_before, gen_before) = (p.con_sys.clone(), p.gen_sys.clone());
        prop_assert!(p.minimize());
        prop_assert_eq!(&p.con_sys, &con_before);
        prop_assert_eq!(&p.gen_sys, &gen_before);
        prop_assert_eq!(p.minimized_generators().num_rows(), gs.num_rows());
        let mut q = Polyhedron::from_generators(Topology::Closed, &gs).expect("copy");
        prop_assert_eq!(q.minimized_generators().num_rows(), gs.num_rows());
    }

    #[test]
    fn rebuilt_copies_are_never_told_apart(points in arb_points()) {
        let mut p = polytope(&points);
        prop_assert!(p.minimize());
        let gs = p.minimized_generators().clone();
        let cs = p.minimized_constraints().clone();

        let mut from_gens = Polyhedron::from_generators(Topology::Closed, &gs).expect("copy");
        prop_assert!(from_gens.minimize());
        prop_assert_ne!(p.quick_equivalence_test(&mut from_gens), ThreeValued::False);

        let mut from_cons = Polyhedron::from_constraints(Topology::Closed, &cs).expect("copy");
        prop_assert!(from_cons.minimize());
        prop_assert_ne!(p.quick_equivalence_test(&mut from_cons), ThreeValued::False);
    }

    #[test]
    fn hull_contains_both_operands(a in arb_points(), b in arb_points()) {
        let mut x = polytope(&a);
        let mut y = polytope(&b);
        let mut h = x.clone();
        h.poly_hull_assign(&mut y).expect("shape");
        prop_assert!(h.contains(&mut x).expect("shape"));
        prop_assert!(h.contains(&mut y).expect("shape"));
        prop_assert!(h.check_invariants());

        let mut i = x.clone();
        i.intersection_assign(&mut y).expect("shape");
        prop_assert!(x.contains(&mut i).expect("shape"));
        prop_assert!(y.contains(&mut i).expect("shape"));
    }

    #[test]
    fn exactness_procedures_agree(a in arb_points(), b in arb_points()) {
        let mut x1 = polytope(&a);
        let mut x2 = polytope(&a);
        let mut y = polytope(&b);
        let bhz = x1.bhz09_poly_hull_assign_if_exact(&mut y).expect("shape");
        let bft = x2.bft00_poly_hull_assign_if_exact(&mut y).expect("shape");
        prop_assert_eq!(bhz, bft);
        if bhz {
            let mut h = polytope(&a);
            h.poly_hull_assign(&mut y).expect("shape");
            prop_assert!(x1.equals(&mut h).expect("shape"));
            prop_assert!(x2.equals(&mut h).expect("shape"));
        }
    }

    #[test]
    fn self_hull_is_exact(points in arb_points()) {
        let mut x = polytope(&points);
        let mut y = polytope(&points);
        prop_assert!(x.poly_hull_assign_if_exact(&mut y).expect("shape"));
        prop_assert!(x.equals(&mut y).expect("shape"));
    }
}
