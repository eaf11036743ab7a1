//! End-to-end: formulas prepare the operands, the gravity balancer
//! distributes them.

use tripflow_engine::solver::balance;
use tripflow_engine::{compile, evaluate, Operands, Value};
use tripflow_model::{OdMatrix, ZoneIndex, ZoneVector};

#[test]
fn two_zone_fixture_balances_within_tolerance() {
    let zones = ZoneIndex::shared(vec![1, 2]).unwrap();
    let production = ZoneVector::from_data(zones.clone(), vec![2.0, 2.0]).unwrap();
    let attraction = ZoneVector::from_data(zones.clone(), vec![1.5, 2.5]).unwrap();
    let friction =
        OdMatrix::from_data(zones.clone(), zones, vec![0.25, 0.75, 2.0, 2.0]).unwrap();

    let balanced = balance(&production, &attraction, &friction, 100, 0.25).unwrap();

    let expected = [0.5, 1.5, 1.0, 1.0];
    for (actual, want) in balanced.data().iter().zip(expected) {
        assert!((actual - want).abs() <= 0.25, "{actual} vs {want}");
    }
}

#[test]
fn formula_derived_friction_feeds_the_balancer() {
    let zones = ZoneIndex::shared(vec![10, 20, 30]).unwrap();
    let cost = OdMatrix::from_data(
        zones.clone(),
        zones.clone(),
        vec![1.0, 2.0, 4.0, 2.0, 1.0, 2.0, 4.0, 2.0, 1.0],
    )
    .unwrap();

    // Friction as a deterrence formula over the cost skim.
    let mut operands = Operands::new();
    operands.insert("cost", cost);
    let expr = compile("1 / (cost * cost)").unwrap();
    let Value::Matrix(friction) = evaluate(&expr, &operands).unwrap() else {
        panic!("expected a matrix");
    };

    let production = ZoneVector::from_data(zones.clone(), vec![100.0, 50.0, 75.0]).unwrap();
    let attraction = ZoneVector::from_data(zones.clone(), vec![80.0, 90.0, 55.0]).unwrap();

    let balanced = balance(&production, &attraction, &friction, 300, 1e-9).unwrap();

    for row in 0..3 {
        let row_sum: f64 = balanced.row(row).iter().sum();
        assert!(
            (row_sum - production.value(row)).abs() < 1e-6,
            "row {row}: {row_sum}"
        );
    }
    for col in 0..3 {
        let col_sum: f64 = (0..3).map(|row| balanced.at(row, col)).sum();
        assert!(
            (col_sum - attraction.value(col)).abs() < 1e-6,
            "col {col}: {col_sum}"
        );
    }
}
