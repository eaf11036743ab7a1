use super::*;
use tripflow_model::{OdMatrix, ZoneIndex, ZoneVector};

fn two_zone_inputs() -> (ZoneVector, ZoneVector, OdMatrix) {
    let zones = ZoneIndex::shared(vec![1, 2]).unwrap();
    let production = ZoneVector::from_data(zones.clone(), vec![2.0, 2.0]).unwrap();
    let attraction = ZoneVector::from_data(zones.clone(), vec![1.5, 2.5]).unwrap();
    let friction =
        OdMatrix::from_data(zones.clone(), zones, vec![0.25, 0.75, 2.0, 2.0]).unwrap();
    (production, attraction, friction)
}

#[test]
fn two_zone_system_converges_to_the_balanced_matrix() {
    let (production, attraction, friction) = two_zone_inputs();
    let balanced = balance(&production, &attraction, &friction, 100, 0.25).unwrap();

    let expected = [0.5, 1.5, 1.0, 1.0];
    for (i, &e) in expected.iter().enumerate() {
        assert!(
            (balanced.data()[i] - e).abs() <= 0.25,
            "entry {i}: {} vs {e}",
            balanced.data()[i]
        );
    }
}

#[test]
fn tight_tolerance_meets_both_constraints() {
    let (production, attraction, friction) = two_zone_inputs();
    let balanced = balance(&production, &attraction, &friction, 500, 1e-9).unwrap();

    for row in 0..2 {
        let row_sum: f64 = balanced.row(row).iter().sum();
        assert!(
            (row_sum - production.value(row)).abs() < 1e-6,
            "row {row} sum {row_sum}"
        );
    }
    for col in 0..2 {
        let col_sum = balanced.at(0, col) + balanced.at(1, col);
        assert!(
            (col_sum - attraction.value(col)).abs() < 1e-6,
            "col {col} sum {col_sum}"
        );
    }
}

#[test]
fn larger_system_balances_with_parallel_rows() {
    let ids: Vec<u32> = (0..37).map(|i| i * 3 + 5).collect();
    let zones = ZoneIndex::shared(ids).unwrap();
    let n = zones.len();

    let production =
        ZoneVector::from_data(zones.clone(), (0..n).map(|i| 10.0 + i as f64).collect()).unwrap();
    let total_production: f64 = production.data().iter().sum();
    // Attraction totals must match production totals for a doubly
    // constrained problem to be feasible.
    let mut attraction_data: Vec<f64> = (0..n).map(|i| 5.0 + ((i * 7) % 13) as f64).collect();
    let attraction_sum: f64 = attraction_data.iter().sum();
    for a in &mut attraction_data {
        *a *= total_production / attraction_sum;
    }
    let attraction = ZoneVector::from_data(zones.clone(), attraction_data).unwrap();

    let friction_data: Vec<f64> = (0..n * n)
        .map(|i| 0.1 + ((i * 11) % 17) as f64 / 4.0)
        .collect();
    let friction = OdMatrix::from_data(zones.clone(), zones, friction_data).unwrap();

    let balanced = balance(&production, &attraction, &friction, 1000, 1e-10).unwrap();

    for row in 0..n {
        let row_sum: f64 = balanced.row(row).iter().sum();
        assert!(
            (row_sum - production.value(row)).abs() < 1e-6,
            "row {row}: {row_sum} vs {}",
            production.value(row)
        );
    }
    for col in 0..n {
        let col_sum: f64 = (0..n).map(|row| balanced.at(row, col)).sum();
        assert!(
            (col_sum - attraction.value(col)).abs() < 1e-6,
            "col {col}: {col_sum} vs {}",
            attraction.value(col)
        );
    }
}

#[test]
fn zero_production_rows_stay_zero() {
    let zones = ZoneIndex::shared(vec![1, 2, 3]).unwrap();
    let production = ZoneVector::from_data(zones.clone(), vec![4.0, 0.0, 4.0]).unwrap();
    let attraction = ZoneVector::from_data(zones.clone(), vec![3.0, 2.0, 3.0]).unwrap();
    let friction = OdMatrix::from_data(zones.clone(), zones, vec![1.0; 9]).unwrap();

    let balanced = balance(&production, &attraction, &friction, 50, 1e-6).unwrap();
    assert_eq!(balanced.row(1), &[0.0, 0.0, 0.0]);
    let row_sum: f64 = balanced.row(0).iter().sum();
    assert!((row_sum - 4.0).abs() < 1e-6);
}

#[test]
fn degenerate_friction_produces_zeros_not_nan() {
    let zones = ZoneIndex::shared(vec![1, 2]).unwrap();
    let production = ZoneVector::from_data(zones.clone(), vec![1.0, 1.0]).unwrap();
    let attraction = ZoneVector::from_data(zones.clone(), vec![1.0, 1.0]).unwrap();
    let friction = OdMatrix::square(zones);

    let balanced = balance(&production, &attraction, &friction, 5, 0.01).unwrap();
    assert!(balanced.data().iter().all(|&v| v == 0.0));
}

#[test]
fn always_runs_at_least_one_sweep() {
    let (production, attraction, friction) = two_zone_inputs();
    // A cap of 0 still runs the mandatory first sweep, which row-normalizes
    // against the initial unit balancing factors.
    let balanced = balance(&production, &attraction, &friction, 0, 1e-12).unwrap();
    for row in 0..2 {
        let row_sum: f64 = balanced.row(row).iter().sum();
        assert!(
            (row_sum - production.value(row)).abs() < 1e-12,
            "row {row} sum {row_sum}"
        );
    }
}

#[test]
fn rejects_operands_over_different_zone_systems() {
    let (production, attraction, friction) = two_zone_inputs();
    let other = ZoneIndex::shared(vec![1, 2]).unwrap();

    let foreign_production = ZoneVector::from_data(other.clone(), vec![2.0, 2.0]).unwrap();
    assert_eq!(
        balance(&foreign_production, &attraction, &friction, 10, 0.1).unwrap_err(),
        GravityError::ZoneSystemMismatch
    );

    let foreign_friction = OdMatrix::square(other);
    assert_eq!(
        balance(&production, &attraction, &foreign_friction, 10, 0.1).unwrap_err(),
        GravityError::ZoneSystemMismatch
    );
}

#[test]
fn empty_zone_system_returns_an_empty_matrix() {
    let zones = ZoneIndex::shared(vec![]).unwrap();
    let production = ZoneVector::zeros(zones.clone());
    let attraction = ZoneVector::zeros(zones.clone());
    let friction = OdMatrix::square(zones);
    let balanced = balance(&production, &attraction, &friction, 10, 0.1).unwrap();
    assert!(balanced.data().is_empty());
}
