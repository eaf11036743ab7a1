use crate::simd::kernels;
use thiserror::Error;
use tripflow_model::{OdMatrix, ZoneIndex, ZoneVector};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GravityError {
    #[error("production, attraction, and friction must share one zone system")]
    ZoneSystemMismatch,
}

/// Doubly-constrained gravity-model balancing.
///
/// Starting from per-origin `production` totals, per-destination
/// `attraction` totals, and a square `friction` weight matrix — all over the
/// identical zone system — iteratively scales friction rows so that row sums
/// match production while a per-destination balancing factor
/// (`attraction_star`) pulls column sums toward attraction.
///
/// Each sweep:
/// - Every origin row with positive production gets the normalization factor
///   `production[r] / dot3(friction[r], attraction, attraction_star)`;
///   a non-finite factor (degenerate row) is clamped to 0 so the row
///   contributes nothing. Rows are processed in parallel; each worker
///   accumulates a private column-total buffer and the partial totals are
///   merged single-threaded afterwards.
/// - Column totals yield per-destination correction ratios
///   `attraction[j] / total[j]`; `attraction_star` is scaled by them and any
///   non-finite factor is sanitized back to 1.0.
/// - The sweep converges when every ratio lies within `max_error` of 1.0.
///
/// The loop preserves the reference semantics `do { .. } while (!converged
/// && iteration++ < max_iterations)`: at least one full sweep always runs,
/// and one extra sweep runs when convergence and the cap are reached
/// simultaneously.
///
/// Lane-parallel `dot3` accumulation and worker scheduling reassociate
/// floating-point sums, so bit-exact reproducibility across runs is
/// best-effort, not guaranteed.
pub fn balance(
    production: &ZoneVector,
    attraction: &ZoneVector,
    friction: &OdMatrix,
    max_iterations: usize,
    max_error: f64,
) -> Result<OdMatrix, GravityError> {
    let zones = production.zones();
    if !production.same_zones(attraction)
        || !ZoneIndex::same(friction.rows(), zones)
        || !ZoneIndex::same(friction.cols(), zones)
    {
        return Err(GravityError::ZoneSystemMismatch);
    }

    let n = zones.len();
    let mut out = OdMatrix::square(zones.clone());
    let mut star = vec![1.0f64; n];
    let mut ratio = vec![0.0f64; n];

    let mut iteration = 0usize;
    loop {
        let totals = balance_rows(production, attraction, friction, &star, &mut out);

        kernels::div_f64(&mut ratio, attraction.data(), &totals);
        kernels::mul_assign_f64(&mut star, &ratio);
        kernels::replace_nonfinite_f64(&mut star, 1.0);

        let converged = kernels::all_within_f64(&ratio, 1.0, max_error);
        let below_cap = iteration < max_iterations;
        iteration += 1;
        if converged || !below_cap {
            break;
        }
    }

    Ok(out)
}

/// One row sweep: writes every row of `out` and returns the column totals.
fn balance_rows(
    production: &ZoneVector,
    attraction: &ZoneVector,
    friction: &OdMatrix,
    star: &[f64],
    out: &mut OdMatrix,
) -> Vec<f64> {
    let n = star.len();
    let production = production.data();
    let attraction = attraction.data();
    let friction = friction.data();
    let out_data = out.data_mut();

    let balance_row = |row: usize, out_row: &mut [f64]| {
        let p = production[row];
        if p > 0.0 {
            let friction_row = &friction[row * n..(row + 1) * n];
            let denom = kernels::dot3_f64(friction_row, attraction, star);
            let mut factor = p / denom;
            // A degenerate row (zero or non-finite denominator) contributes
            // nothing rather than corrupting the matrix.
            if !factor.is_finite() {
                factor = 0.0;
            }
            kernels::scale_product3_f64(out_row, friction_row, attraction, star, factor);
        } else {
            out_row.fill(0.0);
        }
    };

    #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
    if let Some(pool) = crate::parallel::rayon_pool() {
        use rayon::prelude::*;

        let partials: Vec<Vec<f64>> = pool.install(|| {
            out_data
                .par_chunks_mut(n.max(1))
                .enumerate()
                .fold(
                    || vec![0.0f64; n],
                    |mut totals, (row, out_row)| {
                        balance_row(row, out_row);
                        kernels::accumulate_f64(&mut totals, out_row);
                        totals
                    },
                )
                .collect()
        });

        let mut totals = vec![0.0f64; n];
        for partial in &partials {
            kernels::accumulate_f64(&mut totals, partial);
        }
        return totals;
    }

    let mut totals = vec![0.0f64; n];
    for (row, out_row) in out_data.chunks_mut(n.max(1)).enumerate() {
        balance_row(row, out_row);
        kernels::accumulate_f64(&mut totals, out_row);
    }
    totals
}
