use rand::Rng;
use serde::Serialize;
use tracing::{debug, trace};

use super::*;

/// Result of [`is_envy_freeness_possible`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    /// First envy-free allocation found.
    pub example_allocation: Option<Allocation>,
    /// Zero-based index of the trial that produced it.
    pub match_sim_index: Option<usize>,
}

impl SearchOutcome {
    /// Returns `true` if an envy-free allocation was found.
    pub fn is_possible(&self) -> bool {
        self.example_allocation.is_some()
    }
}

/// Samples up to `n_simulations` random allocations and stops at the first
/// envy-free one.
///
/// A negative answer only means that no envy-free allocation was sampled.
pub fn is_envy_freeness_possible<R: Rng + ?Sized>(
    valuations: &ValuationMatrix,
    n_simulations: usize,
    constraints: &AllocationConstraints,
    rng: &mut R,
) -> Result<SearchOutcome> {
    for sim in 0..n_simulations {
        let alloc = random_allocation(valuations, constraints, rng)?;
        if is_envy_free(valuations, &alloc) {
            debug!(sim, "envy-free allocation found");
            return Ok(SearchOutcome {
                example_allocation: Some(alloc),
                match_sim_index: Some(sim),
            });
        }
        trace!(sim, items = alloc.item_count(), "allocation has envy");
    }
    debug!(n_simulations, "no envy-free allocation found");
    Ok(SearchOutcome::default())
}

/// Summary of [`survey`].
#[derive(Clone, Debug)]
pub struct SurveyReport {
    /// Matrices for which an envy-free allocation was found.
    pub possible: usize,
    pub total: usize,
    /// First matrix for which the search failed.
    pub counterexample: Option<ValuationMatrix>,
}

impl SurveyReport {
    pub fn impossible(&self) -> usize {
        self.total - self.possible
    }
}

/// Runs the search on `n_matrices` random valuation matrices.
pub fn survey<R: Rng + ?Sized>(
    params: &ValuationParams,
    n_matrices: usize,
    n_simulations: usize,
    constraints: &AllocationConstraints,
    rng: &mut R,
) -> Result<SurveyReport> {
    let mut report = SurveyReport { possible: 0, total: 0, counterexample: None };
    for _ in 0..n_matrices {
        let valuations = ValuationMatrix::random(params, rng)?;
        report.total += 1;
        if is_envy_freeness_possible(&valuations, n_simulations, constraints, rng)?.is_possible() {
            report.possible += 1;
        } else if report.counterexample.is_none() {
            report.counterexample = Some(valuations);
        }
    }
    debug!(possible = report.possible, total = report.total, "survey finished");
    Ok(report)
}
