use std::cmp::{max, min};

use rand::Rng;
use rand::seq::{SliceRandom, index};
use tracing::debug;

use super::*;

/// Constraints on randomly generated allocations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AllocationConstraints {
    /// Minimum bundle size for each agent.
    pub min_items: usize,
    /// Maximum bundle size for each agent; `None` means unbounded.
    pub max_items: Option<usize>,
    /// Only accept trials where every item is allocated.
    pub force_allocate_all: bool,
    /// Number of trials before giving up on `force_allocate_all`.
    pub max_attempts: usize,
}

impl Default for AllocationConstraints {
    fn default() -> Self {
        AllocationConstraints {
            min_items: 1,
            max_items: None,
            force_allocate_all: false,
            max_attempts: 10_000,
        }
    }
}

impl AllocationConstraints {
    pub fn min_items(mut self, min_items: usize) -> Self {
        self.min_items = min_items;
        self
    }

    pub fn max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn force_allocate_all(mut self, force: bool) -> Self {
        self.force_allocate_all = force;
        self
    }

    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Largest bundle an agent may draw. A cap below `min_items` is raised to it.
    fn effective_cap(&self, item_count: usize) -> usize {
        max(self.max_items.unwrap_or(item_count), self.min_items)
    }

    /// Returns `true` when the bundle caps cannot cover all items together.
    fn caps_too_small(&self, agent_count: usize, item_count: usize) -> bool {
        self.force_allocate_all && self.effective_cap(item_count).saturating_mul(agent_count) < item_count
    }
}

/// One pass over the agents in random order, each taking a random slice of
/// the items still available.
fn allocation_trial<R: Rng + ?Sized>(
    agent_count: usize,
    item_count: usize,
    constraints: &AllocationConstraints,
    rng: &mut R,
) -> Allocation {
    let mut order: Vec<Agent> = (0..agent_count).collect();
    order.shuffle(rng);
    let mut available: Vec<Item> = (0..item_count).collect();
    let mut alloc = Allocation::empty();
    for ag in order {
        let top = max(min(available.len(), constraints.effective_cap(item_count)), constraints.min_items);
        let count = min(rng.random_range(constraints.min_items..=top), available.len());
        let mut picked = index::sample(rng, available.len(), count).into_vec();
        // Remove from the back so the remaining positions stay valid.
        picked.sort_unstable_by(|a, b| b.cmp(a));
        let mut bundle: Vec<Item> = picked.into_iter().map(|pos| available.swap_remove(pos)).collect();
        bundle.sort_unstable();
        alloc.insert_unchecked(ag, bundle);
    }
    alloc
}

/// Draws a random allocation of the items of `valuations`.
///
/// Only the shape of the matrix is used. When `min_items > 0` and there are
/// fewer items than agents the empty allocation is returned. With
/// `force_allocate_all`, trials are repeated until every item is allocated,
/// at most `max_attempts` times.
pub fn random_allocation<R: Rng + ?Sized>(
    valuations: &ValuationMatrix,
    constraints: &AllocationConstraints,
    rng: &mut R,
) -> Result<Allocation> {
    let agent_count = valuations.agent_count();
    let item_count = valuations.item_count();
    if constraints.min_items > 0 && item_count < agent_count {
        return Ok(Allocation::empty());
    }
    if constraints.caps_too_small(agent_count, item_count) {
        debug!(max_items = ?constraints.max_items, agent_count, item_count, "bundle caps cannot cover all items");
        return Err(Error::infeasible(0));
    }
    for attempt in 0..constraints.max_attempts {
        let alloc = allocation_trial(agent_count, item_count, constraints, rng);
        if !constraints.force_allocate_all || alloc.item_count() >= item_count {
            if attempt > 0 {
                debug!(attempts = attempt + 1, "allocation accepted after retries");
            }
            return Ok(alloc);
        }
    }
    debug!(attempts = constraints.max_attempts, "giving up on full allocation");
    Err(Error::infeasible(constraints.max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;
    use std::sync::LazyLock;

    static MATRIX_3X5: LazyLock<ValuationMatrix> =
        LazyLock::new(|| ValuationMatrix::from_grid(Grid::<Value>::new(3, 5)));
    static MATRIX_4X2: LazyLock<ValuationMatrix> =
        LazyLock::new(|| ValuationMatrix::from_grid(grid![[1, 2][3, 4][5, 6][7, 8]]));

    fn check_disjoint(alloc: &Allocation) {
        let mut seen = HashSet::new();
        for (_, bundle) in alloc.bundles() {
            assert!(bundle.is_sorted());
            for &it in bundle {
                assert!(seen.insert(it), "item {it} allocated twice");
            }
        }
    }

    #[test]
    fn test_fewer_items_than_agents() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let c = AllocationConstraints::default();
        assert_eq!(random_allocation(&MATRIX_4X2, &c, &mut rng), Ok(Allocation::empty()));
        let alloc = random_allocation(&MATRIX_4X2, &c.min_items(0), &mut rng).unwrap();
        assert_eq!(alloc.agents().count(), 4);
        check_disjoint(&alloc);
    }

    #[test]
    fn test_bundle_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let c = AllocationConstraints::default().max_items(Some(2));
        for _ in 0..200 {
            let alloc = random_allocation(&MATRIX_3X5, &c, &mut rng).unwrap();
            check_disjoint(&alloc);
            assert_eq!(alloc.agents().collect::<Vec<_>>(), [0, 1, 2]);
            for (_, bundle) in alloc.bundles() {
                assert!((1..=2).contains(&bundle.len()));
            }
        }
    }

    #[test]
    fn test_min_items_clamped_to_available() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let c = AllocationConstraints::default().min_items(2);
        for _ in 0..100 {
            let alloc = random_allocation(&MATRIX_3X5, &c, &mut rng).unwrap();
            check_disjoint(&alloc);
            assert!(alloc.item_count() <= 5);
            assert_eq!(alloc.agents().count(), 3);
        }
    }

    #[test]
    fn test_force_allocate_all() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let c = AllocationConstraints::default().max_items(Some(2)).force_allocate_all(true);
        for _ in 0..50 {
            let alloc = random_allocation(&MATRIX_3X5, &c, &mut rng).unwrap();
            check_disjoint(&alloc);
            assert_eq!(alloc.item_count(), 5);
            assert!(alloc.unallocated(5).is_empty());
        }
    }

    #[test]
    fn test_min_items_above_max_items() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let c = AllocationConstraints::default().min_items(2).max_items(Some(1));
        for _ in 0..100 {
            let alloc = random_allocation(&MATRIX_3X5, &c, &mut rng).unwrap();
            check_disjoint(&alloc);
            // Every agent asks for two items; whoever comes last gets the one left.
            let mut sizes: Vec<usize> = alloc.bundles().map(|(_, b)| b.len()).collect();
            sizes.sort_unstable();
            assert_eq!(sizes, [1, 2, 2]);
        }
    }

    #[test]
    fn test_force_allocate_all_with_min_items_above_max_items() {
        let m = ValuationMatrix::from_grid(Grid::<Value>::new(2, 4));
        let mut rng = ChaCha8Rng::seed_from_u64(25);
        let c = AllocationConstraints::default()
            .min_items(2)
            .max_items(Some(1))
            .force_allocate_all(true);
        let alloc = random_allocation(&m, &c, &mut rng).unwrap();
        assert_eq!(alloc.item_count(), 4);
        assert_eq!(alloc.bundle(0).len(), 2);
        assert_eq!(alloc.bundle(1).len(), 2);
    }

    #[test]
    fn test_force_allocate_all_infeasible_caps() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let c = AllocationConstraints::default().max_items(Some(1)).force_allocate_all(true);
        assert_eq!(random_allocation(&MATRIX_3X5, &c, &mut rng), Err(Error::infeasible(0)));
    }

    #[test]
    fn test_force_allocate_all_exhausts_attempts() {
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        // No trials allowed, so nothing can be accepted.
        let c = AllocationConstraints::default()
            .min_items(0)
            .max_items(Some(2))
            .force_allocate_all(true)
            .max_attempts(0);
        assert_eq!(random_allocation(&MATRIX_3X5, &c, &mut rng), Err(Error::infeasible(0)));
    }

    #[test]
    fn test_deterministic_with_seed() {
        let c = AllocationConstraints::default();
        let a1 = random_allocation(&MATRIX_3X5, &c, &mut ChaCha8Rng::seed_from_u64(23)).unwrap();
        let a2 = random_allocation(&MATRIX_3X5, &c, &mut ChaCha8Rng::seed_from_u64(23)).unwrap();
        assert_eq!(a1, a2);
    }
}
