use super::*;

/// Returns `true` if agent `ag` strictly prefers the bundle of `other` to its own.
pub fn envies(valuations: &ValuationMatrix, allocation: &Allocation, ag: Agent, other: Agent) -> bool {
    debug_assert!(ag < valuations.agent_count(), "Agent number out of range.");
    debug_assert!(other < valuations.agent_count(), "Agent number out of range.");
    if ag == other {
        return false;
    }
    let own = valuations.bundle_utility(ag, allocation.bundle(ag));
    valuations.bundle_utility(ag, allocation.bundle(other)) > own
}

/// Agents envied by `ag`.
pub fn envied_by<'a>(
    valuations: &'a ValuationMatrix,
    allocation: &'a Allocation,
    ag: Agent,
) -> impl Iterator<Item = Agent> + 'a {
    let own = valuations.bundle_utility(ag, allocation.bundle(ag));
    valuations
        .utility_vector(ag, allocation)
        .into_iter()
        .enumerate()
        .filter(move |&(_, ut)| ut > own)
        .map(|(other, _)| other)
}

/// All `(envious, envied)` pairs.
pub fn envy_pairs<'a>(
    valuations: &'a ValuationMatrix,
    allocation: &'a Allocation,
) -> impl Iterator<Item = (Agent, Agent)> + 'a {
    valuations
        .agents()
        .flat_map(move |ag| envied_by(valuations, allocation, ag).map(move |other| (ag, other)))
}

pub fn has_envy(valuations: &ValuationMatrix, allocation: &Allocation) -> bool {
    envy_pairs(valuations, allocation).next().is_some()
}

/// Returns `true` if every agent values its own bundle at least as much as any
/// other bundle. Agents missing from `allocation` hold the empty bundle.
pub fn is_envy_free(valuations: &ValuationMatrix, allocation: &Allocation) -> bool {
    valuations.agents().all(|ag| {
        let uts = valuations.utility_vector(ag, allocation);
        uts.iter().max().is_none_or(|&best| uts[ag] == best)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid::*;
    use std::sync::LazyLock;

    static OPPOSED: LazyLock<ValuationMatrix> = LazyLock::new(|| ValuationMatrix::from_grid(grid![[3, 1][1, 3]]));
    static ALIKE: LazyLock<ValuationMatrix> =
        LazyLock::new(|| ValuationMatrix::from_grid(grid![[2, 2, 4][1, 1, 5][0, 3, 3]]));

    fn alloc(bundles: &[&[Item]]) -> Allocation {
        Allocation::from_bundles(bundles.iter().enumerate().map(|(ag, b)| (ag, b.to_vec()))).unwrap()
    }

    #[test]
    fn test_opposed_preferences() {
        assert!(is_envy_free(&OPPOSED, &alloc(&[&[0], &[1]])));
        assert!(!is_envy_free(&OPPOSED, &alloc(&[&[1], &[0]])));
    }

    #[test]
    fn test_envy_pairs() {
        let swapped = alloc(&[&[1], &[0]]);
        assert_eq!(envy_pairs(&OPPOSED, &swapped).collect::<Vec<_>>(), [(0, 1), (1, 0)]);
        assert!(has_envy(&OPPOSED, &swapped));
        assert!(envies(&OPPOSED, &swapped, 0, 1));
        assert!(!envies(&OPPOSED, &swapped, 0, 0));
        assert_eq!(envy_pairs(&OPPOSED, &alloc(&[&[0], &[1]])).count(), 0);
    }

    #[test]
    fn test_ties_are_not_envy() {
        // Agent 0 values {0} and {1} equally.
        let a = alloc(&[&[0], &[1], &[2]]);
        assert!(!envies(&ALIKE, &a, 0, 1));
        assert!(envies(&ALIKE, &a, 0, 2));
        let a = alloc(&[&[0, 1], &[2], &[]]);
        assert!(!envies(&ALIKE, &a, 0, 1));
        assert!(!envies(&ALIKE, &a, 1, 0));
        assert!(envies(&ALIKE, &a, 2, 0));
        assert!(!is_envy_free(&ALIKE, &a));
    }

    #[test]
    fn test_tie_with_other_bundle_is_envy_free() {
        let m = ValuationMatrix::from_grid(grid![[2, 2][2, 2]]);
        assert!(is_envy_free(&m, &alloc(&[&[0], &[1]])));
    }

    #[test]
    fn test_missing_agents_hold_nothing() {
        assert!(is_envy_free(&OPPOSED, &Allocation::empty()));
        let only_first = Allocation::from_bundles([(0, vec![1])]).unwrap();
        assert_eq!(envied_by(&OPPOSED, &only_first, 1).collect::<Vec<_>>(), [0]);
        assert!(!is_envy_free(&OPPOSED, &only_first));
    }

    #[test]
    fn test_unallocated_items_are_ignored() {
        let a = Allocation::from_bundles([(0, vec![0]), (1, vec![])]).unwrap();
        assert!(!is_envy_free(&OPPOSED, &a));
        let m = ValuationMatrix::from_grid(grid![[1, 0, 9][0, 1, 9]]);
        assert!(is_envy_free(&m, &alloc(&[&[0], &[1]])));
    }

    #[test]
    fn test_agrees_with_has_envy() {
        for a in [alloc(&[&[0], &[1], &[2]]), alloc(&[&[2], &[0], &[1]]), alloc(&[&[1], &[2], &[0]])] {
            assert_eq!(is_envy_free(&ALIKE, &a), !has_envy(&ALIKE, &a));
        }
    }
}
