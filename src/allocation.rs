use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::*;

/// Assignment of bundles of items to agents.
///
/// Every item belongs to at most one bundle. Bundles are kept sorted and
/// agents are iterated in increasing order. An agent without an entry holds
/// the empty bundle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Allocation {
    bundles: BTreeMap<Agent, Vec<Item>>,
}

impl Allocation {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds an allocation, rejecting any item given to two agents.
    ///
    /// Repeated entries for the same agent are merged.
    pub fn from_bundles<I, B>(bundles: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Agent, B)>,
        B: IntoIterator<Item = Item>,
    {
        let mut owners = BTreeMap::new();
        let mut alloc = Self::empty();
        for (ag, bundle) in bundles {
            let entry = alloc.bundles.entry(ag).or_default();
            for it in bundle {
                if let Some(&first) = owners.get(&it) {
                    return Err(Error::DuplicateItem { item: it, first, second: ag });
                }
                owners.insert(it, ag);
                entry.push(it);
            }
            entry.sort_unstable();
        }
        Ok(alloc)
    }

    /// Inserts a bundle for an agent that has none yet. The caller guarantees
    /// that the items are sorted and not held by anyone else.
    pub(crate) fn insert_unchecked(&mut self, ag: Agent, bundle: Vec<Item>) {
        debug_assert!(bundle.is_sorted(), "Bundles are kept sorted.");
        debug_assert!(
            bundle.iter().all(|&it| self.owner_of(it).is_none()),
            "An item is already allocated."
        );
        self.bundles.insert(ag, bundle);
    }

    /// Items held by `ag`; empty for an agent without an entry.
    pub fn bundle(&self, ag: Agent) -> &[Item] {
        self.bundles.get(&ag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Agents with an entry, in increasing order.
    pub fn agents(&self) -> impl Iterator<Item = Agent> + '_ {
        self.bundles.keys().copied()
    }

    pub fn bundles(&self) -> impl Iterator<Item = (Agent, &[Item])> {
        self.bundles.iter().map(|(&ag, b)| (ag, b.as_slice()))
    }

    /// Total number of allocated items.
    pub fn item_count(&self) -> usize {
        self.bundles.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn owner_of(&self, it: Item) -> Option<Agent> {
        self.bundles
            .iter()
            .find(|(_, b)| b.binary_search(&it).is_ok())
            .map(|(&ag, _)| ag)
    }

    /// Items in `0..item_count` that no agent holds.
    pub fn unallocated(&self, item_count: usize) -> Vec<Item> {
        (0..item_count).filter(|&it| self.owner_of(it).is_none()).collect()
    }

    /// Renders the allocation with the labels of `valuations`.
    pub fn display<'a>(&'a self, valuations: &'a ValuationMatrix) -> NamedAllocation<'a> {
        NamedAllocation { allocation: self, valuations }
    }
}

/// Display adapter returned by [`Allocation::display`].
pub struct NamedAllocation<'a> {
    allocation: &'a Allocation,
    valuations: &'a ValuationMatrix,
}

impl fmt::Display for NamedAllocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ag, bundle) in self.allocation.bundles() {
            let names: Vec<&str> = bundle.iter().map(|&it| self.valuations.item_name(it)).collect();
            writeln!(
                f,
                "{}: [{}] (own value {})",
                self.valuations.agent_name(ag),
                names.join(", "),
                self.valuations.bundle_utility(ag, bundle)
            )?;
        }
        Ok(())
    }
}
