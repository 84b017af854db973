use std::fmt;
use std::ops::Index;

use grid::*;
use rand::Rng;
use rand::seq::index;
use tracing::warn;

use super::*;

/// Parameters for [`ValuationMatrix::random`].
#[derive(Clone, Debug, PartialEq)]
pub struct ValuationParams {
    pub n_agents: usize,
    pub n_items: usize,
    pub min_value: Value,
    pub max_value: Value,
    /// Allow the same value to appear twice in an agent's row.
    pub allow_item_equality: bool,
    pub agent_names: Option<Vec<String>>,
    pub item_names: Option<Vec<String>>,
}

impl ValuationParams {
    pub fn new(n_agents: usize, n_items: usize, max_value: Value) -> Self {
        ValuationParams {
            n_agents,
            n_items,
            min_value: 0,
            max_value,
            allow_item_equality: true,
            agent_names: None,
            item_names: None,
        }
    }

    pub fn min_value(mut self, min_value: Value) -> Self {
        self.min_value = min_value;
        self
    }

    pub fn allow_item_equality(mut self, allow: bool) -> Self {
        self.allow_item_equality = allow;
        self
    }

    pub fn agent_names(mut self, names: Vec<String>) -> Self {
        self.agent_names = Some(names);
        self
    }

    pub fn item_names(mut self, names: Vec<String>) -> Self {
        self.item_names = Some(names);
        self
    }

    /// Returns `true` when rows are drawn with replacement from `[min_value, max_value)`.
    ///
    /// This happens either on request or when the range is too narrow to give
    /// every item of a row its own value.
    pub fn draws_with_repeats(&self) -> bool {
        let too_narrow = self.n_items as Value + 1 >= self.max_value.saturating_sub(self.min_value);
        self.allow_item_equality || too_narrow
    }
}

/// Additive valuations of agents (rows) over items (columns).
#[derive(Clone, Debug, PartialEq)]
pub struct ValuationMatrix {
    values: Grid<Value>,
    // `Grid` collapses to 0×0 when either side is empty, so the shape is kept here.
    n_agents: usize,
    n_items: usize,
    agent_names: Vec<String>,
    item_names: Vec<String>,
}

/// Keeps `supplied` only if it has exactly `expected` entries, otherwise falls
/// back to positional labels.
fn resolve_names(supplied: Option<Vec<String>>, expected: usize, prefix: &str) -> Vec<String> {
    match supplied {
        Some(names) if names.len() == expected => names,
        Some(names) => {
            warn!(
                supplied = names.len(),
                expected, "ignoring {prefix} names with mismatched length"
            );
            default_names(expected, prefix)
        }
        None => default_names(expected, prefix),
    }
}

fn default_names(count: usize, prefix: &str) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}_{i}")).collect()
}

/// Draws `amount` distinct values from `[min, max]`.
fn sample_distinct<R: Rng + ?Sized>(rng: &mut R, min: Value, max: Value, amount: usize) -> Vec<Value> {
    match (max - min).checked_add(1).and_then(|span| usize::try_from(span).ok()) {
        Some(span) => index::sample(rng, span, amount)
            .into_iter()
            .map(|offset| min + offset as Value)
            .collect(),
        None => {
            // The range is wider than `usize`, so collisions are rare and
            // rejection terminates quickly.
            let mut drawn = Vec::with_capacity(amount);
            while drawn.len() < amount {
                let v = rng.random_range(min..=max);
                if !drawn.contains(&v) {
                    drawn.push(v);
                }
            }
            drawn
        }
    }
}

impl ValuationMatrix {
    fn new(values: Grid<Value>, n_agents: usize, n_items: usize) -> Self {
        ValuationMatrix {
            values,
            n_agents,
            n_items,
            agent_names: default_names(n_agents, "agent"),
            item_names: default_names(n_items, "item"),
        }
    }

    /// Builds a matrix from a grid with one row per agent and one column per item.
    ///
    /// A grid cannot hold rows without columns; use [`Self::from_rows`] for
    /// agents over zero items.
    pub fn from_grid(values: Grid<Value>) -> Self {
        let (rows, cols) = values.size();
        Self::new(values, rows, cols)
    }

    /// Builds a matrix from one row of valuations per agent.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Result<Self> {
        let n_agents = rows.len();
        let n_items = rows.first().map_or(0, Vec::len);
        let mut values = Grid::<Value>::new(n_agents, n_items);
        for (ag, row) in rows.into_iter().enumerate() {
            if row.len() != n_items {
                return Err(Error::RaggedRow { agent: ag, expected: n_items, found: row.len() });
            }
            for (it, v) in row.into_iter().enumerate() {
                values[(ag, it)] = v;
            }
        }
        Ok(Self::new(values, n_agents, n_items))
    }

    /// Attaches labels. A list whose length does not match the matrix is ignored.
    pub fn with_names(mut self, agent_names: Option<Vec<String>>, item_names: Option<Vec<String>>) -> Self {
        self.agent_names = resolve_names(agent_names, self.agent_count(), "agent");
        self.item_names = resolve_names(item_names, self.item_count(), "item");
        self
    }

    /// Draws a random matrix.
    pub fn random<R: Rng + ?Sized>(params: &ValuationParams, rng: &mut R) -> Result<Self> {
        let (min, max) = (params.min_value, params.max_value);
        if max <= min {
            return Err(Error::InvalidValueRange { min, max });
        }
        let mut values = Grid::<Value>::new(params.n_agents, params.n_items);
        if params.draws_with_repeats() {
            for ag in 0..params.n_agents {
                for it in 0..params.n_items {
                    values[(ag, it)] = rng.random_range(min..max);
                }
            }
        } else {
            // Inclusive upper bound here, unlike the branch above.
            for ag in 0..params.n_agents {
                for (it, v) in sample_distinct(rng, min, max, params.n_items).into_iter().enumerate() {
                    values[(ag, it)] = v;
                }
            }
        }
        Ok(Self::new(values, params.n_agents, params.n_items)
            .with_names(params.agent_names.clone(), params.item_names.clone()))
    }

    pub fn values(&self) -> &Grid<Value> {
        &self.values
    }

    pub fn agent_count(&self) -> usize {
        self.n_agents
    }

    pub fn item_count(&self) -> usize {
        self.n_items
    }

    pub fn agents(&self) -> impl Iterator<Item = Agent> {
        0..self.agent_count()
    }

    pub fn items(&self) -> impl Iterator<Item = Item> {
        0..self.item_count()
    }

    pub fn agent_name(&self, ag: Agent) -> &str {
        &self.agent_names[ag]
    }

    pub fn item_name(&self, it: Item) -> &str {
        &self.item_names[it]
    }

    /// Valuations of a single agent, in item order.
    pub fn row(&self, ag: Agent) -> impl Iterator<Item = &Value> {
        debug_assert!(ag < self.agent_count(), "Agent number out of range.");
        (0..self.n_items).map(move |it| &self.values[(ag, it)])
    }

    /// Value of `bundle` for agent `ag`.
    pub fn bundle_utility(&self, ag: Agent, bundle: &[Item]) -> Value {
        bundle.iter().map(|&it| self[(ag, it)]).sum()
    }

    /// Value for agent `ag` of every agent's bundle, in agent order.
    pub fn utility_vector(&self, ag: Agent, allocation: &Allocation) -> Vec<Value> {
        self.agents()
            .map(|owner| self.bundle_utility(ag, allocation.bundle(owner)))
            .collect()
    }
}

impl Index<(Agent, Item)> for ValuationMatrix {
    type Output = Value;

    fn index(&self, index: (Agent, Item)) -> &Self::Output {
        &self.values[index]
    }
}

impl fmt::Display for ValuationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.agent_names.iter().map(String::len).max().unwrap_or(0);
        write!(f, "{:label_width$}", "")?;
        for name in &self.item_names {
            write!(f, " {name:>width$}", width = name.len().max(3))?;
        }
        writeln!(f)?;
        for ag in self.agents() {
            write!(f, "{:label_width$}", self.agent_name(ag))?;
            for (it, v) in self.row(ag).enumerate() {
                write!(f, " {v:>width$}", width = self.item_names[it].len().max(3))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
