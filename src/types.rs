/// Valuation an agent assigns to a single item.
pub type Value = u64;
/// Agent identifier (row of a valuation matrix).
pub type Agent = usize;
/// Item identifier (column of a valuation matrix).
pub type Item = usize;
