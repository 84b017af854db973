//! Error types for valuation generation and allocation.

use thiserror::Error;

use super::*;

/// Errors raised by the generators and allocation constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The valuation range is empty.
    #[error("invalid value range: max_value ({max}) must be greater than min_value ({min})")]
    InvalidValueRange { min: Value, max: Value },

    /// A row of valuations has the wrong number of items.
    #[error("row of agent {agent} has {found} values, expected {expected}")]
    RaggedRow { agent: Agent, expected: usize, found: usize },

    /// An item was placed in two bundles.
    #[error("item {item} is assigned to both agent {first} and agent {second}")]
    DuplicateItem { item: Item, first: Agent, second: Agent },

    /// No trial satisfied the allocation constraints.
    #[error("allocation constraints could not be satisfied after {attempts} attempts")]
    AllocationInfeasible { attempts: usize },
}

impl Error {
    /// Creates an infeasibility error for the given number of attempts.
    pub fn infeasible(attempts: usize) -> Self {
        Self::AllocationInfeasible { attempts }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
