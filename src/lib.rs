mod allocation;
mod allocator;
mod envy;
mod error;
mod search;
mod types;
mod valuations;

pub use allocation::{Allocation, NamedAllocation};
pub use allocator::{AllocationConstraints, random_allocation};
pub use envy::{envied_by, envies, envy_pairs, has_envy, is_envy_free};
pub use error::{Error, Result};
pub use search::{SearchOutcome, SurveyReport, is_envy_freeness_possible, survey};
pub use types::*;
pub use valuations::{ValuationMatrix, ValuationParams};
