//! Consensus aggregation of values contributed by independent executions.
//!
//! Each participating execution produces its own observation; a type that
//! implements [`ConsensusAggregate`] declares, field by field, how those
//! observations collapse into one canonical value.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::ConsensusError;

/// How observations of one field are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// Middle value after sorting. Tolerates a minority of outliers.
    Median,
    /// Every observation must be equal.
    Identical,
}

/// Deterministically combine observations into one value.
pub trait ConsensusAggregate: Sized {
    fn aggregate(observations: Vec<Self>) -> Result<Self, ConsensusError>;
}

/// Aggregate the observations of a single named field.
pub fn aggregate_field<T>(
    field: &str,
    strategy: AggregationStrategy,
    values: &[T],
) -> Result<T, ConsensusError>
where
    T: PartialOrd + Clone,
{
    match strategy {
        AggregationStrategy::Median => median(values),
        AggregationStrategy::Identical => identical(field, values),
    }
}

/// Upper median of `values`. Incomparable pairs (NaN) sort as equal.
pub fn median<T: PartialOrd + Clone>(values: &[T]) -> Result<T, ConsensusError> {
    if values.is_empty() {
        return Err(ConsensusError::NoObservations);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Ok(sorted[sorted.len() / 2].clone())
}

fn identical<T: PartialEq + Clone>(field: &str, values: &[T]) -> Result<T, ConsensusError> {
    let first = values.first().ok_or(ConsensusError::NoObservations)?;
    if values.iter().all(|v| v == first) {
        Ok(first.clone())
    } else {
        Err(ConsensusError::Disagreement {
            field: field.to_string(),
        })
    }
}
