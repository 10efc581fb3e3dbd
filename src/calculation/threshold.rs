//! Cumulative threshold splitting.
//!
//! Both overtime engines walk a group of records while keeping a running
//! total, and split each record's hours into the part that still fits under
//! a cap and the part that spills over. This module provides that split.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The result of splitting hours against a cumulative threshold.
///
/// `within + excess` always equals the hours that were split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdSplit {
    /// Hours that fit under the threshold.
    pub within: Decimal,
    /// Hours beyond the threshold.
    pub excess: Decimal,
}

/// Splits `hours` given that `accumulated` hours already count toward
/// `threshold` in the current scope.
///
/// The remaining capacity is `threshold - accumulated`, never below zero.
/// Once a scope is already over its threshold every further hour is excess.
///
/// # Examples
///
/// ## Under the threshold
///
/// ```
/// use overtime_ledger::calculation::split_at_threshold;
/// use rust_decimal::Decimal;
///
/// let split = split_at_threshold(Decimal::from(2), Decimal::from(6), Decimal::from(8));
/// assert_eq!(split.within, Decimal::from(6));
/// assert_eq!(split.excess, Decimal::ZERO);
/// ```
///
/// ## Crossing the threshold
///
/// ```
/// use overtime_ledger::calculation::split_at_threshold;
/// use rust_decimal::Decimal;
///
/// let split = split_at_threshold(Decimal::from(6), Decimal::from(4), Decimal::from(8));
/// assert_eq!(split.within, Decimal::from(2));
/// assert_eq!(split.excess, Decimal::from(2));
/// ```
///
/// ## Already past the threshold
///
/// ```
/// use overtime_ledger::calculation::split_at_threshold;
/// use rust_decimal::Decimal;
///
/// let split = split_at_threshold(Decimal::from(42), Decimal::from(5), Decimal::from(40));
/// assert_eq!(split.within, Decimal::ZERO);
/// assert_eq!(split.excess, Decimal::from(5));
/// ```
pub fn split_at_threshold(
    accumulated: Decimal,
    hours: Decimal,
    threshold: Decimal,
) -> ThresholdSplit {
    let capacity = (threshold - accumulated).max(Decimal::ZERO);

    if hours <= capacity {
        ThresholdSplit {
            within: hours,
            excess: Decimal::ZERO,
        }
    } else {
        ThresholdSplit {
            within: capacity,
            excess: hours - capacity,
        }
    }
}

/// Checks that reallocation neither created nor destroyed hours in a scope.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] naming the scope when the
/// totals differ.
pub fn verify_conservation(scope: &str, original: Decimal, computed: Decimal) -> EngineResult<()> {
    if original == computed {
        Ok(())
    } else {
        Err(EngineError::CalculationError {
            message: format!(
                "hours not conserved for {}: {} in, {} out",
                scope, original, computed
            ),
        })
    }
}
