//! Match scoring.

use std::cmp::Ordering;

/// Score of a signature that accepted the arguments.
///
/// Fields compare left to right, higher wins. The derived ordering relies
/// on the field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchScore {
    pub specificity: u32,
    pub required_arity: usize,
    /// The argument count equals the number of validators.
    pub exact_arity: bool,
    /// Declaration position; the later declaration wins.
    pub id: usize,
}

impl MatchScore {
    /// The score without the declaration-order tie-break.
    pub fn rank(&self) -> (u32, usize, bool) {
        (self.specificity, self.required_arity, self.exact_arity)
    }

    /// Compare ignoring declaration order.
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}
