use log::debug;
use serde::{Deserialize, Serialize};

use crate::{gamma::GammaDict, traits::Block};

/// Outcome of comparing candidate gamma sequences with the truth
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Comparison {
    /// Number of candidates identical to some true sequence
    pub matched: usize,
    /// Number of candidate sequences
    pub ncandidates: usize,
    /// Number of true sequences
    pub ntruth: usize,
}

impl Comparison {
    /// Whether there is neither a candidate nor a true gamma
    pub fn is_empty(&self) -> bool {
        self.ncandidates == 0 && self.ntruth == 0
    }

    /// Whether all of the (at least one) true gammas were matched
    pub fn fully_matched(&self) -> bool {
        self.ntruth > 0 && self.matched == self.ntruth
    }
}

/// Count the candidate sequences that are identical to a true sequence
///
/// Each candidate is compared to the true sequences in label order
/// and counts as matched at the first identical one. A true sequence
/// can be matched by several candidates, in which case it is counted
/// several times.
pub fn compare<B: Block>(candidates: &GammaDict<B>, truth: &GammaDict<B>) -> Comparison {
    let mut matched = 0;
    for candidate in candidates.iter() {
        let found = truth.iter().find(|t| t.is_identical(candidate));
        if let Some(t) = found {
            debug!(
                "Gamma #{} is identical to true gamma #{}",
                candidate.id(),
                t.id()
            );
            matched += 1;
        }
    }
    Comparison {
        matched,
        ncandidates: candidates.len(),
        ntruth: truth.len(),
    }
}
