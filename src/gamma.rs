use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::traits::Block;

/// Ordered sequence of calorimeter blocks attributed to one gamma
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GammaSequence<B> {
    id: i32,
    blocks: Vec<B>,
}

impl<B: Block> GammaSequence<B> {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn blocks(&self) -> &[B] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether both sequences contain the same blocks in the same order
    pub fn is_identical(&self, other: &Self) -> bool {
        self.blocks.len() == other.blocks.len() && self.blocks == other.blocks
    }
}

/// Gamma sequences of one event, indexed by their label
///
/// Blocks can only be appended while the dictionary is being filled;
/// a block that is already part of a sequence is not added again.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GammaDict<B> {
    gammas: BTreeMap<i32, GammaSequence<B>>,
}

impl<B> Default for GammaDict<B> {
    fn default() -> Self {
        Self {
            gammas: BTreeMap::new(),
        }
    }
}

impl<B: Block> GammaDict<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `block` to the sequence with the given label
    pub(crate) fn push(&mut self, label: i32, block: B) {
        let gamma = self.gammas.entry(label).or_insert_with(|| GammaSequence {
            id: label,
            blocks: Vec::new(),
        });
        if !gamma.blocks.contains(&block) {
            gamma.blocks.push(block);
        }
    }

    pub fn get(&self, label: i32) -> Option<&GammaSequence<B>> {
        self.gammas.get(&label)
    }

    /// Number of gamma sequences
    pub fn len(&self) -> usize {
        self.gammas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gammas.is_empty()
    }

    /// Iterate over the sequences in order of increasing label
    pub fn iter(&self) -> impl Iterator<Item = &GammaSequence<B>> {
        self.gammas.values()
    }

    /// Log all sequences at debug level
    pub(crate) fn log_debug(&self, title: &str) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        log::debug!("{title}:");
        for gamma in self.iter() {
            log::debug!(
                "Gamma #{}: {}",
                gamma.id(),
                gamma.blocks().iter().map(|b| format!("{b:?}")).join(" -> ")
            );
        }
    }
}

impl<B: Block> FromIterator<(i32, B)> for GammaDict<B> {
    fn from_iter<I: IntoIterator<Item = (i32, B)>>(iter: I) -> Self {
        let mut res = Self::new();
        for (label, block) in iter {
            res.push(label, block);
        }
        res
    }
}
