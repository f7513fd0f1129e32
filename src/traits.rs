use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of a calorimeter block
///
/// Anything that is cheap to copy, totally ordered and hashable can
/// serve as a block identifier.
pub trait Block: Copy + Ord + Hash + Debug {}

impl<T: Copy + Ord + Hash + Debug> Block for T {}

/// Neighbour lookup for one (or several) detector regions
pub trait Locate<B> {
    /// Whether the block with the given id belongs to this locator
    fn owns_block(&self, block: &B) -> bool;

    /// The geometrical neighbours of the given block
    ///
    /// Only meaningful if [owns_block](Locate::owns_block) returns `true`.
    fn neighbours(&self, block: &B) -> Vec<B>;
}

impl<B, L: Locate<B> + ?Sized> Locate<B> for &L {
    fn owns_block(&self, block: &B) -> bool {
        (**self).owns_block(block)
    }

    fn neighbours(&self, block: &B) -> Vec<B> {
        (**self).neighbours(block)
    }
}

impl<B, L: Locate<B> + ?Sized> Locate<B> for Box<L> {
    fn owns_block(&self, block: &B) -> bool {
        (**self).owns_block(block)
    }

    fn neighbours(&self, block: &B) -> Vec<B> {
        (**self).neighbours(block)
    }
}

/// Progress indicator
pub trait Progress {
    /// Advance by `i` steps
    fn inc(&self, i: u64);
    /// Mark as finished
    fn finish(&self);
}
