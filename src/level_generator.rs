//! Skiplists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level `$n > 0$` will contain a random subset of the nodes on level `$n - 1$`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level `$n$` is `$p$` times the chance of occupying level
//! `$n-1$` (with `$0 < p < 1$`).
//!
//! A node drawn at level `$n$` has a *height* of `$n + 1$`: it owns one
//! forward link for each of the levels `$0, \dots, n$`.

pub mod geometric;

pub use geometric::{
    DEFAULT_PROBABILITY, DEFAULT_SEED, Geometric, GeometricError, LEVEL_LIMIT, MAX_LEVEL,
};

/// Upon the insertion of a new node in the map, the node is replicated to
/// higher levels with a certain probability as determined by a
/// [`LevelGenerator`].
pub trait LevelGenerator {
    /// The total number of levels that are assumed to exist.
    ///
    /// This is also the length of the sentinel's forward array.
    #[must_use]
    fn total(&self) -> usize;

    /// Generate a random level for a new node in the range `[0, total)`.
    ///
    /// This function should _never_ return a level greater or equal to
    /// [`total`][LevelGenerator::total].
    #[must_use]
    fn level(&mut self) -> usize;

    /// Generate the height of a new node, in the range `[1, total]`.
    #[must_use]
    #[inline]
    fn height(&mut self) -> usize {
        self.level() + 1
    }
}
