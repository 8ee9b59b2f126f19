//! A skipmap is an ordered key-value map in which entries can be efficiently
//! accessed, inserted and removed, all in `$O(\log(n))$` on average.
//!
//! Conceptually, the skiplist underlying the map resembles something like:
//!
//! ```text
//! <head> ----------> [2] --------------------------------------------------> [9] ---------->
//! <head> ----------> [2] ------------------------------------[7] ----------> [9] ---------->
//! <head> ----------> [2] ----------> [4] ------------------> [7] ----------> [9] --> [10] ->
//! <head> --> [1] --> [2] --> [3] --> [4] --> [5] --> [6] --> [7] --> [8] --> [9] --> [10] ->
//! ```
//!
//! where each node `[x]` has references to nodes further down the list,
//! allowing a search to effectively skip ahead. The lowest level contains every
//! entry, and the height of each node is drawn at random when it is inserted
//! (see [`level_generator`]). By default the random number generator is seeded
//! with a constant so that the shape of a map only depends on the sequence of
//! operations applied to it.
//!
//! Keys are unique: inserting a key which is already present fails with
//! [`SkipMapError::DuplicateKey`] and leaves the map untouched.
//!
//! # Examples
//!
//! ```
//! use skipmap::SkipMap;
//!
//! let mut skipmap = SkipMap::new();
//! skipmap.insert(3, "three")?;
//! skipmap.insert(1, "one")?;
//! skipmap.insert(2, "two")?;
//!
//! assert_eq!(skipmap.get(&2), Some(&"two"));
//! assert_eq!(skipmap.remove(&1), Some("one"));
//! assert_eq!(skipmap.keys().copied().collect::<Vec<_>>(), [2, 3]);
//! # Ok::<(), skipmap::SkipMapError>(())
//! ```
//!
//! A map can also be ordered by a custom function, which **must** be
//! well-behaved. Specifically, given some ordering function `f(a, b)`, it must
//! satisfy the following properties:
//!
//! - Be well defined: `f(a, b)` should always return the same value
//! - Be anti-symmetric: `f(a, b) == Greater` if and only if `f(b, a) == Less`,
//!   and `f(a, b) == Equal == f(b, a)`.
//! - Be transitive: If `f(a, b) == Greater` and `f(b, c) == Greater` then
//!   `f(a, c) == Greater`.
//!
//! **Failure to satisfy these properties can result in entries being
//! unreachable or out of order.**

mod error;
pub mod level_generator;
mod skipmap;
mod skipnode;

pub use crate::{
    error::SkipMapError,
    skipmap::{IntoIter, Iter, Keys, Options, SkipMap, Values},
};
