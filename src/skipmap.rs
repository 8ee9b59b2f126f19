//! SkipMap stores key-value pairs, with the keys being unique and always
//! sorted.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
};

use slab::Slab;
use tracing::{debug, trace};

use crate::{
    error::SkipMapError,
    level_generator::{
        DEFAULT_PROBABILITY, DEFAULT_SEED, Geometric, GeometricError, LevelGenerator, MAX_LEVEL,
    },
    skipnode::{Link, Seek, SkipNode, step_next},
};

type Compare<K> = Box<dyn Fn(&K, &K) -> Ordering>;

// ////////////////////////////////////////////////////////////////////////////
// Options
// ////////////////////////////////////////////////////////////////////////////

/// Options controlling the shape of a [`SkipMap`].
///
/// # Examples
///
/// ```
/// use skipmap::{Options, SkipMap};
///
/// let options = Options {
///     probability: 0.25,
///     ..Options::default()
/// };
/// let mut skipmap: SkipMap<u32, &str> = SkipMap::with_options(options)?;
/// skipmap.insert(1, "Hello")?;
/// # Ok::<(), skipmap::SkipMapError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Options {
    /// The number of levels of the map, which is also the tallest a node can
    /// be. Defaults to [`MAX_LEVEL`].
    pub max_level: usize,
    /// The probability that a node present on some level is also present on
    /// the next one. Smaller values make for shorter nodes and a taller, more
    /// linear search; larger values make for taller nodes and more memory per
    /// node. Defaults to [`DEFAULT_PROBABILITY`].
    pub probability: f64,
    /// The seed of the random number generator drawing node heights, or `None`
    /// to seed it from the thread-local entropy source. Defaults to
    /// [`DEFAULT_SEED`] so that the structure is reproducible.
    pub seed: Option<u64>,
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Options {
            max_level: MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: Some(DEFAULT_SEED),
        }
    }
}

impl Options {
    fn level_generator(&self) -> Result<Geometric, GeometricError> {
        match self.seed {
            Some(seed) => Geometric::with_seed(self.max_level, self.probability, seed),
            None => Geometric::new(self.max_level, self.probability),
        }
    }
}

// ////////////////////////////////////////////////////////////////////////////
// SkipMap
// ////////////////////////////////////////////////////////////////////////////

/// The skipmap provides a way of storing element pairs such that the keys are
/// always sorted whilst at the same time providing an efficient way to access,
/// insert and remove entries.
///
/// Every node, including the head, lives in a single arena owned by the map
/// and nodes refer to their successors by their key in the arena. No node
/// knows its predecessors: these are recovered by searching from the head.
///
/// Keys are unique. Inserting a key which is already present is an error
/// rather than a replacement, and leaves the map untouched.
///
/// Note that mutable references to keys are not available at all as this could
/// result in a node being left out of the proper ordering.
pub struct SkipMap<K, V> {
    // Storage, this is not sorted.
    nodes: Slab<SkipNode<K, V>>,
    // Key of the head node in `nodes`.
    head: usize,
    len: usize,
    level_generator: Geometric,
    compare: Compare<K>,
}

/// Where a search stopped.
enum Search {
    /// The node with a key equal to the target.
    Found(usize),
    /// The last node before the target, which may be the head.
    Vacant(usize),
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K, V> SkipMap<K, V>
where
    K: Ord,
{
    /// Create a new skipmap ordered by `K`'s [`Ord`] implementation, with the
    /// default [`Options`].
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut skipmap: SkipMap<i64, String> = SkipMap::new();
    /// assert!(skipmap.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(Geometric::default(), Box::new(|a: &K, b: &K| a.cmp(b)))
    }

    /// Create a new skipmap ordered by `K`'s [`Ord`] implementation.
    ///
    /// # Errors
    ///
    /// Fails if `options.max_level` is zero or exceeds
    /// [`LEVEL_LIMIT`][crate::level_generator::LEVEL_LIMIT], or if
    /// `options.probability` does not lie in `$(0, 1)$`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::{Options, SkipMap, SkipMapError};
    ///
    /// let options = Options {
    ///     max_level: 0,
    ///     ..Options::default()
    /// };
    /// assert!(matches!(
    ///     SkipMap::<u8, u8>::with_options(options),
    ///     Err(SkipMapError::LevelGenerator(_))
    /// ));
    /// ```
    #[inline]
    pub fn with_options(options: Options) -> Result<Self, SkipMapError> {
        Self::with_options_and_comp(options, |a: &K, b: &K| a.cmp(b))
    }
}

impl<K, V> SkipMap<K, V> {
    /// Create a new skipmap using the provided function in order to determine
    /// the ordering of keys within the map, with the default [`Options`].
    ///
    /// The comparison function must be a total order: well defined,
    /// anti-symmetric and transitive. A function which is not will leave
    /// entries unreachable or out of order, but cannot cause memory unsafety.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// // Largest keys first.
    /// let mut skipmap = SkipMap::with_comp(|a: &u64, b: &u64| b.cmp(a));
    /// skipmap.insert(1, "one")?;
    /// skipmap.insert(3, "three")?;
    /// skipmap.insert(2, "two")?;
    /// assert_eq!(skipmap.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// # Ok::<(), skipmap::SkipMapError>(())
    /// ```
    #[inline]
    pub fn with_comp<F>(f: F) -> Self
    where
        F: 'static + Fn(&K, &K) -> Ordering,
    {
        Self::from_parts(Geometric::default(), Box::new(f))
    }

    /// Create a new skipmap with the given [`Options`], ordering keys with the
    /// provided comparison function.
    ///
    /// See [`SkipMap::with_comp`] for the requirements on the comparison
    /// function.
    ///
    /// # Errors
    ///
    /// Fails if `options.max_level` is zero or exceeds
    /// [`LEVEL_LIMIT`][crate::level_generator::LEVEL_LIMIT], or if
    /// `options.probability` does not lie in `$(0, 1)$`.
    #[inline]
    pub fn with_options_and_comp<F>(options: Options, f: F) -> Result<Self, SkipMapError>
    where
        F: 'static + Fn(&K, &K) -> Ordering,
    {
        let level_generator = options.level_generator()?;
        Ok(Self::from_parts(level_generator, Box::new(f)))
    }

    fn from_parts(level_generator: Geometric, compare: Compare<K>) -> Self {
        let mut nodes = Slab::new();
        let head = nodes.insert(SkipNode::head(level_generator.total()));
        SkipMap {
            nodes,
            head,
            len: 0,
            level_generator,
            compare,
        }
    }

    /// Insert a new entry into the skipmap.
    ///
    /// # Errors
    ///
    /// Fails with [`SkipMapError::DuplicateKey`] if an entry with an equal key
    /// is already present, in which case the map is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::{SkipMap, SkipMapError};
    ///
    /// let mut skipmap = SkipMap::new();
    ///
    /// skipmap.insert(1, "Hello")?;
    /// skipmap.insert(2, "World")?;
    /// assert_eq!(skipmap.len(), 2);
    ///
    /// assert_eq!(skipmap.insert(1, "Again"), Err(SkipMapError::DuplicateKey));
    /// assert_eq!(skipmap.get(&1), Some(&"Hello"));
    /// # Ok::<(), SkipMapError>(())
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<(), SkipMapError> {
        let height = self.level_generator.height();
        let mut backlook = self.new_backlook();
        if let Search::Found(_) = self.search(&key, Seek::Match, Some(&mut backlook[..])) {
            return Err(SkipMapError::DuplicateKey);
        }

        let backlook = &backlook[..height];
        let forwards = backlook
            .iter()
            .enumerate()
            .map(|(level, &prev)| self.nodes[prev].forwards[level])
            .collect();
        let node = self.nodes.insert(SkipNode::new(key, value, forwards));
        for (level, &prev) in backlook.iter().enumerate() {
            self.nodes[prev].forwards[level] = Some(node);
        }

        self.len += 1;
        trace!(node, height, len = self.len, "inserted entry");
        Ok(())
    }

    /// Clears the skipmap, removing all entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// skipmap.clear();
    /// assert!(skipmap.is_empty());
    /// ```
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = self
            .nodes
            .insert(SkipNode::head(self.level_generator.total()));
        self.len = 0;
        debug!("cleared skipmap");
    }

    /// Returns the number of entries in the skipmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// assert_eq!(skipmap.len(), 10);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the skipmap contains no entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.is_empty());
    ///
    /// skipmap.insert(1, "Rust")?;
    /// assert!(!skipmap.is_empty());
    /// # Ok::<(), skipmap::SkipMapError>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Provides a reference to the entry with the smallest key, or `None` if
    /// the skipmap is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.front().is_none());
    ///
    /// skipmap.insert(2, "World")?;
    /// skipmap.insert(1, "Hello")?;
    /// assert_eq!(skipmap.front(), Some((&1, &"Hello")));
    /// # Ok::<(), skipmap::SkipMapError>(())
    /// ```
    #[inline]
    #[must_use]
    pub fn front(&self) -> Option<(&K, &V)> {
        let first = self.nodes[self.head].next()?;
        self.nodes[first].item_ref()
    }

    /// Provides a reference to the value associated with the key, or `None`
    /// if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert!(skipmap.get(&0).is_none());
    /// skipmap.extend((0..10).map(|x| (x, x)));
    /// assert_eq!(skipmap.get(&0), Some(&0));
    /// assert!(skipmap.get(&10).is_none());
    /// ```
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        let node = self.find_key(key)?;
        self.nodes[node].value_ref()
    }

    /// Provides a mutable reference to the value associated with the key, or
    /// `None` if the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// if let Some(x) = skipmap.get_mut(&0) {
    ///     *x = 100;
    /// }
    /// assert_eq!(skipmap.get(&0), Some(&100));
    /// assert!(skipmap.get_mut(&10).is_none());
    /// ```
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.find_key(key)?;
        self.nodes.get_mut(node)?.value_mut()
    }

    /// Returns true if an entry with the given key is in the skipmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// assert!(skipmap.contains_key(&4));
    /// assert!(!skipmap.contains_key(&15));
    /// ```
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find_key(key).is_some()
    }

    /// Returns true if an entry with the given key is in the skipmap and its
    /// value is equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = [(2, 10), (234, 3)].into_iter().collect();
    /// assert!(skipmap.contains(&234, &3));
    /// assert!(!skipmap.contains(&234, &1));
    /// assert!(!skipmap.contains(&50, &50));
    /// ```
    #[inline]
    pub fn contains(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.get(key).is_some_and(|v| v == value)
    }

    /// Removes the entry with the given key, returning its value, or `None` if
    /// the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// assert_eq!(skipmap.remove(&4), Some(4));
    /// assert!(skipmap.remove(&4).is_none());
    /// assert_eq!(skipmap.len(), 9);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_where(key, |_| true).map(|(_key, value)| value)
    }

    /// Removes the entry with the given key only if its value is equal to
    /// `expected`, returning the removed value.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut skipmap: SkipMap<_, _> = [(1, "a"), (2, "b")].into_iter().collect();
    /// assert!(skipmap.remove_if_eq(&1, &"b").is_none());
    /// assert_eq!(skipmap.len(), 2);
    /// assert_eq!(skipmap.remove_if_eq(&1, &"a"), Some("a"));
    /// assert_eq!(skipmap.len(), 1);
    /// ```
    pub fn remove_if_eq(&mut self, key: &K, expected: &V) -> Option<V>
    where
        V: PartialEq,
    {
        self.remove_where(key, |value| value == expected)
            .map(|(_key, value)| value)
    }

    /// Copies clones of every entry into `dest`, in ascending key order,
    /// starting at `dest[offset]`.
    ///
    /// Slots of `dest` outside of the copied range are left untouched.
    ///
    /// # Errors
    ///
    /// Nothing is written if:
    ///
    /// - `offset` is not a valid index into `dest`
    ///   ([`SkipMapError::OffsetOutOfRange`]);
    /// - `dest` has fewer than [`len`][SkipMap::len] slots from `offset`
    ///   onwards ([`SkipMapError::InsufficientCapacity`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::{SkipMap, SkipMapError};
    ///
    /// let skipmap: SkipMap<_, _> = [(234, 3), (2, 10)].into_iter().collect();
    /// let mut dest = [(0, 0); 4];
    ///
    /// skipmap.copy_to(&mut dest, 1)?;
    /// assert_eq!(dest, [(0, 0), (2, 10), (234, 3), (0, 0)]);
    ///
    /// assert_eq!(
    ///     skipmap.copy_to(&mut dest, 3),
    ///     Err(SkipMapError::InsufficientCapacity {
    ///         required: 2,
    ///         available: 1
    ///     })
    /// );
    /// # Ok::<(), SkipMapError>(())
    /// ```
    pub fn copy_to(&self, dest: &mut [(K, V)], offset: usize) -> Result<(), SkipMapError>
    where
        K: Clone,
        V: Clone,
    {
        let len = dest.len();
        if offset >= len {
            return Err(SkipMapError::OffsetOutOfRange { offset, len });
        }
        let available = len - offset;
        if available < self.len {
            return Err(SkipMapError::InsufficientCapacity {
                required: self.len,
                available,
            });
        }

        for (slot, (key, value)) in dest[offset..].iter_mut().zip(self.iter()) {
            *slot = (key.clone(), value.clone());
        }
        Ok(())
    }

    /// Inserts every entry of the iterator, stopping at the first key which
    /// is already present.
    ///
    /// This is the fallible counterpart of [`Extend::extend`].
    ///
    /// # Errors
    ///
    /// Fails with [`SkipMapError::DuplicateKey`] on the first duplicate key.
    /// The entries inserted before it remain in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::{SkipMap, SkipMapError};
    ///
    /// let mut skipmap = SkipMap::new();
    /// assert_eq!(
    ///     skipmap.try_extend([(1, 1), (2, 2), (1, 3), (4, 4)]),
    ///     Err(SkipMapError::DuplicateKey)
    /// );
    /// assert_eq!(skipmap.len(), 2);
    /// ```
    pub fn try_extend<I>(&mut self, iterable: I) -> Result<(), SkipMapError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iterable {
            self.insert(key, value)?;
        }
        Ok(())
    }

    /// Get an owning iterator over the entries of the skipmap, in ascending
    /// key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// for (k, v) in skipmap.into_iter() {
    ///     println!("Key {}, Value: {}", k, v);
    /// }
    /// ```
    #[expect(
        clippy::should_implement_trait,
        reason = "Mirrors the IntoIterator implementation"
    )]
    pub fn into_iter(self) -> IntoIter<K, V> {
        let cursor = self.nodes[self.head].next();
        IntoIter {
            nodes: self.nodes,
            cursor,
            remaining: self.len,
        }
    }

    /// Creates an iterator over the entries of the skipmap, in ascending key
    /// order.
    ///
    /// The iterator can be restarted from the smallest key with
    /// [`Iter::reset`].
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// for (k, v) in skipmap.iter() {
    ///     println!("Key: {}, Value: {}", k, v);
    /// }
    /// ```
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Creates an iterator over the keys of the skipmap.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// for k in skipmap.keys() {
    ///     println!("Key: {}", k);
    /// }
    /// ```
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Creates an iterator over the values of the skipmap, in ascending order
    /// of their keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..10).map(|x| (x, x)).collect();
    /// for v in skipmap.values() {
    ///     println!("Value: {}", v);
    /// }
    /// ```
    #[inline]
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }
}

// ///////////////////////////////////////////////
// Internal methods
// ///////////////////////////////////////////////

impl<K, V> SkipMap<K, V> {
    /// A predecessor vector spanning every level, with every entry pointing at
    /// the head.
    fn new_backlook(&self) -> Vec<usize> {
        vec![self.head; self.level_generator.total()]
    }

    fn key_eq(&self, node: usize, target: &K) -> bool {
        self.nodes[node]
            .key_ref()
            .is_some_and(|key| (self.compare)(key, target).is_eq())
    }

    /// Searches for `target` starting at the head.
    ///
    /// With [`Seek::Match`] the search stops as soon as it lands on a node
    /// equal to `target`. With [`Seek::Before`] it never lands on `target`,
    /// and always ends on the last node strictly before it.
    ///
    /// When given a `backlook`, every level up to the height of each visited
    /// node is overwritten with that node as the search leaves it, so that once
    /// the search ends `backlook[i]` is the last node on level `i` visited
    /// before the target. Levels above every visited node are left untouched,
    /// and so keep pointing at the head.
    fn search(&self, target: &K, seek: Seek, mut backlook: Option<&mut [usize]>) -> Search {
        let mut current = self.head;
        loop {
            let forwards = &self.nodes[current].forwards;
            match step_next(&self.nodes, forwards, target, &*self.compare, seek) {
                Some((level, next)) => {
                    if let Some(backlook) = backlook.as_deref_mut() {
                        backlook[level..forwards.len()].fill(current);
                    }
                    if seek == Seek::Match && self.key_eq(next, target) {
                        return Search::Found(next);
                    }
                    current = next;
                }
                None => {
                    if let Some(backlook) = backlook.as_deref_mut() {
                        backlook[..forwards.len()].fill(current);
                    }
                    return Search::Vacant(current);
                }
            }
        }
    }

    /// Find the node with a key equal to the given key.
    fn find_key(&self, key: &K) -> Option<usize> {
        match self.search(key, Seek::Match, None) {
            Search::Found(node) => Some(node),
            Search::Vacant(_) => None,
        }
    }

    /// Unlinks and releases the node with a key equal to `key`, if there is
    /// one and its value satisfies `pred`.
    fn remove_where<F>(&mut self, key: &K, pred: F) -> Option<(K, V)>
    where
        F: FnOnce(&V) -> bool,
    {
        if self.is_empty() {
            return None;
        }

        let mut backlook = self.new_backlook();
        // A `Seek::Before` search never lands on the target.
        let Search::Vacant(last_lt) = self.search(key, Seek::Before, Some(&mut backlook[..])) else {
            return None;
        };

        // The keys compare as a total order, so the target can only be the
        // immediate successor of the last node before it.
        let candidate = self.nodes[last_lt].next()?;
        let matches = self.nodes[candidate]
            .item
            .as_ref()
            .is_some_and(|(node_key, value)| (self.compare)(node_key, key).is_eq() && pred(value));
        if !matches {
            return None;
        }

        let removed = self.nodes.remove(candidate);
        for (level, &prev) in backlook.iter().enumerate().take(removed.height()) {
            debug_assert_eq!(self.nodes[prev].forwards[level], Some(candidate));
            self.nodes[prev].forwards[level] = removed.forwards[level];
        }

        self.len -= 1;
        trace!(
            node = candidate,
            height = removed.height(),
            len = self.len,
            "removed entry"
        );
        removed.into_inner()
    }
}

#[cfg(test)]
impl<K, V> SkipMap<K, V> {
    /// Checks the integrity of the skipmap.
    fn check(&self) {
        let total = self.level_generator.total();
        let head = &self.nodes[self.head];
        assert!(head.is_head());
        assert_eq!(head.height(), total);
        assert_eq!(self.nodes.len(), self.len + 1, "leaked or missing nodes");

        let chain = |level: usize| -> Vec<usize> {
            let mut chain = Vec::new();
            let mut link = self.nodes[self.head].forwards[level];
            while let Some(node) = link {
                assert!(
                    self.nodes[node].height() > level,
                    "node {node} linked above its height"
                );
                chain.push(node);
                link = self.nodes[node].forwards[level];
            }
            chain
        };

        let bottom = chain(0);
        assert_eq!(bottom.len(), self.len);
        for pair in bottom.windows(2) {
            let a = self.nodes[pair[0]].key_ref().expect("entry node has a key");
            let b = self.nodes[pair[1]].key_ref().expect("entry node has a key");
            assert_eq!((self.compare)(a, b), Ordering::Less, "keys out of order");
        }

        for level in 1..total {
            let expected: Vec<usize> = bottom
                .iter()
                .copied()
                .filter(|&node| self.nodes[node].height() > level)
                .collect();
            assert_eq!(chain(level), expected, "level {level} is inconsistent");
        }
    }

    /// The height of every node, in ascending key order.
    fn heights(&self) -> Vec<usize> {
        let mut heights = Vec::with_capacity(self.len);
        let mut link = self.nodes[self.head].next();
        while let Some(node) = link {
            heights.push(self.nodes[node].height());
            link = self.nodes[node].next();
        }
        heights
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<K: Ord, V> Default for SkipMap<K, V> {
    #[inline]
    fn default() -> SkipMap<K, V> {
        SkipMap::new()
    }
}

/// This implementation of PartialEq only checks that the *entries* are equal;
/// it does not check for equivalence of other features (such as the ordering
/// function and the node heights). Furthermore, this uses `K`'s implementation
/// of PartialEq and *does not* use the owning skipmap's comparison function.
impl<K, V> PartialEq for SkipMap<K, V>
where
    K: PartialEq,
    V: PartialEq,
{
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for SkipMap<K, V>
where
    K: Eq,
    V: Eq,
{
}

impl<K: Hash, V: Hash> Hash for SkipMap<K, V> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for elt in self {
            elt.hash(state);
        }
    }
}

impl<K, V> Extend<(K, V)> for SkipMap<K, V> {
    /// Inserts every entry of the iterator.
    ///
    /// # Panics
    ///
    /// Panics if a key is already present. Use [`SkipMap::try_extend`] to
    /// handle duplicates.
    #[inline]
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iterable: I) {
        if let Err(err) = self.try_extend(iterable) {
            panic!("{err}");
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SkipMap<K, V>
where
    K: Ord,
{
    /// # Panics
    ///
    /// Panics if the iterator yields the same key twice.
    #[inline]
    fn from_iter<I>(iter: I) -> SkipMap<K, V>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut skipmap = SkipMap::new();
        skipmap.extend(iter);
        skipmap
    }
}

impl<K, V> fmt::Debug for SkipMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;

        for (i, (k, v)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "({k:?}, {v:?})")?;
        }
        write!(f, "]")
    }
}

impl<K, V> fmt::Display for SkipMap<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;

        for (i, (k, v)) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "({k}, {v})")?;
        }
        write!(f, "]")
    }
}

impl<K, V> IntoIterator for SkipMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a SkipMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ///////////////////////////////////////////////
// Extra structs
// ///////////////////////////////////////////////

/// An iterator over the entries of a [`SkipMap`], following the level-0 links
/// from the head.
///
/// The skipmap is borrowed for the lifetime of the iterator, so it cannot be
/// modified while being iterated.
pub struct Iter<'a, K, V> {
    map: &'a SkipMap<K, V>,
    // The node most recently yielded, or the head.
    cursor: usize,
    remaining: usize,
}

impl<K, V> Iter<'_, K, V> {
    /// Restarts the iterator from the smallest key.
    ///
    /// # Examples
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let skipmap: SkipMap<_, _> = (0..3).map(|x| (x, x)).collect();
    /// let mut iter = skipmap.iter();
    /// assert_eq!(iter.by_ref().count(), 3);
    /// assert!(iter.next().is_none());
    ///
    /// iter.reset();
    /// assert_eq!(iter.next(), Some((&0, &0)));
    /// ```
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = self.map.head;
        self.remaining = self.map.len;
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let map = self.map;
        let next = map.nodes[self.cursor].next()?;
        self.cursor = next;
        self.remaining = self.remaining.saturating_sub(1);
        map.nodes[next].item_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over a [`SkipMap`]'s keys.
pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|x| x.0)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// Iterator over a [`SkipMap`]'s values.
pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|x| x.1)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Consuming iterator over the entries of a [`SkipMap`], in ascending key
/// order.
pub struct IntoIter<K, V> {
    nodes: Slab<SkipNode<K, V>>,
    cursor: Link,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.try_remove(self.cursor?)?;
        self.cursor = node.next();
        self.remaining = self.remaining.saturating_sub(1);
        node.into_inner()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

// ////////////////////////////////////////////////////////////////////////////
// Tests
// ////////////////////////////////////////////////////////////////////////////
