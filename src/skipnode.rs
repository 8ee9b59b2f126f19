//! Nodes of the skipmap and the single-hop traversal primitive shared by every
//! search.

use std::cmp::Ordering;

use slab::Slab;

/// A link to the next node at some level, as a key into the node arena.
///
/// `None` is the terminal marker at the end of every level.
pub type Link = Option<usize>;

// ////////////////////////////////////////////////////////////////////////////
// SkipNode
// ////////////////////////////////////////////////////////////////////////////

/// SkipNodes make up the skipmap. They are all stored in one arena owned by
/// the map, and refer to one another by their key in that arena.
///
/// The head node (the sentinel) is a node like any other except that it
/// carries no item, and that its forward array spans every level of the map.
///
/// A node of height `h` has `h` forward links: `forwards[i]` is the next node
/// on level `i`. The height of a node never changes once it is created and is
/// always at least 1.
#[derive(Clone, Debug)]
pub struct SkipNode<K, V> {
    // The key and value should never be None, with the sole exception being
    // the head node.
    pub item: Option<(K, V)>,
    // Vector of links to the next node at the respective level.
    pub forwards: Box<[Link]>,
}

// ///////////////////////////////////////////////
// Inherent methods
// ///////////////////////////////////////////////

impl<K, V> SkipNode<K, V> {
    /// Create a new head node spanning `total_levels` levels.
    pub fn head(total_levels: usize) -> Self {
        debug_assert!(total_levels > 0, "a skipmap needs at least one level");
        SkipNode {
            item: None,
            forwards: vec![None; total_levels].into_boxed_slice(),
        }
    }

    /// Create a new node with the given forward links.
    pub fn new(key: K, value: V, forwards: Box<[Link]>) -> Self {
        debug_assert!(!forwards.is_empty(), "a node has a height of at least 1");
        SkipNode {
            item: Some((key, value)),
            forwards,
        }
    }

    /// The number of levels this node participates in.
    pub fn height(&self) -> usize {
        self.forwards.len()
    }

    /// Returns `true` is the node is a head-node.
    pub fn is_head(&self) -> bool {
        self.item.is_none()
    }

    /// The next node on level 0.
    pub fn next(&self) -> Link {
        self.forwards.first().copied().flatten()
    }

    pub fn key_ref(&self) -> Option<&K> {
        self.item.as_ref().map(|item| &item.0)
    }

    pub fn value_ref(&self) -> Option<&V> {
        self.item.as_ref().map(|item| &item.1)
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.item.as_mut().map(|item| &mut item.1)
    }

    pub fn item_ref(&self) -> Option<(&K, &V)> {
        self.item.as_ref().map(|item| (&item.0, &item.1))
    }

    /// Consumes the node returning the item it contains.
    pub fn into_inner(self) -> Option<(K, V)> {
        self.item
    }
}

// ////////////////////////////////////////////////////////////////////////////
// Traversal
// ////////////////////////////////////////////////////////////////////////////

/// Which neighbours a search is allowed to step onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Seek {
    /// Step onto neighbours whose key is less than or equal to the target, so
    /// that the search can land on the target itself.
    Match,
    /// Step onto neighbours whose key is strictly less than the target, so
    /// that the search stops just before where the target is (or would be).
    Before,
}

impl Seek {
    fn admits(self, ordering: Ordering) -> bool {
        match self {
            Seek::Match => ordering.is_le(),
            Seek::Before => ordering.is_lt(),
        }
    }
}

/// Finds the next hop from a node whose forward array is `forwards`.
///
/// The levels are scanned from the highest down, and the first neighbour
/// admitted by `seek` with respect to `target` is returned alongside its level.
/// If no neighbour at any level is admitted, `None` is returned and the node
/// owning `forwards` is the last one before the target.
///
/// The head node has no key and is never a neighbour.
pub fn step_next<K, V>(
    nodes: &Slab<SkipNode<K, V>>,
    forwards: &[Link],
    target: &K,
    compare: &dyn Fn(&K, &K) -> Ordering,
    seek: Seek,
) -> Option<(usize, usize)> {
    forwards
        .iter()
        .enumerate()
        .rev()
        .find_map(|(level, link)| {
            let next = (*link)?;
            let key = nodes.get(next)?.key_ref()?;
            seek.admits(compare(key, target)).then_some((level, next))
        })
}
