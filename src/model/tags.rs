use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

/// Upper bound on configurable tags. Bit 31 is kept free so that `!0`
/// masked by the tag mask never collides with a sentinel.
pub const MAX_TAGS: u32 = 31;

/// A set of workspaces; bit `i` stands for tag `i`.
#[derive(Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TagSet(u32);

impl TagSet {
    pub const EMPTY: TagSet = TagSet(0);

    pub const fn from_bits(bits: u32) -> TagSet { TagSet(bits) }

    pub const fn bits(self) -> u32 { self.0 }

    /// The set holding only tag `index`. Out-of-range indices give the empty
    /// set.
    pub fn single(index: u32) -> TagSet {
        if index >= MAX_TAGS {
            TagSet::EMPTY
        } else {
            TagSet(1 << index)
        }
    }

    /// Mask covering the first `count` tags.
    pub fn all(count: u32) -> TagSet {
        let count = count.min(MAX_TAGS);
        TagSet(((1u64 << count) - 1) as u32)
    }

    pub fn is_empty(self) -> bool { self.0 == 0 }

    pub fn intersects(self, other: TagSet) -> bool { self.0 & other.0 != 0 }

    pub fn contains_tag(self, index: u32) -> bool { self.intersects(TagSet::single(index)) }

    pub fn iter(self) -> impl Iterator<Item = u32> {
        (0..MAX_TAGS).filter(move |i| self.contains_tag(*i))
    }
}

impl BitAnd for TagSet {
    type Output = TagSet;

    fn bitand(self, rhs: TagSet) -> TagSet { TagSet(self.0 & rhs.0) }
}

impl BitOr for TagSet {
    type Output = TagSet;

    fn bitor(self, rhs: TagSet) -> TagSet { TagSet(self.0 | rhs.0) }
}

impl BitXor for TagSet {
    type Output = TagSet;

    fn bitxor(self, rhs: TagSet) -> TagSet { TagSet(self.0 ^ rhs.0) }
}

impl Not for TagSet {
    type Output = TagSet;

    fn not(self) -> TagSet { TagSet(!self.0) }
}

impl fmt::Debug for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_all() {
        assert_eq!(TagSet::single(0).bits(), 0b1);
        assert_eq!(TagSet::single(3).bits(), 0b1000);
        assert_eq!(TagSet::single(MAX_TAGS), TagSet::EMPTY);
        assert_eq!(TagSet::all(9).bits(), 0x1ff);
        assert_eq!(TagSet::all(40), TagSet::all(MAX_TAGS));
    }

    #[test]
    fn set_operations() {
        let a = TagSet::from_bits(0b0110);
        let b = TagSet::from_bits(0b0011);
        assert!(a.intersects(b));
        assert_eq!((a & b).bits(), 0b0010);
        assert_eq!((a ^ b).bits(), 0b0101);
        assert!(!TagSet::single(0).intersects(TagSet::single(1)));
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 2]);
    }
}
