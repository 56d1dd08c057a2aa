// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A fixed-size bitset describing a set of component types.

use std::fmt;

/// The maximum number of distinct component types a process may register.
pub const MAX_COMPONENTS: usize = 128;

const WORD_BITS: usize = 64;
const WORDS: usize = MAX_COMPONENTS / WORD_BITS;

/// A set of component types, one bit per [`ComponentIndex`](super::ComponentIndex).
///
/// The same type describes both what an entity currently carries and what a
/// system requires. An entity matches a system when its signature is a superset
/// of the system's.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    bits: [u64; WORDS],
}

impl Signature {
    /// Creates an empty signature.
    pub const fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    #[inline]
    fn locate(index: usize) -> (usize, u64) {
        assert!(
            index < MAX_COMPONENTS,
            "component index {index} exceeds MAX_COMPONENTS ({MAX_COMPONENTS})"
        );
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }

    /// Sets the bit for `index`.
    pub fn set(&mut self, index: usize) {
        let (word, mask) = Self::locate(index);
        self.bits[word] |= mask;
    }

    /// Clears the bit for `index`.
    pub fn clear(&mut self, index: usize) {
        let (word, mask) = Self::locate(index);
        self.bits[word] &= !mask;
    }

    /// Returns `true` if the bit for `index` is set.
    pub fn test(&self, index: usize) -> bool {
        let (word, mask) = Self::locate(index);
        self.bits[word] & mask != 0
    }

    /// Returns `true` if every bit set in `other` is also set in `self`.
    ///
    /// The empty signature is a subset of every signature.
    pub fn is_superset_of(&self, other: &Signature) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .all(|(mine, theirs)| mine & theirs == *theirs)
    }

    /// Clears every bit.
    pub fn reset(&mut self) {
        self.bits = [0; WORDS];
    }

    /// Returns `true` if no bit is set.
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|w| *w == 0)
    }

    /// Returns the number of set bits.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the indices of set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_COMPONENTS).filter(move |i| self.test(*i))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
