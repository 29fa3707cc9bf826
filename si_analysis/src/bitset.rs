// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-size dense bit set used for register sets.
//!
//! Every binary operation requires both operands to have the same size. A mismatch (or an index
//! past the end) is a caller bug and panics, the same way slice indexing does.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::{BitAnd, BitOr, Sub};

const WORD_BITS: usize = 64;

/// A fixed-size set of small integers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitSet {
    size: usize,
    words: Vec<u64>,
}

impl BitSet {
    /// Creates a set able to hold `0..size`, with every bit clear.
    #[must_use]
    pub fn new_empty(size: usize) -> Self {
        Self {
            size,
            words: vec![0; size.div_ceil(WORD_BITS)],
        }
    }

    /// Number of representable bits.
    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Clears every bit.
    pub fn reset(&mut self) {
        self.words.fill(0);
    }

    /// Sets bit `index`.
    #[inline]
    pub fn set(&mut self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word] |= mask;
    }

    /// Clears bit `index`.
    #[inline]
    pub fn clear(&mut self, index: usize) {
        let (word, mask) = self.locate(index);
        self.words[word] &= !mask;
    }

    /// Sets or clears bit `index`.
    #[inline]
    pub fn assign(&mut self, index: usize, value: bool) {
        if value {
            self.set(index);
        } else {
            self.clear(index);
        }
    }

    /// Returns bit `index`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        let (word, mask) = self.locate(index);
        self.words[word] & mask != 0
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// `self |= other`.
    pub fn union_with(&mut self, other: &Self) {
        self.check_size(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    /// `self &= other`.
    pub fn intersect_with(&mut self, other: &Self) {
        self.check_size(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    /// `self &= !other`.
    pub fn subtract_with(&mut self, other: &Self) {
        self.check_size(other);
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
    }

    /// Iterates over the set bits in ascending order.
    pub fn ones(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            word_index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    fn locate(&self, index: usize) -> (usize, u64) {
        assert!(
            index < self.size,
            "bit index {index} out of range for a set of size {}",
            self.size
        );
        (index / WORD_BITS, 1_u64 << (index % WORD_BITS))
    }

    fn check_size(&self, other: &Self) {
        assert_eq!(
            self.size, other.size,
            "bit set size mismatch: {} vs {}",
            self.size, other.size
        );
    }
}

/// Iterator over the set bits of a [`BitSet`].
#[derive(Clone, Debug)]
pub struct Ones<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * WORD_BITS + bit);
            }
            self.word_index += 1;
            self.current = *self.words.get(self.word_index)?;
        }
    }
}

impl BitOr for &BitSet {
    type Output = BitSet;

    fn bitor(self, rhs: Self) -> BitSet {
        let mut out = self.clone();
        out.union_with(rhs);
        out
    }
}

impl BitAnd for &BitSet {
    type Output = BitSet;

    fn bitand(self, rhs: Self) -> BitSet {
        let mut out = self.clone();
        out.intersect_with(rhs);
        out
    }
}

impl Sub for &BitSet {
    type Output = BitSet;

    fn sub(self, rhs: Self) -> BitSet {
        let mut out = self.clone();
        out.subtract_with(rhs);
        out
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::BitSet;
    use std::vec::Vec;

    fn from_bits(size: usize, bits: &[usize]) -> BitSet {
        let mut s = BitSet::new_empty(size);
        for &b in bits {
            s.set(b);
        }
        s
    }

    #[test]
    fn set_clear_and_count_across_word_boundary() {
        let mut s = BitSet::new_empty(130);
        s.set(0);
        s.set(63);
        s.set(64);
        s.set(129);
        assert_eq!(s.count_ones(), 4);
        s.clear(63);
        s.assign(5, true);
        assert!(!s.get(63));
        assert_eq!(s.ones().collect::<Vec<_>>(), [0, 5, 64, 129]);
        s.reset();
        assert!(s.is_clear());
    }

    #[test]
    fn operators_are_pure() {
        let a = from_bits(70, &[1, 2, 65]);
        let b = from_bits(70, &[2, 3]);
        assert_eq!(&a | &b, from_bits(70, &[1, 2, 3, 65]));
        assert_eq!(&a & &b, from_bits(70, &[2]));
        assert_eq!(&a - &b, from_bits(70, &[1, 65]));
        assert_eq!(a, from_bits(70, &[1, 2, 65]));
    }

    #[test]
    #[should_panic(expected = "bit set size mismatch")]
    fn mismatched_sizes_panic() {
        let mut a = BitSet::new_empty(8);
        a.union_with(&BitSet::new_empty(9));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        BitSet::new_empty(8).set(8);
    }

    #[test]
    fn empty_set_has_no_ones() {
        let s = BitSet::new_empty(0);
        assert_eq!(s.ones().count(), 0);
        assert!(s.is_clear());
    }
}
