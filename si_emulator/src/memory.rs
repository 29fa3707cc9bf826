// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte-addressed memories: the global memory seam and the work group's local data share.
//!
//! All multi-byte values are little-endian.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::error::MemoryError;

/// Byte-addressed memory used by scalar and vector memory instructions.
///
/// Latency is not modeled; every access completes immediately.
pub trait Memory {
    /// Fills `buf` with the bytes starting at `address`.
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), MemoryError>;

    /// Stores `data` starting at `address`.
    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), MemoryError>;

    /// Reads a little-endian `u32`.
    fn read_u32(&self, address: u64) -> Result<u32, MemoryError> {
        let mut buf = [0; 4];
        self.read(address, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Writes a little-endian `u32`.
    fn write_u32(&mut self, address: u64, value: u32) -> Result<(), MemoryError> {
        self.write(address, &value.to_le_bytes())
    }
}

const PAGE_SIZE: u64 = 4096;

/// Sparse 64-bit global memory. Unwritten bytes read as zero.
#[derive(Clone, Debug, Default)]
pub struct FlatMemory {
    pages: HashMap<u64, Box<[u8]>>,
}

impl FlatMemory {
    /// Creates an empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages touched by writes.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Writes a run of little-endian `u32`s starting at `address`.
    pub fn write_words(&mut self, address: u64, words: &[u32]) -> Result<(), MemoryError> {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        self.write(address, &bytes)
    }

    /// Reads `count` little-endian `u32`s starting at `address`.
    pub fn read_words(&self, address: u64, count: usize) -> Result<Vec<u32>, MemoryError> {
        let mut bytes = vec![0; count * 4];
        self.read(address, &mut bytes)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

fn check_range(address: u64, size: usize) -> Result<(), MemoryError> {
    let len = u64::try_from(size).map_err(|_| MemoryError::OutOfBounds { address, size })?;
    address
        .checked_add(len)
        .map(|_| ())
        .ok_or(MemoryError::OutOfBounds { address, size })
}

impl Memory for FlatMemory {
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), MemoryError> {
        check_range(address, buf.len())?;
        for (addr, byte) in (address..).zip(buf.iter_mut()) {
            *byte = self
                .pages
                .get(&(addr / PAGE_SIZE))
                .map_or(0, |page| page[(addr % PAGE_SIZE) as usize]);
        }
        Ok(())
    }

    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), MemoryError> {
        check_range(address, data.len())?;
        for (addr, &byte) in (address..).zip(data) {
            let page = self
                .pages
                .entry(addr / PAGE_SIZE)
                .or_insert_with(|| vec![0; PAGE_SIZE as usize].into_boxed_slice());
            page[(addr % PAGE_SIZE) as usize] = byte;
        }
        Ok(())
    }
}

/// Local data share of one work group: a fixed-size scratch memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lds {
    bytes: Vec<u8>,
}

impl Lds {
    /// Creates a zeroed LDS of `size` bytes.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn range(&self, address: u64, size: usize) -> Result<core::ops::Range<usize>, MemoryError> {
        let err = MemoryError::OutOfBounds { address, size };
        let start = usize::try_from(address).map_err(|_| err.clone())?;
        let end = start.checked_add(size).ok_or_else(|| err.clone())?;
        if end > self.bytes.len() {
            return Err(err);
        }
        Ok(start..end)
    }
}

impl Memory for Lds {
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), MemoryError> {
        let range = self.range(address, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write(&mut self, address: u64, data: &[u8]) -> Result<(), MemoryError> {
        let range = self.range(address, data.len())?;
        self.bytes[range].copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_memory_spans_pages_and_reads_zero_elsewhere() {
        let mut m = FlatMemory::new();
        m.write_u32(PAGE_SIZE - 2, 0xAABB_CCDD).unwrap();
        assert_eq!(m.page_count(), 2);
        assert_eq!(m.read_u32(PAGE_SIZE - 2), Ok(0xAABB_CCDD));
        assert_eq!(m.read_u32(0x10_0000), Ok(0));
    }

    #[test]
    fn flat_memory_rejects_wrapping_accesses() {
        let m = FlatMemory::new();
        assert_eq!(
            m.read_u32(u64::MAX - 1),
            Err(MemoryError::OutOfBounds {
                address: u64::MAX - 1,
                size: 4
            })
        );
    }

    #[test]
    fn lds_is_bounded() {
        let mut lds = Lds::new(8);
        lds.write_u32(4, 9).unwrap();
        assert_eq!(lds.read_u32(4), Ok(9));
        assert_eq!(
            lds.write_u32(6, 1),
            Err(MemoryError::OutOfBounds {
                address: 6,
                size: 4
            })
        );
    }

    #[test]
    fn word_helpers_round_trip() {
        let mut m = FlatMemory::new();
        m.write_words(0x100, &[1, 2, 3]).unwrap();
        assert_eq!(m.read_words(0x104, 2).unwrap(), [2, 3]);
    }
}
