//! A heap-backed byte buffer tracking capacity and data in bits.
//!
//! Grounded on `Bfdp::Data::BitBuffer`: separate "how much is allocated"
//! and "how much is meaningful" counters, with preserve/no-preserve resize
//! variants and a raw `mem_set`.

use alloc::vec;
use alloc::vec::Vec;

use super::mask::bits_to_bytes;
use crate::error::{report, Severity};

/// Byte-backed storage with independent capacity-in-bits and data-in-bits
/// tracking.
///
/// `capacity_bits` is always a multiple of 8 (it is sized in whole bytes);
/// `data_bits` may be any value `<= capacity_bits`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    data_bits: usize,
}

impl BitBuffer {
    /// An empty buffer: zero capacity, zero data.
    #[must_use]
    pub fn new() -> Self {
        Self { bytes: Vec::new(), data_bits: 0 }
    }

    /// Allocates `n_bits` worth of capacity (rounded up to whole bytes),
    /// with `data_bits` initially zero.
    #[must_use]
    pub fn with_capacity_bits(n_bits: usize) -> Self {
        let n_bytes = bits_to_bytes(n_bits);
        Self { bytes: vec![0u8; n_bytes], data_bits: 0 }
    }

    /// Copies `ceil(n_bits/8)` bytes out of `data` and sets `data_bits =
    /// n_bits`. `data` must be at least that many bytes long.
    #[must_use]
    pub fn from_bytes(data: &[u8], n_bits: usize) -> Self {
        let n_bytes = bits_to_bytes(n_bits);
        let mut bytes = vec![0u8; n_bytes];
        let copy_len = n_bytes.min(data.len());
        bytes[..copy_len].copy_from_slice(&data[..copy_len]);
        Self { bytes, data_bits: n_bits }
    }

    /// Bits currently allocated.
    #[must_use]
    pub fn capacity_bits(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Bits of meaningful data.
    #[must_use]
    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    /// `ceil(data_bits / 8)`.
    #[must_use]
    pub fn data_bytes(&self) -> usize {
        bits_to_bytes(self.data_bits)
    }

    /// Read-only view of the backing bytes (length is `capacity_bits/8`,
    /// not `data_bytes`).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mutable view of the backing bytes, used by a `BitStream` to read
    /// and write through the buffer.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Shrinks or grows `data_bits` within the existing capacity. Returns
    /// `false` (and reports a misuse) if `n_bits` exceeds `capacity_bits`.
    pub fn set_data_bits(&mut self, n_bits: usize) -> bool {
        if n_bits > self.capacity_bits() {
            report(Severity::Misuse, "bitmanip::bit_buffer", "set_data_bits: exceeds capacity");
            return false;
        }
        self.data_bits = n_bits;
        true
    }

    /// Shrinks or grows `data_bits` to `n_bytes * 8`, within capacity.
    pub fn set_data_bytes(&mut self, n_bytes: usize) -> bool {
        self.set_data_bits(n_bytes * 8)
    }

    /// Resizes capacity to `n_bits`, without any guarantee about the
    /// contents of a newly-allocated buffer.
    pub fn resize_no_preserve(&mut self, n_bits: usize) {
        let n_bytes = bits_to_bytes(n_bits);
        if n_bytes <= self.bytes.len() {
            self.data_bits = n_bits;
            return;
        }
        self.bytes = vec![0u8; n_bytes];
        self.data_bits = n_bits;
    }

    /// Resizes capacity to `n_bits`, copying existing bytes into the new
    /// allocation when growing.
    pub fn resize_preserve(&mut self, n_bits: usize) {
        self.resize_preserve_init(n_bits, 0);
    }

    /// As [`BitBuffer::resize_preserve`], filling any newly-allocated bytes
    /// with `fill` rather than zero.
    pub fn resize_preserve_init(&mut self, n_bits: usize, fill: u8) {
        let n_bytes = bits_to_bytes(n_bits);
        if n_bytes <= self.bytes.len() {
            self.data_bits = n_bits;
            return;
        }
        let mut grown = vec![fill; n_bytes];
        grown[..self.bytes.len()].copy_from_slice(&self.bytes);
        self.bytes = grown;
        self.data_bits = n_bits;
    }

    /// Fills the entire capacity with `byte`. A no-op on an empty buffer.
    pub fn mem_set(&mut self, byte: u8) {
        for b in &mut self.bytes {
            *b = byte;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_copies_exact_window() {
        let buf = BitBuffer::from_bytes(&[0xAB, 0xCD, 0xEF], 16);
        assert_eq!(buf.data_bits(), 16);
        assert_eq!(buf.data_bytes(), 2);
        assert_eq!(&buf.as_bytes()[..2], &[0xAB, 0xCD]);
    }

    #[test]
    fn resize_preserve_keeps_prefix() {
        let mut buf = BitBuffer::from_bytes(&[0x11, 0x22], 16);
        buf.resize_preserve(32);
        assert_eq!(&buf.as_bytes()[..2], &[0x11, 0x22]);
        assert_eq!(buf.capacity_bits(), 32);
    }

    #[test]
    fn resize_preserve_init_fills_growth() {
        let mut buf = BitBuffer::from_bytes(&[0xFF], 8);
        buf.resize_preserve_init(24, 0xAA);
        assert_eq!(buf.as_bytes(), &[0xFF, 0xAA, 0xAA]);
    }

    #[test]
    fn set_data_bits_rejects_over_capacity() {
        let mut buf = BitBuffer::with_capacity_bits(8);
        assert!(!buf.set_data_bits(9));
        assert!(buf.set_data_bits(8));
    }

    #[test]
    fn mem_set_fills_capacity() {
        let mut buf = BitBuffer::with_capacity_bits(24);
        buf.mem_set(0x5A);
        assert!(buf.as_bytes().iter().all(|&b| b == 0x5A));
    }
}
