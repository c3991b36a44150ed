//! A cursor over a [`BitBuffer`] that reads and writes spans of 1..=64
//! bits at a time.
//!
//! Grounded on `Bfdp::Data::BitStream` (`GenericBitStream`): exclusive
//! mutable borrow of its buffer, LSb-first byte assembly matching scenarios
//! S5/S6 in the testable properties.

use super::bit_buffer::BitBuffer;
use super::mask::{bits_to_bytes, extract_bits, replace_bits};
use crate::error::{report, BfsdlCoreError, CoreResult, Severity};

/// A read/write cursor borrowing a [`BitBuffer`] exclusively.
pub struct BitStream<'a> {
    buffer: &'a mut BitBuffer,
    pos_bits: usize,
}

impl<'a> BitStream<'a> {
    /// Opens a stream over `buffer`, cursor at position 0.
    pub fn new(buffer: &'a mut BitBuffer) -> Self {
        Self { buffer, pos_bits: 0 }
    }

    /// Current cursor position, in bits from the start of the buffer.
    #[must_use]
    pub fn pos_bits(&self) -> usize {
        self.pos_bits
    }

    /// Bits remaining between the cursor and `buffer.data_bits()`.
    #[must_use]
    pub fn bits_till_end(&self) -> usize {
        self.buffer.data_bits().saturating_sub(self.pos_bits)
    }

    /// Moves the cursor to `pos`. Fails if `pos > data_bits()`.
    pub fn seek_bits(&mut self, pos: usize) -> CoreResult<()> {
        if pos > self.buffer.data_bits() {
            report(Severity::Misuse, "bitmanip::bit_stream", "seek_bits: position out of range");
            return Err(BfsdlCoreError::OutOfRange { pos_bits: pos, data_bits: self.buffer.data_bits() });
        }
        self.pos_bits = pos;
        Ok(())
    }

    /// Reads up to 64 bits at the cursor into a `u64`, advancing the
    /// cursor. Bits are assembled LSb-first: the first bit read becomes
    /// the value's bit 0.
    pub fn read_bits_u64(&mut self, n_bits: u32) -> CoreResult<u64> {
        assert!(n_bits > 0 && n_bits <= 64, "n_bits must be in 1..=64");
        if (n_bits as usize) > self.bits_till_end() {
            report(Severity::Misuse, "bitmanip::bit_stream", "read_bits: not enough data");
            return Err(BfsdlCoreError::OutOfRange {
                pos_bits: self.pos_bits + n_bits as usize,
                data_bits: self.buffer.data_bits(),
            });
        }
        let mut value: u64 = 0;
        let bytes = self.buffer.as_bytes();
        for i in 0..n_bits as usize {
            let bit_index = self.pos_bits + i;
            let byte = bytes[bit_index / 8];
            let bit = (byte >> (bit_index % 8)) & 1;
            value |= u64::from(bit) << i;
        }
        self.pos_bits += n_bits as usize;
        Ok(value)
    }

    /// Writes the low `n_bits` of `value` at the cursor, advancing it.
    pub fn write_bits_u64(&mut self, value: u64, n_bits: u32) -> CoreResult<()> {
        assert!(n_bits > 0 && n_bits <= 64, "n_bits must be in 1..=64");
        let end = self.pos_bits + n_bits as usize;
        if end > self.buffer.capacity_bits() {
            report(Severity::Misuse, "bitmanip::bit_stream", "write_bits: exceeds capacity");
            return Err(BfsdlCoreError::OutOfRange { pos_bits: end, data_bits: self.buffer.capacity_bits() });
        }
        let bytes = self.buffer.as_bytes_mut();
        for i in 0..n_bits as usize {
            let bit_index = self.pos_bits + i;
            let bit = (value >> i) & 1;
            let byte_idx = bit_index / 8;
            let shift = bit_index % 8;
            bytes[byte_idx] = (bytes[byte_idx] & !(1 << shift)) | ((bit as u8) << shift);
        }
        self.pos_bits = end;
        if end > self.buffer.data_bits() {
            self.buffer.set_data_bits(end);
        }
        Ok(())
    }

    /// Reads `n_bits` into `out`, assembling each destination byte
    /// LSb-first, matching [`BitStream::read_bits_u64`] at byte
    /// granularity. `out` must be at least `bits_to_bytes(n_bits)` long.
    pub fn read_bits(&mut self, out: &mut [u8], n_bits: usize) -> CoreResult<()> {
        let need = bits_to_bytes(n_bits);
        assert!(out.len() >= need, "out buffer too small");
        if n_bits > self.bits_till_end() {
            report(Severity::Misuse, "bitmanip::bit_stream", "read_bits: not enough data");
            return Err(BfsdlCoreError::OutOfRange {
                pos_bits: self.pos_bits + n_bits,
                data_bits: self.buffer.data_bits(),
            });
        }
        for chunk_start in (0..n_bits).step_by(8) {
            let chunk_len = (n_bits - chunk_start).min(8) as u32;
            let v = self.read_bits_u64(chunk_len)?;
            out[chunk_start / 8] = v as u8;
        }
        Ok(())
    }

    /// Writes `n_bits` from `data`, inverse of [`BitStream::read_bits`].
    pub fn write_bits(&mut self, data: &[u8], n_bits: usize) -> CoreResult<()> {
        let need = bits_to_bytes(n_bits);
        assert!(data.len() >= need, "data buffer too small");
        for chunk_start in (0..n_bits).step_by(8) {
            let chunk_len = (n_bits - chunk_start).min(8) as u32;
            let byte = data[chunk_start / 8];
            self.write_bits_u64(u64::from(byte), chunk_len)?;
        }
        Ok(())
    }

    /// Extracts the `width`-bit field at `offset` from a value previously
    /// read via [`BitStream::read_bits_u64`] — a thin convenience wrapper
    /// over [`extract_bits`]/[`replace_bits`] for callers composing
    /// sub-fields out of one read.
    #[must_use]
    pub fn extract(value: u64, width: u32, offset: u32) -> u64 {
        extract_bits(value, width, offset)
    }

    /// See [`BitStream::extract`]; the write-side counterpart.
    #[must_use]
    pub fn replace(dest: u64, src: u64, width: u32, offset: u32) -> u64 {
        replace_bits(dest, src, width, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_raw_bit_stream_one_read() {
        let mut buf = BitBuffer::from_bytes(&[0xAB, 0xCD], 16);
        let mut stream = BitStream::new(&mut buf);
        let value = stream.read_bits_u64(16).unwrap();
        assert_eq!(value, 0xCDAB);
    }

    #[test]
    fn s6_partitioned_bit_read() {
        let mut buf = BitBuffer::from_bytes(&[0xAB, 0xCD, 0xEF], 24);
        let mut stream = BitStream::new(&mut buf);
        assert_eq!(stream.read_bits_u64(4).unwrap(), 0xB);
        assert_eq!(stream.read_bits_u64(10).unwrap(), 0xDA);
        assert_eq!(stream.read_bits_u64(3).unwrap(), 0x7);
        assert_eq!(stream.read_bits_u64(5).unwrap(), 0x17);
        assert_eq!(stream.pos_bits(), 4 + 10 + 3 + 5);
        assert_eq!(stream.pos_bits(), 22);
    }

    #[test]
    fn write_then_read_roundtrips() {
        let mut buf = BitBuffer::with_capacity_bits(32);
        {
            let mut stream = BitStream::new(&mut buf);
            stream.write_bits_u64(0b1011, 4).unwrap();
            stream.write_bits_u64(0x3AB, 10).unwrap();
            stream.write_bits_u64(0b101, 3).unwrap();
        }
        buf.set_data_bits(17);
        let mut stream = BitStream::new(&mut buf);
        assert_eq!(stream.read_bits_u64(4).unwrap(), 0b1011);
        assert_eq!(stream.read_bits_u64(10).unwrap(), 0x3AB);
        assert_eq!(stream.read_bits_u64(3).unwrap(), 0b101);
    }

    #[test]
    fn read_past_end_fails() {
        let mut buf = BitBuffer::from_bytes(&[0xFF], 4);
        let mut stream = BitStream::new(&mut buf);
        assert!(stream.read_bits_u64(5).is_err());
    }

    #[test]
    fn seek_out_of_range_fails() {
        let mut buf = BitBuffer::from_bytes(&[0xFF], 8);
        let mut stream = BitStream::new(&mut buf);
        assert!(stream.seek_bits(9).is_err());
        assert!(stream.seek_bits(8).is_ok());
    }
}
