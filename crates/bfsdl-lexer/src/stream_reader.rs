//! Pulls bytes from a synchronous byte source in fixed chunks, presenting
//! each unprocessed window as a [`BitStream`] to an observer.
//!
//! Grounded on `Bfdp::Lexer::StreamBase`/`StreamReader`. Unlike the
//! original's in-place windowed view, this port reshapes the window into a
//! fresh [`BitBuffer`] each call — an acceptable copy given `bfsdl-lexer`'s
//! chunk sizes, since [`BitBuffer`] itself has no zero-copy sub-slice view
//! (see `DESIGN.md`).

use std::io::Read;

use bfsdl_core::bitmanip::{BitBuffer, BitStream};

use crate::error::{trace, LexError, LexResult};

/// Default chunk size, in bytes, read from the source per refill.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// What an observer wants after consuming some of a stream window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamControl {
    /// Keep calling `on_stream_data` — more of this window remains useful.
    Continue,
    /// No more can be parsed from the current window; wait for a refill.
    NoData,
    /// Stop the sequence. Not an error.
    Stop,
    /// Stop the sequence; surface as an error.
    Error,
}

/// Consumes bits from the window a [`StreamReader`] presents.
pub trait StreamObserver {
    /// Reads from `stream` (via its cursor), returning how the sequence
    /// should proceed.
    fn on_stream_data(&mut self, stream: &mut BitStream<'_>) -> StreamControl;
}

/// Drives a byte source through fixed-size chunk reads, handing each
/// unprocessed window to a [`StreamObserver`].
pub struct StreamReader<R> {
    source: R,
    chunk_size: usize,
    raw: std::vec::Vec<u8>,
    window_len: usize,
    pos_bits_in_window: usize,
    source_exhausted: bool,
    last_control: StreamControl,
}

impl<R: Read> StreamReader<R> {
    /// Builds a reader over `source` with the default chunk size.
    #[must_use]
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Builds a reader with an explicit chunk size.
    #[must_use]
    pub fn with_chunk_size(source: R, chunk_size: usize) -> Self {
        Self {
            source,
            chunk_size,
            raw: std::vec::Vec::new(),
            window_len: 0,
            pos_bits_in_window: 0,
            source_exhausted: false,
            last_control: StreamControl::Continue,
        }
    }

    /// Allocates the internal `2 * chunk_size` byte buffer, if not already
    /// allocated.
    pub fn read_sequence_start(&mut self) {
        if self.raw.is_empty() {
            self.raw = std::vec![0u8; 2 * self.chunk_size];
        }
    }

    /// Runs one refill-and-drain cycle: presents the unprocessed window to
    /// `observer` until it signals `NoData`/`Stop`/`Error` or the window is
    /// exhausted, then compacts and refills from the source. Returns
    /// `Ok(true)` to keep calling, `Ok(false)` when the sequence has ended
    /// (exhausted source or observer `Stop`).
    pub fn read_sequence_continue<O: StreamObserver>(&mut self, observer: &mut O) -> LexResult<bool> {
        let window_bits = self.window_len * 8;
        let mut window = BitBuffer::from_bytes(&self.raw[..self.window_len], window_bits);
        let mut stream = BitStream::new(&mut window);
        stream
            .seek_bits(self.pos_bits_in_window)
            .expect("pos_bits_in_window is always <= window_bits");

        let call_start_bits = self.pos_bits_in_window;
        self.last_control = StreamControl::Continue;

        while stream.bits_till_end() > 0 {
            let before = stream.pos_bits();
            let control = observer.on_stream_data(&mut stream);
            let after = stream.pos_bits();

            if after < before {
                trace("stream_reader", "observer reported a position behind where it started");
                return Err(LexError::StreamPositionWentBackward);
            }
            let control = if after == before && control == StreamControl::Continue {
                StreamControl::NoData
            } else {
                control
            };
            self.last_control = control;
            if control != StreamControl::Continue {
                break;
            }
        }

        let consumed_bits = stream.pos_bits() - call_start_bits;
        let consumed_bytes = consumed_bits / 8;
        let leftover_bits = consumed_bits % 8;

        if self.last_control == StreamControl::Error {
            trace("stream_reader", "observer reported an error");
            return Err(LexError::StreamObserverError);
        }

        self.compact(consumed_bytes, leftover_bits);

        if self.last_control == StreamControl::Stop {
            return Ok(false);
        }

        if self.source_exhausted {
            return Ok(false);
        }

        let free_space = self.raw.len() - self.window_len;
        if free_space < self.chunk_size {
            trace("stream_reader", "buffer overflow: observer consumed too little per call");
            return Err(LexError::StreamBufferOverflow);
        }

        let read_into = self.window_len;
        let n = self
            .source
            .read(&mut self.raw[read_into..read_into + self.chunk_size])
            .map_err(|_| {
                trace("stream_reader", "source read failed");
                LexError::StreamSourceFault
            })?;

        if n == 0 {
            self.source_exhausted = true;
        } else {
            self.window_len += n;
        }
        Ok(true)
    }

    fn compact(&mut self, consumed_bytes: usize, leftover_bits: usize) {
        if consumed_bytes > 0 {
            self.raw.copy_within(consumed_bytes..self.window_len, 0);
        }
        self.window_len -= consumed_bytes;
        self.pos_bits_in_window = leftover_bits;
    }

    /// Verifies the sequence ended cleanly: either the window is empty, or
    /// the last control code was `Stop`.
    pub fn read_sequence_end(&self) -> LexResult<()> {
        if self.window_len > 0 && self.last_control != StreamControl::Stop {
            return Err(LexError::UnreadStreamData);
        }
        Ok(())
    }

    /// Convenience: start, drain via [`StreamReader::read_sequence_continue`]
    /// until it returns `Ok(false)`, then [`StreamReader::read_sequence_end`].
    pub fn read_stream<O: StreamObserver>(&mut self, observer: &mut O) -> LexResult<()> {
        self.read_sequence_start();
        while self.read_sequence_continue(observer)? {}
        self.read_sequence_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct CountBits {
        total: usize,
        stop_after: usize,
    }

    impl StreamObserver for CountBits {
        fn on_stream_data(&mut self, stream: &mut BitStream<'_>) -> StreamControl {
            if self.total >= self.stop_after {
                return StreamControl::Stop;
            }
            if stream.bits_till_end() < 8 {
                return StreamControl::NoData;
            }
            let _ = stream.read_bits_u64(8).unwrap();
            self.total += 8;
            StreamControl::Continue
        }
    }

    #[test]
    fn reads_all_bytes_across_multiple_chunks() {
        let data = std::vec![0xABu8; 10];
        let mut reader = StreamReader::with_chunk_size(Cursor::new(data), 4);
        let mut observer = CountBits { total: 0, stop_after: usize::MAX };
        reader.read_stream(&mut observer).unwrap();
        assert_eq!(observer.total, 80);
    }

    #[test]
    fn observer_stop_ends_sequence_without_error() {
        let data = std::vec![0x11u8; 100];
        let mut reader = StreamReader::with_chunk_size(Cursor::new(data), 8);
        let mut observer = CountBits { total: 0, stop_after: 24 };
        let result = reader.read_stream(&mut observer);
        assert!(result.is_ok());
        assert_eq!(observer.total, 24);
    }

    #[test]
    fn buffer_overflow_when_observer_never_consumes() {
        struct Stall;
        impl StreamObserver for Stall {
            fn on_stream_data(&mut self, _stream: &mut BitStream<'_>) -> StreamControl {
                StreamControl::NoData
            }
        }
        let data = std::vec![0x00u8; 64];
        let mut reader = StreamReader::with_chunk_size(Cursor::new(data), 4);
        let mut observer = Stall;
        reader.read_sequence_start();
        // First continue() call reads one chunk in with no data to process yet.
        assert!(reader.read_sequence_continue(&mut observer).unwrap());
        // Observer never advances, so each call keeps refilling until the
        // buffer has less than chunk_size free.
        let mut result = Ok(true);
        for _ in 0..10 {
            result = reader.read_sequence_continue(&mut observer);
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(LexError::StreamBufferOverflow)));
    }
}
