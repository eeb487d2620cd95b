//! Fixed-capacity ring buffer over an [`ItemSource`] (§4.2), grounded on the peek/fill scheme
//! of a hand-rolled lookahead lexer buffer: a bounded ring that refills lazily and latches an
//! end-of-stream flag once the source under-delivers.

use std::collections::VecDeque;
use std::io;

use super::ItemSource;

/// Wraps an [`ItemSource`] behind `peek`/`next`/`consume`, bounded to a fixed lookahead horizon.
///
/// `peek(delta)` for `delta >= capacity` is a contract violation, not a recoverable error — it
/// asserts, matching the source lookahead buffer this is grounded on. A genuine I/O failure from
/// the underlying source is a recoverable error and surfaces as `Err` instead.
pub struct BufferedProvider<T, S> {
    source: S,
    buffer: VecDeque<T>,
    capacity: usize,
    items_consumed: u64,
    end_reached: bool,
}

impl<T: Clone, S: ItemSource<T>> BufferedProvider<T, S> {
    pub fn new(source: S, capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be positive");
        BufferedProvider {
            source,
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            items_consumed: 0,
            end_reached: false,
        }
    }

    /// Pulls `capacity - len` items from the source in one call, latching `end_reached` once
    /// the source returns fewer items than requested.
    fn refill(&mut self) -> io::Result<()> {
        if self.end_reached {
            return Ok(());
        }
        let need = self.capacity - self.buffer.len();
        if need == 0 {
            return Ok(());
        }
        let items = self.source.next_items(need)?;
        if items.len() < need {
            self.end_reached = true;
        }
        self.buffer.extend(items);
        Ok(())
    }

    /// Returns the item `delta` positions ahead without consuming it. `delta` must be strictly
    /// less than the buffer's capacity.
    pub fn peek(&mut self, delta: usize) -> io::Result<T> {
        assert!(
            delta < self.capacity,
            "peek({delta}) exceeds buffer capacity {}",
            self.capacity
        );
        if self.buffer.len() <= delta {
            self.refill()?;
        }
        Ok(self.buffer.get(delta).cloned().unwrap_or_else(|| self.source.dummy_item()))
    }

    /// Consumes and returns the next item, or the source's dummy item past end-of-stream.
    pub fn next(&mut self) -> io::Result<T> {
        if self.buffer.is_empty() {
            self.refill()?;
        }
        self.items_consumed += 1;
        Ok(self.buffer.pop_front().unwrap_or_else(|| self.source.dummy_item()))
    }

    /// Equivalent to `n` calls to [`Self::next`], discarding the results.
    pub fn consume(&mut self, n: usize) -> io::Result<()> {
        for _ in 0..n {
            self.next()?;
        }
        Ok(())
    }

    /// True iff the item `delta` positions ahead is real, not the dummy past-end value.
    pub fn has_item_at(&mut self, delta: usize) -> io::Result<bool> {
        assert!(
            delta < self.capacity,
            "has_item_at({delta}) exceeds buffer capacity {}",
            self.capacity
        );
        if self.buffer.len() <= delta {
            self.refill()?;
        }
        Ok(self.buffer.len() > delta)
    }

    /// True iff the next item (position `delta = 0`) is real, not the dummy past-end value.
    pub fn has_next(&mut self) -> io::Result<bool> {
        self.has_item_at(0)
    }

    pub fn current_index(&self) -> i64 {
        self.source.current_index(self.items_consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Direction, bytes::InMemoryByteSource};

    #[test]
    fn peek_does_not_consume() {
        let mut p = BufferedProvider::new(InMemoryByteSource::new(b"abc".to_vec(), Direction::Forward, 0), 4);
        assert_eq!(p.peek(0).unwrap(), b'a');
        assert_eq!(p.peek(1).unwrap(), b'b');
        assert_eq!(p.next().unwrap(), b'a');
        assert_eq!(p.next().unwrap(), b'b');
        assert_eq!(p.next().unwrap(), b'c');
    }

    #[test]
    fn past_end_returns_dummy_and_keeps_counting() {
        let mut p = BufferedProvider::new(InMemoryByteSource::new(b"a".to_vec(), Direction::Forward, 0), 4);
        assert_eq!(p.next().unwrap(), b'a');
        assert_eq!(p.next().unwrap(), 0);
        assert!(!p.has_next().unwrap());
        assert_eq!(p.current_index(), 2);
    }

    #[test]
    #[should_panic(expected = "exceeds buffer capacity")]
    fn peek_past_capacity_panics() {
        let mut p = BufferedProvider::new(InMemoryByteSource::new(b"abc".to_vec(), Direction::Forward, 0), 2);
        let _ = p.peek(2);
    }
}
