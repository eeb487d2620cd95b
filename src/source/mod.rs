//! Pull interfaces over a finite sequence of items (§4.1).
//!
//! An [`ItemSource`] never throws on a well-formed request: it just returns fewer items than
//! asked for once exhausted. Internal I/O failure is the only thing that propagates as an error.

pub mod buffered;
pub mod bytes;

/// Direction a byte source walks its underlying storage in (§4.3, §9 "Backward byte scanning").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// An abstract source of items of type `T`, pulled in batches.
pub trait ItemSource<T> {
    /// Value handed back once the source is exhausted and a caller asks for more anyway.
    fn dummy_item(&self) -> T;

    /// Returns up to `requested_count` further items. Fewer than requested is returned only at
    /// end-of-stream; an empty result means the source is (and remains) exhausted.
    fn next_items(&mut self, requested_count: usize) -> std::io::Result<Vec<T>>;

    /// Maps a consumption counter to the source's logical index (a byte offset for byte
    /// sources, an ordinal for token sources). Decreases with `items_consumed` for a backward
    /// byte source.
    fn current_index(&self, items_consumed: u64) -> i64;
}
