//! Concrete byte sources (§4.3): an in-memory slice and a random-access indexed reader, both
//! walkable forward or backward from a configurable start offset.

use std::io::{Read, Seek, SeekFrom};

use super::{Direction, ItemSource};

/// Bytes owned in memory, e.g. a fully-loaded file or a mapped region.
pub struct InMemoryByteSource {
    data: Vec<u8>,
    direction: Direction,
    start: i64,
    consumed: u64,
}

impl InMemoryByteSource {
    pub fn new(data: Vec<u8>, direction: Direction, start: i64) -> Self {
        InMemoryByteSource {
            data,
            direction,
            start,
            consumed: 0,
        }
    }

    fn len(&self) -> i64 {
        self.data.len() as i64
    }
}

impl ItemSource<u8> for InMemoryByteSource {
    fn dummy_item(&self) -> u8 {
        0
    }

    fn next_items(&mut self, requested_count: usize) -> std::io::Result<Vec<u8>> {
        let len = self.len();
        let mut out = Vec::with_capacity(requested_count);
        for _ in 0..requested_count {
            let index = self.current_index(self.consumed);
            if index < 0 || index >= len {
                break;
            }
            out.push(self.data[index as usize]);
            self.consumed += 1;
        }
        Ok(out)
    }

    fn current_index(&self, items_consumed: u64) -> i64 {
        match self.direction {
            Direction::Forward => self.start + items_consumed as i64,
            Direction::Backward => self.start - items_consumed as i64,
        }
    }
}

/// Pulls from an external random-access reader rather than holding the whole file in memory.
pub struct IndexedReaderByteSource<R> {
    reader: R,
    direction: Direction,
    start: i64,
    length: i64,
    consumed: u64,
}

impl<R: Read + Seek> IndexedReaderByteSource<R> {
    pub fn new(mut reader: R, direction: Direction, start: i64) -> std::io::Result<Self> {
        let length = reader.seek(SeekFrom::End(0))? as i64;
        Ok(IndexedReaderByteSource {
            reader,
            direction,
            start,
            length,
            consumed: 0,
        })
    }
}

impl<R: Read + Seek> ItemSource<u8> for IndexedReaderByteSource<R> {
    fn dummy_item(&self) -> u8 {
        0
    }

    fn next_items(&mut self, requested_count: usize) -> std::io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(requested_count);
        for _ in 0..requested_count {
            let index = self.current_index(self.consumed);
            if index < 0 || index >= self.length {
                break;
            }
            self.reader.seek(SeekFrom::Start(index as u64))?;
            let mut byte = [0u8; 1];
            self.reader.read_exact(&mut byte)?;
            out.push(byte[0]);
            self.consumed += 1;
        }
        Ok(out)
    }

    fn current_index(&self, items_consumed: u64) -> i64 {
        match self.direction {
            Direction::Forward => self.start + items_consumed as i64,
            Direction::Backward => self.start - items_consumed as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_reads_in_order() {
        let mut src = InMemoryByteSource::new(b"hello".to_vec(), Direction::Forward, 0);
        assert_eq!(src.next_items(3).unwrap(), b"hel");
        assert_eq!(src.next_items(3).unwrap(), b"lo");
        assert_eq!(src.next_items(1).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn backward_reverses_and_stops_at_zero() {
        let mut src = InMemoryByteSource::new(b"hello".to_vec(), Direction::Backward, 4);
        assert_eq!(src.next_items(10).unwrap(), b"olleh");
        assert_eq!(src.next_items(1).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn start_offset_is_honoured() {
        let mut src = InMemoryByteSource::new(b"abcdef".to_vec(), Direction::Forward, 2);
        assert_eq!(src.next_items(4).unwrap(), b"cdef");
    }
}
