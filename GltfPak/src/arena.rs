//! Append-only byte arena backing the single glTF buffer of an export session.
//!
//! Offsets handed out by [`ArenaBuffer::append`] are relative to the start of
//! the arena, so growing the backing storage never invalidates a buffer view
//! created earlier.
//!
//! SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::element::{Component, Element};
use crate::error::{Error, Result};

/// Default arena reservation (1 MiB).
pub const DEFAULT_RESERVE_BYTES: usize = 1024 * 1024;

/// Alignment of the finished buffer.
pub const BUFFER_ALIGNMENT: usize = 4;

/// What to do when an append does not fit in the reservation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArenaGrowth {
    /// Reallocate the backing storage.
    #[default]
    Grow,
    /// Fail with [`Error::ArenaCapacityExceeded`].
    Fixed,
}

/// Zero bytes needed to move `len` up to a multiple of `alignment`.
pub(crate) fn padding_for(len: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return 0;
    }
    (alignment - (len % alignment)) % alignment
}

/// Growable byte region with a write cursor.
#[derive(Debug)]
pub struct ArenaBuffer {
    bytes: Vec<u8>,
    reserve: usize,
    growth: ArenaGrowth,
}

impl ArenaBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(DEFAULT_RESERVE_BYTES),
            reserve: DEFAULT_RESERVE_BYTES,
            growth: ArenaGrowth::Grow,
        }
    }

    /// Create an arena pre-sized to `reserve` bytes.
    ///
    /// # Errors
    /// Returns [`Error::ArenaCapacityExceeded`] if the reservation cannot be
    /// allocated.
    pub fn with_reserve(reserve: usize, growth: ArenaGrowth) -> Result<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(reserve)
            .map_err(|_| Error::ArenaCapacityExceeded {
                requested: reserve,
                capacity: 0,
            })?;

        Ok(Self {
            bytes,
            reserve,
            growth,
        })
    }

    /// Current cursor position (occupied length).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes available before the arena has to grow (or fail).
    pub fn capacity(&self) -> usize {
        match self.growth {
            ArenaGrowth::Grow => self.bytes.capacity(),
            ArenaGrowth::Fixed => self.reserve,
        }
    }

    /// Write `data` at the cursor, first padding the cursor with zeroes up to
    /// `alignment`. Returns `(byte_offset, byte_length)` of the written range.
    pub fn append<E: Element>(&mut self, data: &[E], alignment: usize) -> Result<(usize, usize)> {
        let byte_length = std::mem::size_of_val(data);
        let byte_offset = self.reserve_aligned(byte_length, alignment)?;

        for &component in E::components(data) {
            component.write_le(&mut self.bytes);
        }

        Ok((byte_offset, byte_length))
    }

    /// Write pre-encoded bytes, e.g. an image file.
    pub fn append_bytes(&mut self, data: &[u8], alignment: usize) -> Result<(usize, usize)> {
        let byte_offset = self.reserve_aligned(data.len(), alignment)?;
        self.bytes.extend_from_slice(data);
        Ok((byte_offset, data.len()))
    }

    /// Pad the cursor and make room for `byte_length` more bytes.
    /// Returns the aligned offset where the data will start.
    fn reserve_aligned(&mut self, byte_length: usize, alignment: usize) -> Result<usize> {
        let padding = padding_for(self.bytes.len(), alignment);
        let requested = self.bytes.len() + padding + byte_length;

        if requested > self.capacity() {
            match self.growth {
                ArenaGrowth::Fixed => {
                    return Err(Error::ArenaCapacityExceeded {
                        requested,
                        capacity: self.reserve,
                    });
                }
                ArenaGrowth::Grow => {
                    tracing::debug!(
                        "Growing arena: {} -> {} bytes",
                        self.bytes.capacity(),
                        requested
                    );
                    self.bytes
                        .try_reserve(requested - self.bytes.len())
                        .map_err(|_| Error::ArenaCapacityExceeded {
                            requested,
                            capacity: self.bytes.capacity(),
                        })?;
                }
            }
        }

        self.bytes.extend(std::iter::repeat_n(0u8, padding));
        Ok(self.bytes.len())
    }

    /// The occupied bytes. The borrow ends before the next append.
    pub fn bin_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the arena, returning its bytes zero-padded to 4.
    #[must_use]
    pub fn into_bytes(mut self) -> Vec<u8> {
        let padding = padding_for(self.bytes.len(), BUFFER_ALIGNMENT);
        self.bytes.extend(std::iter::repeat_n(0u8, padding));
        self.bytes
    }
}

impl Default for ArenaBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_cursor_ranges() {
        let mut arena = ArenaBuffer::new();
        assert_eq!(arena.append(&[1.0f32, 2.0, 3.0], 4).unwrap(), (0, 12));
        assert_eq!(arena.append(&[7u16, 8, 9], 2).unwrap(), (12, 6));
        assert_eq!(arena.len(), 18);
    }

    #[test]
    fn test_alignment_padding_is_zeroed() {
        let mut arena = ArenaBuffer::new();
        arena.append(&[0xFFu8; 3], 1).unwrap();
        let (offset, length) = arena.append(&[1.5f32], 4).unwrap();

        assert_eq!((offset, length), (4, 4));
        assert_eq!(arena.bin_bytes()[3], 0);
        assert_eq!(&arena.bin_bytes()[4..8], &1.5f32.to_le_bytes());
    }

    #[test]
    fn test_little_endian_components() {
        let mut arena = ArenaBuffer::new();
        arena.append(&[[0x0102u16, 0x0304]], 2).unwrap();
        assert_eq!(arena.bin_bytes(), &[0x02, 0x01, 0x04, 0x03]);
    }

    #[test]
    fn test_grow_keeps_earlier_offsets() {
        let mut arena = ArenaBuffer::with_reserve(8, ArenaGrowth::Grow).unwrap();
        arena.append(&[1u32, 2], 4).unwrap();
        let (offset, _) = arena.append(&[3u32; 64], 4).unwrap();

        assert_eq!(offset, 8);
        assert_eq!(&arena.bin_bytes()[..8], &[1, 0, 0, 0, 2, 0, 0, 0]);
        assert!(arena.capacity() >= 8 + 256);
    }

    #[test]
    fn test_fixed_reservation_fails() {
        let mut arena = ArenaBuffer::with_reserve(8, ArenaGrowth::Fixed).unwrap();
        arena.append(&[1u32, 2], 4).unwrap();
        let err = arena.append(&[3u8], 1).unwrap_err();

        assert!(matches!(
            err,
            Error::ArenaCapacityExceeded { requested: 9, capacity: 8 }
        ));
        assert_eq!(arena.len(), 8);
    }

    #[test]
    fn test_into_bytes_pads_to_four() {
        let mut arena = ArenaBuffer::new();
        arena.append_bytes(b"abcde", 1).unwrap();
        assert_eq!(arena.into_bytes(), b"abcde\0\0\0".to_vec());
    }

    #[test]
    fn test_unallocatable_reservation_is_an_error() {
        let result = ArenaBuffer::with_reserve(usize::MAX, ArenaGrowth::Fixed);
        assert!(matches!(
            result,
            Err(Error::ArenaCapacityExceeded { requested: usize::MAX, capacity: 0 })
        ));
    }
}
