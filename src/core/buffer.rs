//! Growable owned arrays used for every variable-length section of a tig.
//!
//! A [`GrowableBuffer`] tracks length and capacity separately so a tig can be
//! cleared and refilled many times without giving its memory back. Growth is
//! geometric: when a push finds the buffer full, capacity at least doubles.

use std::io::{self, Read};

/// Factor applied to the capacity when a full buffer receives another element
const GROWTH_FACTOR: usize = 2;

/// A length/capacity tracked array with geometric growth.
///
/// Only the first `len()` elements are ever visible. `clear()` keeps the
/// allocation so the buffer can be reused for the next tig.
#[derive(Debug, Clone, Default)]
pub struct GrowableBuffer<T> {
    items: Vec<T>,
}

impl<T> GrowableBuffer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Number of valid elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of elements that fit without reallocating
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Append an element, returning its index
    pub fn push(&mut self, item: T) -> usize {
        if self.items.len() == self.items.capacity() {
            self.grow_for(1);
        }
        let index = self.items.len();
        self.items.push(item);
        index
    }

    /// Ensure capacity is at least `capacity`. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.items.capacity() {
            self.items.reserve_exact(capacity - self.items.len());
        }
    }

    /// Reset the length to zero, keeping the allocation
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop the contents and the allocation
    pub fn release(&mut self) {
        self.items = Vec::new();
    }

    /// Shorten to `len` elements; a no-op when already shorter
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Grow geometrically so that `additional` more elements fit
    fn grow_for(&mut self, additional: usize) {
        let needed = self.items.len() + additional;
        let capacity = self.items.capacity();
        let target = (capacity * GROWTH_FACTOR).max(capacity + 1).max(needed);
        self.items.reserve_exact(target - self.items.len());
    }
}

impl<T: Clone> GrowableBuffer<T> {
    /// Append all of `items`, returning the offset of the first one
    pub fn extend_from_slice(&mut self, items: &[T]) -> usize {
        let offset = self.items.len();
        if self.items.len() + items.len() > self.items.capacity() {
            self.grow_for(items.len());
        }
        self.items.extend_from_slice(items);
        offset
    }
}

impl<T: Clone + Default> GrowableBuffer<T> {
    /// Set the length to `len`; new elements take their default value
    pub fn resize_default(&mut self, len: usize) {
        self.reserve(len);
        self.items.resize(len, T::default());
    }
}

impl GrowableBuffer<u8> {
    /// Replace the contents with up to `len` bytes from `reader`, returning
    /// how many were read. Fewer than `len` means the stream ended.
    ///
    /// Memory grows with the bytes actually read, not with `len`.
    ///
    /// # Errors
    ///
    /// Returns any IO error from `reader`.
    pub fn fill_from<R: Read + ?Sized>(&mut self, reader: &mut R, len: u64) -> io::Result<usize> {
        self.items.clear();
        reader.take(len).read_to_end(&mut self.items)
    }
}

impl<T: PartialEq> PartialEq for GrowableBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T> From<Vec<T>> for GrowableBuffer<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<'a, T> IntoIterator for &'a GrowableBuffer<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_from_short_stream() {
        let mut buffer = GrowableBuffer::from(vec![9u8; 4]);
        let n = buffer.fill_from(&mut b"ACG".as_slice(), 1 << 40).unwrap();
        assert_eq!(n, 3);
        assert_eq!(buffer.as_slice(), b"ACG");
        assert!(buffer.capacity() < 1 << 20);

        let n = buffer.fill_from(&mut b"TTTT".as_slice(), 2).unwrap();
        assert_eq!(n, 2);
        assert_eq!(buffer.as_slice(), b"TT");
    }

    #[test]
    fn test_push_preserves_contents_across_growth() {
        let mut buffer = GrowableBuffer::new();
        for i in 0..1000u32 {
            assert_eq!(buffer.push(i), i as usize);
            assert_eq!(buffer.len(), i as usize + 1);
            assert!(buffer.capacity() >= buffer.len());
        }
        let expected: Vec<u32> = (0..1000).collect();
        assert_eq!(buffer.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_growth_is_geometric() {
        let mut buffer = GrowableBuffer::with_capacity(4);
        for i in 0..4u8 {
            buffer.push(i);
        }
        let before = buffer.capacity();
        buffer.push(4);
        assert!(buffer.capacity() >= before * 2);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buffer = GrowableBuffer::new();
        buffer.extend_from_slice(&[1i32, 2, 3, 4, 5]);
        let capacity = buffer.capacity();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
        assert!(buffer.get(0).is_none());
    }

    #[test]
    fn test_release_drops_storage() {
        let mut buffer = GrowableBuffer::new();
        buffer.extend_from_slice(&[1u8; 64]);
        buffer.release();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 0);
    }

    #[test]
    fn test_reserve_never_shrinks() {
        let mut buffer: GrowableBuffer<u64> = GrowableBuffer::with_capacity(100);
        buffer.reserve(10);
        assert!(buffer.capacity() >= 100);
        buffer.reserve(500);
        assert!(buffer.capacity() >= 500);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_extend_returns_offset() {
        let mut buffer = GrowableBuffer::new();
        assert_eq!(buffer.extend_from_slice(&[1, 2, 3]), 0);
        assert_eq!(buffer.extend_from_slice(&[4, 5]), 3);
        assert_eq!(buffer.extend_from_slice(&[]), 5);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_resize_default_zero_fills() {
        let mut buffer = GrowableBuffer::new();
        buffer.push(7i32);
        buffer.clear();
        buffer.resize_default(3);
        assert_eq!(buffer.as_slice(), &[0, 0, 0]);
        buffer.resize_default(1);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_equality_ignores_capacity() {
        let mut a = GrowableBuffer::with_capacity(64);
        let mut b = GrowableBuffer::new();
        a.push('x');
        b.push('x');
        assert_eq!(a, b);
    }
}
