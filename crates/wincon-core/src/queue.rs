#![forbid(unsafe_code)]

//! Push-back-capable byte queue.
//!
//! Decoded bytes are appended at the back and consumed from the front.
//! [`InputQueue::push_front`] exists solely to return unconsumed look-ahead
//! bytes: a caller that un-reads a run of bytes in reverse order and reads
//! again observes the identical sequence.

use std::collections::VecDeque;

/// Ordered buffer of decoded bytes; the front is the next byte to be read.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    bytes: VecDeque<u8>,
}

impl InputQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return the next byte.
    pub fn pop_front(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }

    /// Reinsert a byte at the front (unget).
    pub fn push_front(&mut self, byte: u8) {
        self.bytes.push_front(byte);
    }

    /// Append a byte at the back.
    pub fn push_back(&mut self, byte: u8) {
        self.bytes.push_back(byte);
    }

    /// Append a run of bytes at the back.
    pub fn extend(&mut self, bytes: impl IntoIterator<Item = u8>) {
        self.bytes.extend(bytes);
    }

    /// Whether the queue holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of buffered bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Drop all buffered bytes.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut queue = InputQueue::new();
        queue.extend([1, 2, 3]);
        assert_eq!(queue.pop_front(), Some(1));
        assert_eq!(queue.pop_front(), Some(2));
        assert_eq!(queue.pop_front(), Some(3));
        assert_eq!(queue.pop_front(), None);
    }

    #[test]
    fn push_front_is_read_before_newer_bytes() {
        let mut queue = InputQueue::new();
        queue.extend([b'b', b'c']);
        queue.push_front(b'a');
        assert_eq!(queue.pop_front(), Some(b'a'));
        assert_eq!(queue.pop_front(), Some(b'b'));
    }

    #[test]
    fn unread_in_reverse_order_reproduces_sequence() {
        let sequence = [10u8, 20, 30, 40];
        let mut queue = InputQueue::new();
        queue.extend(sequence);

        let mut read = Vec::new();
        while let Some(byte) = queue.pop_front() {
            read.push(byte);
        }
        assert_eq!(read, sequence);

        for &byte in read.iter().rev() {
            queue.push_front(byte);
        }

        let mut reread = Vec::new();
        while let Some(byte) = queue.pop_front() {
            reread.push(byte);
        }
        assert_eq!(reread, sequence);
    }

    #[test]
    fn len_and_clear() {
        let mut queue = InputQueue::new();
        assert!(queue.is_empty());
        queue.push_back(7);
        queue.push_back(8);
        assert_eq!(queue.len(), 2);
        queue.clear();
        assert!(queue.is_empty());
    }
}
