#![forbid(unsafe_code)]
#![deny(warnings)]
#![warn(clippy::pedantic)]

//! Memory side of the load: a stack of fixed-size byte buffers.
//!
//! The list itself sits behind one lock that is held only for the push, pop or
//! index lookup. Each buffer carries its own lock so a worker can fill it after
//! the list lock is released; a buffer evicted while a worker still holds its
//! handle is freed once that write finishes.

use parking_lot::Mutex;
use std::sync::Arc;

/// One mebibyte.
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 20;

/// Shared handle to a resident buffer.
pub type Buffer = Arc<Mutex<Box<[u8]>>>;

// Non-zero so every page is actually touched on allocation.
const FILL_BYTE: u8 = 0xA5;

pub struct BufferPool {
    buffer_size: usize,
    buffers: Mutex<Vec<Buffer>>,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl BufferPool {
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            buffers: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Allocate one buffer and push it on top of the stack.
    pub fn grow(&self) {
        let buffer: Buffer = Arc::new(Mutex::new(
            vec![FILL_BYTE; self.buffer_size].into_boxed_slice(),
        ));
        self.buffers.lock().push(buffer);
    }

    /// Drop the most recently allocated buffer. Returns `false` on an empty pool.
    pub fn shrink(&self) -> bool {
        let evicted = self.buffers.lock().pop();
        evicted.is_some()
    }

    /// Bounds-checked lookup. `None` means the index is past the end right now,
    /// which callers treat as a skipped write.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Buffer> {
        self.buffers.lock().get(index).cloned()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.buffers.lock().len()
    }

    /// Resident bytes, not counting the list itself.
    #[must_use]
    pub fn resident_bytes(&self) -> usize {
        self.size().saturating_mul(self.buffer_size)
    }

    /// Release spare capacity of the backing list. Only a hint.
    pub fn reclaim(&self) {
        self.buffers.lock().shrink_to_fit();
    }

    pub fn with_buffer<R>(&self, index: usize, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let buffer = self.get(index)?;
        let bytes = buffer.lock();
        Some(f(&bytes[..]))
    }
}
