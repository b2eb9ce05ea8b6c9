//! Ring Buffer Implementation

use crate::pool::{Pooled, QuotePool};
use crate::{Quote, RingBufferError};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Default buffer capacity (10000 slots, 9999 usable)
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Slot storage and the cursor pair, always locked together
struct Slots {
    /// Pre-allocated storage
    storage: Box<[Quote]>,
    /// Write cursor, next slot to fill
    write: usize,
    /// Read cursor, next slot to drain
    read: usize,
}

/// Point-in-time view of the buffer cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    pub write_cursor: usize,
    pub read_cursor: usize,
    /// Quotes currently resident
    pub used: usize,
    /// Total slot count (one slot is never occupied)
    pub capacity: usize,
}

impl BufferStats {
    fn from_cursors(write: usize, read: usize, capacity: usize) -> Self {
        let used = if write >= read {
            write - read
        } else {
            capacity - read + write
        };
        Self {
            write_cursor: write,
            read_cursor: read,
            used,
            capacity,
        }
    }

    /// Maximum number of resident quotes
    pub fn usable_capacity(&self) -> usize {
        self.capacity - 1
    }

    /// Occupancy as a percentage of the slot count
    pub fn fill_percent(&self) -> f64 {
        self.used as f64 / self.capacity as f64 * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn is_full(&self) -> bool {
        self.used == self.usable_capacity()
    }
}

/// Bounded multi-producer/multi-consumer ring buffer for quotes
///
/// Writers and readers serialize on one exclusive lock that covers both the
/// slots and the cursor pair. A write on a full buffer and a read on an empty
/// buffer return immediately without touching any state.
pub struct RingBuffer {
    slots: Mutex<Slots>,
    /// Capacity of the buffer
    capacity: usize,
    /// Containers handed out by `try_read`
    pool: Arc<QuotePool>,
    /// Quotes accepted (for statistics)
    total_written: AtomicU64,
    /// Quotes rejected because the buffer was full
    total_dropped: AtomicU64,
    /// Quotes handed to readers
    total_read: AtomicU64,
}

impl RingBuffer {
    /// Create a new ring buffer with given capacity, reading into `pool`
    pub fn new(capacity: usize, pool: Arc<QuotePool>) -> Result<Self, RingBufferError> {
        if capacity < 2 {
            return Err(RingBufferError::CapacityTooSmall(capacity));
        }

        let storage: Vec<Quote> = (0..capacity).map(|_| Quote::default()).collect();
        debug!("Allocated ring buffer with {} slots", capacity);

        Ok(Self {
            slots: Mutex::new(Slots {
                storage: storage.into_boxed_slice(),
                write: 0,
                read: 0,
            }),
            capacity,
            pool,
            total_written: AtomicU64::new(0),
            total_dropped: AtomicU64::new(0),
            total_read: AtomicU64::new(0),
        })
    }

    /// Create a buffer with default capacity and an unbounded pool
    pub fn with_default_capacity() -> Result<Self, RingBufferError> {
        Self::new(DEFAULT_CAPACITY, Arc::new(QuotePool::new()))
    }

    /// Try to append a quote. Returns `false` and drops the quote when full.
    pub fn try_write(&self, quote: Quote) -> bool {
        let mut slots = self.slots.lock();
        let next = (slots.write + 1) % self.capacity;

        if next == slots.read {
            drop(slots);
            self.total_dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let write = slots.write;
        slots.storage[write] = quote;
        slots.write = next;
        drop(slots);

        self.total_written.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Try to take the oldest quote. Returns `None` when empty.
    ///
    /// The quote is copied into a pooled container; dropping the handle
    /// returns the container to the pool.
    pub fn try_read(&self) -> Option<Pooled> {
        let mut slots = self.slots.lock();
        if slots.read == slots.write {
            return None;
        }

        let read = slots.read;
        let mut container = self.pool.acquire();
        container.as_mut().clone_from(&slots.storage[read]);
        slots.read = (read + 1) % self.capacity;
        drop(slots);

        self.total_read.fetch_add(1, Ordering::Relaxed);
        Some(Pooled::new(container, Arc::clone(&self.pool)))
    }

    /// Consistent snapshot of both cursors and the occupancy
    pub fn stats(&self) -> BufferStats {
        let slots = self.slots.lock();
        BufferStats::from_cursors(slots.write, slots.read, self.capacity)
    }

    /// Get the number of quotes currently in the buffer
    pub fn len(&self) -> usize {
        self.stats().used
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.stats().is_empty()
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.stats().is_full()
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pool backing the read path
    pub fn pool(&self) -> &Arc<QuotePool> {
        &self.pool
    }

    /// Get total quotes accepted
    pub fn total_written(&self) -> u64 {
        self.total_written.load(Ordering::Relaxed)
    }

    /// Get total quotes rejected on a full buffer
    pub fn total_dropped(&self) -> u64 {
        self.total_dropped.load(Ordering::Relaxed)
    }

    /// Get total quotes handed to readers
    pub fn total_read(&self) -> u64 {
        self.total_read.load(Ordering::Relaxed)
    }
}
