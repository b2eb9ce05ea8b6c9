//! Quote Container Pool
//!
//! A lock-free free-list of boxed quotes. Readers copy slots into pooled
//! containers so the hot read path does not allocate once the pool is warm.
//! Returning a container moves it back into the pool; any later `acquire`
//! from any thread may hand it out again.

use crate::Quote;
use crossbeam_queue::SegQueue;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Concurrent pool of reusable quote containers
pub struct QuotePool {
    free: SegQueue<Box<Quote>>,
    /// Soft bound on idle containers (`None` = unbounded)
    limit: Option<usize>,
    allocated: AtomicU64,
    reused: AtomicU64,
}

impl QuotePool {
    /// Create an unbounded pool
    pub fn new() -> Self {
        Self {
            free: SegQueue::new(),
            limit: None,
            allocated: AtomicU64::new(0),
            reused: AtomicU64::new(0),
        }
    }

    /// Create a pool that keeps at most `limit` idle containers.
    ///
    /// The bound is checked without a lock, so concurrent releases may
    /// overshoot it by the number of racing threads.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Take a container, allocating a fresh one if none are idle
    pub fn acquire(&self) -> Box<Quote> {
        match self.free.pop() {
            Some(quote) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                quote
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                Box::default()
            }
        }
    }

    /// Give a container back. Surplus containers beyond the limit are freed.
    pub fn release(&self, quote: Box<Quote>) {
        if let Some(limit) = self.limit {
            if self.free.len() >= limit {
                return;
            }
        }
        self.free.push(quote);
    }

    /// Containers currently idle in the pool
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    /// Containers allocated because the pool was empty
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Acquisitions served from the free list
    pub fn reused(&self) -> u64 {
        self.reused.load(Ordering::Relaxed)
    }
}

impl Default for QuotePool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QuotePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuotePool")
            .field("idle", &self.idle())
            .field("limit", &self.limit)
            .field("allocated", &self.allocated())
            .field("reused", &self.reused())
            .finish()
    }
}

/// A quote on loan from a [`QuotePool`]
///
/// Dereferences to the quote. The container goes back to the pool when the
/// handle is dropped or recycled, after which it is unreachable from here.
pub struct Pooled {
    quote: Option<Box<Quote>>,
    pool: Arc<QuotePool>,
}

impl Pooled {
    pub(crate) fn new(quote: Box<Quote>, pool: Arc<QuotePool>) -> Self {
        Self {
            quote: Some(quote),
            pool,
        }
    }

    /// Return the container to its pool now
    pub fn recycle(self) {
        drop(self);
    }
}

impl Deref for Pooled {
    type Target = Quote;

    fn deref(&self) -> &Quote {
        // Only `Drop` takes the box out
        match &self.quote {
            Some(quote) => quote,
            None => unreachable!("pooled quote accessed after release"),
        }
    }
}

impl Drop for Pooled {
    fn drop(&mut self) {
        if let Some(quote) = self.quote.take() {
            self.pool.release(quote);
        }
    }
}

impl fmt::Debug for Pooled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pooled").field(&**self).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_acquire_allocates_when_empty() {
        let pool = QuotePool::new();
        let quote = pool.acquire();
        assert_eq!(*quote, Quote::default());
        assert_eq!(pool.allocated(), 1);
        assert_eq!(pool.reused(), 0);
    }

    #[test]
    fn test_release_then_reuse() {
        let pool = QuotePool::new();
        let mut quote = pool.acquire();
        quote.symbol.push_str("AAPL");
        let ptr: *const Quote = &*quote;

        pool.release(quote);
        assert_eq!(pool.idle(), 1);

        let again = pool.acquire();
        assert_eq!(&*again as *const Quote, ptr);
        assert_eq!(pool.reused(), 1);
    }

    #[test]
    fn test_limit_caps_idle_containers() {
        let pool = QuotePool::with_limit(2);
        let boxes: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
        for quote in boxes {
            pool.release(quote);
        }
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_pooled_handle_returns_on_drop() {
        let pool = Arc::new(QuotePool::new());
        let handle = Pooled::new(Box::new(Quote::new("MSFT", 120.0, 10, "NYSE")), Arc::clone(&pool));
        assert_eq!(handle.symbol, "MSFT");
        assert_eq!(pool.idle(), 0);

        handle.recycle();
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let pool = Arc::new(QuotePool::new());
        thread::scope(|s| {
            for _ in 0..4 {
                let pool = Arc::clone(&pool);
                s.spawn(move || {
                    for _ in 0..1000 {
                        let quote = pool.acquire();
                        pool.release(quote);
                    }
                });
            }
        });

        assert_eq!(pool.allocated() + pool.reused(), 4000);
        assert_eq!(pool.idle() as u64, pool.allocated());
    }
}
